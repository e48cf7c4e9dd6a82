//! In-process event bus backed by a tokio broadcast channel.
//!
//! Services publish every state change here; the SSE endpoint turns
//! [`InProcessEventBus::stream`] into a live feed for the dashboard.

use std::future::Future;

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use greenmachine_domain::error::GreenMachineError;
use greenmachine_domain::event::Event;

use crate::ports::EventPublisher;

/// Fan-out of domain events to every live observer.
///
/// Publishing never fails: with nobody listening the event is dropped.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// `capacity` is how many events a slow observer may fall behind before
    /// it starts missing some.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Raw receiver of the events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Events published from now on, as a stream that skips over whatever
    /// a lagging observer missed instead of ending.
    pub fn stream(&self) -> impl Stream<Item = Event> + Send + 'static + use<> {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|result| match result {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event observer lagged, some events were dropped");
                None
            }
        })
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), GreenMachineError>> + Send {
        let event_type = event.event_type;
        match self.sender.send(event) {
            Ok(observers) => tracing::trace!(%event_type, observers, "event published"),
            Err(_) => tracing::trace!(%event_type, "no observers, event dropped"),
        }
        async { Ok(()) }
    }
}

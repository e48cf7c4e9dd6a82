//! Server-Sent Events (SSE) stream for real-time updates.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;

use greenmachine_app::ports::{Backend, TipGenerator};

use crate::state::AppState;

/// `GET /api/events/stream`: SSE stream of domain events.
///
/// Each domain event is sent as a JSON `data:` frame whose SSE event name is
/// the domain event type. The stream ends when the client disconnects.
pub async fn stream<B, T>(
    State(state): State<AppState<B, T>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    B: Backend,
    T: TipGenerator + Send + Sync + 'static,
{
    let event_stream = state.event_bus.stream().filter_map(|event| {
        match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default()
                .event(event.event_type.to_string())
                .data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize event for SSE stream");
                None
            }
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}

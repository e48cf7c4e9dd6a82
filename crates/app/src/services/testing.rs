//! In-memory fakes shared by the service tests.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use greenmachine_domain::appliance::{ApplianceState, ControlMode};
use greenmachine_domain::error::{FetchError, GreenMachineError, StateConflictError};
use greenmachine_domain::event::{Event, EventType};
use greenmachine_domain::intensity::{CarbonIntensityLevel, CarbonIntensitySample, ForecastSlot};
use greenmachine_domain::preferences::UserPreferences;
use greenmachine_domain::time::{now, plus_hours};

use crate::ports::{
    ApplianceGateway, EventPublisher, IntensityProvider, PointsStore, PreferenceStore,
};

pub(crate) fn sample(level: CarbonIntensityLevel) -> CarbonIntensitySample {
    CarbonIntensitySample::new(level, level.nominal_value(), Vec::new()).unwrap()
}

/// A sample whose first forecast slot covers "now".
pub(crate) fn sample_with_current_slot(
    level: CarbonIntensityLevel,
    slot_level: CarbonIntensityLevel,
) -> CarbonIntensitySample {
    let start = now() - chrono::Duration::minutes(5);
    let slot = ForecastSlot {
        id: "forecast-0".to_string(),
        start_time: start,
        end_time: plus_hours(start, 2),
        level: slot_level,
        value: slot_level.nominal_value(),
    };
    CarbonIntensitySample::new(level, level.nominal_value(), vec![slot]).unwrap()
}

pub(crate) struct FakeBackend {
    pub levels: Mutex<Vec<CarbonIntensityLevel>>,
    pub intensity_forecast: Mutex<Option<CarbonIntensitySample>>,
    pub state: Mutex<ApplianceState>,
    pub preferences: Mutex<UserPreferences>,
    pub points: Mutex<u64>,
    pub fail_set_state: AtomicBool,
    pub fail_award_points: AtomicBool,
    pub fail_intensity: AtomicBool,
    /// Delay applied after reading and after writing preferences.
    pub latency: Duration,
    pub intensity_calls: AtomicUsize,
    pub set_state_calls: AtomicUsize,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            levels: Mutex::new(Vec::new()),
            intensity_forecast: Mutex::new(None),
            state: Mutex::new(ApplianceState::off(now())),
            preferences: Mutex::new(UserPreferences::default()),
            points: Mutex::new(0),
            fail_set_state: AtomicBool::new(false),
            fail_award_points: AtomicBool::new(false),
            fail_intensity: AtomicBool::new(false),
            latency: Duration::ZERO,
            intensity_calls: AtomicUsize::new(0),
            set_state_calls: AtomicUsize::new(0),
        }
    }

    /// Every intensity fetch returns `level`.
    pub(crate) fn with_level(self, level: CarbonIntensityLevel) -> Self {
        *self.levels.lock().unwrap() = vec![level];
        self
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn with_auto_control(self, enabled: bool) -> Self {
        self.preferences.lock().unwrap().auto_control_enabled = enabled;
        self
    }

    pub(crate) fn with_state(self, is_on: bool, controlled_by: ControlMode) -> Self {
        *self.state.lock().unwrap() = ApplianceState {
            is_on,
            controlled_by,
            last_changed: now(),
        };
        self
    }

    pub(crate) fn state(&self) -> ApplianceState {
        *self.state.lock().unwrap()
    }

    pub(crate) fn points(&self) -> u64 {
        *self.points.lock().unwrap()
    }
}

impl IntensityProvider for FakeBackend {
    fn get_intensity(
        &self,
        _region: &str,
    ) -> impl Future<Output = Result<CarbonIntensitySample, GreenMachineError>> + Send {
        self.intensity_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.fail_intensity.load(Ordering::SeqCst);
        let result: Result<CarbonIntensitySample, GreenMachineError> = if failing {
            Err(FetchError::Injected {
                resource: "carbon intensity",
            }
            .into())
        } else if let Some(forecast) = self.intensity_forecast.lock().unwrap().clone() {
            Ok(forecast)
        } else {
            let mut levels = self.levels.lock().unwrap();
            let level = if levels.len() > 1 {
                levels.remove(0)
            } else {
                levels.first().copied().unwrap_or(CarbonIntensityLevel::Medium)
            };
            Ok(sample(level))
        };
        async move { result }
    }
}

impl ApplianceGateway for FakeBackend {
    fn get_state(&self) -> impl Future<Output = Result<ApplianceState, GreenMachineError>> + Send {
        let state = self.state();
        async move { Ok(state) }
    }

    fn set_state(
        &self,
        is_on: bool,
        actor: ControlMode,
    ) -> impl Future<Output = Result<ApplianceState, GreenMachineError>> + Send {
        self.set_state_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.fail_set_state.load(Ordering::SeqCst);
        let result: Result<ApplianceState, GreenMachineError> = if failing {
            Err(StateConflictError::Injected.into())
        } else {
            let mut state = self.state.lock().unwrap();
            *state = state.transition(is_on, actor, now());
            Ok(*state)
        };
        async move { result }
    }
}

impl PreferenceStore for FakeBackend {
    fn get_preferences(
        &self,
    ) -> impl Future<Output = Result<UserPreferences, GreenMachineError>> + Send {
        let prefs = self.preferences.lock().unwrap().clone();
        let latency = self.latency;
        async move {
            delay(latency).await;
            Ok(prefs)
        }
    }

    fn save_preferences(
        &self,
        preferences: UserPreferences,
    ) -> impl Future<Output = Result<UserPreferences, GreenMachineError>> + Send {
        *self.preferences.lock().unwrap() = preferences.clone();
        let latency = self.latency;
        async move {
            delay(latency).await;
            Ok(preferences)
        }
    }
}

impl PointsStore for FakeBackend {
    fn get_points(&self) -> impl Future<Output = Result<u64, GreenMachineError>> + Send {
        let points = self.points();
        async move { Ok(points) }
    }

    fn award_points(
        &self,
        points: u64,
    ) -> impl Future<Output = Result<u64, GreenMachineError>> + Send {
        let result: Result<u64, GreenMachineError> =
            if self.fail_award_points.load(Ordering::SeqCst) {
                Err(GreenMachineError::Upstream("points ledger unavailable".into()))
            } else {
                let mut balance = self.points.lock().unwrap();
                *balance = balance.saturating_add(points);
                Ok(*balance)
            };
        async move { result }
    }
}

async fn delay(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[derive(Default)]
pub(crate) struct RecordingPublisher {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingPublisher {
    pub(crate) fn types(&self) -> Vec<EventType> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.event_type)
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), GreenMachineError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}

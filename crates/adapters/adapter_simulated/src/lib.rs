//! # greenmachine-adapter-simulated
//!
//! Simulated provider that stands in for a grid-intensity API and a smart
//! plug. Every call sleeps for a configurable latency; faults can be injected
//! with a configurable probability.
//!
//! ## Simulated data
//!
//! | Port | Behaviour |
//! |------|-----------|
//! | `IntensityProvider` | Cycles HIGH → MEDIUM → LOW → MEDIUM, one step per read, with a 24 h forecast |
//! | `ApplianceGateway` | Switches the appliance; may fail with a state conflict and roll back |
//! | `PreferenceStore` | Holds preferences in memory |
//! | `PointsStore` | Holds the points ledger in memory |
//!
//! ## Dependency rule
//!
//! Depends on `greenmachine-app` (port traits) and `greenmachine-domain` only.

mod grid;
mod store;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use greenmachine_app::ports::{ApplianceGateway, IntensityProvider, PointsStore, PreferenceStore};
use greenmachine_domain::appliance::{ApplianceState, ControlMode};
use greenmachine_domain::error::{FetchError, GreenMachineError, StateConflictError};
use greenmachine_domain::intensity::CarbonIntensitySample;
use greenmachine_domain::preferences::UserPreferences;
use greenmachine_domain::time::now;

pub use grid::{FORECAST_HOURS, INTENSITY_CYCLE, IntensityCycle, SLOT_HOURS};
pub use store::SimulatedStore;

/// Default artificial latency of every call.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

/// Default chance that switching the appliance fails.
pub const DEFAULT_CONFLICT_PROBABILITY: f64 = 0.05;

/// Knobs of the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub latency: Duration,
    /// Chance in `[0, 1]` that `set_state` fails with a state conflict.
    pub conflict_probability: f64,
    /// Chance in `[0, 1]` that `get_intensity` fails.
    pub fetch_failure_probability: f64,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            conflict_probability: DEFAULT_CONFLICT_PROBABILITY,
            fetch_failure_probability: 0.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// No latency, no faults, fixed seed. Handy in tests.
    #[must_use]
    pub fn instant(seed: u64) -> Self {
        Self {
            latency: Duration::ZERO,
            conflict_probability: 0.0,
            fetch_failure_probability: 0.0,
            seed: Some(seed),
        }
    }
}

/// In-memory provider implementing every backend port.
pub struct SimulatedBackend {
    config: SimulationConfig,
    store: Mutex<SimulatedStore>,
    grid: Mutex<IntensityCycle>,
    rng: Mutex<StdRng>,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl SimulatedBackend {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_store(config, SimulatedStore::default())
    }

    /// Start from an explicit store instead of the defaults.
    #[must_use]
    pub fn with_store(config: SimulationConfig, store: SimulatedStore) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            store: Mutex::new(store),
            grid: Mutex::new(IntensityCycle::default()),
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Copy of the current in-memory records.
    #[must_use]
    pub fn snapshot(&self) -> SimulatedStore {
        self.lock_store().clone()
    }

    async fn delay(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }

    fn roll(&self, probability: f64) -> bool {
        probability > 0.0 && lock(&self.rng).r#gen::<f64>() < probability
    }

    fn lock_store(&self) -> MutexGuard<'_, SimulatedStore> {
        lock(&self.store)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl IntensityProvider for SimulatedBackend {
    async fn get_intensity(&self, region: &str) -> Result<CarbonIntensitySample, GreenMachineError> {
        self.delay().await;
        if self.roll(self.config.fetch_failure_probability) {
            tracing::debug!(region, "injected intensity fetch failure");
            return Err(FetchError::Injected {
                resource: "carbon intensity",
            }
            .into());
        }

        let sample = {
            let mut rng = lock(&self.rng);
            lock(&self.grid).next_sample(now(), &mut *rng)?
        };
        tracing::debug!(region, level = %sample.level, value = sample.value, "simulated intensity");
        Ok(sample)
    }
}

impl ApplianceGateway for SimulatedBackend {
    async fn get_state(&self) -> Result<ApplianceState, GreenMachineError> {
        self.delay().await;
        Ok(self.lock_store().appliance)
    }

    async fn set_state(
        &self,
        is_on: bool,
        actor: ControlMode,
    ) -> Result<ApplianceState, GreenMachineError> {
        self.delay().await;
        if self.roll(self.config.conflict_probability) {
            tracing::debug!(is_on, %actor, "injected appliance state conflict");
            return Err(StateConflictError::Injected.into());
        }

        let mut store = self.lock_store();
        store.appliance = store.appliance.transition(is_on, actor, now());
        tracing::debug!(
            power = store.appliance.power_label(),
            %actor,
            "simulated appliance switched"
        );
        Ok(store.appliance)
    }
}

impl PreferenceStore for SimulatedBackend {
    async fn get_preferences(&self) -> Result<UserPreferences, GreenMachineError> {
        self.delay().await;
        Ok(self.lock_store().preferences.clone())
    }

    async fn save_preferences(
        &self,
        preferences: UserPreferences,
    ) -> Result<UserPreferences, GreenMachineError> {
        self.delay().await;
        preferences.validate()?;
        self.lock_store().preferences = preferences.clone();
        Ok(preferences)
    }
}

impl PointsStore for SimulatedBackend {
    async fn get_points(&self) -> Result<u64, GreenMachineError> {
        self.delay().await;
        Ok(self.lock_store().points.balance())
    }

    async fn award_points(&self, points: u64) -> Result<u64, GreenMachineError> {
        self.delay().await;
        Ok(self.lock_store().points.award(points))
    }
}

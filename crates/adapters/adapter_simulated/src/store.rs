//! In-memory records backing the simulated provider.

use greenmachine_domain::appliance::ApplianceState;
use greenmachine_domain::points::PointsLedger;
use greenmachine_domain::preferences::UserPreferences;
use greenmachine_domain::time::now;

/// Everything the simulator persists between calls.
///
/// Owned by one [`SimulatedBackend`](crate::SimulatedBackend); nothing is
/// shared process-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedStore {
    pub appliance: ApplianceState,
    pub preferences: UserPreferences,
    pub points: PointsLedger,
}

impl Default for SimulatedStore {
    fn default() -> Self {
        Self {
            appliance: ApplianceState::off(now()),
            preferences: UserPreferences::default(),
            points: PointsLedger::default(),
        }
    }
}

impl SimulatedStore {
    /// Start with the given preferences, appliance off and no points.
    #[must_use]
    pub fn with_preferences(preferences: UserPreferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }
}

//! Green points: a counter that only ever goes up.

use serde::{Deserialize, Serialize};

/// Points awarded for running the appliance during a low-carbon period.
pub const GREEN_RUN_BONUS: u64 = 10;

/// Monotonically non-decreasing points balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointsLedger(u64);

impl PointsLedger {
    #[must_use]
    pub fn new(balance: u64) -> Self {
        Self(balance)
    }

    #[must_use]
    pub fn balance(self) -> u64 {
        self.0
    }

    /// Add `points` and return the new balance. Saturates instead of wrapping.
    pub fn award(&mut self, points: u64) -> u64 {
        self.0 = self.0.saturating_add(points);
        self.0
    }
}

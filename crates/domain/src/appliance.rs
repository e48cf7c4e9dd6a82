//! Appliance: the simulated smart plug and its single transition function.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Actor responsible for the most recent change of an appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Manual,
    Auto,
}

impl std::fmt::Display for ControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => f.write_str("manual"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

/// Current power state of the appliance.
///
/// `controlled_by` always names the actor of the last transition, which
/// is only ever produced by [`ApplianceState::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplianceState {
    pub is_on: bool,
    pub controlled_by: ControlMode,
    pub last_changed: Timestamp,
}

impl ApplianceState {
    /// An appliance that is off and under manual control.
    #[must_use]
    pub fn off(at: Timestamp) -> Self {
        Self {
            is_on: false,
            controlled_by: ControlMode::Manual,
            last_changed: at,
        }
    }

    /// Move the appliance to `is_on`, recording `actor` as responsible.
    #[must_use]
    pub fn transition(self, is_on: bool, actor: ControlMode, at: Timestamp) -> Self {
        Self {
            is_on,
            controlled_by: actor,
            last_changed: at,
        }
    }

    /// Whether automation currently holds the appliance.
    #[must_use]
    pub fn is_held_by_automation(&self) -> bool {
        self.controlled_by == ControlMode::Auto
    }

    /// `"ON"` or `"OFF"`, as shown in notifications.
    #[must_use]
    pub fn power_label(&self) -> &'static str {
        if self.is_on { "ON" } else { "OFF" }
    }
}

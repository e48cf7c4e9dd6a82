//! Automation decision engine: turns the current carbon intensity,
//! appliance state and preferences into an ordered list of effects.
//!
//! The engine is pure: it never performs IO and never mutates its inputs.
//! The application layer applies the returned [`Effect`]s in order and
//! stops at the first failure, so a failed transition never awards points
//! or notifies.
//!
//! | auto | level   | is_on | controlled_by | outcome                         |
//! |------|---------|-------|---------------|---------------------------------|
//! | off  | any     | any   | any           | no action                       |
//! | on   | LOW     | false | any           | on (auto) → +bonus → success    |
//! | on   | not LOW | true  | auto          | off (auto) → info               |
//! | on   | other   |       |               | no action                       |

use serde::Serialize;

use crate::appliance::{ApplianceState, ControlMode};
use crate::error::StateConflictError;
use crate::intensity::CarbonIntensityLevel;
use crate::notification::Severity;
use crate::points::GREEN_RUN_BONUS;
use crate::preferences::UserPreferences;

pub const AUTO_ON_MESSAGE: &str = "Appliance turned ON automatically (low carbon). Points earned!";
pub const AUTO_OFF_MESSAGE: &str =
    "Appliance turned OFF automatically (carbon intensity increased).";
pub const MANUAL_BONUS_MESSAGE: &str = "Bonus points for manual ON during low carbon!";

/// One side effect to apply, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Switch the appliance, recording `actor` as responsible.
    Transition { is_on: bool, actor: ControlMode },
    /// Add points to the ledger.
    AwardPoints { points: u64 },
    /// Raise a user-visible notification.
    Notify { message: String, severity: Severity },
}

/// Why the engine left the appliance alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoActionReason {
    AutoControlDisabled,
    /// Already on during a low-carbon period.
    AlreadyOn,
    /// Already off outside a low-carbon period.
    AlreadyOff,
    /// On outside a low-carbon period, but the user switched it on.
    ManualRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    NoAction { reason: NoActionReason },
    Act { effects: Vec<Effect> },
}

impl Decision {
    /// Effects to apply; empty for [`Decision::NoAction`].
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        match self {
            Self::NoAction { .. } => &[],
            Self::Act { effects } => effects,
        }
    }

    #[must_use]
    pub fn is_no_action(&self) -> bool {
        matches!(self, Self::NoAction { .. })
    }
}

/// The automation rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutomationDecisionEngine {
    bonus: u64,
}

impl Default for AutomationDecisionEngine {
    fn default() -> Self {
        Self {
            bonus: GREEN_RUN_BONUS,
        }
    }
}

impl AutomationDecisionEngine {
    /// Engine awarding `bonus` points per green run.
    #[must_use]
    pub fn with_bonus(bonus: u64) -> Self {
        Self { bonus }
    }

    #[must_use]
    pub fn bonus(&self) -> u64 {
        self.bonus
    }

    /// Decide what automation should do for the given inputs.
    #[must_use]
    pub fn decide(
        &self,
        level: CarbonIntensityLevel,
        state: &ApplianceState,
        prefs: &UserPreferences,
    ) -> Decision {
        if !prefs.auto_control_enabled {
            return Decision::NoAction {
                reason: NoActionReason::AutoControlDisabled,
            };
        }
        let notify = prefs.notifications.status_changes;

        match (level.is_low(), state.is_on) {
            (true, false) => {
                let mut effects = vec![
                    Effect::Transition {
                        is_on: true,
                        actor: ControlMode::Auto,
                    },
                    Effect::AwardPoints { points: self.bonus },
                ];
                if notify {
                    effects.push(Effect::Notify {
                        message: AUTO_ON_MESSAGE.to_string(),
                        severity: Severity::Success,
                    });
                }
                Decision::Act { effects }
            }
            (false, true) if state.is_held_by_automation() => {
                let mut effects = vec![Effect::Transition {
                    is_on: false,
                    actor: ControlMode::Auto,
                }];
                if notify {
                    effects.push(Effect::Notify {
                        message: AUTO_OFF_MESSAGE.to_string(),
                        severity: Severity::Info,
                    });
                }
                Decision::Act { effects }
            }
            (true, true) => Decision::NoAction {
                reason: NoActionReason::AlreadyOn,
            },
            (false, true) => Decision::NoAction {
                reason: NoActionReason::ManualRun,
            },
            (false, false) => Decision::NoAction {
                reason: NoActionReason::AlreadyOff,
            },
        }
    }

    /// Plan a user-initiated toggle.
    ///
    /// `latest_level` is the level of the most recent intensity sample, if
    /// one has been fetched.
    ///
    /// # Errors
    ///
    /// Returns [`StateConflictError::AutoControlActive`] while auto-control is
    /// enabled and automation made the last change.
    pub fn plan_manual_toggle(
        &self,
        state: &ApplianceState,
        prefs: &UserPreferences,
        latest_level: Option<CarbonIntensityLevel>,
    ) -> Result<Vec<Effect>, StateConflictError> {
        if prefs.auto_control_enabled && state.is_held_by_automation() {
            return Err(StateConflictError::AutoControlActive);
        }

        let is_on = !state.is_on;
        let bonus = is_on && latest_level.is_some_and(CarbonIntensityLevel::is_low);

        let mut effects = vec![Effect::Transition {
            is_on,
            actor: ControlMode::Manual,
        }];
        if bonus {
            effects.push(Effect::AwardPoints { points: self.bonus });
        }
        if prefs.notifications.status_changes {
            effects.push(Effect::Notify {
                message: format!(
                    "Appliance manually turned {}.",
                    if is_on { "ON" } else { "OFF" }
                ),
                severity: Severity::Info,
            });
        }
        if bonus {
            effects.push(Effect::Notify {
                message: MANUAL_BONUS_MESSAGE.to_string(),
                severity: Severity::Success,
            });
        }
        Ok(effects)
    }
}

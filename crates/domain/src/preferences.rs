//! User preferences and their explicit, validating merge.

use serde::{Deserialize, Serialize};

use crate::error::{GreenMachineError, ValidationError};

/// Region used until the user picks one.
pub const DEFAULT_REGION: &str = "GB";

/// Longest accepted region code.
pub const MAX_REGION_LEN: usize = 64;

/// Which notifications the user wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFlags {
    pub best_time_alerts: bool,
    pub status_changes: bool,
}

impl Default for NotificationFlags {
    fn default() -> Self {
        Self {
            best_time_alerts: true,
            status_changes: true,
        }
    }
}

/// Settings owned by the user. Read by the decision engine, never mutated by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub auto_control_enabled: bool,
    pub appliance_linked: bool,
    pub notifications: NotificationFlags,
    pub region: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            auto_control_enabled: false,
            appliance_linked: false,
            notifications: NotificationFlags::default(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

/// Partial update of [`NotificationFlags`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationFlagsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time_alerts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changes: Option<bool>,
}

/// Partial update of [`UserPreferences`].
///
/// Unknown keys are rejected when deserialising.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreferencesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_control_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appliance_linked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationFlagsPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl PreferencesPatch {
    /// Whether applying this patch may change what the engine decides.
    #[must_use]
    pub fn touches_auto_control(&self) -> bool {
        self.auto_control_enabled.is_some()
    }
}

impl UserPreferences {
    /// Apply `patch` on top of `self`, returning a new validated value.
    ///
    /// # Errors
    ///
    /// Returns [`GreenMachineError::Validation`] when the resulting region
    /// is empty or longer than [`MAX_REGION_LEN`].
    pub fn merge(&self, patch: &PreferencesPatch) -> Result<Self, GreenMachineError> {
        let mut merged = self.clone();
        if let Some(value) = patch.auto_control_enabled {
            merged.auto_control_enabled = value;
        }
        if let Some(value) = patch.appliance_linked {
            merged.appliance_linked = value;
        }
        if let Some(flags) = patch.notifications {
            if let Some(value) = flags.best_time_alerts {
                merged.notifications.best_time_alerts = value;
            }
            if let Some(value) = flags.status_changes {
                merged.notifications.status_changes = value;
            }
        }
        if let Some(region) = &patch.region {
            merged.region = region.trim().to_string();
        }
        merged.validate()?;
        Ok(merged)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GreenMachineError::Validation`] for an empty or oversized region.
    pub fn validate(&self) -> Result<(), GreenMachineError> {
        if self.region.is_empty() {
            return Err(ValidationError::EmptyRegion.into());
        }
        if self.region.chars().count() > MAX_REGION_LEN {
            return Err(ValidationError::RegionTooLong {
                max: MAX_REGION_LEN,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_manual_with_all_notifications() {
        let prefs = UserPreferences::default();
        assert!(!prefs.auto_control_enabled);
        assert!(!prefs.appliance_linked);
        assert!(prefs.notifications.best_time_alerts);
        assert!(prefs.notifications.status_changes);
        assert_eq!(prefs.region, DEFAULT_REGION);
    }

    #[test]
    fn should_leave_original_untouched_when_merging() {
        let prefs = UserPreferences::default();
        let patch = PreferencesPatch {
            auto_control_enabled: Some(true),
            ..PreferencesPatch::default()
        };
        let merged = prefs.merge(&patch).unwrap();
        assert!(merged.auto_control_enabled);
        assert!(!prefs.auto_control_enabled);
    }

    #[test]
    fn should_merge_nested_notification_flags_individually() {
        let prefs = UserPreferences::default();
        let patch = PreferencesPatch {
            notifications: Some(NotificationFlagsPatch {
                status_changes: Some(false),
                ..NotificationFlagsPatch::default()
            }),
            ..PreferencesPatch::default()
        };
        let merged = prefs.merge(&patch).unwrap();
        assert!(!merged.notifications.status_changes);
        assert!(merged.notifications.best_time_alerts);
    }

    #[test]
    fn should_trim_region() {
        let patch = PreferencesPatch {
            region: Some("  FR  ".to_string()),
            ..PreferencesPatch::default()
        };
        let merged = UserPreferences::default().merge(&patch).unwrap();
        assert_eq!(merged.region, "FR");
    }

    #[test]
    fn should_reject_blank_region() {
        let patch = PreferencesPatch {
            region: Some("   ".to_string()),
            ..PreferencesPatch::default()
        };
        let result = UserPreferences::default().merge(&patch);
        assert!(matches!(
            result,
            Err(GreenMachineError::Validation(ValidationError::EmptyRegion))
        ));
    }

    #[test]
    fn should_reject_oversized_region() {
        let patch = PreferencesPatch {
            region: Some("x".repeat(MAX_REGION_LEN + 1)),
            ..PreferencesPatch::default()
        };
        let result = UserPreferences::default().merge(&patch);
        assert!(matches!(
            result,
            Err(GreenMachineError::Validation(
                ValidationError::RegionTooLong { .. }
            ))
        ));
    }

    #[test]
    fn should_reject_unknown_keys_in_patch() {
        let json = serde_json::json!({ "auto_control_enabled": true, "colour": "green" });
        assert!(serde_json::from_value::<PreferencesPatch>(json).is_err());
    }

    #[test]
    fn should_report_auto_control_touch() {
        let patch: PreferencesPatch =
            serde_json::from_value(serde_json::json!({ "auto_control_enabled": false })).unwrap();
        assert!(patch.touches_auto_control());
        assert!(!PreferencesPatch::default().touches_auto_control());
    }
}

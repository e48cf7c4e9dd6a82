//! Carbon intensity: discretised grid intensity samples and forecasts.

use serde::{Deserialize, Serialize};

use crate::error::{GreenMachineError, ValidationError};
use crate::time::{self, Timestamp};

/// Unit every sample is expressed in.
pub const INTENSITY_UNIT: &str = "gCO2eq/kWh";

/// Discretised instantaneous grid carbon intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CarbonIntensityLevel {
    Low,
    Medium,
    High,
}

impl CarbonIntensityLevel {
    /// Representative value of the level, in [`INTENSITY_UNIT`].
    #[must_use]
    pub fn nominal_value(self) -> u32 {
        match self {
            Self::Low => 50,
            Self::Medium => 150,
            Self::High => 300,
        }
    }

    /// Half-width of the band values of this level are drawn from.
    #[must_use]
    pub fn spread(self) -> u32 {
        match self {
            Self::Low => 10,
            Self::Medium => 20,
            Self::High => 25,
        }
    }

    #[must_use]
    pub fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }
}

impl std::fmt::Display for CarbonIntensityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => f.write_str("LOW"),
            Self::Medium => f.write_str("MEDIUM"),
            Self::High => f.write_str("HIGH"),
        }
    }
}

/// A forecasted window of grid intensity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSlot {
    pub id: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub level: CarbonIntensityLevel,
    pub value: u32,
}

impl ForecastSlot {
    /// Whether `ts` falls inside this slot.
    #[must_use]
    pub fn covers(&self, ts: Timestamp) -> bool {
        time::within(ts, self.start_time, self.end_time)
    }
}

/// One reading from the intensity provider, replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarbonIntensitySample {
    pub level: CarbonIntensityLevel,
    pub value: u32,
    pub unit: String,
    pub forecast: Vec<ForecastSlot>,
}

impl CarbonIntensitySample {
    /// Build a sample in the default unit and check its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GreenMachineError::Validation`] when the forecast is not
    /// ordered or contains an inverted slot.
    pub fn new(
        level: CarbonIntensityLevel,
        value: u32,
        forecast: Vec<ForecastSlot>,
    ) -> Result<Self, GreenMachineError> {
        let sample = Self {
            level,
            value,
            unit: INTENSITY_UNIT.to_string(),
            forecast,
        };
        sample.validate()?;
        Ok(sample)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GreenMachineError::Validation`] when:
    /// - `unit` is empty ([`ValidationError::EmptyUnit`])
    /// - a slot does not end after it starts ([`ValidationError::InvertedForecastSlot`])
    /// - slots are not sorted by start time ([`ValidationError::UnorderedForecast`])
    pub fn validate(&self) -> Result<(), GreenMachineError> {
        if self.unit.is_empty() {
            return Err(ValidationError::EmptyUnit.into());
        }
        let mut previous_start: Option<Timestamp> = None;
        for slot in &self.forecast {
            if slot.end_time <= slot.start_time {
                return Err(ValidationError::InvertedForecastSlot {
                    id: slot.id.clone(),
                }
                .into());
            }
            if previous_start.is_some_and(|prev| slot.start_time < prev) {
                return Err(ValidationError::UnorderedForecast {
                    id: slot.id.clone(),
                }
                .into());
            }
            previous_start = Some(slot.start_time);
        }
        Ok(())
    }

    /// The low-carbon forecast slot covering `now`, if any.
    #[must_use]
    pub fn optimal_slot_at(&self, now: Timestamp) -> Option<&ForecastSlot> {
        self.forecast
            .iter()
            .find(|slot| slot.level.is_low() && slot.covers(now))
    }

    /// The first `limit` low-carbon slots, in forecast order.
    #[must_use]
    pub fn recommended_slots(&self, limit: usize) -> Vec<&ForecastSlot> {
        self.forecast
            .iter()
            .filter(|slot| slot.level.is_low())
            .take(limit)
            .collect()
    }
}

//! Simulated grid: cycles through intensity levels and invents a forecast.

use rand::Rng;

use greenmachine_domain::error::GreenMachineError;
use greenmachine_domain::intensity::{CarbonIntensityLevel, CarbonIntensitySample, ForecastSlot};
use greenmachine_domain::time::{Timestamp, plus_hours};

/// Levels visited in order, one step per read.
pub const INTENSITY_CYCLE: [CarbonIntensityLevel; 4] = [
    CarbonIntensityLevel::High,
    CarbonIntensityLevel::Medium,
    CarbonIntensityLevel::Low,
    CarbonIntensityLevel::Medium,
];

/// Hours covered by the forecast.
pub const FORECAST_HOURS: u32 = 24;

/// Width of one forecast slot, in hours.
pub const SLOT_HOURS: u32 = 2;

/// Position in [`INTENSITY_CYCLE`].
#[derive(Debug, Default)]
pub struct IntensityCycle {
    index: usize,
}

impl IntensityCycle {
    /// Advance the cycle and build a sample for `now`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the generated forecast is inconsistent.
    pub fn next_sample<R: Rng>(
        &mut self,
        now: Timestamp,
        rng: &mut R,
    ) -> Result<CarbonIntensitySample, GreenMachineError> {
        self.index = (self.index + 1) % INTENSITY_CYCLE.len();
        let level = INTENSITY_CYCLE[self.index];
        let value = jittered_value(level, rng);

        let mut forecast_index = self.index;
        let forecast = (0..FORECAST_HOURS)
            .step_by(SLOT_HOURS as usize)
            .map(|offset| {
                forecast_index = (forecast_index + rng.gen_range(1..=2)) % INTENSITY_CYCLE.len();
                let slot_level = INTENSITY_CYCLE[forecast_index];
                ForecastSlot {
                    id: format!("forecast-{offset}"),
                    start_time: plus_hours(now, offset),
                    end_time: plus_hours(now, offset + SLOT_HOURS),
                    level: slot_level,
                    value: jittered_value(slot_level, rng),
                }
            })
            .collect();

        CarbonIntensitySample::new(level, value, forecast)
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> CarbonIntensityLevel {
        INTENSITY_CYCLE[self.index]
    }
}

/// Nominal value for `level`, shifted by up to its spread either way.
fn jittered_value<R: Rng>(level: CarbonIntensityLevel, rng: &mut R) -> u32 {
    let spread = level.spread();
    level.nominal_value() - spread + rng.gen_range(0..2 * spread)
}

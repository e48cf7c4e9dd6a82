//! Provider ports: the data backend the services drive.
//!
//! The only implementation shipped is the in-memory simulator in
//! `greenmachine-adapter-simulated`; a real smart-plug or grid API would
//! implement the same traits.

use std::future::Future;

use greenmachine_domain::appliance::{ApplianceState, ControlMode};
use greenmachine_domain::error::GreenMachineError;
use greenmachine_domain::intensity::CarbonIntensitySample;
use greenmachine_domain::preferences::UserPreferences;

/// Source of carbon-intensity samples.
pub trait IntensityProvider {
    /// Fetch the current intensity and forecast for `region`.
    ///
    /// Successive calls are not expected to return the same sample.
    fn get_intensity(
        &self,
        region: &str,
    ) -> impl Future<Output = Result<CarbonIntensitySample, GreenMachineError>> + Send;
}

/// Access to the controlled appliance.
pub trait ApplianceGateway {
    /// Read the current appliance state.
    fn get_state(&self) -> impl Future<Output = Result<ApplianceState, GreenMachineError>> + Send;

    /// Switch the appliance to `is_on`, recording `actor` as responsible.
    ///
    /// On failure the appliance must be left exactly as it was.
    fn set_state(
        &self,
        is_on: bool,
        actor: ControlMode,
    ) -> impl Future<Output = Result<ApplianceState, GreenMachineError>> + Send;
}

/// Storage for user preferences.
pub trait PreferenceStore {
    fn get_preferences(
        &self,
    ) -> impl Future<Output = Result<UserPreferences, GreenMachineError>> + Send;

    /// Replace the stored preferences wholesale.
    fn save_preferences(
        &self,
        preferences: UserPreferences,
    ) -> impl Future<Output = Result<UserPreferences, GreenMachineError>> + Send;
}

/// The green points ledger.
pub trait PointsStore {
    fn get_points(&self) -> impl Future<Output = Result<u64, GreenMachineError>> + Send;

    /// Add `points` and return the new balance.
    fn award_points(&self, points: u64)
    -> impl Future<Output = Result<u64, GreenMachineError>> + Send;
}

/// Everything the services need from a backend.
pub trait Backend:
    IntensityProvider + ApplianceGateway + PreferenceStore + PointsStore + Send + Sync + 'static
{
}

impl<T> Backend for T where
    T: IntensityProvider + ApplianceGateway + PreferenceStore + PointsStore + Send + Sync + 'static
{
}

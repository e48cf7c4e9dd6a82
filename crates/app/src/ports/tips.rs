//! Tip generation port: optional text-completion backend.

use std::future::Future;

use greenmachine_domain::error::GreenMachineError;

/// Generates a short energy-saving tip from a prompt.
pub trait TipGenerator {
    /// Ask the backend to complete `prompt`.
    ///
    /// Returns `Ok(None)` when the backend answered without any text.
    fn generate_tip(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<Option<String>, GreenMachineError>> + Send;
}

//! Tip service: an energy-saving tip, never failing.

use crate::ports::TipGenerator;

pub const TIP_PROMPT: &str = "Provide a short, practical energy-saving tip related to home appliances, suitable for a general audience. Keep it under 150 characters.";

pub const MISSING_KEY_TIP: &str =
    "Consider unplugging electronics when not in use to save energy. (API Key not configured)";

pub const EMPTY_ANSWER_TIP: &str = "Could not retrieve a tip at this moment. Try adjusting your appliance usage based on current energy demand.";

/// Returns a tip from the configured generator, or a canned fallback.
///
/// A `None` generator means no API key was configured.
pub struct TipService<T> {
    generator: Option<T>,
}

impl<T: TipGenerator> TipService<T> {
    pub fn new(generator: Option<T>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Always yields text; failures are folded into the fallback tip.
    #[tracing::instrument(skip(self))]
    pub async fn energy_saving_tip(&self) -> String {
        let Some(generator) = &self.generator else {
            tracing::debug!("tip generator not configured");
            return MISSING_KEY_TIP.to_string();
        };

        match generator.generate_tip(TIP_PROMPT).await {
            Ok(Some(tip)) if !tip.trim().is_empty() => tip.trim().to_string(),
            Ok(_) => EMPTY_ANSWER_TIP.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "tip generation failed");
                format!(
                    "Failed to fetch tip: {}. Try using appliances during off-peak hours.",
                    err.user_message()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenmachine_domain::error::{FetchError, GreenMachineError};
    use std::future::Future;

    struct StubGenerator(Result<Option<String>, &'static str>);

    impl TipGenerator for StubGenerator {
        fn generate_tip(
            &self,
            prompt: &str,
        ) -> impl Future<Output = Result<Option<String>, GreenMachineError>> + Send {
            assert_eq!(prompt, TIP_PROMPT);
            let result: Result<Option<String>, GreenMachineError> =
                self.0.clone().map_err(|reason| {
                    FetchError::Unavailable {
                        resource: "tip",
                        reason: reason.to_string(),
                    }
                    .into()
                });
            async move { result }
        }
    }

    #[tokio::test]
    async fn should_return_canned_tip_without_generator() {
        let service = TipService::<StubGenerator>::new(None);

        assert!(!service.is_configured());
        assert_eq!(service.energy_saving_tip().await, MISSING_KEY_TIP);
    }

    #[tokio::test]
    async fn should_return_generated_tip() {
        let service = TipService::new(Some(StubGenerator(Ok(Some(
            " Run the dishwasher only when full. ".to_string(),
        )))));

        assert_eq!(
            service.energy_saving_tip().await,
            "Run the dishwasher only when full."
        );
    }

    #[tokio::test]
    async fn should_fall_back_on_empty_answer() {
        let service = TipService::new(Some(StubGenerator(Ok(None))));
        assert_eq!(service.energy_saving_tip().await, EMPTY_ANSWER_TIP);

        let blank = TipService::new(Some(StubGenerator(Ok(Some("  ".to_string())))));
        assert_eq!(blank.energy_saving_tip().await, EMPTY_ANSWER_TIP);
    }

    #[tokio::test]
    async fn should_fold_failure_into_tip() {
        let service = TipService::new(Some(StubGenerator(Err("quota exceeded"))));

        assert_eq!(
            service.energy_saving_tip().await,
            "Failed to fetch tip: tip unavailable: quota exceeded. Try using appliances during off-peak hours."
        );
    }
}

//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`GreenMachineError`] via `#[from]`.

/// Top-level error crossing every port boundary.
#[derive(Debug, thiserror::Error)]
pub enum GreenMachineError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("state conflict")]
    StateConflict(#[from] StateConflictError),

    #[error("fetch failure")]
    Fetch(#[from] FetchError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// Adapter-specific failure that does not map onto a domain kind.
    #[error("upstream error")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl GreenMachineError {
    /// Human readable message of the wrapped error, suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::StateConflict(err) => err.to_string(),
            Self::Fetch(err) => err.to_string(),
            Self::NotFound(err) => err.to_string(),
            Self::Upstream(err) => err.to_string(),
        }
    }
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("region must not be empty")]
    EmptyRegion,

    #[error("region must be at most {max} characters")]
    RegionTooLong { max: usize },

    #[error("forecast slot {id} must end after it starts")]
    InvertedForecastSlot { id: String },

    #[error("forecast slot {id} is out of order")]
    UnorderedForecast { id: String },

    #[error("intensity unit must not be empty")]
    EmptyUnit,
}

/// The appliance could not be switched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateConflictError {
    /// Synthetic failure simulating a race with the physical appliance.
    #[error("Simulated error: Appliance state conflict.")]
    Injected,

    /// A manual toggle was attempted while automation holds the appliance.
    #[error("Appliance is under automatic control. Disable auto-control to switch it manually.")]
    AutoControlActive,
}

/// A provider call did not produce data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Synthetic failure simulating a dropped request.
    #[error("Simulated error: failed to fetch {resource}.")]
    Injected { resource: &'static str },

    /// The remote side answered with something unusable.
    #[error("{resource} unavailable: {reason}")]
    Unavailable {
        resource: &'static str,
        reason: String,
    },
}

/// A lookup by id returned nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

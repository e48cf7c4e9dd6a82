//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.
//! Services that mutate shared state go through a common [`ServiceContext`].

pub mod appliance_service;
pub mod automation_service;
pub mod context;
pub mod dashboard_service;
pub mod intensity_service;
pub mod notification_service;
pub mod preference_service;
pub mod tip_service;

#[cfg(test)]
pub(crate) mod testing;

pub use context::ServiceContext;

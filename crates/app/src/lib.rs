//! # greenmachine-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `IntensityProvider`: current carbon intensity and forecast
//!   - `ApplianceGateway`: read and switch the appliance
//!   - `PreferenceStore`: load and save user preferences
//!   - `PointsStore`: read and award green points
//!   - `EventPublisher`: broadcast domain events
//!   - `TipGenerator`: optional text-generation backend
//! - Define **driving/inbound** use-case services:
//!   - `AutomationService`: run the decision engine and apply its effects
//!   - `ApplianceService`: manual toggles
//!   - `PreferenceService`: validated preference updates
//!   - `IntensityService`: refresh and best-time alerts
//!   - `DashboardService`: aggregate view and initial load
//!   - `NotificationService`: ephemeral toasts
//!   - `TipService`: energy-saving tips with fallbacks
//! - Provide **in-process infrastructure** (event bus, refresh loop) that
//!   doesn't need IO
//!
//! ## Dependency rule
//! Depends on `greenmachine-domain` only (plus `tokio` for sync and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod refresh_loop;
pub mod services;

//! # greenmachine-domain
//!
//! Pure domain model for the Green Machine energy-optimisation demo.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **carbon intensity** samples and forecasts
//! - Define the **appliance state** and its single transition function
//! - Define **user preferences** and their validating merge
//! - Define the **points ledger** and **notifications**
//! - Define **events** broadcast to observers
//! - Host the **automation decision engine**: the pure rule that turns
//!   (intensity, appliance, preferences) into an ordered list of effects
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod appliance;
pub mod decision;
pub mod event;
pub mod intensity;
pub mod notification;
pub mod points;
pub mod preferences;

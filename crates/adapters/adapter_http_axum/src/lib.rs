//! # greenmachine-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** over the application services
//!   (`/api/dashboard`, `/api/appliance/toggle`, `/api/preferences`, …)
//! - Stream domain events to browsers over **Server-Sent Events**
//!   (`/api/events/stream`)
//! - Map application errors onto HTTP status codes
//!
//! ## Dependency rule
//! Depends on `greenmachine-app` (for port traits and services) and
//! `greenmachine-domain` (for types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

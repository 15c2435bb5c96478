//! Core library components.
//!
//! Domain types, the reconcilers that plan changes, and the orchestrator
//! that applies them through a transport.

pub mod cancel;
pub mod classify;
pub mod config;
pub mod constants;
pub mod domain;
pub mod orchestrator;
pub mod reconcile;
pub mod snapshot;
pub mod transport;
pub mod types;

//! Transport abstraction.
//!
//! The orchestrator issues [`Operation`]s through a [`Transport`] and only
//! ever sees the decoded JSON response or an [`ApiFailure`]. Authentication,
//! serialization and retries belong to the transport.
//!
//! ## Implementations
//!
//! - **memory**: in-process platform double. Always available.
//! - **http**: blocking HTTP client. Feature-gated (`http`).

use serde_json::Value;

use crate::core::cancel::Cancellation;
use crate::core::classify::ApiFailure;

pub mod memory;
mod operation;

#[cfg(feature = "http")]
pub mod http;

pub use memory::MemoryPlatform;
pub use operation::{Method, Operation};

/// Executes remote operations.
pub trait Transport {
    /// Execute one operation.
    ///
    /// `cancel` is passed unchanged from the caller; implementations should
    /// abandon the request when it is set.
    ///
    /// # Errors
    ///
    /// Returns the raw `ApiFailure`; classification happens in the caller.
    fn execute(&self, op: &Operation, cancel: &Cancellation) -> Result<Value, ApiFailure>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, op: &Operation, cancel: &Cancellation) -> Result<Value, ApiFailure> {
        (**self).execute(op, cancel)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, op: &Operation, cancel: &Cancellation) -> Result<Value, ApiFailure> {
        (**self).execute(op, cancel)
    }
}

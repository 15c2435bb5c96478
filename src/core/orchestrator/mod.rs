//! The primary interface for remote operations.
//!
//! The orchestrator owns a [`Transport`] and the platform settings. It reads
//! remote state, asks a reconciler for a plan, and issues the plan one
//! operation at a time: creates, then updates, then deletes.
//!
//! Failure policy, applied per batch:
//! - NotFound on a read means the resource is gone (`Ok(None)`).
//! - NotFound on a delete counts as done.
//! - Any other failure stops the batch. Nothing is rolled back.
//! - Cancellation is checked before every operation.

mod env;
mod project;
mod shared;
mod team;

pub use project::{ProjectSnapshot, TeamSnapshot};

use serde_json::Value;
use tracing::{debug, trace};

use crate::core::cancel::Cancellation;
use crate::core::classify::{ApiFailure, FailureKind};
use crate::core::config::PlatformConfig;
use crate::core::transport::{Operation, Transport};
use crate::error::{ApplyError, Error, OpContext, OpKind, Result};

/// The outcome of a reconciliation pass.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    /// The desired records with remote identifiers attached.
    pub merged: Vec<T>,
    /// Operations issued, in order.
    pub completed: Vec<OpContext>,
}

/// Issues reconciliation plans against the platform.
pub struct Orchestrator<T: Transport> {
    transport: T,
    platform: PlatformConfig,
    cancel: Cancellation,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(transport: T, platform: PlatformConfig) -> Self {
        Self {
            transport,
            platform,
            cancel: Cancellation::new(),
        }
    }

    /// Use a caller-owned cancellation flag.
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn platform(&self) -> &PlatformConfig {
        &self.platform
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The explicit team, or the configured default.
    fn team(&self, explicit: Option<&str>) -> Option<String> {
        self.platform.team_for(explicit)
    }

    fn call(&self, op: &Operation) -> std::result::Result<Value, ApiFailure> {
        if self.cancel.is_cancelled() {
            return Err(ApiFailure::cancelled());
        }
        trace!(op = %op, "issuing operation");
        self.transport.execute(op, &self.cancel)
    }

    /// Issue a read. NotFound yields `Ok(None)`.
    fn read(&self, ctx: OpContext, op: &Operation) -> Result<Option<Value>> {
        match self.call(op) {
            Ok(value) => Ok(Some(value)),
            Err(failure) if failure.is_not_found() => {
                debug!(op = %ctx, "resource not found");
                Ok(None)
            }
            Err(failure) => Err(failed(ctx, &failure).into()),
        }
    }

    /// Issue a read that must find its resource.
    fn read_existing(&self, ctx: OpContext, op: &Operation) -> Result<Value> {
        self.call(op).map_err(|failure| failed(ctx, &failure).into())
    }

    /// Start a batch of `pending` operations.
    fn batch(&self, pending: usize) -> Batch<'_> {
        Batch {
            cancel: &self.cancel,
            completed: Vec::new(),
            pending,
        }
    }
}

/// Tracks one batch of mutating operations.
struct Batch<'a> {
    cancel: &'a Cancellation,
    completed: Vec<OpContext>,
    pending: usize,
}

impl Batch<'_> {
    /// Issue one operation through `send`.
    ///
    /// `send` covers the call and decoding its response, so a response that
    /// can't be used stops the batch like any other failure. Returns
    /// `Ok(None)` for a delete whose target was already gone.
    fn issue<R, F>(&mut self, ctx: OpContext, send: F) -> Result<Option<R>>
    where
        F: FnOnce() -> std::result::Result<R, ApiFailure>,
    {
        if self.cancel.is_cancelled() {
            return Err(self.abort(None, true));
        }

        match send() {
            Ok(value) => {
                debug!(op = %ctx, "applied");
                self.pending = self.pending.saturating_sub(1);
                self.completed.push(ctx);
                Ok(Some(value))
            }
            Err(failure) if ctx.kind == OpKind::Delete && failure.is_not_found() => {
                debug!(op = %ctx, "already deleted");
                self.pending = self.pending.saturating_sub(1);
                self.completed.push(ctx);
                Ok(None)
            }
            Err(failure) if failure.is_cancelled() => Err(self.abort(None, true)),
            Err(failure) => {
                self.pending = self.pending.saturating_sub(1);
                let err = failed(ctx, &failure);
                Err(self.abort(Some(err), false))
            }
        }
    }

    fn abort(&mut self, failed: Option<ApplyError>, cancelled: bool) -> Error {
        match failed {
            Some(err) if self.completed.is_empty() && !cancelled => err.into(),
            failed => {
                debug!(
                    completed = self.completed.len(),
                    abandoned = self.pending,
                    cancelled,
                    "batch stopped"
                );
                ApplyError::Partial {
                    completed: std::mem::take(&mut self.completed),
                    failed: failed.map(Box::new),
                    abandoned: self.pending,
                    cancelled,
                }
                .into()
            }
        }
    }

    fn finish(self) -> Vec<OpContext> {
        self.completed
    }
}

/// Decode a create response.
///
/// Entries the platform listed under `failed` and bodies `decode` rejects
/// both come back as failures.
fn created<R>(
    response: Value,
    decode: impl FnOnce(Value) -> Result<R>,
) -> std::result::Result<R, ApiFailure> {
    if let Some(rejected) = ApiFailure::from_rejected(&response) {
        return Err(rejected);
    }
    decode(response).map_err(|e| ApiFailure::invalid_response(e.to_string()))
}

/// Wrap a transport failure for one operation.
///
/// NotFound on a create or update means the parent is missing, which the
/// caller can't fix by retrying, so it is reported as fatal.
fn failed(op: OpContext, failure: &ApiFailure) -> ApplyError {
    let kind = match (failure.kind(), op.kind) {
        (FailureKind::NotFound, OpKind::Create | OpKind::Update) => FailureKind::Fatal,
        (kind, _) => kind,
    };
    ApplyError::Failed {
        op,
        kind,
        message: failure.to_string(),
    }
}

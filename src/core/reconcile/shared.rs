//! Shared environment variable reconciliation.
//!
//! Matched on `(key, target set)`. A changed value or project list is an
//! in-place update.

use tracing::debug;

use super::{compute, Plan, Reconcilable};
use crate::core::domain::{validate_shared_set, SharedEnvironmentVariable, SharedMatchKey};
use crate::error::Result;

impl Reconcilable for SharedEnvironmentVariable {
    type Key = SharedMatchKey;

    fn match_key(&self) -> SharedMatchKey {
        SharedEnvironmentVariable::match_key(self)
    }

    fn remote_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_remote_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn needs_update(&self, remote: &Self) -> bool {
        self.value != remote.value || self.project_ids != remote.project_ids
    }

    fn label(&self) -> String {
        SharedEnvironmentVariable::label(self)
    }
}

/// Plan shared variable operations.
pub fn plan(
    desired: &[SharedEnvironmentVariable],
    remote: &[SharedEnvironmentVariable],
) -> Result<Plan<SharedEnvironmentVariable>> {
    validate_shared_set(desired)?;

    let plan = compute(desired, remote);
    debug!(
        create = plan.to_create.len(),
        update = plan.to_update.len(),
        delete = plan.to_delete.len(),
        "planned shared environment variables"
    );
    Ok(plan)
}

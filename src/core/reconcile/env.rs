//! Environment variable reconciliation.
//!
//! Variables are matched on `(key, target set, git branch)`. Changing the
//! target set of a key is a delete of the old record plus a create of the
//! new one; the platform has no in-place target edit for this identity.
//!
//! The platform never returns plaintext values on read. For matched records
//! the declared value is authoritative: any difference from what the remote
//! reported (including an opaque or missing value) is planned as an update
//! that keeps the remote ID.

use tracing::debug;

use super::{compute, Plan, Reconcilable};
use crate::core::domain::{validate_set, EnvMatchKey, EnvironmentVariable};
use crate::error::Result;

impl Reconcilable for EnvironmentVariable {
    type Key = EnvMatchKey;

    fn match_key(&self) -> EnvMatchKey {
        EnvironmentVariable::match_key(self)
    }

    fn remote_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_remote_id(&mut self, id: String) {
        self.id = Some(id);
    }

    // an empty remote value is unknown, not empty
    fn needs_update(&self, remote: &Self) -> bool {
        remote.value.is_empty() || self.value != remote.value
    }

    fn label(&self) -> String {
        EnvironmentVariable::label(self)
    }
}

/// Plan the operations that bring `remote` in line with `desired`.
///
/// # Errors
///
/// Returns `ReconcileError` if `desired` fails validation (empty key or
/// target, branch outside preview, or conflicting entries).
pub fn plan(
    desired: &[EnvironmentVariable],
    remote: &[EnvironmentVariable],
) -> Result<Plan<EnvironmentVariable>> {
    validate_set(desired)?;

    let plan = compute(desired, remote);
    debug!(
        create = plan.to_create.len(),
        update = plan.to_update.len(),
        delete = plan.to_delete.len(),
        unchanged = plan.unchanged.len(),
        "planned environment variables"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::Target;
    use crate::core::reconcile::{matched_ids, merge};

    fn var(key: &str, value: &str, targets: &[Target]) -> EnvironmentVariable {
        EnvironmentVariable::new(key, value, targets.iter().copied())
    }

    #[test]
    fn test_value_change_is_single_update_keeping_id() {
        let desired = vec![var("A", "1", &[Target::Production])];
        let remote = vec![var("A", "<opaque>", &[Target::Production]).with_id("env_1")];

        let plan = plan(&desired, &remote).unwrap();

        assert!(plan.to_create.is_empty());
        assert!(plan.to_delete.is_empty());
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].old.id.as_deref(), Some("env_1"));
        assert_eq!(plan.to_update[0].new.value.expose(), "1");
    }

    #[test]
    fn test_target_change_is_delete_plus_create() {
        let desired = vec![var("A", "1", &[Target::Production, Target::Preview])];
        let remote = vec![var("A", "1", &[Target::Production]).with_id("env_1")];

        let plan = plan(&desired, &remote).unwrap();

        assert!(plan.to_update.is_empty());
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_delete.len(), 1);
        assert_eq!(plan.to_delete[0].id.as_deref(), Some("env_1"));
    }

    #[test]
    fn test_branch_is_part_of_identity() {
        let desired = vec![var("A", "1", &[Target::Preview]).with_branch("staging")];
        let remote = vec![var("A", "1", &[Target::Preview]).with_id("env_1")];

        let plan = plan(&desired, &remote).unwrap();
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_delete.len(), 1);
    }

    #[test]
    fn test_disjoint_sets() {
        let desired = vec![var("A", "1", &[Target::Production]), var("B", "2", &[Target::Preview])];
        let remote = vec![var("C", "x", &[Target::Production]).with_id("env_c")];

        let plan = plan(&desired, &remote).unwrap();
        assert_eq!(plan.to_create, desired);
        assert_eq!(plan.to_delete, remote);
        assert!(plan.to_update.is_empty());
    }

    #[test]
    fn test_same_key_different_targets_not_merged() {
        let desired = vec![
            var("A", "prod", &[Target::Production]),
            var("A", "prev", &[Target::Preview]),
        ];
        let remote = vec![
            var("A", "prod", &[Target::Production]).with_id("env_1"),
            var("A", "old", &[Target::Preview]).with_id("env_2"),
        ];

        let plan = plan(&desired, &remote).unwrap();
        assert_eq!(plan.unchanged.len(), 1);
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].old.id.as_deref(), Some("env_2"));
        assert!(plan.to_create.is_empty());
        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_plan_against_itself_is_empty() {
        let desired = vec![
            var("A", "1", &[Target::Production]).with_id("env_1"),
            var("B", "2", &[Target::Preview]).with_branch("feature").with_id("env_2"),
        ];
        assert!(plan(&desired, &desired).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_remote_value_is_always_updated() {
        let desired = vec![var("A", "", &[Target::Production])];
        let remote = vec![var("A", "", &[Target::Production]).with_id("env_1")];

        let plan = plan(&desired, &remote).unwrap();
        assert!(plan.to_create.is_empty() && plan.to_delete.is_empty());
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].old.id.as_deref(), Some("env_1"));
    }

    #[test]
    fn test_conflicting_desired_is_rejected() {
        let desired = vec![
            var("A", "1", &[Target::Production]),
            var("A", "2", &[Target::Production]),
        ];
        assert!(plan(&desired, &[]).is_err());
    }

    #[test]
    fn test_merge_carries_remote_ids_and_local_values() {
        let desired = vec![var("A", "local", &[Target::Production])];
        let remote = vec![var("A", "<opaque>", &[Target::Production]).with_id("env_1")];

        let plan = plan(&desired, &remote).unwrap();
        let merged = merge(&desired, &matched_ids(&plan));

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id.as_deref(), Some("env_1"));
        assert_eq!(merged[0].value.expose(), "local");
    }
}

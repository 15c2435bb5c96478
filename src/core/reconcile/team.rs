//! Team membership reconciliation.
//!
//! Only role and confirmation state are reconciled. Members join through
//! invitations and are removed by the platform, so a desired roster never
//! creates or deletes anyone, and remote members missing from it are left
//! alone.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::core::domain::{Role, TeamMember};
use crate::core::types::MemberUid;
use crate::error::{ReconcileError, Result};

/// A member's declared role.
///
/// `uid` must come from a prior read; it is never derived from the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<MemberUid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default = "default_confirmed")]
    pub confirmed: bool,
}

fn default_confirmed() -> bool {
    true
}

impl DesiredMember {
    pub fn new(uid: impl Into<String>, role: Role) -> Self {
        Self {
            uid: Some(uid.into()),
            email: None,
            role,
            confirmed: true,
        }
    }

    fn describe(&self, index: usize) -> String {
        match (&self.uid, &self.email) {
            (Some(uid), _) => format!("uid {} is not a member of the team", uid),
            (None, Some(email)) => format!("{} has no uid", email),
            (None, None) => format!("members[{}] has no uid", index),
        }
    }
}

/// A role/confirmation change for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberUpdate {
    pub uid: MemberUid,
    pub role: Role,
    pub confirmed: bool,
    pub previous_role: Role,
    pub previous_confirmed: bool,
}

impl MemberUpdate {
    /// JSON body for the update request.
    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({ "confirmed": self.confirmed, "role": self.role })
    }
}

/// Plan member updates.
///
/// # Errors
///
/// Returns `ReconcileError::MemberUnresolved` for a desired member with no
/// UID, or whose UID is not in the remote roster.
pub fn plan(desired: &[DesiredMember], remote: &[TeamMember]) -> Result<Vec<MemberUpdate>> {
    let roster: HashMap<&str, &TeamMember> = remote.iter().map(|m| (m.uid.as_str(), m)).collect();
    let mut updates = Vec::new();

    for (index, want) in desired.iter().enumerate() {
        let current = want
            .uid
            .as_deref()
            .and_then(|uid| roster.get(uid))
            .ok_or_else(|| ReconcileError::MemberUnresolved {
                member: want.describe(index),
            })?;

        if current.role != want.role || current.confirmed != want.confirmed {
            updates.push(MemberUpdate {
                uid: current.uid.clone(),
                role: want.role,
                confirmed: want.confirmed,
                previous_role: current.role,
                previous_confirmed: current.confirmed,
            });
        }
    }

    debug!(
        desired = desired.len(),
        remote = remote.len(),
        updates = updates.len(),
        "planned team members"
    );
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::VcsIdentities;
    use crate::error::Error;

    fn member(uid: &str, role: Role, confirmed: bool) -> TeamMember {
        TeamMember {
            uid: uid.to_string(),
            role,
            confirmed,
            email: format!("{}@example.com", uid),
            username: uid.to_string(),
            vcs: VcsIdentities::default(),
            joined_from: None,
        }
    }

    #[test]
    fn test_role_change_produces_update() {
        let remote = vec![member("u1", Role::Viewer, true), member("u2", Role::Owner, true)];
        let desired = vec![DesiredMember::new("u1", Role::Developer)];

        let updates = plan(&desired, &remote).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].uid, "u1");
        assert_eq!(updates[0].role, Role::Developer);
        assert_eq!(updates[0].previous_role, Role::Viewer);
    }

    #[test]
    fn test_unlisted_members_are_not_touched() {
        let remote = vec![member("u1", Role::Owner, true), member("u2", Role::Viewer, false)];
        let desired = vec![DesiredMember::new("u1", Role::Owner)];
        assert!(plan(&desired, &remote).unwrap().is_empty());
    }

    #[test]
    fn test_confirmation_change_produces_update() {
        let remote = vec![member("u1", Role::Member, false)];
        let desired = vec![DesiredMember::new("u1", Role::Member)];

        let updates = plan(&desired, &remote).unwrap();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].confirmed);
        assert!(!updates[0].previous_confirmed);
    }

    #[test]
    fn test_missing_uid_is_unresolved() {
        let remote = vec![member("u1", Role::Member, true)];
        let desired = vec![DesiredMember {
            uid: None,
            email: Some("u1@example.com".to_string()),
            role: Role::Owner,
            confirmed: true,
        }];

        match plan(&desired, &remote).unwrap_err() {
            Error::Reconcile(ReconcileError::MemberUnresolved { member }) => {
                assert_eq!(member, "u1@example.com has no uid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_uid_is_unresolved() {
        let desired = vec![DesiredMember::new("ghost", Role::Owner)];
        assert!(matches!(
            plan(&desired, &[]).unwrap_err(),
            Error::Reconcile(ReconcileError::MemberUnresolved { .. })
        ));
    }
}

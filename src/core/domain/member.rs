//! Team members.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::Provider;
use crate::core::types::MemberUid;
use crate::error::Result;

/// A member's role within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Member,
    Developer,
    Viewer,
    Billing,
    Contributor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Member => "MEMBER",
            Role::Developer => "DEVELOPER",
            Role::Viewer => "VIEWER",
            Role::Billing => "BILLING",
            Role::Contributor => "CONTRIBUTOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// VCS logins attached to a member. At most one is set per record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VcsIdentities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitbucket: Option<String>,
}

impl VcsIdentities {
    /// The provider and login, if any is set.
    pub fn primary(&self) -> Option<(Provider, &str)> {
        self.github
            .as_deref()
            .map(|l| (Provider::Github, l))
            .or_else(|| self.gitlab.as_deref().map(|l| (Provider::Gitlab, l)))
            .or_else(|| self.bitbucket.as_deref().map(|l| (Provider::Bitbucket, l)))
    }
}

/// How a member joined the team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedFrom {
    /// e.g. `link`, `mail`, `import`, `github`, `saml`, `dsync`.
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_user_login: Option<String>,
}

/// A member of a team, as last read from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub uid: MemberUid,
    pub role: Role,
    pub confirmed: bool,
    pub email: String,
    pub username: String,
    pub vcs: VcsIdentities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_from: Option<JoinedFrom>,
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

/// `joinedFrom` is a bare origin string in roster listings and an object
/// in membership payloads.
#[derive(Deserialize)]
#[serde(untagged)]
enum JoinedFromField {
    Origin(String),
    #[serde(rename_all = "camelCase")]
    Detail {
        origin: String,
        #[serde(default)]
        sso_user_id: Option<String>,
        #[serde(default)]
        git_user_login: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteMember {
    uid: MemberUid,
    role: Role,
    #[serde(default)]
    confirmed: bool,
    #[serde(default)]
    email: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    github: Option<Login>,
    #[serde(default)]
    gitlab: Option<Login>,
    #[serde(default)]
    bitbucket: Option<Login>,
    #[serde(default)]
    joined_from: Option<JoinedFromField>,
}

impl From<RemoteMember> for TeamMember {
    fn from(m: RemoteMember) -> Self {
        let joined_from = m.joined_from.map(|j| match j {
            JoinedFromField::Origin(origin) => JoinedFrom {
                origin,
                sso_user_id: None,
                git_user_login: None,
            },
            JoinedFromField::Detail {
                origin,
                sso_user_id,
                git_user_login,
            } => JoinedFrom {
                origin,
                sso_user_id,
                git_user_login,
            },
        });

        TeamMember {
            uid: m.uid,
            role: m.role,
            confirmed: m.confirmed,
            email: m.email,
            username: m.username,
            vcs: VcsIdentities {
                github: m.github.map(|l| l.login),
                gitlab: m.gitlab.map(|l| l.login),
                bitbucket: m.bitbucket.map(|l| l.login),
            },
            joined_from,
        }
    }
}

/// Decode a roster response: `{"members": [...]}` or a bare array.
pub fn parse_roster(response: Value) -> Result<Vec<TeamMember>> {
    let items = match response {
        Value::Object(mut map) => map.remove("members").unwrap_or(Value::Array(Vec::new())),
        other => other,
    };
    let remote: Vec<RemoteMember> = serde_json::from_value(items)?;
    Ok(remote.into_iter().map(TeamMember::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_roster_with_vcs_logins() {
        let roster = parse_roster(json!({
            "members": [
                {
                    "uid": "u1", "role": "OWNER", "confirmed": true,
                    "email": "a@example.com", "username": "alice",
                    "github": { "login": "alice-gh" },
                    "joinedFrom": "link"
                },
                {
                    "uid": "u2", "role": "DEVELOPER", "confirmed": false,
                    "email": "b@example.com", "username": "bob",
                    "bitbucket": { "login": "bob-bb" },
                    "joinedFrom": { "origin": "saml", "ssoUserId": "sso_9" }
                }
            ]
        }))
        .unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].vcs.primary(), Some((Provider::Github, "alice-gh")));
        assert_eq!(roster[0].joined_from.as_ref().unwrap().origin, "link");

        // bitbucket logins land in the bitbucket slot, not gitlab
        assert_eq!(roster[1].vcs.gitlab, None);
        assert_eq!(roster[1].vcs.bitbucket.as_deref(), Some("bob-bb"));
        let joined = roster[1].joined_from.as_ref().unwrap();
        assert_eq!(joined.sso_user_id.as_deref(), Some("sso_9"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!(parse_roster(json!([{ "uid": "u1", "role": "GOD" }])).is_err());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Developer).unwrap(), "\"DEVELOPER\"");
        assert_eq!(Role::Viewer.to_string(), "VIEWER");
    }
}

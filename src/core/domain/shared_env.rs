//! Shared environment variables.
//!
//! Owned by a team and fanned out to a set of projects.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use super::env_var::{TargetField, TargetSet};
use super::{SecretValue, Target};
use crate::core::constants::ENV_TYPE_ENCRYPTED;
use crate::core::types::{EnvId, EnvKey, ProjectId, TeamId};
use crate::error::{ReconcileError, Result};

/// A team-owned environment variable linked to zero or more projects.
///
/// An empty `project_ids` set applies the variable team-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedEnvironmentVariable {
    pub key: EnvKey,
    pub value: SecretValue,
    pub target: TargetSet,
    #[serde(default)]
    pub project_ids: BTreeSet<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EnvId>,
}

/// Identity of a shared variable: key and exact target set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SharedMatchKey {
    pub key: EnvKey,
    pub target: TargetSet,
}

impl SharedEnvironmentVariable {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<SecretValue>,
        target: impl IntoIterator<Item = Target>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            target: TargetSet::new(target),
            project_ids: BTreeSet::new(),
            team_id: None,
            id: None,
        }
    }

    /// Link the variable to the given projects.
    pub fn for_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.project_ids = projects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn match_key(&self) -> SharedMatchKey {
        SharedMatchKey {
            key: self.key.clone(),
            target: self.target.clone(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} [{}] (shared)", self.key, self.target)
    }

    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(ReconcileError::EmptyKey.into());
        }
        if self.target.is_empty() {
            return Err(ReconcileError::EmptyTarget {
                key: self.key.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// JSON body for create requests.
    pub fn to_create_body(&self) -> Value {
        serde_json::json!({
            "evs": [{ "key": self.key, "value": self.value.expose() }],
            "type": ENV_TYPE_ENCRYPTED,
            "target": self.target.to_wire(),
            "projectId": self.project_ids,
        })
    }

    /// JSON body for update requests.
    pub fn to_update_body(&self) -> Value {
        serde_json::json!({
            "key": self.key,
            "value": self.value.expose(),
            "type": ENV_TYPE_ENCRYPTED,
            "target": self.target.to_wire(),
            "projectId": self.project_ids,
        })
    }
}

/// Validate a desired set of shared variables.
///
/// # Errors
///
/// Returns `ReconcileError::Conflict` when two entries share a key and a target.
pub fn validate_shared_set(vars: &[SharedEnvironmentVariable]) -> Result<()> {
    for var in vars {
        var.validate()?;
    }
    for (i, a) in vars.iter().enumerate() {
        for b in &vars[i + 1..] {
            if a.key == b.key && a.target.overlaps(&b.target) {
                return Err(ReconcileError::Conflict {
                    key: a.key.clone(),
                    target: a.target.intersection(&b.target).to_string(),
                    git_branch: None,
                }
                .into());
            }
        }
    }
    Ok(())
}

/// A shared variable as returned by the platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSharedRecord {
    pub id: EnvId,
    pub key: EnvKey,
    #[serde(default)]
    value: Option<String>,
    target: TargetField,
    #[serde(default, alias = "projectIds")]
    project_id: Vec<ProjectId>,
    #[serde(default, alias = "ownerId")]
    team_id: Option<TeamId>,
}

impl RemoteSharedRecord {
    /// Decode a single record; create responses wrap it in `created`.
    pub fn from_response(response: Value) -> Result<Self> {
        let record = match response {
            Value::Object(mut map) if map.contains_key("created") => {
                match map.remove("created").unwrap_or(Value::Null) {
                    Value::Array(items) => items.into_iter().next().ok_or_else(|| {
                        serde_json::Error::custom("create response has an empty `created` list")
                    })?,
                    other => other,
                }
            }
            other => other,
        };
        Ok(serde_json::from_value(record)?)
    }

    /// Decode a list response: `{"data": [...]}` or a bare array.
    pub fn list_from_response(response: Value) -> Result<Vec<Self>> {
        let items = match response {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Array(Vec::new())),
            other => other,
        };
        Ok(serde_json::from_value(items)?)
    }

    pub fn into_variable(self) -> SharedEnvironmentVariable {
        SharedEnvironmentVariable {
            key: self.key,
            value: SecretValue::new(self.value.unwrap_or_default()),
            target: self.target.into_set(),
            project_ids: self.project_id.into_iter().collect(),
            team_id: self.team_id,
            id: Some(self.id),
        }
    }
}

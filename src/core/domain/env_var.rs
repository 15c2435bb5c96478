//! Project environment variables.
//!
//! An environment variable is keyed upstream by its exact combination of
//! key, target set and git branch. The same key may appear several times
//! with different targets.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::SecretValue;
use crate::core::constants::OPAQUE_ENV_TYPES;
use crate::core::types::{EnvId, EnvKey, ProjectId};
use crate::error::{ReconcileError, Result};

/// A deployment environment a variable applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Production,
    Preview,
    Development,
}

impl Target {
    /// Wire name of the target.
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Production => "production",
            Target::Preview => "preview",
            Target::Development => "development",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = ReconcileError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "production" => Ok(Target::Production),
            "preview" => Ok(Target::Preview),
            "development" => Ok(Target::Development),
            other => Err(ReconcileError::InvalidTarget(other.to_string())),
        }
    }
}

/// The set of targets a variable applies to.
///
/// Compared as a whole: `{production, preview}` and `{production}` are
/// different identities, not overlapping edits of one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSet(BTreeSet<Target>);

impl TargetSet {
    pub fn new(targets: impl IntoIterator<Item = Target>) -> Self {
        Self(targets.into_iter().collect())
    }

    pub fn contains(&self, target: Target) -> bool {
        self.0.contains(&target)
    }

    /// Whether the two sets share at least one target.
    pub fn overlaps(&self, other: &TargetSet) -> bool {
        self.0.intersection(&other.0).next().is_some()
    }

    /// Targets present in both sets.
    pub fn intersection(&self, other: &TargetSet) -> TargetSet {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    /// Whether the set is exactly `{preview}`.
    pub fn is_preview_only(&self) -> bool {
        self.0.len() == 1 && self.contains(Target::Preview)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Target> + '_ {
        self.0.iter().copied()
    }

    /// Wire representation, in stable order.
    pub fn to_wire(&self) -> Vec<&'static str> {
        self.iter().map(|t| t.as_str()).collect()
    }
}

impl FromIterator<Target> for TargetSet {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire().join(","))
    }
}

/// Identity of a variable upstream: key, exact target set, git branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvMatchKey {
    pub key: EnvKey,
    pub target: TargetSet,
    pub git_branch: Option<String>,
}

/// An environment variable attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub key: EnvKey,
    pub value: SecretValue,
    pub target: TargetSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EnvId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_id: ProjectId,
}

impl EnvironmentVariable {
    /// Create a variable that has not been created upstream yet.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<SecretValue>,
        target: impl IntoIterator<Item = Target>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            target: TargetSet::new(target),
            git_branch: None,
            id: None,
            project_id: String::new(),
        }
    }

    /// Scope the variable to a git branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.git_branch = Some(branch.into());
        self
    }

    /// Attach a remote identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the owning project.
    pub fn in_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn match_key(&self) -> EnvMatchKey {
        EnvMatchKey {
            key: self.key.clone(),
            target: self.target.clone(),
            git_branch: self.git_branch.clone(),
        }
    }

    /// Human-readable identity, e.g. `API_KEY [production,preview]@staging`.
    pub fn label(&self) -> String {
        match &self.git_branch {
            Some(branch) => format!("{} [{}]@{}", self.key, self.target, branch),
            None => format!("{} [{}]", self.key, self.target),
        }
    }

    /// Check the single-record invariants.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` for an empty key, an empty target set, or a
    /// git branch on anything other than exactly `{preview}`.
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
        if let Some(branch) = &self.git_branch {
            if !self.target.is_preview_only() {
                return Err(ReconcileError::BranchOutsidePreview {
                    key: self.key.clone(),
                    branch: branch.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// JSON body for create and update requests.
    pub fn to_request_body(&self) -> Value {
        let mut body = serde_json::json!({
            "key": self.key,
            "value": self.value.expose(),
            "target": self.target.to_wire(),
            "type": crate::core::constants::ENV_TYPE_ENCRYPTED,
        });
        if let Some(branch) = &self.git_branch {
            body["gitBranch"] = Value::String(branch.clone());
        }
        body
    }
}

/// Validate a full desired set.
///
/// Besides the per-record checks, two records with the same key and git
/// branch must not share any target.
///
/// # Errors
///
/// Returns `ReconcileError::Conflict` naming the key and the shared targets.
pub fn validate_set(vars: &[EnvironmentVariable]) -> Result<()> {
    for var in vars {
        var.validate()?;
    }

    for (i, a) in vars.iter().enumerate() {
        for b in &vars[i + 1..] {
            if a.key == b.key && a.git_branch == b.git_branch && a.target.overlaps(&b.target) {
                return Err(ReconcileError::Conflict {
                    key: a.key.clone(),
                    target: a.target.intersection(&b.target).to_string(),
                    git_branch: a.git_branch.clone(),
                }
                .into());
            }
        }
    }

    Ok(())
}

/// `target` arrives either as a single string or as an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TargetField {
    One(Target),
    Many(Vec<Target>),
}

impl TargetField {
    pub(crate) fn into_set(self) -> TargetSet {
        match self {
            TargetField::One(t) => TargetSet::new([t]),
            TargetField::Many(ts) => TargetSet::new(ts),
        }
    }
}

/// An environment variable record as returned by the platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEnvRecord {
    pub id: EnvId,
    pub key: EnvKey,
    #[serde(default)]
    value: Option<String>,
    target: TargetField,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    decrypted: Option<bool>,
}

impl RemoteEnvRecord {
    /// Decode a single record from a create, read or update response.
    ///
    /// Create responses may wrap the record as `{"created": {...}}` or
    /// `{"created": [{...}]}`.
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

    /// Decode a list response: `{"envs": [...]}` or a bare array.
    pub fn list_from_response(response: Value) -> Result<Vec<Self>> {
        let items = match response {
            Value::Object(mut map) => map.remove("envs").unwrap_or(Value::Array(Vec::new())),
            other => other,
        };
        Ok(serde_json::from_value(items)?)
    }

    /// Whether `value` holds usable plaintext.
    fn has_plaintext(&self) -> bool {
        if self.decrypted == Some(true) {
            return self.value.is_some();
        }
        let opaque = self
            .kind
            .as_deref()
            .map_or(true, |k| OPAQUE_ENV_TYPES.contains(&k));
        !opaque && self.value.is_some()
    }

    /// Convert into the desired-state shape.
    ///
    /// Encrypted, secret and sensitive values come back empty: the
    /// ciphertext says nothing about the plaintext, so the planner treats an
    /// empty remote value as unknown.
    pub fn into_variable(self, project_id: &str) -> EnvironmentVariable {
        let value = if self.has_plaintext() {
            self.value.unwrap_or_default()
        } else {
            String::new()
        };
        EnvironmentVariable {
            key: self.key,
            value: SecretValue::new(value),
            target: self.target.into_set(),
            git_branch: self.git_branch,
            id: Some(self.id),
            project_id: project_id.to_string(),
        }
    }
}

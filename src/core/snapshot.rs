//! Saved remote state.
//!
//! A snapshot is a JSON file holding raw platform responses, so a plan can
//! be computed offline:
//!
//! ```json
//! {
//!   "project": { "id": "prj_123", "link": { "type": "github", "org": "acme", "repo": "web" } },
//!   "envs": { "envs": [ ... ] },
//!   "shared": { "data": [ ... ] },
//!   "members": { "members": [ ... ] }
//! }
//! ```
//!
//! Every section is optional and accepts either the wrapped list response
//! or a bare array.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::core::domain::{
    link_from_project, parse_roster, EnvironmentVariable, RemoteEnvRecord, RemoteSharedRecord,
    RepositoryLink, SharedEnvironmentVariable, TeamMember,
};
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteSnapshot {
    #[serde(default)]
    project: Option<Value>,
    #[serde(default)]
    envs: Option<Value>,
    #[serde(default)]
    shared: Option<Value>,
    #[serde(default)]
    members: Option<Value>,
}

impl RemoteSnapshot {
    /// Read a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the file can't be read, or a
    /// decode error if it isn't JSON.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading remote snapshot");
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Project environment variables, scoped to `project_id`.
    pub fn envs(&self, project_id: &str) -> Result<Vec<EnvironmentVariable>> {
        let Some(raw) = self.envs.clone() else {
            return Ok(Vec::new());
        };
        Ok(RemoteEnvRecord::list_from_response(raw)?
            .into_iter()
            .map(|record| record.into_variable(project_id))
            .collect())
    }

    pub fn shared(&self) -> Result<Vec<SharedEnvironmentVariable>> {
        let Some(raw) = self.shared.clone() else {
            return Ok(Vec::new());
        };
        Ok(RemoteSharedRecord::list_from_response(raw)?
            .into_iter()
            .map(RemoteSharedRecord::into_variable)
            .collect())
    }

    pub fn members(&self) -> Result<Vec<TeamMember>> {
        match self.members.clone() {
            Some(raw) => parse_roster(raw),
            None => Ok(Vec::new()),
        }
    }

    /// The project's repository link, if the snapshot has one.
    pub fn link(&self) -> Result<Option<RepositoryLink>> {
        match &self.project {
            Some(project) => link_from_project(project),
            None => Ok(None),
        }
    }
}

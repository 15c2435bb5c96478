//! Composite import identifiers.
//!
//! Resources are imported by a `/`-separated identifier whose leading team
//! segment is optional: `team/project/env` and `project/env` both name a
//! project environment variable. When the team is left out, the configured
//! default team applies.

use std::fmt;

use crate::core::config::PlatformConfig;
use crate::error::{ImportIdError, Result};

/// Segments after the team for project environment variables.
pub const PROJECT_ENV_ARITY: usize = 2;

/// Segments after the team for shared environment variables.
pub const SHARED_ENV_ARITY: usize = 1;

/// A team import names only the team.
pub const TEAM_ARITY: usize = 0;

/// A decoded import identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeId {
    pub team: Option<String>,
    pub rest: Vec<String>,
}

impl CompositeId {
    /// Decode a `team/project/resource` or `project/resource` identifier.
    ///
    /// # Errors
    ///
    /// Returns `ImportIdError::Malformed` for any other segment count.
    pub fn decode(raw: &str) -> Result<Self> {
        Self::decode_with_arity(raw, PROJECT_ENV_ARITY)
    }

    /// Decode an identifier with `arity` segments after the optional team.
    ///
    /// `arity + 1` segments carry a team; exactly `arity` segments don't.
    /// An empty team segment (`/project/env`) means no team. Every other
    /// segment must be non-empty.
    pub fn decode_with_arity(raw: &str, arity: usize) -> Result<Self> {
        let segments: Vec<&str> = raw.split('/').collect();

        let (team, rest) = if segments.len() == arity + 1 {
            let team = Some(segments[0]).filter(|t| !t.is_empty() || arity == TEAM_ARITY);
            (team.map(str::to_string), &segments[1..])
        } else if segments.len() == arity {
            (None, &segments[..])
        } else {
            return Err(malformed(raw, arity));
        };

        let team_missing = arity == TEAM_ARITY && team.as_deref().map_or(true, str::is_empty);
        if team_missing || rest.iter().any(|s| s.is_empty()) {
            return Err(malformed(raw, arity));
        }

        Ok(Self {
            team,
            rest: rest.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Build an identifier from its parts.
    pub fn new<I, S>(team: Option<&str>, rest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            team: team.map(str::to_string),
            rest: rest.into_iter().map(Into::into).collect(),
        }
    }

    /// Encode back into the `/`-separated form.
    pub fn encode(&self) -> String {
        self.team
            .iter()
            .chain(self.rest.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// The explicit team, or the configured default.
    pub fn resolve_team(&self, platform: &PlatformConfig) -> Option<String> {
        platform.team_for(self.team.as_deref())
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn malformed(raw: &str, arity: usize) -> crate::error::Error {
    let expected = match arity {
        PROJECT_ENV_ARITY => "\"team_id/project_id/env_id\" or \"project_id/env_id\"".to_string(),
        SHARED_ENV_ARITY => "\"team_id/env_id\" or \"env_id\"".to_string(),
        TEAM_ARITY => "\"team_id\"".to_string(),
        n => format!("{} or {} segments separated by '/'", n + 1, n),
    };
    ImportIdError::Malformed {
        id: raw.to_string(),
        expected,
    }
    .into()
}

/// A project environment variable import, with the team resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvImport {
    pub team: Option<String>,
    pub project_id: String,
    pub env_id: String,
}

impl ResolvedEnvImport {
    /// Decode `team/project/env` or `project/env`.
    pub fn resolve(raw: &str, platform: &PlatformConfig) -> Result<Self> {
        let id = CompositeId::decode_with_arity(raw, PROJECT_ENV_ARITY)?;
        let team = id.resolve_team(platform);
        match <[String; PROJECT_ENV_ARITY]>::try_from(id.rest) {
            Ok([project_id, env_id]) => Ok(Self {
                team,
                project_id,
                env_id,
            }),
            Err(_) => Err(malformed(raw, PROJECT_ENV_ARITY)),
        }
    }
}

/// A shared environment variable import, with the team resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSharedImport {
    pub team: Option<String>,
    pub env_id: String,
}

impl ResolvedSharedImport {
    /// Decode `team/env` or `env`.
    pub fn resolve(raw: &str, platform: &PlatformConfig) -> Result<Self> {
        let mut id = CompositeId::decode_with_arity(raw, SHARED_ENV_ARITY)?;
        let team = id.resolve_team(platform);
        match id.rest.pop() {
            Some(env_id) => Ok(Self { team, env_id }),
            None => Err(malformed(raw, SHARED_ENV_ARITY)),
        }
    }
}

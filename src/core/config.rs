//! Configuration file management.
//!
//! Handles reading, writing, and validating `.platsync.toml` configuration
//! files. The file holds both the platform connection settings and the
//! desired state to reconcile.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::domain::{
    validate_set, validate_shared_set, EnvironmentVariable, SharedEnvironmentVariable,
};
use crate::core::reconcile::DesiredMember;
use crate::core::types::{ProjectId, TeamId};
use crate::error::{ConfigError, ReconcileError, Result};

/// Platform connection settings.
///
/// Passed explicitly to everything that needs a team; there is no global
/// default team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Team used when an operation or import ID doesn't name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_team: Option<TeamId>,
    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_api_url() -> String {
    constants::DEFAULT_API_URL.to_string()
}

fn default_token_env() -> String {
    constants::DEFAULT_TOKEN_ENV.to_string()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            default_team: None,
            token_env: default_token_env(),
        }
    }
}

impl PlatformConfig {
    /// The explicit team if given, otherwise the default team.
    pub fn team_for(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_team.clone())
    }

    /// Like [`team_for`](Self::team_for), but a team is required.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoTeam` if neither is set.
    pub fn require_team(&self, explicit: Option<&str>) -> Result<String> {
        self.team_for(explicit).ok_or_else(|| ConfigError::NoTeam.into())
    }

    /// Read the API token from the configured environment variable.
    pub fn token(&self) -> Result<String> {
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ConfigError::MissingToken(self.token_env.clone()).into()),
        }
    }
}

/// The project whose variables are reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    pub id: ProjectId,
    /// Team owning the project; falls back to `platform.default_team`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamId>,
}

/// Project configuration stored in `.platsync.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectSection>,
    /// Desired project environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvironmentVariable>,
    /// Desired shared environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_env: Vec<SharedEnvironmentVariable>,
    /// Desired member roles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<DesiredMember>,
}

impl Config {
    /// Default configuration path in the current directory
    pub fn default_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Create a starter configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AlreadyInitialized` if `path` exists.
    pub fn init(path: &Path, project: Option<String>, team: Option<String>) -> Result<Self> {
        if path.exists() {
            return Err(ConfigError::AlreadyInitialized(path.display().to_string()).into());
        }

        let config = Self {
            platform: PlatformConfig {
                default_team: team,
                ..PlatformConfig::default()
            },
            project: project.map(|id| ProjectSection { id, team: None }),
            ..Self::default()
        };
        config.save(path)?;
        Ok(config)
    }

    /// Load configuration from `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotInitialized` if the file doesn't exist,
    /// or `ConfigError::Parse` if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotInitialized.into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;

        debug!(
            env = config.env.len(),
            shared_env = config.shared_env.len(),
            members = config.members.len(),
            "config loaded"
        );

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate the configuration structure and contents
    ///
    /// Checks:
    /// - API URL is http(s)
    /// - Environment variables require a project
    /// - Desired variable sets have no conflicts
    /// - Every member entry carries a uid
    pub fn validate(&self) -> Result<()> {
        debug!("validating config");

        let url = &self.platform.api_url;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "platform.api_url",
                reason: format!("not an http(s) url: {}", url),
            }
            .into());
        }

        if let Some(project) = &self.project {
            if project.id.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "project.id" }.into());
            }
        } else if !self.env.is_empty() {
            return Err(ConfigError::MissingField { field: "project.id" }.into());
        }

        validate_set(&self.env)?;
        validate_shared_set(&self.shared_env)?;

        for (index, member) in self.members.iter().enumerate() {
            if member.uid.as_deref().map_or(true, str::is_empty) {
                let who = member
                    .email
                    .clone()
                    .unwrap_or_else(|| format!("members[{}]", index));
                return Err(ReconcileError::MemberUnresolved {
                    member: format!("{} has no uid", who),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Project ID, if configured.
    pub fn project_id(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.id.as_str())
    }

    /// Team owning the project.
    pub fn project_team(&self) -> Option<String> {
        let explicit = self.project.as_ref().and_then(|p| p.team.as_deref());
        self.platform.team_for(explicit)
    }

    /// Desired environment variables, scoped to the configured project.
    pub fn desired_env(&self) -> Vec<EnvironmentVariable> {
        let project = self.project_id().unwrap_or_default();
        self.env
            .iter()
            .cloned()
            .map(|var| var.in_project(project))
            .collect()
    }
}

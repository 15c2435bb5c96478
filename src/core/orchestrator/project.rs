//! Project and team reads.

use serde::Serialize;
use serde_json::Value;

use super::Orchestrator;
use crate::core::domain::{link_from_project, RepositoryLink};
use crate::core::transport::{Operation, Transport};
use crate::error::{OpContext, OpKind, Result};

/// A project as last read from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSnapshot {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<RepositoryLink>,
}

impl ProjectSnapshot {
    /// Decode a project payload, normalizing its link.
    pub fn from_value(project: &Value) -> Result<Self> {
        let field = |name: &str| {
            project
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Self {
            id: field("id"),
            name: field("name"),
            link: link_from_project(project)?,
        })
    }
}

/// A team as last read from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSnapshot {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl<T: Transport> Orchestrator<T> {
    /// Read a project. Returns `Ok(None)` if it doesn't exist.
    pub fn read_project(
        &self,
        team: Option<&str>,
        project_id: &str,
    ) -> Result<Option<ProjectSnapshot>> {
        let team = self.team(team);
        let op = Operation::get_project(project_id, team.as_deref());
        match self.read(
            OpContext::new(OpKind::Read, format!("project {}", project_id), None),
            &op,
        )? {
            Some(project) => Ok(Some(ProjectSnapshot::from_value(&project)?)),
            None => Ok(None),
        }
    }

    /// The project's normalized repository link.
    ///
    /// `None` when the project is missing, has no link, or is linked to an
    /// unsupported provider.
    pub fn read_project_link(
        &self,
        team: Option<&str>,
        project_id: &str,
    ) -> Result<Option<RepositoryLink>> {
        Ok(self
            .read_project(team, project_id)?
            .and_then(|project| project.link))
    }

    /// Read a team. Returns `Ok(None)` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoTeam` when no team is given or configured.
    pub fn read_team(&self, team: Option<&str>) -> Result<Option<TeamSnapshot>> {
        let team_id = self.platform.require_team(team)?;
        let op = Operation::get_team(&team_id);
        let Some(team) = self.read(
            OpContext::new(OpKind::Read, format!("team {}", team_id), None),
            &op,
        )?
        else {
            return Ok(None);
        };

        let field = |name: &str| team.get(name).and_then(Value::as_str).map(str::to_string);
        Ok(Some(TeamSnapshot {
            id: field("id").unwrap_or(team_id),
            slug: field("slug"),
            name: field("name"),
        }))
    }
}

//! Remote operations.
//!
//! An [`Operation`] is a fully formed request against a platform resource
//! path. Transports turn it into an HTTP call; the in-memory platform
//! routes it directly.

use serde_json::Value;
use std::fmt;

use crate::core::domain::{EnvironmentVariable, SharedEnvironmentVariable};
use crate::core::reconcile::MemberUpdate;

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request against a named resource path.
#[derive(Clone, PartialEq)]
pub struct Operation {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl fmt::Debug for Operation {
    // bodies carry secret values
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body", &self.body.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

impl Operation {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Scope the request to a team, if one is known.
    pub fn with_team(self, team: Option<&str>) -> Self {
        match team {
            Some(t) => self.with_query("teamId", t),
            None => self,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_project(project_id: &str, team: Option<&str>) -> Self {
        Self::new(Method::Get, format!("/v10/projects/{}", project_id)).with_team(team)
    }

    pub fn list_env(project_id: &str, team: Option<&str>) -> Self {
        Self::new(Method::Get, format!("/v9/projects/{}/env", project_id))
            .with_query("decrypt", "false")
            .with_team(team)
    }

    pub fn get_env(project_id: &str, team: Option<&str>, env_id: &str) -> Self {
        Self::new(Method::Get, format!("/v9/projects/{}/env/{}", project_id, env_id))
            .with_team(team)
    }

    pub fn create_env(project_id: &str, team: Option<&str>, var: &EnvironmentVariable) -> Self {
        Self::new(Method::Post, format!("/v10/projects/{}/env", project_id))
            .with_team(team)
            .with_body(var.to_request_body())
    }

    pub fn update_env(
        project_id: &str,
        team: Option<&str>,
        env_id: &str,
        var: &EnvironmentVariable,
    ) -> Self {
        Self::new(Method::Patch, format!("/v9/projects/{}/env/{}", project_id, env_id))
            .with_team(team)
            .with_body(var.to_request_body())
    }

    pub fn delete_env(project_id: &str, team: Option<&str>, env_id: &str) -> Self {
        Self::new(Method::Delete, format!("/v9/projects/{}/env/{}", project_id, env_id))
            .with_team(team)
    }

    pub fn create_shared_env(team: Option<&str>, var: &SharedEnvironmentVariable) -> Self {
        Self::new(Method::Post, "/v1/env")
            .with_team(team)
            .with_body(var.to_create_body())
    }

    pub fn list_shared_env(team: Option<&str>) -> Self {
        Self::new(Method::Get, "/v1/env").with_team(team)
    }

    pub fn get_shared_env(team: Option<&str>, env_id: &str) -> Self {
        Self::new(Method::Get, format!("/v1/env/{}", env_id)).with_team(team)
    }

    pub fn update_shared_env(
        team: Option<&str>,
        env_id: &str,
        var: &SharedEnvironmentVariable,
    ) -> Self {
        Self::new(Method::Patch, format!("/v1/env/{}", env_id))
            .with_team(team)
            .with_body(var.to_update_body())
    }

    pub fn delete_shared_env(team: Option<&str>, env_id: &str) -> Self {
        Self::new(Method::Delete, format!("/v1/env/{}", env_id)).with_team(team)
    }

    pub fn get_team(team_id: &str) -> Self {
        Self::new(Method::Get, format!("/v2/teams/{}", team_id))
    }

    pub fn list_members(team_id: &str) -> Self {
        Self::new(Method::Get, format!("/v2/teams/{}/members", team_id))
    }

    pub fn update_member(team_id: &str, update: &MemberUpdate) -> Self {
        Self::new(
            Method::Patch,
            format!("/v1/teams/{}/members/{}", team_id, update.uid),
        )
        .with_body(update.to_request_body())
    }
}

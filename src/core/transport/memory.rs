//! In-memory platform.
//!
//! Routes operations against in-process state the way the real platform
//! would: IDs are assigned on create, values are stored but only ever read
//! back encrypted, and missing resources answer 404. Failures and
//! cancellation can be injected to exercise partial batches.

use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{Method, Operation, Transport};
use crate::core::cancel::Cancellation;
use crate::core::classify::ApiFailure;
use crate::core::domain::{
    parse_roster, EnvironmentVariable, Role, SecretValue, SharedEnvironmentVariable, Target,
    TargetSet, TeamMember,
};
use crate::core::types::{ProjectId, TeamId};

#[derive(Default)]
struct State {
    next_id: u64,
    projects: BTreeMap<ProjectId, Value>,
    envs: BTreeMap<ProjectId, Vec<EnvironmentVariable>>,
    shared: Vec<SharedEnvironmentVariable>,
    teams: BTreeMap<TeamId, Vec<Value>>,
    calls: Vec<String>,
    failures: Vec<FailureRule>,
    cancel_after: Option<(usize, Cancellation)>,
}

struct FailureRule {
    method: Method,
    path_fragment: String,
    failure: ApiFailure,
}

/// An in-process stand-in for the platform API.
#[derive(Default)]
pub struct MemoryPlatform {
    state: RefCell<State>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project, optionally with a raw link payload.
    pub fn add_project(&self, project_id: &str, link: Option<Value>) {
        let mut st = self.state.borrow_mut();
        st.projects.insert(
            project_id.to_string(),
            json!({ "id": project_id, "name": project_id, "link": link }),
        );
        st.envs.entry(project_id.to_string()).or_default();
    }

    /// Seed an environment variable; returns its assigned ID.
    pub fn add_env(&self, project_id: &str, var: EnvironmentVariable) -> String {
        let mut st = self.state.borrow_mut();
        let id = st.next_env_id();
        let var = var.with_id(id.clone()).in_project(project_id);
        st.envs.entry(project_id.to_string()).or_default().push(var);
        id
    }

    /// Seed a shared environment variable; returns its assigned ID.
    pub fn add_shared(&self, var: SharedEnvironmentVariable) -> String {
        let mut st = self.state.borrow_mut();
        let id = st.next_env_id();
        st.shared.push(var.with_id(id.clone()));
        id
    }

    /// Register a team with no members.
    pub fn add_team(&self, team_id: &str) {
        self.state
            .borrow_mut()
            .teams
            .entry(team_id.to_string())
            .or_default();
    }

    /// Seed a team member.
    pub fn add_member(&self, team_id: &str, uid: &str, role: Role, confirmed: bool) {
        self.state
            .borrow_mut()
            .teams
            .entry(team_id.to_string())
            .or_default()
            .push(json!({
                "uid": uid,
                "role": role,
                "confirmed": confirmed,
                "email": format!("{}@example.com", uid),
                "username": uid,
                "joinedFrom": "mail",
            }));
    }

    /// Fail the next call whose method matches and whose path contains
    /// `path_fragment`.
    pub fn fail_when(&self, method: Method, path_fragment: &str, failure: ApiFailure) {
        self.state.borrow_mut().failures.push(FailureRule {
            method,
            path_fragment: path_fragment.to_string(),
            failure,
        });
    }

    /// Cancel `cancel` once `calls` more calls have been handled.
    pub fn cancel_after(&self, calls: usize, cancel: Cancellation) {
        let mut st = self.state.borrow_mut();
        let at = st.calls.len() + calls;
        st.cancel_after = Some((at, cancel));
    }

    /// Every call received, as `METHOD path`.
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Stored variables of a project, with plaintext values.
    pub fn envs(&self, project_id: &str) -> Vec<EnvironmentVariable> {
        self.state
            .borrow()
            .envs
            .get(project_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Stored shared variables, with plaintext values.
    pub fn shared(&self) -> Vec<SharedEnvironmentVariable> {
        self.state.borrow().shared.clone()
    }

    /// Current roster of a team.
    pub fn members(&self, team_id: &str) -> Vec<TeamMember> {
        let roster = self
            .state
            .borrow()
            .teams
            .get(team_id)
            .cloned()
            .unwrap_or_default();
        parse_roster(Value::Array(roster)).unwrap_or_default()
    }
}

impl Transport for MemoryPlatform {
    fn execute(&self, op: &Operation, cancel: &Cancellation) -> Result<Value, ApiFailure> {
        if cancel.is_cancelled() {
            return Err(ApiFailure::cancelled());
        }

        let mut st = self.state.borrow_mut();
        st.calls.push(op.to_string());

        let result = match st.take_failure(op) {
            Some(failure) => Err(failure),
            None => st.route(op),
        };

        if let Some((at, token)) = &st.cancel_after {
            if st.calls.len() >= *at {
                token.cancel();
            }
        }

        result
    }
}

impl State {
    fn next_env_id(&mut self) -> String {
        self.next_id += 1;
        format!("env_{}", self.next_id)
    }

    fn take_failure(&mut self, op: &Operation) -> Option<ApiFailure> {
        let pos = self
            .failures
            .iter()
            .position(|r| r.method == op.method && op.path.contains(&r.path_fragment))?;
        Some(self.failures.remove(pos).failure)
    }

    fn route(&mut self, op: &Operation) -> Result<Value, ApiFailure> {
        let path = op.path.trim_start_matches('/');
        let segments: Vec<&str> = path.split('/').collect();
        let team = op.query_param("teamId").map(str::to_string);

        match (op.method, segments.as_slice()) {
            (Method::Get, ["v10", "projects", project]) => self
                .projects
                .get(*project)
                .cloned()
                .ok_or_else(|| not_found("project_not_found", project)),
            (Method::Get, ["v9", "projects", project, "env"]) => {
                let envs = self.project_envs(project)?;
                Ok(json!({ "envs": envs.iter().map(env_record).collect::<Vec<_>>() }))
            }
            (Method::Post, ["v10", "projects", project, "env"]) => {
                self.create_env(project, body(op)?)
            }
            (Method::Get, ["v9", "projects", project, "env", id]) => {
                let envs = self.project_envs(project)?;
                envs.iter()
                    .find(|e| e.id.as_deref() == Some(*id))
                    .map(env_record)
                    .ok_or_else(|| not_found("env_not_found", id))
            }
            (Method::Patch, ["v9", "projects", project, "env", id]) => {
                self.update_env(project, id, body(op)?)
            }
            (Method::Delete, ["v9", "projects", project, "env", id]) => {
                let envs = self
                    .envs
                    .get_mut(*project)
                    .ok_or_else(|| not_found("project_not_found", project))?;
                let pos = envs
                    .iter()
                    .position(|e| e.id.as_deref() == Some(*id))
                    .ok_or_else(|| not_found("env_not_found", id))?;
                Ok(env_record(&envs.remove(pos)))
            }
            (Method::Post, ["v1", "env"]) => self.create_shared(team, body(op)?),
            (Method::Get, ["v1", "env"]) => Ok(json!({
                "data": self.shared.iter().map(shared_record).collect::<Vec<_>>()
            })),
            (Method::Get, ["v1", "env", id]) => self
                .shared
                .iter()
                .find(|e| e.id.as_deref() == Some(*id))
                .map(shared_record)
                .ok_or_else(|| not_found("env_not_found", id)),
            (Method::Patch, ["v1", "env", id]) => self.update_shared(id, body(op)?),
            (Method::Delete, ["v1", "env", id]) => {
                let pos = self
                    .shared
                    .iter()
                    .position(|e| e.id.as_deref() == Some(*id))
                    .ok_or_else(|| not_found("env_not_found", id))?;
                Ok(shared_record(&self.shared.remove(pos)))
            }
            (Method::Get, ["v2", "teams", team_id]) => {
                if self.teams.contains_key(*team_id) {
                    Ok(json!({ "id": team_id, "name": team_id }))
                } else {
                    Err(not_found("team_not_found", team_id))
                }
            }
            (Method::Get, ["v2", "teams", team_id, "members"]) => self
                .teams
                .get(*team_id)
                .map(|members| json!({ "members": members }))
                .ok_or_else(|| not_found("team_not_found", team_id)),
            (Method::Patch, ["v1", "teams", team_id, "members", uid]) => {
                self.update_member(team_id, uid, body(op)?)
            }
            _ => Err(not_found("not_found", &op.path)),
        }
    }

    fn project_envs(&self, project: &str) -> Result<&Vec<EnvironmentVariable>, ApiFailure> {
        self.envs
            .get(project)
            .ok_or_else(|| not_found("project_not_found", project))
    }

    fn create_env(&mut self, project: &str, body: &Value) -> Result<Value, ApiFailure> {
        if !self.projects.contains_key(project) {
            return Err(not_found("project_not_found", project));
        }
        let mut var = env_from_body(body)?;

        let envs = self.envs.entry(project.to_string()).or_default();
        if envs.iter().any(|e| e.match_key() == var.match_key()) {
            return Err(ApiFailure::with_status(
                400,
                "ENV_ALREADY_EXISTS",
                format!("{} already exists", var.label()),
            ));
        }

        self.next_id += 1;
        var.id = Some(format!("env_{}", self.next_id));
        var.project_id = project.to_string();
        let record = env_record(&var);
        if let Some(envs) = self.envs.get_mut(project) {
            envs.push(var);
        }
        Ok(json!({ "created": record }))
    }

    fn update_env(&mut self, project: &str, id: &str, body: &Value) -> Result<Value, ApiFailure> {
        let update = env_from_body(body)?;
        let envs = self
            .envs
            .get_mut(project)
            .ok_or_else(|| not_found("project_not_found", project))?;
        let existing = envs
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(id))
            .ok_or_else(|| not_found("env_not_found", id))?;

        existing.value = update.value;
        existing.target = update.target;
        existing.git_branch = update.git_branch;
        Ok(env_record(existing))
    }

    fn create_shared(&mut self, team: Option<String>, body: &Value) -> Result<Value, ApiFailure> {
        let ev = body
            .get("evs")
            .and_then(|evs| evs.get(0))
            .ok_or_else(|| bad_request("missing evs"))?;
        let mut var = SharedEnvironmentVariable::new(
            str_field(ev, "key")?,
            str_field(ev, "value")?,
            targets(body)?.iter(),
        )
        .for_projects(string_list(body, "projectId"));
        var.team_id = team;

        self.next_id += 1;
        var.id = Some(format!("env_{}", self.next_id));
        let record = shared_record(&var);
        self.shared.push(var);
        Ok(json!({ "created": [record] }))
    }

    fn update_shared(&mut self, id: &str, body: &Value) -> Result<Value, ApiFailure> {
        let existing = self
            .shared
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(id))
            .ok_or_else(|| not_found("env_not_found", id))?;

        existing.key = str_field(body, "key")?;
        existing.value = SecretValue::new(str_field(body, "value")?);
        existing.target = targets(body)?;
        existing.project_ids = string_list(body, "projectId").into_iter().collect();
        Ok(shared_record(existing))
    }

    fn update_member(&mut self, team: &str, uid: &str, body: &Value) -> Result<Value, ApiFailure> {
        let members = self
            .teams
            .get_mut(team)
            .ok_or_else(|| not_found("team_not_found", team))?;
        let member = members
            .iter_mut()
            .find(|m| m.get("uid").and_then(Value::as_str) == Some(uid))
            .ok_or_else(|| not_found("member_not_found", uid))?;

        if let Some(role) = body.get("role") {
            member["role"] = role.clone();
        }
        if let Some(confirmed) = body.get("confirmed") {
            member["confirmed"] = confirmed.clone();
        }
        Ok(json!({ "id": uid }))
    }
}

fn body(op: &Operation) -> Result<&Value, ApiFailure> {
    op.body.as_ref().ok_or_else(|| bad_request("missing body"))
}

fn env_from_body(body: &Value) -> Result<EnvironmentVariable, ApiFailure> {
    let mut var = EnvironmentVariable::new(
        str_field(body, "key")?,
        str_field(body, "value")?,
        targets(body)?.iter(),
    );
    var.git_branch = body
        .get("gitBranch")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(var)
}

fn str_field(v: &Value, field: &str) -> Result<String, ApiFailure> {
    v.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| bad_request(&format!("missing {}", field)))
}

fn targets(v: &Value) -> Result<TargetSet, ApiFailure> {
    let raw = v.get("target").cloned().unwrap_or(Value::Null);
    let list: Vec<Target> =
        serde_json::from_value(raw).map_err(|e| bad_request(&format!("invalid target: {}", e)))?;
    Ok(TargetSet::new(list))
}

fn string_list(v: &Value, field: &str) -> Vec<String> {
    v.get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn opaque(value: &SecretValue) -> String {
    format!("enc:{}", value.fingerprint())
}

fn env_record(var: &EnvironmentVariable) -> Value {
    let mut record = json!({
        "id": var.id,
        "key": var.key,
        "target": var.target.to_wire(),
        "type": "encrypted",
        "value": opaque(&var.value),
    });
    if let Some(branch) = &var.git_branch {
        record["gitBranch"] = Value::String(branch.clone());
    }
    record
}

fn shared_record(var: &SharedEnvironmentVariable) -> Value {
    json!({
        "id": var.id,
        "key": var.key,
        "target": var.target.to_wire(),
        "type": "encrypted",
        "value": opaque(&var.value),
        "projectId": var.project_ids,
        "ownerId": var.team_id,
    })
}

fn not_found(code: &str, what: &str) -> ApiFailure {
    ApiFailure::with_status(404, code, format!("{} not found", what))
}

fn bad_request(message: &str) -> ApiFailure {
    ApiFailure::with_status(400, "bad_request", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_read_returns_opaque_value() {
        let platform = MemoryPlatform::new();
        platform.add_project("prj_1", None);
        let cancel = Cancellation::new();

        let var = EnvironmentVariable::new("FOO", "bar", [Target::Production]);
        let created = platform
            .execute(&Operation::create_env("prj_1", None, &var), &cancel)
            .unwrap();
        let id = created["created"]["id"].as_str().unwrap().to_string();

        let read = platform
            .execute(&Operation::get_env("prj_1", None, &id), &cancel)
            .unwrap();
        assert_eq!(read["key"], "FOO");
        assert_ne!(read["value"], "bar");
        assert_eq!(platform.envs("prj_1")[0].value.expose(), "bar");
    }

    #[test]
    fn test_missing_resources_are_404() {
        let platform = MemoryPlatform::new();
        let cancel = Cancellation::new();

        let err = platform
            .execute(&Operation::get_project("nope", None), &cancel)
            .unwrap_err();
        assert_eq!(err.status, Some(404));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_injected_failure_is_consumed_once() {
        let platform = MemoryPlatform::new();
        platform.add_team("team_1");
        platform.fail_when(Method::Get, "/members", ApiFailure::with_status(500, "internal", "boom"));
        let cancel = Cancellation::new();

        assert!(platform
            .execute(&Operation::list_members("team_1"), &cancel)
            .is_err());
        assert!(platform
            .execute(&Operation::list_members("team_1"), &cancel)
            .is_ok());
        assert_eq!(platform.calls().len(), 2);
    }

    #[test]
    fn test_cancelled_calls_are_not_recorded() {
        let platform = MemoryPlatform::new();
        let cancel = Cancellation::new();
        cancel.cancel();

        let err = platform
            .execute(&Operation::get_team("team_1"), &cancel)
            .unwrap_err();
        assert_eq!(err.code.as_deref(), Some("cancelled"));
        assert!(platform.calls().is_empty());
    }
}

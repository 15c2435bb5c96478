//! Project environment variable operations.

use tracing::{debug, info};

use super::{created, Applied, Orchestrator};
use crate::core::domain::{EnvironmentVariable, RemoteEnvRecord, ResolvedEnvImport};
use crate::core::reconcile::{self, Plan};
use crate::core::transport::{Operation, Transport};
use crate::error::{OpContext, OpKind, ReconcileError, Result};

impl<T: Transport> Orchestrator<T> {
    /// Create one variable in its project.
    ///
    /// The project is read first so a missing project is reported as such
    /// rather than as a failed create.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` if the variable is invalid, or
    /// `ApplyError::Failed` if the project is missing or the create fails.
    pub fn create_env(
        &self,
        team: Option<&str>,
        var: &EnvironmentVariable,
    ) -> Result<EnvironmentVariable> {
        var.validate()?;
        let team = self.team(team);
        let project_id = var.project_id.as_str();

        self.read_existing(
            OpContext::new(OpKind::Read, format!("project {}", project_id), None),
            &Operation::get_project(project_id, team.as_deref()),
        )?;

        let op = Operation::create_env(project_id, team.as_deref(), var);
        let mut batch = self.batch(1);
        let record = batch
            .issue(OpContext::new(OpKind::Create, var.label(), None), || {
                created(self.call(&op)?, RemoteEnvRecord::from_response)
            })?
            .ok_or_else(|| ReconcileError::MissingId { label: var.label() })?;

        debug!(key = %var.key, id = %record.id, project = project_id, "created env");
        Ok(var.clone().with_id(record.id))
    }

    /// Refresh one variable from the platform.
    ///
    /// Returns `Ok(None)` if it no longer exists. The local value is kept,
    /// since the platform doesn't return plaintext.
    pub fn read_env(
        &self,
        team: Option<&str>,
        current: &EnvironmentVariable,
    ) -> Result<Option<EnvironmentVariable>> {
        let id = require_id(current)?;
        let team = self.team(team);
        let op = Operation::get_env(&current.project_id, team.as_deref(), id);

        let Some(response) = self.read(OpContext::new(OpKind::Read, current.label(), Some(id)), &op)?
        else {
            return Ok(None);
        };

        let mut refreshed = RemoteEnvRecord::from_response(response)?.into_variable(&current.project_id);
        refreshed.value = current.value.clone();
        Ok(Some(refreshed))
    }

    /// Push the local value, targets and branch of an existing variable.
    pub fn update_env(
        &self,
        team: Option<&str>,
        current: &EnvironmentVariable,
    ) -> Result<EnvironmentVariable> {
        current.validate()?;
        let id = require_id(current)?;
        let team = self.team(team);
        let op = Operation::update_env(&current.project_id, team.as_deref(), id, current);

        self.batch(1)
            .issue(OpContext::new(OpKind::Update, current.label(), Some(id)), || {
                self.call(&op)
            })?;
        debug!(key = %current.key, id, "updated env");
        Ok(current.clone())
    }

    /// Delete one variable. Deleting a variable that is already gone
    /// succeeds.
    pub fn delete_env(&self, team: Option<&str>, current: &EnvironmentVariable) -> Result<()> {
        let id = require_id(current)?;
        let team = self.team(team);
        let op = Operation::delete_env(&current.project_id, team.as_deref(), id);

        self.batch(1)
            .issue(OpContext::new(OpKind::Delete, current.label(), Some(id)), || {
                self.call(&op)
            })?;
        Ok(())
    }

    /// Decode a `team/project/env` or `project/env` import identifier.
    pub fn resolve_import_id(&self, raw: &str) -> Result<ResolvedEnvImport> {
        ResolvedEnvImport::resolve(raw, &self.platform)
    }

    /// Import an existing variable by its composite identifier.
    ///
    /// The value is whatever the platform returns, usually encrypted.
    ///
    /// # Errors
    ///
    /// Returns `ImportIdError::Malformed` for a bad identifier, or
    /// `ApplyError::Failed` with kind `NotFound` if the variable doesn't
    /// exist.
    pub fn import_env(&self, raw: &str) -> Result<EnvironmentVariable> {
        let target = self.resolve_import_id(raw)?;
        let op = Operation::get_env(&target.project_id, target.team.as_deref(), &target.env_id);

        let response = self.read_existing(
            OpContext::new(OpKind::Read, raw, Some(&target.env_id)),
            &op,
        )?;
        let var = RemoteEnvRecord::from_response(response)?.into_variable(&target.project_id);
        info!(key = %var.key, id = %target.env_id, project = %target.project_id, "imported env");
        Ok(var)
    }

    /// List a project's variables as the platform reports them.
    ///
    /// Values are opaque unless the platform returned plaintext.
    pub fn read_project_env(
        &self,
        team: Option<&str>,
        project_id: &str,
    ) -> Result<Vec<EnvironmentVariable>> {
        let team = self.team(team);
        let response = self.read_existing(
            OpContext::new(OpKind::Read, format!("project {} env", project_id), None),
            &Operation::list_env(project_id, team.as_deref()),
        )?;

        Ok(RemoteEnvRecord::list_from_response(response)?
            .into_iter()
            .map(|record| record.into_variable(project_id))
            .collect())
    }

    /// Read the project's variables and plan against `desired`.
    pub fn plan_project_env(
        &self,
        team: Option<&str>,
        project_id: &str,
        desired: &[EnvironmentVariable],
    ) -> Result<Plan<EnvironmentVariable>> {
        let desired = scope(desired, project_id);
        let remote = self.read_project_env(team, project_id)?;
        reconcile::env::plan(&desired, &remote)
    }

    /// Converge a project's variables on `desired`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` if `desired` is invalid, `ApplyError::Failed`
    /// if the first operation fails, or `ApplyError::Partial` if the batch
    /// stopped after some operations were applied.
    pub fn reconcile_project_env(
        &self,
        team: Option<&str>,
        project_id: &str,
        desired: &[EnvironmentVariable],
    ) -> Result<Applied<EnvironmentVariable>> {
        let desired = scope(desired, project_id);
        let plan = self.plan_project_env(team, project_id, &desired)?;
        let team = self.team(team);
        let team = team.as_deref();

        info!(
            project = project_id,
            create = plan.to_create.len(),
            update = plan.to_update.len(),
            delete = plan.to_delete.len(),
            "reconciling env"
        );

        let mut ids = reconcile::matched_ids(&plan);
        let mut batch = self.batch(plan.len());

        for var in &plan.to_create {
            let op = Operation::create_env(project_id, team, var);
            let record = batch.issue(OpContext::new(OpKind::Create, var.label(), None), || {
                created(self.call(&op)?, RemoteEnvRecord::from_response)
            })?;
            if let Some(record) = record {
                ids.insert(var.match_key(), record.id);
            }
        }

        for pair in &plan.to_update {
            let id = require_id(&pair.old)?;
            let op = Operation::update_env(project_id, team, id, &pair.new);
            batch.issue(OpContext::new(OpKind::Update, pair.new.label(), Some(id)), || {
                self.call(&op)
            })?;
        }

        for var in &plan.to_delete {
            let id = require_id(var)?;
            let op = Operation::delete_env(project_id, team, id);
            batch.issue(OpContext::new(OpKind::Delete, var.label(), Some(id)), || {
                self.call(&op)
            })?;
        }

        Ok(Applied {
            merged: reconcile::merge(&desired, &ids),
            completed: batch.finish(),
        })
    }
}

fn scope(vars: &[EnvironmentVariable], project_id: &str) -> Vec<EnvironmentVariable> {
    vars.iter()
        .cloned()
        .map(|var| var.in_project(project_id))
        .collect()
}

fn require_id(var: &EnvironmentVariable) -> Result<&str> {
    var.id.as_deref().ok_or_else(|| {
        ReconcileError::MissingId {
            label: var.label(),
        }
        .into()
    })
}

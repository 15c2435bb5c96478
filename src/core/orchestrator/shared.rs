//! Shared environment variable operations.
//!
//! Shared variables belong to a team. The team comes from the variable's
//! `team_id` when set, else from the configured default.

use tracing::{debug, info};

use super::{created, Applied, Orchestrator};
use crate::core::domain::{RemoteSharedRecord, ResolvedSharedImport, SharedEnvironmentVariable};
use crate::core::reconcile::{self, Plan};
use crate::core::transport::{Operation, Transport};
use crate::error::{OpContext, OpKind, ReconcileError, Result};

impl<T: Transport> Orchestrator<T> {
    pub fn create_shared_env(
        &self,
        var: &SharedEnvironmentVariable,
    ) -> Result<SharedEnvironmentVariable> {
        var.validate()?;
        let team = self.team(var.team_id.as_deref());
        let op = Operation::create_shared_env(team.as_deref(), var);

        let record = self
            .batch(1)
            .issue(OpContext::new(OpKind::Create, var.label(), None), || {
                created(self.call(&op)?, RemoteSharedRecord::from_response)
            })?
            .ok_or_else(|| ReconcileError::MissingId { label: var.label() })?;
        debug!(key = %var.key, id = %record.id, "created shared env");

        let mut var = var.clone().with_id(record.id);
        var.team_id = team;
        Ok(var)
    }

    /// Refresh one shared variable, keeping the local value.
    pub fn read_shared_env(
        &self,
        current: &SharedEnvironmentVariable,
    ) -> Result<Option<SharedEnvironmentVariable>> {
        let id = require_id(current)?;
        let team = self.team(current.team_id.as_deref());
        let op = Operation::get_shared_env(team.as_deref(), id);

        let Some(response) = self.read(OpContext::new(OpKind::Read, current.label(), Some(id)), &op)?
        else {
            return Ok(None);
        };

        let mut refreshed = RemoteSharedRecord::from_response(response)?.into_variable();
        refreshed.value = current.value.clone();
        if refreshed.team_id.is_none() {
            refreshed.team_id = team;
        }
        Ok(Some(refreshed))
    }

    pub fn update_shared_env(
        &self,
        current: &SharedEnvironmentVariable,
    ) -> Result<SharedEnvironmentVariable> {
        current.validate()?;
        let id = require_id(current)?;
        let team = self.team(current.team_id.as_deref());
        let op = Operation::update_shared_env(team.as_deref(), id, current);

        self.batch(1)
            .issue(OpContext::new(OpKind::Update, current.label(), Some(id)), || {
                self.call(&op)
            })?;
        Ok(current.clone())
    }

    /// Delete one shared variable; already-deleted succeeds.
    pub fn delete_shared_env(&self, current: &SharedEnvironmentVariable) -> Result<()> {
        let id = require_id(current)?;
        let team = self.team(current.team_id.as_deref());
        let op = Operation::delete_shared_env(team.as_deref(), id);

        self.batch(1)
            .issue(OpContext::new(OpKind::Delete, current.label(), Some(id)), || {
                self.call(&op)
            })?;
        Ok(())
    }

    /// Decode a `team/env` or `env` import identifier.
    pub fn resolve_shared_import_id(&self, raw: &str) -> Result<ResolvedSharedImport> {
        ResolvedSharedImport::resolve(raw, &self.platform)
    }

    /// Import an existing shared variable by its identifier.
    pub fn import_shared_env(&self, raw: &str) -> Result<SharedEnvironmentVariable> {
        let target = self.resolve_shared_import_id(raw)?;
        let op = Operation::get_shared_env(target.team.as_deref(), &target.env_id);

        let response = self.read_existing(
            OpContext::new(OpKind::Read, raw, Some(&target.env_id)),
            &op,
        )?;
        let mut var = RemoteSharedRecord::from_response(response)?.into_variable();
        if var.team_id.is_none() {
            var.team_id = target.team;
        }
        info!(key = %var.key, id = %target.env_id, "imported shared env");
        Ok(var)
    }

    /// List the team's shared variables.
    pub fn read_shared_envs(&self, team: Option<&str>) -> Result<Vec<SharedEnvironmentVariable>> {
        let team = self.team(team);
        let response = self.read_existing(
            OpContext::new(OpKind::Read, "shared env", None),
            &Operation::list_shared_env(team.as_deref()),
        )?;
        Ok(RemoteSharedRecord::list_from_response(response)?
            .into_iter()
            .map(RemoteSharedRecord::into_variable)
            .collect())
    }

    pub fn plan_shared_env(
        &self,
        team: Option<&str>,
        desired: &[SharedEnvironmentVariable],
    ) -> Result<Plan<SharedEnvironmentVariable>> {
        let remote = self.read_shared_envs(team)?;
        reconcile::shared::plan(desired, &remote)
    }

    /// Converge the team's shared variables on `desired`.
    ///
    /// The team's full list is the remote side: every shared variable of the
    /// team that `desired` doesn't declare is deleted, including ones created
    /// outside this tool. Each operation goes to the variable's own `team_id`
    /// when set, else to `team`, else to the configured default, the same
    /// resolution [`create_shared_env`](Self::create_shared_env) uses.
    pub fn reconcile_shared_env(
        &self,
        team: Option<&str>,
        desired: &[SharedEnvironmentVariable],
    ) -> Result<Applied<SharedEnvironmentVariable>> {
        let plan = self.plan_shared_env(team, desired)?;

        info!(
            create = plan.to_create.len(),
            update = plan.to_update.len(),
            delete = plan.to_delete.len(),
            "reconciling shared env"
        );

        let mut ids = reconcile::matched_ids(&plan);
        let mut batch = self.batch(plan.len());

        for var in &plan.to_create {
            let var_team = self.shared_team(var, team);
            let op = Operation::create_shared_env(var_team.as_deref(), var);
            let record = batch.issue(OpContext::new(OpKind::Create, var.label(), None), || {
                created(self.call(&op)?, RemoteSharedRecord::from_response)
            })?;
            if let Some(record) = record {
                ids.insert(var.match_key(), record.id);
            }
        }

        for pair in &plan.to_update {
            let id = require_id(&pair.old)?;
            let var_team = self.shared_team(&pair.new, team);
            let op = Operation::update_shared_env(var_team.as_deref(), id, &pair.new);
            batch.issue(OpContext::new(OpKind::Update, pair.new.label(), Some(id)), || {
                self.call(&op)
            })?;
        }

        for var in &plan.to_delete {
            let id = require_id(var)?;
            let var_team = self.shared_team(var, team);
            let op = Operation::delete_shared_env(var_team.as_deref(), id);
            batch.issue(OpContext::new(OpKind::Delete, var.label(), Some(id)), || {
                self.call(&op)
            })?;
        }

        Ok(Applied {
            merged: reconcile::merge(desired, &ids),
            completed: batch.finish(),
        })
    }

    fn shared_team(
        &self,
        var: &SharedEnvironmentVariable,
        fallback: Option<&str>,
    ) -> Option<String> {
        self.team(var.team_id.as_deref().or(fallback))
    }
}

fn require_id(var: &SharedEnvironmentVariable) -> Result<&str> {
    var.id.as_deref().ok_or_else(|| {
        ReconcileError::MissingId {
            label: var.label(),
        }
        .into()
    })
}

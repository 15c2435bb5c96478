//! Plan command - diff the configuration against a saved snapshot.

use serde::Serialize;
use std::path::Path;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::domain::{EnvironmentVariable, SharedEnvironmentVariable};
use crate::core::reconcile::{self, MemberUpdate, Plan, Reconcilable};
use crate::core::snapshot::RemoteSnapshot;
use crate::error::Result;

/// One planned remote operation.
#[derive(Debug, Serialize)]
pub struct PlannedChange {
    pub action: &'static str,
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Short hash of the value to be written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Every planned operation, grouped by resource kind.
#[derive(Debug, Default, Serialize)]
pub struct PlanReport {
    pub env: Vec<PlannedChange>,
    pub shared_env: Vec<PlannedChange>,
    pub members: Vec<PlannedChange>,
}

impl PlanReport {
    pub fn is_empty(&self) -> bool {
        self.env.is_empty() && self.shared_env.is_empty() && self.members.is_empty()
    }

    /// Build the report for `config` against `snapshot`.
    ///
    /// Shared variables and members are only planned when the
    /// configuration declares some.
    pub fn build(config: &Config, snapshot: &RemoteSnapshot) -> Result<Self> {
        let mut report = Self::default();

        if let Some(project) = config.project_id() {
            let plan = reconcile::env::plan(&config.desired_env(), &snapshot.envs(project)?)?;
            report.env = changes(&plan, env_fingerprint);
        }
        if !config.shared_env.is_empty() {
            let plan = reconcile::shared::plan(&config.shared_env, &snapshot.shared()?)?;
            report.shared_env = changes(&plan, shared_fingerprint);
        }
        if !config.members.is_empty() {
            let updates = reconcile::team::plan(&config.members, &snapshot.members()?)?;
            report.members = updates.iter().map(member_change).collect();
        }

        Ok(report)
    }
}

fn env_fingerprint(var: &EnvironmentVariable) -> String {
    var.value.fingerprint()
}

fn shared_fingerprint(var: &SharedEnvironmentVariable) -> String {
    var.value.fingerprint()
}

/// Flatten a plan in issue order: creates, updates, deletes.
pub fn changes<T: Reconcilable>(plan: &Plan<T>, fingerprint: fn(&T) -> String) -> Vec<PlannedChange> {
    let creates = plan.to_create.iter().map(|new| PlannedChange {
        action: "create",
        resource: new.label(),
        id: None,
        fingerprint: Some(fingerprint(new)),
        detail: None,
    });
    let updates = plan.to_update.iter().map(|pair| PlannedChange {
        action: "update",
        resource: pair.new.label(),
        id: pair.old.remote_id().map(str::to_string),
        fingerprint: Some(fingerprint(&pair.new)),
        detail: None,
    });
    let deletes = plan.to_delete.iter().map(|old| PlannedChange {
        action: "delete",
        resource: old.label(),
        id: old.remote_id().map(str::to_string),
        fingerprint: None,
        detail: None,
    });
    creates.chain(updates).chain(deletes).collect()
}

fn member_change(update: &MemberUpdate) -> PlannedChange {
    let mut detail = Vec::new();
    if update.role != update.previous_role {
        detail.push(format!("{} -> {}", update.previous_role, update.role));
    }
    if update.confirmed != update.previous_confirmed {
        detail.push(format!("confirmed -> {}", update.confirmed));
    }
    PlannedChange {
        action: "update",
        resource: format!("member {}", update.uid),
        id: Some(update.uid.clone()),
        fingerprint: None,
        detail: Some(detail.join(", ")),
    }
}

/// Print a report section by section.
pub fn print(report: &PlanReport) {
    if report.is_empty() {
        output::success("no changes");
        return;
    }

    for (title, entries) in [
        ("Environment variables", &report.env),
        ("Shared environment variables", &report.shared_env),
        ("Team members", &report.members),
    ] {
        if entries.is_empty() {
            continue;
        }
        output::section(title);
        for entry in entries {
            let sign = match entry.action {
                "create" => '+',
                "delete" => '-',
                _ => '~',
            };
            let detail = match (&entry.id, &entry.fingerprint, &entry.detail) {
                (_, _, Some(detail)) => Some(detail.clone()),
                (Some(id), Some(fp), None) => Some(format!("{} sha256:{}", id, fp)),
                (None, Some(fp), None) => Some(format!("sha256:{}", fp)),
                (Some(id), None, None) => Some(id.clone()),
                (None, None, None) => None,
            };
            output::change(sign, &entry.resource, detail.as_deref());
        }
    }
}

pub fn execute(config_path: &Path, remote: &Path, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let snapshot = RemoteSnapshot::load(remote)?;
    let report = PlanReport::build(&config, &snapshot)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print(&report);
    }
    Ok(())
}

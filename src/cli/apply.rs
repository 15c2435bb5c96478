//! Apply command - reconcile against the live platform API.

use std::path::Path;

use crate::error::Result;

#[cfg(feature = "http")]
pub fn execute(config_path: &Path, json: bool) -> Result<()> {
    use serde_json::json;
    use tracing::info;

    use crate::cli::output;
    use crate::core::config::Config;
    use crate::core::orchestrator::Orchestrator;
    use crate::core::transport::http::HttpTransport;
    use crate::error::OpContext;

    let config = Config::load(config_path)?;
    let transport = HttpTransport::new(&config.platform)?;
    let orchestrator = Orchestrator::new(transport, config.platform.clone());
    let team = config.project_team();

    let mut completed: Vec<OpContext> = Vec::new();
    if let Some(project) = config.project_id() {
        let applied = orchestrator.reconcile_project_env(team.as_deref(), project, &config.env)?;
        completed.extend(applied.completed);
    }
    if !config.shared_env.is_empty() {
        let applied = orchestrator.reconcile_shared_env(team.as_deref(), &config.shared_env)?;
        completed.extend(applied.completed);
    }
    if !config.members.is_empty() {
        let applied = orchestrator.reconcile_team_members(team.as_deref(), &config.members)?;
        completed.extend(applied.completed);
    }
    info!(operations = completed.len(), "apply finished");

    if json {
        let ops: Vec<_> = completed
            .iter()
            .map(|op| json!({ "action": op.kind.to_string(), "resource": op.resource, "id": op.id }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json!({ "completed": ops }))?);
    } else if completed.is_empty() {
        output::success("already up to date");
    } else {
        for op in &completed {
            output::success(&op.to_string());
        }
    }
    Ok(())
}

#[cfg(not(feature = "http"))]
pub fn execute(_config_path: &Path, _json: bool) -> Result<()> {
    Err(crate::error::ConfigError::Unsupported(
        "apply needs the `http` feature: cargo install platsync --features http".to_string(),
    )
    .into())
}

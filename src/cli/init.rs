//! Init command - write a starter `.platsync.toml`.

use std::path::Path;
use tracing::info;

use crate::cli::output;
use crate::core::config::Config;
use crate::error::Result;

pub fn execute(path: &Path, project: Option<String>, team: Option<String>) -> Result<()> {
    let config = Config::init(path, project, team)?;
    info!(path = %path.display(), "initialized config");

    output::success(&format!("initialized {}", output::path(&path.display().to_string())));
    if let Some(project) = config.project_id() {
        output::kv("project:", project);
    }
    if let Some(team) = &config.platform.default_team {
        output::kv("team:   ", team);
    }
    output::kv("token:  ", format!("${}", config.platform.token_env));
    Ok(())
}

//! Import-id command - decode a composite import identifier.

use std::path::Path;

use crate::cli::{output, ImportKind};
use crate::core::config::{Config, PlatformConfig};
use crate::core::domain::import_id::TEAM_ARITY;
use crate::core::domain::{CompositeId, ResolvedEnvImport, ResolvedSharedImport};
use crate::error::Result;

/// Decode `id` and print what it resolves to.
///
/// The configuration is optional here; without it there is no default team.
pub fn execute(config_path: &Path, id: &str, kind: ImportKind) -> Result<()> {
    let platform = if config_path.exists() {
        Config::load(config_path)?.platform
    } else {
        PlatformConfig::default()
    };
    let none = "(none)".to_string();

    match kind {
        ImportKind::Env => {
            let resolved = ResolvedEnvImport::resolve(id, &platform)?;
            output::header("Environment variable");
            output::kv("team:   ", resolved.team.unwrap_or(none));
            output::kv("project:", resolved.project_id);
            output::kv("env:    ", resolved.env_id);
        }
        ImportKind::Shared => {
            let resolved = ResolvedSharedImport::resolve(id, &platform)?;
            output::header("Shared environment variable");
            output::kv("team:", resolved.team.unwrap_or(none));
            output::kv("env: ", resolved.env_id);
        }
        ImportKind::Team => {
            let decoded = CompositeId::decode_with_arity(id, TEAM_ARITY)?;
            output::header("Team");
            output::kv("team:", decoded.team.unwrap_or(none));
        }
    }
    Ok(())
}

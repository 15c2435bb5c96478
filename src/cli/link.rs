//! Link command - normalize a repository link payload.

use serde_json::Value;
use std::path::Path;

use crate::cli::output;
use crate::core::domain::{link_from_project, parse_link};
use crate::error::{ConfigError, Result};

/// Accepts either a full project payload (with a `link` field) or a bare
/// link payload.
pub fn execute(payload: &Path, json: bool) -> Result<()> {
    let contents = std::fs::read_to_string(payload).map_err(ConfigError::ReadFile)?;
    let value: Value = serde_json::from_str(&contents)?;

    let link = if value.get("link").is_some() {
        link_from_project(&value)?
    } else {
        parse_link(&value)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&link)?);
        return Ok(());
    }

    match link {
        Some(link) => {
            output::kv("provider:", link.provider);
            output::kv("slug:    ", &link.slug);
            if let Some(branch) = &link.production_branch {
                output::kv("branch:  ", branch);
            }
        }
        None => output::warn("no supported repository link"),
    }
    Ok(())
}

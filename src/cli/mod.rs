//! Command-line interface.

pub mod apply;
pub mod completions;
pub mod import_id;
pub mod init;
pub mod link;
pub mod output;
pub mod plan;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::Config;

/// platsync - declarative project configuration for your deployment platform.
#[derive(Parser)]
#[command(
    name = "platsync",
    about = "Declarative project configuration for your deployment platform",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (default: ./.platsync.toml)
    #[arg(short, long, global = true, env = "PLATSYNC_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Write a starter .platsync.toml
    Init {
        /// Project ID
        #[arg(short, long)]
        project: Option<String>,
        /// Default team ID
        #[arg(short, long)]
        team: Option<String>,
    },

    /// Show the operations needed to converge a saved remote snapshot
    Plan {
        /// Snapshot of remote state (JSON)
        #[arg(short, long)]
        remote: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reconcile the configuration against the live platform API
    ///
    /// When the config declares `shared_env`, it owns the team's shared
    /// variables: every shared variable of the team it doesn't list is
    /// deleted, including ones created outside platsync.
    Apply {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode an import identifier
    ImportId {
        /// Identifier, e.g. team/project/env or project/env
        id: String,
        /// Shared environment variable identifier (team/env or env)
        #[arg(long, conflicts_with = "team")]
        shared: bool,
        /// Team identifier
        #[arg(long)]
        team: bool,
    },

    /// Normalize a repository link payload
    Link {
        /// Project or link payload (JSON)
        payload: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Which kind of resource an import identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Env,
    Shared,
    Team,
}

/// Execute a command.
pub fn execute(command: Command, config: Option<PathBuf>) -> crate::error::Result<()> {
    use Command::*;

    let config_path = config.unwrap_or_else(Config::default_path);

    match command {
        Init { project, team } => init::execute(&config_path, project, team),
        Plan { remote, json } => plan::execute(&config_path, &remote, json),
        Apply { json } => apply::execute(&config_path, json),
        ImportId { id, shared, team } => {
            let kind = match (shared, team) {
                (true, _) => ImportKind::Shared,
                (_, true) => ImportKind::Team,
                _ => ImportKind::Env,
            };
            import_id::execute(&config_path, &id, kind)
        }
        Link { payload, json } => link::execute(&payload, json),
        Completions { shell } => completions::execute(shell),
    }
}

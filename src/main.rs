//! platsync - declarative project configuration for a cloud deployment platform.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use platsync::cli::output;
use platsync::cli::{execute, Cli};
use platsync::core::constants::LOG_ENV;
use platsync::error::{ApplyError, ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("platsync=debug")
        } else {
            EnvFilter::new("platsync=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .init();

    if let Err(e) = execute(cli.command, cli.config) {
        // Format error with suggestion if available
        let error_msg = e.to_string();
        let suggestion = match &e {
            Error::Config(ConfigError::NotInitialized) => Some("run: platsync init".to_string()),
            Error::Config(ConfigError::MissingToken(var)) => {
                Some(format!("export {}=<api token>", var))
            }
            Error::Config(ConfigError::NoTeam) => {
                Some("set platform.default_team in .platsync.toml".to_string())
            }
            Error::Apply(ApplyError::Partial { .. }) => {
                Some("completed operations were kept; run apply again to converge".to_string())
            }
            _ => None,
        };

        output::error(&error_msg);
        if let Some(hint) = suggestion {
            output::hint(&hint);
        }
        std::process::exit(1);
    }
}

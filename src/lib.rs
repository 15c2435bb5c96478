//! platsync - declarative project configuration for a cloud deployment
//! platform.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/                # Command-line interface
//! │   ├── init            # Write .platsync.toml
//! │   ├── plan            # Plan against a saved snapshot
//! │   ├── apply           # Reconcile against the live API
//! │   ├── import_id       # Decode import identifiers
//! │   ├── link            # Normalize repository links
//! │   └── completions     # Shell completions
//! └── core/               # Core library components
//!     ├── config          # .platsync.toml management
//!     ├── classify        # API failure classification
//!     ├── domain/         # Env vars, links, members, import IDs
//!     ├── reconcile/      # Desired vs. remote planning
//!     ├── orchestrator/   # Issues plans through a transport
//!     ├── snapshot        # Saved remote state
//!     └── transport/      # In-memory platform, HTTP client
//! ```
//!
//! # Features
//!
//! - Environment variables matched on key, targets and git branch
//! - Stable remote identifiers across runs
//! - Partial batches reported with what was applied
//! - Secret values never logged or printed

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::config::{Config, PlatformConfig};
pub use crate::core::orchestrator::{Applied, Orchestrator};
pub use crate::core::transport::{MemoryPlatform, Transport};
pub use crate::error::{Error, Result};

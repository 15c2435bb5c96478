//! Domain types.

pub mod env_var;
pub mod import_id;
pub mod link;
pub mod member;
mod secret;
pub mod shared_env;

pub use env_var::{validate_set, EnvMatchKey, EnvironmentVariable, RemoteEnvRecord, Target, TargetSet};
pub use import_id::{CompositeId, ResolvedEnvImport, ResolvedSharedImport};
pub use link::{link_from_project, parse_link, Provider, RawLink, RepositoryLink};
pub use member::{parse_roster, JoinedFrom, Role, TeamMember, VcsIdentities};
pub use secret::SecretValue;
pub use shared_env::{validate_shared_set, RemoteSharedRecord, SharedEnvironmentVariable, SharedMatchKey};

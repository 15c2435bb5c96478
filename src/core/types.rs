//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// An environment variable name (e.g., DATABASE_URL, API_KEY).
pub type EnvKey = String;

/// Remote identifier of an environment variable, assigned on create.
pub type EnvId = String;

/// Remote identifier of a project (e.g., `prj_...`).
pub type ProjectId = String;

/// Remote identifier of a team (e.g., `team_...`).
pub type TeamId = String;

/// Remote identifier of a team member.
///
/// Assigned by the platform when the member joins; never generated locally.
pub type MemberUid = String;

//! Constants used throughout platsync.
//!
//! Centralizes magic strings and configuration values.

/// Configuration file name (.platsync.toml).
pub const CONFIG_FILE: &str = ".platsync.toml";

/// Default platform API base URL.
pub const DEFAULT_API_URL: &str = "https://api.vercel.com";

/// Environment variable holding the API token, unless overridden in config.
pub const DEFAULT_TOKEN_ENV: &str = "PLATSYNC_TOKEN";

/// Environment variable controlling log filtering.
pub const LOG_ENV: &str = "PLATSYNC_LOG";

/// Variable type sent on create; values are stored encrypted upstream.
pub const ENV_TYPE_ENCRYPTED: &str = "encrypted";

/// Record types whose `value` field is never the plaintext.
pub const OPAQUE_ENV_TYPES: &[&str] = &["encrypted", "secret", "sensitive"];

/// Number of hex characters shown for value fingerprints.
pub const FINGERPRINT_LEN: usize = 8;

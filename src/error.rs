//! Usage-error taxonomy.
//!
//! Usage errors are raised while validating user input, before any storage
//! access, and map to exit code 2. Everything else (store unreadable,
//! output unwritable) stays an anyhow error and maps to exit code 1.

use thiserror::Error;

/// Invalid user-supplied option. Fatal before any storage access.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("invalid --alias format '{0}', expected PHONE=NAME with exactly one '='")]
    AliasSyntax(String),

    #[error("invalid phone number in --alias: '{0}'")]
    AliasNumber(String),

    #[error("invalid phone number in --phone: '{0}'")]
    FilterNumber(String),

    #[error("invalid --date-format string: '{0}'")]
    DateFormat(String),
}

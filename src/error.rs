//! Error types for the launcher.
//!
//! Every error in this taxonomy is terminal: the launcher prepares state for
//! a privileged handoff and never proceeds on partial or uncertain state.
//! There is no retry path anywhere in the pipeline.

use thiserror::Error;

/// Fatal launcher error.
///
/// All error messages are safe to log (no secrets included).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LaunchError {
    // Usage errors
    /// Unknown switch or missing switch argument
    #[error("usage: {program} [-c config_dir] [-Dv] command")]
    Usage { program: String },

    /// The -c switch requires an absolute pathname
    #[error("-c requires an absolute pathname, got: {path}")]
    ConfigDirNotAbsolute { path: String },

    // Privilege errors
    /// Invoking identity is not the superuser
    #[error("the {program} command is reserved for the superuser")]
    NotPrivileged { program: String },

    /// Running as a set-uid or set-gid image
    #[error("the {program} command must not run as a set-uid process")]
    UnsafeInvocation { program: String },

    // Configuration errors
    /// Configuration source could not be read
    #[error("failed to read {path}: {reason}")]
    ConfigUnreadable { path: String, reason: String },

    /// Configuration source contains a line that does not parse
    #[error("{path}, line {line}: {reason}")]
    ConfigMalformed {
        path: String,
        line: usize,
        reason: String,
    },

    // Environment errors
    /// Environment entry that cannot legally cross exec
    #[error("invalid environment entry {name}: {reason}")]
    InvalidEnvironment { name: String, reason: String },

    // Filesystem errors
    /// A required working directory could not be entered
    #[error("chdir {dir}: {reason}")]
    WorkDirUnreachable { dir: String, reason: String },

    // Transfer errors
    /// The external procedure could not be executed
    #[error("failed to execute {path}: {reason}")]
    TransferFailed { path: String, reason: String },

    /// Standard descriptor fallback failed during startup
    #[error("open /dev/null: {reason}")]
    DescriptorSetup { reason: String },
}

//! # postctl
//!
//! Control program for a Postfix-style mail system.
//!
//! `postctl` is the privileged front door to the mail system: it validates
//! that it was invoked by the superuser (and not through a set-uid image),
//! parses a small fixed switch set, binds the installation parameters from
//! the configuration store, scrubs the inherited environment down to an
//! allow-list, exports a deterministic set of launcher-owned variables, and
//! then replaces its own process image with the maintenance script that does
//! the actual administrative work.
//!
//! ```rust,no_run
//! use postctl::{launch, Environment};
//!
//! # fn example() -> Result<(), postctl::LaunchError> {
//! let args: Vec<String> = std::env::args().collect();
//!
//! // Everything up to the irreversible part is a pure pipeline over an
//! // environment snapshot.
//! let handoff = launch::prepare(&args, Environment::capture())?;
//!
//! // Enters the work directories and execs the maintenance script;
//! // returns only on failure.
//! Err(handoff.transfer())
//! # }
//! ```
//!
//! ## Design principles
//!
//! - **Fail fast**: every validation, configuration, or filesystem error is
//!   terminal. The launcher prepares state for a privileged handoff and
//!   never proceeds on partial state.
//! - **Allow-list, not denylist**: only explicitly imported variables
//!   survive sanitization, and launcher-owned variables always win.
//! - **Explicit state**: the environment is threaded through the pipeline as
//!   a value; nothing mutates the ambient environment before the exec.
//!
//! ## Platform support
//!
//! Unix only. The launcher's contract is built on Unix process identity
//! (real vs. effective uid) and on replacing the process image with
//! `execve`, neither of which Windows provides.

#[cfg(windows)]
compile_error!(
    "postctl does not support Windows. \
     The launcher depends on Unix process identity semantics (real vs. \
     effective uid) and on execve-style process image replacement."
);

pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod launch;
pub mod options;
pub mod privilege;

pub use environment::{Environment, ImportFilter};
pub use error::LaunchError;
pub use launch::PreparedHandoff;
pub use options::{Options, ParsedCommandLine};
pub use privilege::Identity;

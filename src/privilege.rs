//! Privilege validation.
//!
//! The mail system must be run by the superuser so it can revoke privileges
//! for selected operations. The launcher also refuses to run as a set-uid
//! image: a root-only tool reachable through a privilege elevation path is a
//! misuse vector, not a convenience.

use crate::error::LaunchError;

/// Real and effective identity of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub euid: u32,
    pub gid: u32,
    pub egid: u32,
}

impl Identity {
    /// Capture the identity of the current process.
    pub fn current() -> Self {
        // SAFETY: these calls read process credentials and cannot fail.
        unsafe {
            Self {
                uid: libc::getuid(),
                euid: libc::geteuid(),
                gid: libc::getgid(),
                egid: libc::getegid(),
            }
        }
    }

    /// Whether the process gained privileges it was not invoked with.
    ///
    /// True for a set-uid or set-gid image, where the effective identity
    /// differs from the real one.
    pub fn is_elevated(&self) -> bool {
        self.uid != self.euid || self.gid != self.egid
    }

    /// Enforce the launcher's trust requirements.
    ///
    /// # Errors
    ///
    /// - `NotPrivileged` if the invoking identity is not the superuser
    /// - `UnsafeInvocation` if running as a set-uid/set-gid image
    pub fn check(&self, program: &str) -> Result<(), LaunchError> {
        if self.uid != 0 {
            // Point submitters at the right tool before failing.
            tracing::error!("to submit mail, use the sendmail command");
            return Err(LaunchError::NotPrivileged {
                program: program.to_string(),
            });
        }
        if self.is_elevated() {
            return Err(LaunchError::UnsafeInvocation {
                program: program.to_string(),
            });
        }
        Ok(())
    }
}

/// Validate the current process identity.
///
/// Must run before argument parsing and before any environment or filesystem
/// mutation: privilege is established before anything else can influence
/// behavior.
pub fn validate(program: &str) -> Result<(), LaunchError> {
    Identity::current().check(program)
}

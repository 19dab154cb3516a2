//! Diagnostics setup.
//!
//! Reporting goes to standard error through `tracing`; formatting adapts to
//! whether standard error is a terminal. Before anything else the launcher
//! makes sure descriptors 0..2 are open, so a file opened later can never
//! receive what was meant for the console.

use crate::error::LaunchError;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Derive the program name from argv[0].
///
/// Takes the final path component; a trailing slash leaves the argument
/// untouched.
pub fn program_name(argv0: &str) -> &str {
    match argv0.rsplit_once('/') {
        Some((_, base)) if !base.is_empty() => base,
        _ => argv0,
    }
}

/// Reopen any closed standard descriptor on `/dev/null`.
///
/// A privileged tool started with descriptor 2 closed would otherwise leak
/// its diagnostics into the next file it opens.
///
/// # Errors
///
/// `DescriptorSetup` if `/dev/null` cannot be opened at the expected slot.
pub fn ensure_standard_descriptors() -> Result<(), LaunchError> {
    let dev_null = c"/dev/null";

    for fd in 0..3 {
        // SAFETY: fstat on a numeric descriptor; failure only inspected.
        let missing = unsafe {
            let mut st: libc::stat = std::mem::zeroed();
            libc::fstat(fd, &mut st) == -1
        };
        if missing {
            // SAFETY: opens a fresh descriptor; the kernel hands out the
            // lowest free slot, which is exactly the one we found missing.
            let got = unsafe { libc::open(dev_null.as_ptr(), libc::O_RDWR, 0) };
            if got != fd {
                return Err(LaunchError::DescriptorSetup {
                    reason: std::io::Error::last_os_error().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Install the global tracing subscriber.
///
/// Compact single-line output on standard error, ANSI only when interactive,
/// level filtering via `RUST_LOG` with an `info` default.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .init();
}

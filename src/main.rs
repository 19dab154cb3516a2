//! Privileged launcher binary.
//!
//! All of the work happens in [`postctl::launch::run`], which either
//! replaces this process with the maintenance script or hands back the
//! fatal error.

use tracing::Level;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let err = postctl::launch::run(&args);

    // The subscriber is missing only when descriptor setup itself failed;
    // fall back to bare stderr so the failure is never silent.
    if tracing::event_enabled!(Level::ERROR) {
        tracing::error!("fatal: {err}");
    } else {
        eprintln!("fatal: {err}");
    }
    std::process::exit(1);
}

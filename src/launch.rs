//! Bootstrap orchestration.
//!
//! The launch pipeline is a linear sequence with no branching back: set up
//! diagnostics, validate privilege, parse switches, bind configuration,
//! sanitize the environment, project the launcher-owned variables, enter the
//! required directories, and replace the process image with the maintenance
//! script. Every failure is terminal.
//!
//! The steps between parsing and projection are pure over an [`Environment`]
//! snapshot and produce a [`PreparedHandoff`]; only [`PreparedHandoff::transfer`]
//! touches process-global state (working directory, the exec itself).

use crate::config::{
    self, Parameters, VAR_COMMAND_DIR, VAR_CONFIG_DIR, VAR_DAEMON_DIR, VAR_IMPORT_ENVIRON,
    VAR_QUEUE_DIR,
};
use crate::diagnostics::{self, program_name};
use crate::environment::{Environment, ImportFilter, ENV_CONFIG_DIR, ENV_DEBUG, ENV_VERBOSE, ROOT_PATH};
use crate::error::LaunchError;
use crate::options::{self, Options};
use crate::privilege;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;

/// Name of the external maintenance procedure, resolved under the
/// configuration directory.
pub const SCRIPT_NAME: &str = "postfix-script";

/// A validated handoff, ready for the final transfer of control.
///
/// The only way to create one is [`prepare`], which guarantees the argv
/// layout, the sanitized environment, and the workdir chain were all derived
/// from validated inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedHandoff {
    /// Absolute path of the maintenance script.
    pub script: PathBuf,

    /// Handed-off argv: the placeholder token, then the administrative
    /// command and its arguments in original order.
    pub argv: Vec<String>,

    /// The environment the script starts with; nothing else survives.
    pub env: Environment,

    /// Directories entered in order before the transfer. The last one is the
    /// working directory the script runs in.
    pub work_dirs: Vec<PathBuf>,
}

/// Run steps 3..6 of the pipeline over an environment snapshot.
///
/// `args` is the launcher's full argv; `inherited` is the environment to
/// sanitize. Privilege must already have been validated.
///
/// # Errors
///
/// Any parsing, configuration, or environment error; all are terminal.
pub fn prepare(args: &[String], inherited: Environment) -> Result<PreparedHandoff, LaunchError> {
    // PARSE_ARGS. The -c override lands in the snapshot here, before the
    // configuration directory is resolved.
    let mut env = inherited;
    let parsed = options::parse(args, &mut env)?;

    // LOAD_CONFIG
    let config_dir = config::resolve_config_dir(&env);
    let params = config::load(&config_dir)?;

    // SANITIZE_ENV. Shell scripts use environment settings to override
    // configuration, so behavior must not depend on who started us.
    let filter = ImportFilter::parse(params.get(VAR_IMPORT_ENVIRON));
    let mut env = filter.apply(&env)?;

    // PROJECT_VARIABLES
    project_variables(&mut env, &params, &parsed.options)?;

    let mut argv = Vec::with_capacity(parsed.passthrough.len() + 1);
    argv.push(parsed.placeholder);
    argv.extend(parsed.passthrough);

    Ok(PreparedHandoff {
        script: config_dir.join(SCRIPT_NAME),
        argv,
        env,
        work_dirs: vec![
            PathBuf::from(params.get(VAR_COMMAND_DIR)),
            PathBuf::from(params.get(VAR_DAEMON_DIR)),
            PathBuf::from(params.get(VAR_QUEUE_DIR)),
        ],
    })
}

/// Overwrite the launcher-owned keys.
///
/// Runs strictly after sanitization, so an inherited variable can never
/// shadow a launcher-owned value even if its name is allow-listed.
fn project_variables(
    env: &mut Environment,
    params: &Parameters,
    options: &Options,
) -> Result<(), LaunchError> {
    env.set("PATH", ROOT_PATH)?;
    env.set(ENV_CONFIG_DIR, params.config_dir().display().to_string())?;
    env.set(VAR_CONFIG_DIR, params.config_dir().display().to_string())?;

    for (name, value) in params.iter() {
        // The import list shapes the filter; the script has no use for it.
        if name != VAR_IMPORT_ENVIRON {
            env.set(name, value)?;
        }
    }

    // Presence of the marker is the boolean; the value carries nothing.
    if options.debug {
        env.set(ENV_DEBUG, "")?;
    }
    if options.verbose > 0 {
        env.set(ENV_VERBOSE, "")?;
    }

    Ok(())
}

/// Enter the required directories in their fixed order.
///
/// Command directory, then daemon directory, then queue directory; each must
/// exist and be enterable. On failure the error names the offending
/// directory and no later directory is attempted.
pub fn enter_work_directories(dirs: &[PathBuf]) -> Result<(), LaunchError> {
    for dir in dirs {
        std::env::set_current_dir(dir).map_err(|e| LaunchError::WorkDirUnreachable {
            dir: dir.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

impl PreparedHandoff {
    /// Enter the workdir chain and replace the process image.
    ///
    /// Never returns on success. The returned error is the reason the
    /// transfer could not begin.
    pub fn transfer(self) -> LaunchError {
        if let Err(err) = enter_work_directories(&self.work_dirs) {
            return err;
        }

        let mut argv = self.argv.into_iter();
        let arg0 = argv.next().unwrap_or_else(|| SCRIPT_NAME.to_string());

        let mut command = Command::new(&self.script);
        command.arg0(arg0).args(argv).env_clear();
        for (name, value) in self.env.iter() {
            command.env(name, value);
        }

        let err = command.exec();
        LaunchError::TransferFailed {
            path: self.script.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Run the whole pipeline.
///
/// Returns only when a step fails; on success the process image has been
/// replaced and there is no "after".
pub fn run(args: &[String]) -> LaunchError {
    // Be consistent with file permissions.
    // SAFETY: umask only swaps the process file creation mask.
    unsafe { libc::umask(0o022) };

    // INIT_DIAGNOSTICS
    if let Err(err) = diagnostics::ensure_standard_descriptors() {
        return err;
    }
    diagnostics::init();

    let program = args
        .first()
        .map(|a| program_name(a).to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

    // VALIDATE_PRIVILEGE, before anything can influence behavior
    if let Err(err) = privilege::validate(&program) {
        return err;
    }

    match prepare(args, Environment::capture()) {
        Ok(handoff) => handoff.transfer(),
        Err(err) => err,
    }
}

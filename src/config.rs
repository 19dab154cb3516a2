//! Installation parameter binding.
//!
//! The launcher cares about a fixed set of configuration parameters: the
//! directories it must enter, the identities that own the mail system, and
//! the sibling tool and documentation paths it advertises to the maintenance
//! script. Each parameter has a declared default; the configuration store
//! overrides individual names.

use crate::environment::{Environment, ENV_CONFIG_DIR};
use crate::error::LaunchError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration directory when no override is present.
pub const DEF_CONFIG_DIR: &str = "/etc/postfix";

/// Name of the configuration store inside the configuration directory.
pub const MAIN_CONFIG_FILE: &str = "main.cf";

/// Exported name of the resolved configuration directory.
pub const VAR_CONFIG_DIR: &str = "config_directory";

/// Directory parameters entered during workdir preparation.
pub const VAR_COMMAND_DIR: &str = "command_directory";
pub const VAR_DAEMON_DIR: &str = "daemon_directory";
pub const VAR_QUEUE_DIR: &str = "queue_directory";

/// Ownership parameters.
pub const VAR_MAIL_OWNER: &str = "mail_owner";
pub const VAR_SGID_GROUP: &str = "setgid_group";

/// Sibling tool and documentation parameters.
pub const VAR_SENDMAIL_PATH: &str = "sendmail_path";
pub const VAR_MAILQ_PATH: &str = "mailq_path";
pub const VAR_NEWALIAS_PATH: &str = "newaliases_path";
pub const VAR_MANPAGE_DIR: &str = "manpage_directory";
pub const VAR_SAMPLE_DIR: &str = "sample_directory";
pub const VAR_README_DIR: &str = "readme_directory";
pub const VAR_HTML_DIR: &str = "html_directory";

/// Environment import allow-list parameter.
pub const VAR_IMPORT_ENVIRON: &str = "import_environment";

/// A declared installation parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: &'static str,
}

/// The declared parameter table, consumed in order to build the bound set.
///
/// Every name resolves to a non-empty string (default or override) before
/// any of it is used.
pub const INSTALL_PARAMETERS: &[ParamSpec] = &[
    ParamSpec {
        name: VAR_COMMAND_DIR,
        default: "/usr/sbin",
    },
    ParamSpec {
        name: VAR_DAEMON_DIR,
        default: "/usr/libexec/postfix",
    },
    ParamSpec {
        name: VAR_QUEUE_DIR,
        default: "/var/spool/postfix",
    },
    ParamSpec {
        name: VAR_MAIL_OWNER,
        default: "postfix",
    },
    ParamSpec {
        name: VAR_SGID_GROUP,
        default: "postdrop",
    },
    ParamSpec {
        name: VAR_SENDMAIL_PATH,
        default: "/usr/sbin/sendmail",
    },
    ParamSpec {
        name: VAR_MAILQ_PATH,
        default: "/usr/bin/mailq",
    },
    ParamSpec {
        name: VAR_NEWALIAS_PATH,
        default: "/usr/bin/newaliases",
    },
    ParamSpec {
        name: VAR_MANPAGE_DIR,
        default: "/usr/local/man",
    },
    ParamSpec {
        name: VAR_SAMPLE_DIR,
        default: "/etc/postfix",
    },
    ParamSpec {
        name: VAR_README_DIR,
        default: "no",
    },
    ParamSpec {
        name: VAR_HTML_DIR,
        default: "no",
    },
    ParamSpec {
        name: VAR_IMPORT_ENVIRON,
        default: "MAIL_CONFIG MAIL_DEBUG MAIL_LOGTAG TZ XAUTHORITY DISPLAY LANG=C",
    },
];

/// Bound installation parameters for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    config_dir: PathBuf,
    values: BTreeMap<&'static str, String>,
}

impl Parameters {
    /// The resolved configuration directory.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Look up a declared parameter.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not in the declared table; callers only pass the
    /// `VAR_*` constants from this module.
    pub fn get(&self, name: &str) -> &str {
        self.values
            .get(name)
            .unwrap_or_else(|| panic!("undeclared parameter: {name}"))
    }

    /// Iterate (name, value) pairs in declaration-independent sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Resolve the configuration directory from the environment snapshot.
///
/// Must run after the argument parser has applied any `-c` override.
pub fn resolve_config_dir(env: &Environment) -> PathBuf {
    env.get(ENV_CONFIG_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEF_CONFIG_DIR))
}

/// Load the declared parameters from `<config-dir>/main.cf`.
///
/// Names absent from the store resolve to their declared defaults.
///
/// # Errors
///
/// - `ConfigUnreadable` if the store cannot be read
/// - `ConfigMalformed` if a line does not parse
pub fn load(config_dir: &Path) -> Result<Parameters, LaunchError> {
    let path = config_dir.join(MAIN_CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|e| LaunchError::ConfigUnreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let overrides = parse_store(&text, &path)?;

    let mut values = BTreeMap::new();
    for spec in INSTALL_PARAMETERS {
        let value = overrides
            .get(spec.name)
            .cloned()
            .unwrap_or_else(|| spec.default.to_string());
        values.insert(spec.name, value);
    }

    Ok(Parameters {
        config_dir: config_dir.to_path_buf(),
        values,
    })
}

/// Parse the `name = value` store format.
///
/// `#` lines are comments, blank lines are ignored, and a line starting with
/// whitespace continues the previous value.
fn parse_store(text: &str, path: &Path) -> Result<BTreeMap<String, String>, LaunchError> {
    let mut entries: BTreeMap<String, String> = BTreeMap::new();
    let mut current: Option<String> = None;

    for (lineno, raw) in text.lines().enumerate() {
        let lineno = lineno + 1;
        let malformed = |reason: &str| LaunchError::ConfigMalformed {
            path: path.display().to_string(),
            line: lineno,
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            current = None;
            continue;
        }
        if raw.starts_with('#') {
            current = None;
            continue;
        }

        if raw.starts_with([' ', '\t']) {
            // Continuation of the previous value
            let name = current.as_ref().ok_or_else(|| malformed("continuation without a preceding setting"))?;
            let value = entries.get_mut(name.as_str()).unwrap_or_else(|| {
                unreachable!("continuation target always inserted first")
            });
            value.push(' ');
            value.push_str(raw.trim());
            continue;
        }

        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| malformed("expected \"name = value\""))?;
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(malformed("invalid parameter name"));
        }

        entries.insert(name.to_string(), value.trim().to_string());
        current = Some(name.to_string());
    }

    Ok(entries)
}

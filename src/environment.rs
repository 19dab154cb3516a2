//! Environment snapshot and import filter.
//!
//! The process environment is threaded through the launch pipeline as an
//! explicit value instead of being mutated in place. Only the final `exec`
//! installs it, with the parent environment cleared first.

use crate::error::LaunchError;
use std::collections::{BTreeMap, BTreeSet};

/// Environment variable naming the configuration directory override.
pub const ENV_CONFIG_DIR: &str = "MAIL_CONFIG";

/// Marker variable exported when debug mode was requested.
pub const ENV_DEBUG: &str = "MAIL_DEBUG";

/// Marker variable exported when verbose mode was requested.
pub const ENV_VERBOSE: &str = "MAIL_VERBOSE";

/// Search path exported to the maintenance script.
///
/// Fixed system directories only; the inherited PATH never survives.
pub const ROOT_PATH: &str = "/sbin:/usr/sbin:/bin:/usr/bin";

/// A deterministic snapshot of a process environment.
///
/// Keys iterate in sorted order so the environment handed to the external
/// procedure is reproducible for a given configuration and inherited state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    ///
    /// Entries that are not valid UTF-8 are dropped; nothing the launcher
    /// exports is allowed to be unrepresentable.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(name, value)| {
                    Some((name.into_string().ok()?, value.into_string().ok()?))
                })
                .collect(),
        }
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whether a variable is present.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Set a variable, replacing any existing value (clobber semantics).
    ///
    /// # Errors
    ///
    /// Returns `InvalidEnvironment` for entries that cannot legally cross
    /// exec: an empty name, a name containing `=`, or a NUL byte anywhere.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), LaunchError> {
        let name = name.into();
        let value = value.into();

        if name.is_empty() {
            return Err(LaunchError::InvalidEnvironment {
                name,
                reason: "empty name".to_string(),
            });
        }
        if name.contains('=') {
            return Err(LaunchError::InvalidEnvironment {
                name,
                reason: "name contains '='".to_string(),
            });
        }
        if name.contains('\0') || value.contains('\0') {
            return Err(LaunchError::InvalidEnvironment {
                name,
                reason: "embedded NUL byte".to_string(),
            });
        }

        self.vars.insert(name, value);
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate entries in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Import filter built from the `import_environment` parameter.
///
/// The parameter is a whitespace/comma separated list. A bare `name` entry
/// allow-lists that variable from the inherited environment; a `name=value`
/// entry is a fixed setting applied after filtering, so a booted and a
/// hand-started system observe the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportFilter {
    names: BTreeSet<String>,
    fixed: Vec<(String, String)>,
}

impl ImportFilter {
    /// Parse an import list specification.
    ///
    /// Duplicate names are ignored; order of first occurrence is irrelevant
    /// to the resulting set.
    pub fn parse(spec: &str) -> Self {
        let mut names = BTreeSet::new();
        let mut fixed = Vec::new();

        for entry in spec.split([' ', '\t', '\r', '\n', ',']) {
            if entry.is_empty() {
                continue;
            }
            match entry.split_once('=') {
                Some((name, value)) if !name.is_empty() => {
                    names.insert(name.to_string());
                    fixed.push((name.to_string(), value.to_string()));
                }
                _ => {
                    names.insert(entry.to_string());
                }
            }
        }

        Self { names, fixed }
    }

    /// Whether a variable name is allow-listed.
    pub fn is_allowed(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Produce the sanitized environment.
    ///
    /// The result contains exactly the inherited entries whose names are in
    /// the allow-list, with fixed `name=value` entries applied on top. No
    /// other inherited entry survives, regardless of value.
    pub fn apply(&self, inherited: &Environment) -> Result<Environment, LaunchError> {
        let mut result: Environment = inherited
            .iter()
            .filter(|(name, _)| self.is_allowed(name))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        for (name, value) in &self.fixed {
            result.set(name.clone(), value.clone())?;
        }

        Ok(result)
    }
}

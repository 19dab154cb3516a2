//! Command-line switch parsing.
//!
//! The launcher recognizes exactly three switches (`-c config_dir`, `-D`,
//! `-v`) with getopt semantics: switch clustering, attached or detached
//! switch arguments, and `--` ending switch processing. Everything after the
//! switches (the administrative command and its arguments) is opaque
//! pass-through data for the external procedure and is never interpreted
//! here.

use crate::diagnostics::program_name;
use crate::environment::{Environment, ENV_CONFIG_DIR};
use crate::error::LaunchError;
use std::path::PathBuf;

/// Switch values for one invocation, immutable after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Configuration directory override (`-c`), absolute.
    pub config_dir: Option<PathBuf>,

    /// Debug mode (`-D`).
    pub debug: bool,

    /// Verbosity level: one per `-v` occurrence.
    pub verbose: u32,
}

/// Result of parsing a full argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommandLine {
    pub options: Options,

    /// The argv token immediately preceding the first pass-through argument
    /// (the program name when no switches were given). The external
    /// procedure observes it as its argv[0], matching the historical
    /// `argv + optind - 1` handoff layout.
    pub placeholder: String,

    /// The administrative command and its arguments, original order.
    pub passthrough: Vec<String>,
}

/// Parse the launcher's argv.
///
/// On `-c`, the override is written into the environment snapshot
/// immediately, so that configuration loading observes it later.
///
/// # Errors
///
/// - `Usage` for an unknown switch or a missing `-c` argument
/// - `ConfigDirNotAbsolute` for a relative `-c` argument
pub fn parse(args: &[String], env: &mut Environment) -> Result<ParsedCommandLine, LaunchError> {
    let program = args
        .first()
        .map(|a| program_name(a).to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    let usage = || LaunchError::Usage {
        program: program.clone(),
    };

    let mut options = Options::default();
    let mut index = 1;

    while index < args.len() {
        let token = args[index].as_str();

        // "-" alone and anything not starting with "-" end switch processing.
        if token == "-" || !token.starts_with('-') {
            break;
        }
        if token == "--" {
            index += 1;
            break;
        }

        let mut chars = token[1..].chars();
        while let Some(switch) = chars.next() {
            match switch {
                'D' => options.debug = true,
                'v' => options.verbose += 1,
                'c' => {
                    // Attached argument (-c/etc/pf) or the next token.
                    let attached: String = chars.collect();
                    let dir = if !attached.is_empty() {
                        attached
                    } else {
                        index += 1;
                        args.get(index).cloned().ok_or_else(|| usage())?
                    };
                    let dir = PathBuf::from(dir);
                    if !dir.is_absolute() {
                        return Err(LaunchError::ConfigDirNotAbsolute {
                            path: dir.display().to_string(),
                        });
                    }
                    env.set(ENV_CONFIG_DIR, dir.display().to_string())?;
                    options.config_dir = Some(dir);
                    break;
                }
                _ => return Err(usage()),
            }
        }

        index += 1;
    }

    // argv[optind - 1]: the token before the first pass-through argument.
    let placeholder = args
        .get(index.saturating_sub(1))
        .cloned()
        .unwrap_or(program);

    Ok(ParsedCommandLine {
        options,
        placeholder,
        passthrough: args[index.min(args.len())..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn parse_ok(tokens: &[&str]) -> (ParsedCommandLine, Environment) {
        let mut env = Environment::new();
        let parsed = parse(&argv(tokens), &mut env).unwrap();
        (parsed, env)
    }

    #[test]
    fn test_bare_command() {
        let (parsed, env) = parse_ok(&["postctl", "check"]);
        assert_eq!(parsed.options, Options::default());
        assert_eq!(parsed.placeholder, "postctl");
        assert_eq!(parsed.passthrough, argv(&["check"]));
        assert!(env.is_empty());
    }

    #[test]
    fn test_empty_passthrough_allowed() {
        // The command token is validated by the external procedure, not here.
        let (parsed, _) = parse_ok(&["postctl"]);
        assert!(parsed.passthrough.is_empty());
        assert_eq!(parsed.placeholder, "postctl");
    }

    #[test]
    fn test_debug_switch() {
        let (parsed, _) = parse_ok(&["postctl", "-D", "start"]);
        assert!(parsed.options.debug);
        assert_eq!(parsed.passthrough, argv(&["start"]));
    }

    #[test]
    fn test_verbose_counts_occurrences() {
        let (parsed, _) = parse_ok(&["postctl", "-v", "-v", "-v", "status"]);
        assert_eq!(parsed.options.verbose, 3);
    }

    #[test]
    fn test_clustered_switches() {
        let (parsed, _) = parse_ok(&["postctl", "-Dvv", "start"]);
        assert!(parsed.options.debug);
        assert_eq!(parsed.options.verbose, 2);
    }

    #[test]
    fn test_config_dir_detached_argument() {
        let (parsed, env) = parse_ok(&["postctl", "-c", "/etc/postfix-alt", "reload"]);
        assert_eq!(
            parsed.options.config_dir,
            Some(PathBuf::from("/etc/postfix-alt"))
        );
        // Exported into the snapshot before configuration loading runs
        assert_eq!(env.get(ENV_CONFIG_DIR), Some("/etc/postfix-alt"));
        assert_eq!(parsed.passthrough, argv(&["reload"]));
    }

    #[test]
    fn test_config_dir_attached_argument() {
        let (parsed, env) = parse_ok(&["postctl", "-c/etc/postfix-alt", "reload"]);
        assert_eq!(
            parsed.options.config_dir,
            Some(PathBuf::from("/etc/postfix-alt"))
        );
        assert_eq!(env.get(ENV_CONFIG_DIR), Some("/etc/postfix-alt"));
    }

    #[test]
    fn test_config_dir_must_be_absolute() {
        let mut env = Environment::new();
        let result = parse(&argv(&["postctl", "-c", "relative/path", "check"]), &mut env);
        assert!(matches!(
            result,
            Err(LaunchError::ConfigDirNotAbsolute { .. })
        ));
        // No partial side effects
        assert!(env.is_empty());
    }

    #[test]
    fn test_config_dir_missing_argument() {
        let mut env = Environment::new();
        let result = parse(&argv(&["postctl", "-c"]), &mut env);
        assert!(matches!(result, Err(LaunchError::Usage { .. })));
    }

    #[test]
    fn test_unknown_switch_is_usage_error() {
        let mut env = Environment::new();
        let result = parse(&argv(&["postctl", "-x", "check"]), &mut env);
        assert!(matches!(result, Err(LaunchError::Usage { .. })));
    }

    #[test]
    fn test_usage_error_names_program() {
        let mut env = Environment::new();
        let err = parse(&argv(&["/usr/sbin/postctl", "-x"]), &mut env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "usage: postctl [-c config_dir] [-Dv] command"
        );
    }

    #[test]
    fn test_passthrough_not_interpreted() {
        // Switch-looking tokens after the command belong to the external
        // procedure.
        let (parsed, _) = parse_ok(&["postctl", "-v", "set-permissions", "-x", "a=b"]);
        assert_eq!(parsed.passthrough, argv(&["set-permissions", "-x", "a=b"]));
    }

    #[test]
    fn test_placeholder_is_last_switch_token() {
        let (parsed, _) = parse_ok(&["postctl", "-c", "/etc/postfix", "check"]);
        assert_eq!(parsed.placeholder, "/etc/postfix");
    }

    #[test]
    fn test_double_dash_ends_switches() {
        let (parsed, _) = parse_ok(&["postctl", "-v", "--", "-D", "check"]);
        assert_eq!(parsed.options.verbose, 1);
        assert!(!parsed.options.debug);
        assert_eq!(parsed.placeholder, "--");
        assert_eq!(parsed.passthrough, argv(&["-D", "check"]));
    }

    #[test]
    fn test_lone_dash_is_passthrough() {
        let (parsed, _) = parse_ok(&["postctl", "-", "check"]);
        assert_eq!(parsed.passthrough, argv(&["-", "check"]));
        assert_eq!(parsed.placeholder, "postctl");
    }
}

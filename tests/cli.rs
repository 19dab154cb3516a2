//! Binary-level tests for the fatal paths.
//!
//! The launcher's success path replaces the process image and needs a real
//! superuser plus an installed mail system, so these tests pin down the
//! failure behavior: non-zero exit and a single diagnostic line. Expected
//! messages depend on whether the harness runs privileged, because the
//! privilege check deliberately runs before argument parsing.

use assert_cmd::Command;
use postctl::Identity;
use predicates::prelude::*;
use tempfile::TempDir;

fn postctl() -> Command {
    let mut cmd = Command::cargo_bin("postctl").unwrap();
    cmd.env_remove("MAIL_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn running_as_root() -> bool {
    Identity::current().uid == 0
}

#[test]
fn test_failure_reports_fatal_diagnostic() {
    postctl()
        .arg("-x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fatal:"));
}

#[test]
fn test_unknown_switch() {
    let assert = postctl().args(["-x", "check"]).assert().failure();
    if running_as_root() {
        assert.stderr(predicate::str::contains("usage:"));
    } else {
        assert.stderr(predicate::str::contains("reserved for the superuser"));
    }
}

#[test]
fn test_relative_config_dir() {
    let assert = postctl()
        .args(["-c", "relative/path", "check"])
        .assert()
        .failure();
    if running_as_root() {
        assert.stderr(predicate::str::contains("absolute pathname"));
    } else {
        assert.stderr(predicate::str::contains("reserved for the superuser"));
    }
}

#[test]
fn test_unprivileged_invocation_hints_at_sendmail() {
    if running_as_root() {
        return;
    }
    postctl()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("use the sendmail command"))
        .stderr(predicate::str::contains("reserved for the superuser"));
}

#[test]
fn test_missing_configuration_store() {
    if !running_as_root() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    postctl()
        .args(["-c", &tmp.path().display().to_string(), "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"))
        .stderr(predicate::str::contains("main.cf"));
}

#[test]
fn test_missing_script_names_attempted_path() {
    if !running_as_root() {
        return;
    }
    let tmp = TempDir::new().unwrap();
    for dir in ["sbin", "libexec", "spool"] {
        std::fs::create_dir(tmp.path().join(dir)).unwrap();
    }
    let store = format!(
        "command_directory = {base}/sbin\n\
         daemon_directory = {base}/libexec\n\
         queue_directory = {base}/spool\n",
        base = tmp.path().display()
    );
    std::fs::write(tmp.path().join("main.cf"), store).unwrap();

    let script = tmp.path().join("postfix-script").display().to_string();
    postctl()
        .args(["-c", &tmp.path().display().to_string(), "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to execute"))
        .stderr(predicate::str::contains(script));
}

#[test]
fn test_successful_transfer_runs_the_script() {
    if !running_as_root() {
        return;
    }
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    for dir in ["sbin", "libexec", "spool"] {
        std::fs::create_dir(tmp.path().join(dir)).unwrap();
    }
    let store = format!(
        "command_directory = {base}/sbin\n\
         daemon_directory = {base}/libexec\n\
         queue_directory = {base}/spool\n",
        base = tmp.path().display()
    );
    std::fs::write(tmp.path().join("main.cf"), store).unwrap();

    // The stand-in script reports what the launcher handed it
    let script = tmp.path().join("postfix-script");
    std::fs::write(
        &script,
        "#!/bin/sh\necho \"argv0=$0 cmd=$1 owner=$mail_owner path=$PATH\"\necho \"preload=${LD_PRELOAD:-scrubbed}\"\npwd\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let config_dir = tmp.path().display().to_string();
    postctl()
        .args(["-c", &config_dir, "check"])
        .env("LD_PRELOAD", "/evil/lib.so")
        .assert()
        .success()
        .stdout(predicate::str::contains("cmd=check"))
        .stdout(predicate::str::contains("owner=postfix"))
        .stdout(predicate::str::contains("path=/sbin:/usr/sbin:/bin:/usr/bin"))
        .stdout(predicate::str::contains("preload=scrubbed"))
        .stdout(predicate::str::contains("/spool"));
}

// cleanvars/tests/cli_integration_tests.rs
//! Command-line integration tests for the `cleanvars` executable.
//!
//! The tests run the real binary with `assert_cmd`, feeding input over
//! stdin or through temporary files, and assert on the scrubbed output.

use std::fs;
use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn run_cleanvars(input: &str, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cleanvars").unwrap();
    cmd.args(args);
    cmd.write_stdin(input);
    cmd.assert()
}

#[test]
fn scrubs_stdin_to_stdout() {
    run_cleanvars("password: hunter2\n", &[])
        .success()
        .stdout("password: \"{{ password }}\"\n");
}

#[test]
fn non_secret_input_passes_through() {
    run_cleanvars("hosts: localhost\nstate: present\n", &[])
        .success()
        .stdout("hosts: localhost\nstate: present\n");
}

#[test]
fn reads_input_file_and_writes_output_file() {
    let mut input = NamedTempFile::new().unwrap();
    write!(input, "my-secret: a-secret\nemail: fooo@bar.ca\n").unwrap();
    let output = NamedTempFile::new().unwrap();

    let mut cmd = Command::cargo_bin("cleanvars").unwrap();
    cmd.arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success()
        .stdout("");

    let scrubbed = fs::read_to_string(output.path()).unwrap();
    assert_eq!(
        scrubbed,
        "my-secret: \"{{ my_secret }}\"\nemail: lucas14@example.com\n"
    );
}

#[test]
fn custom_template_flag() {
    run_cleanvars("password: hunter2\n", &["--template", "<hidden:${name}>"])
        .success()
        .stdout("password: \"<hidden:password>\"\n");
}

#[test]
fn template_from_environment() {
    let mut cmd = Command::cargo_bin("cleanvars").unwrap();
    cmd.env("CLEANVARS_TEMPLATE", "<hidden:${name}>");
    cmd.write_stdin("password: hunter2\n");
    cmd.assert()
        .success()
        .stdout("password: \"<hidden:password>\"\n");
}

#[test]
fn missing_input_file_fails_with_context() {
    let mut cmd = Command::cargo_bin("cleanvars").unwrap();
    cmd.arg("/nonexistent/vars.yml");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn quiet_and_debug_conflict() {
    let mut cmd = Command::cargo_bin("cleanvars").unwrap();
    cmd.args(["-q", "-d"]);
    cmd.write_stdin("");
    cmd.assert().failure();
}

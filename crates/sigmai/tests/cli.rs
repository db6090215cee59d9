//! End-to-end CLI tests: spawn the compiled `sigmai` binary and assert on
//! its exit code, mirroring the teacher's own `tests/test_cli_commands.rs`
//! (spawn the binary, check `output.status`) rather than calling `run()`
//! in-process — the exit-code taxonomy (§7) is part of the CLI's contract.

use std::process::{Command, Output};

fn sigmai(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sigmai"))
        .args(args)
        .output()
        .expect("failed to spawn sigmai")
}

#[test]
fn help_exits_successfully() {
    let output = sigmai(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sigmai"));
}

#[test]
fn missing_misp_url_and_key_exits_source_setup() {
    let output = sigmai(&[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn directory_target_without_path_exits_target_setup() {
    let output = sigmai(&[
        "--misp-url",
        "https://misp.example.org",
        "--misp-key",
        "secret",
        "--target",
        "directory",
    ]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn directory_target_with_nonexistent_path_exits_target_setup() {
    let output = sigmai(&[
        "--misp-url",
        "https://misp.example.org",
        "--misp-key",
        "secret",
        "--target",
        "directory",
        "--directory-path",
        "/nonexistent/path/for/sigmai/tests",
    ]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn invalid_interval_exits_invalid_args() {
    let output = sigmai(&[
        "--misp-url",
        "https://misp.example.org",
        "--misp-key",
        "secret",
        "--interval",
        "not-a-duration",
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unknown_flag_is_rejected_by_argument_parser() {
    let output = sigmai(&["--not-a-real-flag"]);
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn minimum_worker_count_is_enforced() {
    let output = sigmai(&[
        "--misp-url",
        "https://misp.example.org",
        "--misp-key",
        "secret",
        "--misp-workers",
        "1",
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests that run the `dotfiles` binary itself.
//!
//! These cover what only `main` decides: exit status and how a failing
//! command's error reaches the terminal.

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    let cache = tempfile::tempdir().expect("create cache dir");
    Command::new(env!("CARGO_BIN_EXE_dotfiles"))
        .args(args)
        .env("XDG_CACHE_HOME", cache.path())
        .output()
        .expect("run dotfiles")
}

#[test]
fn failing_command_reports_its_error_once() {
    let out = run(&["test", "bogus.x"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(
        stderr.matches("invalid condition 'bogus'").count(),
        1,
        "stderr was: {stderr}"
    );
}

#[test]
fn version_succeeds() {
    let out = run(&["version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("dotfiles "));
}

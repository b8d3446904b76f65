//! CLI-level error handling specs that don't need a running daemon.

use crate::prelude::*;

#[test]
fn say_with_no_words_fails() {
    cli().args(&["say"]).fails().stderr_has("required");
}

#[test]
fn unknown_subcommand_fails() {
    cli().args(&["frobnicate"]).fails();
}

#[test]
fn queue_list_rejects_unknown_filter() {
    cli()
        .args(&["queue", "list", "--filter", "nonsense"])
        .fails()
        .stderr_has("nonsense");
}

#[test]
fn status_against_no_daemon_reports_not_running() {
    let state_dir = tempfile::tempdir().unwrap();
    cli()
        .env("LEON_STATE_DIR", state_dir.path())
        .args(&["status"])
        .passes()
        .stdout_has("not running");
}

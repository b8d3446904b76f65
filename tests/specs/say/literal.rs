//! Literal command dispatch (spec.md §4.2 step 1): `status`, `/agents`,
//! `/help`, and `quit` never reach an LM provider, so these pass with no
//! provider configured.

use serial_test::serial;

use crate::prelude::*;

#[test]
#[serial(leond)]
fn say_status_reports_uptime_and_queue_depth() {
    let daemon = Daemon::start();
    daemon
        .leon()
        .args(&["say", "status"])
        .passes()
        .stdout_has("queued")
        .stdout_has("running agents");
}

#[test]
#[serial(leond)]
fn say_help_lists_literal_commands() {
    let daemon = Daemon::start();
    daemon
        .leon()
        .args(&["say", "/help"])
        .passes()
        .stdout_has("status")
        .stdout_has("quit");
}

#[test]
#[serial(leond)]
fn say_agents_reports_none_running() {
    let daemon = Daemon::start();
    daemon.leon().args(&["say", "/agents"]).passes().stdout_has("no agents running");
}

#[test]
#[serial(leond)]
fn say_quit_shuts_the_daemon_down() {
    let daemon = Daemon::start();
    daemon.leon().args(&["say", "quit"]).passes().stdout_has("shutting down");

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            daemon.leon().args(&["daemon", "status"]).run().stdout().contains("not running")
        }),
        "daemon should exit after a literal quit command"
    );
}

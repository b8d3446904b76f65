//! Daemon lifecycle specs (spec.md §4.1, §6).
//!
//! Binds the dashboard/bridge listeners on their default ports, so these
//! run `#[serial]` against every other test that starts a real daemon.

use serial_test::serial;

use crate::prelude::*;

#[test]
#[serial(leond)]
fn start_then_status_then_stop() {
    let daemon = Daemon::start();

    daemon
        .leon()
        .args(&["status"])
        .passes()
        .stdout_has("Status: running");

    daemon.leon().args(&["daemon", "stop"]).passes().stdout_has("Daemon stopped");

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            daemon.leon().args(&["daemon", "status"]).run().code() != Some(0)
                || daemon.leon().args(&["status"]).run().stdout().contains("not running")
        }),
        "daemon should report not running after stop"
    );
}

#[test]
#[serial(leond)]
fn stop_is_idempotent() {
    let daemon = Daemon::start();
    daemon.leon().args(&["daemon", "stop"]).passes();
    // A second stop against an already-stopped daemon must not error.
    daemon.leon().args(&["daemon", "stop"]).passes().stdout_has("not running");
}

#[test]
#[serial(leond)]
fn quarantined_tasks_file_surfaces_self_notice() {
    let daemon = Daemon::start();
    daemon.leon().args(&["daemon", "stop"]).passes();

    std::fs::write(daemon.state_path().join("tasks.json"), "{not valid json").unwrap();

    daemon.leon().args(&["daemon", "start"]).passes();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        daemon.leon().args(&["status"]).run().stdout().contains("Status: running")
    }));

    let entries: Vec<_> = std::fs::read_dir(daemon.state_path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        entries.iter().any(|name| name.starts_with("tasks.corrupt.")),
        "expected a quarantined tasks.json.corrupt.<ts> file, saw: {entries:?}"
    );
}

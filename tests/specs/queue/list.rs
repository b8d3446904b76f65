//! `leon queue list` specs.

use serial_test::serial;

use crate::prelude::*;

#[test]
#[serial(leond)]
fn empty_queue_reports_no_tasks() {
    let daemon = Daemon::start();
    daemon.leon().args(&["queue", "list"]).passes().stdout_has("No tasks");
}

#[test]
#[serial(leond)]
fn queue_list_honors_filter() {
    let daemon = Daemon::start();
    daemon
        .leon()
        .args(&["queue", "list", "--filter", "queued"])
        .passes()
        .stdout_has("No tasks");
}

#[test]
#[serial(leond)]
fn queue_list_json_is_an_array() {
    let daemon = Daemon::start();
    daemon
        .leon()
        .args(&["--output", "json", "queue", "list"])
        .passes()
        .stdout_has("[]");
}

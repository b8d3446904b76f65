//! `leon agent list`/`show` specs.

use serial_test::serial;

use crate::prelude::*;

#[test]
#[serial(leond)]
fn no_agents_running_by_default() {
    let daemon = Daemon::start();
    daemon.leon().args(&["agent", "list"]).passes().stdout_has("No agents found");
}

#[test]
#[serial(leond)]
fn show_unknown_agent_fails() {
    let daemon = Daemon::start();
    daemon.leon().args(&["agent", "show", "not-a-real-agent-id"]).fails().stderr_has("Agent not found");
}

//! `leon job list` specs.

use serial_test::serial;

use crate::prelude::*;

#[test]
#[serial(leond)]
fn no_jobs_registered_by_default() {
    let daemon = Daemon::start();
    daemon.leon().args(&["job", "list"]).passes().stdout_has("No scheduled jobs");
}

#[test]
#[serial(leond)]
fn running_unknown_job_fails() {
    let daemon = Daemon::start();
    daemon.leon().args(&["job", "run", "does-not-exist"]).fails();
}

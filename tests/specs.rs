//! Behavioral specifications for the leon CLI + daemon.
//!
//! These tests are black-box: they invoke the `leon`/`leond` binaries and
//! verify stdout, stderr, and exit codes. See tests/specs/prelude.rs for
//! conventions.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/help.rs"]
mod cli_help;
#[path = "specs/cli/errors.rs"]
mod cli_errors;

// daemon/
#[path = "specs/daemon/lifecycle.rs"]
mod daemon_lifecycle;

// queue/
#[path = "specs/queue/list.rs"]
mod queue_list;

// job/
#[path = "specs/job/list.rs"]
mod job_list;

// agent/
#[path = "specs/agent/list.rs"]
mod agent_list;

// say/
#[path = "specs/say/literal.rs"]
mod say_literal;

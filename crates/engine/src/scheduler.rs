// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler (spec.md §4.5) — fires named jobs at a cadence and routes
//! their outcomes back through the router (built-ins directly, user jobs
//! through full routing).

use tracing::{info, warn};

use leon_core::scheduled_job::{ScheduledJob, DEFAULT_ALERT_THRESHOLD};

/// What the caller should do with a job that just fired (spec.md §4.5:
/// "built-in jobs... are dispatched to the built-in handler directly; user
/// jobs go through full routing").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired<'a> {
    Builtin { token: &'a str },
    Prompt { text: &'a str },
}

/// Walk `jobs` for any whose `next_run_at_ms <= now_ms`. Returns the names
/// of jobs that fired this tick; callers invoke the handler for each,
/// then call [`Scheduler::record_outcome`] with the result before the next
/// tick (spec.md §4.5 invariant: "advanced atomically with the handler
/// call").
pub struct Scheduler;

impl Scheduler {
    /// Collect the names of due jobs without mutating them — the caller
    /// dispatches each handler, then calls `record_outcome` for exactly the
    /// jobs it actually ran.
    pub fn due_jobs(jobs: &[ScheduledJob], now_ms: u64) -> Vec<String> {
        jobs.iter().filter(|j| j.is_due(now_ms)).map(|j| j.name.clone()).collect()
    }

    /// Record a job's tick outcome: reschedule `next_run_at_ms` atomically
    /// with the result, and returns `true` exactly once — the tick the job
    /// crosses the consecutive-failure alert threshold (spec.md §8 P7).
    pub fn record_outcome(job: &mut ScheduledJob, now_ms: u64, succeeded: bool) -> bool {
        job.reschedule(now_ms);
        if succeeded {
            job.record_success();
            info!(job = %job.name, "scheduled job succeeded");
            false
        } else {
            let alerting = job.record_failure(DEFAULT_ALERT_THRESHOLD);
            if alerting {
                warn!(job = %job.name, failures = job.consecutive_failures, "scheduled job crossed alert threshold");
            }
            alerting
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

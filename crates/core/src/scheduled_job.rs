// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduled job record (spec.md §3 "Scheduled job", §4.5).

use serde::{Deserialize, Serialize};

/// Consecutive failures before a job is marked `alerting` (spec.md §3).
pub const DEFAULT_ALERT_THRESHOLD: u32 = 3;

/// Minimum tick granularity the scheduler guarantees (spec.md §9 Open
/// Question: the source implies >=1s cadence; this spec fixes 1Hz as the
/// floor).
pub const MIN_TICK_HZ: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cadence {
    /// Fire every `period_ms`, forever.
    Interval { period_ms: u64 },
    /// Fire exactly once at `at_epoch_ms`, then the job is spent.
    OneShot { at_epoch_ms: u64 },
}

/// What a job does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobCommand {
    /// Dispatched directly to the built-in handler, bypassing routing.
    Builtin { token: String },
    /// A user-level prompt that goes through full routing.
    Prompt { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobResult {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub name: String,
    pub cadence: Cadence,
    pub command: JobCommand,
    pub next_run_at_ms: u64,
    #[serde(default)]
    pub consecutive_failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<JobResult>,
    #[serde(default)]
    pub alerting: bool,
}

impl ScheduledJob {
    pub fn new(name: impl Into<String>, cadence: Cadence, command: JobCommand, next_run_at_ms: u64) -> Self {
        Self {
            name: name.into(),
            cadence,
            command,
            next_run_at_ms,
            consecutive_failures: 0,
            last_result: None,
            alerting: false,
        }
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.next_run_at_ms <= now_ms
    }

    /// Advance `next_run_at` atomically with the handler call: never before
    /// (would lose a scheduled fire on crash), never drift-compounding after
    /// a long-running call (spec.md §4.5 invariant).
    pub fn reschedule(&mut self, now_ms: u64) {
        if let Cadence::Interval { period_ms } = self.cadence {
            let candidate = self.next_run_at_ms + period_ms;
            self.next_run_at_ms = candidate.max(now_ms);
        }
    }

    /// Record success: resets the consecutive-failure counter.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.last_result = Some(JobResult::Success);
        self.alerting = false;
    }

    /// Record failure. Returns `true` exactly once — the tick this job
    /// crosses the alert threshold — so callers emit exactly one alert
    /// utterance (spec.md §8 P7).
    pub fn record_failure(&mut self, threshold: u32) -> bool {
        self.consecutive_failures += 1;
        self.last_result = Some(JobResult::Error);
        if self.consecutive_failures >= threshold && !self.alerting {
            self.alerting = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[path = "scheduled_job_tests.rs"]
mod tests;

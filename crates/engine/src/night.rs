// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Night-mode dispatcher (spec.md §4.6) — drains the overnight backlog into
//! the task queue without overwhelming the supervisor.

use std::time::Duration;

use tokio::sync::Mutex;

/// Default quiet period before the gate re-opens after an interactive
/// utterance (spec.md §4.6 "default 120s").
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(120);

/// Night window configuration (spec.md §4.6 "default 00:00-06:00 local").
#[derive(Debug, Clone, Copy)]
pub struct NightGateConfig {
    pub enabled: bool,
    /// Minutes since local midnight the window opens.
    pub window_start_minute: u32,
    /// Minutes since local midnight the window closes.
    pub window_end_minute: u32,
    pub quiet_period: Duration,
}

impl Default for NightGateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window_start_minute: 0,
            window_end_minute: 6 * 60,
            quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }
}

/// Evaluate the night-mode gate (spec.md §4.6 "Gate"): operator toggle,
/// wall-clock window, and quiet period since the last interactive utterance.
/// An interactive utterance closes the gate immediately — callers pass the
/// timestamp of the most recent one, so this needs no separate "abort" state
/// (spec.md §4.6 "Abort").
pub fn gate_open(
    config: &NightGateConfig,
    minute_of_day: u32,
    now_ms: u64,
    last_interactive_utterance_ms: Option<u64>,
) -> bool {
    if !config.enabled || !within_window(config, minute_of_day) {
        return false;
    }
    let quiet_ms = config.quiet_period.as_millis() as u64;
    match last_interactive_utterance_ms {
        Some(last) => now_ms.saturating_sub(last) >= quiet_ms,
        None => true,
    }
}

fn within_window(config: &NightGateConfig, minute_of_day: u32) -> bool {
    if config.window_start_minute <= config.window_end_minute {
        minute_of_day >= config.window_start_minute && minute_of_day < config.window_end_minute
    } else {
        // Window wraps past midnight, e.g. 22:00-06:00.
        minute_of_day >= config.window_start_minute || minute_of_day < config.window_end_minute
    }
}

/// Serializes the dispatch critical section so the awareness loop's periodic
/// trigger and a manual trigger can't over- or under-dispatch against the
/// supervisor's concurrency ceiling (spec.md §4.6 "Dispatch": "respecting the
/// supervisor's concurrency ceiling *with a held lock*").
#[derive(Default)]
pub struct NightDispatcher {
    lock: Mutex<()>,
}

impl NightDispatcher {
    pub fn new() -> Self {
        Self { lock: Mutex::new(()) }
    }

    /// Run `operation` — which should read `running + in_flight` against the
    /// ceiling and, if there's room, pop a backlog entry and enqueue it —
    /// inside a single held-lock critical section.
    pub async fn try_dispatch<F, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> T,
    {
        let _guard = self.lock.lock().await;
        operation()
    }
}

#[cfg(test)]
#[path = "night_tests.rs"]
mod tests;

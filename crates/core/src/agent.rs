// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identifier and state types (spec.md §3 "Agent", invariants A1–A3).
//!
//! An `Agent` is a live child process running the external coding-assistant
//! CLI. `AgentId` is distinct from the task it backs (`task_id`) and from
//! any session id an adapter tracks internally.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::task::TaskId;

crate::define_id! {
    /// Unique identifier for a live agent (child process) instance.
    pub struct AgentId;
}

/// Lifecycle state of a tracked child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentLifecycle {
    Spawning,
    Running,
    Exiting,
    Reaped,
}

/// Categorized failure reasons surfaced by the monitoring loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentError {
    Unauthorized,
    OutOfCredits,
    NoInternet,
    RateLimited,
    NoProgressTimeout,
    HardTimeout,
    Other(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Unauthorized => write!(f, "unauthorized"),
            AgentError::OutOfCredits => write!(f, "out of credits"),
            AgentError::NoInternet => write!(f, "no internet connection"),
            AgentError::RateLimited => write!(f, "rate limited"),
            AgentError::NoProgressTimeout => write!(f, "no-progress timeout"),
            AgentError::HardTimeout => write!(f, "hard timeout"),
            AgentError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// A live child process (spec.md §3 "Agent").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub project_path: PathBuf,
    pub started_at_ms: u64,
    pub state: AgentLifecycle,
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AgentError>,
    /// Last time the supervisor observed stdout/stderr tail growth
    /// (activity heartbeat for the no-progress timeout, spec.md §4.4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_ms: Option<u64>,
}

impl Agent {
    pub fn new(
        id: AgentId,
        task_id: TaskId,
        project_path: PathBuf,
        started_at_ms: u64,
        stdout_path: PathBuf,
        stderr_path: PathBuf,
    ) -> Self {
        Self {
            id,
            task_id,
            pid: None,
            project_path,
            started_at_ms,
            state: AgentLifecycle::Spawning,
            stdout_path,
            stderr_path,
            exit_code: None,
            summary: None,
            error: None,
            last_activity_ms: Some(started_at_ms),
        }
    }

    /// Invariant A1: `pid` is valid only while running/exiting.
    pub fn is_pid_valid(&self) -> bool {
        matches!(self.state, AgentLifecycle::Running | AgentLifecycle::Exiting)
    }

    pub fn mark_running(&mut self, pid: u32) {
        self.pid = Some(pid);
        self.state = AgentLifecycle::Running;
    }

    pub fn mark_exiting(&mut self, exit_code: Option<i32>) {
        self.state = AgentLifecycle::Exiting;
        self.exit_code = exit_code;
    }

    /// Invariant A2: handles are released on any exit path. Reaping clears
    /// `pid` so a stale value can never be mistaken for a live process.
    pub fn mark_reaped(&mut self) {
        self.state = AgentLifecycle::Reaped;
        self.pid = None;
    }

    pub fn touch_activity(&mut self, now_ms: u64) {
        self.last_activity_ms = Some(now_ms);
    }

    pub fn idle_for_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_activity_ms.unwrap_or(self.started_at_ms))
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identifier and state machine (spec.md §3 "Task", invariants I1–I3).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::agent::AgentId;

crate::define_id! {
    /// Unique identifier for a unit of deferred work.
    ///
    /// Preserved across retries (spec.md §9 Open Question: a re-queued task
    /// keeps its original id so Invariant I1 stays meaningful).
    pub struct TaskId;
}

/// Default cap on retained `completed`/`failed` entries (spec.md §3 I3, §4.3 Q I1).
pub const RETENTION_CAP: usize = 200;

/// Default retry budget for `agent_spawn` tasks (spec.md §9 Open Question,
/// decided: 2 — documented in DESIGN.md).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    AgentSpawn,
    Builtin,
    UserFollowup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    InFlight,
    Completed,
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Queued => "queued",
            TaskStatus::InFlight => "in_flight",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A unit of deferred work (spec.md §3 "Task").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    /// Opaque brief for `agent_spawn`, or a command token for `builtin`.
    pub brief: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    pub created_at_ms: u64,
    pub attempts: u32,
    pub max_attempts: u32,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent_id: Option<AgentId>,
}

impl Task {
    pub fn new(id: TaskId, kind: TaskKind, brief: impl Into<String>, created_at_ms: u64) -> Self {
        Self {
            id,
            kind,
            brief: brief.into(),
            project_path: None,
            created_at_ms,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            status: TaskStatus::Queued,
            last_error: None,
            assigned_agent_id: None,
        }
    }

    pub fn with_project(mut self, path: PathBuf) -> Self {
        self.project_path = Some(path);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Transition `queued -> in_flight`. Caller (the queue) is responsible
    /// for the at-most-one-in-flight invariant (I1); this only mutates the
    /// single task's own state.
    pub fn mark_claimed(&mut self, agent_id: Option<AgentId>) {
        self.status = TaskStatus::InFlight;
        self.assigned_agent_id = agent_id;
    }

    pub fn mark_completed(&mut self) {
        self.status = TaskStatus::Completed;
        self.assigned_agent_id = None;
    }

    /// Record a failure. Returns `true` if the task should be re-queued
    /// (attempts remain), `false` if it has exhausted its retry budget and
    /// moved to the terminal `failed` state (spec.md §3 I2).
    pub fn mark_failed(&mut self, error: impl Into<String>) -> bool {
        self.attempts += 1;
        self.last_error = Some(error.into());
        self.assigned_agent_id = None;
        if self.attempts < self.max_attempts {
            self.status = TaskStatus::Queued;
            true
        } else {
            self.status = TaskStatus::Failed;
            false
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire DTOs for the daemon's query surface. These mirror `leon-core`
//! types but are independently serializable so the wire format doesn't
//! change shape every time an internal invariant does.

use serde::{Deserialize, Serialize};

use leon_core::{AgentId, TaskId};

/// Outcome of routing a single utterance (spec.md §4.2 "Output contract"),
/// reported back to whichever front-end submitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UtteranceOutcome {
    Reply { text: String },
    TaskEnqueued { task_id: TaskId },
    SkillResult { skill: String, text: String },
    SkillDenied { skill: String },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    pub id: AgentId,
    pub task_id: TaskId,
    pub pid: Option<u32>,
    pub project_path: String,
    pub state: String,
    pub started_at_ms: u64,
    pub exit_code: Option<i32>,
    pub summary: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    pub id: TaskId,
    pub kind: String,
    pub brief: String,
    pub project_path: Option<String>,
    pub status: String,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
    pub assigned_agent_id: Option<AgentId>,
}

/// Which of the task-queue's lists a `Query::Tasks` request selects
/// (spec.md §4.3 `list_queued`/`list_in_flight`/`list_recent`); `All`
/// unions them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    Queued,
    InFlight,
    Completed,
    Failed,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEntry {
    pub name: String,
    pub cadence: String,
    pub next_run_at_ms: u64,
    pub consecutive_failures: u32,
    pub alerting: bool,
    pub last_result: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightSummary {
    pub gate_open: bool,
    pub pending: usize,
    pub running: usize,
    pub max_concurrent: usize,
    pub recent_outcomes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSummary {
    pub uptime_secs: u64,
    pub conversation_len: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub completed: usize,
    pub failed: usize,
    pub running_agents: usize,
    pub max_concurrent: usize,
    pub night_gate_open: bool,
    pub scheduler_jobs: usize,
    pub scheduler_alerting: usize,
    pub memory_dirty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub category: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySummary {
    pub conversation_len: usize,
    pub completed_tasks: usize,
    pub profile: Vec<ProfileEntry>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntryDto {
    pub role: String,
    pub text: String,
    pub timestamp_ms: u64,
}

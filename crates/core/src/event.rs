// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events that drive state transitions and the durable WAL.
//!
//! Serializes as `{"type": "namespace:name", ...fields}`; unknown tags
//! deserialize to `Custom` so a WAL written by a newer build doesn't
//! hard-fail an older reader during a rolling upgrade.

use serde::{Deserialize, Serialize};

use crate::agent::{AgentError, AgentId};
use crate::task::TaskId;
use crate::utterance::{Source, UtteranceId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "utterance:received")]
    UtteranceReceived {
        utterance_id: UtteranceId,
        source: Source,
    },

    #[serde(rename = "router:reply_emitted")]
    ReplyEmitted { utterance_id: UtteranceId },

    #[serde(rename = "router:skill_invoked")]
    SkillInvoked {
        utterance_id: UtteranceId,
        skill: String,
    },

    #[serde(rename = "router:skill_denied")]
    SkillDenied {
        utterance_id: UtteranceId,
        skill: String,
    },

    #[serde(rename = "router:error_emitted")]
    ErrorEmitted {
        utterance_id: UtteranceId,
        message: String,
    },

    #[serde(rename = "task:enqueued")]
    TaskEnqueued { task_id: TaskId },

    #[serde(rename = "task:claimed")]
    TaskClaimed {
        task_id: TaskId,
        agent_id: AgentId,
    },

    #[serde(rename = "task:completed")]
    TaskCompleted {
        task_id: TaskId,
        summary: String,
    },

    #[serde(rename = "task:failed")]
    TaskFailed {
        task_id: TaskId,
        error: String,
        requeued: bool,
    },

    #[serde(rename = "agent:spawned")]
    AgentSpawned { agent_id: AgentId, task_id: TaskId },

    #[serde(rename = "agent:exited")]
    AgentExited {
        agent_id: AgentId,
        exit_code: Option<i32>,
    },

    #[serde(rename = "agent:failed")]
    AgentFailed {
        agent_id: AgentId,
        error: AgentError,
    },

    #[serde(rename = "scheduler:fired")]
    SchedulerJobFired { name: String },

    #[serde(rename = "scheduler:alerting")]
    SchedulerJobAlerting { name: String, failures: u32 },

    #[serde(rename = "night:opened")]
    NightModeOpened,

    #[serde(rename = "night:closed")]
    NightModeClosed,

    #[serde(rename = "memory:fact_learned")]
    MemoryFactLearned { category: String, key: String },

    #[serde(rename = "memory:flushed")]
    MemoryFlushed { version: u64 },

    #[serde(other)]
    Custom,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

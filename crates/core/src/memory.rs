// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory snapshot — the single serializable record the memory store owns
//! (spec.md §3 "Memory snapshot", §4.8).

use serde::{Deserialize, Serialize};

use crate::conversation::ConversationLog;
use crate::profile::OwnerProfile;
use crate::scheduled_job::ScheduledJob;

/// Cap on the completed-tasks roll-up kept inside the memory snapshot
/// (spec.md §4.8 `record_completed_task`).
pub const COMPLETED_TASKS_CAP: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTaskRecord {
    pub task_id: String,
    pub summary: String,
    pub completed_at_ms: u64,
}

/// Current on-disk schema version for `memory.json` (spec.md §6).
pub const MEMORY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub conversation: ConversationLog,
    #[serde(default)]
    pub profile: OwnerProfile,
    #[serde(default)]
    pub completed_tasks: Vec<CompletedTaskRecord>,
    #[serde(default)]
    pub scheduler: Vec<ScheduledJob>,
    /// Monotonic version counter, bumped on every mutation. Lets readers
    /// detect whether a snapshot they hold is stale.
    #[serde(default)]
    pub version: u64,
}

fn default_schema_version() -> u32 {
    MEMORY_SCHEMA_VERSION
}

impl Default for MemorySnapshot {
    fn default() -> Self {
        Self {
            schema_version: MEMORY_SCHEMA_VERSION,
            conversation: ConversationLog::default(),
            profile: OwnerProfile::default(),
            completed_tasks: Vec::new(),
            scheduler: Vec::new(),
            version: 0,
        }
    }
}

impl MemorySnapshot {
    pub fn record_completed_task(&mut self, task_id: impl Into<String>, summary: impl Into<String>, completed_at_ms: u64) {
        if self.completed_tasks.len() >= COMPLETED_TASKS_CAP {
            self.completed_tasks.remove(0);
        }
        self.completed_tasks.push(CompletedTaskRecord {
            task_id: task_id.into(),
            summary: summary.into(),
            completed_at_ms,
        });
        self.version += 1;
    }

    pub fn bump_version(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

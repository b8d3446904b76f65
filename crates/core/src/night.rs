// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Night-mode backlog (spec.md §3 "Night-mode backlog", §4.6).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::task::TaskId;

/// Cap on retained outcomes (spec.md §4.6: "capped at 200 entries").
pub const OUTCOME_CAP: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklogEntry {
    pub brief: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<std::path::PathBuf>,
    pub queued_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightOutcomeKind {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightOutcome {
    pub task_id: TaskId,
    pub kind: NightOutcomeKind,
    pub finished_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The overnight backlog plus its capped outcome list, separate from the
/// durable task queue (spec.md §3: "separate from the task queue").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NightBacklog {
    pub pending: VecDeque<BacklogEntry>,
    pub outcomes: VecDeque<NightOutcome>,
}

impl NightBacklog {
    pub fn push(&mut self, entry: BacklogEntry) {
        self.pending.push_back(entry);
    }

    pub fn pop_next(&mut self) -> Option<BacklogEntry> {
        self.pending.pop_front()
    }

    /// Record an outcome, evicting the oldest if already at cap. This is
    /// the same "cap at mutation time" discipline as the task queue's
    /// completed/failed lists (spec.md §4.3 Q I1) applied to night mode.
    pub fn record_outcome(&mut self, outcome: NightOutcome) {
        if self.outcomes.len() >= OUTCOME_CAP {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(outcome);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
#[path = "night_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable task queue (spec.md §3 "Task", §4.3, §6 `tasks.json`).
//!
//! A single JSON document versioned with `schema_version`. Unknown-status
//! entries found on load are demoted to `failed` with a migration note
//! rather than dropped. A corrupt file is quarantined and a fresh empty
//! queue is initialised.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Instant;

use leon_core::task::{Task, TaskId, RETENTION_CAP};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::atomic::{quarantine_corrupt_file, write_atomic, StoreError};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
const KNOWN_STATUSES: [&str; 4] = ["queued", "in_flight", "completed", "failed"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskQueueDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub queued: VecDeque<Task>,
    #[serde(default)]
    pub in_flight: VecDeque<Task>,
    #[serde(default)]
    pub completed: VecDeque<Task>,
    #[serde(default)]
    pub failed: VecDeque<Task>,
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

/// The durable FIFO task queue (spec.md §4.3).
pub struct TaskQueue {
    path: PathBuf,
    doc: TaskQueueDocument,
    dirty: bool,
    last_flush_at: Instant,
    debounce_ms: u64,
}

pub const DEFAULT_DEBOUNCE_MS: u64 = 2_000;

impl TaskQueue {
    pub fn load(path: &Path, epoch_ms: u64) -> Result<(Self, bool, bool), StoreError> {
        let raw = std::fs::read_to_string(path);
        let (doc, quarantined, migrated) = match raw {
            Err(_) => (TaskQueueDocument::default(), false, false),
            Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                Err(_) => {
                    let _ = quarantine_corrupt_file(path, epoch_ms);
                    (TaskQueueDocument::default(), true, false)
                }
                Ok(mut value) => {
                    let migrated = demote_unknown_statuses(&mut value);
                    match serde_json::from_value::<TaskQueueDocument>(value) {
                        Ok(doc) => (doc, false, migrated),
                        Err(_) => {
                            let _ = quarantine_corrupt_file(path, epoch_ms);
                            (TaskQueueDocument::default(), true, false)
                        }
                    }
                }
            },
        };
        Ok((
            Self {
                path: path.to_path_buf(),
                doc,
                dirty: migrated,
                last_flush_at: Instant::now(),
                debounce_ms: DEFAULT_DEBOUNCE_MS,
            },
            quarantined,
            migrated,
        ))
    }

    /// Append to `queued`. Persistence is debounced; the id is returned
    /// before the write necessarily lands on disk.
    pub fn enqueue(&mut self, task: Task) -> TaskId {
        let id = task.id.clone();
        self.doc.queued.push_back(task);
        self.dirty = true;
        id
    }

    /// Pop the head of `queued`, mark it in-flight, persist the mutation
    /// eagerly (claim is the linearization point for Invariant I1 — every
    /// other component reasons about in-flight-ness off this call).
    pub fn claim(&mut self) -> Option<Task> {
        let mut task = self.doc.queued.pop_front()?;
        task.mark_claimed(None);
        self.doc.in_flight.push_back(task.clone());
        self.dirty = true;
        Some(task)
    }

    /// Move a claimed task to `completed`, evicting the oldest entry first
    /// if already at the retention cap (spec.md §3 I3). The human-readable
    /// summary is the memory store's responsibility to retain
    /// (`record_completed_task`); this list exists for queue bookkeeping.
    pub fn complete_task(&mut self, id: &TaskId) -> Option<Task> {
        let idx = self.doc.in_flight.iter().position(|t| &t.id == id)?;
        let mut task = self.doc.in_flight.remove(idx)?;
        task.mark_completed();
        if self.doc.completed.len() >= RETENTION_CAP {
            self.doc.completed.pop_front();
        }
        self.doc.completed.push_back(task.clone());
        self.dirty = true;
        Some(task)
    }

    /// Fail a claimed task. If attempts remain it's re-queued at the tail
    /// with the *same id* (spec.md §9 Open Question, decided); otherwise it
    /// moves to the capped `failed` list.
    pub fn fail_task(&mut self, id: &TaskId, error: impl Into<String>) -> Option<(Task, bool)> {
        let idx = self.doc.in_flight.iter().position(|t| &t.id == id)?;
        let mut task = self.doc.in_flight.remove(idx)?;
        let requeued = task.mark_failed(error);
        if requeued {
            self.doc.queued.push_back(task.clone());
        } else {
            if self.doc.failed.len() >= RETENTION_CAP {
                self.doc.failed.pop_front();
            }
            self.doc.failed.push_back(task.clone());
        }
        self.dirty = true;
        Some((task, requeued))
    }

    /// Operator override: move a terminally-`failed` task back to `queued`
    /// with a fresh attempt budget, ahead of spec.md §3 I2's automatic
    /// retry path. Returns `None` if no such task is in the `failed` list.
    pub fn retry_failed(&mut self, id: &TaskId) -> Option<Task> {
        let idx = self.doc.failed.iter().position(|t| &t.id == id)?;
        let mut task = self.doc.failed.remove(idx)?;
        task.status = leon_core::task::TaskStatus::Queued;
        task.attempts = 0;
        task.last_error = None;
        self.doc.queued.push_back(task.clone());
        self.dirty = true;
        Some(task)
    }

    pub fn list_queued(&self) -> impl Iterator<Item = &Task> {
        self.doc.queued.iter()
    }

    pub fn list_in_flight(&self) -> impl Iterator<Item = &Task> {
        self.doc.in_flight.iter()
    }

    pub fn list_recent(&self) -> impl Iterator<Item = &Task> {
        self.doc.completed.iter().chain(self.doc.failed.iter())
    }

    pub fn is_in_flight(&self, id: &TaskId) -> bool {
        self.doc.in_flight.iter().any(|t| &t.id == id)
    }

    pub fn flush_if_dirty(&mut self) -> Result<bool, StoreError> {
        if !self.dirty || self.last_flush_at.elapsed().as_millis() < self.debounce_ms as u128 {
            return Ok(false);
        }
        self.save(false)?;
        Ok(true)
    }

    pub fn save(&mut self, force: bool) -> Result<(), StoreError> {
        if !force && !self.dirty {
            return Ok(());
        }
        write_atomic(&self.path, &self.doc)?;
        self.dirty = false;
        self.last_flush_at = Instant::now();
        Ok(())
    }
}

/// Walk every task-shaped object in the document and demote any `status`
/// value outside the known set to `"failed"`, stamping a migration note in
/// `last_error` and moving it into the `failed` array. Returns whether any
/// entry was touched (callers mark the document dirty so the demotion is
/// persisted on next flush).
fn demote_unknown_statuses(doc: &mut Value) -> bool {
    let Some(obj) = doc.as_object_mut() else {
        return false;
    };
    let mut demoted = Vec::new();
    for list_name in ["queued", "in_flight", "completed", "failed"] {
        let Some(Value::Array(arr)) = obj.get_mut(list_name) else {
            continue;
        };
        let mut i = 0;
        while i < arr.len() {
            let is_unknown = arr[i]
                .get("status")
                .and_then(Value::as_str)
                .map(|s| !KNOWN_STATUSES.contains(&s))
                .unwrap_or(false);
            if is_unknown {
                let mut entry = arr.remove(i);
                if let Some(map) = entry.as_object_mut() {
                    map.insert("status".into(), Value::String("failed".into()));
                    map.insert(
                        "last_error".into(),
                        Value::String("migrated: unknown status demoted on load".into()),
                    );
                    map.entry("attempts").or_insert(Value::from(0));
                    map.entry("max_attempts").or_insert(Value::from(0));
                    map.entry("assigned_agent_id").or_insert(Value::Null);
                }
                demoted.push(entry);
            } else {
                i += 1;
            }
        }
    }
    if demoted.is_empty() {
        return false;
    }
    let failed = obj
        .entry("failed")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(arr) = failed {
        arr.extend(demoted);
    }
    true
}

#[cfg(test)]
#[path = "task_store_tests.rs"]
mod tests;

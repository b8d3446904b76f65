// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable scheduler state (spec.md §6 `scheduler.json`).
//!
//! A thin wrapper following the same load/quarantine/debounced-save shape as
//! [`crate::memory_store::MemoryStore`] and [`crate::task_store::TaskQueue`],
//! specialised to `Vec<ScheduledJob>`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use leon_core::scheduled_job::ScheduledJob;
use serde::{Deserialize, Serialize};

use crate::atomic::{quarantine_corrupt_file, read_json, write_atomic, StoreError};

pub const DEFAULT_DEBOUNCE_MS: u64 = 5_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SchedulerDocument {
    #[serde(default)]
    jobs: Vec<ScheduledJob>,
}

pub struct SchedulerStore {
    path: PathBuf,
    doc: SchedulerDocument,
    dirty: bool,
    last_flush_at: Instant,
    debounce_ms: u64,
}

impl SchedulerStore {
    pub fn load(path: &Path, epoch_ms: u64) -> Result<(Self, bool), StoreError> {
        let (doc, quarantined) = match read_json::<SchedulerDocument>(path) {
            Ok(Some(doc)) => (doc, false),
            Ok(None) => (SchedulerDocument::default(), false),
            Err(_) => {
                let _ = quarantine_corrupt_file(path, epoch_ms);
                (SchedulerDocument::default(), true)
            }
        };
        Ok((
            Self {
                path: path.to_path_buf(),
                doc,
                dirty: false,
                last_flush_at: Instant::now(),
                debounce_ms: DEFAULT_DEBOUNCE_MS,
            },
            quarantined,
        ))
    }

    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.doc.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut Vec<ScheduledJob> {
        self.dirty = true;
        &mut self.doc.jobs
    }

    pub fn replace_jobs(&mut self, jobs: Vec<ScheduledJob>) {
        self.doc.jobs = jobs;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
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

#[cfg(test)]
#[path = "scheduler_store_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable, crash-safe memory store (spec.md §4.8).
//!
//! The in-memory `MemorySnapshot` is the source of truth between flushes;
//! the file on disk is read only at startup. Writes are debounced: a
//! `flush_if_dirty` call only actually writes once `debounce_ms` has
//! elapsed since the last flush, unless `save(force=true)` bypasses that.

use std::path::{Path, PathBuf};
use std::time::Instant;

use leon_core::memory::{MemorySnapshot, MEMORY_SCHEMA_VERSION};

use crate::atomic::{quarantine_corrupt_file, read_json, write_atomic, StoreError};

/// Default debounce window (spec.md §4.8: default 5s).
pub const DEFAULT_DEBOUNCE_MS: u64 = 5_000;

pub struct MemoryStore {
    path: PathBuf,
    snapshot: MemorySnapshot,
    dirty: bool,
    last_flush_at: Instant,
    debounce_ms: u64,
}

impl MemoryStore {
    /// Load `memory.json` if present. A corrupt file is quarantined and a
    /// fresh empty snapshot is used instead — never a silent data loss
    /// without evidence (spec.md §4.3/§7).
    pub fn load(path: &Path, epoch_ms: u64) -> Result<(Self, bool), StoreError> {
        let (snapshot, quarantined) = match read_json::<MemorySnapshot>(path) {
            Ok(Some(snapshot)) => (snapshot, false),
            Ok(None) => (MemorySnapshot::default(), false),
            Err(_) => {
                let _ = quarantine_corrupt_file(path, epoch_ms);
                (MemorySnapshot::default(), true)
            }
        };
        Ok((
            Self {
                path: path.to_path_buf(),
                snapshot,
                dirty: false,
                last_flush_at: Instant::now(),
                debounce_ms: DEFAULT_DEBOUNCE_MS,
            },
            quarantined,
        ))
    }

    pub fn snapshot(&self) -> &MemorySnapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> &mut MemorySnapshot {
        self.dirty = true;
        &mut self.snapshot
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flush only if dirty and the debounce interval has elapsed.
    /// Returns whether a write actually happened.
    pub fn flush_if_dirty(&mut self) -> Result<bool, StoreError> {
        if !self.dirty || self.last_flush_at.elapsed().as_millis() < self.debounce_ms as u128 {
            return Ok(false);
        }
        self.save(false)?;
        Ok(true)
    }

    /// Write unconditionally. `force=true` bypasses the debounce check —
    /// used by shutdown (spec.md §4.1 step 5).
    pub fn save(&mut self, force: bool) -> Result<(), StoreError> {
        if !force && !self.dirty {
            return Ok(());
        }
        write_atomic(&self.path, &self.snapshot)?;
        self.dirty = false;
        self.last_flush_at = Instant::now();
        Ok(())
    }

    pub fn schema_version(&self) -> u32 {
        self.snapshot.schema_version
    }
}

/// Marker for the highest schema version this build understands.
pub const CURRENT_SCHEMA_VERSION: u32 = MEMORY_SCHEMA_VERSION;

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable night-mode backlog (spec.md §6 `night_backlog.json`).

use std::path::{Path, PathBuf};
use std::time::Instant;

use leon_core::night::NightBacklog;

use crate::atomic::{quarantine_corrupt_file, read_json, write_atomic, StoreError};

pub const DEFAULT_DEBOUNCE_MS: u64 = 5_000;

pub struct NightStore {
    path: PathBuf,
    backlog: NightBacklog,
    dirty: bool,
    last_flush_at: Instant,
    debounce_ms: u64,
}

impl NightStore {
    pub fn load(path: &Path, epoch_ms: u64) -> Result<(Self, bool), StoreError> {
        let (backlog, quarantined) = match read_json::<NightBacklog>(path) {
            Ok(Some(backlog)) => (backlog, false),
            Ok(None) => (NightBacklog::default(), false),
            Err(_) => {
                let _ = quarantine_corrupt_file(path, epoch_ms);
                (NightBacklog::default(), true)
            }
        };
        Ok((
            Self {
                path: path.to_path_buf(),
                backlog,
                dirty: false,
                last_flush_at: Instant::now(),
                debounce_ms: DEFAULT_DEBOUNCE_MS,
            },
            quarantined,
        ))
    }

    pub fn backlog(&self) -> &NightBacklog {
        &self.backlog
    }

    pub fn backlog_mut(&mut self) -> &mut NightBacklog {
        self.dirty = true;
        &mut self.backlog
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
        write_atomic(&self.path, &self.backlog)?;
        self.dirty = false;
        self.last_flush_at = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
#[path = "night_store_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic file write and corrupt-file quarantine helpers shared by every
//! store in this crate (spec.md §4.3, §4.8: "temp + rename", "quarantine
//! with a `.corrupt.<ts>` suffix").

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize `value` to `path` via temp-write, fsync, rename — never leaves
/// a half-written file at the live path (spec.md §4.8 "Atomicity").
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        let file = writer.into_inner().map_err(std::io::IntoInnerError::into_error)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load and parse `path`. `Ok(None)` means the file doesn't exist yet — a
/// fresh start, not an error. A parse failure is surfaced to the caller so
/// it can decide whether to quarantine (stores that need migration first
/// inspect the raw JSON before fully typed deserialization).
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(Some(serde_json::from_reader(reader)?))
}

/// Rename a corrupt file to `<name>.corrupt.<epoch_ms>` so evidence survives
/// instead of being silently discarded (spec.md §7 "Data-corruption").
/// Returns the quarantine path, or `None` if there was nothing to rename.
pub fn quarantine_corrupt_file(path: &Path, epoch_ms: u64) -> std::io::Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let quarantine_path = path.with_extension(format!("corrupt.{epoch_ms}"));
    fs::rename(path, &quarantine_path)?;
    Ok(Some(quarantine_path))
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;

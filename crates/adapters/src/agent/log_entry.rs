// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-delimited JSON transcript sidecar (spec.md §6 "Agent logs...
//! transcript is newline-delimited JSON objects `{ts, event, payload}`").

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of an agent's transcript sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Milliseconds since the Unix epoch, captured when the entry was built.
    pub ts: u64,
    pub event: String,
    pub payload: Value,
}

impl TranscriptEntry {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { ts, event: event.into(), payload }
    }
}

/// Append one transcript line. Best-effort: a write failure is logged, not
/// propagated — the dashboard's live-log endpoint degrades gracefully
/// (spec.md §7: opportunistic background paths are logged and dropped).
pub fn append_transcript_line(path: &Path, entry: &TranscriptEntry) {
    let Ok(line) = serde_json::to_string(entry) else {
        return;
    };
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(mut file) => {
            if let Err(err) = writeln!(file, "{line}") {
                tracing::warn!(path = %path.display(), error = %err, "failed to append transcript line");
            }
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to open transcript file");
        }
    }
}

#[cfg(test)]
#[path = "log_entry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::BufRead;

use tempfile::tempdir;

use super::*;

#[test]
fn append_creates_file_and_writes_one_line_per_call() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("transcript.jsonl");

    append_transcript_line(&path, &TranscriptEntry::new("agent_spawned", serde_json::json!({"pid": 42})));
    append_transcript_line(&path, &TranscriptEntry::new("agent_exited", serde_json::json!({"exit_code": 0})));

    let file = std::fs::File::open(&path).unwrap();
    let lines: Vec<String> = std::io::BufReader::new(file).lines().map(|l| l.unwrap()).collect();
    assert_eq!(lines.len(), 2);

    let first: TranscriptEntry = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(first.event, "agent_spawned");
    assert_eq!(first.payload["pid"], 42);
}

#[test]
fn append_to_unwritable_path_does_not_panic() {
    let path = std::path::PathBuf::from("/nonexistent-dir-for-test/transcript.jsonl");
    append_transcript_line(&path, &TranscriptEntry::new("agent_spawned", serde_json::json!({})));
}

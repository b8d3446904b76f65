use super::*;
use serde::Deserialize;
use tempfile::tempdir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Sample {
    value: u32,
}

#[test]
fn write_then_read_round_trips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("sub").join("sample.json");
    write_atomic(&path, &Sample { value: 42 }).expect("write");
    let loaded: Option<Sample> = read_json(&path).expect("read");
    assert_eq!(loaded, Some(Sample { value: 42 }));
}

#[test]
fn missing_file_reads_as_none() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("missing.json");
    let loaded: Option<Sample> = read_json(&path).expect("read");
    assert_eq!(loaded, None);
}

#[test]
fn no_tmp_file_left_behind_after_write() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("sample.json");
    write_atomic(&path, &Sample { value: 1 }).expect("write");
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn quarantine_renames_with_timestamp_suffix() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, b"not json").expect("write garbage");
    let quarantined = quarantine_corrupt_file(&path, 123).expect("quarantine").expect("some");
    assert!(!path.exists());
    assert!(quarantined.exists());
    assert!(quarantined.to_string_lossy().contains("corrupt.123"));
}

#[test]
fn quarantine_is_noop_when_file_absent() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.json");
    let result = quarantine_corrupt_file(&path, 1).expect("quarantine");
    assert!(result.is_none());
}

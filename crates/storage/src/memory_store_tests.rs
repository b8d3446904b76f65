use super::*;
use tempfile::tempdir;

#[test]
fn fresh_load_with_no_file_starts_empty_and_clean() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("memory.json");
    let (store, quarantined) = MemoryStore::load(&path, 0).expect("load");
    assert!(!quarantined);
    assert!(!store.is_dirty());
    assert_eq!(store.snapshot().completed_tasks.len(), 0);
}

#[test]
fn corrupt_file_is_quarantined_and_fresh_snapshot_used() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("memory.json");
    std::fs::write(&path, b"{not valid json").expect("write garbage");

    let (store, quarantined) = MemoryStore::load(&path, 555).expect("load");
    assert!(quarantined);
    assert!(!path.exists(), "corrupt file should have been moved aside");
    assert_eq!(store.snapshot().version, 0);

    let quarantine_path = dir.path().join("memory.corrupt.555");
    assert!(quarantine_path.exists());
}

#[test]
fn save_round_trips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("memory.json");
    let (mut store, _) = MemoryStore::load(&path, 0).expect("load");
    store.snapshot_mut().record_completed_task("t-1", "done", 1);
    store.save(true).expect("save");

    let (reloaded, _) = MemoryStore::load(&path, 0).expect("reload");
    assert_eq!(reloaded.snapshot().completed_tasks.len(), 1);
}

#[test]
fn flush_if_dirty_is_noop_before_debounce_elapses() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("memory.json");
    let (mut store, _) = MemoryStore::load(&path, 0).expect("load");
    store.snapshot_mut().bump_version();
    let flushed = store.flush_if_dirty().expect("flush");
    assert!(!flushed, "debounce window has not elapsed yet");
    assert!(store.is_dirty());
}

#[test]
fn force_save_bypasses_debounce_and_clears_dirty() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("memory.json");
    let (mut store, _) = MemoryStore::load(&path, 0).expect("load");
    store.snapshot_mut().bump_version();
    store.save(true).expect("save");
    assert!(!store.is_dirty());
}

use super::*;
use leon_core::scheduled_job::{Cadence, JobCommand};
use tempfile::tempdir;

fn sample_job() -> ScheduledJob {
    ScheduledJob::new(
        "heartbeat",
        Cadence::Interval { period_ms: 60_000 },
        JobCommand::Builtin { token: "heartbeat".into() },
        0,
    )
}

#[test]
fn fresh_load_starts_with_no_jobs() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("scheduler.json");
    let (store, quarantined) = SchedulerStore::load(&path, 0).expect("load");
    assert!(!quarantined);
    assert!(store.jobs().is_empty());
}

#[test]
fn replace_jobs_then_save_round_trips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("scheduler.json");
    let (mut store, _) = SchedulerStore::load(&path, 0).expect("load");
    store.replace_jobs(vec![sample_job()]);
    store.save(true).expect("save");

    let (reloaded, _) = SchedulerStore::load(&path, 0).expect("reload");
    assert_eq!(reloaded.jobs().len(), 1);
    assert_eq!(reloaded.jobs()[0].name, "heartbeat");
}

#[test]
fn corrupt_file_is_quarantined() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("scheduler.json");
    std::fs::write(&path, b"{ broken").expect("write garbage");

    let (store, quarantined) = SchedulerStore::load(&path, 7).expect("load");
    assert!(quarantined);
    assert!(store.jobs().is_empty());
    assert!(dir.path().join("scheduler.corrupt.7").exists());
}

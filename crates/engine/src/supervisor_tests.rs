// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use leon_adapters::{AgentCall, FakeAgentAdapter};
use leon_core::task::{Task, TaskKind};
use leon_core::AgentId;
use tokio::sync::mpsc;

use super::*;

fn task(id: &str) -> Task {
    Task::new(TaskId::new(id), TaskKind::AgentSpawn, "do the thing", 1_000)
}

fn log_paths(dir: &std::path::Path) -> AgentLogPaths {
    AgentLogPaths {
        stdout_path: dir.join("stdout.log"),
        stderr_path: dir.join("stderr.log"),
        transcript_path: dir.join("transcript.jsonl"),
    }
}

#[tokio::test]
async fn spawn_tracks_agent_as_running() {
    let supervisor = Supervisor::new(FakeAgentAdapter::new(), SupervisorConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let (tx, _rx) = mpsc::channel(8);

    let agent_id = supervisor
        .spawn_for_task(
            &task("t1"),
            AgentId::new("a1"),
            "claude",
            log_paths(dir.path()),
            PathBuf::from("/tmp/project"),
            Vec::new(),
            false,
            1_000,
            tx,
        )
        .await
        .unwrap();

    assert_eq!(supervisor.running_count(), 1);
    assert_eq!(agent_id, AgentId::new("a1"));
}

#[tokio::test]
async fn spawn_refuses_past_concurrency_ceiling() {
    let config = SupervisorConfig { max_concurrent: 1, ..SupervisorConfig::default() };
    let supervisor = Supervisor::new(FakeAgentAdapter::new(), config);
    let dir = tempfile::tempdir().unwrap();

    let (tx1, _rx1) = mpsc::channel(8);
    supervisor
        .spawn_for_task(
            &task("t1"),
            AgentId::new("a1"),
            "claude",
            log_paths(dir.path()),
            PathBuf::from("/tmp/project"),
            Vec::new(),
            false,
            1_000,
            tx1,
        )
        .await
        .unwrap();

    let (tx2, _rx2) = mpsc::channel(8);
    let err = supervisor
        .spawn_for_task(
            &task("t2"),
            AgentId::new("a2"),
            "claude",
            log_paths(dir.path()),
            PathBuf::from("/tmp/project"),
            Vec::new(),
            false,
            1_000,
            tx2,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SupervisorError::ConcurrencyCeilingReached));
}

#[tokio::test]
async fn handle_exit_parses_summary_block_on_clean_exit() {
    let adapter = FakeAgentAdapter::new();
    let supervisor = Supervisor::new(adapter.clone(), SupervisorConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let paths = log_paths(dir.path());
    std::fs::write(&paths.stdout_path, "doing work\nSUMMARY: {\"files_changed\": 2}\n").unwrap();

    let (tx, _rx) = mpsc::channel(8);
    let agent_id = AgentId::new("a1");
    supervisor
        .spawn_for_task(
            &task("t1"),
            agent_id.clone(),
            "claude",
            paths,
            PathBuf::from("/tmp/project"),
            Vec::new(),
            false,
            1_000,
            tx,
        )
        .await
        .unwrap();

    let outcome = supervisor.handle_exit(&agent_id, Some(0)).unwrap();
    assert!(outcome.completed);
    assert_eq!(outcome.summary.unwrap()["files_changed"], 2);
    assert_eq!(supervisor.running_count(), 0);
}

#[tokio::test]
async fn handle_exit_on_nonzero_exit_fails_with_tail_excerpt() {
    let adapter = FakeAgentAdapter::new();
    let supervisor = Supervisor::new(adapter.clone(), SupervisorConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let paths = log_paths(dir.path());
    std::fs::write(&paths.stdout_path, "traceback: boom\n").unwrap();

    let (tx, _rx) = mpsc::channel(8);
    let agent_id = AgentId::new("a1");
    supervisor
        .spawn_for_task(
            &task("t1"),
            agent_id.clone(),
            "claude",
            paths,
            PathBuf::from("/tmp/project"),
            Vec::new(),
            false,
            1_000,
            tx,
        )
        .await
        .unwrap();

    let outcome = supervisor.handle_exit(&agent_id, Some(1)).unwrap();
    assert!(!outcome.completed);
    assert!(outcome.error.unwrap().contains("boom"));
}

#[tokio::test]
async fn tick_terminates_then_kills_idle_agent() {
    let adapter = FakeAgentAdapter::new();
    let config = SupervisorConfig { idle_timeout: Duration::from_millis(100), ..SupervisorConfig::default() };
    let supervisor = Supervisor::new(adapter.clone(), config);
    let dir = tempfile::tempdir().unwrap();

    let (tx, _rx) = mpsc::channel(8);
    let agent_id = AgentId::new("a1");
    supervisor
        .spawn_for_task(
            &task("t1"),
            agent_id.clone(),
            "claude",
            log_paths(dir.path()),
            PathBuf::from("/tmp/project"),
            Vec::new(),
            false,
            1_000,
            tx,
        )
        .await
        .unwrap();

    // First tick past the idle threshold: SIGTERM.
    supervisor.tick(1_000 + 200).await;
    assert!(adapter.calls().iter().any(|c| matches!(c, AgentCall::Terminate { .. })));

    // Still alive on the next tick: escalate to SIGKILL.
    supervisor.tick(1_000 + 300).await;
    assert!(adapter.calls().iter().any(|c| matches!(c, AgentCall::Kill { .. })));
}

#[tokio::test]
async fn stop_sends_sigterm_then_sigkill_to_survivors() {
    let adapter = FakeAgentAdapter::new();
    let config = SupervisorConfig { graceful_stop: Duration::from_millis(10), ..SupervisorConfig::default() };
    let supervisor = Supervisor::new(adapter.clone(), config);
    let dir = tempfile::tempdir().unwrap();

    let (tx, _rx) = mpsc::channel(8);
    let agent_id = AgentId::new("a1");
    supervisor
        .spawn_for_task(
            &task("t1"),
            agent_id.clone(),
            "claude",
            log_paths(dir.path()),
            PathBuf::from("/tmp/project"),
            Vec::new(),
            false,
            1_000,
            tx,
        )
        .await
        .unwrap();

    supervisor.stop().await;
    let calls = adapter.calls();
    assert!(calls.iter().any(|c| matches!(c, AgentCall::Terminate { .. })));
    assert!(calls.iter().any(|c| matches!(c, AgentCall::Kill { .. })));
}

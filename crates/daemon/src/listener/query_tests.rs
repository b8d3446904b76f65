use std::sync::Arc;

use leon_adapters::agent::FakeAgentAdapter;
use leon_core::clock::FakeClock;
use leon_core::id::SequentialIdGen;
use leon_core::scheduled_job::{Cadence, JobCommand, ScheduledJob};
use leon_core::skill::{AppAllowList, DenyList};
use leon_core::task::{Task, TaskKind};
use leon_core::TaskId;
use leon_engine::{KeywordPreRouter, NightDispatcher, Router, Supervisor};
use leon_llm::ProviderChain;
use tokio::sync::{mpsc, Notify};

use super::*;
use crate::dispatch::Dispatcher;
use crate::lifecycle::{Config, Shared};
use crate::protocol::{Query, Response, TaskFilter};

fn test_shared(dir: &tempfile::TempDir) -> Shared<FakeAgentAdapter> {
    let state_dir = dir.path().to_path_buf();
    let config = Config {
        socket_path: state_dir.join("daemon.sock"),
        lock_path: state_dir.join("daemon.pid"),
        version_path: state_dir.join("daemon.version"),
        log_path: state_dir.join("daemon.log"),
        memory_path: state_dir.join("memory.json"),
        tasks_path: state_dir.join("tasks.json"),
        scheduler_path: state_dir.join("scheduler.json"),
        night_backlog_path: state_dir.join("night_backlog.json"),
        agents_dir: state_dir.join("agents"),
        max_concurrent: 3,
        state_dir,
    };
    let (dispatcher, _loop_handle) = Dispatcher::new();
    let (event_tx, event_rx) = mpsc::channel(8);

    Shared {
        memory: parking_lot::Mutex::new(leon_storage::MemoryStore::load(&config.memory_path, 1_000).unwrap().0),
        tasks: parking_lot::Mutex::new(leon_storage::TaskQueue::load(&config.tasks_path, 1_000).unwrap().0),
        scheduler_store: parking_lot::Mutex::new(leon_storage::SchedulerStore::load(&config.scheduler_path, 1_000).unwrap().0),
        night: parking_lot::Mutex::new(leon_storage::NightStore::load(&config.night_backlog_path, 1_000).unwrap().0),
        supervisor: Supervisor::new(FakeAgentAdapter::new(), leon_engine::SupervisorConfig::default()),
        night_dispatcher: NightDispatcher::new(),
        night_gate: parking_lot::Mutex::new(leon_engine::NightGateConfig::default()),
        router: Router::new(
            KeywordPreRouter::new(Vec::new(), AppAllowList::default()),
            DenyList::default(),
            ProviderChain::new(Vec::new()),
        ),
        deny_list: DenyList::default(),
        dispatcher,
        last_interactive_utterance_ms: parking_lot::Mutex::new(None),
        start_instant: std::time::Instant::now(),
        shutdown: Arc::new(Notify::new()),
        event_tx,
        event_rx: tokio::sync::Mutex::new(event_rx),
        clock: Arc::new(FakeClock::default()),
        id_gen: Arc::new(SequentialIdGen::new("test")),
        config,
    }
}

#[test]
fn status_reports_zero_activity_against_fresh_state() {
    let dir = tempfile::tempdir().unwrap();
    let shared = test_shared(&dir);

    let response = handle_query(&shared, Query::Status);
    match response {
        Response::Status { status } => {
            assert_eq!(status.queued, 0);
            assert_eq!(status.running_agents, 0);
            assert!(!status.night_gate_open);
        }
        other => panic!("expected Response::Status, got {other:?}"),
    }
}

#[test]
fn tasks_query_with_all_filter_returns_a_freshly_queued_task() {
    let dir = tempfile::tempdir().unwrap();
    let shared = test_shared(&dir);
    let id = TaskId::new(shared.id_gen.next());
    shared.tasks.lock().enqueue(Task::new(id.clone(), TaskKind::AgentSpawn, "do a thing".to_string(), 1_000));

    let response = handle_query(&shared, Query::Tasks { filter: TaskFilter::All });
    match response {
        Response::Tasks { tasks } => {
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].id, id);
            assert_eq!(tasks[0].status, "queued");
        }
        other => panic!("expected Response::Tasks, got {other:?}"),
    }
}

#[test]
fn tasks_query_with_failed_filter_excludes_a_queued_task() {
    let dir = tempfile::tempdir().unwrap();
    let shared = test_shared(&dir);
    let id = TaskId::new(shared.id_gen.next());
    shared.tasks.lock().enqueue(Task::new(id, TaskKind::AgentSpawn, "do a thing".to_string(), 1_000));

    let response = handle_query(&shared, Query::Tasks { filter: TaskFilter::Failed });
    match response {
        Response::Tasks { tasks } => assert!(tasks.is_empty()),
        other => panic!("expected Response::Tasks, got {other:?}"),
    }
}

#[test]
fn jobs_query_reflects_a_scheduled_job() {
    let dir = tempfile::tempdir().unwrap();
    let shared = test_shared(&dir);
    shared.scheduler_store.lock().jobs_mut().push(ScheduledJob::new(
        "heartbeat",
        Cadence::Interval { period_ms: 60_000 },
        JobCommand::Builtin { token: "heartbeat".to_string() },
        2_000,
    ));

    let response = handle_query(&shared, Query::Jobs);
    match response {
        Response::Jobs { jobs } => {
            assert_eq!(jobs.len(), 1);
            assert_eq!(jobs[0].name, "heartbeat");
            assert!(!jobs[0].alerting);
        }
        other => panic!("expected Response::Jobs, got {other:?}"),
    }
}

#[test]
fn agent_detail_for_an_unknown_id_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let shared = test_shared(&dir);
    let id = leon_core::AgentId::new(shared.id_gen.next());

    let response = handle_query(&shared, Query::AgentDetail { id });
    match response {
        Response::AgentDetail { agent } => assert!(agent.is_none()),
        other => panic!("expected Response::AgentDetail, got {other:?}"),
    }
}

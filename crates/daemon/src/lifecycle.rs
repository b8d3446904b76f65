// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle (spec.md §4.1 "Shutdown", §6 "Persisted state layout").
//!
//! `Config::load` resolves the fixed paths under the state directory.
//! `startup` wires every owner (memory/task/scheduler/night stores, router,
//! supervisor, night dispatcher) into one `Shared<A>` and binds the Unix
//! socket. `run` is the main loop: it drains the dispatcher queue and runs
//! the scheduler/supervisor/night ticks on their own cadences. `stop`
//! implements the five-step shutdown spec.md §4.1 specifies.

use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::{mpsc, Notify};
use tracing::{info, warn};

use leon_core::clock::Clock;
use leon_core::conversation::Role;
use leon_core::id::IdGen;
use leon_core::skill::DenyList;
use leon_core::Event;
use leon_engine::night::NightGateConfig;
use leon_engine::supervisor::SupervisorConfig;
use leon_engine::{KeywordPreRouter, NightDispatcher, Router, Supervisor};
use leon_llm::ProviderChain;
use leon_storage::{MemoryStore, NightStore, SchedulerStore, StoreError, TaskQueue};

use crate::dispatch::{Dispatcher, LoopHandle};
use crate::env;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not resolve a state directory (set LEON_STATE_DIR or $HOME)")]
    NoStateDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("leond is already running (lock held at {0})")]
    LockHeld(PathBuf),
}

/// Fixed paths under the persistence root (spec.md §6 "Filesystem
/// (persistence)").
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub version_path: PathBuf,
    pub log_path: PathBuf,
    pub memory_path: PathBuf,
    pub tasks_path: PathBuf,
    pub scheduler_path: PathBuf,
    pub night_backlog_path: PathBuf,
    pub agents_dir: PathBuf,
    pub max_concurrent: usize,
}

impl Config {
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        let max_concurrent = std::env::var("LEON_MAX_CONCURRENT_AGENTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(SupervisorConfig::default().max_concurrent);

        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            memory_path: state_dir.join("memory.json"),
            tasks_path: state_dir.join("tasks.json"),
            scheduler_path: state_dir.join("scheduler.json"),
            night_backlog_path: state_dir.join("night_backlog.json"),
            agents_dir: state_dir.join("agents"),
            max_concurrent,
            state_dir,
        })
    }
}

/// Everything the listener, dispatcher-driven main loop, and dashboard
/// adapters share. One instance per daemon process; each field's mutable
/// part is owned by its natural component (spec.md §3 "Ownership").
pub struct Shared<A: leon_adapters::agent::AgentAdapter> {
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub id_gen: Arc<dyn IdGen>,
    pub memory: parking_lot::Mutex<MemoryStore>,
    pub tasks: parking_lot::Mutex<TaskQueue>,
    pub scheduler_store: parking_lot::Mutex<SchedulerStore>,
    pub night: parking_lot::Mutex<NightStore>,
    pub supervisor: Supervisor<A>,
    pub night_dispatcher: NightDispatcher,
    pub night_gate: parking_lot::Mutex<NightGateConfig>,
    pub router: Router,
    pub deny_list: DenyList,
    pub dispatcher: Dispatcher,
    pub last_interactive_utterance_ms: parking_lot::Mutex<Option<u64>>,
    pub start_instant: Instant,
    pub shutdown: Arc<Notify>,
    /// Every spawned agent is handed a clone of this sender; the supervisor
    /// tick drains `event_rx` for `Event::AgentExited` (spec.md §4.4
    /// "Outcome parsing") so exit handling happens on the main loop rather
    /// than racing the child-watcher task.
    pub event_tx: mpsc::Sender<Event>,
    pub event_rx: tokio::sync::Mutex<mpsc::Receiver<Event>>,
}

/// Bound on the agent-exit event channel (spec.md §4.4 `max_concurrent`
/// default 3, generously headroomed so a burst of exits never blocks a
/// child-watcher task on `send`).
const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct StartupResult<A: leon_adapters::agent::AgentAdapter> {
    pub shared: Arc<Shared<A>>,
    pub unix_listener: UnixListener,
    pub loop_handle: LoopHandle,
    lock_file: File,
}

/// Bring up every owner's store, bind the socket, and acquire the
/// single-instance lock. Any corrupt persisted file is quarantined by its
/// own store's `load` (spec.md §7 "Data-corruption") — the returned
/// `quarantined_*` flags let `main` post the `source=self` warning utterance
/// spec.md §4.3's scenario 5 describes.
pub fn startup<A: leon_adapters::agent::AgentAdapter>(
    config: Config,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGen>,
    adapter: A,
    chain: ProviderChain,
    keyword_pre_router: KeywordPreRouter,
    deny_list: DenyList,
) -> Result<(StartupResult<A>, Quarantined), LifecycleError> {
    fs::create_dir_all(&config.state_dir)?;
    fs::create_dir_all(&config.agents_dir)?;

    let lock_file = acquire_lock(&config.lock_path)?;
    write_pid_and_version(&config, &lock_file)?;
    cleanup_stale_socket(&config.socket_path);

    let now_ms = clock.epoch_ms();
    let (memory, memory_quarantined) = MemoryStore::load(&config.memory_path, now_ms)?;
    let (tasks, tasks_quarantined, _migrated) = TaskQueue::load(&config.tasks_path, now_ms)?;
    let (scheduler_store, scheduler_quarantined) = SchedulerStore::load(&config.scheduler_path, now_ms)?;
    let (night, night_quarantined) = NightStore::load(&config.night_backlog_path, now_ms)?;

    let supervisor = Supervisor::new(adapter, SupervisorConfig {
        max_concurrent: config.max_concurrent,
        ..SupervisorConfig::default()
    });
    let router = Router::new(keyword_pre_router, deny_list.clone(), chain);

    let unix_listener = UnixListener::bind(&config.socket_path)?;
    let (dispatcher, loop_handle) = Dispatcher::new();
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let shared = Arc::new(Shared {
        config,
        clock,
        id_gen,
        memory: parking_lot::Mutex::new(memory),
        tasks: parking_lot::Mutex::new(tasks),
        scheduler_store: parking_lot::Mutex::new(scheduler_store),
        night: parking_lot::Mutex::new(night),
        supervisor,
        night_dispatcher: NightDispatcher::new(),
        night_gate: parking_lot::Mutex::new(NightGateConfig::default()),
        router,
        deny_list,
        dispatcher,
        last_interactive_utterance_ms: parking_lot::Mutex::new(None),
        start_instant: Instant::now(),
        shutdown: Arc::new(Notify::new()),
        event_tx,
        event_rx: tokio::sync::Mutex::new(event_rx),
    });

    Ok((
        StartupResult {
            shared,
            unix_listener,
            loop_handle,
            lock_file,
        },
        Quarantined {
            memory: memory_quarantined,
            tasks: tasks_quarantined,
            scheduler: scheduler_quarantined,
            night: night_quarantined,
        },
    ))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Quarantined {
    pub memory: bool,
    pub tasks: bool,
    pub scheduler: bool,
    pub night: bool,
}

impl Quarantined {
    pub fn any(&self) -> bool {
        self.memory || self.tasks || self.scheduler || self.night
    }
}

fn acquire_lock(lock_path: &std::path::Path) -> Result<File, LifecycleError> {
    let file = OpenOptions::new().create(true).write(true).truncate(false).open(lock_path)?;
    file.try_lock_exclusive().map_err(|_| LifecycleError::LockHeld(lock_path.to_path_buf()))?;
    Ok(file)
}

fn write_pid_and_version(config: &Config, lock_file: &File) -> Result<(), LifecycleError> {
    let mut f = lock_file.try_clone()?;
    f.set_len(0)?;
    write!(f, "{}", std::process::id())?;
    fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

/// A stale socket from a prior run that crashed without cleanup would make
/// `bind` fail with `AddrInUse`; since we're holding the exclusive lock we
/// know no other daemon owns it, so it's safe to remove.
fn cleanup_stale_socket(socket_path: &std::path::Path) {
    if socket_path.exists() {
        let _ = fs::remove_file(socket_path);
    }
}

/// The main loop (spec.md §4.1, §5 "Scheduling model"). Drains dispatcher
/// submissions (utterances from every front-end) as they arrive, and runs
/// the scheduler (1Hz floor, spec.md §9), supervisor (configurable tick,
/// default 10s), and night-mode checks on their own cadences, interleaved
/// with a debounced flush of every store.
pub async fn run<A: leon_adapters::agent::AgentAdapter>(
    shared: Arc<Shared<A>>,
    mut loop_handle: LoopHandle,
) {
    let mut scheduler_interval = tokio::time::interval(Duration::from_secs(1));
    let mut supervisor_interval = tokio::time::interval(shared.supervisor.config().tick_interval);
    scheduler_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    supervisor_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = loop_handle.wait_for_wake(Duration::from_millis(200)) => {
                loop_handle.drain().await;
            }
            _ = scheduler_interval.tick() => {
                crate::listener::tick::scheduler_tick(&shared).await;
                crate::listener::tick::night_tick(&shared).await;
                crate::listener::tick::flush_tick(&shared);
            }
            _ = supervisor_interval.tick() => {
                crate::listener::tick::supervisor_tick(&shared).await;
            }
            _ = shared.shutdown.notified() => {
                info!("shutdown signal received, draining main loop");
                break;
            }
        }
    }
}

/// Idempotent shutdown (spec.md §4.1 "Stop"): cancel periodic tasks (the
/// caller drops the interval futures by returning from `run`), signal
/// daemon threads, drain a final flush, wait on children, force-save.
pub async fn stop<A: leon_adapters::agent::AgentAdapter>(shared: &Arc<Shared<A>>) {
    shared.shutdown.notify_waiters();
    shared.supervisor.stop().await;

    shared.memory.lock().save(true).ok();
    shared.tasks.lock().save(true).ok();
    shared.scheduler_store.lock().save(true).ok();
    shared.night.lock().save(true).ok();
}

/// Append a system-authored utterance to the conversation log directly,
/// bypassing the router (spec.md §7 "Data-corruption": "post warning
/// utterance via `source=self`"). Used for startup quarantine notices and
/// scheduler alerts.
pub fn post_self_notice<A: leon_adapters::agent::AgentAdapter>(shared: &Shared<A>, text: impl Into<String>) {
    let now_ms = shared.clock.epoch_ms();
    let mut memory = shared.memory.lock();
    memory
        .snapshot_mut()
        .conversation
        .push(Role::System, text, now_ms);
    warn!("self notice posted to conversation log");
}

/// Quarantine-message builder shared between startup (tasks/memory/
/// scheduler/night files) so the wording reads as one system (spec.md §4.8
/// "Fact extraction" note: "both paths funnel through the one shared 'log
/// and drop' helper").
pub fn quarantine_message(quarantined: &Quarantined) -> String {
    let mut parts = Vec::new();
    if quarantined.memory {
        parts.push("memory.json");
    }
    if quarantined.tasks {
        parts.push("tasks.json");
    }
    if quarantined.scheduler {
        parts.push("scheduler.json");
    }
    if quarantined.night {
        parts.push("night_backlog.json");
    }
    format!(
        "One or more persisted files were corrupt and have been quarantined \
         (renamed aside with a .corrupt.<timestamp> suffix); I started with \
         fresh state for: {}.",
        parts.join(", ")
    )
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

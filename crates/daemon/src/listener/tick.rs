// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic work run from `lifecycle::run`'s main loop: the scheduler's
//! 1Hz floor (spec.md §4.5), the night-mode gate (§4.6), the supervisor's
//! monitoring tick plus exit-event drain (§4.4), and the debounced store
//! flush (§4.8).

use std::path::PathBuf;

use tracing::{info, warn};

use leon_adapters::agent::AgentAdapter;
use leon_core::night::BacklogEntry;
use leon_core::task::{Task, TaskKind};
use leon_core::{Event, Source, Utterance, UtteranceId};
use leon_engine::supervisor::AgentLogPaths;
use leon_engine::Scheduler;

use crate::lifecycle::Shared;

/// Walk every due scheduled job, dispatch it, and record the outcome
/// (spec.md §4.5 invariant: reschedule happens atomically with the
/// handler's result, never before the call).
pub async fn scheduler_tick<A: AgentAdapter + 'static>(shared: &Shared<A>) {
    let now_ms = shared.clock.epoch_ms();
    let due = {
        let store = shared.scheduler_store.lock();
        Scheduler::due_jobs(store.jobs(), now_ms)
    };

    for name in due {
        let fired = {
            let store = shared.scheduler_store.lock();
            store.jobs().iter().find(|j| j.name == name).map(owned_fired)
        };
        let Some(fired) = fired else { continue };

        let succeeded = match fired {
            FiredOwned::Builtin { token } => {
                let utterance_id = UtteranceId::new(shared.id_gen.next());
                let utterance = Utterance::new(utterance_id, now_ms, Source::Scheduler, format!("{}{token}", leon_core::BUILTIN_SENTINEL));
                !matches!(
                    super::commands::handle_utterance(shared, utterance.source, utterance.text, None).await,
                    crate::protocol::UtteranceOutcome::Error { .. }
                )
            }
            FiredOwned::Prompt { text } => !matches!(
                super::commands::handle_utterance(shared, Source::Scheduler, text, None).await,
                crate::protocol::UtteranceOutcome::Error { .. }
            ),
        };

        let now_ms = shared.clock.epoch_ms();
        let mut store = shared.scheduler_store.lock();
        if let Some(job) = store.jobs_mut().iter_mut().find(|j| j.name == name) {
            let alerting = Scheduler::record_outcome(job, now_ms, succeeded);
            if alerting {
                drop(store);
                crate::lifecycle::post_self_notice(
                    shared,
                    format!("scheduled job '{name}' has failed repeatedly and is now alerting"),
                );
            }
        }
    }
}

enum FiredOwned {
    Builtin { token: String },
    Prompt { text: String },
}

fn owned_fired(job: &leon_core::scheduled_job::ScheduledJob) -> FiredOwned {
    match &job.command {
        leon_core::scheduled_job::JobCommand::Builtin { token } => FiredOwned::Builtin { token: token.clone() },
        leon_core::scheduled_job::JobCommand::Prompt { text } => FiredOwned::Prompt { text: text.clone() },
    }
}

/// Evaluate the night-mode gate and, if open, drain one backlog entry into
/// the task queue under the dispatcher lock (spec.md §4.6 "Dispatch").
pub async fn night_tick<A: AgentAdapter + 'static>(shared: &Shared<A>) {
    let now_ms = shared.clock.epoch_ms();
    let minute_of_day = minute_of_day(now_ms);
    let last_interactive = *shared.last_interactive_utterance_ms.lock();

    let open = leon_engine::gate_open(&shared.night_gate.lock(), minute_of_day, now_ms, last_interactive);
    if !open {
        return;
    }

    shared
        .night_dispatcher
        .try_dispatch(|| {
            let max_concurrent = shared.supervisor.config().max_concurrent;
            let occupied = shared.supervisor.running_count() + shared.tasks.lock().list_in_flight().count();
            if occupied >= max_concurrent {
                return;
            }
            let entry: Option<BacklogEntry> = shared.night.lock().backlog_mut().pop_next();
            if let Some(entry) = entry {
                let now_ms = shared.clock.epoch_ms();
                let id = leon_core::TaskId::new(shared.id_gen.next());
                let mut task = Task::new(id, TaskKind::AgentSpawn, entry.brief, now_ms);
                if let Some(project) = entry.project_path {
                    task = task.with_project(project);
                }
                shared.tasks.lock().enqueue(task);
                info!("night-mode backlog entry dispatched to the task queue");
            }
        })
        .await;

    try_spawn_next(shared).await;
}

fn minute_of_day(epoch_ms: u64) -> u32 {
    let secs_of_day = (epoch_ms / 1000) % 86_400;
    (secs_of_day / 60) as u32
}

/// Flush every store that has a pending debounced write (spec.md §4.8).
pub fn flush_tick<A: AgentAdapter + 'static>(shared: &Shared<A>) {
    if let Err(err) = shared.memory.lock().flush_if_dirty() {
        warn!(error = %err, "memory flush failed");
    }
    if let Err(err) = shared.tasks.lock().flush_if_dirty() {
        warn!(error = %err, "task queue flush failed");
    }
    if let Err(err) = shared.scheduler_store.lock().flush_if_dirty() {
        warn!(error = %err, "scheduler flush failed");
    }
    if let Err(err) = shared.night.lock().flush_if_dirty() {
        warn!(error = %err, "night backlog flush failed");
    }
}

/// Supervisor monitoring tick: drain any exit events that arrived since the
/// last tick, then check running agents for no-progress/hard timeouts
/// (spec.md §4.4 "Monitoring loop").
pub async fn supervisor_tick<A: AgentAdapter + 'static>(shared: &Shared<A>) {
    drain_exit_events(shared).await;
    let now_ms = shared.clock.epoch_ms();
    shared.supervisor.tick(now_ms).await;
    try_spawn_next(shared).await;
}

async fn drain_exit_events<A: AgentAdapter + 'static>(shared: &Shared<A>) {
    loop {
        let event = {
            let mut rx = shared.event_rx.lock().await;
            match rx.try_recv() {
                Ok(event) => event,
                Err(_) => break,
            }
        };
        if let Event::AgentExited { agent_id, exit_code } = event {
            handle_agent_exit(shared, &agent_id, exit_code);
        }
    }
}

fn handle_agent_exit<A: AgentAdapter + 'static>(shared: &Shared<A>, agent_id: &leon_core::AgentId, exit_code: Option<i32>) {
    let Some(outcome) = shared.supervisor.handle_exit(agent_id, exit_code) else { return };
    let now_ms = shared.clock.epoch_ms();

    if outcome.completed {
        shared.tasks.lock().complete_task(&outcome.task_id);
        let summary = outcome.summary.map(|v| v.to_string()).unwrap_or_else(|| "ok".to_string());
        shared.memory.lock().snapshot_mut().record_completed_task(outcome.task_id.to_string(), summary, now_ms);
        info!(task_id = %outcome.task_id, agent_id = %outcome.agent_id, "agent completed");
    } else {
        let error = outcome.error.unwrap_or_else(|| "agent exited with an error".to_string());
        let (_, requeued) = match shared.tasks.lock().fail_task(&outcome.task_id, error.clone()) {
            Some(result) => result,
            None => return,
        };
        warn!(task_id = %outcome.task_id, agent_id = %outcome.agent_id, requeued, error = %error, "agent failed");
    }
}

/// If there's headroom under the concurrency ceiling and a task is queued,
/// claim it and spawn an agent (spec.md §4.4 "Concurrency ceiling": "a
/// refusal is not an error — the task stays queued"). Runs inline on the
/// caller's task rather than a detached `tokio::spawn`: every call site is
/// already inside a future the dispatcher is driving, so there is no
/// blocking concern, only an ordinary `.await`.
pub async fn try_spawn_next<A: AgentAdapter + 'static>(shared: &Shared<A>) {
    if shared.supervisor.running_count() >= shared.supervisor.config().max_concurrent {
        return;
    }
    let Some(task) = shared.tasks.lock().claim() else { return };
    if task.kind != TaskKind::AgentSpawn {
        // Builtins and user-followups never reach the supervisor; nothing to
        // spawn, so the queue claim above already moved it to `in_flight`
        // with no corresponding exit event ever arriving. Complete it
        // immediately rather than leaving it stuck.
        shared.tasks.lock().complete_task(&task.id);
        return;
    }

    spawn_agent_for_task(shared, task).await;
}

async fn spawn_agent_for_task<A: AgentAdapter + 'static>(shared: &Shared<A>, task: Task) {
    let now_ms = shared.clock.epoch_ms();
    let agent_id = leon_core::AgentId::new(shared.id_gen.next());
    let log_paths = AgentLogPaths::under(&shared.config.agents_dir, &agent_id);
    if let Some(dir) = log_paths.stdout_path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let project_path = task.project_path.clone().unwrap_or_else(|| PathBuf::from("."));
    let cli_path = crate::env::coding_cli_path();
    let allowed_tools = crate::env::coding_cli_allowed_tools();
    let skip_permissions = crate::env::allow_unsafe_cli();

    match shared
        .supervisor
        .spawn_for_task(
            &task,
            agent_id.clone(),
            &cli_path,
            log_paths,
            project_path,
            allowed_tools,
            skip_permissions,
            now_ms,
            shared.event_tx.clone(),
        )
        .await
    {
        Ok(agent_id) => info!(agent_id = %agent_id, task_id = %task.id, "agent spawned for task"),
        Err(err) => {
            warn!(task_id = %task.id, error = %err, "agent spawn failed, re-queueing task");
            shared.tasks.lock().fail_task(&task.id, err.to_string());
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only query surface (spec.md §6 query paths consulted by `leon`
//! CLI's `status`/`agents`/`tasks`/`jobs`/`night`/`memory` subcommands).

use leon_adapters::agent::AgentAdapter;
use leon_core::agent::AgentLifecycle;
use leon_core::task::TaskStatus;

use crate::lifecycle::Shared;
use crate::protocol::{
    AgentEntry, ConversationEntryDto, JobEntry, MemorySummary, NightSummary, ProfileEntry, Query,
    Response, StatusSummary, TaskEntry, TaskFilter,
};

pub fn handle_query<A: AgentAdapter + 'static>(shared: &Shared<A>, query: Query) -> Response {
    match query {
        Query::Status => Response::Status { status: status_summary(shared) },
        Query::Agents => Response::Agents { agents: shared.supervisor.list().iter().map(agent_entry).collect() },
        Query::AgentDetail { id } => Response::AgentDetail { agent: shared.supervisor.get(&id).as_ref().map(agent_entry) },
        Query::Tasks { filter } => Response::Tasks { tasks: task_entries(shared, filter) },
        Query::Jobs => Response::Jobs { jobs: job_entries(shared) },
        Query::Night => Response::Night { night: night_summary(shared) },
        Query::Memory => Response::Memory { memory: memory_summary(shared) },
        Query::ConversationTail { limit } => Response::Conversation { entries: conversation_tail(shared, limit) },
    }
}

pub fn status_summary<A: AgentAdapter + 'static>(shared: &Shared<A>) -> StatusSummary {
    let now_ms = shared.clock.epoch_ms();
    let minute_of_day = ((now_ms / 1000) % 86_400 / 60) as u32;
    let last_interactive = *shared.last_interactive_utterance_ms.lock();
    let night_gate_open = leon_engine::gate_open(&shared.night_gate.lock(), minute_of_day, now_ms, last_interactive);

    let (queued, in_flight, completed, failed) = {
        let tasks = shared.tasks.lock();
        (
            tasks.list_queued().count(),
            tasks.list_in_flight().count(),
            tasks.list_recent().filter(|t| t.status == TaskStatus::Completed).count(),
            tasks.list_recent().filter(|t| t.status == TaskStatus::Failed).count(),
        )
    };

    let (scheduler_jobs, scheduler_alerting) = {
        let store = shared.scheduler_store.lock();
        (store.jobs().len(), store.jobs().iter().filter(|j| j.alerting).count())
    };

    StatusSummary {
        uptime_secs: shared.start_instant.elapsed().as_secs(),
        conversation_len: shared.memory.lock().snapshot().conversation.len(),
        queued,
        in_flight,
        completed,
        failed,
        running_agents: shared.supervisor.running_count(),
        max_concurrent: shared.supervisor.config().max_concurrent,
        night_gate_open,
        scheduler_jobs,
        scheduler_alerting,
        memory_dirty: shared.memory.lock().is_dirty(),
    }
}

fn agent_entry(agent: &leon_core::agent::Agent) -> AgentEntry {
    AgentEntry {
        id: agent.id.clone(),
        task_id: agent.task_id.clone(),
        pid: agent.pid,
        project_path: agent.project_path.display().to_string(),
        state: lifecycle_label(agent.state).to_string(),
        started_at_ms: agent.started_at_ms,
        exit_code: agent.exit_code,
        summary: agent.summary.clone(),
        error: agent.error.as_ref().map(|e| e.to_string()),
    }
}

fn lifecycle_label(state: AgentLifecycle) -> &'static str {
    match state {
        AgentLifecycle::Spawning => "spawning",
        AgentLifecycle::Running => "running",
        AgentLifecycle::Exiting => "exiting",
        AgentLifecycle::Reaped => "reaped",
    }
}

fn task_entries<A: AgentAdapter + 'static>(shared: &Shared<A>, filter: TaskFilter) -> Vec<TaskEntry> {
    let tasks = shared.tasks.lock();
    let wanted = |status: TaskStatus| matches!(filter, TaskFilter::All) || task_filter_matches(filter, status);
    let mut out = Vec::new();
    if wanted(TaskStatus::Queued) {
        out.extend(tasks.list_queued().map(task_entry));
    }
    if wanted(TaskStatus::InFlight) {
        out.extend(tasks.list_in_flight().map(task_entry));
    }
    if matches!(filter, TaskFilter::Completed | TaskFilter::Failed | TaskFilter::All) {
        out.extend(tasks.list_recent().filter(|t| wanted(t.status)).map(task_entry));
    }
    out
}

fn task_filter_matches(filter: TaskFilter, status: TaskStatus) -> bool {
    matches!(
        (filter, status),
        (TaskFilter::Queued, TaskStatus::Queued)
            | (TaskFilter::InFlight, TaskStatus::InFlight)
            | (TaskFilter::Completed, TaskStatus::Completed)
            | (TaskFilter::Failed, TaskStatus::Failed)
    )
}

fn task_entry(task: &leon_core::task::Task) -> TaskEntry {
    TaskEntry {
        id: task.id.clone(),
        kind: format!("{:?}", task.kind).to_lowercase(),
        brief: task.brief.clone(),
        project_path: task.project_path.as_ref().map(|p| p.display().to_string()),
        status: task.status.to_string(),
        attempts: task.attempts,
        max_attempts: task.max_attempts,
        last_error: task.last_error.clone(),
        assigned_agent_id: task.assigned_agent_id.clone(),
    }
}

fn job_entries<A: AgentAdapter + 'static>(shared: &Shared<A>) -> Vec<JobEntry> {
    shared
        .scheduler_store
        .lock()
        .jobs()
        .iter()
        .map(|job| JobEntry {
            name: job.name.clone(),
            cadence: format!("{:?}", job.cadence),
            next_run_at_ms: job.next_run_at_ms,
            consecutive_failures: job.consecutive_failures,
            alerting: job.alerting,
            last_result: job.last_result.map(|r| format!("{r:?}").to_lowercase()),
        })
        .collect()
}

fn night_summary<A: AgentAdapter + 'static>(shared: &Shared<A>) -> NightSummary {
    let now_ms = shared.clock.epoch_ms();
    let minute_of_day = ((now_ms / 1000) % 86_400 / 60) as u32;
    let last_interactive = *shared.last_interactive_utterance_ms.lock();
    let gate_open = leon_engine::gate_open(&shared.night_gate.lock(), minute_of_day, now_ms, last_interactive);

    let night = shared.night.lock();
    NightSummary {
        gate_open,
        pending: night.backlog().pending.len(),
        running: shared.supervisor.running_count(),
        max_concurrent: shared.supervisor.config().max_concurrent,
        recent_outcomes: night.backlog().outcomes.len(),
    }
}

fn memory_summary<A: AgentAdapter + 'static>(shared: &Shared<A>) -> MemorySummary {
    let memory = shared.memory.lock();
    let snapshot = memory.snapshot();
    let profile = [
        leon_core::Category::Identity,
        leon_core::Category::Preferences,
        leon_core::Category::Schedule,
        leon_core::Category::Projects,
        leon_core::Category::Misc,
    ]
    .into_iter()
    .flat_map(|category| {
        snapshot
            .profile
            .category(category)
            .into_iter()
            .flat_map(move |entries| entries.iter().map(move |(k, v)| ProfileEntry {
                category: format!("{category:?}").to_lowercase(),
                key: k.clone(),
                value: v.clone(),
            }))
    })
    .collect();

    MemorySummary {
        conversation_len: snapshot.conversation.len(),
        completed_tasks: snapshot.completed_tasks.len(),
        profile,
        version: snapshot.version,
    }
}

fn conversation_tail<A: AgentAdapter + 'static>(shared: &Shared<A>, limit: usize) -> Vec<ConversationEntryDto> {
    shared
        .memory
        .lock()
        .snapshot()
        .conversation
        .tail(limit)
        .into_iter()
        .map(|entry| ConversationEntryDto {
            role: format!("{:?}", entry.role).to_lowercase(),
            text: entry.text,
            timestamp_ms: entry.timestamp_ms,
        })
        .collect()
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-facing mutations reachable over the socket but outside the
//! ordinary utterance path: forcing a retry, flipping the night-mode
//! toggle, and firing a scheduled job ahead of its cadence.

use tracing::{info, warn};

use leon_adapters::agent::AgentAdapter;
use leon_core::{Source, TaskId};

use crate::lifecycle::Shared;
use crate::protocol::Response;

/// Force a `failed` task back to `queued` immediately, ahead of its
/// automatic retry window (spec.md §4.3 retry policy covers the automatic
/// path; this is the operator override).
pub fn handle_retry_task<A: AgentAdapter + 'static>(shared: &Shared<A>, id: TaskId) -> Response {
    match shared.tasks.lock().retry_failed(&id) {
        Some(_) => {
            info!(task_id = %id, "task manually retried");
            Response::Ack
        }
        None => Response::Error { message: format!("no failed task with id {id}") },
    }
}

/// Flip the night-mode operator toggle (spec.md §4.6 gate condition i).
pub fn handle_night_toggle<A: AgentAdapter + 'static>(shared: &Shared<A>, on: bool) -> Response {
    shared.night_gate.lock().enabled = on;
    info!(on, "night mode toggled");
    Response::Ack
}

/// Fire a scheduled job immediately, outside its cadence. Goes through the
/// same built-in/prompt dispatch as the scheduler tick so an operator-forced
/// run records an outcome and reschedules exactly like a natural firing.
pub async fn handle_run_job_now<A: AgentAdapter + 'static>(shared: &Shared<A>, name: &str) -> Response {
    let command = {
        let store = shared.scheduler_store.lock();
        store.jobs().iter().find(|j| j.name == name).map(|j| j.command.clone())
    };
    let Some(command) = command else {
        return Response::Error { message: format!("no scheduled job named {name}") };
    };

    let succeeded = match command {
        leon_core::scheduled_job::JobCommand::Builtin { token } => !matches!(
            super::commands::handle_utterance(
                shared,
                Source::Scheduler,
                format!("{}{token}", leon_core::BUILTIN_SENTINEL),
                None,
            )
            .await,
            crate::protocol::UtteranceOutcome::Error { .. }
        ),
        leon_core::scheduled_job::JobCommand::Prompt { text } => !matches!(
            super::commands::handle_utterance(shared, Source::Scheduler, text, None).await,
            crate::protocol::UtteranceOutcome::Error { .. }
        ),
    };

    let now_ms = shared.clock.epoch_ms();
    let mut store = shared.scheduler_store.lock();
    if let Some(job) = store.jobs_mut().iter_mut().find(|j| j.name == name) {
        let alerting = leon_engine::Scheduler::record_outcome(job, now_ms, succeeded);
        if alerting {
            drop(store);
            crate::lifecycle::post_self_notice(
                shared,
                format!("scheduled job '{name}' has failed repeatedly and is now alerting"),
            );
        }
    } else {
        warn!(job = %name, "job disappeared between lookup and outcome recording");
    }

    if succeeded {
        Response::Ack
    } else {
        Response::Error { message: format!("job '{name}' ran and reported failure") }
    }
}

#[cfg(test)]
#[path = "mutations_tests.rs"]
mod tests;

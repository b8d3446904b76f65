// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns one decoded `Request::Utterance` into a `UtteranceOutcome`,
//! wiring `Router::route`'s verdict into the side effects spec.md §4.2
//! describes: conversation-log appends, task enqueue, skill dispatch.

use std::path::PathBuf;

use tracing::{info, warn};

use leon_adapters::agent::AgentAdapter;
use leon_adapters::skills;
use leon_core::conversation::Role;
use leon_core::task::{Task, TaskKind};
use leon_core::{Source, Utterance, UtteranceId};
use leon_engine::router::{LiteralCommand, RouteOutcome};

use crate::lifecycle::Shared;
use crate::protocol::UtteranceOutcome;

const LITERAL_HELP_TEXT: &str = "Available commands: status, quit, /agents, /help";

/// Route and execute one inbound utterance. Runs entirely on the main loop
/// (the caller has already gone through `Dispatcher::submit`), so it's free
/// to take the `parking_lot` store locks without ever holding one across an
/// `.await` — every lock here is acquired, read or mutated, and dropped
/// before the next suspend point.
pub async fn handle_utterance<A: AgentAdapter + 'static>(
    shared: &Shared<A>,
    source: Source,
    text: String,
    sender_id: Option<String>,
) -> UtteranceOutcome {
    let now_ms = shared.clock.epoch_ms();
    let id = UtteranceId::new(shared.id_gen.next());
    let mut utterance = Utterance::new(id, now_ms, source, text);
    if let Some(sender_id) = sender_id {
        utterance = utterance.with_sender(sender_id);
    }

    if matches!(source, Source::Cli | Source::Voice | Source::Dashboard | Source::Whatsapp) {
        *shared.last_interactive_utterance_ms.lock() = Some(now_ms);
    }

    if !source.skips_conversation_log() {
        shared.memory.lock().snapshot_mut().conversation.push(Role::User, &utterance.text, now_ms);
    }

    let conversation_snapshot = shared.memory.lock().snapshot().conversation.clone();
    let (outcome, classification) = shared.router.route(&utterance, &conversation_snapshot).await;
    info!(utterance_id = %utterance.id, ?classification, "utterance routed");

    let result = apply_outcome(shared, &utterance, outcome).await;

    if let UtteranceOutcome::Reply { text } = &result {
        if !source.skips_conversation_log() {
            let ts = shared.clock.epoch_ms();
            shared.memory.lock().snapshot_mut().conversation.push(Role::Assistant, text, ts);
        }
    }

    result
}

async fn apply_outcome<A: AgentAdapter + 'static>(
    shared: &Shared<A>,
    utterance: &Utterance,
    outcome: RouteOutcome,
) -> UtteranceOutcome {
    match outcome {
        RouteOutcome::Literal(cmd) => handle_literal(shared, cmd),
        RouteOutcome::BuiltinDispatch { token } => handle_builtin(shared, &token),
        RouteOutcome::Reply(text) => UtteranceOutcome::Reply { text },
        RouteOutcome::SpawnTask { brief, project } => spawn_task(shared, brief, project).await,
        RouteOutcome::SkillInvocation { skill, args } => invoke_skill(shared, skill, args).await,
        RouteOutcome::SkillDenied { skill } => {
            warn!(skill = %skill, utterance_id = %utterance.id, "skill denied by deny-list");
            UtteranceOutcome::SkillDenied { skill: skill.to_string() }
        }
        RouteOutcome::Error(message) => UtteranceOutcome::Error { message },
    }
}

fn handle_literal<A: AgentAdapter + 'static>(shared: &Shared<A>, cmd: LiteralCommand) -> UtteranceOutcome {
    match cmd {
        LiteralCommand::Status => {
            let summary = super::query::status_summary(shared);
            UtteranceOutcome::Reply {
                text: format!(
                    "uptime {}s, {} queued, {} in flight, {} running agents",
                    summary.uptime_secs, summary.queued, summary.in_flight, summary.running_agents
                ),
            }
        }
        LiteralCommand::Quit => {
            shared.shutdown.notify_waiters();
            UtteranceOutcome::Reply { text: "shutting down".to_string() }
        }
        LiteralCommand::ListAgents => {
            let agents = shared.supervisor.list();
            let text = if agents.is_empty() {
                "no agents running".to_string()
            } else {
                agents.iter().map(|a| a.id.to_string()).collect::<Vec<_>>().join(", ")
            };
            UtteranceOutcome::Reply { text }
        }
        LiteralCommand::Help => UtteranceOutcome::Reply { text: LITERAL_HELP_TEXT.to_string() },
    }
}

/// Scheduler built-in dispatch (spec.md §4.5: "built-in jobs... dispatched
/// to the built-in handler directly"). The only built-in currently defined
/// is a no-op heartbeat that exercises the main loop; unknown tokens are
/// reported as an error so an alerting scheduler job surfaces the typo.
fn handle_builtin<A: AgentAdapter + 'static>(shared: &Shared<A>, token: &str) -> UtteranceOutcome {
    match token {
        "heartbeat" => {
            info!("heartbeat builtin fired");
            UtteranceOutcome::Reply { text: "heartbeat".to_string() }
        }
        "flush" => {
            super::tick::flush_tick(shared);
            UtteranceOutcome::Reply { text: "flushed".to_string() }
        }
        other => UtteranceOutcome::Error { message: format!("unknown builtin token: {other}") },
    }
}

async fn spawn_task<A: AgentAdapter + 'static>(shared: &Shared<A>, brief: String, project: Option<String>) -> UtteranceOutcome {
    let now_ms = shared.clock.epoch_ms();
    let id = leon_core::TaskId::new(shared.id_gen.next());
    let mut task = Task::new(id.clone(), TaskKind::AgentSpawn, brief, now_ms);
    if let Some(project) = project {
        task = task.with_project(PathBuf::from(project));
    }
    shared.tasks.lock().enqueue(task);
    info!(task_id = %id, "task enqueued");
    super::tick::try_spawn_next(shared).await;
    UtteranceOutcome::TaskEnqueued { task_id: id }
}

async fn invoke_skill<A: AgentAdapter + 'static>(
    shared: &Shared<A>,
    skill: leon_core::SkillToken,
    args: Vec<String>,
) -> UtteranceOutcome {
    let skill_name = skill.to_string();
    let result = match skill_name.as_str() {
        "shell_exec" => {
            let allowed = Vec::new();
            skills::shell_exec(&args.join(" "), &allowed).await.map_err(|e| e.to_string())
        }
        "python_exec" => {
            let scratch = shared.config.state_dir.join("scratch");
            if let Err(err) = std::fs::create_dir_all(&scratch) {
                return UtteranceOutcome::Error { message: format!("scratch dir: {err}") };
            }
            skills::python_exec(&args.join("\n"), &scratch).await.map_err(|e| e.to_string())
        }
        "open_app" => match args.first() {
            Some(app) => skills::open_app(app, &env_launcher()).await.map(|_| "opened".to_string()).map_err(|e| e.to_string()),
            None => Err("open_app requires an app name".to_string()),
        },
        "system_control" => match args.split_first() {
            Some((program, rest)) => skills::system_control(program, rest)
                .await
                .map(|_| "ok".to_string())
                .map_err(|e| e.to_string()),
            None => Err("system_control requires a program".to_string()),
        },
        other => Err(format!("unrecognized skill: {other}")),
    };

    match result {
        Ok(text) => UtteranceOutcome::SkillResult { skill: skill_name, text },
        Err(message) => UtteranceOutcome::Error { message },
    }
}

fn env_launcher() -> String {
    std::env::var("LEON_APP_LAUNCHER").unwrap_or_else(|_| "open".to_string())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

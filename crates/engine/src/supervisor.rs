// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent Supervisor (spec.md §4.4) — turns an `agent_spawn` task into a live
//! child process, tracks its state, and produces exactly one outcome per
//! agent lifecycle.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use leon_adapters::agent::{AgentAdapter, AgentAdapterError, AgentSpawnConfig};
use leon_core::agent::{Agent, AgentError, AgentLifecycle};
use leon_core::task::Task;
use leon_core::{AgentId, Event, TaskId};

/// Supervisor tick cadence (spec.md §4.4 "a supervisor tick runs... every D
/// seconds, default 10s").
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(10);

/// No-progress timeout (spec.md §4.4: "default 30min").
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Hard wall-clock timeout on a single agent run (spec.md §4.4 "configurable").
pub const DEFAULT_HARD_TIMEOUT: Duration = Duration::from_secs(4 * 60 * 60);

/// Grace period between SIGTERM and SIGKILL on stop (spec.md §4.4 F3).
pub const DEFAULT_GRACEFUL_STOP: Duration = Duration::from_secs(10);

/// Bytes of log tail read when searching for the `SUMMARY:` block or
/// building a failure excerpt.
const LOG_TAIL_BYTES: u64 = 16 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct SupervisorConfig {
    pub max_concurrent: usize,
    pub tick_interval: Duration,
    pub idle_timeout: Duration,
    pub hard_timeout: Duration,
    pub graceful_stop: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            tick_interval: DEFAULT_TICK_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            hard_timeout: DEFAULT_HARD_TIMEOUT,
            graceful_stop: DEFAULT_GRACEFUL_STOP,
        }
    }
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Not an error condition the caller should surface — the task stays
    /// `queued` and the supervisor re-attempts on the next drain trigger
    /// (spec.md §4.4 "Concurrency ceiling": "refusal is not an error").
    #[error("concurrency ceiling reached")]
    ConcurrencyCeilingReached,
    #[error("spawn failed: {0}")]
    SpawnFailed(#[from] AgentAdapterError),
}

/// Where a spawned agent should write its stdout/stderr/transcript
/// (spec.md §6 "Filesystem (persistence)": `agents/<id>/{stdout.log,
/// stderr.log,transcript.jsonl}`).
pub struct AgentLogPaths {
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
    pub transcript_path: PathBuf,
}

impl AgentLogPaths {
    pub fn under(agents_root: &Path, agent_id: &AgentId) -> Self {
        let dir = agents_root.join(agent_id.as_str());
        Self {
            stdout_path: dir.join("stdout.log"),
            stderr_path: dir.join("stderr.log"),
            transcript_path: dir.join("transcript.jsonl"),
        }
    }
}

/// The resolved fate of an agent that has just exited (spec.md §4.4 "Outcome
/// parsing").
#[derive(Debug, Clone)]
pub struct ExitOutcome {
    pub task_id: TaskId,
    pub agent_id: AgentId,
    pub completed: bool,
    pub summary: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Tracks live agents and enforces the concurrency ceiling, timeouts, and
/// credential refresh described in spec.md §4.4.
pub struct Supervisor<A: AgentAdapter> {
    adapter: A,
    config: SupervisorConfig,
    agents: Mutex<HashMap<AgentId, Agent>>,
    credentials: Option<CredentialRefresh>,
}

struct CredentialRefresh {
    source: PathBuf,
    dest: PathBuf,
    last_copied: Mutex<Option<SystemTime>>,
}

impl<A: AgentAdapter> Supervisor<A> {
    pub fn new(adapter: A, config: SupervisorConfig) -> Self {
        Self {
            adapter,
            config,
            agents: Mutex::new(HashMap::new()),
            credentials: None,
        }
    }

    /// Configure the credential-refresh source/destination (spec.md §4.4
    /// "Credential refresh").
    pub fn with_credential_refresh(mut self, source: PathBuf, dest: PathBuf) -> Self {
        self.credentials = Some(CredentialRefresh {
            source,
            dest,
            last_copied: Mutex::new(None),
        });
        self
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn running_count(&self) -> usize {
        self.agents
            .lock()
            .values()
            .filter(|a| matches!(a.state, AgentLifecycle::Running | AgentLifecycle::Spawning))
            .count()
    }

    /// Snapshot every tracked agent, live or mid-exit (spec.md §6 query
    /// surface: `agents`/`agent_detail`).
    pub fn list(&self) -> Vec<Agent> {
        self.agents.lock().values().cloned().collect()
    }

    pub fn get(&self, agent_id: &AgentId) -> Option<Agent> {
        self.agents.lock().get(agent_id).cloned()
    }

    /// Spawn a child process for `task`. Refuses (not an error) once
    /// `running_count() >= max_concurrent` (spec.md §4.4 "Concurrency ceiling").
    pub async fn spawn_for_task(
        &self,
        task: &Task,
        agent_id: AgentId,
        cli_path: &str,
        log_paths: AgentLogPaths,
        project_path: PathBuf,
        allowed_tools: Vec<String>,
        skip_permissions: bool,
        now_ms: u64,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentId, SupervisorError> {
        if self.running_count() >= self.config.max_concurrent {
            return Err(SupervisorError::ConcurrencyCeilingReached);
        }

        self.refresh_credentials();

        let spawn_config = AgentSpawnConfig {
            agent_id: agent_id.clone(),
            cli_path: cli_path.to_string(),
            project_path: project_path.clone(),
            prompt: task.brief.clone(),
            allowed_tools,
            skip_permissions,
            stdout_path: log_paths.stdout_path.clone(),
            stderr_path: log_paths.stderr_path.clone(),
            transcript_path: log_paths.transcript_path,
            env: Vec::new(),
        };

        let handle = self.adapter.spawn(spawn_config, event_tx).await?;

        let mut agent = Agent::new(
            agent_id.clone(),
            task.id.clone(),
            project_path,
            now_ms,
            log_paths.stdout_path,
            log_paths.stderr_path,
        );
        agent.mark_running(handle.pid);
        info!(agent_id = %agent_id, task_id = %task.id, pid = handle.pid, "agent spawned");
        self.agents.lock().insert(agent_id.clone(), agent);
        Ok(agent_id)
    }

    /// Copy a fresh credential artifact into the child's configuration
    /// directory when the source's mtime is newer than the last copy
    /// (spec.md §4.4 "gives child processes current credentials without
    /// long-lived env exposure").
    fn refresh_credentials(&self) {
        let Some(creds) = &self.credentials else { return };
        let Ok(meta) = std::fs::metadata(&creds.source) else { return };
        let Ok(mtime) = meta.modified() else { return };
        let mut last_copied = creds.last_copied.lock();
        let stale = match *last_copied {
            Some(last) => mtime > last,
            None => true,
        };
        if !stale {
            return;
        }
        match std::fs::copy(&creds.source, &creds.dest) {
            Ok(_) => *last_copied = Some(mtime),
            Err(err) => warn!(error = %err, "credential refresh copy failed"),
        }
    }

    /// Monitoring tick (spec.md §4.4 "Monitoring loop"): poll liveness, check
    /// no-progress and hard timeouts. A first timeout strike sends SIGTERM;
    /// if the child is still alive on a later tick, escalates to SIGKILL.
    pub async fn tick(&self, now_ms: u64) {
        let snapshot: Vec<(AgentId, u64, u64, bool)> = {
            let agents = self.agents.lock();
            agents
                .values()
                .filter(|a| a.state == AgentLifecycle::Running)
                .map(|a| (a.id.clone(), a.started_at_ms, a.idle_for_ms(now_ms), a.error.is_some()))
                .collect()
        };

        for (agent_id, started_at_ms, idle_ms, already_flagged) in snapshot {
            if !self.adapter.is_alive(&agent_id).await {
                continue;
            }

            let hard_elapsed = now_ms.saturating_sub(started_at_ms);
            let timeout = if hard_elapsed >= self.config.hard_timeout.as_millis() as u64 {
                Some(AgentError::HardTimeout)
            } else if idle_ms >= self.config.idle_timeout.as_millis() as u64 {
                Some(AgentError::NoProgressTimeout)
            } else {
                None
            };

            match (timeout, already_flagged) {
                (Some(kind), false) => {
                    warn!(agent_id = %agent_id, error = %kind, "agent timed out, sending SIGTERM");
                    self.flag_error(&agent_id, kind);
                    let _ = self.adapter.terminate(&agent_id).await;
                }
                (Some(_), true) => {
                    warn!(agent_id = %agent_id, "agent still alive after grace period, sending SIGKILL");
                    let _ = self.adapter.kill(&agent_id).await;
                }
                (None, _) => {}
            }
        }
    }

    fn flag_error(&self, agent_id: &AgentId, error: AgentError) {
        if let Some(agent) = self.agents.lock().get_mut(agent_id) {
            agent.error = Some(error);
        }
    }

    /// Handle an `Event::AgentExited` notification. Returns `None` if the
    /// agent was already reaped (e.g. a duplicate delivery).
    pub fn handle_exit(&self, agent_id: &AgentId, exit_code: Option<i32>) -> Option<ExitOutcome> {
        let mut agent = self.agents.lock().remove(agent_id)?;
        agent.mark_exiting(exit_code);
        agent.mark_reaped();

        if let Some(forced) = &agent.error {
            return Some(ExitOutcome {
                task_id: agent.task_id,
                agent_id: agent.id,
                completed: false,
                summary: None,
                error: Some(forced.to_string()),
            });
        }

        let tail = read_log_tail(&agent.stdout_path, LOG_TAIL_BYTES);
        if exit_code == Some(0) {
            let summary = parse_summary_line(&tail)
                .unwrap_or_else(|| serde_json::json!({"status": "ok"}));
            Some(ExitOutcome {
                task_id: agent.task_id,
                agent_id: agent.id,
                completed: true,
                summary: Some(summary),
                error: None,
            })
        } else {
            let excerpt = tail_excerpt(&tail, 20);
            Some(ExitOutcome {
                task_id: agent.task_id,
                agent_id: agent.id,
                completed: false,
                summary: None,
                error: Some(format!("exit_code={exit_code:?}: {excerpt}")),
            })
        }
    }

    /// `stop()` (spec.md §4.4 F3): SIGTERM every running child, wait
    /// `graceful_stop`, then SIGKILL survivors.
    pub async fn stop(&self) {
        let ids: Vec<AgentId> = self.agents.lock().keys().cloned().collect();
        for id in &ids {
            let _ = self.adapter.terminate(id).await;
        }
        tokio::time::sleep(self.config.graceful_stop).await;
        for id in &ids {
            if self.adapter.is_alive(id).await {
                let _ = self.adapter.kill(id).await;
            }
        }
    }
}

/// Parse the `SUMMARY: {...}` line from a log tail, searching from the end
/// (spec.md §6: "Terminal structured-summary block on exit (JSON, one line,
/// prefixed `SUMMARY: `)").
fn parse_summary_line(log_tail: &str) -> Option<serde_json::Value> {
    log_tail
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix("SUMMARY: "))
        .and_then(|json| serde_json::from_str(json).ok())
}

/// Last `n` lines of `tail`, used as the error excerpt for a non-zero exit.
fn tail_excerpt(tail: &str, n: usize) -> String {
    let lines: Vec<&str> = tail.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// Best-effort read of the last `max_bytes` of `path`. Returns an empty
/// string on any I/O failure — outcome parsing degrades to the generic
/// fallback rather than propagating.
fn read_log_tail(path: &Path, max_bytes: u64) -> String {
    let Ok(mut file) = std::fs::File::open(path) else {
        return String::new();
    };
    let len = file.metadata().map(|m| m.len()).unwrap_or(0);
    let start = len.saturating_sub(max_bytes);
    if file.seek(SeekFrom::Start(start)).is_err() {
        return String::new();
    }
    let mut buf = String::new();
    let _ = file.read_to_string(&mut buf);
    buf
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;

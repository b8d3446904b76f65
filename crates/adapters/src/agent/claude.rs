// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coding-assistant CLI adapter (spec.md §4.4, §6).
//!
//! Spawns the external CLI as a plain child process — cwd set to the
//! task's project, stdout/stderr redirected to per-agent files, the prompt
//! delivered over stdin. A background task awaits the child and reports
//! exactly one `Event::AgentExited` (spec.md §3 A3).

use std::collections::HashMap;
use std::fs::File;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use leon_core::{AgentId, Event};
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc;

use super::log_entry::{append_transcript_line, TranscriptEntry};
use super::{build_argv, AgentAdapter, AgentAdapterError, AgentHandle, AgentSpawnConfig};

/// Extract the binary basename from a path-or-name command string.
///
/// Handles absolute paths (`/usr/bin/claude` -> `claude`), relative paths
/// (`./claude` -> `claude`), and plain names. Falls back to `"claude"` for
/// empty strings.
pub fn extract_process_name(command: &str) -> String {
    command
        .split_whitespace()
        .next()
        .and_then(|first| first.rsplit('/').next())
        .unwrap_or("claude")
        .to_string()
}

struct Tracked {
    pid: u32,
}

/// Adapter for the coding-assistant CLI (spec.md §6 "Coding-assistant CLI").
#[derive(Clone)]
pub struct ClaudeAgentAdapter {
    tracked: Arc<Mutex<HashMap<AgentId, Tracked>>>,
}

impl Default for ClaudeAgentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeAgentAdapter {
    pub fn new() -> Self {
        Self { tracked: Arc::new(Mutex::new(HashMap::new())) }
    }
}

#[async_trait]
impl AgentAdapter for ClaudeAgentAdapter {
    async fn spawn(
        &self,
        config: AgentSpawnConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError> {
        if !config.project_path.exists() {
            return Err(AgentAdapterError::SpawnFailed(format!(
                "project path does not exist: {}",
                config.project_path.display()
            )));
        }

        let stdout_file = File::create(&config.stdout_path)
            .map_err(|e| AgentAdapterError::SpawnFailed(format!("stdout log: {e}")))?;
        let stderr_file = File::create(&config.stderr_path)
            .map_err(|e| AgentAdapterError::SpawnFailed(format!("stderr log: {e}")))?;

        let argv = build_argv(&config);
        let mut cmd = Command::new(&config.cli_path);
        cmd.args(&argv)
            .current_dir(&config.project_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file));
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| AgentAdapterError::SpawnFailed(e.to_string()))?;

        let pid = child
            .id()
            .ok_or_else(|| AgentAdapterError::SpawnFailed("child exited before pid was available".into()))?;

        if let Some(mut stdin) = child.stdin.take() {
            let prompt = config.prompt.clone();
            let agent_id = config.agent_id.clone();
            tokio::spawn(async move {
                if let Err(err) = stdin.write_all(prompt.as_bytes()).await {
                    tracing::warn!(%agent_id, error = %err, "failed to write prompt to agent stdin");
                }
                let _ = stdin.shutdown().await;
            });
        }

        append_transcript_line(
            &config.transcript_path,
            &TranscriptEntry::new("agent_spawned", serde_json::json!({ "pid": pid })),
        );

        self.tracked.lock().insert(config.agent_id.clone(), Tracked { pid });

        let agent_id = config.agent_id.clone();
        let transcript_path = config.transcript_path.clone();
        let tracked = self.tracked.clone();
        tokio::spawn(async move {
            let status = child.wait().await;
            let exit_code = status.ok().and_then(|s| s.code());
            append_transcript_line(
                &transcript_path,
                &TranscriptEntry::new("agent_exited", serde_json::json!({ "exit_code": exit_code })),
            );
            tracked.lock().remove(&agent_id);
            let _ = event_tx.send(Event::AgentExited { agent_id, exit_code }).await;
        });

        Ok(AgentHandle { agent_id: config.agent_id, pid })
    }

    async fn terminate(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError> {
        let pid = {
            let tracked = self.tracked.lock();
            tracked
                .get(agent_id)
                .map(|t| t.pid)
                .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))?
        };
        send_signal(pid, Some(nix::sys::signal::Signal::SIGTERM))
            .map_err(|e| AgentAdapterError::KillFailed(e.to_string()))
    }

    async fn kill(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError> {
        let pid = {
            let tracked = self.tracked.lock();
            tracked
                .get(agent_id)
                .map(|t| t.pid)
                .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))?
        };
        send_signal(pid, Some(nix::sys::signal::Signal::SIGKILL))
            .map_err(|e| AgentAdapterError::KillFailed(e.to_string()))
    }

    async fn is_alive(&self, agent_id: &AgentId) -> bool {
        let pid = {
            let tracked = self.tracked.lock();
            match tracked.get(agent_id) {
                Some(t) => t.pid,
                None => return false,
            }
        };
        send_signal(pid, None).is_ok()
    }
}

/// Signal a pid; `None` sends signal 0 (existence probe, no actual signal).
fn send_signal(pid: u32, signal: Option<nix::sys::signal::Signal>) -> Result<(), nix::errno::Errno> {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), signal)
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;

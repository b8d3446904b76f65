// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent spawn adapter (spec.md §4.4 "Spawn contract", §6 "Coding-assistant
//! CLI").
//!
//! Unlike the teacher's interactive tmux-pane driver, Leon's coding agent is
//! a one-shot child process: the supervisor hands it a prompt and a working
//! directory, the child runs to completion, and the result is read back from
//! its exit code plus a best-effort `SUMMARY:` line in its log tail. There is
//! no back-and-forth; a running agent is not sent further input.

mod claude;
pub mod log_entry;

pub use claude::{extract_process_name, ClaudeAgentAdapter};

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AgentCall, FakeAgentAdapter};

use async_trait::async_trait;
use leon_core::AgentId;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

use leon_core::Event;

/// Errors from agent spawn/kill operations.
#[derive(Debug, Error)]
pub enum AgentAdapterError {
    #[error("agent not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("kill failed: {0}")]
    KillFailed(String),
}

/// Configuration for spawning a new agent (spec.md §4.4 "Spawn contract").
#[derive(Debug, Clone)]
pub struct AgentSpawnConfig {
    pub agent_id: AgentId,
    /// Path to the external coding-CLI binary (e.g. `claude`).
    pub cli_path: String,
    /// Working directory for the child process.
    pub project_path: PathBuf,
    /// The opaque brief plus any project context, delivered to the child
    /// via stdin (spec.md §6: "accepts a prompt via argv or stdin").
    pub prompt: String,
    /// Allow-list of CLI "tools" the child may use (restrictive posture).
    pub allowed_tools: Vec<String>,
    /// Permissive posture — only set via explicit operator opt-in
    /// (`LEON_ALLOW_UNSAFE_CLI=1`, spec.md §9 "deliberate deviation").
    pub skip_permissions: bool,
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
    pub transcript_path: PathBuf,
    pub env: Vec<(String, String)>,
}

/// Handle to a spawned agent process.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    pub agent_id: AgentId,
    pub pid: u32,
}

/// Adapter for spawning and reaping the external coding-assistant CLI.
#[async_trait]
pub trait AgentAdapter: Clone + Send + Sync + 'static {
    /// Spawn the child process. `event_tx` receives exactly one
    /// `Event::AgentExited` when the child terminates (spec.md §3 A3: the
    /// supervisor publishes an outcome exactly once per agent lifecycle).
    async fn spawn(
        &self,
        config: AgentSpawnConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError>;

    /// Send SIGTERM to a tracked child (spec.md §4.4 F3 "stop() signals
    /// running children with SIGTERM").
    async fn terminate(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError>;

    /// Send SIGKILL to a tracked child (spec.md §4.4 F3, after the grace
    /// period elapses).
    async fn kill(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError>;

    /// Point-in-time liveness check, used by the supervisor's monitoring
    /// tick (spec.md §4.4 "polls each tracked child for liveness").
    async fn is_alive(&self, agent_id: &AgentId) -> bool;
}

/// Build the child's argv from the spawn config (spec.md §4.4, §6).
///
/// The restrictive-by-default posture only passes the allow-list; the
/// permissive flag is a distinct, explicitly-opted-in argument (spec.md §9
/// "the spec requires restrictive-by-default and an opt-in").
pub fn build_argv(config: &AgentSpawnConfig) -> Vec<String> {
    let mut argv = Vec::new();
    if config.skip_permissions {
        argv.push("--dangerously-skip-permissions".to_string());
    } else if !config.allowed_tools.is_empty() {
        argv.push("--allowed-tools".to_string());
        argv.push(config.allowed_tools.join(","));
    }
    argv.push("--cwd".to_string());
    argv.push(config.project_path.display().to_string());
    argv
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use leon_core::{AgentId, Source, TaskId};
use leon_daemon::protocol::{
    self, AgentEntry, ConversationEntryDto, JobEntry, MemorySummary, NightSummary, ProtocolError,
    Query, Request, Response, StatusSummary, TaskEntry, TaskFilter, UtteranceOutcome,
};
use thiserror::Error;
use tokio::net::UnixStream;

use crate::client_lifecycle::log_connection_error;
use crate::daemon_process::{
    cleanup_stale_socket, daemon_dir, daemon_socket, probe_socket, read_startup_error,
    start_daemon_background, stop_daemon_sync, wrap_with_startup_error,
};

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests (hello, status, query, shutdown).
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("LEON_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for daemon to start.
pub fn timeout_connect() -> Duration {
    parse_duration_ms("LEON_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for process to exit.
pub fn timeout_exit() -> Duration {
    parse_duration_ms("LEON_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for connection retries.
pub fn poll_interval() -> Duration {
    parse_duration_ms("LEON_CONNECT_POLL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine state directory")]
    NoStateDir,
}

/// Daemon client.
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// For action commands (mutate daemon state): auto-start, max one
    /// restart per process so a misbehaving daemon can't loop forever.
    pub fn for_action() -> Result<Self, ClientError> {
        Self::connect_or_start_once()
    }

    /// For query commands (read-only): connect only, never auto-start —
    /// there is nothing useful to query from a daemon that doesn't exist
    /// yet.
    pub fn for_query() -> Result<Self, ClientError> {
        Self::connect()
    }

    fn connect_or_start_once() -> Result<Self, ClientError> {
        static RESTARTED: AtomicBool = AtomicBool::new(false);

        if RESTARTED.load(Ordering::SeqCst) {
            return Self::connect();
        }

        let daemon_dir = daemon_dir()?;
        let version_path = daemon_dir.join("daemon.version");
        if let Ok(daemon_version) = std::fs::read_to_string(&version_path) {
            let cli_version = env!("CARGO_PKG_VERSION");
            if daemon_version.trim() != cli_version {
                RESTARTED.store(true, Ordering::SeqCst);
                eprintln!(
                    "warn: daemon version {} does not match cli version {}, restarting daemon",
                    daemon_version.trim(),
                    cli_version
                );
                stop_daemon_sync();
            }
        }

        match Self::connect() {
            Ok(client) => {
                if probe_socket(&client.socket_path) {
                    Ok(client)
                } else {
                    cleanup_stale_socket()?;
                    let child = start_daemon_background()?;
                    Self::connect_with_retry(timeout_connect(), child)
                }
            }
            Err(ClientError::DaemonNotRunning) => {
                let child = start_daemon_background()?;
                Self::connect_with_retry(timeout_connect(), child)
            }
            Err(e) => Err(wrap_with_startup_error(e)),
        }
    }

    /// Connect to an existing daemon (no auto-start).
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = daemon_socket()?;

        if !socket_path.exists() {
            let err = ClientError::DaemonNotRunning;
            log_connection_error(&err);
            return Err(err);
        }

        Ok(Self { socket_path })
    }

    fn connect_with_retry(
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let poll_start = Instant::now();
                    while poll_start.elapsed() < timeout_exit() {
                        if let Some(err) = read_startup_error() {
                            return Err(ClientError::DaemonStartFailed(err));
                        }
                        std::thread::sleep(poll_interval());
                    }
                    return Err(ClientError::DaemonStartFailed(format!(
                        "exited with {}",
                        status
                    )));
                }
                Ok(None) => {}
                Err(_) => {}
            }

            match Self::connect() {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => {
                    std::thread::sleep(poll_interval());
                }
                Err(e) => return Err(wrap_with_startup_error(e)),
            }
        }

        Err(wrap_with_startup_error(ClientError::DaemonStartTimeout))
    }

    async fn send_with_timeout(
        &self,
        request: &Request,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(request)?;
        tokio::time::timeout(write_timeout, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes =
            tokio::time::timeout(read_timeout, protocol::read_message(&mut reader))
                .await
                .map_err(|_| ProtocolError::Timeout)??;

        let response: Response = protocol::decode(&response_bytes)?;
        Ok(response)
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        match self
            .send_with_timeout(request, timeout_ipc(), timeout_ipc())
            .await
        {
            Ok(response) => Ok(response),
            Err(e) => {
                log_connection_error(&e);
                Err(e)
            }
        }
    }

    fn reject<T>(resp: Response) -> Result<T, ClientError> {
        match resp {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Version handshake.
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello {
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    /// Submit an utterance for routing (spec.md §4.2) — this is what every
    /// front-end (including this CLI's `leon say`) goes through.
    pub async fn utterance(
        &self,
        source: Source,
        text: &str,
        sender_id: Option<&str>,
    ) -> Result<UtteranceOutcome, ClientError> {
        let request = Request::Utterance {
            source,
            text: text.to_string(),
            sender_id: sender_id.map(String::from),
        };
        match self.send(&request).await? {
            Response::Utterance { outcome } => Ok(outcome),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self) -> Result<StatusSummary, ClientError> {
        match self.send(&Request::Query { query: Query::Status }).await? {
            Response::Status { status } => Ok(status),
            other => Self::reject(other),
        }
    }

    pub async fn agents(&self) -> Result<Vec<AgentEntry>, ClientError> {
        match self.send(&Request::Query { query: Query::Agents }).await? {
            Response::Agents { agents } => Ok(agents),
            other => Self::reject(other),
        }
    }

    pub async fn agent_detail(&self, id: AgentId) -> Result<Option<AgentEntry>, ClientError> {
        let request = Request::Query {
            query: Query::AgentDetail { id },
        };
        match self.send(&request).await? {
            Response::AgentDetail { agent } => Ok(agent),
            other => Self::reject(other),
        }
    }

    pub async fn tasks(&self, filter: TaskFilter) -> Result<Vec<TaskEntry>, ClientError> {
        let request = Request::Query {
            query: Query::Tasks { filter },
        };
        match self.send(&request).await? {
            Response::Tasks { tasks } => Ok(tasks),
            other => Self::reject(other),
        }
    }

    pub async fn jobs(&self) -> Result<Vec<JobEntry>, ClientError> {
        match self.send(&Request::Query { query: Query::Jobs }).await? {
            Response::Jobs { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }

    pub async fn night(&self) -> Result<NightSummary, ClientError> {
        match self.send(&Request::Query { query: Query::Night }).await? {
            Response::Night { night } => Ok(night),
            other => Self::reject(other),
        }
    }

    pub async fn memory(&self) -> Result<MemorySummary, ClientError> {
        match self.send(&Request::Query { query: Query::Memory }).await? {
            Response::Memory { memory } => Ok(memory),
            other => Self::reject(other),
        }
    }

    pub async fn conversation_tail(
        &self,
        limit: usize,
    ) -> Result<Vec<ConversationEntryDto>, ClientError> {
        let request = Request::Query {
            query: Query::ConversationTail { limit },
        };
        match self.send(&request).await? {
            Response::Conversation { entries } => Ok(entries),
            other => Self::reject(other),
        }
    }

    pub async fn retry_task(&self, id: TaskId) -> Result<(), ClientError> {
        match self.send(&Request::RetryTask { id }).await? {
            Response::Ack => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn night_toggle(&self, on: bool) -> Result<(), ClientError> {
        match self.send(&Request::NightToggle { on }).await? {
            Response::Ack => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn run_job_now(&self, name: &str) -> Result<(), ClientError> {
        let request = Request::RunJobNow { name: name.to_string() };
        match self.send(&request).await? {
            Response::Ack => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&self, graceful: bool) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown { graceful }).await? {
            Response::Ack => Ok(()),
            other => Self::reject(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

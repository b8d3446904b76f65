// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket listener: accepts a connection per request, decodes one
//! `Request`, runs it on the main loop via the dispatcher, and writes back
//! one `Response` (spec.md §6 "Filesystem (persistence)" socket, §4.1
//! "Contract").

pub mod commands;
pub mod mutations;
pub mod query;
pub mod tick;

use std::sync::Arc;

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use leon_adapters::agent::AgentAdapter;

use crate::lifecycle::Shared;
use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

/// Accept loop. Each connection is handled in its own spawned task so a
/// slow or stuck client can never block another front-end's request.
pub struct Listener<A: AgentAdapter> {
    socket: UnixListener,
    shared: Arc<Shared<A>>,
}

impl<A: AgentAdapter + 'static> Listener<A> {
    pub fn new(socket: UnixListener, shared: Arc<Shared<A>>) -> Self {
        Self { socket, shared }
    }

    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let shared = Arc::clone(&self.shared);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, &shared).await {
                            match err {
                                ConnectionError::Protocol(protocol::ProtocolError::ConnectionClosed) => {
                                    debug!("client disconnected before sending a request")
                                }
                                ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
                                    warn!("connection timed out")
                                }
                                other => error!(error = %other, "connection error"),
                            }
                        }
                    });
                }
                Err(err) => error!(error = %err, "accept error"),
            }
        }
    }
}

async fn handle_connection<A: AgentAdapter + 'static>(
    stream: UnixStream,
    shared: &Arc<Shared<A>>,
) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;
    if matches!(request, Request::Query { .. }) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, shared).await;
    debug!(response = ?response, "sending response");

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

/// Route one decoded request to its handler. Every branch that touches
/// shared mutable state runs on the main loop via `dispatcher.submit` so
/// request handling never races the scheduler/supervisor/night ticks
/// (spec.md §4.1 "single cooperative main loop").
async fn handle_request<A: AgentAdapter + 'static>(request: Request, shared: &Arc<Shared<A>>) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello { version: PROTOCOL_VERSION.to_string() },

        Request::Utterance { source, text, sender_id } => {
            let shared = Arc::clone(shared);
            let outcome = shared
                .dispatcher
                .submit(async move { commands::handle_utterance(&shared, source, text, sender_id).await })
                .await
                .unwrap_or_else(|_| protocol::UtteranceOutcome::Error {
                    message: "utterance dropped before completion".to_string(),
                });
            Response::Utterance { outcome }
        }

        Request::Query { query } => {
            let shared = Arc::clone(shared);
            shared
                .dispatcher
                .submit(async move { query::handle_query(&shared, query) })
                .await
                .unwrap_or(Response::Error { message: "query dropped before completion".to_string() })
        }

        Request::RetryTask { id } => {
            let shared = Arc::clone(shared);
            shared
                .dispatcher
                .submit(async move { mutations::handle_retry_task(&shared, id) })
                .await
                .unwrap_or(Response::Error { message: "retry dropped before completion".to_string() })
        }

        Request::NightToggle { on } => {
            let shared = Arc::clone(shared);
            shared
                .dispatcher
                .submit(async move { mutations::handle_night_toggle(&shared, on) })
                .await
                .unwrap_or(Response::Error { message: "night toggle dropped before completion".to_string() })
        }

        Request::RunJobNow { name } => {
            let shared = Arc::clone(shared);
            shared
                .dispatcher
                .submit(async move { mutations::handle_run_job_now(&shared, &name).await })
                .await
                .unwrap_or(Response::Error { message: "job run dropped before completion".to_string() })
        }

        Request::Shutdown { graceful } => {
            info!(graceful, "shutdown requested over the socket");
            shared.shutdown.notify_waiters();
            Response::Ack
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard WebSocket listener (spec.md §6 "Dashboard (WebSocket)").
//!
//! Inbound frames: `{command: "auth"|"input"|"voice_mute"|"voice_unmute"|"ping"}`.
//! Outbound: `{type: "auth_result"|"input_response"|"agent_completed"|"agent_failed"|"vad_event"|"pong"}`.
//! Each connection must send a valid `auth` frame with the bearer token
//! before any other command is honored. Unauthenticated connections are
//! rate-limited the same as authenticated ones (loopback exempt).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use leon_adapters::agent::AgentAdapter;
use leon_core::Source;

use crate::lifecycle::Shared;
use crate::listener::commands::handle_utterance;
use crate::ttl_cache::TtlCache;

/// Inbound command rate limit: 20 messages per 60s window, loopback exempt
/// (spec.md §6 "Rate-limit on message path (20/60s, loopback exempt)").
const RATE_LIMIT_COUNT: usize = 20;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum InboundFrame {
    Auth { token: String },
    Input { text: String },
    VoiceMute,
    VoiceUnmute,
    Ping,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutboundFrame {
    AuthResult { ok: bool },
    InputResponse { outcome: crate::protocol::UtteranceOutcome },
    AgentCompleted { agent_id: String },
    AgentFailed { agent_id: String, message: String },
    VadEvent { speaking: bool },
    Pong,
}

/// Per-connection rate limiter built on the same `TtlCache` the chat-bridge
/// dedupe set uses: each allowed message is inserted under a fresh counter
/// key, so `TtlCache::len` after eviction is exactly the count of messages
/// seen within the last `RATE_LIMIT_WINDOW`.
struct RateLimiter {
    hits: TtlCache<u64>,
    next_key: u64,
    exempt: bool,
}

impl RateLimiter {
    fn new(exempt: bool) -> Self {
        Self {
            hits: TtlCache::new(RATE_LIMIT_WINDOW, RATE_LIMIT_COUNT),
            next_key: 0,
            exempt,
        }
    }

    fn allow(&mut self, now: Instant) -> bool {
        if self.exempt {
            return true;
        }
        // Dummy lookup purely to trigger the cache's lazy eviction pass
        // before consulting `len()`.
        self.hits.contains(&u64::MAX, now);
        if self.hits.len() >= RATE_LIMIT_COUNT {
            return false;
        }
        self.hits.insert(self.next_key, now);
        self.next_key = self.next_key.wrapping_add(1);
        true
    }
}

/// Accept loop for the dashboard WebSocket endpoint.
pub async fn run<A: AgentAdapter + 'static>(shared: Arc<Shared<A>>) -> std::io::Result<()> {
    let bind = crate::env::dashboard_bind();
    let listener = TcpListener::bind(&bind).await?;
    info!(%bind, "dashboard listener bound");

    loop {
        let (stream, addr) = listener.accept().await?;
        let shared = Arc::clone(&shared);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, addr, &shared).await {
                warn!(%addr, error = %err, "dashboard connection ended with error");
            }
        });
    }
}

async fn handle_connection<A: AgentAdapter + 'static>(
    stream: TcpStream,
    addr: SocketAddr,
    shared: &Arc<Shared<A>>,
) -> anyhow::Result<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut tx, mut rx) = ws.split();

    let required_token = crate::env::dashboard_auth_token();
    let mut authed = required_token.is_none();
    let mut limiter = RateLimiter::new(addr.ip().is_loopback());

    while let Some(msg) = rx.next().await {
        let msg = msg?;
        let Message::Text(text) = msg else { continue };

        if !limiter.allow(Instant::now()) {
            debug!(%addr, "dashboard message dropped by rate limit");
            continue;
        }

        let frame: InboundFrame = match serde_json::from_str(&text) {
            Ok(f) => f,
            Err(err) => {
                debug!(%addr, error = %err, "unparseable dashboard frame");
                continue;
            }
        };

        match frame {
            InboundFrame::Auth { token } => {
                authed = match &required_token {
                    Some(expected) => *expected == token,
                    None => true,
                };
                send(&mut tx, &OutboundFrame::AuthResult { ok: authed }).await?;
            }
            InboundFrame::Input { text } if authed => {
                let shared = Arc::clone(shared);
                let outcome = shared
                    .dispatcher
                    .submit(async move { handle_utterance(&shared, Source::Dashboard, text, None).await })
                    .await
                    .unwrap_or_else(|_| crate::protocol::UtteranceOutcome::Error {
                        message: "utterance dropped before completion".to_string(),
                    });
                send(&mut tx, &OutboundFrame::InputResponse { outcome }).await?;
            }
            InboundFrame::Input { .. } => {
                send(&mut tx, &OutboundFrame::AuthResult { ok: false }).await?;
            }
            InboundFrame::VoiceMute | InboundFrame::VoiceUnmute if authed => {
                // Voice mute state lives with the voice bridge; nothing to
                // acknowledge beyond accepting the frame.
            }
            InboundFrame::VoiceMute | InboundFrame::VoiceUnmute => {}
            InboundFrame::Ping => send(&mut tx, &OutboundFrame::Pong).await?,
        }
    }

    Ok(())
}

async fn send(
    tx: &mut (impl SinkExt<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin),
    frame: &OutboundFrame,
) -> anyhow::Result<()> {
    let text = serde_json::to_string(frame)?;
    tx.send(Message::Text(text.into())).await?;
    Ok(())
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;

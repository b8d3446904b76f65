// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat-bridge HTTP interface (spec.md §6 "Chat bridges (JS)").
//!
//! Inbound: the JS bridge process POSTs one message per request to a fixed
//! endpoint on this listener. Outbound: when the router produces a reply
//! for a bridge-sourced utterance, the core calls back into the bridge
//! process over HTTP (`LEON_BRIDGE_CALLBACK_URL`) to deliver it.
//!
//! This intentionally avoids pulling in a framework: the request line and
//! headers are read directly off the socket, and the only route handled is
//! `POST /message`. A 5-minute `TtlCache` drops duplicate deliveries the
//! bridge process may retry.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use leon_adapters::agent::AgentAdapter;
use leon_core::Source;

use crate::lifecycle::Shared;
use crate::listener::commands::handle_utterance;
use crate::protocol::UtteranceOutcome;
use crate::ttl_cache::TtlCache;

/// Retry window a flaky bridge process is expected to stay within
/// (spec.md §6: dedupe against at-least-once redelivery).
const DEDUPE_TTL: Duration = Duration::from_secs(5 * 60);
const DEDUPE_CAPACITY: usize = 10_000;

#[derive(Debug, Deserialize)]
struct InboundMessage {
    /// Bridge-assigned id, used for dedupe. Not a channel message id.
    message_id: String,
    sender_id: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct OutboundMessage {
    sender_id: String,
    text: String,
}

/// One concrete delivery adapter: an HTTP POST to the bridge's callback
/// URL. Modeled as a trait so a future bridge transport doesn't have to
/// touch the call sites below.
#[async_trait::async_trait]
pub trait BridgeSink: Send + Sync {
    async fn deliver(&self, message: OutboundMessage) -> anyhow::Result<()>;
}

pub struct HttpBridgeSink {
    client: reqwest::Client,
    callback_url: String,
}

impl HttpBridgeSink {
    pub fn new(callback_url: String) -> Self {
        Self { client: reqwest::Client::new(), callback_url }
    }
}

#[async_trait::async_trait]
impl BridgeSink for HttpBridgeSink {
    async fn deliver(&self, message: OutboundMessage) -> anyhow::Result<()> {
        self.client
            .post(&self.callback_url)
            .json(&message)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Accept loop for the chat-bridge HTTP endpoint. `sink` is `None` when no
/// `LEON_BRIDGE_CALLBACK_URL` is configured, in which case replies are
/// computed but never delivered.
pub async fn run<A: AgentAdapter + 'static>(
    shared: Arc<Shared<A>>,
    sink: Option<Arc<dyn BridgeSink>>,
) -> io::Result<()> {
    let bind = crate::env::bridge_bind();
    let listener = TcpListener::bind(&bind).await?;
    info!(%bind, "chat bridge listener bound");

    let seen = Arc::new(parking_lot::Mutex::new(TtlCache::new(DEDUPE_TTL, DEDUPE_CAPACITY)));

    loop {
        let (stream, addr) = listener.accept().await?;
        let shared = Arc::clone(&shared);
        let sink = sink.clone();
        let seen = Arc::clone(&seen);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, &shared, sink, &seen).await {
                warn!(%addr, error = %err, "chat bridge connection error");
            }
        });
    }
}

async fn handle_connection<A: AgentAdapter + 'static>(
    mut stream: TcpStream,
    shared: &Arc<Shared<A>>,
    sink: Option<Arc<dyn BridgeSink>>,
    seen: &parking_lot::Mutex<TtlCache<String>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);

    let (method, path, body) = read_request(&mut reader).await?;
    if method != "POST" || path != "/message" {
        write_response(&mut writer, 404, "not found").await?;
        return Ok(());
    }

    let inbound: InboundMessage = match serde_json::from_slice(&body) {
        Ok(m) => m,
        Err(err) => {
            debug!(error = %err, "unparseable bridge message");
            write_response(&mut writer, 400, "bad request").await?;
            return Ok(());
        }
    };

    let now = Instant::now();
    if seen.lock().contains(&inbound.message_id, now) {
        write_response(&mut writer, 200, "duplicate").await?;
        return Ok(());
    }
    seen.lock().insert(inbound.message_id.clone(), now);

    let shared_for_job = Arc::clone(shared);
    let sender_id = inbound.sender_id.clone();
    let text = inbound.text;
    let outcome = shared
        .dispatcher
        .submit(async move {
            handle_utterance(&shared_for_job, Source::Whatsapp, text, Some(sender_id)).await
        })
        .await
        .unwrap_or_else(|_| UtteranceOutcome::Error {
            message: "utterance dropped before completion".to_string(),
        });

    write_response(&mut writer, 200, "accepted").await?;

    if let (Some(sink), UtteranceOutcome::Reply { text }) = (sink, &outcome) {
        let message = OutboundMessage { sender_id: inbound.sender_id, text: text.clone() };
        if let Err(err) = sink.deliver(message).await {
            warn!(error = %err, "chat bridge callback delivery failed");
        }
    }

    Ok(())
}

async fn read_request(
    reader: &mut BufReader<tokio::net::tcp::ReadHalf<'_>>,
) -> anyhow::Result<(String, String, Vec<u8>)> {
    let mut header_buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        reader.read_exact(&mut byte).await?;
        header_buf.push(byte[0]);
        if header_buf.ends_with(b"\r\n\r\n") {
            break;
        }
        if header_buf.len() > 16 * 1024 {
            anyhow::bail!("request headers too large");
        }
    }

    let header_text = String::from_utf8_lossy(&header_buf);
    let mut lines = header_text.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let content_length: usize = lines
        .find_map(|line| line.strip_prefix("Content-Length:").or_else(|| line.strip_prefix("content-length:")))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).await?;
    }

    Ok((method, path, body))
}

async fn write_response(
    writer: &mut tokio::net::tcp::WriteHalf<'_>,
    status: u16,
    body: &str,
) -> io::Result<()> {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    writer.write_all(response.as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between the `leon` CLI and the `leond` daemon.
//!
//! Wire format: 4-byte big-endian length prefix + JSON payload (see
//! `protocol_wire`). This is the same shape every front-end uses to reach
//! the main loop (spec.md §4.1): the CLI's `leon say` is just another
//! producer submitting an `Utterance`.

#[path = "protocol_types.rs"]
mod types;
#[path = "protocol_wire.rs"]
pub mod wire;

use serde::{Deserialize, Serialize};

pub use types::{
    AgentEntry, ConversationEntryDto, JobEntry, MemorySummary, NightSummary, ProfileEntry,
    StatusSummary, TaskEntry, TaskFilter, UtteranceOutcome,
};
pub use wire::{
    decode, encode, read_message, read_request, write_message, write_response, ProtocolError,
    DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};

use leon_core::{AgentId, Source, TaskId};

/// A query against read-only daemon state (spec.md §3 "Ownership": a
/// component may read another's state; these are exactly those reads,
/// surfaced over IPC).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    Status,
    Agents,
    AgentDetail { id: AgentId },
    Tasks { filter: TaskFilter },
    Jobs,
    Night,
    Memory,
    ConversationTail { limit: usize },
}

/// Request from the CLI (or any IPC front-end) to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check.
    Ping,
    /// Version handshake.
    Hello { version: String },
    /// Submit an utterance for routing (spec.md §4.2). This is the single
    /// entry point every front-end uses; `source` distinguishes them.
    Utterance {
        source: Source,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<String>,
    },
    /// Read-only state query.
    Query { query: Query },
    /// Force a `failed`-eligible task back to `queued` immediately, ahead
    /// of its natural retry (operator override, not part of spec.md's
    /// automatic retry path).
    RetryTask { id: TaskId },
    /// Flip the night-mode operator toggle (spec.md §4.6 gate condition i).
    NightToggle { on: bool },
    /// Fire a scheduled job immediately, outside its cadence.
    RunJobNow { name: String },
    /// Request daemon shutdown (spec.md §4.1 "Shutdown").
    Shutdown { graceful: bool },
}

/// Response from the daemon to the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Hello { version: String },
    Utterance { outcome: UtteranceOutcome },
    Status { status: StatusSummary },
    Agents { agents: Vec<AgentEntry> },
    AgentDetail { agent: Option<AgentEntry> },
    Tasks { tasks: Vec<TaskEntry> },
    Jobs { jobs: Vec<JobEntry> },
    Night { night: NightSummary },
    Memory { memory: MemorySummary },
    Conversation { entries: Vec<ConversationEntryDto> },
    Ack,
    Error { message: String },
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound utterances — the single record shape every front-end produces.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Monotonic identifier assigned to each utterance as it enters the router.
    pub struct UtteranceId;
}

/// Which front-end produced an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Cli,
    Voice,
    Dashboard,
    Whatsapp,
    Scheduler,
    /// The orchestrator talking to itself (quarantine notices, alerts).
    SelfGenerated,
}

impl Source {
    /// Scheduler built-ins and self-generated notices never enter the
    /// conversation log (spec.md §4.2 side-effects).
    pub fn skips_conversation_log(&self) -> bool {
        matches!(self, Source::Scheduler | Source::SelfGenerated)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Source::Cli => "cli",
            Source::Voice => "voice",
            Source::Dashboard => "dashboard",
            Source::Whatsapp => "whatsapp",
            Source::Scheduler => "scheduler",
            Source::SelfGenerated => "self",
        };
        write!(f, "{s}")
    }
}

/// Reserved prefix the scheduler uses to address the router's built-in
/// handler directly, bypassing LM classification (spec.md §4.2 step 2).
pub const BUILTIN_SENTINEL: &str = "__builtin__:";

/// A single inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: UtteranceId,
    pub received_at_ms: u64,
    pub source: Source,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
}

impl Utterance {
    pub fn new(id: UtteranceId, received_at_ms: u64, source: Source, text: impl Into<String>) -> Self {
        Self {
            id,
            received_at_ms,
            source,
            text: text.into(),
            sender_id: None,
        }
    }

    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    /// True if this is a scheduler dispatch of a reserved built-in token,
    /// e.g. `__builtin__:heartbeat`.
    pub fn is_builtin_dispatch(&self) -> bool {
        self.source == Source::Scheduler && self.text.starts_with(BUILTIN_SENTINEL)
    }

    /// The built-in token name, if this is a builtin dispatch.
    pub fn builtin_token(&self) -> Option<&str> {
        self.text.strip_prefix(BUILTIN_SENTINEL)
    }
}

#[cfg(test)]
#[path = "utterance_tests.rs"]
mod tests;

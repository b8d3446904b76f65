// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded conversation log (spec.md §3 "Conversation log").
//!
//! Invariant (i): entries are appended in acknowledgement order, not arrival
//! order — a reply is pushed only after the work it answers is done.
//! Invariant (ii): truncating to fit a provider's context window produces a
//! *projection* of the tail; the stored log is never mutated by a read.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default retained conversation length (spec.md §3, `K`).
pub const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub text: String,
    pub timestamp_ms: u64,
}

/// Bounded, ordered log of conversation turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLog {
    #[serde(default = "default_capacity")]
    capacity: usize,
    #[serde(default)]
    entries: VecDeque<ConversationEntry>,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl ConversationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Append a turn, evicting the oldest entry first if at capacity.
    pub fn push(&mut self, role: Role, text: impl Into<String>, timestamp_ms: u64) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ConversationEntry {
            role,
            text: text.into(),
            timestamp_ms,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.entries.iter()
    }

    /// Read-only projection of the most recent `n` entries. Never mutates
    /// the underlying log — used to build provider-sized prompt contexts.
    pub fn tail(&self, n: usize) -> Vec<ConversationEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Truncate a tail projection so its total character length fits under
    /// `max_chars`, dropping oldest-first. Returns the projection and
    /// whether truncation actually discarded anything (callers use this to
    /// decide whether to emit the context-loss debug log, spec.md §4.7).
    pub fn tail_fitting(&self, max_chars: usize) -> (Vec<ConversationEntry>, bool) {
        let all = self.tail(self.entries.len());
        let mut total: usize = all.iter().map(|e| e.text.len()).sum();
        if total <= max_chars {
            return (all, false);
        }
        let mut kept: VecDeque<ConversationEntry> = all.into();
        while total > max_chars {
            match kept.pop_front() {
                Some(e) => total -= e.text.len(),
                None => break,
            }
        }
        (kept.into_iter().collect(), true)
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;

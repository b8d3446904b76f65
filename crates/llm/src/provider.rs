// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The provider adapter trait (spec.md §4.7 "Ordered chain").
//!
//! Mirrors the teacher's `AgentAdapter` shape: a small `async_trait`, a
//! `thiserror` error enum distinguishing retryable from terminal failures,
//! and a `Clone + Send + Sync + 'static` bound so adapters can be cloned
//! into the chain cheaply (they hold only an `Arc`-wrapped HTTP client).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use leon_core::conversation::ConversationEntry;

/// Which shape of completion is being requested (spec.md §4.7 "Request kinds").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Full conversational turn.
    Chat,
    /// Stateless short completion, e.g. skill classification.
    Quick,
    /// Constrained JSON output, e.g. routing verdicts, fact extraction.
    AnalyzeJson,
}

/// A request to produce a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub kind: RequestKind,
    pub system_prompt: Option<String>,
    pub conversation: Vec<ConversationEntry>,
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(kind: RequestKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            system_prompt: None,
            conversation: Vec::new(),
            prompt: prompt.into(),
        }
    }

    pub fn with_conversation(mut self, conversation: Vec<ConversationEntry>) -> Self {
        self.conversation = conversation;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Token accounting for a completion, logged per call for future cost
/// accounting (SPEC_FULL addition — ambient observability, not a new
/// feature; spec.md §6 already implies `complete(req) -> (text, usage)`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: Usage,
}

/// Which provider in the default chain answered (spec.md §4.7 "Default
/// order": `primary-cloud`, `secondary-cloud`, `local-inference`,
/// `external-cli`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    PrimaryCloud,
    SecondaryCloud,
    LocalInference,
    ExternalCli,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderKind::PrimaryCloud => "primary-cloud",
            ProviderKind::SecondaryCloud => "secondary-cloud",
            ProviderKind::LocalInference => "local-inference",
            ProviderKind::ExternalCli => "external-cli",
        };
        write!(f, "{s}")
    }
}

/// Errors from a single provider call. The chain inspects `is_retryable()`
/// to decide whether to fail over to the next adapter or short-circuit
/// (spec.md §4.7: "non-retryable errors... short-circuit... without
/// exhausting the chain").
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,
    #[error("server error: {0}")]
    ServerError(u16),
    #[error("rate limited")]
    RateLimited,
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("provider does not support this request kind")]
    Unsupported,
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout
                | ProviderError::ServerError(_)
                | ProviderError::RateLimited
                | ProviderError::ConnectionFailed(_)
        )
    }
}

/// A single LM provider in the failover chain (spec.md §4.7).
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    fn kind(&self) -> ProviderKind;

    /// Maximum conversation length (in characters) this provider accepts
    /// (spec.md §4.7 "Context truncation": "each adapter declares a context
    /// limit").
    fn context_limit_chars(&self) -> usize;

    fn supported(&self, kind: RequestKind) -> bool;

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError>;
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;

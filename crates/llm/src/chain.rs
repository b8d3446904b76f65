// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ordered provider failover chain (spec.md §4.7 "Ordered chain").

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use leon_core::conversation::ConversationLog;

use crate::provider::{CompletionRequest, CompletionResponse, ProviderAdapter, ProviderError, RequestKind};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("no configured provider supports request kind {0:?}")]
    Unsupported(RequestKind),
    #[error("every provider in the chain failed; last error: {0}")]
    Exhausted(#[source] ProviderError),
    #[error("provider rejected the request: {0}")]
    NonRetryable(#[source] ProviderError),
}

/// An ordered list of provider adapters tried in turn (spec.md §4.7:
/// "the *first* adapter that `supported()` accepts the request kind is
/// tried; on a retryable error the next is tried").
pub struct ProviderChain {
    providers: Vec<Arc<dyn ProviderAdapter>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self { providers }
    }

    /// Truncate `conversation`'s tail to fit `max_chars`, logging a debug
    /// entry when truncation actually discarded history (spec.md §4.7
    /// "Context truncation").
    fn build_context(conversation: &ConversationLog, max_chars: usize) -> Vec<leon_core::conversation::ConversationEntry> {
        let (tail, truncated) = conversation.tail_fitting(max_chars);
        if truncated {
            debug!(max_chars, kept = tail.len(), "conversation tail truncated to fit provider context");
        }
        tail
    }

    /// Run `request` against the chain, building its conversation context
    /// from `conversation` sized to whichever provider is tried.
    pub async fn complete(
        &self,
        mut request: CompletionRequest,
        conversation: &ConversationLog,
    ) -> Result<CompletionResponse, ChainError> {
        let candidates: Vec<_> = self
            .providers
            .iter()
            .filter(|p| p.supported(request.kind))
            .collect();
        if candidates.is_empty() {
            return Err(ChainError::Unsupported(request.kind));
        }

        let mut last_error = None;
        for provider in candidates {
            request.conversation = Self::build_context(conversation, provider.context_limit_chars());
            match provider.complete(&request).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() => {
                    warn!(provider = %provider.kind(), error = %err, "provider call failed, trying next in chain");
                    last_error = Some(err);
                    continue;
                }
                Err(err) => {
                    warn!(provider = %provider.kind(), error = %err, "provider rejected request, not retrying");
                    return Err(ChainError::NonRetryable(err));
                }
            }
        }
        Err(ChainError::Exhausted(last_error.unwrap_or(ProviderError::Timeout)))
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;

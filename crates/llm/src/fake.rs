// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake provider adapter for deterministic chain tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::provider::{
    CompletionRequest, CompletionResponse, ProviderAdapter, ProviderError, ProviderKind, RequestKind, Usage,
};

/// A provider whose responses (or errors) are queued up front and played
/// back in order. Records every request it was asked to complete.
pub struct FakeProvider {
    kind: ProviderKind,
    context_limit_chars: usize,
    supports: Vec<RequestKind>,
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeProvider {
    pub fn new(kind: ProviderKind, supports: Vec<RequestKind>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            context_limit_chars: 100_000,
            supports,
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn new_with_context_limit(kind: ProviderKind, supports: Vec<RequestKind>, limit: usize) -> Arc<Self> {
        Arc::new(Self {
            kind,
            context_limit_chars: limit,
            supports,
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().push_back(Ok(text.into()));
    }

    pub fn queue_error(&self, error: ProviderError) {
        self.responses.lock().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ProviderAdapter for FakeProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn context_limit_chars(&self) -> usize {
        self.context_limit_chars
    }

    fn supported(&self, kind: RequestKind) -> bool {
        self.supports.contains(&kind)
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        self.calls.lock().push(request.clone());
        match self.responses.lock().pop_front() {
            Some(Ok(text)) => Ok(CompletionResponse {
                text,
                usage: Usage {
                    prompt_tokens: request.prompt.len() as u32,
                    completion_tokens: 0,
                },
            }),
            Some(Err(err)) => Err(err),
            None => Err(ProviderError::ConnectionFailed("no queued response".into())),
        }
    }
}

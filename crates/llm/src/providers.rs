// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete `ProviderAdapter` implementations for the default chain (spec.md
//! §4.7 "Default order": `primary-cloud`, `secondary-cloud`, `local-inference`,
//! `external-cli`).
//!
//! The two cloud shapes and the local-inference shape are all "HTTPS request
//! with a JSON body and a per-provider auth header" (spec.md §6), so they
//! share one `HttpProvider` struct configured per instance; only the auth
//! header and endpoint differ. `external-cli` has no network surface at all —
//! it shells out to a locally installed inference CLI the way
//! `leon-adapters::agent` shells out to the coding-assistant CLI, so it gets
//! its own type built on the same `tokio::process::Command` idiom.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use leon_core::conversation::Role;

use crate::provider::{
    CompletionRequest, CompletionResponse, ProviderAdapter, ProviderError, ProviderKind,
    RequestKind, Usage,
};

/// `Role` carries no `Display`/`as_str` of its own (it serializes via serde's
/// `rename_all` instead); wire bodies here want a plain string.
fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    }
}

/// Hard per-provider request timeout (spec.md §4.7 "Timeouts": "default 30s").
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the auth header is shaped. Cloud LM APIs vary here; the router never
/// sees this, only the adapter construction site does.
#[derive(Debug, Clone)]
pub enum AuthHeader {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// A provider-specific header name, e.g. `x-api-key`.
    Named { name: String, value: String },
    /// No auth at all — the common case for a loopback local-inference server.
    None,
}

/// An HTTPS JSON completion endpoint (spec.md §6 "LM providers" row). Covers
/// `primary-cloud`, `secondary-cloud`, and `local-inference` — they differ
/// only in endpoint, auth, and the context limit the operator configures.
pub struct HttpProvider {
    kind: ProviderKind,
    client: reqwest::Client,
    endpoint: String,
    auth: AuthHeader,
    context_limit_chars: usize,
    supported_kinds: Vec<RequestKind>,
}

impl HttpProvider {
    pub fn new(
        kind: ProviderKind,
        endpoint: impl Into<String>,
        auth: AuthHeader,
        context_limit_chars: usize,
    ) -> Self {
        Self {
            kind,
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            auth,
            context_limit_chars,
            supported_kinds: vec![RequestKind::Chat, RequestKind::Quick, RequestKind::AnalyzeJson],
        }
    }

    /// Restrict this instance to a subset of request kinds, e.g. a
    /// local-inference model too small to be trusted with JSON routing
    /// verdicts.
    pub fn with_supported_kinds(mut self, kinds: Vec<RequestKind>) -> Self {
        self.supported_kinds = kinds;
        self
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            AuthHeader::Bearer(token) => builder.bearer_auth(token),
            AuthHeader::Named { name, value } => builder.header(name, value),
            AuthHeader::None => builder,
        }
    }
}

/// Wire body. Deliberately small and provider-agnostic: role/content pairs
/// plus the final prompt as a trailing user turn, matching the
/// `ConversationEntry` shape already carried around the crate. A real
/// deployment's endpoint is expected to be an adapter/shim in front of
/// whatever schema the upstream vendor actually wants; this crate's job ends
/// at producing that normalized body.
#[derive(Serialize)]
struct ChatBody<'a> {
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'static str>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    text: String,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Deserialize, Default)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[async_trait]
impl ProviderAdapter for HttpProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn context_limit_chars(&self) -> usize {
        self.context_limit_chars
    }

    fn supported(&self, kind: RequestKind) -> bool {
        self.supported_kinds.contains(&kind)
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        if !self.supported(request.kind) {
            return Err(ProviderError::Unsupported);
        }

        let mut messages = Vec::with_capacity(request.conversation.len() + 2);
        if let Some(system) = &request.system_prompt {
            messages.push(WireMessage { role: "system", content: system });
        }
        for entry in &request.conversation {
            messages.push(WireMessage { role: role_str(entry.role), content: &entry.text });
        }
        messages.push(WireMessage { role: "user", content: &request.prompt });

        let body = ChatBody {
            messages,
            response_format: matches!(request.kind, RequestKind::AnalyzeJson).then_some("json"),
        };

        let builder = self.apply_auth(self.client.post(&self.endpoint).json(&body));
        let response = builder
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status.is_server_error() {
            return Err(ProviderError::ServerError(status.as_u16()));
        }
        if !status.is_success() {
            return Err(ProviderError::MalformedRequest(format!(
                "unexpected status {}",
                status.as_u16()
            )));
        }

        let parsed: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedRequest(e.to_string()))?;

        Ok(CompletionResponse {
            text: parsed.text,
            usage: Usage {
                prompt_tokens: parsed.usage.prompt_tokens,
                completion_tokens: parsed.usage.completion_tokens,
            },
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_connect() {
        ProviderError::ConnectionFailed(err.to_string())
    } else {
        ProviderError::ConnectionFailed(err.to_string())
    }
}

/// The last resort in the default chain: a locally installed inference CLI
/// invoked as a child process, prompt on stdin, completion on stdout (spec.md
/// §4.7 "Default order": `external-cli`). No network involved, so it has no
/// `Unauthorized`/`RateLimited` failure modes — only spawn and timeout
/// failures, both reported as `ConnectionFailed` so the chain treats them as
/// retryable-then-exhausted like any other adapter.
pub struct ExternalCliProvider {
    binary: String,
    args: Vec<String>,
    context_limit_chars: usize,
    timeout: Duration,
}

impl ExternalCliProvider {
    pub fn new(binary: impl Into<String>, args: Vec<String>, context_limit_chars: usize) -> Self {
        Self {
            binary: binary.into(),
            args,
            context_limit_chars,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    fn render_prompt(request: &CompletionRequest) -> String {
        let mut out = String::new();
        if let Some(system) = &request.system_prompt {
            out.push_str(system);
            out.push_str("\n\n");
        }
        for entry in &request.conversation {
            out.push_str(&format!("{}: {}\n", role_str(entry.role), entry.text));
        }
        out.push_str(&request.prompt);
        out
    }
}

#[async_trait]
impl ProviderAdapter for ExternalCliProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ExternalCli
    }

    fn context_limit_chars(&self) -> usize {
        self.context_limit_chars
    }

    fn supported(&self, kind: RequestKind) -> bool {
        // The external CLI is a plain chat completion surface; it cannot be
        // trusted to honor a strict-JSON response format the way the cloud
        // adapters' `response_format` hint can (spec.md §4.7 "external-cli"
        // is the fallback of last resort, not a routing/classification tier).
        matches!(kind, RequestKind::Chat | RequestKind::Quick)
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        if !self.supported(request.kind) {
            return Err(ProviderError::Unsupported);
        }

        let prompt = Self::render_prompt(request);
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| ProviderError::ConnectionFailed(format!("failed to spawn {}: {e}", self.binary)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ProviderError::ConnectionFailed(e.to_string())),
            Err(_elapsed) => return Err(ProviderError::Timeout),
        };

        if !output.status.success() {
            return Err(ProviderError::ConnectionFailed(format!(
                "{} exited with {:?}",
                self.binary,
                output.status.code()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(CompletionResponse {
            text,
            usage: Usage::default(),
        })
    }
}

/// Build the spec.md §4.7 default chain from operator configuration. Any
/// endpoint left `None` is simply omitted from the chain rather than
/// constructed with a dummy value — an operator who hasn't configured a
/// secondary cloud provider gets a shorter chain, not a broken one.
pub struct ChainConfig {
    pub primary_cloud: Option<(String, AuthHeader)>,
    pub secondary_cloud: Option<(String, AuthHeader)>,
    pub local_inference: Option<String>,
    pub external_cli: Option<(String, Vec<String>)>,
}

pub fn build_default_chain(config: ChainConfig) -> Vec<std::sync::Arc<dyn ProviderAdapter>> {
    let mut providers: Vec<std::sync::Arc<dyn ProviderAdapter>> = Vec::new();

    if let Some((endpoint, auth)) = config.primary_cloud {
        providers.push(std::sync::Arc::new(HttpProvider::new(
            ProviderKind::PrimaryCloud,
            endpoint,
            auth,
            200_000,
        )));
    }
    if let Some((endpoint, auth)) = config.secondary_cloud {
        providers.push(std::sync::Arc::new(HttpProvider::new(
            ProviderKind::SecondaryCloud,
            endpoint,
            auth,
            200_000,
        )));
    }
    if let Some(endpoint) = config.local_inference {
        providers.push(std::sync::Arc::new(
            HttpProvider::new(ProviderKind::LocalInference, endpoint, AuthHeader::None, 8_000)
                .with_supported_kinds(vec![RequestKind::Chat, RequestKind::Quick]),
        ));
    }
    if let Some((binary, args)) = config.external_cli {
        providers.push(std::sync::Arc::new(ExternalCliProvider::new(binary, args, 4_000)));
    }

    providers
}

#[cfg(test)]
#[path = "providers_tests.rs"]
mod tests;

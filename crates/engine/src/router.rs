// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request router (spec.md §4.2) — the five-step classification order that
//! keeps the system cheap: literal commands, scheduler built-ins, keyword
//! pre-router, LM skill classification, LM routing verdict.

use regex::Regex;
use tracing::{debug, warn};

use leon_core::conversation::ConversationLog;
use leon_core::routing::{ClassificationOutcome, RoutingVerdict, SkillVerdict};
use leon_core::skill::{AppAllowList, DenyList, SkillToken};
use leon_core::utterance::Utterance;
use leon_llm::provider::RequestKind;
use leon_llm::{extract_json, CompletionRequest, ProviderChain};

/// The fixed set of single-token instructions dispatched without an LM call
/// (spec.md §4.2 step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralCommand {
    Status,
    Quit,
    ListAgents,
    Help,
}

impl LiteralCommand {
    fn match_text(text: &str) -> Option<Self> {
        match text.trim() {
            "status" => Some(Self::Status),
            "quit" => Some(Self::Quit),
            "/agents" => Some(Self::ListAgents),
            "/help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Terminal result of routing a single utterance (spec.md §4.2 "Output
/// contract": exactly one emission per utterance).
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Literal(LiteralCommand),
    BuiltinDispatch { token: String },
    Reply(String),
    SpawnTask { brief: String, project: Option<String> },
    SkillInvocation { skill: SkillToken, args: Vec<String> },
    SkillDenied { skill: SkillToken },
    Error(String),
}

/// An ordered list of compiled keyword patterns (spec.md §4.2 step 3: "order
/// matters; more specific patterns precede more general ones").
pub struct KeywordPreRouter {
    rules: Vec<(Regex, SkillToken)>,
    app_allow_list: AppAllowList,
}

impl KeywordPreRouter {
    pub fn new(rules: Vec<(Regex, SkillToken)>, app_allow_list: AppAllowList) -> Self {
        Self { rules, app_allow_list }
    }

    /// Try each rule in order. The `open <app>` rule is special-cased: a
    /// miss against the allow-list falls through to later steps instead of
    /// matching (spec.md §4.2 step 3: "a miss here falls through, preventing
    /// accidental URL routing").
    fn classify(&self, text: &str) -> Option<(SkillToken, Vec<String>)> {
        let lower = text.trim().to_lowercase();
        if let Some(app) = lower.strip_prefix("open ") {
            let app = app.trim();
            return if self.app_allow_list.contains(app) {
                Some((SkillToken::new("open_app"), vec![app.to_string()]))
            } else {
                None
            };
        }
        for (pattern, skill) in &self.rules {
            if pattern.is_match(&lower) {
                return Some((skill.clone(), Vec::new()));
            }
        }
        None
    }
}

/// Heuristic for step 4's gate: "short, imperative, contains a verb from a
/// small vocabulary" (spec.md §4.2 step 4).
const SYSTEM_VERB_VOCAB: &[&str] = &[
    "open", "close", "mute", "unmute", "raise", "lower", "set", "take", "play", "pause", "skip",
    "stop", "start", "turn", "toggle", "lock", "screenshot",
];

fn smells_like_system_command(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.split_whitespace().count() > 12 {
        return false;
    }
    let lower = trimmed.to_lowercase();
    SYSTEM_VERB_VOCAB.iter().any(|verb| lower.starts_with(verb))
}

/// The router (spec.md §4.2). Holds the static classification tables; the
/// LM chain is injected so failover/truncation behavior lives in one place
/// (`leon_llm::ProviderChain`).
pub struct Router {
    keyword_pre_router: KeywordPreRouter,
    deny_list: DenyList,
    chain: ProviderChain,
}

impl Router {
    pub fn new(keyword_pre_router: KeywordPreRouter, deny_list: DenyList, chain: ProviderChain) -> Self {
        Self { keyword_pre_router, deny_list, chain }
    }

    /// Classify and resolve an utterance. Never returns an `Err` — LM
    /// failures downgrade to a conservative fallback in-band (spec.md §4.2
    /// "Failure semantics": "never escalate a routing error to the caller").
    pub async fn route(&self, utterance: &Utterance, conversation: &ConversationLog) -> (RouteOutcome, ClassificationOutcome) {
        if utterance.is_builtin_dispatch() {
            let token = utterance.builtin_token().unwrap_or_default().to_string();
            return (RouteOutcome::BuiltinDispatch { token }, ClassificationOutcome::SchedulerBuiltin);
        }

        if let Some(cmd) = LiteralCommand::match_text(&utterance.text) {
            return (RouteOutcome::Literal(cmd), ClassificationOutcome::LiteralCommand);
        }

        if let Some((skill, args)) = self.keyword_pre_router.classify(&utterance.text) {
            return (RouteOutcome::SkillInvocation { skill, args }, ClassificationOutcome::KeywordPreRouter);
        }

        if smells_like_system_command(&utterance.text) {
            match self.classify_skill(&utterance.text).await {
                Some(verdict) => {
                    let token = SkillToken::new(verdict.skill);
                    let outcome = if self.deny_list.is_denied(&token) {
                        RouteOutcome::SkillDenied { skill: token }
                    } else {
                        RouteOutcome::SkillInvocation { skill: token, args: verdict.args }
                    };
                    return (outcome, ClassificationOutcome::LmSkillClassification);
                }
                None => {
                    debug!("skill classification produced no structured verdict, falling through to routing");
                }
            }
        }

        match self.classify_route(&utterance.text, conversation).await {
            Some(RoutingVerdict::Reply) | None => {
                let text = self.reply(conversation).await.unwrap_or_else(|| {
                    "I'm having trouble classifying that.".to_string()
                });
                (RouteOutcome::Reply(text), ClassificationOutcome::LmRouting)
            }
            Some(RoutingVerdict::Spawn { brief, project }) => {
                (RouteOutcome::SpawnTask { brief, project }, ClassificationOutcome::LmRouting)
            }
        }
    }

    async fn classify_skill(&self, text: &str) -> Option<SkillVerdict> {
        let prompt = format!(
            "Classify this system command into a skill invocation. Respond with strict JSON \
             {{\"skill\": string, \"args\": string[]}} and nothing else.\n\nCommand: {text}"
        );
        let request = CompletionRequest::new(RequestKind::Quick, prompt);
        let conversation = ConversationLog::new(1);
        let response = self.chain.complete(request, &conversation).await.ok()?;
        let (value, _) = extract_json(&response.text)?;
        serde_json::from_value(value).ok()
    }

    async fn classify_route(&self, text: &str, conversation: &ConversationLog) -> Option<RoutingVerdict> {
        let prompt = format!(
            "Decide whether to reply conversationally or spawn a coding agent for this message. \
             Respond with strict JSON {{\"route\": \"reply\"|\"spawn\", \"brief\": string?, \
             \"project\": string?}} and nothing else.\n\nMessage: {text}"
        );
        let request = CompletionRequest::new(RequestKind::AnalyzeJson, prompt);
        let response = self.chain.complete(request, conversation).await.ok()?;
        let (value, _) = extract_json(&response.text)?;
        serde_json::from_value(value).ok()
    }

    async fn reply(&self, conversation: &ConversationLog) -> Option<String> {
        let request = CompletionRequest::new(RequestKind::Chat, "Continue the conversation.");
        match self.chain.complete(request, conversation).await {
            Ok(response) => Some(response.text),
            Err(err) => {
                warn!(error = %err, "reply generation failed, falling back to generic apology");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;

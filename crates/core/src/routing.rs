// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routing verdicts — the tagged sum type the LM provider chain must
//! resolve a raw completion into (spec.md §9 "Patterns requiring
//! re-architecture": replaces schemaless JSON-ish text with a typed enum).

use serde::{Deserialize, Serialize};

/// The strict JSON verdict requested in spec.md §4.2 step 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum RoutingVerdict {
    Reply,
    Spawn {
        brief: String,
        #[serde(default)]
        project: Option<String>,
    },
}

/// The strict JSON verdict requested in spec.md §4.2 step 4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillVerdict {
    pub skill: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Which classification step ultimately handled an utterance — purely for
/// structured logging/metrics (spec.md SPEC_FULL expansion), never changes
/// routing semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationOutcome {
    LiteralCommand,
    SchedulerBuiltin,
    KeywordPreRouter,
    LmSkillClassification,
    LmRouting,
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Skill tokens and the deny-list gate (spec.md §4.2 step 4, §4.9).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A skill identifier, e.g. `"take_screenshot"`, `"shell_exec"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillToken(pub String);

impl SkillToken {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SkillToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed gate for dangerous skills, rather than a bare `Vec<String>` passed
/// around by convention (spec.md SPEC_FULL expansion of §4.2 step 4).
#[derive(Debug, Clone, Default)]
pub struct DenyList {
    denied: HashSet<SkillToken>,
}

impl DenyList {
    pub fn new(denied: impl IntoIterator<Item = SkillToken>) -> Self {
        Self {
            denied: denied.into_iter().collect(),
        }
    }

    pub fn is_denied(&self, skill: &SkillToken) -> bool {
        self.denied.contains(skill)
    }
}

/// Explicit allow-list of desktop-app tokens the "open <X>" keyword pattern
/// consults (spec.md §4.2 step 3). A miss falls through to step 5 rather
/// than being treated as a URL.
#[derive(Debug, Clone, Default)]
pub struct AppAllowList {
    allowed: HashSet<String>,
}

impl AppAllowList {
    pub fn new(allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed: allowed.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    pub fn contains(&self, app: &str) -> bool {
        self.allowed.contains(&app.to_lowercase())
    }
}

#[cfg(test)]
#[path = "skill_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owner profile — facts learned about the user.
//!
//! spec.md §9 REDESIGN FLAGS calls out the source's "mapping of mapping of
//! Any" as needing re-architecture: replace free-typed nesting with an
//! explicit schema of category enums, falling back to a `misc` bucket for
//! facts that don't fit a known category yet (rather than inventing new
//! typed fields ad hoc).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Known categories of owner facts. Add a variant here (not a new HashMap
/// key) when a category proves durable; `Misc` is the landing zone for
/// everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Identity,
    Preferences,
    Schedule,
    Projects,
    Misc,
}

impl Category {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "identity" => Category::Identity,
            "preferences" => Category::Preferences,
            "schedule" => Category::Schedule,
            "projects" => Category::Projects,
            _ => Category::Misc,
        }
    }
}

/// Facts learned about the owner, grouped by category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerProfile {
    #[serde(default)]
    entries: HashMap<Category, HashMap<String, String>>,
}

impl OwnerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: Category, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(category)
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn get(&self, category: Category, key: &str) -> Option<&str> {
        self.entries
            .get(&category)
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    pub fn category(&self, category: Category) -> Option<&HashMap<String, String>> {
        self.entries.get(&category)
    }

    /// A query-specific projection used by `get_relevant_context` (spec.md
    /// §4.8): every key/value whose key contains `query` as a substring,
    /// across all categories.
    pub fn matching(&self, query: &str) -> Vec<(Category, String, String)> {
        let needle = query.to_lowercase();
        let mut out = Vec::new();
        for (category, map) in &self.entries {
            for (k, v) in map {
                if k.to_lowercase().contains(&needle) {
                    out.push((*category, k.clone(), v.clone()));
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;

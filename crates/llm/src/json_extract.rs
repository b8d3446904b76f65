// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The JSON-extraction subroutine (spec.md §4.7 "JSON extraction") — the
//! critical path for turning a raw LM completion into a routing or skill
//! verdict. Tries, in order, whole-string parse, fenced-block parse,
//! balanced-substring scan, then a trailing-comma fix retrying all three.

use regex::Regex;
use serde_json::Value;

/// What produced a successful parse, surfaced for structured logging so an
/// operator can see how often raw completions need rescuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    WholeString,
    FencedBlock,
    BalancedSubstring,
    TrailingCommaFix,
}

/// Extract a JSON value from a raw completion string. Returns the parsed
/// value and which strategy rescued it, or `None` if every strategy failed
/// — callers translate a `None` into the "unstructured" fallback verdict
/// (spec.md §4.7: "translate into a conservative fallback").
pub fn extract_json(raw: &str) -> Option<(Value, ExtractionStrategy)> {
    if let Some((value, strategy)) = try_strategies(raw) {
        return Some((value, strategy));
    }
    let fixed = fix_trailing_commas(raw);
    if fixed != raw {
        if let Some((value, _)) = try_strategies(&fixed) {
            return Some((value, ExtractionStrategy::TrailingCommaFix));
        }
    }
    None
}

fn try_strategies(raw: &str) -> Option<(Value, ExtractionStrategy)> {
    if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
        return Some((value, ExtractionStrategy::WholeString));
    }
    if let Some(body) = extract_fenced_block(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(&body) {
            return Some((value, ExtractionStrategy::FencedBlock));
        }
    }
    if let Some(candidate) = scan_balanced_substring(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            return Some((value, ExtractionStrategy::BalancedSubstring));
        }
    }
    None
}

fn fence_regex() -> Regex {
    Regex::new(r"```json\s*\n?(?P<body>[\s\S]*?)```").expect("static fence regex is valid")
}

fn extract_fenced_block(raw: &str) -> Option<String> {
    fence_regex()
        .captures(raw)
        .and_then(|caps| caps.name("body"))
        .map(|m| m.as_str().trim().to_string())
}

/// Scan for the first balanced `{...}` or `[...]` substring, respecting
/// string literals (so a brace inside a quoted string doesn't throw off the
/// depth count).
fn scan_balanced_substring(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let start = raw.find(['{', '['])?;
    let opening = bytes[start] as char;
    let closing = if opening == '{' { '}' } else { ']' };

    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            c if c == opening => depth += 1,
            c if c == closing => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(raw[start..end].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip a trailing comma that appears immediately before `}` or `]`
/// (a common LM malformation), so a subsequent parse attempt can succeed.
fn fix_trailing_commas(raw: &str) -> String {
    let trailing_comma = Regex::new(r",\s*([}\]])").expect("static trailing-comma regex is valid");
    trailing_comma.replace_all(raw, "$1").into_owned()
}

#[cfg(test)]
#[path = "json_extract_tests.rs"]
mod tests;

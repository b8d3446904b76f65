// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for sectioned help output and colorization.

#![allow(clippy::unwrap_used)]

use super::*;
use crate::Commands;

fn header(text: &str) -> String {
    format!("\x1b[38;5;{}m{}\x1b[0m", crate::color::codes::HEADER, text)
}

fn literal(text: &str) -> String {
    format!("\x1b[38;5;{}m{}\x1b[0m", crate::color::codes::LITERAL, text)
}

fn context(text: &str) -> String {
    format!("\x1b[38;5;{}m{}\x1b[0m", crate::color::codes::CONTEXT, text)
}

// ============================================================================
// Exhaustiveness Tests
// ============================================================================

/// Every subcommand registered in clap must appear in the help sections.
#[test]
fn all_subcommands_in_help() {
    let cmd = crate::cli_command();
    let help_text = commands();
    for sub in cmd.get_subcommands() {
        let name = sub.get_name();
        if name == "help" {
            continue; // clap auto-generated
        }
        let pattern = format!("  {}", name);
        assert!(
            help_text.contains(&pattern),
            "Command '{name}' missing from help sections — add it to help::commands()"
        );
    }
}

/// Compile-time exhaustive match on `Commands` enum.
/// Adding a new variant causes a compile error here, forcing the developer
/// to assign it to a section.
#[test]
fn all_commands_assigned_to_section() {
    fn _section(cmd: &Commands) -> &'static str {
        match cmd {
            Commands::Say(_) => "Actions",
            Commands::Status(_) => "Actions",
            Commands::Agent(_) => "Resources",
            Commands::Job(_) => "Resources",
            Commands::Queue(_) => "Resources",
            Commands::Daemon(_) => "System",
        }
    }
}

// ============================================================================
// Plain Text Tests
// ============================================================================

#[test]
fn commands_returns_plain_text() {
    let result = commands();
    assert!(
        !result.contains("\x1b["),
        "commands() should not contain ANSI codes"
    );
}

#[test]
fn template_returns_plain_text() {
    let result = template();
    assert!(
        !result.contains("\x1b["),
        "template() should not contain ANSI codes"
    );
}

#[test]
fn after_help_returns_plain_text() {
    let result = after_help();
    assert!(
        !result.contains("\x1b["),
        "after_help() should not contain ANSI codes"
    );
}

// ============================================================================
// Section Content Tests
// ============================================================================

#[test]
fn commands_has_actions_section() {
    let result = commands();
    assert!(result.contains("Actions:"), "Should have Actions section");
    assert!(result.contains("  say "), "Actions should contain say");
    assert!(
        result.contains("  status "),
        "Actions should contain status"
    );
}

#[test]
fn commands_has_resources_section() {
    let result = commands();
    assert!(
        result.contains("Resources:"),
        "Should have Resources section"
    );
    assert!(result.contains("  job "), "Resources should contain job");
    assert!(
        result.contains("  agent "),
        "Resources should contain agent"
    );
    assert!(
        result.contains("  queue "),
        "Resources should contain queue"
    );
}

#[test]
fn commands_has_system_section() {
    let result = commands();
    assert!(result.contains("System:"), "Should have System section");
    assert!(result.contains("  daemon "), "System should contain daemon");
}

// ============================================================================
// Colorization Tests
// ============================================================================

#[test]
fn colorize_help_applies_header_color() {
    let result = colorize_help("Actions:");
    assert!(
        result.contains(&header("Actions:")),
        "Section header should be HEADER colored in:\n{}",
        result
    );
}

#[test]
fn colorize_help_applies_usage_color() {
    let result = colorize_help("Usage: leon [OPTIONS] [COMMAND]");
    assert!(
        result.contains(&header("Usage:")),
        "Usage: should be HEADER colored in:\n{}",
        result
    );
}

#[test]
fn colorize_help_applies_literal_to_commands() {
    let result = colorize_help("  say         Submit an utterance to the router");
    assert!(
        result.contains(&literal("say")),
        "Command name should be LITERAL colored in:\n{}",
        result
    );
}

#[test]
fn colorize_help_applies_literal_to_option_flags() {
    let result = colorize_help("  -o, --output <OUTPUT>    Output format [default: text]");
    assert!(
        result.contains(&literal("-o")),
        "Short flag should be LITERAL colored in:\n{}",
        result
    );
    assert!(
        result.contains(&literal("--output")),
        "Long flag should be LITERAL colored in:\n{}",
        result
    );
}

#[test]
fn colorize_help_applies_context_to_placeholders() {
    let result = colorize_help("  -o, --output <OUTPUT>    Output format");
    assert!(
        result.contains(&context("<OUTPUT>")),
        "Placeholder should be CONTEXT colored in:\n{}",
        result
    );
}

#[test]
fn colorize_help_applies_context_to_defaults() {
    let result = colorize_help(
        "  -o, --output <OUTPUT>    Output format [default: text] [possible values: text, json]",
    );
    assert!(
        result.contains(&context("[default: text]")),
        "[default: text] should be CONTEXT colored in:\n{}",
        result
    );
    assert!(
        result.contains(&context("[possible values: text, json]")),
        "[possible values: ...] should be CONTEXT colored in:\n{}",
        result
    );
}

#[test]
fn colorize_help_skips_existing_ansi() {
    let input = "\x1b[38;5;74mAlready Colored\x1b[0m";
    let result = colorize_help(input);
    assert_eq!(result, input, "Existing ANSI codes should be preserved");
}

#[test]
fn colorize_help_handles_mixed_content() {
    let input = "\
Actions:
  say         Submit an utterance to the router
  status      Show overview

Options:
  -o, --output <OUTPUT>    Output format [default: text]";

    let result = colorize_help(input);

    assert!(
        result.contains(&header("Actions:")),
        "Actions header should be colored"
    );
    assert!(
        result.contains(&header("Options:")),
        "Options header should be colored"
    );
    assert!(
        result.contains(&literal("say")),
        "say command should be colored"
    );
    assert!(
        result.contains(&literal("--output")),
        "--output flag should be colored"
    );
}

// ============================================================================
// Format Help Tests
// ============================================================================

#[test]
fn format_help_produces_output() {
    let help = format_help(crate::cli_command());
    assert!(!help.is_empty(), "format_help should produce output");
    assert!(
        help.contains("Actions:") || help.contains(&header("Actions:")),
        "Help should contain Actions section"
    );
}

#[test]
fn format_help_ends_with_newline() {
    let help = format_help(crate::cli_command());
    assert!(help.ends_with('\n'), "Help should end with newline");
}

// ============================================================================
// Subcommand Help Tests
// ============================================================================

/// Subcommand help must go through format_help (which forces Styles::plain()
/// before write_help, then applies colorize_help) rather than using clap's
/// default styled output. This test catches the bug where cloned subcommands
/// lost the parent's Styles::plain() and fell back to clap's default colored
/// styles.
#[test]
fn subcommand_help_uses_plain_base() {
    let cmd = crate::cli_command();
    let agent = crate::find_subcommand(cmd, &["agent", "list"]);
    let mut plain = agent.styles(styles());
    let mut buf = Vec::new();
    plain.write_help(&mut buf).unwrap();
    let raw = String::from_utf8(buf).unwrap();
    assert!(
        !raw.contains("\x1b["),
        "Plain-styled write_help should not contain ANSI codes:\n{}",
        raw
    );
}

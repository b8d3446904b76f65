// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::error::ErrorKind;

use super::cli_command;

// -- Version flag -----------------------------------------------------------

#[test]
fn version_short_lowercase_v() {
    let err = cli_command()
        .try_get_matches_from(["leon", "-v"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn version_short_uppercase_v() {
    let err = cli_command()
        .try_get_matches_from(["leon", "-V"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn version_long() {
    let err = cli_command()
        .try_get_matches_from(["leon", "--version"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn version_uppercase_v_hidden_in_help() {
    let mut buf = Vec::new();
    cli_command().write_help(&mut buf).unwrap();
    let help = String::from_utf8(buf).unwrap();
    assert!(
        help.contains("-v, --version"),
        "help should show -v, --version"
    );
    assert!(
        !help.contains("-V,"),
        "help should not show -V as a visible flag"
    );
}

// -- No subcommand ------------------------------------------------------------

#[test]
fn no_subcommand_is_not_an_error() {
    let matches = cli_command().try_get_matches_from(["leon"]).unwrap();
    assert!(matches.subcommand_name().is_none());
}

// -- Unknown subcommand -------------------------------------------------------

#[test]
fn unknown_subcommand_is_rejected() {
    let err = cli_command()
        .try_get_matches_from(["leon", "bogus"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
}

// -- say subcommand -----------------------------------------------------------

#[test]
fn say_subcommand_parses() {
    let matches = cli_command()
        .try_get_matches_from(["leon", "say", "hello", "there"])
        .unwrap();
    assert_eq!(matches.subcommand_name(), Some("say"));
}

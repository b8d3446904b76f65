// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::error::ErrorKind;
use clap::FromArgMatches;

#[test]
fn agent_list_parses() {
    let matches = crate::cli_command()
        .try_get_matches_from(["leon", "agent", "list"])
        .unwrap();
    let cli = crate::Cli::from_arg_matches(&matches).unwrap();
    assert!(matches!(
        cli.command,
        Some(crate::Commands::Agent(ref args))
            if matches!(args.command, super::AgentCommand::List)
    ));
}

#[test]
fn agent_show_requires_id() {
    let err = crate::cli_command()
        .try_get_matches_from(["leon", "agent", "show"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn agent_show_parses_id() {
    let matches = crate::cli_command()
        .try_get_matches_from(["leon", "agent", "show", "agent-1"])
        .unwrap();
    let cli = crate::Cli::from_arg_matches(&matches).unwrap();
    match cli.command {
        Some(crate::Commands::Agent(args)) => match args.command {
            super::AgentCommand::Show { id } => assert_eq!(id, "agent-1"),
            _ => panic!("expected Show"),
        },
        _ => panic!("expected Agent command"),
    }
}

#[test]
fn agent_requires_subcommand() {
    let err = crate::cli_command()
        .try_get_matches_from(["leon", "agent"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingSubcommand);
}

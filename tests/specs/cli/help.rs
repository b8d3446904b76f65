//! Help output specs.

use crate::prelude::*;

#[test]
fn no_args_shows_command_groups() {
    cli()
        .run()
        .stdout_has("Actions:")
        .stdout_has("say")
        .stdout_has("Resources:")
        .stdout_has("queue")
        .stdout_has("System:")
        .stdout_has("daemon");
}

#[test]
fn help_flag_shows_command_groups() {
    cli().args(&["--help"]).run().stdout_has("Actions:").stdout_has("System:");
}

#[test]
fn daemon_help_lists_subcommands() {
    cli()
        .args(&["daemon", "--help"])
        .run()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status")
        .stdout_has("logs");
}

#[test]
fn version_flag_prints_something() {
    cli().args(&["--version"]).run().stdout_has(env!("CARGO_PKG_VERSION"));
}

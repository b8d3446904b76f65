// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `leon say` - submit an utterance to the router, as if typed at the CLI.

use anyhow::{anyhow, Result};
use clap::Args;

use leon_core::utterance::Source;
use leon_daemon::protocol::UtteranceOutcome;

use crate::client::DaemonClient;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct SayArgs {
    /// The text to route, e.g. `leon say "what's on my calendar today"`
    #[arg(trailing_var_arg = true, required = true)]
    pub words: Vec<String>,
}

pub async fn handle(args: SayArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let text = args.words.join(" ");
    let outcome = client
        .utterance(Source::Cli, &text, None)
        .await
        .map_err(|e| anyhow!("{}", e))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Text => print_outcome(&outcome),
    }

    Ok(())
}

fn print_outcome(outcome: &UtteranceOutcome) {
    match outcome {
        UtteranceOutcome::Reply { text } => println!("{}", text),
        UtteranceOutcome::TaskEnqueued { task_id } => {
            println!("Task enqueued: {}", task_id);
        }
        UtteranceOutcome::SkillResult { skill, text } => {
            println!("[{}] {}", skill, text);
        }
        UtteranceOutcome::SkillDenied { skill } => {
            println!("Denied: {} is not on the allow-list", skill);
        }
        UtteranceOutcome::Error { message } => {
            println!("Error: {}", message);
        }
    }
}

#[cfg(test)]
#[path = "say_tests.rs"]
mod tests;

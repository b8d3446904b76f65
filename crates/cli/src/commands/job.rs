// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `leon job` - Scheduled job commands

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// List scheduled jobs
    List,
    /// Run a scheduled job immediately, outside its cadence
    Run {
        /// Job name
        name: String,
    },
}

pub async fn handle(command: JobCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        JobCommand::List => list(client, format).await,
        JobCommand::Run { name } => run(client, &name).await,
    }
}

async fn list(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let jobs = client.jobs().await.map_err(|e| anyhow!("{}", e))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        OutputFormat::Text => {
            if jobs.is_empty() {
                println!("No scheduled jobs");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::left("NAME"),
                Column::left("CADENCE"),
                Column::right("NEXT_RUN_MS"),
                Column::right("FAILURES"),
                Column::status("ALERTING"),
                Column::left("LAST_RESULT"),
            ]);
            for j in &jobs {
                table.row(vec![
                    j.name.clone(),
                    j.cadence.clone(),
                    j.next_run_at_ms.to_string(),
                    j.consecutive_failures.to_string(),
                    if j.alerting { "yes".into() } else { "no".into() },
                    j.last_result.clone().unwrap_or_else(|| "-".into()),
                ]);
            }
            table.render(&mut std::io::stdout());
        }
    }

    Ok(())
}

async fn run(client: &DaemonClient, name: &str) -> Result<()> {
    client
        .run_job_now(name)
        .await
        .map_err(|e| anyhow!("{}", e))?;
    println!("Ran job: {}", name);
    Ok(())
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

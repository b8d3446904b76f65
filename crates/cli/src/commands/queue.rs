// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `leon queue` - Task queue inspection commands

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand, ValueEnum};

use leon_daemon::protocol::TaskFilter;

use crate::client::DaemonClient;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommand,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FilterArg {
    Queued,
    InFlight,
    Completed,
    Failed,
    All,
}

impl From<FilterArg> for TaskFilter {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::Queued => TaskFilter::Queued,
            FilterArg::InFlight => TaskFilter::InFlight,
            FilterArg::Completed => TaskFilter::Completed,
            FilterArg::Failed => TaskFilter::Failed,
            FilterArg::All => TaskFilter::All,
        }
    }
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// List tasks in the queue
    List {
        /// Which subset of tasks to show
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterArg,
    },
    /// Force a failed task back to queued, ahead of its natural retry
    Retry {
        /// Task ID
        id: String,
    },
}

pub async fn handle(command: QueueCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        QueueCommand::List { filter } => list(client, filter.into(), format).await,
        QueueCommand::Retry { id } => retry(client, &id).await,
    }
}

async fn list(client: &DaemonClient, filter: TaskFilter, format: OutputFormat) -> Result<()> {
    let tasks = client.tasks(filter).await.map_err(|e| anyhow!("{}", e))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        OutputFormat::Text => {
            if tasks.is_empty() {
                println!("No tasks");
                return Ok(());
            }

            let mut table = Table::new(vec![
                Column::muted("ID"),
                Column::left("KIND"),
                Column::left("BRIEF"),
                Column::status("STATUS"),
                Column::right("ATTEMPTS"),
                Column::left("AGENT"),
            ]);
            for t in &tasks {
                table.row(vec![
                    t.id.to_string(),
                    t.kind.clone(),
                    t.brief.clone(),
                    t.status.clone(),
                    format!("{}/{}", t.attempts, t.max_attempts),
                    t.assigned_agent_id
                        .as_ref()
                        .map(|a| a.to_string())
                        .unwrap_or_else(|| "-".into()),
                ]);
            }
            table.render(&mut std::io::stdout());
        }
    }

    Ok(())
}

async fn retry(client: &DaemonClient, id: &str) -> Result<()> {
    let task_id = leon_core::TaskId::from(id);
    client
        .retry_task(task_id)
        .await
        .map_err(|e| anyhow!("{}", e))?;
    println!("Retrying task {}", id);
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent supervisor inspection commands.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub command: AgentCommand,
}

#[derive(Subcommand)]
pub enum AgentCommand {
    /// List agents known to the supervisor
    List,
    /// Show details for a single agent
    Show {
        /// Agent ID
        id: String,
    },
}

pub async fn handle(
    command: AgentCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        AgentCommand::List => list(client, format).await,
        AgentCommand::Show { id } => show(client, &id, format).await,
    }
}

async fn list(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let agents = client.agents().await.map_err(|e| anyhow!("{}", e))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&agents)?);
        }
        OutputFormat::Text => {
            if agents.is_empty() {
                println!("No agents found");
                return Ok(());
            }

            let columns = vec![
                Column::left("AGENT"),
                Column::left("TASK"),
                Column::status("STATE"),
                Column::right("PID"),
                Column::left("PROJECT"),
            ];
            let mut table = Table::new(columns);
            for a in &agents {
                table.row(vec![
                    a.id.to_string(),
                    a.task_id.to_string(),
                    a.state.clone(),
                    a.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
                    a.project_path.clone(),
                ]);
            }
            table.render(&mut std::io::stdout());
        }
    }

    Ok(())
}

async fn show(client: &DaemonClient, id: &str, format: OutputFormat) -> Result<()> {
    let agent_id = leon_core::AgentId::from(id);
    let agent = client
        .agent_detail(agent_id)
        .await
        .map_err(|e| anyhow!("{}", e))?;

    match agent {
        None => {
            return Err(anyhow!("Agent not found: {}", id));
        }
        Some(agent) => match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&agent)?);
            }
            OutputFormat::Text => {
                println!("Agent: {}", agent.id);
                println!("Task: {}", agent.task_id);
                println!("State: {}", agent.state);
                println!("PID: {}", agent.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".into()));
                println!("Project: {}", agent.project_path);
                println!("Started: {}ms", agent.started_at_ms);
                if let Some(code) = agent.exit_code {
                    println!("Exit code: {}", code);
                }
                if let Some(summary) = &agent.summary {
                    println!("Summary: {}", summary);
                }
                if let Some(error) = &agent.error {
                    println!("Error: {}", error);
                }
            }
        },
    }

    Ok(())
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;

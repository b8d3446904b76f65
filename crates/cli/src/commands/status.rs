// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `leon status` — single-glance overview of the daemon.

use std::io::IsTerminal;

use anyhow::Result;

use leon_daemon::protocol::StatusSummary;

use crate::client::{ClientError, DaemonClient};
use crate::color;
use crate::output::OutputFormat;

/// ANSI sequence: move cursor to top-left (home position).
/// Used instead of \x1B[2J (clear screen) to avoid pushing old content
/// into terminal scrollback.
const CURSOR_HOME: &str = "\x1B[H";

/// ANSI sequence: clear from cursor position to end of screen.
const CLEAR_TO_END: &str = "\x1B[J";

/// ANSI sequence: clear from cursor position to end of line.
const CLEAR_TO_EOL: &str = "\x1B[K";

#[derive(clap::Args)]
pub struct StatusArgs {
    /// Re-run status display in a loop (Ctrl+C to exit)
    #[arg(long)]
    pub watch: bool,

    /// Refresh interval for --watch mode (e.g. 2s, 10s)
    #[arg(long, default_value = "5s")]
    pub interval: String,
}

pub async fn handle(args: StatusArgs, format: OutputFormat) -> Result<()> {
    if !args.watch {
        return render_once(format, None).await;
    }

    let interval = parse_duration(&args.interval)?;
    if interval.is_zero() {
        anyhow::bail!("duration must be > 0");
    }

    let is_tty = std::io::stdout().is_terminal();

    loop {
        render_watch_frame(format, &args.interval, is_tty).await?;
        {
            use std::io::Write as _;
            std::io::stdout().flush()?;
        }
        tokio::time::sleep(interval).await;
    }
}

async fn fetch() -> Result<Option<(StatusSummary, String)>> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(_) => return Ok(None),
    };

    match client.status().await {
        Ok(status) => {
            let version = client
                .hello()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Ok(Some((status, version)))
        }
        Err(ClientError::DaemonNotRunning) => Ok(None),
        Err(ClientError::Io(ref e))
            if matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::NotFound
            ) =>
        {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_once(format: OutputFormat, watch_interval: Option<&str>) -> Result<()> {
    match fetch().await? {
        None => print_not_running(format),
        Some((status, version)) => {
            match format {
                OutputFormat::Text => print!("{}", format_text(&status, &version, watch_interval)),
                OutputFormat::Json => println!("{}", to_json(&status, &version)?),
            }
            Ok(())
        }
    }
}

async fn render_watch_frame(format: OutputFormat, interval: &str, is_tty: bool) -> Result<()> {
    let content = match fetch().await? {
        None => format_not_running(format),
        Some((status, version)) => match format {
            OutputFormat::Text => format_text(&status, &version, Some(interval)),
            OutputFormat::Json => format!("{}\n", to_json(&status, &version)?),
        },
    };
    print!("{}", render_frame(&content, is_tty));
    Ok(())
}

/// Build one watch-mode frame.
///
/// When `is_tty` is true the frame is wrapped with ANSI cursor-home before
/// and clear-to-end after, so the terminal redraws in place without
/// polluting scrollback. When false the content is returned as-is
/// (suitable for piped / redirected output).
fn render_frame(content: &str, is_tty: bool) -> String {
    if is_tty {
        let cleared = content.replace('\n', &format!("{CLEAR_TO_EOL}\n"));
        format!("{CURSOR_HOME}{cleared}{CLEAR_TO_END}")
    } else {
        content.to_string()
    }
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    print!("{}", format_not_running(format));
    Ok(())
}

fn format_not_running(format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{} not running\n", color::header("leon daemon:")),
        OutputFormat::Json => r#"{ "status": "not_running" }"#.to_string() + "\n",
    }
}

fn to_json(status: &StatusSummary, version: &str) -> Result<String> {
    let obj = serde_json::json!({
        "status": "running",
        "version": version,
        "uptime_secs": status.uptime_secs,
        "conversation_len": status.conversation_len,
        "queued": status.queued,
        "in_flight": status.in_flight,
        "completed": status.completed,
        "failed": status.failed,
        "running_agents": status.running_agents,
        "max_concurrent": status.max_concurrent,
        "night_gate_open": status.night_gate_open,
        "scheduler_jobs": status.scheduler_jobs,
        "scheduler_alerting": status.scheduler_alerting,
        "memory_dirty": status.memory_dirty,
    });
    Ok(serde_json::to_string_pretty(&obj)?)
}

fn format_text(status: &StatusSummary, version: &str, watch_interval: Option<&str>) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let _ = write!(
        out,
        "{} {} {} | {}",
        color::header("leon daemon:"),
        color::status("running"),
        format_uptime(status.uptime_secs),
        version
    );
    if let Some(interval) = watch_interval {
        let _ = write!(out, " | every {}", interval);
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "Agents:    {} running (max {})",
        status.running_agents, status.max_concurrent
    );
    let _ = writeln!(
        out,
        "Tasks:     {} queued, {} in flight, {} completed, {} failed",
        status.queued, status.in_flight, status.completed, status.failed
    );
    let _ = writeln!(
        out,
        "Night:     gate {}",
        if status.night_gate_open { "open" } else { "closed" }
    );
    let _ = writeln!(
        out,
        "Scheduler: {} jobs ({} alerting)",
        status.scheduler_jobs, status.scheduler_alerting
    );
    let _ = writeln!(out, "Memory:    {} conversation entries", status.conversation_len);

    if status.memory_dirty {
        let _ = writeln!(out, "\n\u{26a0} memory store has unsaved changes");
    }

    out
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Parse a duration string like `5s`, `2m`, `1h` into a `Duration`.
fn parse_duration(s: &str) -> Result<std::time::Duration> {
    let s = s.trim();
    let (number, unit) = s.split_at(s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len()));
    let n: u64 = number
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid duration: {}", s))?;
    let secs = match unit {
        "" | "s" => n,
        "m" => n * 60,
        "h" => n * 3600,
        other => anyhow::bail!("unknown duration unit: {}", other),
    };
    Ok(std::time::Duration::from_secs(secs))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

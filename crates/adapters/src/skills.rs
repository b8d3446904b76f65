// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Skill invocation surface (spec.md §4.9) — synchronous, short-lived
//! operations dispatched by [`leon_engine::router::RouteOutcome::SkillInvocation`].
//!
//! `shell_exec` and `python_exec` have explicit contracts in spec.md; every
//! other skill token (`open_app`, system/media controls) is a thin wrapper
//! around an operator-configured external command, since their concrete
//! implementations live outside this crate's scope (spec.md §1 Non-goals).

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use crate::subprocess::{run_with_timeout, PYTHON_EXEC_TIMEOUT, SHELL_EXEC_TIMEOUT};

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("empty command")]
    Empty,
    #[error("unterminated quote in command")]
    UnterminatedQuote,
    #[error("command contains a disallowed shell metacharacter: {0:?}")]
    Metacharacter(String),
    #[error("{0} is not on the shell_exec allow-list")]
    NotAllowed(String),
    #[error("python source references a disallowed identifier: {0}")]
    DeniedIdentifier(String),
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// Rejected outright rather than neutered (spec.md §4.9): any of these
/// substrings anywhere in the raw command line fails the skill before
/// tokenization even runs.
const SHELL_METACHARACTER_BLOCKLIST: &[&str] = &[
    ";", "|", "$(", "`", "&&", "||", ">>", "<<", "<(", ">", "<", "\0", "\n",
];

/// Quote-aware splitter with no shell grammar (spec.md §9 "Skills": a
/// deliberate non-adoption of the teacher's full POSIX shell AST — this
/// tokenizes a flat command line, it never interprets shell syntax).
pub fn tokenize_shell_command(line: &str) -> Result<Vec<String>, SkillError> {
    for pattern in SHELL_METACHARACTER_BLOCKLIST {
        if line.contains(pattern) {
            return Err(SkillError::Metacharacter((*pattern).to_string()));
        }
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(SkillError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    if tokens.is_empty() {
        return Err(SkillError::Empty);
    }
    Ok(tokens)
}

/// Tokenize and execute `command_line` with no shell interpretation
/// (spec.md §4.9). `allowed_commands` is the operator's allow-list; empty
/// means unrestricted (the CLI's default deny posture lives one layer up,
/// in the router's `DenyList`).
pub async fn shell_exec(command_line: &str, allowed_commands: &[String]) -> Result<String, SkillError> {
    let tokens = tokenize_shell_command(command_line)?;
    let program = &tokens[0];
    if !allowed_commands.is_empty() && !allowed_commands.iter().any(|c| c == program) {
        return Err(SkillError::NotAllowed(program.clone()));
    }

    let mut cmd = Command::new(program);
    cmd.args(&tokens[1..]);
    let output = run_with_timeout(cmd, SHELL_EXEC_TIMEOUT, "shell_exec")
        .await
        .map_err(SkillError::ExecutionFailed)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Identifiers that fail `python_exec` outright (spec.md §4.9): anything
/// that could reach the filesystem, network, or shell from inside the
/// restricted child.
const PYTHON_DENYLIST: &[&str] = &[
    "subprocess",
    "shutil",
    "ctypes",
    "socket",
    "os.system",
    "os.environ",
    "__import__",
    "eval",
    "exec",
    "compile",
    "open",
    "globals",
];

pub fn check_python_source(source: &str) -> Result<(), SkillError> {
    for ident in PYTHON_DENYLIST {
        if source.contains(ident) {
            return Err(SkillError::DeniedIdentifier((*ident).to_string()));
        }
    }
    Ok(())
}

/// Run `source` in a restricted child (spec.md §4.9): pruned environment
/// (`PATH`/`HOME`/`LANG` only), cwd pinned to a scratch directory, source
/// rejected first against [`PYTHON_DENYLIST`].
pub async fn python_exec(source: &str, scratch_dir: &Path) -> Result<String, SkillError> {
    check_python_source(source)?;

    let mut cmd = Command::new("python3");
    cmd.arg("-c").arg(source);
    cmd.current_dir(scratch_dir);
    cmd.env_clear();
    for key in ["PATH", "HOME", "LANG"] {
        if let Ok(val) = std::env::var(key) {
            cmd.env(key, val);
        }
    }

    let output = run_with_timeout(cmd, PYTHON_EXEC_TIMEOUT, "python_exec")
        .await
        .map_err(SkillError::ExecutionFailed)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Default timeout for `open_app` and other one-shot external launchers.
pub const LAUNCHER_TIMEOUT: Duration = Duration::from_secs(10);

/// Launch a desktop application by name via an operator-configured
/// launcher command (e.g. `xdg-open`, `open`). The allow-list gating
/// `open <app>` resolves to happens one layer up in
/// `leon_engine::router::KeywordPreRouter`; by the time a call reaches
/// here the app name has already been validated.
pub async fn open_app(app: &str, launcher_cmd: &str) -> Result<(), SkillError> {
    let mut cmd = Command::new(launcher_cmd);
    cmd.arg(app);
    run_with_timeout(cmd, LAUNCHER_TIMEOUT, "open_app")
        .await
        .map(|_| ())
        .map_err(SkillError::ExecutionFailed)
}

/// Run an operator-configured command template for a system/media-control
/// skill token (volume, playback, lock screen, …). The mapping from token
/// to concrete command lives in daemon configuration, not here — this
/// function only knows how to run one.
pub async fn system_control(program: &str, args: &[String]) -> Result<(), SkillError> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    run_with_timeout(cmd, LAUNCHER_TIMEOUT, "system_control")
        .await
        .map(|_| ())
        .map_err(SkillError::ExecutionFailed)
}

#[cfg(test)]
#[path = "skills_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate (spec.md §6
//! "Environment variables consumed").

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve the persistence root: `LEON_STATE_DIR` > `XDG_STATE_HOME/leon` >
/// `~/.local/state/leon` (spec.md §6 "Filesystem (persistence)": "single
/// directory root").
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("LEON_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("leon"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/leon"))
}

/// Timer check interval override (how often the main loop polls the
/// scheduler/supervisor/night-mode tick points).
pub fn timer_check_ms() -> Option<Duration> {
    std::env::var("LEON_TIMER_CHECK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Opt-in flag enabling the permissive coding-assistant CLI posture (spec.md
/// §6: "an opt-in flag `LEON_ALLOW_UNSAFE_CLI=1`").
pub fn allow_unsafe_cli() -> bool {
    std::env::var("LEON_ALLOW_UNSAFE_CLI").as_deref() == Ok("1")
}

/// Bearer token the dashboard WebSocket listener requires on its `auth`
/// frame (spec.md §6 "Dashboard": "bearer-token auth").
pub fn dashboard_auth_token() -> Option<String> {
    std::env::var("LEON_DASHBOARD_TOKEN").ok()
}

/// Path (or bare name, resolved on `$PATH`) of the coding-assistant CLI
/// binary the supervisor spawns (spec.md §6 "Coding-assistant CLI").
pub fn coding_cli_path() -> String {
    std::env::var("LEON_CODING_CLI_PATH").unwrap_or_else(|_| "claude".to_string())
}

/// Allow-list of tool flags passed to the coding-assistant CLI, comma
/// separated (spec.md §6: "an allow-list of tool flags").
pub fn coding_cli_allowed_tools() -> Vec<String> {
    std::env::var("LEON_CODING_CLI_ALLOWED_TOOLS")
        .ok()
        .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Bind address for the dashboard WebSocket listener (spec.md §6
/// "Dashboard (WebSocket)").
pub fn dashboard_bind() -> String {
    std::env::var("LEON_DASHBOARD_BIND").unwrap_or_else(|_| "127.0.0.1:4411".to_string())
}

/// Bind address for the chat-bridge HTTP listener (spec.md §6 "Chat
/// bridges (JS)").
pub fn bridge_bind() -> String {
    std::env::var("LEON_BRIDGE_BIND").unwrap_or_else(|_| "127.0.0.1:4412".to_string())
}

/// HTTP endpoint the core calls back into on the bridge process for
/// outbound sends (spec.md §6: "outbound calls from core to bridge over
/// HTTP").
pub fn bridge_callback_url() -> Option<String> {
    std::env::var("LEON_BRIDGE_CALLBACK_URL").ok()
}

/// A provider's endpoint and API key, read from a pair of env vars named
/// `{PREFIX}_ENDPOINT`/`{PREFIX}_API_KEY` (spec.md §6 "Environment
/// variables consumed: provider API keys, paths to credential files").
/// `None` means the operator hasn't configured this tier.
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

fn provider_config(prefix: &str) -> Option<ProviderConfig> {
    let endpoint = std::env::var(format!("{prefix}_ENDPOINT")).ok()?;
    let api_key = std::env::var(format!("{prefix}_API_KEY")).ok();
    Some(ProviderConfig { endpoint, api_key })
}

/// `LEON_PRIMARY_CLOUD_ENDPOINT`/`LEON_PRIMARY_CLOUD_API_KEY` (spec.md §4.7
/// "Default order": first tier).
pub fn primary_cloud() -> Option<ProviderConfig> {
    provider_config("LEON_PRIMARY_CLOUD")
}

/// `LEON_SECONDARY_CLOUD_ENDPOINT`/`LEON_SECONDARY_CLOUD_API_KEY` (spec.md
/// §4.7 "Default order": second tier).
pub fn secondary_cloud() -> Option<ProviderConfig> {
    provider_config("LEON_SECONDARY_CLOUD")
}

/// `LEON_LOCAL_INFERENCE_ENDPOINT` (spec.md §4.7 "Default order": third
/// tier, typically an unauthenticated loopback server).
pub fn local_inference() -> Option<ProviderConfig> {
    provider_config("LEON_LOCAL_INFERENCE")
}

/// Binary (path or `$PATH` name) of the last-resort local inference CLI
/// (spec.md §4.7 "Default order": `external-cli`).
pub fn external_cli_path() -> String {
    std::env::var("LEON_EXTERNAL_CLI_PATH").unwrap_or_else(|_| "ollama".to_string())
}

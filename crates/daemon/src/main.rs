// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leon Daemon (leond)
//!
//! Argument parsing and process setup only — the main loop, listener,
//! dashboard, and chat-bridge front-ends live in the library crate so they
//! can be exercised by its own test suite.

use std::sync::Arc;

use leon_adapters::ClaudeAgentAdapter;
use leon_core::{AppAllowList, DenyList, SystemClock, UuidIdGen};
use leon_daemon::bridge::{self, BridgeSink};
use leon_daemon::lifecycle::{self, Config, LifecycleError, StartupResult};
use leon_daemon::{dashboard, env, listener};
use leon_engine::KeywordPreRouter;
use leon_llm::providers::{build_default_chain, AuthHeader, ChainConfig};
use leon_llm::ProviderChain;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("leond {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("leond {}", env!("CARGO_PKG_VERSION"));
                println!("Leon daemon - background process that owns the main loop");
                println!();
                println!("The daemon is typically started by the `leon` CLI and should");
                println!("not be invoked directly. It listens on a Unix socket, a chat-");
                println!("bridge HTTP endpoint, and a dashboard WebSocket endpoint.");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: leond [--help | --version]");
                std::process::exit(2);
            }
        }
    }

    let config = Config::load().map_err(|e| {
        eprintln!("leond: {e}");
        e
    })?;

    let log_guard = setup_logging(&config)?;
    info!("starting leon daemon");

    let adapter = ClaudeAgentAdapter::new();
    let chain = build_provider_chain();
    let keyword_pre_router = KeywordPreRouter::new(Vec::new(), AppAllowList::default());
    let deny_list = DenyList::default();

    let (StartupResult { shared, unix_listener, loop_handle, .. }, quarantined) = match lifecycle::startup(
        config,
        Arc::new(SystemClock),
        Arc::new(UuidIdGen),
        adapter,
        chain,
        keyword_pre_router,
        deny_list,
    ) {
        Ok(r) => r,
        Err(LifecycleError::LockHeld(path)) => {
            eprintln!("leond is already running (lock held at {})", path.display());
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "failed to start daemon");
            drop(log_guard);
            return Err(e.into());
        }
    };

    if quarantined.any() {
        lifecycle::post_self_notice(&shared, lifecycle::quarantine_message(&quarantined));
    }

    tokio::spawn(listener::Listener::new(unix_listener, Arc::clone(&shared)).run());
    tokio::spawn(dashboard::run(Arc::clone(&shared)));

    let bridge_sink = env::bridge_callback_url()
        .map(|url| Arc::new(bridge::HttpBridgeSink::new(url)) as Arc<dyn BridgeSink>);
    tokio::spawn(bridge::run(Arc::clone(&shared), bridge_sink));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let shutdown = Arc::clone(&shared.shutdown);

    println!("READY");
    info!(socket = %shared.config.socket_path.display(), "daemon ready");

    tokio::select! {
        _ = lifecycle::run(Arc::clone(&shared), loop_handle) => {}
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }
    shutdown.notify_waiters();

    lifecycle::stop(&shared).await;
    info!("daemon stopped");
    Ok(())
}

/// Build the provider failover chain from operator-configured environment
/// variables (spec.md §4.7 "Default order"), omitting any tier that has no
/// endpoint configured. `external-cli` always has a binary name to try
/// (default `ollama`) since it needs no network configuration to attempt.
fn build_provider_chain() -> ProviderChain {
    let providers = build_default_chain(ChainConfig {
        primary_cloud: env::primary_cloud().map(|c| (c.endpoint, auth_header(c.api_key))),
        secondary_cloud: env::secondary_cloud().map(|c| (c.endpoint, auth_header(c.api_key))),
        local_inference: env::local_inference().map(|c| c.endpoint),
        external_cli: Some((env::external_cli_path(), Vec::new())),
    });
    ProviderChain::new(providers)
}

fn auth_header(api_key: Option<String>) -> AuthHeader {
    match api_key {
        Some(key) => AuthHeader::Bearer(key),
        None => AuthHeader::None,
    }
}

fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config.log_path.file_name().ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing wrapper for [`AgentAdapter`] implementations.

use crate::agent::{AgentAdapter, AgentAdapterError, AgentHandle, AgentSpawnConfig};
use async_trait::async_trait;
use leon_core::{AgentId, Event};
use tokio::sync::mpsc;
use tracing::Instrument;

/// Wrapper that adds structured tracing spans to any [`AgentAdapter`].
#[derive(Clone)]
pub struct TracedAgent<A> {
    inner: A,
}

impl<A> TracedAgent<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: AgentAdapter> AgentAdapter for TracedAgent<A> {
    async fn spawn(
        &self,
        config: AgentSpawnConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError> {
        let span = tracing::info_span!(
            "agent.spawn",
            agent_id = %config.agent_id,
            project = %config.project_path.display()
        );
        async {
            tracing::info!(cli = %config.cli_path, "starting");
            let start = std::time::Instant::now();
            let result = self.inner.spawn(config, event_tx).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(h) => tracing::info!(pid = h.pid, elapsed_ms, "agent spawned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "spawn failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn terminate(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError> {
        let result = self.inner.terminate(agent_id).await;
        tracing::info_span!("agent.terminate", %agent_id).in_scope(|| match &result {
            Ok(()) => tracing::info!("terminated"),
            Err(e) => tracing::warn!(error = %e, "terminate failed"),
        });
        result
    }

    async fn kill(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError> {
        let result = self.inner.kill(agent_id).await;
        tracing::info_span!("agent.kill", %agent_id).in_scope(|| match &result {
            Ok(()) => tracing::info!("killed"),
            Err(e) => tracing::warn!(error = %e, "kill failed (may be expected)"),
        });
        result
    }

    async fn is_alive(&self, agent_id: &AgentId) -> bool {
        let result = self.inner.is_alive(agent_id).await;
        tracing::trace!(%agent_id, alive = result, "checked");
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

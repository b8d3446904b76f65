// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake agent adapter for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AgentAdapter, AgentAdapterError, AgentHandle, AgentSpawnConfig};
use async_trait::async_trait;
use leon_core::{AgentId, Event};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Recorded call to [`FakeAgentAdapter`].
#[derive(Debug, Clone)]
pub enum AgentCall {
    Spawn { agent_id: AgentId, prompt: String },
    Terminate { agent_id: AgentId },
    Kill { agent_id: AgentId },
}

#[derive(Clone)]
struct FakeAgent {
    alive: bool,
}

/// Fake agent adapter for testing the supervisor without real child
/// processes. [`FakeAgentAdapter::finish`] simulates a spawned agent's
/// exit, delivering the `Event::AgentExited` the real adapter would send.
#[derive(Clone)]
pub struct FakeAgentAdapter {
    inner: Arc<Mutex<FakeAgentState>>,
}

struct FakeAgentState {
    agents: HashMap<AgentId, FakeAgent>,
    event_txs: HashMap<AgentId, mpsc::Sender<Event>>,
    calls: Vec<AgentCall>,
    spawn_error: Option<String>,
    next_pid: u32,
}

impl Default for FakeAgentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAgentAdapter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeAgentState {
                agents: HashMap::new(),
                event_txs: HashMap::new(),
                calls: Vec::new(),
                spawn_error: None,
                next_pid: 1000,
            })),
        }
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_spawn_error(&self, message: impl Into<String>) {
        self.inner.lock().spawn_error = Some(message.into());
    }

    pub fn has_agent(&self, agent_id: &AgentId) -> bool {
        self.inner.lock().agents.contains_key(agent_id)
    }

    /// Simulate the child process exiting with `exit_code`.
    pub async fn finish(&self, agent_id: &AgentId, exit_code: Option<i32>) {
        let tx = {
            let mut inner = self.inner.lock();
            if let Some(agent) = inner.agents.get_mut(agent_id) {
                agent.alive = false;
            }
            inner.event_txs.remove(agent_id)
        };
        if let Some(tx) = tx {
            let _ = tx
                .send(Event::AgentExited { agent_id: agent_id.clone(), exit_code })
                .await;
        }
    }
}

#[async_trait]
impl AgentAdapter for FakeAgentAdapter {
    async fn spawn(
        &self,
        config: AgentSpawnConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<AgentHandle, AgentAdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(AgentCall::Spawn {
            agent_id: config.agent_id.clone(),
            prompt: config.prompt.clone(),
        });
        if let Some(message) = inner.spawn_error.take() {
            return Err(AgentAdapterError::SpawnFailed(message));
        }
        let pid = inner.next_pid;
        inner.next_pid += 1;
        inner.agents.insert(config.agent_id.clone(), FakeAgent { alive: true });
        inner.event_txs.insert(config.agent_id.clone(), event_tx);
        Ok(AgentHandle { agent_id: config.agent_id, pid })
    }

    async fn terminate(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(AgentCall::Terminate { agent_id: agent_id.clone() });
        inner
            .agents
            .get(agent_id)
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))?;
        Ok(())
    }

    async fn kill(&self, agent_id: &AgentId) -> Result<(), AgentAdapterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(AgentCall::Kill { agent_id: agent_id.clone() });
        inner
            .agents
            .remove(agent_id)
            .ok_or_else(|| AgentAdapterError::NotFound(agent_id.to_string()))?;
        Ok(())
    }

    async fn is_alive(&self, agent_id: &AgentId) -> bool {
        self.inner.lock().agents.get(agent_id).map(|a| a.alive).unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use leon_core::AgentId;
use tokio::sync::mpsc;

use super::*;
use crate::agent::{AgentSpawnConfig, FakeAgentAdapter};

fn config(agent_id: &str) -> AgentSpawnConfig {
    AgentSpawnConfig {
        agent_id: AgentId::new(agent_id),
        cli_path: "claude".into(),
        project_path: PathBuf::from("/tmp/project"),
        prompt: "do it".into(),
        allowed_tools: Vec::new(),
        skip_permissions: false,
        stdout_path: PathBuf::from("/tmp/out.log"),
        stderr_path: PathBuf::from("/tmp/err.log"),
        transcript_path: PathBuf::from("/tmp/transcript.jsonl"),
        env: Vec::new(),
    }
}

#[tokio::test]
async fn delegates_spawn_and_liveness_to_inner() {
    let traced = TracedAgent::new(FakeAgentAdapter::new());
    let (tx, _rx) = mpsc::channel(8);
    let handle = traced.spawn(config("t1"), tx).await.unwrap();
    assert!(traced.is_alive(&handle.agent_id).await);
    traced.kill(&handle.agent_id).await.unwrap();
    assert!(!traced.is_alive(&handle.agent_id).await);
}

#[tokio::test]
async fn propagates_spawn_errors() {
    let inner = FakeAgentAdapter::new();
    inner.set_spawn_error("boom");
    let traced = TracedAgent::new(inner);
    let (tx, _rx) = mpsc::channel(8);
    let err = traced.spawn(config("t2"), tx).await.unwrap_err();
    assert!(matches!(err, AgentAdapterError::SpawnFailed(ref m) if m == "boom"));
}

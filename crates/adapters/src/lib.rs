// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: spawning the coding-assistant CLI (spec.md
//! §4.4, §6), desktop notifications, and subprocess helpers. No core
//! orchestration logic lives here — only the boundary to the OS.

pub mod agent;
pub mod notify;
pub mod skills;
pub mod subprocess;
pub mod traced;

pub use agent::{
    extract_process_name, AgentAdapter, AgentAdapterError, AgentHandle, AgentSpawnConfig,
    ClaudeAgentAdapter,
};
pub use notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter};
pub use skills::SkillError;
pub use traced::TracedAgent;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use agent::{AgentCall, FakeAgentAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Orchestration engine: the request router (spec.md §4.2), scheduler
//! (§4.5), agent supervisor (§4.4), and night-mode dispatcher (§4.6). No
//! persistence or process-spawning mechanics live here — those are
//! `leon-storage` and `leon-adapters`; this crate wires their contracts into
//! the decisions spec.md describes.

pub mod night;
pub mod router;
pub mod scheduler;
pub mod supervisor;

pub use night::{gate_open, NightDispatcher, NightGateConfig};
pub use router::{KeywordPreRouter, LiteralCommand, RouteOutcome, Router};
pub use scheduler::{Fired, Scheduler};
pub use supervisor::{
    AgentLogPaths, ExitOutcome, Supervisor, SupervisorConfig, SupervisorError,
};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;

fn config() -> NightGateConfig {
    NightGateConfig {
        enabled: true,
        window_start_minute: 0,
        window_end_minute: 6 * 60,
        quiet_period: Duration::from_secs(120),
    }
}

#[test]
fn gate_closed_when_disabled() {
    let mut cfg = config();
    cfg.enabled = false;
    assert!(!gate_open(&cfg, 60, 1_000_000, None));
}

#[test]
fn gate_closed_outside_window() {
    let cfg = config();
    assert!(!gate_open(&cfg, 12 * 60, 1_000_000, None));
}

#[test]
fn gate_open_inside_window_with_no_recent_utterance() {
    let cfg = config();
    assert!(gate_open(&cfg, 60, 1_000_000, None));
}

#[test]
fn gate_closed_within_quiet_period_after_interactive_utterance() {
    let cfg = config();
    let now_ms = 1_000_000;
    let last_utterance = now_ms - 5_000;
    assert!(!gate_open(&cfg, 60, now_ms, Some(last_utterance)));
}

#[test]
fn gate_reopens_after_quiet_period_elapses() {
    let cfg = config();
    let now_ms = 1_000_000;
    let last_utterance = now_ms - 130_000;
    assert!(gate_open(&cfg, 60, now_ms, Some(last_utterance)));
}

#[test]
fn window_wrapping_past_midnight() {
    let cfg = NightGateConfig {
        enabled: true,
        window_start_minute: 22 * 60,
        window_end_minute: 6 * 60,
        quiet_period: Duration::from_secs(0),
    };
    assert!(gate_open(&cfg, 23 * 60, 0, None));
    assert!(gate_open(&cfg, 60, 0, None));
    assert!(!gate_open(&cfg, 12 * 60, 0, None));
}

#[tokio::test]
async fn try_dispatch_serializes_concurrent_callers() {
    let dispatcher = Arc::new(NightDispatcher::new());
    let counter = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let dispatcher = dispatcher.clone();
        let counter = counter.clone();
        handles.push(tokio::spawn(async move {
            dispatcher
                .try_dispatch(|| {
                    let before = counter.load(Ordering::SeqCst);
                    counter.store(before + 1, Ordering::SeqCst);
                })
                .await;
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(counter.load(Ordering::SeqCst), 8);
}

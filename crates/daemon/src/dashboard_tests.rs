// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::{Duration, Instant};

use super::RateLimiter;

#[test]
fn allows_up_to_the_limit() {
    let mut limiter = RateLimiter::new(false);
    let now = Instant::now();
    for _ in 0..20 {
        assert!(limiter.allow(now));
    }
    assert!(!limiter.allow(now));
}

#[test]
fn loopback_connections_are_exempt() {
    let mut limiter = RateLimiter::new(true);
    let now = Instant::now();
    for _ in 0..1000 {
        assert!(limiter.allow(now));
    }
}

#[test]
fn window_resets_after_ttl() {
    let mut limiter = RateLimiter::new(false);
    let start = Instant::now();
    for _ in 0..20 {
        assert!(limiter.allow(start));
    }
    assert!(!limiter.allow(start));

    let later = start + Duration::from_secs(61);
    assert!(limiter.allow(later));
}

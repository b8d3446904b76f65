// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded TTL cache (spec.md §9 REDESIGN FLAGS: "`sentByBridge` TTL set...
//! generalise to a small bounded TTL cache component"). Used by the
//! chat-bridge adapter to dedupe inbound messages and, generically,
//! anywhere a "have I seen this recently" set with background eviction is
//! needed (e.g. the dashboard rate limiter's per-connection bucket).

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// `{insert(key), contains(key)}` with max capacity `N` and eviction of
/// entries older than `ttl`. Eviction happens lazily on `insert`/`contains`
/// rather than on a background timer — this crate has no use for a cache
/// that evicts while nothing touches it, and it keeps the type `Sync`
/// without its own task.
pub struct TtlCache<K> {
    ttl: Duration,
    capacity: usize,
    entries: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> TtlCache<K> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: HashMap::new(),
        }
    }

    /// Insert `key`, evicting expired entries first. If still over
    /// capacity after eviction, drops the oldest remaining entry — this
    /// cache bounds memory even under a burst that arrives faster than the
    /// TTL can retire it.
    pub fn insert(&mut self, key: K, now: Instant) {
        self.evict_expired(now);
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, inserted)| *inserted)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, now);
    }

    pub fn contains(&mut self, key: &K, now: Instant) -> bool {
        self.evict_expired(now);
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries.retain(|_, inserted| now.duration_since(*inserted) < ttl);
    }
}

#[cfg(test)]
#[path = "ttl_cache_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory response cache with per-entry TTL.
//!
//! Keyed by [`DedupKey`], so a cached GET is only reused for an identical
//! descriptor. Expired entries are dropped lazily on lookup and eagerly by
//! [`ResponseCache::purge_expired`].

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tether_core::DedupKey;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheItem {
    value: Value,
    expires_at: Instant,
}

impl CacheItem {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Response cache.
#[derive(Debug, Default)]
pub struct ResponseCache {
    items: HashMap<DedupKey, CacheItem>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a live entry, removing it if it has expired.
    pub fn get(&mut self, key: &DedupKey) -> Option<Value> {
        let now = Instant::now();
        match self.items.get(key) {
            Some(item) if !item.is_expired(now) => Some(item.value.clone()),
            Some(_) => {
                self.items.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a value for `ttl`. A zero TTL stores nothing.
    pub fn insert(&mut self, key: DedupKey, value: Value, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let expires_at = Instant::now() + ttl;
        self.items.insert(key, CacheItem { value, expires_at });
    }

    pub fn remove(&mut self, key: &DedupKey) -> bool {
        self.items.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.items.len();
        self.items.retain(|_, item| !item.is_expired(now));
        before - self.items.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

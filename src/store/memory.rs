// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory keyed store with per-entry expiry.
//!
//! The store exposes the small capability set the auth flow needs from a
//! keyed backend: get, put-with-expiry, and remove-if-present. An external
//! store could implement the same surface if the flow ever needs to
//! survive restarts or span instances.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    deadline: Instant,
    generation: u64,
}

struct Inner<V> {
    entries: DashMap<String, Entry<V>>,
    generation: AtomicU64,
}

/// Concurrent map whose entries expire after a per-entry TTL.
///
/// Expiry is enforced twice over: a scheduled removal task fires at the
/// entry's deadline, and every read re-checks the deadline so an entry is
/// never served past it even if the timer has not run yet. Removal is atomic
/// per key, which makes `remove_if_present` safe to use as a consume-once
/// operation under concurrent callers.
pub struct ExpiringMap<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for ExpiringMap<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for ExpiringMap<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ExpiringMap<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Insert a value under `key`, replacing any previous entry, and schedule
    /// its removal after `ttl`.
    ///
    /// Must be called from within a tokio runtime (the removal task is
    /// spawned on it). The generation check keeps the scheduled removal from
    /// deleting a newer entry inserted under the same key.
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + ttl;

        self.inner.entries.insert(
            key.clone(),
            Entry {
                value,
                deadline,
                generation,
            },
        );

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            inner
                .entries
                .remove_if(&key, |_, entry| entry.generation == generation);
        });
    }

    /// Get a live entry's value. Entries past their deadline are treated as
    /// absent regardless of whether the removal task has fired.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.inner.entries.get(key)?;
        (entry.deadline > Instant::now()).then(|| entry.value.clone())
    }

    /// Atomically remove and return a live entry.
    ///
    /// Returns `None` for unknown keys, already-consumed keys, and entries
    /// past their deadline; at most one caller can ever receive a given
    /// entry's value.
    pub fn remove_if_present(&self, key: &str) -> Option<V> {
        let (_, entry) = self.inner.entries.remove(key)?;
        (entry.deadline > Instant::now()).then_some(entry.value)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

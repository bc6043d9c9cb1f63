// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-memory [`Cache`] (spec.md §4.10). TTL is an absolute expiry on the
//! injected [`Clock`], so tests can drive expiry deterministically rather
//! than sleeping real time.
//!
//! `get_or_compute` is a true single-flight: a per-key `tokio::sync::Mutex`
//! guard serializes concurrent callers for the same key, and the cache is
//! re-checked once the guard is held so only the first caller actually runs
//! `compute` (spec.md §8 invariant 4).

use async_trait::async_trait;
use evidence_domain::entities::CacheEntry;
use evidence_domain::error::CoreError;
use evidence_domain::services::{BoxFuture, Cache, Clock};
use parking_lot::RwLock as SyncRwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

pub struct InMemoryCache {
    clock: Arc<dyn Clock>,
    store: SyncRwLock<HashMap<String, CacheEntry>>,
    in_flight: std::sync::Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl InMemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, store: SyncRwLock::new(HashMap::new()), in_flight: std::sync::Mutex::new(HashMap::new()) }
    }

    fn read_fresh(&self, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.now();
        let store = self.store.read();
        match store.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            _ => None,
        }
    }

    fn lease_for(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap();
        in_flight.entry(key.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    fn release(&self, key: &str, lease: Arc<AsyncMutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap();
        if Arc::strong_count(&lease) <= 2 {
            in_flight.remove(key);
        }
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.read_fresh(key)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let now = self.clock.now();
        self.store.write().insert(key.to_string(), CacheEntry::new(value, now, ttl));
    }

    async fn delete(&self, key: &str) {
        self.store.write().remove(key);
    }

    async fn get_or_compute(
        &self,
        key: &str,
        ttl: Duration,
        compute: Box<dyn FnOnce() -> BoxFuture<'static, Result<Vec<u8>, CoreError>> + Send>,
    ) -> Result<Vec<u8>, CoreError> {
        if let Some(value) = self.read_fresh(key) {
            return Ok(value);
        }

        let lease = self.lease_for(key);
        let _guard = lease.lock().await;

        // Another caller may have computed and stored the value while we
        // waited for the lease.
        if let Some(value) = self.read_fresh(key) {
            self.release(key, lease.clone());
            return Ok(value);
        }

        let result = compute().await;
        if let Ok(value) = &result {
            self.set(key, value.clone(), ttl).await;
        }
        self.release(key, lease.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_domain::services::SystemClock;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = InMemoryCache::new(Arc::new(SystemClock::new()));
        cache.set("k", b"v".to_vec(), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn expired_entries_read_as_a_miss() {
        let cache = InMemoryCache::new(Arc::new(SystemClock::new()));
        cache.set("k", b"v".to_vec(), Duration::from_millis(0)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn get_or_compute_runs_compute_at_most_once_under_concurrency() {
        let cache = Arc::new(InMemoryCache::new(Arc::new(SystemClock::new())));
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute(
                        "shared",
                        Duration::from_secs(60),
                        Box::new(move || {
                            Box::pin(async move {
                                calls.fetch_add(1, Ordering::SeqCst);
                                tokio::time::sleep(Duration::from_millis(10)).await;
                                Ok(b"computed".to_vec())
                            })
                        }),
                    )
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), b"computed".to_vec());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cache port (spec.md §2, §4.10). TTL is absolute; reads past TTL return
//! a miss. Implementations MUST be safe under concurrent use and MUST
//! implement `get_or_compute` as a true single-flight: `compute` runs at
//! most once per key even under concurrent, overlapping callers
//! (spec.md §8 invariant 4).

use crate::error::CoreError;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);
    async fn delete(&self, key: &str);

    /// Runs `compute` at most once per key even under concurrent callers
    /// with overlapping TTLs (spec.md §4.10, §8 invariant 4). The default
    /// implementation built on `get`/`set` is NOT single-flight safe on
    /// its own — concrete adapters override this with a per-key lock or
    /// in-flight-future map.
    async fn get_or_compute(
        &self,
        key: &str,
        ttl: Duration,
        compute: Box<dyn FnOnce() -> BoxFuture<'static, Result<Vec<u8>, CoreError>> + Send>,
    ) -> Result<Vec<u8>, CoreError>;
}

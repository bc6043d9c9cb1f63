// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Task Queue port (spec.md §2, §4.10): bounded FIFO executed by a worker
//! pool, used so long-running stages never tie up request threads
//! (spec.md §5, §9).

use crate::error::CoreError;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send>>;

/// What `submit` does when the queue is at capacity (spec.md §4.10).
pub enum Backpressure {
    Reject,
    BlockUpTo(Duration),
}

#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn submit(&self, task: BoxedTask, backpressure: Backpressure) -> Result<(), CoreError>;
    fn capacity(&self) -> usize;
    fn len(&self) -> usize;
}

// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Bounded [`TaskQueue`] (spec.md §4.10) over a tokio [`Semaphore`]: one
//! permit per in-flight task, `capacity` permits total. A submitted task is
//! spawned onto the runtime's worker pool immediately once a permit is
//! acquired, so long-running stages never occupy a request-handling task.

use async_trait::async_trait;
use evidence_domain::error::CoreError;
use evidence_domain::services::{Backpressure, BoxedTask, TaskQueue};
use std::sync::Arc;
use tokio::sync::Semaphore;

pub struct TokioTaskQueue {
    capacity: usize,
    semaphore: Arc<Semaphore>,
}

impl TokioTaskQueue {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, semaphore: Arc::new(Semaphore::new(capacity)) }
    }
}

#[async_trait]
impl TaskQueue for TokioTaskQueue {
    async fn submit(&self, task: BoxedTask, backpressure: Backpressure) -> Result<(), CoreError> {
        let permit = match backpressure {
            Backpressure::Reject => self.semaphore.clone().try_acquire_owned().map_err(|_| {
                CoreError::DependencyUnavailable("task queue is at capacity".to_string())
            })?,
            Backpressure::BlockUpTo(timeout) => {
                tokio::time::timeout(timeout, self.semaphore.clone().acquire_owned())
                    .await
                    .map_err(|_| CoreError::DependencyUnavailable("task queue did not free a slot in time".to_string()))?
                    .expect("semaphore is never closed")
            }
        };

        tokio::spawn(async move {
            task.await;
            drop(permit);
        });
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.capacity.saturating_sub(self.semaphore.available_permits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn submit_rejects_when_at_capacity_with_reject_policy() {
        let queue = TokioTaskQueue::new(1);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        queue.submit(Box::pin(async { rx.await.ok(); }), Backpressure::Reject).await.unwrap();

        let result = queue.submit(Box::pin(async {}), Backpressure::Reject).await;
        assert!(result.is_err());
        tx.send(()).ok();
    }

    #[tokio::test]
    async fn submit_blocks_up_to_the_timeout_then_fails() {
        let queue = TokioTaskQueue::new(1);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        queue.submit(Box::pin(async { rx.await.ok(); }), Backpressure::Reject).await.unwrap();

        let result = queue.submit(Box::pin(async {}), Backpressure::BlockUpTo(Duration::from_millis(20))).await;
        assert!(result.is_err());
        tx.send(()).ok();
    }

    #[tokio::test]
    async fn len_tracks_in_flight_tasks_until_they_complete() {
        let queue = Arc::new(TokioTaskQueue::new(4));
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = ran.clone();
        queue
            .submit(
                Box::pin(async move {
                    ran_clone.fetch_add(1, Ordering::SeqCst);
                }),
                Backpressure::Reject,
            )
            .await
            .unwrap();

        // Give the spawned task a chance to run and release its permit.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(queue.len(), 0);
    }
}

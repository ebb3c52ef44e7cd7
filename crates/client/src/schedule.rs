// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred task scheduling.
//!
//! Retry backoff, reconnect delays and heartbeats all go through a
//! [`Scheduler`] so that tests can run them on paused tokio time or record
//! the delays that were requested.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A boxed, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Handle to a scheduled task.
///
/// Cancelling aborts the task whether it is still waiting on its delay or
/// already running. Dropping the handle does not cancel.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    token: CancellationToken,
}

impl TaskHandle {
    /// Cancel the task.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if the task was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Source of delays and background tasks.
pub trait Scheduler: Send + Sync + 'static {
    /// Returns a future that completes after `duration`.
    ///
    /// The deadline is fixed when this is called, not when it is first polled.
    fn sleep(&self, duration: Duration) -> BoxFuture<()>;

    /// Run a task in the background.
    fn spawn(&self, task: BoxFuture<()>) {
        tokio::spawn(task);
    }

    /// Run `task` after `delay`, returning a handle that can cancel it.
    fn schedule(&self, delay: Duration, task: BoxFuture<()>) -> TaskHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let sleep = self.sleep(delay);

        self.spawn(Box::pin(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = async move {
                    sleep.await;
                    task.await;
                } => {}
            }
        }));

        TaskHandle { token }
    }
}

/// Scheduler backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn sleep(&self, duration: Duration) -> BoxFuture<()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;

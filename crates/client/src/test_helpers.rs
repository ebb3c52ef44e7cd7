// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::schedule::{BoxFuture, Scheduler};

/// Scheduler that records every requested sleep and then sleeps on the
/// (usually paused) tokio clock.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All requested sleeps, in request order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// Requested sleeps that were not zero.
    pub fn delays(&self) -> Vec<Duration> {
        self.sleeps().into_iter().filter(|d| !d.is_zero()).collect()
    }
}

impl Scheduler for RecordingScheduler {
    fn sleep(&self, duration: Duration) -> BoxFuture<()> {
        self.sleeps.lock().unwrap().push(duration);
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Let spawned tasks run; on paused time this also advances the clock.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue for calls made while connectivity is down.
//!
//! Entries hold the caller's descriptor, options and a one-shot resolver.
//! On reconnect entries are popped oldest first and replayed; each entry's
//! result is delivered through its resolver.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tether_core::RequestDescriptor;
use tokio::sync::oneshot;

use super::error::RequestResult;
use super::options::RequestOptions;

/// Receives the eventual result of a queued call.
pub type Resolution = oneshot::Receiver<RequestResult<Value>>;

/// A call deferred until connectivity returns.
#[derive(Debug)]
pub struct OfflineEntry {
    pub descriptor: RequestDescriptor,
    pub options: RequestOptions,
    pub queued_at: DateTime<Utc>,
    resolver: oneshot::Sender<RequestResult<Value>>,
}

impl OfflineEntry {
    /// Deliver the result to the original caller.
    ///
    /// A caller that stopped waiting is ignored.
    pub fn resolve(self, result: RequestResult<Value>) {
        let _ = self.resolver.send(result);
    }

    /// Split the entry so its resolver can wait on a call chain directly.
    pub(crate) fn into_parts(
        self,
    ) -> (
        RequestDescriptor,
        RequestOptions,
        oneshot::Sender<RequestResult<Value>>,
    ) {
        (self.descriptor, self.options, self.resolver)
    }
}

/// FIFO buffer of deferred calls.
#[derive(Debug, Default)]
pub struct OfflineQueue {
    entries: VecDeque<OfflineEntry>,
}

impl OfflineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call and return the receiver for its result.
    pub fn enqueue(&mut self, descriptor: RequestDescriptor, options: RequestOptions) -> Resolution {
        let (resolver, resolution) = oneshot::channel();
        self.entries.push_back(OfflineEntry {
            descriptor,
            options,
            queued_at: Utc::now(),
            resolver,
        });
        resolution
    }

    /// Remove and return the oldest entry.
    pub fn pop_front(&mut self) -> Option<OfflineEntry> {
        self.entries.pop_front()
    }

    /// Descriptors of the queued calls, oldest first.
    pub fn descriptors(&self) -> Vec<RequestDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

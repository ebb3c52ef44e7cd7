// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Event name to subscriber mapping.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Callback invoked with the `data` of each matching event.
pub type Subscriber = Arc<dyn Fn(&Value) + Send + Sync>;

/// Identifies one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Subscribers grouped by event name.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: u64,
    events: HashMap<String, Vec<(SubscriptionId, Subscriber)>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `event`.
    pub fn subscribe(&mut self, event: impl Into<String>, callback: Subscriber) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.events
            .entry(event.into())
            .or_default()
            .push((id, callback));
        id
    }

    /// Remove every subscriber for `event`, returning how many there were.
    pub fn unsubscribe(&mut self, event: &str) -> usize {
        self.events.remove(event).map_or(0, |subs| subs.len())
    }

    /// Remove a single subscriber.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let mut emptied = None;
        let mut found = false;
        for (event, subs) in self.events.iter_mut() {
            if let Some(pos) = subs.iter().position(|(sub_id, _)| *sub_id == id) {
                subs.remove(pos);
                found = true;
                if subs.is_empty() {
                    emptied = Some(event.clone());
                }
                break;
            }
        }
        if let Some(event) = emptied {
            self.events.remove(&event);
        }
        found
    }

    /// Snapshot of the subscribers for `event`.
    ///
    /// Callers invoke the snapshot without holding the registry, so a
    /// subscriber may subscribe or unsubscribe from inside its callback.
    pub fn subscribers(&self, event: &str) -> Vec<Subscriber> {
        self.events
            .get(event)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }

    /// Event names with at least one subscriber, sorted.
    pub fn events(&self) -> Vec<String> {
        let mut names: Vec<_> = self.events.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .events
            .iter()
            .map(|(event, subs)| (event.as_str(), subs.len()))
            .collect();
        f.debug_struct("SubscriberRegistry")
            .field("events", &counts)
            .finish()
    }
}

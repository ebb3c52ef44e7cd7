// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Socket client options and lifecycle callbacks.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::error::SocketError;

pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(3_000);
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Connection settings for [`ReconnectingSocketClient`](super::ReconnectingSocketClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketOptions {
    pub url: String,
    pub auto_reconnect: bool,
    /// Wait before each reconnect attempt.
    pub reconnect_interval: Duration,
    /// Reconnect attempts allowed before giving up.
    pub max_reconnect_attempts: u32,
    /// Ping period. `None` disables the heartbeat.
    pub heartbeat_interval: Option<Duration>,
}

impl SocketOptions {
    pub fn new(url: impl Into<String>) -> Self {
        SocketOptions {
            url: url.into(),
            auto_reconnect: true,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            heartbeat_interval: Some(DEFAULT_HEARTBEAT_INTERVAL),
        }
    }

    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// A zero interval disables the heartbeat.
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = (!interval.is_zero()).then_some(interval);
        self
    }
}

type Hook = Arc<dyn Fn() + Send + Sync>;
type MessageHook = Arc<dyn Fn(&Value) + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&SocketError) + Send + Sync>;

/// Lifecycle callbacks. All are optional.
///
/// Callbacks run on the client's background task and must not block.
#[derive(Clone, Default)]
pub struct SocketCallbacks {
    pub(crate) on_open: Option<Hook>,
    pub(crate) on_message: Option<MessageHook>,
    pub(crate) on_close: Option<Hook>,
    pub(crate) on_error: Option<ErrorHook>,
}

impl SocketCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_open<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_open = Some(Arc::new(f));
        self
    }

    /// Called with every parsed inbound frame, after event subscribers.
    pub fn on_message<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_message = Some(Arc::new(f));
        self
    }

    /// Called when a connection that reached `Open` goes away.
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_close = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&SocketError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub(crate) fn opened(&self) {
        if let Some(f) = &self.on_open {
            f();
        }
    }

    pub(crate) fn message(&self, frame: &Value) {
        if let Some(f) = &self.on_message {
            f(frame);
        }
    }

    pub(crate) fn closed(&self) {
        if let Some(f) = &self.on_close {
            f();
        }
    }

    pub(crate) fn error(&self, error: &SocketError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }
}

impl fmt::Debug for SocketCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketCallbacks")
            .field("on_open", &self.on_open.is_some())
            .field("on_message", &self.on_message.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

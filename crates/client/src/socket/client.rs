// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnecting socket client.
//!
//! State machine:
//!
//! ```text
//! Idle ──connect()──► Connecting ──open──► Open
//!                        ▲   │               │ unexpected close
//!                        │   │ failure       ▼
//!                        └───┴────── Reconnecting { attempt }
//!                                            │ attempts exhausted
//!                                            ▼
//!                 close() ──► Closing ──► Closed
//! ```
//!
//! Every physical connection belongs to a session generation. `connect()`
//! and `close()` start a new generation, and background tasks from an older
//! generation stop touching shared state as soon as they notice.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tether_core::Envelope;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::error::{SocketError, SocketResult};
use super::options::{SocketCallbacks, SocketOptions};
use super::subscribers::{SubscriberRegistry, SubscriptionId};
use super::transport::{
    Connection, Inbound, Outbound, SocketConnector, TransportError, WebSocketConnector,
};
use crate::config::SocketConfig;
use crate::schedule::{Scheduler, TaskHandle, TokioScheduler};

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
    /// Waiting to make reconnect attempt `attempt` (1-based).
    Reconnecting { attempt: u32 },
}

struct Session {
    state: SocketState,
    attempts: u32,
    generation: u64,
    outbound: Option<mpsc::UnboundedSender<Outbound>>,
    task: Option<TaskHandle>,
    heartbeat: Option<TaskHandle>,
    last_error: Option<SocketError>,
}

impl Session {
    fn cancel_tasks(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        if let Some(heartbeat) = self.heartbeat.take() {
            heartbeat.cancel();
        }
    }
}

struct Inner<C> {
    options: SocketOptions,
    connector: C,
    scheduler: Arc<dyn Scheduler>,
    callbacks: SocketCallbacks,
    session: Mutex<Session>,
    subscribers: Mutex<SubscriberRegistry>,
}

/// Socket client with automatic reconnection, heartbeat and event
/// subscriptions over one physical connection.
///
/// Dropping the client stops its background tasks and closes the
/// connection without invoking `on_close`.
pub struct ReconnectingSocketClient<C: SocketConnector = WebSocketConnector> {
    inner: Arc<Inner<C>>,
}

/// Builder for [`ReconnectingSocketClient`].
pub struct SocketClientBuilder<C> {
    options: SocketOptions,
    connector: C,
    scheduler: Arc<dyn Scheduler>,
    callbacks: SocketCallbacks,
}

impl<C: SocketConnector> SocketClientBuilder<C> {
    /// Use a different connector.
    pub fn connector<D: SocketConnector>(self, connector: D) -> SocketClientBuilder<D> {
        SocketClientBuilder {
            options: self.options,
            connector,
            scheduler: self.scheduler,
            callbacks: self.callbacks,
        }
    }

    pub fn scheduler(mut self, scheduler: impl Scheduler) -> Self {
        self.scheduler = Arc::new(scheduler);
        self
    }

    pub fn callbacks(mut self, callbacks: SocketCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Build the client. It stays `Idle` until [`connect`](ReconnectingSocketClient::connect).
    pub fn build(self) -> ReconnectingSocketClient<C> {
        ReconnectingSocketClient {
            inner: Arc::new(Inner {
                options: self.options,
                connector: self.connector,
                scheduler: self.scheduler,
                callbacks: self.callbacks,
                session: Mutex::new(Session {
                    state: SocketState::Idle,
                    attempts: 0,
                    generation: 0,
                    outbound: None,
                    task: None,
                    heartbeat: None,
                    last_error: None,
                }),
                subscribers: Mutex::new(SubscriberRegistry::new()),
            }),
        }
    }
}

impl ReconnectingSocketClient<WebSocketConnector> {
    /// Start building a WebSocket client.
    pub fn builder(options: SocketOptions) -> SocketClientBuilder<WebSocketConnector> {
        SocketClientBuilder {
            options,
            connector: WebSocketConnector::new(),
            scheduler: Arc::new(TokioScheduler),
            callbacks: SocketCallbacks::default(),
        }
    }

    /// Create a WebSocket client from configuration.
    pub fn new(config: &SocketConfig, callbacks: SocketCallbacks) -> Self {
        Self::builder(config.socket_options())
            .callbacks(callbacks)
            .build()
    }
}

impl<C: SocketConnector> ReconnectingSocketClient<C> {
    /// Open the connection.
    ///
    /// No-op while `Open` or `Connecting`. Otherwise any pending reconnect
    /// is cancelled and the attempt counter is reset.
    pub fn connect(&self) {
        let inner = &self.inner;
        let mut session = inner.lock();
        if matches!(session.state, SocketState::Open | SocketState::Connecting) {
            debug!("connect ignored, socket is {:?}", session.state);
            return;
        }

        session.cancel_tasks();
        session.attempts = 0;
        session.generation += 1;
        session.state = SocketState::Connecting;
        info!("connecting to {}", inner.options.url);

        let generation = session.generation;
        inner.start_session(&mut session, generation, Duration::ZERO);
    }

    /// Close the connection and stop reconnecting. Idempotent.
    pub fn close(&self) {
        if self.inner.teardown() {
            info!("connection to {} closed", self.inner.options.url);
            self.inner.callbacks.closed();
        }
    }

    /// Serialize `data` as JSON and send it.
    ///
    /// Returns false, logging why, if the socket is not `Open` or the
    /// payload cannot be serialized. Nothing is buffered.
    pub fn send<S: Serialize + ?Sized>(&self, data: &S) -> bool {
        match self.try_send(data) {
            Ok(()) => true,
            Err(e) => {
                error!("cannot send: {}", e);
                false
            }
        }
    }

    /// Like [`send`](Self::send), but reports why a send was refused.
    pub fn try_send<S: Serialize + ?Sized>(&self, data: &S) -> SocketResult<()> {
        let outbound = {
            let session = self.inner.lock();
            match (&session.state, &session.outbound) {
                (SocketState::Open, Some(outbound)) => outbound.clone(),
                _ => return Err(SocketError::NotConnected),
            }
        };

        let text =
            serde_json::to_string(data).map_err(|e| SocketError::Serialization(e.to_string()))?;
        outbound
            .send(Outbound::Text(text))
            .map_err(|_| SocketError::Transport(TransportError::ConnectionClosed))
    }

    /// Send an `{ "event": .., "data": .. }` envelope.
    pub fn emit(&self, event: &str, data: impl Into<Value>) -> bool {
        self.send(&Envelope::event(event, data))
    }

    /// Register `callback` for frames whose `event` is `event`.
    pub fn subscribe<F>(&self, event: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner
            .subscribers()
            .subscribe(event, Arc::new(callback))
    }

    /// Remove every subscriber for `event`, returning how many there were.
    pub fn unsubscribe(&self, event: &str) -> usize {
        self.inner.subscribers().unsubscribe(event)
    }

    /// Remove one subscriber.
    pub fn remove_subscription(&self, id: SubscriptionId) -> bool {
        self.inner.subscribers().remove(id)
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.inner.subscribers().count(event)
    }

    pub fn state(&self) -> SocketState {
        self.inner.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SocketState::Open
    }

    /// Most recent error, kept until the next successful open.
    pub fn last_error(&self) -> Option<SocketError> {
        self.inner.lock().last_error.clone()
    }

    /// Reconnect attempts since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.lock().attempts
    }

    pub fn options(&self) -> &SocketOptions {
        &self.inner.options
    }
}

impl<C: SocketConnector> Drop for ReconnectingSocketClient<C> {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

impl<C: SocketConnector> Inner<C> {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn subscribers(&self) -> MutexGuard<'_, SubscriberRegistry> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Stop all tasks and close the connection. Returns true if it was open.
    fn teardown(&self) -> bool {
        let mut session = self.lock();
        session.generation += 1;
        session.cancel_tasks();
        session.attempts = 0;

        let was_open = session.state == SocketState::Open;
        if let Some(outbound) = session.outbound.take() {
            session.state = SocketState::Closing;
            let _ = outbound.send(Outbound::Close);
        }
        session.state = SocketState::Closed;
        was_open
    }

    /// Schedule a connection attempt for `generation` after `delay`.
    fn start_session(self: &Arc<Self>, session: &mut Session, generation: u64, delay: Duration) {
        let inner = Arc::clone(self);
        let task = self
            .scheduler
            .schedule(delay, Box::pin(inner.run_session(generation)));
        session.task = Some(task);
    }

    async fn run_session(self: Arc<Self>, generation: u64) {
        {
            let mut session = self.lock();
            if session.generation != generation {
                return;
            }
            session.state = SocketState::Connecting;
        }

        let connection = match self.connector.connect(&self.options.url).await {
            Ok(connection) => connection,
            Err(e) => {
                warn!("connection to {} failed: {}", self.options.url, e);
                if self.is_current(generation) {
                    self.report_error(SocketError::Transport(e));
                    self.handle_disconnect(generation, false);
                }
                return;
            }
        };
        let Connection {
            outbound,
            mut inbound,
        } = connection;

        {
            let mut session = self.lock();
            if session.generation != generation {
                let _ = outbound.send(Outbound::Close);
                return;
            }
            session.state = SocketState::Open;
            session.attempts = 0;
            session.last_error = None;
            session.outbound = Some(outbound);
            self.start_heartbeat(&mut session, generation);
        }
        info!("connected to {}", self.options.url);
        self.callbacks.opened();

        while let Some(event) = inbound.recv().await {
            if !self.is_current(generation) {
                return;
            }
            match event {
                Inbound::Text(text) => self.dispatch(&text),
                Inbound::Error(e) => {
                    warn!("transport error on {}: {}", self.options.url, e);
                    self.report_error(SocketError::Transport(e));
                }
                Inbound::Closed => break,
            }
        }

        self.handle_disconnect(generation, true);
    }

    /// React to the loss of the connection for `generation`.
    fn handle_disconnect(self: &Arc<Self>, generation: u64, was_open: bool) {
        let exhausted = {
            let mut session = self.lock();
            if session.generation != generation {
                return;
            }
            if let Some(heartbeat) = session.heartbeat.take() {
                heartbeat.cancel();
            }
            session.outbound = None;

            if !self.options.auto_reconnect {
                session.state = SocketState::Closed;
                None
            } else if session.attempts >= self.options.max_reconnect_attempts {
                let exhausted = SocketError::ReconnectExhausted {
                    attempts: session.attempts,
                };
                session.state = SocketState::Closed;
                session.last_error = Some(exhausted.clone());
                Some(exhausted)
            } else {
                session.attempts += 1;
                let attempt = session.attempts;
                session.state = SocketState::Reconnecting { attempt };
                debug!(
                    "reconnect attempt {}/{} in {:?}",
                    attempt, self.options.max_reconnect_attempts, self.options.reconnect_interval
                );
                self.start_session(&mut session, generation, self.options.reconnect_interval);
                None
            }
        };

        if was_open {
            info!("connection to {} lost", self.options.url);
            self.callbacks.closed();
        }
        if let Some(e) = exhausted {
            error!("{}: {}", self.options.url, e);
        }
    }

    fn start_heartbeat(self: &Arc<Self>, session: &mut Session, generation: u64) {
        let Some(interval) = self.options.heartbeat_interval else {
            return;
        };
        let inner = Arc::clone(self);
        let task = self.scheduler.schedule(
            Duration::ZERO,
            Box::pin(async move {
                loop {
                    inner.scheduler.sleep(interval).await;
                    if !inner.heartbeat(generation) {
                        break;
                    }
                }
            }),
        );
        session.heartbeat = Some(task);
    }

    /// Send one ping. Returns false once the session is gone.
    fn heartbeat(&self, generation: u64) -> bool {
        let outbound = {
            let session = self.lock();
            if session.generation != generation || session.state != SocketState::Open {
                return false;
            }
            match &session.outbound {
                Some(outbound) => outbound.clone(),
                None => return false,
            }
        };
        match Envelope::ping().to_json() {
            Ok(ping) => {
                debug!("heartbeat");
                outbound.send(Outbound::Text(ping)).is_ok()
            }
            Err(e) => {
                warn!("failed to encode heartbeat: {}", e);
                true
            }
        }
    }

    /// Route one inbound frame to subscribers and then to `on_message`.
    fn dispatch(&self, text: &str) {
        let frame: Value = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(
                    "dropping frame, {}",
                    SocketError::MalformedMessage(e.to_string())
                );
                return;
            }
        };

        if let Some((event, data)) = Envelope::route(&frame) {
            let subscribers = self.subscribers().subscribers(event);
            for subscriber in subscribers {
                subscriber(data);
            }
        }
        self.callbacks.message(&frame);
    }

    fn report_error(&self, error: SocketError) {
        self.lock().last_error = Some(error.clone());
        self.callbacks.error(&error);
    }
}

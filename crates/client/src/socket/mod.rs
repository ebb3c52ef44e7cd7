// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnecting socket layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Client    │────►│  Connector  │────►│   Remote    │
//! │(Reconnecting)│◄────│   (trait)   │◄────│  WebSocket  │
//! └──────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │ Subscribers  │  (event name → callbacks)
//! └──────────────┘
//! ```
//!
//! # Features
//!
//! - Bounded automatic reconnection at a fixed interval
//! - Heartbeat pings while open
//! - Event subscriptions multiplexed over one connection
//! - Sends are dropped, not buffered, while disconnected
//! - Injectable connector and scheduler for testing

mod client;
mod error;
mod options;
mod subscribers;
mod transport;

pub use client::{ReconnectingSocketClient, SocketClientBuilder, SocketState};
pub use error::{SocketError, SocketResult};
pub use options::{
    SocketCallbacks, SocketOptions, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_MAX_RECONNECT_ATTEMPTS,
    DEFAULT_RECONNECT_INTERVAL,
};
pub use subscribers::{Subscriber, SubscriberRegistry, SubscriptionId};
pub use transport::{
    Connection, Inbound, Outbound, SocketConnector, TransportError, TransportResult,
    WebSocketConnector,
};

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether - resilient request and reconnecting socket clients for admin
//! dashboards.
//!
//! # Main Components
//!
//! - [`ResilientRequestClient`] - retries transient failures with jittered
//!   exponential backoff, joins identical in-flight calls, parks calls in
//!   an offline queue and replays them in order on reconnect
//! - [`ReconnectingSocketClient`] - one WebSocket connection with bounded
//!   reconnection, heartbeat pings and per-event subscriptions
//! - [`Config`] - TOML configuration for both
//! - [`Scheduler`] - deferred tasks with cancelable handles
//!
//! # Usage
//!
//! ```rust,ignore
//! use tether::{Clients, Config, RequestDescriptor, SocketCallbacks};
//!
//! let config = Config::load_or_default()?;
//! let clients = Clients::from_config(&config, SocketCallbacks::new())?;
//!
//! let devices = clients.http.execute(RequestDescriptor::get("/devices")).await?;
//!
//! clients.socket.subscribe("alarm", |data| println!("alarm: {data}"));
//! clients.socket.connect();
//! ```

mod clients;
pub mod config;
mod error;
pub mod logging;
pub mod request;
pub mod schedule;
pub mod socket;

#[cfg(test)]
mod test_helpers;

pub use clients::Clients;
pub use config::{Config, ConfigError, HttpConfig, SocketConfig};
pub use error::{Error, Result};
pub use request::{
    BackoffPolicy, RequestError, RequestOptions, ResilientRequestClient, RetryState, TokenStore,
};
pub use schedule::{Scheduler, TaskHandle, TokioScheduler};
pub use socket::{
    ReconnectingSocketClient, SocketCallbacks, SocketError, SocketOptions, SocketState,
    SubscriptionId,
};
pub use tether_core::{ApiResponse, DedupKey, Envelope, Method, RequestDescriptor};

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Resilient HTTP request layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Client    │────►│  Transport  │────►│   Backend   │
//! │  (Resilient) │◄────│   (trait)   │◄────│  HTTP API   │
//! └──────────────┘     └─────────────┘     └─────────────┘
//!     │      │
//!     ▼      ▼
//! ┌───────┐ ┌─────────┐
//! │ Queue │ │  Cache  │
//! │(offl.)│ │  (TTL)  │
//! └───────┘ └─────────┘
//! ```
//!
//! # Features
//!
//! - Exponential backoff with jitter, capped
//! - Retry predicate and retry callback per call
//! - Concurrent identical calls share one retry chain
//! - Offline queue replayed in FIFO order on reconnect
//! - Optional response cache for GET calls
//! - Injectable transport and scheduler for testing

mod backoff;
mod cache;
mod client;
mod error;
mod options;
mod queue;
mod token;
mod transport;

pub use backoff::{BackoffPolicy, FixedJitter, JitterSource, SeededJitter, ThreadRngJitter};
pub use cache::ResponseCache;
pub use client::{RequestClientBuilder, ResilientRequestClient, RetryState};
pub use error::{RequestError, RequestResult, RETRYABLE_STATUSES};
pub use options::{
    RequestOptions, RetryCallback, RetryPredicate, DEFAULT_CACHE_TTL, DEFAULT_RETRY_COUNT,
};
pub use queue::{OfflineEntry, OfflineQueue};
pub use token::TokenStore;
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError, TransportResult,
};


#[cfg(test)]
mod client_tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-core: Shared data model for the tether network clients
//!
//! This crate provides the transport-independent types used by both the
//! resilient request client and the reconnecting socket client: request
//! descriptors with their de-duplication keys, and the JSON wire envelopes.

pub mod error;
pub mod protocol;
pub mod request;

pub use error::{Error, Result};
pub use protocol::{ApiResponse, Envelope};
pub use request::{DedupKey, Method, RequestDescriptor};

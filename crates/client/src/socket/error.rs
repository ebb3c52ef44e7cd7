// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the socket client.

use super::transport::TransportError;

/// Error type for socket client operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocketError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The socket is not in the `Open` state.
    #[error("socket is not connected")]
    NotConnected,

    /// An inbound frame was not valid JSON.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Reconnection was abandoned. Call `connect()` to start over.
    #[error("gave up reconnecting after {attempts} attempts\n  hint: call connect() to try again")]
    ReconnectExhausted { attempts: u32 },

    /// An outbound payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for socket client operations.
pub type SocketResult<T> = Result<T, SocketError>;

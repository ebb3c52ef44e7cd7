// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for request execution.

use super::transport::TransportError;

/// HTTP statuses retried by default.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Error type for request client operations.
///
/// Cloneable so that every caller sharing one in-flight call receives the
/// same outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Transport-level failure (no HTTP response).
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// Non-2xx HTTP response.
    #[error("http status {status}")]
    Status { status: u16, body: String },

    /// 2xx response whose business code is not zero.
    #[error("request failed (code {code}): {message}")]
    Business { code: i64, message: String },

    /// The server rejected the stored credentials.
    #[error("authentication expired\n  hint: sign in again to obtain a new token")]
    AuthenticationExpired,

    /// Credentials were requested but no token is stored.
    #[error("not authenticated: request requires a token but none is stored")]
    NotAuthenticated,

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The client was dropped before the call completed.
    #[error("request abandoned before completion")]
    Abandoned,
}

impl RequestError {
    /// HTTP status, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::AuthenticationExpired => Some(401),
            _ => None,
        }
    }

    /// Network errors and [`RETRYABLE_STATUSES`] are transient.
    pub fn is_transient(&self) -> bool {
        match self {
            RequestError::Network(_) => true,
            RequestError::Status { status, .. } => RETRYABLE_STATUSES.contains(status),
            _ => false,
        }
    }
}

/// Result type for request client operations.
pub type RequestResult<T> = Result<T, RequestError>;

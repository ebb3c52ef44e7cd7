// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::config::ConfigError;
use crate::request::RequestError;
use crate::socket::SocketError;

/// Errors surfaced by the tether library.
///
/// Each layer keeps its own error type; this wraps them for hosts that want
/// a single `?`-compatible type.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Socket(#[from] SocketError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("core error: {0}")]
    Core(#[from] tether_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

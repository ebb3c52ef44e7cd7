// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The pair of clients a host application shares across its views.

use crate::config::Config;
use crate::error::Result;
use crate::request::{ResilientRequestClient, TokenStore};
use crate::socket::{ReconnectingSocketClient, SocketCallbacks};

/// One request client and one socket client built from the same config.
///
/// Construct once at startup and pass by reference; there is no global
/// instance. The socket is left `Idle` until the host calls `connect()`.
pub struct Clients {
    pub http: ResilientRequestClient,
    pub socket: ReconnectingSocketClient,
}

impl Clients {
    /// Validate `config` and build both clients.
    pub fn from_config(config: &Config, callbacks: SocketCallbacks) -> Result<Self> {
        config.validate()?;
        let http = ResilientRequestClient::new(&config.http)?;
        let socket = ReconnectingSocketClient::new(&config.socket, callbacks);
        Ok(Clients { http, socket })
    }

    /// The request client's token slot, for sign-in and sign-out.
    pub fn tokens(&self) -> &TokenStore {
        self.http.tokens()
    }

    /// Forward a platform connectivity change to the request client.
    ///
    /// Returns the number of queued requests replayed when coming back
    /// online.
    pub async fn set_online(&self, online: bool) -> usize {
        if online {
            self.http.connectivity_restored().await
        } else {
            self.http.connectivity_lost();
            0
        }
    }
}

#[cfg(test)]
#[path = "clients_tests.rs"]
mod tests;

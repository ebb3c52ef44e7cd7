// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer token storage.

use std::fmt;
use std::sync::{Arc, RwLock};

/// Shared slot for the session token.
///
/// Clones share the same slot, so the host can keep a handle and sign the
/// user in or out while clients are running.
#[derive(Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    /// Removes the token. Returns true if one was stored.
    pub fn clear(&self) -> bool {
        self.token
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some()
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_set(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// `Authorization` header value, if a token is stored.
    pub fn bearer(&self) -> Option<String> {
        self.get().map(|token| format!("Bearer {token}"))
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_set() { "<set>" } else { "<empty>" };
        f.debug_struct("TokenStore").field("token", &state).finish()
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request descriptors and their de-duplication keys.
//!
//! A [`RequestDescriptor`] identifies one logical network call. Two
//! descriptors with the same method, target, parameters and body produce the
//! same [`DedupKey`], which is how concurrent identical calls are correlated.
//!
//! Key format: `{METHOD}-{target}-{params_json}-{body_json}`

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the upper-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// Canonical identity of a logical call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One logical network call: method, target, query parameters and body.
///
/// Descriptors are immutable once handed to a client; the builder methods
/// consume and return `self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the client's base URL (e.g. `/api/devices`).
    pub target: String,
    /// Query parameters, kept sorted so the dedup key is stable.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Attach the stored bearer token. Not part of the dedup key.
    #[serde(default)]
    pub with_credentials: bool,
}

impl RequestDescriptor {
    /// Creates a descriptor with no parameters or body.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        RequestDescriptor {
            method,
            target: target.into(),
            params: BTreeMap::new(),
            body: None,
            with_credentials: false,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::Put, target)
    }

    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(Method::Patch, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::Delete, target)
    }

    /// Adds a query parameter. `null` values are dropped from the query
    /// string but still participate in the dedup key.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Sets the JSON body.
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Requires the bearer token to be attached.
    pub fn with_credentials(mut self) -> Self {
        self.with_credentials = true;
        self
    }

    /// Computes the de-duplication key.
    pub fn dedup_key(&self) -> DedupKey {
        // Value maps serialize in key order, so these never fail or reorder.
        let params = serde_json::to_string(&self.params).unwrap_or_default();
        let body = match &self.body {
            Some(body) => body.to_string(),
            None => "null".to_string(),
        };
        DedupKey(format!("{}-{}-{}-{}", self.method, self.target, params, body))
    }

    /// Renders query parameters as string pairs, skipping `null`.
    ///
    /// Strings are passed through unquoted; other values use their JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()
    }

    /// Returns true for methods whose results may be cached.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::Get
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;

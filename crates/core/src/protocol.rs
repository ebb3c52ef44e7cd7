// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes shared by the request and socket clients.
//!
//! - [`Envelope`]: socket frames, `{ "event"?, "data", "type"? }`
//! - [`ApiResponse`]: HTTP business envelope, `{ "code", "message", "data" }`

use serde::{Deserialize, Serialize};
use serde_json::Value;

static NULL: Value = Value::Null;

/// Socket message envelope.
///
/// Frames without an `event` are delivered only to the generic message
/// handler; frames with one are also routed to that event's subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Envelope {
    /// Creates an event frame.
    pub fn event(name: impl Into<String>, data: impl Into<Value>) -> Self {
        Envelope {
            event: Some(name.into()),
            data: data.into(),
            kind: None,
        }
    }

    /// Creates a typed frame without an event name.
    pub fn typed(kind: impl Into<String>, data: impl Into<Value>) -> Self {
        Envelope {
            event: None,
            data: data.into(),
            kind: Some(kind.into()),
        }
    }

    /// Heartbeat frame: `{"data":null,"type":"ping"}`.
    pub fn ping() -> Self {
        Self::typed("ping", Value::Null)
    }

    /// Extracts the event name and payload from an already parsed frame.
    ///
    /// Returns `None` when the frame is not an object or carries no string
    /// `event` field. A missing `data` field yields `null`.
    pub fn route(frame: &Value) -> Option<(&str, &Value)> {
        let event = frame.get("event")?.as_str()?;
        Some((event, frame.get("data").unwrap_or(&NULL)))
    }

    /// Serializes the envelope to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an envelope from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Business envelope returned by the backend. `code == 0` is success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl ApiResponse {
    /// Code reported for envelopes whose `code` is not a number.
    pub const UNKNOWN_CODE: i64 = -1;

    /// Message reported for failures that carry none.
    pub const DEFAULT_MESSAGE: &'static str = "request failed";

    pub fn ok(data: impl Into<Value>) -> Self {
        ApiResponse {
            code: 0,
            message: None,
            data: data.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// The failure message, falling back to [`Self::DEFAULT_MESSAGE`].
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or(Self::DEFAULT_MESSAGE)
    }

    /// Parses a response body.
    ///
    /// Any JSON object with a `code` key is an envelope. Numeric strings are
    /// read as numbers; any other non-integer code becomes
    /// [`Self::UNKNOWN_CODE`]. A `message` that is not a non-empty string is
    /// treated as absent. Returns `None` for values without a `code`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let code = match value.as_object()?.get("code")? {
            Value::Number(n) => n.as_i64().unwrap_or(Self::UNKNOWN_CODE),
            Value::String(s) => s.trim().parse().unwrap_or(Self::UNKNOWN_CODE),
            _ => Self::UNKNOWN_CODE,
        };
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        let data = value.get("data").cloned().unwrap_or(Value::Null);

        Some(ApiResponse {
            code,
            message,
            data,
        })
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for the real-time update channel.
//!
//! The protocol is simple:
//! - Server pushes JSON objects tagged with a `type` field
//! - Client sends keepalive pings (and whatever the caller chooses to send)
//!
//! Only the `type` tag is interpreted. Every other field is kind-specific and
//! handed to subscribers verbatim.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Field carrying the event kind on every frame.
pub const TYPE_FIELD: &str = "type";

/// The closed set of event kinds carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Prospect/user activity feed entry.
    Activity,
    /// User-facing notification.
    Notification,
    /// Progress of a background task (research, content generation).
    TaskUpdate,
    /// Connection status announced by the server.
    Connection,
    /// Reply to a client ping.
    Pong,
    /// Error reported by the server or synthesized by the client.
    Error,
    /// Client keepalive. Outbound only.
    Ping,
}

impl EventKind {
    /// Every kind the server may push.
    pub const INBOUND: [EventKind; 6] = [
        EventKind::Activity,
        EventKind::Notification,
        EventKind::TaskUpdate,
        EventKind::Connection,
        EventKind::Pong,
        EventKind::Error,
    ];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Activity => "activity",
            EventKind::Notification => "notification",
            EventKind::TaskUpdate => "task_update",
            EventKind::Connection => "connection",
            EventKind::Pong => "pong",
            EventKind::Error => "error",
            EventKind::Ping => "ping",
        }
    }

    /// Returns true if the server is allowed to send this kind.
    pub fn is_inbound(&self) -> bool {
        !matches!(self, EventKind::Ping)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "activity" => Ok(EventKind::Activity),
            "notification" => Ok(EventKind::Notification),
            "task_update" => Ok(EventKind::TaskUpdate),
            "connection" => Ok(EventKind::Connection),
            "pong" => Ok(EventKind::Pong),
            "error" => Ok(EventKind::Error),
            "ping" => Ok(EventKind::Ping),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

/// A message received from the server.
///
/// Holds the parsed kind next to the original JSON object, so subscribers see
/// exactly the fields the server sent. Messages are immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    kind: EventKind,
    fields: Map<String, Value>,
}

impl Message {
    /// Parses one inbound frame.
    ///
    /// The frame must be a JSON object whose `type` names an inbound kind.
    pub fn from_json(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(value)
    }

    /// Builds a message from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(Error::InvalidFrame("frame is not a JSON object".to_string()));
        };

        let tag = fields
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidFrame("missing string field 'type'".to_string()))?;

        let kind: EventKind = tag.parse()?;
        if !kind.is_inbound() {
            return Err(Error::UnknownKind(tag.to_string()));
        }

        Ok(Message { kind, fields })
    }

    /// Creates an `error` message with a human-readable description.
    ///
    /// Used to report transport failures through the same channel as
    /// server-sent errors.
    pub fn error(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            TYPE_FIELD.to_string(),
            Value::String(EventKind::Error.as_str().to_string()),
        );
        fields.insert("message".to_string(), Value::String(message.into()));
        Message {
            kind: EventKind::Error,
            fields,
        }
    }

    /// The event kind.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Looks up a single field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Looks up a string field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// All fields, including `type`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Decodes the message into a caller-defined payload type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    /// Serializes the message back to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.fields)?)
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Messages the client constructs itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keepalive ping.
    Ping {
        /// Client wall clock in milliseconds since the Unix epoch.
        timestamp: i64,
    },
}

impl ClientMessage {
    /// Creates a Ping message stamped with the given time.
    pub fn ping(timestamp: i64) -> Self {
        ClientMessage::Ping { timestamp }
    }

    /// Creates a Ping message stamped with the current time.
    pub fn ping_now() -> Self {
        Self::ping(chrono::Utc::now().timestamp_millis())
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

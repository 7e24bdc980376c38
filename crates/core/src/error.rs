// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for pulse-core operations.

use thiserror::Error;

/// Errors produced while parsing frames or deriving the socket endpoint.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("unknown event kind: '{0}'\n  hint: valid kinds are: activity, notification, task_update, connection, pong, error")]
    UnknownKind(String),

    #[error("api url is not configured\n  hint: set PULSE_API_URL or pass --api-url")]
    MissingApiUrl,

    #[error("invalid api url '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for pulse-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

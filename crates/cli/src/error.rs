// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the `pulse` command line.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] pulse_client::Error),

    #[error(transparent)]
    Protocol(#[from] pulse_core::Error),

    #[error("gave up reconnecting after {attempts} attempts\n  hint: check that the backend is reachable")]
    ConnectionFailed { attempts: u32 },

    #[error("could not send ping: socket is not open")]
    PingNotSent,

    #[error("no pong within {secs}s")]
    Timeout { secs: u64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::transport::TransportError;

/// All possible errors that can occur in the pulse client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("a connection attempt is already in progress")]
    AlreadyConnecting,

    #[error("connection attempt was superseded\n  hint: disconnect() or a newer connect() was called while it was in flight")]
    Superseded,

    #[error("identity cannot be empty")]
    EmptyIdentity,

    #[error(transparent)]
    Protocol(#[from] pulse_core::Error),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for pulse client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pulse-core: Shared protocol types for the pulse real-time client
//!
//! This crate provides the wire messages, endpoint derivation and error
//! types used by both the pulse client library and the `pulse` CLI.

pub mod endpoint;
pub mod error;
pub mod protocol;

pub use endpoint::socket_url;
pub use error::{Error, Result};
pub use protocol::{ClientMessage, EventKind, Message};

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! pulse-client: Reconnecting real-time client
//!
//! Keeps one WebSocket open to the backend per process, reconnects with
//! exponential backoff when it drops, and fans incoming messages out to
//! subscribers by event kind.
//!
//! ```no_run
//! # async fn demo() -> pulse_client::Result<()> {
//! use pulse_client::{ClientConfig, ConnectionManager, EventKind};
//!
//! let manager = ConnectionManager::new(ClientConfig::discover()?);
//! let _sub = manager.subscribe(EventKind::Notification, |msg| {
//!     println!("{:?}", msg.get("id"));
//! });
//! manager.connect("user-1").await?;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod binding;
pub mod config;
pub mod env;
pub mod error;
pub mod manager;
pub mod registry;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use backoff::ReconnectPolicy;
pub use binding::Binding;
pub use config::{ApiUrlProvider, ClientConfig, EnvApiUrl, StaticApiUrl};
pub use error::{Error, Result};
pub use manager::{ConnectionManager, ConnectionState};
pub use pulse_core::{ClientMessage, EventKind, Message};
pub use registry::{Subscription, SubscriptionRegistry, Topic};
pub use transport::{
    EventSink, SocketEvent, SocketHandle, Transport, TransportError, WebSocketTransport,
};

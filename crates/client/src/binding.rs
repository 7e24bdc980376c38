// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reactive view of the connection for UI-style consumers.
//!
//! A [`Binding`] connects on mount and exposes two observable values: whether
//! the socket is open and the most recent message. Both are tokio `watch`
//! channels, so consumers can either poll or await changes.

#![warn(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pulse_core::Message;

use crate::error::Error;
use crate::manager::ConnectionManager;
use crate::registry::{Subscription, Topic};

/// Connection status and last message for one identity.
///
/// Dropping the binding stops its background tasks and unsubscribes. The
/// connection itself stays up; call [`ConnectionManager::disconnect`] to close
/// it.
pub struct Binding {
    manager: ConnectionManager,
    connected: watch::Receiver<bool>,
    last_message: watch::Receiver<Option<Arc<Message>>>,
    cancel: CancellationToken,
    _subscription: Subscription,
}

impl Binding {
    /// Subscribe to every message, connect as `identity`, and start
    /// reconciling the connected flag every `poll_interval`.
    pub fn mount(manager: &ConnectionManager, identity: &str, poll_interval: Duration) -> Self {
        let (connected_tx, connected) = watch::channel(manager.is_connected());
        let (last_tx, last_message) = watch::channel(None);
        let cancel = CancellationToken::new();

        let subscription = manager.subscribe(Topic::All, move |msg| {
            last_tx.send_replace(Some(Arc::clone(msg)));
        });

        let connected_tx = Arc::new(connected_tx);

        tokio::spawn({
            let manager = manager.clone();
            let identity = identity.to_string();
            let connected_tx = Arc::clone(&connected_tx);
            async move {
                // Outlives the binding; connect must not be abandoned midway
                match manager.connect(&identity).await {
                    Ok(()) => {
                        connected_tx.send_replace(manager.is_connected());
                    }
                    Err(Error::AlreadyConnecting) => {
                        debug!("connection for {} already in progress", identity);
                    }
                    Err(e) => warn!("failed to connect as {}: {}", identity, e),
                }
            }
        });

        tokio::spawn({
            let manager = manager.clone();
            let cancel = cancel.clone();
            async move {
                let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {
                            let now = manager.is_connected();
                            connected_tx.send_if_modified(|current| {
                                if *current == now {
                                    return false;
                                }
                                *current = now;
                                true
                            });
                        }
                    }
                }
            }
        });

        Binding {
            manager: manager.clone(),
            connected,
            last_message,
            cancel,
            _subscription: subscription,
        }
    }

    /// Connection status as of the last reconciliation.
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// The most recent message of any kind.
    pub fn last_message(&self) -> Option<Arc<Message>> {
        self.last_message.borrow().clone()
    }

    /// Watch the connection status.
    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    /// Watch the most recent message.
    pub fn watch_last_message(&self) -> watch::Receiver<Option<Arc<Message>>> {
        self.last_message.clone()
    }

    /// See [`ConnectionManager::send`].
    pub fn send<M: Serialize + ?Sized>(&self, message: &M) -> bool {
        self.manager.send(message)
    }

    /// See [`ConnectionManager::ping`].
    pub fn ping(&self) -> bool {
        self.manager.ping()
    }

    /// The manager this binding observes.
    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "binding_tests.rs"]
mod tests;

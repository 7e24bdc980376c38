// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection manager: one real-time socket per process.
//!
//! The manager owns the socket and drives its lifecycle:
//!
//! ```text
//! Disconnected ──connect──► Connecting ──open──► Open
//!      ▲                        ▲                 │ unexpected close/error
//!      │ disconnect             │ delay elapsed   ▼
//!      └──────────────── (any) ─┴──────────── Reconnecting ──ceiling──► Failed
//! ```
//!
//! Every socket reports into one ordered channel. A single event loop task
//! drains it, parses frames and dispatches them through the
//! [`SubscriptionRegistry`], so handlers see messages one at a time in wire
//! order.
//!
//! The manager is an ordinary value: construct it once at the top of the
//! application and hand out clones. Clones share the same connection.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use pulse_core::{socket_url, ClientMessage, Message};

use crate::backoff::ReconnectPolicy;
use crate::config::{ApiUrlProvider, ClientConfig};
use crate::error::{Error, Result};
use crate::registry::{Subscription, SubscriptionRegistry, Topic};
use crate::transport::{
    Envelope, EventSink, Generation, SocketEvent, SocketHandle, Transport, TransportError,
    WebSocketTransport,
};

/// Lifecycle state of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and none wanted.
    Disconnected,
    /// An open attempt is in flight.
    Connecting,
    /// The socket is open.
    Open,
    /// Waiting to retry after losing the socket.
    Reconnecting { attempt: u32 },
    /// Gave up after the attempt ceiling. Only `connect()` leaves this state.
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Open => f.write_str("open"),
            ConnectionState::Reconnecting { attempt } => {
                write!(f, "reconnecting (attempt {})", attempt)
            }
            ConnectionState::Failed => f.write_str("failed"),
        }
    }
}

/// Mutable connection state, guarded by the manager's lock.
struct Connection {
    lifecycle: ConnectionState,
    /// Who the connection is for. `None` means no reconnection is wanted.
    identity: Option<String>,
    socket: Option<SocketHandle>,
    /// Bumped on every open attempt and on disconnect.
    generation: Generation,
    attempt: u32,
    /// Pending scheduled reconnect.
    reconnect: Option<CancellationToken>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    api_url: Box<dyn ApiUrlProvider>,
    policy: ReconnectPolicy,
    registry: SubscriptionRegistry,
    events: mpsc::UnboundedSender<Envelope>,
    shutdown: CancellationToken,
    connection: Mutex<Connection>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let connection = self
            .connection
            .get_mut()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(token) = connection.reconnect.take() {
            token.cancel();
        }
        if let Some(socket) = connection.socket.take() {
            socket.close();
        }
        self.shutdown.cancel();
    }
}

/// Handle on the process-wide real-time connection.
///
/// Must be created inside a Tokio runtime: construction spawns the event
/// loop task.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    /// Create a manager with the WebSocket transport.
    pub fn new(config: ClientConfig) -> Self {
        let policy = config.reconnect_policy();
        Self::with_transport(config, policy, WebSocketTransport::new())
    }

    /// Create a manager with a custom transport.
    pub fn with_transport(
        api_url: impl ApiUrlProvider + 'static,
        policy: ReconnectPolicy,
        transport: impl Transport,
    ) -> Self {
        let (events, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let inner = Arc::new(Inner {
            transport: Arc::new(transport),
            api_url: Box::new(api_url),
            policy,
            registry: SubscriptionRegistry::new(),
            events,
            shutdown: shutdown.clone(),
            connection: Mutex::new(Connection {
                lifecycle: ConnectionState::Disconnected,
                identity: None,
                socket: None,
                generation: 0,
                attempt: 0,
                reconnect: None,
            }),
        });

        tokio::spawn(run_event_loop(Arc::downgrade(&inner), rx, shutdown));

        ConnectionManager { inner }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.inner
            .connection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.lock().lifecycle
    }

    /// Identity of the current (or wanted) connection.
    pub fn identity(&self) -> Option<String> {
        self.lock().identity.clone()
    }

    /// Check if the socket is open right now.
    ///
    /// Says nothing about whether a reconnect is pending.
    pub fn is_connected(&self) -> bool {
        self.lock()
            .socket
            .as_ref()
            .is_some_and(SocketHandle::is_open)
    }

    /// The reconnection policy in use.
    pub fn policy(&self) -> ReconnectPolicy {
        self.inner.policy
    }

    /// The registry messages are dispatched through.
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.inner.registry
    }

    /// Register `handler` for `topic`. See [`SubscriptionRegistry::subscribe`].
    pub fn subscribe<F>(&self, topic: impl Into<Topic>, handler: F) -> Subscription
    where
        F: Fn(&Arc<Message>) + Send + Sync + 'static,
    {
        self.inner.registry.subscribe(topic, handler)
    }

    /// Open the connection for `identity`.
    ///
    /// Resolves immediately if already open for the same identity. A
    /// connection for another identity is closed first. Fails fast with
    /// [`Error::AlreadyConnecting`] while another attempt is in flight.
    ///
    /// On transport failure the error is returned here, reported to `error`
    /// subscribers, and a reconnect is scheduled as for any dropped socket.
    pub async fn connect(&self, identity: &str) -> Result<()> {
        if identity.trim().is_empty() {
            return Err(Error::EmptyIdentity);
        }

        let (generation, url) = {
            let mut conn = self.lock();

            if conn.lifecycle == ConnectionState::Connecting {
                return Err(Error::AlreadyConnecting);
            }

            let open = conn.socket.as_ref().is_some_and(SocketHandle::is_open);
            if open && conn.identity.as_deref() == Some(identity) {
                debug!("already connected as {}", identity);
                return Ok(());
            }

            let url = self.endpoint(identity)?;

            if let Some(socket) = conn.socket.take() {
                info!(
                    "closing connection for {} before connecting as {}",
                    conn.identity.as_deref().unwrap_or("<none>"),
                    identity
                );
                socket.close();
            }
            if let Some(token) = conn.reconnect.take() {
                token.cancel();
            }

            conn.identity = Some(identity.to_string());
            conn.attempt = 0;
            (begin_attempt(&mut conn), url)
        };

        self.finish_open(generation, url).await
    }

    /// Close the connection and stop reconnecting. Safe to call at any time.
    pub fn disconnect(&self) {
        let mut conn = self.lock();

        conn.identity = None;
        conn.attempt = 0;
        conn.generation += 1;
        if let Some(token) = conn.reconnect.take() {
            token.cancel();
        }
        if let Some(socket) = conn.socket.take() {
            socket.close();
            info!("disconnected");
        }
        conn.lifecycle = ConnectionState::Disconnected;
    }

    /// Send a message. Fire-and-forget.
    ///
    /// When the socket is not open the message is dropped with a warning and
    /// `false` is returned. Nothing is buffered.
    pub fn send<M: Serialize + ?Sized>(&self, message: &M) -> bool {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(e) => {
                error!("failed to serialize outbound message: {}", e);
                return false;
            }
        };

        let conn = self.lock();
        let Some(socket) = conn.socket.as_ref().filter(|s| s.is_open()) else {
            warn!("socket not open, dropping outbound message");
            return false;
        };

        match socket.send_text(text) {
            Ok(()) => true,
            Err(e) => {
                warn!("dropping outbound message: {}", e);
                false
            }
        }
    }

    /// Send a keepalive ping stamped with the current time.
    pub fn ping(&self) -> bool {
        self.send(&ClientMessage::ping_now())
    }

    fn endpoint(&self, identity: &str) -> Result<Url> {
        let base = self.inner.api_url.api_url().unwrap_or_default();
        Ok(socket_url(&base, identity)?)
    }

    /// Await the transport and install the socket if this attempt is still
    /// the current one.
    async fn finish_open(&self, generation: Generation, url: Url) -> Result<()> {
        let sink = EventSink::new(generation, self.inner.events.clone());
        let transport = Arc::clone(&self.inner.transport);
        let result = transport.open(url.as_str(), sink).await;

        let mut conn = self.lock();

        if conn.generation != generation {
            if let Ok(socket) = result {
                socket.close();
            }
            debug!("connection attempt {} superseded", generation);
            return Err(Error::Superseded);
        }

        match result {
            Ok(socket) if socket.is_open() => {
                conn.socket = Some(socket);
                conn.lifecycle = ConnectionState::Open;
                conn.attempt = 0;
                info!(
                    "connected as {}",
                    conn.identity.as_deref().unwrap_or("<none>")
                );
                Ok(())
            }
            Ok(_) => {
                let err = TransportError::ConnectionClosed;
                self.fail_attempt(&mut conn, err.to_string());
                Err(err.into())
            }
            Err(e) => {
                self.fail_attempt(&mut conn, e.to_string());
                Err(e.into())
            }
        }
    }

    /// Report a failed open attempt and schedule the next one.
    fn fail_attempt(&self, conn: &mut Connection, reason: String) {
        warn!("connection attempt failed: {}", reason);
        let _ = self.inner.events.send(Envelope::ConnectFailed(reason));
        self.schedule_reconnect(conn);
    }

    fn schedule_reconnect(&self, conn: &mut Connection) {
        conn.attempt = conn.attempt.saturating_add(1);
        let attempt = conn.attempt;

        let Some(delay) = self.inner.policy.delay_for(attempt) else {
            conn.lifecycle = ConnectionState::Failed;
            conn.reconnect = None;
            error!(
                "giving up after {} reconnection attempts",
                self.inner.policy.max_attempts
            );
            return;
        };

        conn.lifecycle = ConnectionState::Reconnecting { attempt };
        let token = CancellationToken::new();
        if let Some(previous) = conn.reconnect.replace(token.clone()) {
            previous.cancel();
        }

        info!(
            "reconnecting in {:?} (attempt {}/{})",
            delay, attempt, self.inner.policy.max_attempts
        );

        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if let Some(inner) = weak.upgrade() {
                ConnectionManager { inner }.reconnect(token).await;
            }
        });
    }

    /// Timer callback for a scheduled reconnect.
    async fn reconnect(&self, token: CancellationToken) {
        let (generation, url) = {
            let mut conn = self.lock();

            // Cancelled tokens belong to reconnects that disconnect() or
            // connect() already replaced
            if token.is_cancelled() {
                return;
            }
            conn.reconnect = None;

            let Some(identity) = conn.identity.clone() else {
                return;
            };

            match self.endpoint(&identity) {
                Ok(url) => (begin_attempt(&mut conn), url),
                Err(e) => {
                    self.fail_attempt(&mut conn, e.to_string());
                    return;
                }
            }
        };

        // Failures are already reported and rescheduled
        let _ = self.finish_open(generation, url).await;
    }

    fn handle_envelope(&self, envelope: Envelope) {
        match envelope {
            Envelope::ConnectFailed(reason) => {
                self.inner.registry.dispatch(&Arc::new(Message::error(reason)));
            }
            Envelope::Socket { generation, event } => self.handle_socket_event(generation, event),
        }
    }

    fn handle_socket_event(&self, generation: Generation, event: SocketEvent) {
        match event {
            SocketEvent::Frame(text) => {
                if !self.is_current(generation) {
                    debug!("ignoring frame from stale connection {}", generation);
                    return;
                }
                match Message::from_json(&text) {
                    Ok(message) => {
                        self.inner.registry.dispatch(&Arc::new(message));
                    }
                    Err(e) => warn!("dropping frame: {}", e),
                }
            }
            SocketEvent::Error(reason) => {
                if !self.is_current(generation) {
                    debug!("ignoring error from stale connection {}", generation);
                    return;
                }
                warn!("socket error: {}", reason);
                self.inner.registry.dispatch(&Arc::new(Message::error(reason)));
            }
            SocketEvent::Closed { code } => self.handle_close(generation, code),
        }
    }

    fn handle_close(&self, generation: Generation, code: Option<u16>) {
        let mut conn = self.lock();

        // Sockets that closed before being installed are handled by the
        // attempt that opened them
        if conn.generation != generation || conn.socket.is_none() {
            debug!("ignoring close of connection {}", generation);
            return;
        }

        conn.socket = None;

        if conn.identity.is_none() {
            conn.lifecycle = ConnectionState::Disconnected;
            return;
        }

        match code {
            Some(code) => warn!("connection closed by server (code {})", code),
            None => warn!("connection lost"),
        }
        self.schedule_reconnect(&mut conn);
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.lock().generation == generation
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conn = self.lock();
        f.debug_struct("ConnectionManager")
            .field("state", &conn.lifecycle)
            .field("identity", &conn.identity)
            .field("attempt", &conn.attempt)
            .field("policy", &self.inner.policy)
            .finish()
    }
}

/// Start a new open attempt: bump the generation and mark it connecting.
fn begin_attempt(conn: &mut Connection) -> Generation {
    conn.generation += 1;
    conn.lifecycle = ConnectionState::Connecting;
    conn.generation
}

/// Drain the event channel until the manager is dropped.
async fn run_event_loop(
    inner: Weak<Inner>,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    shutdown: CancellationToken,
) {
    loop {
        let envelope = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = rx.recv() => match next {
                Some(envelope) => envelope,
                None => break,
            },
        };

        let Some(inner) = inner.upgrade() else {
            break;
        };
        ConnectionManager { inner }.handle_envelope(envelope);
    }
    debug!("event loop stopped");
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;

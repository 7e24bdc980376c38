// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for WebSocket communication.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! A transport only opens sockets. Once open, a socket reports everything it
//! sees (frames, errors, the final close) through the [`EventSink`] it was
//! given, and accepts outbound text through its [`SocketHandle`]. All sockets
//! share the manager's single event channel, so frames are handled in the
//! order they arrive.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Identifies one socket over the manager's lifetime.
pub type Generation = u64;

/// Something a live socket observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// A text frame, not yet parsed.
    Frame(String),
    /// A transport-level error. Always followed by `Closed`.
    Error(String),
    /// The socket is gone.
    Closed {
        /// Close code sent by the peer, if any.
        code: Option<u16>,
    },
}

/// Items on the manager's event channel.
#[derive(Debug)]
pub(crate) enum Envelope {
    /// Event from the socket with the given generation.
    Socket {
        generation: Generation,
        event: SocketEvent,
    },
    /// An open attempt failed before a socket existed.
    ConnectFailed(String),
}

/// Producer side of the manager's event channel, bound to one socket.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: Generation,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EventSink {
    pub(crate) fn new(generation: Generation, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        EventSink { generation, tx }
    }

    /// The generation of the socket this sink belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Reports an event. Returns false once the manager is gone.
    pub fn emit(&self, event: SocketEvent) -> bool {
        self.tx
            .send(Envelope::Socket {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

/// Outbound work for a socket's writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Send a text frame.
    Text(String),
    /// Send a close frame and stop writing.
    Close,
}

/// Shared open/closed flag of one socket.
#[derive(Debug, Clone)]
pub struct OpenFlag(Arc<AtomicBool>);

impl OpenFlag {
    fn new() -> Self {
        OpenFlag(Arc::new(AtomicBool::new(true)))
    }

    /// Check if the socket is still open.
    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Record that the socket has closed.
    pub fn mark_closed(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The manager's handle on a live socket.
///
/// Sending never blocks: frames are queued for the socket's writer.
#[derive(Debug)]
pub struct SocketHandle {
    outbound: mpsc::UnboundedSender<Outbound>,
    open: OpenFlag,
}

impl SocketHandle {
    /// Create a handle plus the receiving end a transport drives.
    pub fn pair() -> (SocketHandle, mpsc::UnboundedReceiver<Outbound>, OpenFlag) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let open = OpenFlag::new();
        let handle = SocketHandle {
            outbound,
            open: open.clone(),
        };
        (handle, rx, open)
    }

    /// Queue a text frame.
    pub fn send_text(&self, text: String) -> TransportResult<()> {
        if !self.is_open() {
            return Err(TransportError::ConnectionClosed);
        }
        self.outbound
            .send(Outbound::Text(text))
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    /// Close the socket. Safe to call more than once.
    pub fn close(&self) {
        self.open.mark_closed();
        let _ = self.outbound.send(Outbound::Close);
    }

    /// Check if the socket is open right now.
    pub fn is_open(&self) -> bool {
        self.open.is_open() && !self.outbound.is_closed()
    }
}

/// Transport trait for WebSocket-like communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync + 'static {
    /// Open a socket to `url`, reporting its events through `sink`.
    fn open(
        &self,
        url: &str,
        sink: EventSink,
    ) -> Pin<Box<dyn Future<Output = TransportResult<SocketHandle>> + Send + '_>>;
}

/// WebSocket transport implementation using tokio-tungstenite.
#[derive(Debug, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport
    }
}

impl Transport for WebSocketTransport {
    fn open(
        &self,
        url: &str,
        sink: EventSink,
    ) -> Pin<Box<dyn Future<Output = TransportResult<SocketHandle>> + Send + '_>> {
        let url = url.to_string();
        Box::pin(async move {
            let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (mut ws_sink, mut ws_stream) = ws_stream.split();
            let (handle, mut outbound, open) = SocketHandle::pair();

            // Writer: drains the outbound queue until closed
            let writer_open = open.clone();
            tokio::spawn(async move {
                while let Some(item) = outbound.recv().await {
                    match item {
                        Outbound::Text(text) => {
                            if let Err(e) = ws_sink.send(WsMessage::Text(text.into())).await {
                                warn!("websocket write failed: {}", e);
                                break;
                            }
                        }
                        Outbound::Close => {
                            let _ = ws_sink.close().await;
                            break;
                        }
                    }
                }
                writer_open.mark_closed();
            });

            // Reader: forwards frames in receipt order, then reports the close
            tokio::spawn(async move {
                let mut code = None;
                while let Some(frame) = ws_stream.next().await {
                    match frame {
                        Ok(WsMessage::Text(text)) => {
                            if !sink.emit(SocketEvent::Frame(text.as_str().to_string())) {
                                break;
                            }
                        }
                        Ok(WsMessage::Close(frame)) => {
                            code = frame.map(|f| u16::from(f.code));
                            break;
                        }
                        Ok(WsMessage::Binary(_)) => {
                            debug!("ignoring binary frame");
                        }
                        Ok(_) => {
                            // Ping/pong are answered by tungstenite
                        }
                        Err(e) => {
                            sink.emit(SocketEvent::Error(e.to_string()));
                            break;
                        }
                    }
                }
                open.mark_closed();
                sink.emit(SocketEvent::Closed { code });
            });

            Ok(handle)
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for client tests.

#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;

use crate::backoff::ReconnectPolicy;
use crate::config::StaticApiUrl;
use crate::manager::{ConnectionManager, ConnectionState};
use crate::transport::{
    EventSink, OpenFlag, Outbound, SocketEvent, SocketHandle, Transport, TransportError,
    TransportResult,
};

/// Serializes tests that touch process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Sets or removes an environment variable for the guard's lifetime.
pub struct EnvGuard {
    key: &'static str,
    original: Option<String>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub fn set(key: &'static str, value: &str) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self {
            key,
            original,
            _lock: lock,
        }
    }

    pub fn remove(key: &'static str) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = std::env::var(key).ok();
        std::env::remove_var(key);
        Self {
            key,
            original,
            _lock: lock,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(val) => std::env::set_var(self.key, val),
            None => std::env::remove_var(self.key),
        }
    }
}

/// One socket opened by [`MockTransport`].
pub struct MockSocket {
    pub url: String,
    pub sink: EventSink,
    pub open: OpenFlag,
    outbound: mpsc::UnboundedReceiver<Outbound>,
}

#[derive(Default)]
struct MockState {
    /// Time of every open attempt, successful or not.
    attempts: Vec<Instant>,
    sockets: Vec<MockSocket>,
    /// Scripted outcomes; `true` fails. Falls back to `fail_all` when empty.
    script: VecDeque<bool>,
    fail_all: bool,
    gate: Option<Arc<Notify>>,
}

/// Mock transport for testing without real sockets.
///
/// Records every open attempt and keeps each socket's event sink so tests can
/// play the server side.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Make every open attempt fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        self.lock().fail_all = fail;
    }

    /// Queue the outcome of the next open attempt.
    pub fn script(&self, fail: bool) {
        self.lock().script.push_back(fail);
    }

    /// Hold open attempts until the returned notifier fires.
    pub fn gate(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.lock().gate = Some(Arc::clone(&notify));
        notify
    }

    /// Stop holding open attempts.
    pub fn ungate(&self) {
        self.lock().gate = None;
    }

    /// Number of open attempts, including failures.
    pub fn attempt_count(&self) -> usize {
        self.lock().attempts.len()
    }

    /// Times of all open attempts.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.lock().attempts.clone()
    }

    /// Number of sockets successfully opened.
    pub fn open_count(&self) -> usize {
        self.lock().sockets.len()
    }

    /// Number of opened sockets still open.
    pub fn live_count(&self) -> usize {
        self.lock().sockets.iter().filter(|s| s.open.is_open()).count()
    }

    /// URL of socket `index`.
    pub fn url(&self, index: usize) -> String {
        self.lock().sockets[index].url.clone()
    }

    /// Check if socket `index` is still open.
    pub fn is_open(&self, index: usize) -> bool {
        self.lock().sockets[index].open.is_open()
    }

    /// Push a text frame from the server on socket `index`.
    pub fn push_frame(&self, index: usize, frame: &str) {
        let state = self.lock();
        state.sockets[index]
            .sink
            .emit(SocketEvent::Frame(frame.to_string()));
    }

    /// Report a transport error on socket `index`.
    pub fn push_error(&self, index: usize, error: &str) {
        let state = self.lock();
        state.sockets[index]
            .sink
            .emit(SocketEvent::Error(error.to_string()));
    }

    /// Close socket `index` from the server side.
    pub fn close_from_server(&self, index: usize, code: Option<u16>) {
        let state = self.lock();
        let socket = &state.sockets[index];
        socket.open.mark_closed();
        socket.sink.emit(SocketEvent::Closed { code });
    }

    /// Drain the outbound queue of socket `index`.
    pub fn outbound(&self, index: usize) -> Vec<Outbound> {
        let mut state = self.lock();
        let socket = &mut state.sockets[index];
        let mut items = Vec::new();
        while let Ok(item) = socket.outbound.try_recv() {
            items.push(item);
        }
        items
    }

    /// Text frames sent on socket `index`.
    pub fn sent_text(&self, index: usize) -> Vec<String> {
        self.outbound(index)
            .into_iter()
            .filter_map(|item| match item {
                Outbound::Text(text) => Some(text),
                Outbound::Close => None,
            })
            .collect()
    }
}

impl Transport for MockTransport {
    fn open(
        &self,
        url: &str,
        sink: EventSink,
    ) -> Pin<Box<dyn Future<Output = TransportResult<SocketHandle>> + Send + '_>> {
        let url = url.to_string();
        Box::pin(async move {
            let gate = self.lock().gate.clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            let mut state = self.lock();
            state.attempts.push(Instant::now());
            let fail = state.script.pop_front().unwrap_or(state.fail_all);
            if fail {
                return Err(TransportError::ConnectionFailed("mock failure".into()));
            }

            let (handle, outbound, open) = SocketHandle::pair();
            state.sockets.push(MockSocket {
                url,
                sink,
                open,
                outbound,
            });
            Ok(handle)
        })
    }
}

/// Policy with a short base delay for tests.
pub fn test_policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy::new(Duration::from_millis(100), max_attempts)
}

/// Manager over a mock transport pointed at a local backend.
pub fn mock_manager(max_attempts: u32) -> (ConnectionManager, MockTransport) {
    let transport = MockTransport::new();
    let manager = ConnectionManager::with_transport(
        StaticApiUrl::new("http://localhost:8000"),
        test_policy(max_attempts),
        transport.clone(),
    );
    (manager, transport)
}

/// Let spawned tasks run until `predicate` holds (or give up after a while).
pub async fn wait_until(mut predicate: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    predicate()
}

/// Wait until the manager reaches `state`.
pub async fn wait_for_state(manager: &ConnectionManager, state: ConnectionState) -> bool {
    wait_until(|| manager.state() == state).await
}

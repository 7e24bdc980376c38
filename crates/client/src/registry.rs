// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription registry: fans incoming messages out to handlers.
//!
//! Handlers register for one [`EventKind`] or for every kind ([`Topic::All`]).
//! A message is delivered to the handlers of its kind in registration order,
//! then to the wildcard handlers in registration order.
//!
//! Registration hands back a [`Subscription`]. It removes exactly that
//! registration when `unsubscribe()` is called or when it is dropped, so a
//! component that holds its subscriptions for its own lifetime never leaks
//! handlers.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use pulse_core::{EventKind, Message};
use tracing::error;

/// A message handler.
pub type Handler = Arc<dyn Fn(&Arc<Message>) + Send + Sync>;

/// What a handler subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Messages of one kind.
    Kind(EventKind),
    /// Every message (`*`).
    All,
}

impl From<EventKind> for Topic {
    fn from(kind: EventKind) -> Self {
        Topic::Kind(kind)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Kind(kind) => write!(f, "{}", kind),
            Topic::All => f.write_str("*"),
        }
    }
}

impl FromStr for Topic {
    type Err = pulse_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            Ok(Topic::All)
        } else {
            Ok(Topic::Kind(s.parse()?))
        }
    }
}

struct Entry {
    id: u64,
    handler: Handler,
    /// Shared with the [`Subscription`]; cleared on unsubscribe.
    live: Arc<AtomicBool>,
}

#[derive(Default)]
struct Handlers {
    next_id: u64,
    by_kind: HashMap<EventKind, Vec<Entry>>,
    wildcard: Vec<Entry>,
}

impl Handlers {
    fn slot(&mut self, topic: Topic) -> &mut Vec<Entry> {
        match topic {
            Topic::Kind(kind) => self.by_kind.entry(kind).or_default(),
            Topic::All => &mut self.wildcard,
        }
    }

    fn remove(&mut self, topic: Topic, id: u64) -> bool {
        let slot = self.slot(topic);
        let before = slot.len();
        slot.retain(|entry| entry.id != id);
        let removed = slot.len() != before;

        if let Topic::Kind(kind) = topic {
            if self.by_kind.get(&kind).is_some_and(Vec::is_empty) {
                self.by_kind.remove(&kind);
            }
        }
        removed
    }
}

/// Maps event kinds to handlers.
///
/// Cloning yields another handle on the same registry.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    handlers: Arc<Mutex<Handlers>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Handlers> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `handler` for `topic`.
    pub fn subscribe<F>(&self, topic: impl Into<Topic>, handler: F) -> Subscription
    where
        F: Fn(&Arc<Message>) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let mut handlers = self.lock();
        let id = handlers.next_id;
        handlers.next_id += 1;
        let live = Arc::new(AtomicBool::new(true));
        handlers.slot(topic).push(Entry {
            id,
            handler: Arc::new(handler),
            live: Arc::clone(&live),
        });

        Subscription {
            registry: Arc::downgrade(&self.handlers),
            topic,
            id,
            active: live,
        }
    }

    /// Deliver `message` to every matching handler.
    ///
    /// Handlers run on the calling thread with no lock held. A handler
    /// unsubscribed while the dispatch is running (even by an earlier handler)
    /// is skipped. A handler that panics is logged and skipped. Returns the
    /// number of handlers invoked.
    pub fn dispatch(&self, message: &Arc<Message>) -> usize {
        let matching: Vec<(Handler, Arc<AtomicBool>)> = {
            let handlers = self.lock();
            handlers
                .by_kind
                .get(&message.kind())
                .into_iter()
                .flatten()
                .chain(handlers.wildcard.iter())
                .map(|entry| (Arc::clone(&entry.handler), Arc::clone(&entry.live)))
                .collect()
        };

        let mut invoked = 0;
        for (handler, live) in &matching {
            if !live.load(Ordering::Acquire) {
                continue;
            }
            invoked += 1;
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(message))) {
                error!(
                    "handler for '{}' panicked: {}",
                    message.kind(),
                    panic_message(panic.as_ref())
                );
            }
        }

        invoked
    }

    /// Number of handlers registered for exactly `topic`.
    pub fn handler_count(&self, topic: Topic) -> usize {
        let handlers = self.lock();
        match topic {
            Topic::Kind(kind) => handlers.by_kind.get(&kind).map_or(0, Vec::len),
            Topic::All => handlers.wildcard.len(),
        }
    }

    /// Check if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        let handlers = self.lock();
        handlers.wildcard.is_empty() && handlers.by_kind.values().all(Vec::is_empty)
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.lock();
        let by_kind: HashMap<EventKind, usize> = handlers
            .by_kind
            .iter()
            .map(|(kind, entries)| (*kind, entries.len()))
            .collect();
        f.debug_struct("SubscriptionRegistry")
            .field("by_kind", &by_kind)
            .field("wildcard", &handlers.wildcard.len())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Capability to remove one registration.
///
/// Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    registry: Weak<Mutex<Handlers>>,
    topic: Topic,
    id: u64,
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// The topic this subscription listens to.
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Check if the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Remove the handler. Later calls do nothing.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(handlers) = self.registry.upgrade() {
            let mut handlers = handlers.lock().unwrap_or_else(|e| e.into_inner());
            handlers.remove(self.topic, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Synchronous publish/subscribe notifications for graph changes.

use crate::connection::{Connection, ConnectionId};
use crate::node::{NodeId, SharedNode};
use crate::socket::{Socket, SocketKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Kind of a graph event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A node was added
    NodeCreated,
    /// A node was removed
    NodeRemoved,
    /// A connection was added
    ConnectionAdded,
    /// A connection was removed
    ConnectionRemoved,
}

impl EventKind {
    /// Stable name used by observers outside the process
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeCreated => "nodeCreated",
            Self::NodeRemoved => "nodeRemoved",
            Self::ConnectionAdded => "connectionAdded",
            Self::ConnectionRemoved => "connectionRemoved",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed graph change
#[derive(Debug, Clone)]
pub enum GraphEvent<S: SocketKind = Socket> {
    /// A node was added
    NodeCreated(SharedNode<S>),
    /// A node was removed
    NodeRemoved(NodeId),
    /// A connection was added
    ConnectionAdded(Arc<Connection>),
    /// A connection was removed
    ConnectionRemoved(ConnectionId),
}

impl<S: SocketKind> GraphEvent<S> {
    /// Kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NodeCreated(_) => EventKind::NodeCreated,
            Self::NodeRemoved(_) => EventKind::NodeRemoved,
            Self::ConnectionAdded(_) => EventKind::ConnectionAdded,
            Self::ConnectionRemoved(_) => EventKind::ConnectionRemoved,
        }
    }
}

/// Event handler
pub type EventHandler<S = Socket> = Arc<dyn Fn(&GraphEvent<S>) + Send + Sync>;

/// Notifier keyed by event kind.
///
/// Handlers run on the publishing thread, in registration order, and
/// [`publish`](Self::publish) returns once all of them are done. A handler
/// that panics unwinds into the publisher and the remaining handlers for
/// that event are skipped.
pub struct EventBus<S: SocketKind = Socket> {
    listeners: Mutex<HashMap<EventKind, Vec<EventHandler<S>>>>,
}

impl<S: SocketKind> EventBus<S> {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Append a handler for `kind`
    pub fn subscribe(&self, kind: EventKind, handler: impl Fn(&GraphEvent<S>) + Send + Sync + 'static) {
        tracing::debug!(%kind, "event listener registered");
        self.listeners
            .lock()
            .entry(kind)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Deliver `event` to every handler registered for its kind
    pub fn publish(&self, event: &GraphEvent<S>) {
        let kind = event.kind();
        // Handlers run unlocked so they can subscribe or publish themselves.
        let handlers = match self.listeners.lock().get(&kind) {
            Some(handlers) => handlers.clone(),
            None => return,
        };

        for handler in &handlers {
            tracing::debug!(%kind, "dispatching event");
            handler(event);
        }
    }

    /// Number of handlers registered for `kind`
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.listeners.lock().get(&kind).map_or(0, Vec::len)
    }
}

impl<S: SocketKind> Default for EventBus<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SocketKind> fmt::Debug for EventBus<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.lock();
        let mut counts: Vec<_> = listeners.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        counts.sort_unstable();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

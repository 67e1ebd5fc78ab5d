// SPDX-License-Identifier: MIT OR Apache-2.0
//! The graph registry: authoritative node and connection collections.

use crate::connection::{Connection, ConnectionId};
use crate::events::{EventBus, GraphEvent};
use crate::node::{GraphNode, NodeId, SharedNode};
use crate::socket::{Socket, SocketKind};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Node and connection collections, in insertion order
pub struct GraphData<S: SocketKind = Socket> {
    /// Nodes by id
    pub nodes: IndexMap<NodeId, SharedNode<S>>,
    /// Connections by id
    pub connections: IndexMap<ConnectionId, Arc<Connection>>,
}

impl<S: SocketKind> GraphData<S> {
    /// Create empty collections
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Connections whose source or target node is not in `nodes`
    pub fn dangling_connections(&self) -> Vec<ConnectionId> {
        self.connections
            .values()
            .filter(|c| !self.nodes.contains_key(&c.source) || !self.nodes.contains_key(&c.target))
            .map(|c| c.id.clone())
            .collect()
    }
}

impl<S: SocketKind> Clone for GraphData<S> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
        }
    }
}

impl<S: SocketKind> Default for GraphData<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SocketKind> fmt::Debug for GraphData<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphData")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("connections", &self.connections.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Concurrency-safe graph registry.
///
/// One readers-writer lock guards both collections. Every mutation commits
/// under the write lock, releases it, and only then publishes its event, so
/// a slow subscriber never blocks other graph access and handlers may call
/// back into the editor.
pub struct NodeEditor<S: SocketKind = Socket> {
    graph: RwLock<GraphData<S>>,
    bus: Arc<EventBus<S>>,
}

impl<S: SocketKind> NodeEditor<S> {
    /// Create an empty editor publishing on `bus`
    pub fn new(bus: Arc<EventBus<S>>) -> Self {
        Self::from_graph_data(bus, GraphData::new())
    }

    /// Install previously built collections without publishing events
    pub fn from_graph_data(bus: Arc<EventBus<S>>, data: GraphData<S>) -> Self {
        tracing::debug!(
            nodes = data.nodes.len(),
            connections = data.connections.len(),
            "node editor created"
        );
        Self {
            graph: RwLock::new(data),
            bus,
        }
    }

    /// Event bus this editor publishes on
    pub fn bus(&self) -> &Arc<EventBus<S>> {
        &self.bus
    }

    /// Add a node. Fails if its id is already registered.
    pub fn add_node(&self, node: SharedNode<S>) -> Result<SharedNode<S>, EditorError> {
        {
            let mut graph = self.graph.write();
            let id = node.id().clone();
            if graph.nodes.contains_key(&id) {
                return Err(EditorError::AlreadyExists {
                    entity: Entity::Node,
                    id: id.0,
                });
            }
            graph.nodes.insert(id, Arc::clone(&node));
        }

        tracing::trace!(node = %node.id(), "node added");
        self.bus.publish(&GraphEvent::NodeCreated(Arc::clone(&node)));
        Ok(node)
    }

    /// Remove a node. Connections that reference it are left in place.
    pub fn remove_node(&self, node_id: &NodeId) -> Result<NodeId, EditorError> {
        if self.graph.write().nodes.shift_remove(node_id).is_none() {
            return Err(EditorError::not_found(Entity::Node, node_id.as_str()));
        }

        tracing::trace!(node = %node_id, "node removed");
        self.bus.publish(&GraphEvent::NodeRemoved(node_id.clone()));
        Ok(node_id.clone())
    }

    /// Get a node by ID
    pub fn get_node(&self, node_id: &NodeId) -> Result<SharedNode<S>, EditorError> {
        self.graph
            .read()
            .nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| EditorError::not_found(Entity::Node, node_id.as_str()))
    }

    /// Get all nodes, in insertion order
    pub fn get_nodes(&self) -> Vec<SharedNode<S>> {
        self.graph.read().nodes.values().cloned().collect()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.read().nodes.len()
    }

    /// Add a connection. Fails if its id is already registered.
    pub fn add_connection(&self, connection: Connection) -> Result<Arc<Connection>, EditorError> {
        let connection = Arc::new(connection);
        {
            let mut graph = self.graph.write();
            if graph.connections.contains_key(&connection.id) {
                return Err(EditorError::AlreadyExists {
                    entity: Entity::Connection,
                    id: connection.id.0.clone(),
                });
            }
            graph
                .connections
                .insert(connection.id.clone(), Arc::clone(&connection));
        }

        tracing::trace!(connection = %connection.id, "connection added");
        self.bus
            .publish(&GraphEvent::ConnectionAdded(Arc::clone(&connection)));
        Ok(connection)
    }

    /// Remove a connection
    pub fn remove_connection(&self, connection_id: &ConnectionId) -> Result<ConnectionId, EditorError> {
        if self
            .graph
            .write()
            .connections
            .shift_remove(connection_id)
            .is_none()
        {
            return Err(EditorError::not_found(
                Entity::Connection,
                connection_id.as_str(),
            ));
        }

        tracing::trace!(connection = %connection_id, "connection removed");
        self.bus
            .publish(&GraphEvent::ConnectionRemoved(connection_id.clone()));
        Ok(connection_id.clone())
    }

    /// Get a connection by ID
    pub fn get_connection(&self, connection_id: &ConnectionId) -> Result<Arc<Connection>, EditorError> {
        self.graph
            .read()
            .connections
            .get(connection_id)
            .cloned()
            .ok_or_else(|| EditorError::not_found(Entity::Connection, connection_id.as_str()))
    }

    /// Get all connections, in insertion order
    pub fn get_connections(&self) -> Vec<Arc<Connection>> {
        self.graph.read().connections.values().cloned().collect()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.graph.read().connections.len()
    }

    /// Connections ending at `node_id` on one of `input_keys`
    pub fn get_connections_to<K: AsRef<str>>(&self, node_id: &NodeId, input_keys: &[K]) -> Vec<Arc<Connection>> {
        self.graph
            .read()
            .connections
            .values()
            .filter(|c| {
                c.target == *node_id
                    && input_keys.iter().any(|k| k.as_ref() == c.target_input)
            })
            .cloned()
            .collect()
    }

    /// Connections starting or ending at `node_id`
    pub fn connections_for_node(&self, node_id: &NodeId) -> Vec<Arc<Connection>> {
        self.graph
            .read()
            .connections
            .values()
            .filter(|c| c.involves_node(node_id))
            .cloned()
            .collect()
    }

    /// Remove every connection whose source or target node is gone.
    ///
    /// Publishes one removal event per connection and returns their ids.
    pub fn prune_dangling(&self) -> Vec<ConnectionId> {
        let removed = {
            let mut graph = self.graph.write();
            let dangling = graph.dangling_connections();
            for id in &dangling {
                graph.connections.shift_remove(id);
            }
            dangling
        };

        for id in &removed {
            tracing::warn!(connection = %id, "pruned dangling connection");
            self.bus.publish(&GraphEvent::ConnectionRemoved(id.clone()));
        }
        removed
    }

    /// Copy of the current collections (nodes and connections are shared)
    pub fn graph_data(&self) -> GraphData<S> {
        self.graph.read().clone()
    }
}

impl<S: SocketKind> fmt::Debug for NodeEditor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEditor")
            .field("graph", &*self.graph.read())
            .field("bus", &self.bus)
            .finish()
    }
}

/// Entity kind named in an [`EditorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A node
    Node,
    /// A connection
    Connection,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => f.write_str("node"),
            Self::Connection => f.write_str("connection"),
        }
    }
}

/// Error from a registry operation
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EditorError {
    /// The id is already registered
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// Entity kind
        entity: Entity,
        /// Offending id
        id: String,
    },

    /// The id is not registered
    #[error("{entity} does not exist: {id}")]
    NotFound {
        /// Entity kind
        entity: Entity,
        /// Missing id
        id: String,
    },
}

impl EditorError {
    fn not_found(entity: Entity, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_owned(),
        }
    }
}

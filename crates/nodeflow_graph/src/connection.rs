// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::id::uid;
use crate::node::{Node, NodeId};
use crate::socket::SocketKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(uid())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which end of a connection a reference belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Source node output
    Source,
    /// Target node input
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source output"),
            Self::Target => f.write_str("target input"),
        }
    }
}

/// Endpoint ids carried in a connection's identity block.
///
/// Stored data may leave these empty or disagree with the connection's own
/// endpoints; they are kept verbatim so the block re-encodes unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseEndpoints {
    /// Source node id as stored
    pub source: NodeId,
    /// Target node id as stored
    pub target: NodeId,
}

impl Default for BaseEndpoints {
    /// Both ids empty
    fn default() -> Self {
        Self {
            source: NodeId(String::new()),
            target: NodeId(String::new()),
        }
    }
}

/// A connection from a node output to a node input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub source: NodeId,
    /// Output slot key on the source node
    pub source_output: String,
    /// Target node ID
    pub target: NodeId,
    /// Input slot key on the target node
    pub target_input: String,
    /// Identity-block endpoints
    pub base: BaseEndpoints,
}

impl Connection {
    /// Connect `source`'s output `source_output` to `target`'s input
    /// `target_input`.
    ///
    /// Both slot keys must be registered on their nodes right now.
    pub fn new<S: SocketKind>(
        source: &Node<S>,
        source_output: &str,
        target: &Node<S>,
        target_input: &str,
    ) -> Result<Self, ConnectionError> {
        if !source.has_output(source_output) {
            return Err(ConnectionError::InvalidReference {
                node: source.id.clone(),
                endpoint: Endpoint::Source,
                key: source_output.to_owned(),
            });
        }
        if !target.has_input(target_input) {
            return Err(ConnectionError::InvalidReference {
                node: target.id.clone(),
                endpoint: Endpoint::Target,
                key: target_input.to_owned(),
            });
        }

        Ok(Self::from_parts(
            ConnectionId::new(),
            source.id.clone(),
            source_output,
            target.id.clone(),
            target_input,
        ))
    }

    /// Build a connection from stored fields without checking the nodes.
    ///
    /// The identity-block endpoints mirror `source` and `target`.
    pub fn from_parts(
        id: ConnectionId,
        source: NodeId,
        source_output: impl Into<String>,
        target: NodeId,
        target_input: impl Into<String>,
    ) -> Self {
        let base = BaseEndpoints {
            source: source.clone(),
            target: target.clone(),
        };
        Self {
            id,
            source,
            source_output: source_output.into(),
            target,
            target_input: target_input.into(),
            base,
        }
    }

    /// Replace the identity-block endpoints
    pub fn with_base(mut self, base: BaseEndpoints) -> Self {
        self.base = base;
        self
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: &NodeId) -> bool {
        self.source == *node_id || self.target == *node_id
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// A slot key named by the connection is not registered on its node
    #[error("Node {node} has no {endpoint} with key {key:?}")]
    InvalidReference {
        /// Node that lacks the slot
        node: NodeId,
        /// Which end was wrong
        endpoint: Endpoint,
        /// Missing slot key
        key: String,
    },
}

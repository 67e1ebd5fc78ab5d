// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.
//!
//! A [`Node`] is the shared base every node kind is built on: an id plus
//! three concurrent slot registries (inputs, outputs, controls). Behavior
//! is layered on through the [`Executor`] and [`DataProvider`]
//! capabilities, which external drivers invoke; this crate never runs
//! them on its own.

use crate::control::InputControl;
use crate::id::uid;
use crate::port::{Input, Output};
use crate::socket::{Socket, SocketKind};
use crate::sync_map::SyncMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(uid())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values exchanged by data providers, keyed by slot
pub type DataMap = BTreeMap<String, Value>;

/// Control-flow capability
pub trait Executor {
    /// React to a trigger arriving on `trigger`, calling `forward` with the
    /// key of each output to fire next.
    fn execute(&self, trigger: &str, forward: &mut dyn FnMut(&str)) {
        let _ = trigger;
        forward("exec");
    }
}

/// Data-flow capability
pub trait DataProvider {
    /// Produce output values. `pull_inputs` fetches upstream values on demand.
    fn data(&self, pull_inputs: &dyn Fn() -> DataMap) -> DataMap {
        pull_inputs()
    }
}

/// A node kind stored in the editor
pub trait GraphNode<S: SocketKind = Socket>: Executor + DataProvider + fmt::Debug + Send + Sync {
    /// Shared base holding id and slots
    fn node(&self) -> &Node<S>;

    /// Node id
    fn id(&self) -> &NodeId {
        &self.node().id
    }
}

/// Node as stored by the editor and carried by events
pub type SharedNode<S = Socket> = Arc<dyn GraphNode<S>>;

/// Base node: identity plus input, output and control slots
pub struct Node<S: SocketKind = Socket> {
    /// Unique node ID
    pub id: NodeId,
    /// Input slots by key
    pub inputs: SyncMap<Input<S>>,
    /// Output slots by key
    pub outputs: SyncMap<Output<S>>,
    /// Controls by key
    pub controls: SyncMap<Arc<InputControl>>,
    selected: RwLock<Option<bool>>,
}

impl<S: SocketKind> Node<S> {
    /// Create an empty node with a fresh id
    pub fn new() -> Self {
        Self::with_id(NodeId::new())
    }

    /// Create an empty node with a known id
    pub fn with_id(id: NodeId) -> Self {
        Self {
            id,
            inputs: SyncMap::new(),
            outputs: SyncMap::new(),
            controls: SyncMap::new(),
            selected: RwLock::new(None),
        }
    }

    /// Check for an input slot
    pub fn has_input(&self, key: &str) -> bool {
        self.inputs.contains_key(key)
    }

    /// Get a copy of an input slot
    pub fn input(&self, key: &str) -> Option<Input<S>> {
        self.inputs.get(key)
    }

    /// Add or replace an input slot
    pub fn add_input(&self, key: impl Into<String>, input: Input<S>) {
        self.inputs.add(key, input);
    }

    /// Remove an input slot
    pub fn remove_input(&self, key: &str) {
        self.inputs.delete(key);
    }

    /// Check for an output slot
    pub fn has_output(&self, key: &str) -> bool {
        self.outputs.contains_key(key)
    }

    /// Get a copy of an output slot
    pub fn output(&self, key: &str) -> Option<Output<S>> {
        self.outputs.get(key)
    }

    /// Add or replace an output slot
    pub fn add_output(&self, key: impl Into<String>, output: Output<S>) {
        self.outputs.add(key, output);
    }

    /// Remove an output slot
    pub fn remove_output(&self, key: &str) {
        self.outputs.delete(key);
    }

    /// Check for a control
    pub fn has_control(&self, key: &str) -> bool {
        self.controls.contains_key(key)
    }

    /// Get a handle to a control
    pub fn control(&self, key: &str) -> Option<Arc<InputControl>> {
        self.controls.get(key)
    }

    /// Add or replace a control
    pub fn add_control(&self, key: impl Into<String>, control: InputControl) -> Arc<InputControl> {
        let control = Arc::new(control);
        self.controls.add(key, Arc::clone(&control));
        control
    }

    /// Remove a control
    pub fn remove_control(&self, key: &str) {
        self.controls.delete(key);
    }

    /// Selection state; `None` means never set
    pub fn selected(&self) -> Option<bool> {
        *self.selected.read()
    }

    /// Set or clear the selection state
    pub fn set_selected(&self, selected: Option<bool>) {
        *self.selected.write() = selected;
    }
}

impl<S: SocketKind> Default for Node<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SocketKind> fmt::Debug for Node<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("inputs", &self.inputs.keys())
            .field("outputs", &self.outputs.keys())
            .field("controls", &self.controls.keys())
            .field("selected", &self.selected())
            .finish()
    }
}

impl<S: SocketKind> Executor for Node<S> {}

impl<S: SocketKind> DataProvider for Node<S> {}

impl<S: SocketKind> GraphNode<S> for Node<S> {
    fn node(&self) -> &Node<S> {
        self
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph data model for visual editors.
//!
//! This crate is the backend a node-based editor UI talks to:
//! - Entities: nodes with input/output slots and controls, ports typed by
//!   sockets, and connections between slots
//! - A concurrency-safe registry ([`NodeEditor`]) that owns the graph
//! - A synchronous event bus announcing every structural change
//! - A lossless plain-data (JSON) codec
//!
//! ## Architecture
//!
//! Everything is generic over a [`SocketKind`], so applications can use the
//! open string-tagged [`Socket`] or their own closed socket set. Node
//! behavior plugs in through the [`Executor`] and [`DataProvider`]
//! capabilities; running a graph is left to external drivers.

pub mod cache;
pub mod connection;
pub mod control;
pub mod editor;
pub mod events;
pub mod id;
pub mod node;
pub mod nodes;
pub mod port;
pub mod serializer;
pub mod socket;
pub mod sync_map;

pub use cache::DataCache;
pub use connection::{BaseEndpoints, Connection, ConnectionError, ConnectionId};
pub use control::{BaseControl, Control, ControlId, InputControl, InputControlOptions, InputControlType};
pub use editor::{EditorError, GraphData, NodeEditor};
pub use events::{EventBus, EventKind, GraphEvent};
pub use node::{DataMap, DataProvider, Executor, GraphNode, Node, NodeId, SharedNode};
pub use port::{Input, InputSide, Output, OutputSide, Port, PortId, Slot, SlotError};
pub use serializer::{DecodeError, GraphRecord};
pub use socket::{Socket, SocketKind};
pub use sync_map::SyncMap;

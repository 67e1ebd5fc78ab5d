// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plain-data (JSON) encoding of a graph.
//!
//! The wire shape is described by the `*Record` types. Encoding walks the
//! editor and fills records; record maps are `BTreeMap`s and struct fields
//! have a fixed order, so [`to_string`] is canonical and byte-stable.
//!
//! Decoding is schema-driven and all-or-nothing: every node, slot and
//! control entry is decoded on its own so a failure names its exact place
//! (`nodes.<id>.inputs.<key>`), and nothing is handed to an editor until
//! the whole tree decoded cleanly.

use crate::connection::{BaseEndpoints, Connection, ConnectionId};
use crate::control::{BaseControl, Control, ControlId, InputControl, InputControlOptions, InputControlType};
use crate::editor::{GraphData, NodeEditor};
use crate::events::EventBus;
use crate::node::{GraphNode, Node, NodeId, SharedNode};
use crate::port::{Port, PortId, Slot};
use crate::socket::SocketKind;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Whole graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Connections by id
    pub connections: BTreeMap<String, ConnectionRecord>,
    /// Nodes by id
    pub nodes: BTreeMap<String, NodeRecord>,
}

/// Node identity block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBaseRecord {
    /// Node id, equal to the map key
    pub id: String,
}

/// One node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Identity block
    pub base: NodeBaseRecord,
    /// Input slots by key
    pub inputs: BTreeMap<String, SlotRecord>,
    /// Output slots by key
    pub outputs: BTreeMap<String, SlotRecord>,
    /// Controls by key
    pub controls: BTreeMap<String, InputControlRecord>,
    /// Selection state; `null` when never set
    pub selected: Option<bool>,
}

/// An input or output slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord {
    /// Slot port
    pub port: PortRecord,
    /// Inline control
    pub control: Option<ControlRecord>,
    /// Whether the inline control is visible
    #[serde(rename = "showControl")]
    pub show_control: bool,
    /// Slot label
    pub label: String,
}

/// A port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    /// Port id
    pub id: String,
    /// Port label
    pub label: String,
    /// Sort index
    #[serde(deserialize_with = "integral_index")]
    pub index: i64,
    /// Whether several connections may end here
    #[serde(rename = "multipleConnections")]
    pub multiple_connections: bool,
    /// Socket tag
    pub socket: SocketRecord,
}

/// A socket tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketRecord {
    /// Socket name
    pub name: String,
}

/// Control identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRecord {
    /// Control id
    pub id: String,
    /// Sort index
    #[serde(deserialize_with = "integral_index")]
    pub index: i64,
}

/// A value-carrying node control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputControlRecord {
    /// Identity
    pub control: ControlRecord,
    /// Widget kind
    #[serde(rename = "type")]
    pub kind: InputControlType,
    /// Construction options
    pub options: InputControlOptionsRecord,
    /// Read-only flag
    pub readonly: Option<bool>,
    /// Current value
    pub value: Value,
}

/// Stored part of [`InputControlOptions`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputControlOptionsRecord {
    /// Read-only flag
    pub readonly: Option<bool>,
    /// Initial value
    pub initial: Value,
}

/// Connection identity block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionBaseRecord {
    /// Connection id, equal to the map key
    pub id: String,
    /// Source node id as stored; may be empty
    #[serde(default)]
    pub source: String,
    /// Target node id as stored; may be empty
    #[serde(default)]
    pub target: String,
}

/// One connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Identity block
    pub base: ConnectionBaseRecord,
    /// Source node id
    pub source: String,
    /// Output key on the source node
    #[serde(rename = "sourceOutput")]
    pub source_output: String,
    /// Target node id
    pub target: String,
    /// Input key on the target node
    #[serde(rename = "targetInput")]
    pub target_input: String,
}

/// Error while decoding plain data
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Nothing to decode
    #[error("Empty input given")]
    Empty,

    /// Input is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field is missing or has the wrong shape
    #[error("Malformed input at {path}: {reason}")]
    MalformedInput {
        /// Dotted location of the offending entry
        path: String,
        /// What was wrong
        reason: String,
    },
}

impl DecodeError {
    fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Top level with entries left undecoded
#[derive(Deserialize)]
struct RawGraph {
    nodes: BTreeMap<String, Value>,
    connections: BTreeMap<String, Value>,
}

/// Node with slot entries left undecoded
#[derive(Deserialize)]
struct RawNode {
    base: Option<NodeBaseRecord>,
    inputs: BTreeMap<String, Value>,
    outputs: BTreeMap<String, Value>,
    controls: BTreeMap<String, Value>,
    selected: Option<bool>,
}

/// Connection whose identity block may be absent
#[derive(Deserialize)]
struct RawConnection {
    base: Option<ConnectionBaseRecord>,
    source: String,
    #[serde(rename = "sourceOutput")]
    source_output: String,
    target: String,
    #[serde(rename = "targetInput")]
    target_input: String,
}

/// Accept integers and integral floats such as `1.0`
fn integral_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(index) = number.as_i64() {
        return Ok(index);
    }
    match number.as_f64() {
        Some(index) if index.fract() == 0.0 && index.abs() < 2f64.powi(53) => Ok(index as i64),
        _ => Err(D::Error::custom(format!("index {number} is not an integer"))),
    }
}

fn decode_at<T: DeserializeOwned>(value: Value, path: &str) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|e| DecodeError::malformed(path, e.to_string()))
}

fn decode_port<S: SocketKind>(record: PortRecord, path: &str) -> Result<Port<S>, DecodeError> {
    let socket = S::from_name(&record.socket.name).ok_or_else(|| {
        DecodeError::malformed(
            format!("{path}.port.socket.name"),
            format!("unknown socket {:?}", record.socket.name),
        )
    })?;
    Ok(Port {
        id: PortId(record.id),
        label: record.label,
        index: record.index,
        multiple_connections: record.multiple_connections,
        socket,
    })
}

fn decode_control(record: ControlRecord) -> BaseControl {
    BaseControl::with_id(ControlId(record.id), record.index)
}

/// Decode slot entries, skipping `null` ones
fn decode_slots<S: SocketKind, D>(
    entries: BTreeMap<String, Value>,
    path: &str,
) -> Result<Vec<(String, Slot<S, D>)>, DecodeError> {
    let mut slots = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let slot_path = format!("{path}.{key}");
        if value.is_null() {
            tracing::warn!(path = %slot_path, "skipping null slot");
            continue;
        }
        let SlotRecord {
            port,
            control,
            show_control,
            label,
        } = decode_at(value, &slot_path)?;
        let port = decode_port(port, &slot_path)?;
        slots.push((key, Slot::from_parts(port, control.map(decode_control), show_control, label)));
    }
    Ok(slots)
}

fn decode_node<S: SocketKind>(id: &str, value: Value) -> Result<Node<S>, DecodeError> {
    let path = format!("nodes.{id}");
    let raw: RawNode = decode_at(value, &path)?;

    if let Some(base) = &raw.base {
        if base.id != id {
            return Err(DecodeError::malformed(
                format!("{path}.base.id"),
                format!("id {:?} does not match key", base.id),
            ));
        }
    }

    let node = Node::with_id(NodeId::from(id));
    node.set_selected(raw.selected);

    let inputs = decode_slots(raw.inputs, &format!("{path}.inputs"))?;
    let outputs = decode_slots(raw.outputs, &format!("{path}.outputs"))?;
    for (key, input) in inputs {
        node.add_input(key, input);
    }
    for (key, output) in outputs {
        node.add_output(key, output);
    }

    for (key, value) in raw.controls {
        let control_path = format!("{path}.controls.{key}");
        if value.is_null() {
            tracing::warn!(path = %control_path, "skipping null control");
            continue;
        }
        let record: InputControlRecord = decode_at(value, &control_path)?;
        let options = InputControlOptions {
            readonly: record.options.readonly,
            initial: record.options.initial,
            on_change: None,
        };
        node.add_control(
            key,
            InputControl::from_parts(
                decode_control(record.control),
                record.kind,
                options,
                record.readonly,
                record.value,
            ),
        );
    }

    Ok(node)
}

fn decode_connection(id: &str, value: Value) -> Result<Connection, DecodeError> {
    let path = format!("connections.{id}");
    let raw: RawConnection = decode_at(value, &path)?;
    let base = match raw.base {
        Some(base) if base.id != id => {
            return Err(DecodeError::malformed(
                format!("{path}.base.id"),
                format!("id {:?} does not match key", base.id),
            ));
        }
        Some(base) => BaseEndpoints {
            source: NodeId(base.source),
            target: NodeId(base.target),
        },
        None => BaseEndpoints::default(),
    };
    Ok(Connection::from_parts(
        ConnectionId::from(id),
        NodeId(raw.source),
        raw.source_output,
        NodeId(raw.target),
        raw.target_input,
    )
    .with_base(base))
}

/// Rebuild graph collections from a plain-data tree
pub fn decode<S: SocketKind>(value: Value) -> Result<GraphData<S>, DecodeError> {
    if !value.is_object() {
        return Err(DecodeError::malformed("$", "expected an object"));
    }
    let raw: RawGraph = decode_at(value, "$")?;
    let mut data = GraphData::new();

    for (id, value) in raw.nodes {
        let node: SharedNode<S> = Arc::new(decode_node::<S>(&id, value)?);
        data.nodes.insert(NodeId(id), node);
    }
    for (id, value) in raw.connections {
        let connection = decode_connection(&id, value)?;
        data.connections.insert(ConnectionId(id), Arc::new(connection));
    }

    tracing::debug!(
        nodes = data.nodes.len(),
        connections = data.connections.len(),
        "graph decoded"
    );
    Ok(data)
}

/// Hydrate a fresh editor from a plain-data tree
pub fn from_value<S: SocketKind>(bus: Arc<EventBus<S>>, value: Value) -> Result<NodeEditor<S>, DecodeError> {
    Ok(NodeEditor::from_graph_data(bus, decode(value)?))
}

/// Hydrate a fresh editor from JSON text
pub fn from_str<S: SocketKind>(bus: Arc<EventBus<S>>, input: &str) -> Result<NodeEditor<S>, DecodeError> {
    from_slice(bus, input.as_bytes())
}

/// Hydrate a fresh editor from JSON bytes
pub fn from_slice<S: SocketKind>(bus: Arc<EventBus<S>>, input: &[u8]) -> Result<NodeEditor<S>, DecodeError> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }
    let value: Value = serde_json::from_slice(input)?;
    from_value(bus, value)
}

fn encode_slot<S: SocketKind, D>(slot: &Slot<S, D>) -> SlotRecord {
    let port = &slot.port;
    SlotRecord {
        port: PortRecord {
            id: port.id.0.clone(),
            label: port.label.clone(),
            index: port.index,
            multiple_connections: port.multiple_connections,
            socket: SocketRecord {
                name: port.socket.name().to_owned(),
            },
        },
        control: slot.control.as_ref().map(|c| ControlRecord {
            id: c.id.0.clone(),
            index: c.index,
        }),
        show_control: slot.show_control,
        label: slot.label.clone(),
    }
}

fn encode_control(control: &InputControl) -> InputControlRecord {
    InputControlRecord {
        control: ControlRecord {
            id: control.id().0.clone(),
            index: control.index(),
        },
        kind: control.kind().clone(),
        options: InputControlOptionsRecord {
            readonly: control.options().readonly,
            initial: control.options().initial.clone(),
        },
        readonly: control.readonly(),
        value: control.value(),
    }
}

fn encode_node<S: SocketKind>(node: &Node<S>) -> NodeRecord {
    NodeRecord {
        base: NodeBaseRecord {
            id: node.id.0.clone(),
        },
        inputs: node
            .inputs
            .snapshot()
            .into_iter()
            .map(|(key, input)| (key, encode_slot(&input)))
            .collect(),
        outputs: node
            .outputs
            .snapshot()
            .into_iter()
            .map(|(key, output)| (key, encode_slot(&output)))
            .collect(),
        controls: node
            .controls
            .snapshot()
            .into_iter()
            .map(|(key, c)| (key, encode_control(&c)))
            .collect(),
        selected: node.selected(),
    }
}

/// Flatten graph collections into records
pub fn encode_data<S: SocketKind>(data: &GraphData<S>) -> GraphRecord {
    GraphRecord {
        connections: data
            .connections
            .values()
            .map(|c| {
                let record = ConnectionRecord {
                    base: ConnectionBaseRecord {
                        id: c.id.0.clone(),
                        source: c.base.source.0.clone(),
                        target: c.base.target.0.clone(),
                    },
                    source: c.source.0.clone(),
                    source_output: c.source_output.clone(),
                    target: c.target.0.clone(),
                    target_input: c.target_input.clone(),
                };
                (c.id.0.clone(), record)
            })
            .collect(),
        nodes: data
            .nodes
            .values()
            .map(|n| (n.id().0.clone(), encode_node(n.node())))
            .collect(),
    }
}

/// Flatten an editor into records
pub fn encode<S: SocketKind>(editor: &NodeEditor<S>) -> GraphRecord {
    encode_data(&editor.graph_data())
}

/// Flatten an editor into a JSON value
pub fn to_value<S: SocketKind>(editor: &NodeEditor<S>) -> Result<Value, serde_json::Error> {
    serde_json::to_value(encode(editor))
}

/// Canonical compact JSON text
pub fn to_string<S: SocketKind>(editor: &NodeEditor<S>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&encode(editor))
}

/// Canonical indented JSON text
pub fn to_string_pretty<S: SocketKind>(editor: &NodeEditor<S>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&encode(editor))
}

impl<S: SocketKind> NodeEditor<S> {
    /// Canonical compact JSON text of this graph
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        to_string(self)
    }

    /// Hydrate a fresh editor from JSON text
    pub fn from_json(bus: Arc<EventBus<S>>, input: &str) -> Result<Self, DecodeError> {
        from_str(bus, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::port::{Input, Output};
    use crate::socket::Socket;
    use parking_lot::Mutex;
    use serde_json::json;

    const FIXTURE: &str = r#"{"connections":{"c1":{"base":{"id":"c1","source":"n0","target":"n1"},"source":"n0","sourceOutput":"exec","target":"n1","targetInput":"exec"}},"nodes":{"n0":{"base":{"id":"n0"},"inputs":{"input1":{"port":{"id":"p1","label":"Input 1","index":0,"multipleConnections":true,"socket":{"name":"text"}},"control":{"id":"k1","index":0},"showControl":true,"label":"Input 1"}},"outputs":{"exec":{"port":{"id":"p2","label":"exec","index":1,"multipleConnections":false,"socket":{"name":"exec"}},"control":null,"showControl":false,"label":"exec"}},"controls":{"valueCtrl":{"control":{"id":"k2","index":0},"type":"text","options":{"readonly":false,"initial":"hello"},"readonly":false,"value":"world"}},"selected":null},"n1":{"base":{"id":"n1"},"inputs":{"exec":{"port":{"id":"p3","label":"exec","index":0,"multipleConnections":true,"socket":{"name":"exec"}},"control":{"id":"k3","index":0},"showControl":true,"label":"exec"}},"outputs":{},"controls":{},"selected":true}}}"#;

    /// Written by an earlier editor: connection identity blocks carry empty
    /// endpoint ids.
    const EMPTY_BASE_FIXTURE: &str = r#"{"connections":{"0494bcf7073d2072":{"base":{"id":"0494bcf7073d2072","source":"","target":""},"source":"c9db91bfedfe1693","sourceOutput":"exec","target":"0ed475094cc9b7d2","targetInput":"exec"}},"nodes":{"0ed475094cc9b7d2":{"base":{"id":"0ed475094cc9b7d2"},"inputs":{"exec":{"port":{"id":"6b37f68146f6587c","label":"exec","index":0,"multipleConnections":true,"socket":{"name":"exec"}},"control":{"id":"45daa42ebe70810b","index":0},"showControl":true,"label":"exec"}},"outputs":{"exec":{"port":{"id":"1cf48a063b31320c","label":"exec","index":0,"multipleConnections":true,"socket":{"name":"exec"}},"control":{"id":"abc1d37fb47ebbfc","index":0},"showControl":true,"label":"exec"}},"controls":{},"selected":null},"773888f0b4e18562":{"base":{"id":"773888f0b4e18562"},"inputs":{},"outputs":{},"controls":{},"selected":null},"c0369f691e59a00d":{"base":{"id":"c0369f691e59a00d"},"inputs":{},"outputs":{},"controls":{},"selected":null},"c9db91bfedfe1693":{"base":{"id":"c9db91bfedfe1693"},"inputs":{"input1":{"port":{"id":"3bc9dea1d9ad2c27","label":"Input 1 Label","index":0,"multipleConnections":true,"socket":{"name":"Socket Name 1"}},"control":{"id":"bb1b6bbfb661df31","index":0},"showControl":true,"label":"Input 1 Label"},"input2":{"port":{"id":"3bac569b6585d626","label":"Input 2 Label","index":0,"multipleConnections":true,"socket":{"name":"Socket Name 2"}},"control":{"id":"bc401c31a2f04743","index":0},"showControl":true,"label":"Input 2 Label"}},"outputs":{"exec":{"port":{"id":"ec1b539c0d3b0b47","label":"exec","index":0,"multipleConnections":true,"socket":{"name":"exec"}},"control":{"id":"ff52a7712d420f57","index":0},"showControl":true,"label":"exec"},"output":{"port":{"id":"f31510a0a5336a2f","label":"Output","index":0,"multipleConnections":true,"socket":{"name":"output"}},"control":{"id":"c2f227691b1f2b05","index":0},"showControl":true,"label":"Output"}},"controls":{"valueCtrl":{"control":{"id":"1eb0f2ee8f361576","index":0},"type":"text","options":{"readonly":false,"initial":"hello"},"readonly":false,"value":"hello"}},"selected":null},"e5c780721534302e":{"base":{"id":"e5c780721534302e"},"inputs":{},"outputs":{},"controls":{},"selected":null}}}"#;

    fn bus() -> Arc<EventBus> {
        Arc::new(EventBus::new())
    }

    fn malformed_path(err: DecodeError) -> String {
        match err {
            DecodeError::MalformedInput { path, .. } => path,
            other => panic!("expected malformed input, got {other:?}"),
        }
    }

    fn built_graph() -> NodeEditor {
        let editor = NodeEditor::new(bus());
        let n0: Arc<Node> = Arc::new(Node::new());
        n0.add_control(
            "valueCtrl",
            InputControl::new(
                InputControlType::Text,
                InputControlOptions::new("hello").readonly(false),
            ),
        );
        n0.add_input("input1", Input::new(Socket::new("Socket Name 1"), "Input 1 Label", true));
        n0.add_input("input2", Input::new(Socket::new("Socket Name 2"), "Input 2 Label", true));
        n0.add_output("output", Output::new(Socket::new("output"), "Output", true));
        n0.add_output("exec", Output::new(Socket::new("exec"), "exec", true));

        let n1: Arc<Node> = Arc::new(Node::new());
        n1.add_input("exec", Input::new(Socket::new("exec"), "exec", true));
        n1.add_output("exec", Output::new(Socket::new("exec"), "exec", true));
        n1.set_selected(Some(false));

        editor.add_node(n0.clone()).unwrap();
        editor.add_node(n1.clone()).unwrap();
        for _ in 0..3 {
            editor.add_node(Arc::new(Node::new())).unwrap();
        }
        editor
            .add_connection(Connection::new(&n0, "exec", &n1, "exec").unwrap())
            .unwrap();
        editor
    }

    #[test]
    fn test_fixture_round_trips_byte_for_byte() {
        let editor = from_str(bus(), FIXTURE).unwrap();
        assert_eq!(editor.node_count(), 2);
        assert_eq!(editor.connection_count(), 1);
        assert_eq!(to_string(&editor).unwrap(), FIXTURE);
    }

    #[test]
    fn test_fixture_fields() {
        let editor = from_str(bus(), FIXTURE).unwrap();
        let n0 = editor.get_node(&NodeId::from("n0")).unwrap();
        let node = n0.node();

        let input = node.input("input1").unwrap();
        assert_eq!(input.port.id, PortId::from("p1"));
        assert_eq!(input.port.socket, Socket::new("text"));
        assert_eq!(input.control.unwrap().id, ControlId::from("k1"));

        let output = node.output("exec").unwrap();
        assert_eq!(output.port.index, 1);
        assert!(!output.port.multiple_connections);
        assert!(output.control.is_none());
        assert!(!output.show_control);

        let control = node.control("valueCtrl").unwrap();
        assert_eq!(control.kind(), &InputControlType::Text);
        assert_eq!(control.value(), json!("world"));
        assert_eq!(control.options().initial, json!("hello"));
        assert_eq!(node.selected(), None);

        let n1 = editor.get_node(&NodeId::from("n1")).unwrap();
        assert_eq!(n1.node().selected(), Some(true));

        let conn = editor.get_connection(&ConnectionId::from("c1")).unwrap();
        assert_eq!(conn.source, NodeId::from("n0"));
        assert_eq!(conn.target_input, "exec");
    }

    #[test]
    fn test_built_graph_round_trip() {
        let editor = built_graph();
        let first = to_string(&editor).unwrap();

        let restored = from_str(bus(), &first).unwrap();
        assert_eq!(to_string(&restored).unwrap(), first);
        assert_eq!(to_value(&restored).unwrap(), to_value(&editor).unwrap());

        let mut original_ids: Vec<_> = editor.get_nodes().iter().map(|n| n.id().clone()).collect();
        let mut restored_ids: Vec<_> = restored.get_nodes().iter().map(|n| n.id().clone()).collect();
        original_ids.sort();
        restored_ids.sort();
        assert_eq!(original_ids, restored_ids);

        for node in editor.get_nodes() {
            let twin = restored.get_node(node.id()).unwrap();
            assert_eq!(node.node().inputs.snapshot(), twin.node().inputs.snapshot());
            assert_eq!(node.node().outputs.snapshot(), twin.node().outputs.snapshot());
            assert_eq!(node.node().controls.keys(), twin.node().controls.keys());
            assert_eq!(node.node().selected(), twin.node().selected());
        }

        let conns = editor.get_connections();
        let twin = restored.get_connection(&conns[0].id).unwrap();
        assert_eq!(*twin, *conns[0]);
    }

    #[test]
    fn test_selected_null_differs_from_false() {
        let value = to_value(&built_graph()).unwrap();
        let selected: Vec<&Value> = value["nodes"]
            .as_object()
            .unwrap()
            .values()
            .map(|n| &n["selected"])
            .collect();
        assert!(selected.contains(&&Value::Null));
        assert!(selected.contains(&&json!(false)));
    }

    #[test]
    fn test_hydration_publishes_nothing() {
        let bus = bus();
        let count = Arc::new(Mutex::new(0));
        {
            let count = Arc::clone(&count);
            bus.subscribe(EventKind::NodeCreated, move |_| *count.lock() += 1);
        }
        let editor = from_str(Arc::clone(&bus), FIXTURE).unwrap();
        assert_eq!(*count.lock(), 0);

        editor.add_node(Arc::new(Node::new())).unwrap();
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_empty_and_invalid_input() {
        assert!(matches!(from_str(bus(), ""), Err(DecodeError::Empty)));
        assert!(matches!(from_str(bus(), "  \n"), Err(DecodeError::Empty)));
        assert!(matches!(from_str(bus(), "{nodes"), Err(DecodeError::Json(_))));
        assert_eq!(malformed_path(from_str(bus(), "[]").unwrap_err()), "$");
        assert_eq!(malformed_path(from_str(bus(), r#"{"nodes":{}}"#).unwrap_err()), "$");
    }

    #[test]
    fn test_empty_graph() {
        let editor = from_str(bus(), r#"{"nodes":{},"connections":{}}"#).unwrap();
        assert_eq!(editor.node_count(), 0);
        assert_eq!(to_string(&editor).unwrap(), r#"{"connections":{},"nodes":{}}"#);
    }

    #[test]
    fn test_missing_slot_field_names_its_place() {
        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["nodes"]["n0"]["inputs"]["input1"]
            .as_object_mut()
            .unwrap()
            .remove("label");

        match decode::<Socket>(value).unwrap_err() {
            DecodeError::MalformedInput { path, reason } => {
                assert_eq!(path, "nodes.n0.inputs.input1");
                assert!(reason.contains("label"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_wrong_field_type() {
        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["nodes"]["n1"]["inputs"]["exec"]["port"]["index"] = json!("zero");
        assert_eq!(malformed_path(decode::<Socket>(value).unwrap_err()), "nodes.n1.inputs.exec");

        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["nodes"]["n0"]["controls"]["valueCtrl"]["options"] = json!(true);
        assert_eq!(
            malformed_path(decode::<Socket>(value).unwrap_err()),
            "nodes.n0.controls.valueCtrl"
        );

        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["nodes"]["n1"]["outputs"] = json!([]);
        assert_eq!(malformed_path(decode::<Socket>(value).unwrap_err()), "nodes.n1");
    }

    #[test]
    fn test_mismatched_base_id() {
        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["nodes"]["n1"]["base"]["id"] = json!("other");
        assert_eq!(malformed_path(decode::<Socket>(value).unwrap_err()), "nodes.n1.base.id");

        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["connections"]["c1"]["base"]["id"] = json!("c2");
        assert_eq!(
            malformed_path(decode::<Socket>(value).unwrap_err()),
            "connections.c1.base.id"
        );
    }

    #[test]
    fn test_connection_missing_endpoint() {
        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["connections"]["c1"]
            .as_object_mut()
            .unwrap()
            .remove("targetInput");
        assert_eq!(malformed_path(decode::<Socket>(value).unwrap_err()), "connections.c1");
    }

    #[test]
    fn test_empty_base_fixture_round_trips_byte_for_byte() {
        let editor = from_str(bus(), EMPTY_BASE_FIXTURE).unwrap();
        assert_eq!(editor.node_count(), 5);
        assert_eq!(editor.connection_count(), 1);

        let conn = editor.get_connection(&ConnectionId::from("0494bcf7073d2072")).unwrap();
        assert_eq!(conn.source, NodeId::from("c9db91bfedfe1693"));
        assert_eq!(conn.target, NodeId::from("0ed475094cc9b7d2"));
        assert_eq!(conn.base, BaseEndpoints::default());
        assert_eq!(editor.get_connections_to(&conn.target, &["exec"]).len(), 1);

        assert_eq!(to_string(&editor).unwrap(), EMPTY_BASE_FIXTURE);
    }

    #[test]
    fn test_connection_base_endpoints_kept_verbatim() {
        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["connections"]["c1"]["base"] = json!({"id": "c1", "source": "n1", "target": ""});
        let editor = from_value(bus(), value.clone()).unwrap();

        let conn = editor.get_connection(&ConnectionId::from("c1")).unwrap();
        assert_eq!(conn.source, NodeId::from("n0"));
        assert_eq!(conn.target, NodeId::from("n1"));
        assert_eq!(conn.base.source, NodeId::from("n1"));
        assert_eq!(conn.base.target, NodeId::from(""));
        assert_eq!(to_value(&editor).unwrap(), value);
    }

    #[test]
    fn test_missing_base_blocks() {
        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["nodes"]["n1"].as_object_mut().unwrap().remove("base");
        value["connections"]["c1"].as_object_mut().unwrap().remove("base");
        let editor = from_value(bus(), value).unwrap();

        assert!(editor.get_node(&NodeId::from("n1")).is_ok());
        let conn = editor.get_connection(&ConnectionId::from("c1")).unwrap();
        assert_eq!(conn.base, BaseEndpoints::default());
        assert_eq!(conn.target, NodeId::from("n1"));

        let written = to_value(&editor).unwrap();
        assert_eq!(written["nodes"]["n1"]["base"], json!({"id": "n1"}));
        assert_eq!(
            written["connections"]["c1"]["base"],
            json!({"id": "c1", "source": "", "target": ""})
        );
    }

    #[test]
    fn test_integral_float_indexes() {
        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["nodes"]["n0"]["outputs"]["exec"]["port"]["index"] = json!(1.0);
        value["nodes"]["n0"]["controls"]["valueCtrl"]["control"]["index"] = json!(2.0);
        let editor = from_value(bus(), value).unwrap();
        let n0 = editor.get_node(&NodeId::from("n0")).unwrap();
        assert_eq!(n0.node().output("exec").unwrap().port.index, 1);
        assert_eq!(n0.node().control("valueCtrl").unwrap().index(), 2);

        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["nodes"]["n1"]["inputs"]["exec"]["port"]["index"] = json!(0.5);
        match decode::<Socket>(value).unwrap_err() {
            DecodeError::MalformedInput { path, reason } => {
                assert_eq!(path, "nodes.n1.inputs.exec");
                assert!(reason.contains("not an integer"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_null_slots_are_skipped() {
        let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
        value["nodes"]["n1"]["inputs"]["ghost"] = Value::Null;
        value["nodes"]["n1"]["controls"]["ghost"] = Value::Null;
        let data = decode::<Socket>(value).unwrap();
        let n1 = data.nodes[&NodeId::from("n1")].node();
        assert!(!n1.has_input("ghost"));
        assert!(!n1.has_control("ghost"));
        assert!(n1.has_input("exec"));
    }

    #[test]
    fn test_unknown_socket_rejected_by_closed_socket_type() {
        #[derive(Debug, Clone)]
        struct ExecOnly;

        impl SocketKind for ExecOnly {
            fn name(&self) -> &str {
                "exec"
            }

            fn from_name(name: &str) -> Option<Self> {
                (name == "exec").then_some(ExecOnly)
            }
        }

        let err = decode::<ExecOnly>(serde_json::from_str(FIXTURE).unwrap()).unwrap_err();
        assert_eq!(malformed_path(err), "nodes.n0.inputs.input1.port.socket.name");
    }

    #[test]
    fn test_dangling_connections_survive_round_trip() {
        let input = r#"{"connections":{"c":{"base":{"id":"c","source":"x","target":"y"},"source":"x","sourceOutput":"out","target":"y","targetInput":"in"}},"nodes":{}}"#;
        let editor = from_str(bus(), input).unwrap();
        assert_eq!(editor.graph_data().dangling_connections(), vec![ConnectionId::from("c")]);
        assert_eq!(to_string(&editor).unwrap(), input);
    }

    #[test]
    fn test_editor_json_helpers() {
        let editor = NodeEditor::from_json(bus(), FIXTURE).unwrap();
        assert_eq!(editor.to_json().unwrap(), FIXTURE);
        let pretty = to_string_pretty(&editor).unwrap();
        let reparsed: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(reparsed, serde_json::from_str::<Value>(FIXTURE).unwrap());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text node: exposes the current values of its controls as data.

use crate::control::{Control, InputControl, InputControlOptions, InputControlType};
use crate::node::{DataMap, DataProvider, Executor, GraphNode, Node};
use crate::port::Output;
use crate::socket::{Socket, SocketKind};

/// Node whose data output mirrors its control values
#[derive(Debug)]
pub struct TextNode<S: SocketKind = Socket> {
    base: Node<S>,
}

impl<S: SocketKind> TextNode<S> {
    /// Wrap an existing base node
    pub fn new(base: Node<S>) -> Self {
        Self { base }
    }

    /// Create a text node with one text control under `key`
    pub fn with_text(key: &str, initial: &str) -> Self {
        let base = Node::new();
        base.add_control(
            key,
            InputControl::new(InputControlType::Text, InputControlOptions::new(initial)),
        );
        Self { base }
    }

    /// Add the conventional `exec` output and a data output under `key`
    pub fn with_outputs(self, exec: S, data: S, key: &str) -> Self {
        self.base.add_output("exec", Output::new(exec, "exec", true));
        self.base.add_output(key, Output::new(data, key, true));
        self
    }
}

impl<S: SocketKind> Executor for TextNode<S> {
    fn execute(&self, _trigger: &str, forward: &mut dyn FnMut(&str)) {
        forward("exec");
    }
}

impl<S: SocketKind> DataProvider for TextNode<S> {
    fn data(&self, _pull_inputs: &dyn Fn() -> DataMap) -> DataMap {
        let mut values = DataMap::new();
        self.base.controls.for_each(|key, control| {
            values.insert(key.to_owned(), control.value());
        });
        tracing::debug!(node = %self.base.id, ?values, "text node data");
        values
    }
}

impl<S: SocketKind> GraphNode<S> for TextNode<S> {
    fn node(&self) -> &Node<S> {
        &self.base
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use crate::control::BaseControl;
use crate::id::uid;
use crate::socket::{Socket, SocketKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Unique identifier for a port
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub String);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(uid())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PortId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A connection point typed by a socket
#[derive(Debug, Clone, PartialEq)]
pub struct Port<S: SocketKind = Socket> {
    /// Unique port ID
    pub id: PortId,
    /// Port label
    pub label: String,
    /// Sort index among sibling ports
    pub index: i64,
    /// Whether more than one connection may end at this port
    pub multiple_connections: bool,
    /// What the port carries
    pub socket: S,
}

impl<S: SocketKind> Port<S> {
    /// Create a port with a fresh id
    pub fn new(socket: S, label: impl Into<String>, multiple_connections: bool) -> Self {
        Self {
            id: PortId::new(),
            label: label.into(),
            index: 0,
            multiple_connections,
            socket,
        }
    }
}

/// Error when editing a port slot
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlotError {
    /// The slot already carries a control
    #[error("Control already attached to port {0}")]
    ControlAlreadyAttached(PortId),
}

/// Marker for input slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSide {}

/// Marker for output slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSide {}

/// A named port slot on a node. `D` tells inputs and outputs apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<S: SocketKind, D> {
    /// Underlying port
    pub port: Port<S>,
    /// Inline control shown next to the port
    pub control: Option<BaseControl>,
    /// Whether the control is visible. Default is `true`
    pub show_control: bool,
    /// Slot label
    pub label: String,
    side: PhantomData<D>,
}

/// A named input slot on a node
pub type Input<S = Socket> = Slot<S, InputSide>;

/// A named output slot on a node
pub type Output<S = Socket> = Slot<S, OutputSide>;

impl<S: SocketKind, D> Slot<S, D> {
    /// Create a slot with a fresh port and control
    pub fn new(socket: S, label: impl Into<String>, multiple_connections: bool) -> Self {
        let label = label.into();
        Self::from_parts(
            Port::new(socket, label.clone(), multiple_connections),
            Some(BaseControl::new()),
            true,
            label,
        )
    }

    /// Build a slot from stored fields
    pub fn from_parts(
        port: Port<S>,
        control: Option<BaseControl>,
        show_control: bool,
        label: impl Into<String>,
    ) -> Self {
        Self {
            port,
            control,
            show_control,
            label: label.into(),
            side: PhantomData,
        }
    }

    /// Identity, delegated to the port
    pub fn id(&self) -> &PortId {
        &self.port.id
    }

    /// Attach a control. Fails if one is already attached.
    pub fn add_control(&mut self, control: BaseControl) -> Result<(), SlotError> {
        if self.control.is_some() {
            return Err(SlotError::ControlAlreadyAttached(self.port.id.clone()));
        }
        self.control = Some(control);
        Ok(())
    }

    /// Detach the control
    pub fn remove_control(&mut self) -> Option<BaseControl> {
        self.control.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_identity_is_port_id() {
        let input = Input::new(Socket::new("exec"), "Exec", true);
        assert_eq!(input.id(), &input.port.id);
        assert_eq!(input.label, "Exec");
        assert_eq!(input.port.label, "Exec");
        assert!(input.show_control);
        assert!(input.port.multiple_connections);
        assert_eq!(input.port.index, 0);
    }

    #[test]
    fn test_fresh_ports_get_distinct_ids() {
        let a = Output::new(Socket::new("exec"), "a", false);
        let b = Output::new(Socket::new("exec"), "b", false);
        assert_ne!(a.id(), b.id());
        assert_ne!(a.control, b.control);
    }

    #[test]
    fn test_control_attach_rules() {
        let mut input = Input::new(Socket::new("number"), "Value", false);
        let err = input.add_control(BaseControl::new()).unwrap_err();
        assert_eq!(err, SlotError::ControlAlreadyAttached(input.port.id.clone()));

        assert!(input.remove_control().is_some());
        assert!(input.control.is_none());
        input.add_control(BaseControl::new()).unwrap();
        assert!(input.control.is_some());
    }

    #[test]
    fn test_output_shares_slot_rules() {
        let mut output = Output::new(Socket::new("exec"), "exec", true);
        assert!(output.add_control(BaseControl::new()).is_err());
        let control = output.remove_control().unwrap();
        output.add_control(control.clone()).unwrap();
        assert_eq!(output.control, Some(control));

        let rebuilt: Output = Slot::from_parts(output.port.clone(), None, false, "renamed");
        assert_eq!(rebuilt.id(), output.id());
        assert!(rebuilt.control.is_none());
        assert!(!rebuilt.show_control);
    }
}

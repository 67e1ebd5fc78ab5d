// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket type tags carried by ports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability shared by every socket type: a name that classifies what a
/// port carries.
///
/// Ports, slots, nodes and the editor are generic over this trait, so an
/// application can plug in a closed set of sockets (an enum) or keep the
/// open, string-tagged [`Socket`].
pub trait SocketKind: Clone + fmt::Debug + Send + Sync + 'static {
    /// Tag written to plain data
    fn name(&self) -> &str;

    /// Rebuild a socket from its tag. `None` rejects an unknown tag.
    fn from_name(name: &str) -> Option<Self>;
}

/// Open socket type identified only by its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Socket {
    /// Socket name
    pub name: String,
}

impl Socket {
    /// Create a socket with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SocketKind for Socket {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(Self::new(name))
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identity generation for graph entities.
//!
//! Every node, port, control and connection carries an opaque string id.
//! Fresh ids come from [`uid`]; ids read back from plain data are taken
//! verbatim, so any string is a valid id. Uniqueness inside a graph is
//! enforced by the registries, never by the generator.

use uuid::Uuid;

/// Generate a fresh collision-resistant identifier (32 lowercase hex chars).
pub fn uid() -> String {
    Uuid::new_v4().simple().to_string()
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node kinds.

pub mod text;

pub use text::TextNode;

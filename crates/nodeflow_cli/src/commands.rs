// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand implementations.

use crate::error::CliError;
use crate::settings::CliSettings;
use nodeflow_graph::{serializer, EventBus, NodeEditor};
use std::path::Path;
use std::sync::Arc;

/// Counts reported by `check`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Number of nodes
    pub nodes: usize,
    /// Number of connections
    pub connections: usize,
    /// Connections whose source or target node is missing
    pub dangling: Vec<String>,
}

fn load(path: &Path) -> Result<NodeEditor, CliError> {
    let input = std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let editor = serializer::from_slice(Arc::new(EventBus::new()), &input)?;
    tracing::debug!(path = %path.display(), "graph loaded");
    Ok(editor)
}

/// Decode a graph file and summarize it
pub fn check(path: &Path, settings: &CliSettings) -> Result<CheckReport, CliError> {
    let editor = load(path)?;
    let report = CheckReport {
        nodes: editor.node_count(),
        connections: editor.connection_count(),
        dangling: editor
            .graph_data()
            .dangling_connections()
            .into_iter()
            .map(|id| id.0)
            .collect(),
    };

    if settings.verify_round_trip {
        verify_round_trip(&editor)?;
    }

    tracing::info!(
        nodes = report.nodes,
        connections = report.connections,
        dangling = report.dangling.len(),
        "graph checked"
    );
    Ok(report)
}

/// Decode a graph file and return its canonical encoding
pub fn format(path: &Path, pretty: bool) -> Result<String, CliError> {
    let editor = load(path)?;
    let text = if pretty {
        serializer::to_string_pretty(&editor)?
    } else {
        serializer::to_string(&editor)?
    };
    Ok(text)
}

/// Decode, encode, decode again and compare both encodings
pub fn round_trip(path: &Path) -> Result<(), CliError> {
    verify_round_trip(&load(path)?)
}

fn verify_round_trip(editor: &NodeEditor) -> Result<(), CliError> {
    let first = serializer::to_string(editor)?;
    let restored: NodeEditor = serializer::from_str(Arc::new(EventBus::new()), &first)?;
    let second = serializer::to_string(&restored)?;
    if first != second {
        return Err(CliError::RoundTripMismatch);
    }
    tracing::debug!(bytes = first.len(), "round trip verified");
    Ok(())
}

/// Write default settings to `path`
pub fn init_config(path: &Path) -> Result<(), CliError> {
    CliSettings::default().save(path)?;
    tracing::info!(path = %path.display(), "settings written");
    Ok(())
}

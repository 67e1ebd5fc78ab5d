// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line error type.

use crate::settings::SettingsError;
use nodeflow_graph::DecodeError;
use std::path::PathBuf;

/// Error reported by a subcommand
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Graph file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Graph file did not decode
    #[error("Failed to decode graph: {0}")]
    Decode(#[from] DecodeError),

    /// Graph could not be encoded
    #[error("Failed to encode graph: {0}")]
    Encode(#[from] serde_json::Error),

    /// Settings problem
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Re-encoding a decoded graph changed it
    #[error("Round trip changed the graph encoding")]
    RoundTripMismatch,
}

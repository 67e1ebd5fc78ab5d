// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line settings file.
//!
//! Settings are stored as RON. A missing `--config` flag means defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default tracing directive
pub const DEFAULT_LOG_FILTER: &str = "nodeflow_cli=info,nodeflow_graph=warn";

/// Tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliSettings {
    /// Settings format version
    pub version: u32,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Indent JSON written by `fmt`
    pub pretty: bool,
    /// Have `check` also verify the round trip
    pub verify_round_trip: bool,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            pretty: false,
            verify_round_trip: false,
        }
    }
}

impl CliSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: CliSettings = ron::from_str(&content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Load settings from `path`, or defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Error while reading or writing settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File access failed
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File content is not valid settings RON
    #[error("Invalid settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be encoded
    #[error("Could not encode settings: {0}")]
    Encode(#[from] ron::Error),

    /// Written by a newer tool
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },
}

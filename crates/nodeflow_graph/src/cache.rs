// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value cache for data-pull drivers.
//!
//! A driver that pulls [`DataProvider`](crate::node::DataProvider) outputs
//! through the graph can memoize them here, keyed however it likes
//! (typically `<node id>.<output key>`).

use crate::sync_map::SyncMap;
use serde_json::Value;

/// Concurrent memo of computed values
#[derive(Debug, Default)]
pub struct DataCache {
    values: SyncMap<Value>,
}

impl DataCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached value
    pub fn get(&self, key: &str) -> Option<Value> {
        let value = self.values.get(key);
        tracing::trace!(key, hit = value.is_some(), "cache get");
        value
    }

    /// Store a value
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        tracing::trace!(key = %key, "cache set");
        self.values.add(key, value);
    }

    /// Drop a value
    pub fn delete(&self, key: &str) {
        tracing::trace!(key, "cache delete");
        self.values.delete(key);
    }

    /// Drop every value
    pub fn reset(&self) {
        self.values.clear();
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A new, empty cache for a separate run
    pub fn fresh(&self) -> Self {
        Self::new()
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Concurrent string-keyed registry.
//!
//! [`SyncMap`] is the storage primitive behind node slots and the data
//! cache. It can be shared between threads without external locking and
//! keeps a live entry counter so [`SyncMap::len`] never scans.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A concurrent map from string keys to cloneable values.
///
/// Writes to the same key are linearizable: a [`get`](Self::get) issued after
/// an [`add`](Self::add) returned observes that value (or a later one).
/// Enumeration is weakly consistent: entries added or removed while a
/// [`for_each`](Self::for_each) is running may or may not be visited, but no
/// key is visited twice.
pub struct SyncMap<V> {
    entries: DashMap<String, V>,
    count: AtomicUsize,
}

impl<V: Clone> SyncMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            count: AtomicUsize::new(0),
        }
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value, silently replacing any previous value under `key`
    pub fn add(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        tracing::trace!(key = %key, "sync map add");
        // Count changes only under the key's shard lock.
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.insert(value);
            }
            Entry::Vacant(entry) => {
                self.count.fetch_add(1, Ordering::AcqRel);
                entry.insert(value);
            }
        }
    }

    /// Remove a key. Removing an absent key is a no-op.
    pub fn delete(&self, key: &str) {
        if !self.entries.contains_key(key) {
            return;
        }
        if let Entry::Occupied(entry) = self.entries.entry(key.to_owned()) {
            tracing::trace!(key = %key, "sync map delete");
            self.count.fetch_sub(1, Ordering::AcqRel);
            entry.remove();
        }
    }

    /// Number of entries currently stored
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Whether the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every entry. Order is unspecified.
    ///
    /// The visitor runs while the entry's shard is read-locked, so it must
    /// not write back into this same map.
    pub fn for_each(&self, mut visitor: impl FnMut(&str, &V)) {
        for entry in self.entries.iter() {
            visitor(entry.key(), entry.value());
        }
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Copy of all entries, ordered by key
    pub fn snapshot(&self) -> BTreeMap<String, V> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries.retain(|_, _| {
            self.count.fetch_sub(1, Ordering::AcqRel);
            false
        });
    }
}

impl<V: Clone> Default for SyncMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> FromIterator<(String, V)> for SyncMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let map = Self::new();
        for (key, value) in iter {
            map.add(key, value);
        }
        map
    }
}

impl<V: Clone + fmt::Debug> fmt::Debug for SyncMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_add_get_delete() {
        let map = SyncMap::new();
        assert!(map.is_empty());
        assert_eq!(map.get("a"), None);

        map.add("a", 1);
        map.add("b", 2);
        assert_eq!(map.get("a"), Some(1));
        assert_eq!(map.len(), 2);

        map.delete("a");
        assert_eq!(map.get("a"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_overwrite_keeps_count() {
        let map = SyncMap::new();
        map.add("a", 1);
        map.add("a", 2);
        assert_eq!(map.get("a"), Some(2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let map: SyncMap<i32> = SyncMap::new();
        map.delete("missing");
        assert_eq!(map.len(), 0);

        map.add("a", 1);
        map.delete("a");
        map.delete("a");
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let map = SyncMap::new();
        for key in ["c", "a", "b"] {
            map.add(key, key.to_uppercase());
        }
        let keys: Vec<_> = map.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(map.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_for_each_visits_each_entry_once() {
        let map: SyncMap<usize> = (0..50).map(|i| (format!("k{i}"), i)).collect();
        let mut seen = Vec::new();
        map.for_each(|_, v| seen.push(*v));
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_clear() {
        let map: SyncMap<usize> = (0..10).map(|i| (i.to_string(), i)).collect();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get("3"), None);
    }

    #[test]
    fn test_concurrent_writers() {
        let map = Arc::new(SyncMap::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let map = Arc::clone(&map);
                thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("{t}-{i}");
                        map.add(key.clone(), i);
                        // Read-after-write on the same key
                        assert_eq!(map.get(&key), Some(i));
                        if i % 2 == 0 {
                            map.delete(&key);
                        }
                        // Shared keys contended by every thread
                        map.add(format!("shared-{}", i % 10), t);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // 8 threads * 100 surviving odd keys + 10 shared keys
        assert_eq!(map.len(), 8 * 100 + 10);
        assert_eq!(map.snapshot().len(), map.len());
    }

    #[test]
    fn test_len_stays_bounded_under_add_delete_races() {
        const KEYS: usize = 4;
        let map = Arc::new(SyncMap::new());
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let workers: Vec<_> = (0..4)
            .flat_map(|t| {
                let adder = {
                    let map = Arc::clone(&map);
                    thread::spawn(move || {
                        for i in 0..2_000 {
                            map.add(format!("k{}", (i + t) % KEYS), i);
                        }
                    })
                };
                let deleter = {
                    let map = Arc::clone(&map);
                    thread::spawn(move || {
                        for i in 0..2_000 {
                            map.delete(&format!("k{}", (i + t) % KEYS));
                        }
                    })
                };
                [adder, deleter]
            })
            .collect();

        let sampler = {
            let map = Arc::clone(&map);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    let len = map.len();
                    assert!(len <= KEYS, "len {len} exceeds the key space");
                    thread::yield_now();
                }
            })
        };

        for worker in workers {
            worker.join().unwrap();
        }
        done.store(true, Ordering::Release);
        sampler.join().unwrap();

        assert_eq!(map.len(), map.snapshot().len());
    }

    #[test]
    fn test_concurrent_enumeration() {
        let map = Arc::new(SyncMap::new());
        let writer = {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                for i in 0..500 {
                    map.add(format!("k{i}"), i);
                    if i >= 10 {
                        map.delete(&format!("k{}", i - 10));
                    }
                }
            })
        };

        for _ in 0..50 {
            let mut keys = Vec::new();
            map.for_each(|k, _| keys.push(k.to_string()));
            let unique: std::collections::HashSet<_> = keys.iter().collect();
            assert_eq!(unique.len(), keys.len());
        }

        writer.join().unwrap();
        assert_eq!(map.len(), 10);
    }
}

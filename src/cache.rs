// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Query result cache keyed by query identity
//!
//! Reads are memoized under a [`QueryKey`]; successful mutations invalidate
//! the keys they affect. Invalidation matches by prefix, so invalidating
//! `["page-placements"]` drops the placements of every layout.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Identity of a cached query: an ordered list of segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Whether `prefix` is a leading run of this key's segments
    #[must_use]
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Keys used by the editors
pub mod keys {
    use super::QueryKey;

    /// All page layouts
    #[must_use]
    pub fn layouts() -> QueryKey {
        QueryKey::new(["ui-page-layouts"])
    }

    /// Placements of every layout
    #[must_use]
    pub fn all_placements() -> QueryKey {
        QueryKey::new(["page-placements"])
    }

    /// Placements of one layout
    #[must_use]
    pub fn placements(layout_id: u64) -> QueryKey {
        QueryKey::new(["page-placements".to_string(), layout_id.to_string()])
    }

    /// Seat layout of one bus
    #[must_use]
    pub fn seat_layout(bus_id: u64) -> QueryKey {
        QueryKey::new(["seat-layout".to_string(), bus_id.to_string()])
    }

    /// Seat state of one trip
    #[must_use]
    pub fn trip_seats(trip_id: u64) -> QueryKey {
        QueryKey::new(["trip-seats".to_string(), trip_id.to_string()])
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    fetched_at: DateTime<Utc>,
}

/// Memoized query results
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value under a key, if present and decodable as `T`
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.entries.get(key)?;
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// When the value under a key was stored
    #[must_use]
    pub fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|e| e.fetched_at)
    }

    /// Store a value
    pub fn put<T: Serialize>(&mut self, key: QueryKey, value: &T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Return the cached value or run `fetch` and cache its result.
    ///
    /// Fetch errors are returned as-is and nothing is cached.
    pub fn get_or_fetch<T, E, F>(&mut self, key: QueryKey, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(hit) = self.get(&key) {
            debug!("Cache hit: {}", key);
            return Ok(hit);
        }
        debug!("Cache miss: {}", key);
        let value = fetch()?;
        if let Err(err) = self.put(key.clone(), &value) {
            debug!("Not caching {}: {}", key, err);
        }
        Ok(value)
    }

    /// Drop every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Invalidated {} cached queries under {}", removed, prefix);
        }
        removed
    }

    /// Number of cached queries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_fetch_memoizes() {
        let mut cache = QueryCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value: Result<Vec<u32>, ()> = cache.get_or_fetch(keys::placements(1), || {
                calls += 1;
                Ok(vec![1, 2, 3])
            });
            assert_eq!(value.unwrap(), [1, 2, 3]);
        }
        assert_eq!(calls, 1);
        assert!(cache.fetched_at(&keys::placements(1)).is_some());
    }

    #[test]
    fn test_fetch_error_not_cached() {
        let mut cache = QueryCache::new();
        let result: Result<u32, &str> = cache.get_or_fetch(keys::layouts(), || Err("offline"));
        assert_eq!(result, Err("offline"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_by_prefix() {
        let mut cache = QueryCache::new();
        cache.put(keys::placements(1), &1).unwrap();
        cache.put(keys::placements(2), &2).unwrap();
        cache.put(keys::layouts(), &3).unwrap();

        assert_eq!(cache.invalidate(&keys::all_placements()), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<u32>(&keys::layouts()), Some(3));
    }

    #[test]
    fn test_invalidate_exact_key() {
        let mut cache = QueryCache::new();
        cache.put(keys::placements(1), &1).unwrap();
        cache.put(keys::placements(10), &10).unwrap();

        assert_eq!(cache.invalidate(&keys::placements(1)), 1);
        assert_eq!(cache.get::<u32>(&keys::placements(10)), Some(10));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Draft files - an editing session that outlives one CLI invocation
//!
//! `layout edit` writes the seeded collection to the cache directory, each
//! `layout move` updates it, `layout save` flushes it through the persistence
//! gate, and `layout discard` drops it unsaved.
//!
//! Seat maps work the same way: designer edits accumulate in a [`SeatDraft`]
//! until `seats save` writes the layout in one call.

use crate::collection::CollectionStore;
use crate::seatmap::SeatLayout;
use crate::types::{ComponentRef, OrderUpdate};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Staged page-layout edits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Layout being edited
    pub layout_id: u64,
    /// When the session started
    pub opened_at: DateTime<Utc>,
    /// Fingerprint of the remote order the draft was based on
    pub fingerprint: String,
    /// Working copy
    pub collection: CollectionStore<ComponentRef>,
}

impl Draft {
    /// Start a session from a freshly seeded collection
    #[must_use]
    pub fn open(layout_id: u64, collection: CollectionStore<ComponentRef>) -> Self {
        Self {
            layout_id,
            opened_at: Utc::now(),
            fingerprint: fingerprint(collection.baseline()),
            collection,
        }
    }

    /// Where the draft for a layout lives
    #[must_use]
    pub fn path(cache_dir: &Path, layout_id: u64) -> PathBuf {
        cache_dir.join("drafts").join(format!("layout-{layout_id}.json"))
    }

    /// Load the draft for a layout, if one exists
    pub fn load(cache_dir: &Path, layout_id: u64) -> Result<Option<Self>> {
        read_json(&Self::path(cache_dir, layout_id))
    }

    /// Write the draft
    pub fn store(&self, cache_dir: &Path) -> Result<()> {
        write_json(&Self::path(cache_dir, self.layout_id), self)
    }

    /// Delete the draft for a layout. Returns whether one existed.
    pub fn discard(cache_dir: &Path, layout_id: u64) -> Result<bool> {
        remove(&Self::path(cache_dir, layout_id))
    }

    /// Whether the remote order moved on since this draft was opened
    #[must_use]
    pub fn is_stale(&self, remote_keys: &[OrderUpdate]) -> bool {
        fingerprint(remote_keys) != self.fingerprint
    }
}

/// Staged seat-map edits for one bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatDraft {
    /// Bus being designed
    pub bus_id: u64,
    /// When the session started
    pub opened_at: DateTime<Utc>,
    /// Fingerprint of the remote layout the draft was based on
    pub fingerprint: String,
    /// Working copy
    pub layout: SeatLayout,
}

impl SeatDraft {
    /// Start a session from the layout as stored
    #[must_use]
    pub fn open(bus_id: u64, layout: SeatLayout) -> Self {
        Self {
            bus_id,
            opened_at: Utc::now(),
            fingerprint: layout_fingerprint(&layout),
            layout,
        }
    }

    /// Where the draft for a bus lives
    #[must_use]
    pub fn path(cache_dir: &Path, bus_id: u64) -> PathBuf {
        cache_dir.join("drafts").join(format!("bus-{bus_id}.json"))
    }

    /// Load the draft for a bus, if one exists
    pub fn load(cache_dir: &Path, bus_id: u64) -> Result<Option<Self>> {
        read_json(&Self::path(cache_dir, bus_id))
    }

    /// Write the draft
    pub fn store(&self, cache_dir: &Path) -> Result<()> {
        write_json(&Self::path(cache_dir, self.bus_id), self)
    }

    /// Delete the draft for a bus. Returns whether one existed.
    pub fn discard(cache_dir: &Path, bus_id: u64) -> Result<bool> {
        remove(&Self::path(cache_dir, bus_id))
    }

    /// Whether the working copy differs from the layout it started from
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        layout_fingerprint(&self.layout) != self.fingerprint
    }

    /// Whether the stored layout moved on since this draft was opened
    #[must_use]
    pub fn is_stale(&self, remote: &SeatLayout) -> bool {
        layout_fingerprint(remote) != self.fingerprint
    }
}

/// Short digest of an `(id, order)` sequence
#[must_use]
pub fn fingerprint(keys: &[OrderUpdate]) -> String {
    let mut hasher = Sha256::new();
    for key in keys {
        hasher.update(key.id.0.to_le_bytes());
        hasher.update(key.order.to_le_bytes());
    }
    let hash = hex::encode(hasher.finalize());
    hash[..16].to_string()
}

/// Short digest of a seat layout's stored form
#[must_use]
pub fn layout_fingerprint(layout: &SeatLayout) -> String {
    let bytes = serde_json::to_vec(layout).unwrap_or_default();
    let hash = hex::encode(Sha256::digest(bytes));
    hash[..16].to_string()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize draft")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn remove(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::DragEnd;
    use crate::seatmap::{Brush, GridDesigner};
    use crate::types::{ItemId, PlacedItem};
    use tempfile::TempDir;

    fn collection() -> CollectionStore<ComponentRef> {
        let component = |name: &str| ComponentRef {
            component_id: 1,
            component_type: "cta".into(),
            component_name: name.into(),
            title: None,
            position: "main".into(),
            custom_config: None,
        };
        CollectionStore::seed(vec![
            PlacedItem::new(1, component("a"), 1),
            PlacedItem::new(2, component("b"), 2),
        ])
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let a = [OrderUpdate { id: ItemId(1), order: 1 }, OrderUpdate { id: ItemId(2), order: 2 }];
        let b = [OrderUpdate { id: ItemId(2), order: 1 }, OrderUpdate { id: ItemId(1), order: 2 }];
        assert_eq!(fingerprint(&a), fingerprint(&a));
        assert_ne!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).len(), 16);
    }

    #[test]
    fn test_store_load_discard() {
        let dir = TempDir::new().unwrap();
        let mut draft = Draft::open(4, collection());
        draft.collection.drag_end(DragEnd::dropped(1, 0)).unwrap();
        draft.store(dir.path()).unwrap();

        let loaded = Draft::load(dir.path(), 4).unwrap().unwrap();
        assert!(loaded.collection.is_dirty());
        assert!(!loaded.collection.is_saving());
        assert_eq!(loaded.fingerprint, draft.fingerprint);

        assert!(Draft::discard(dir.path(), 4).unwrap());
        assert!(!Draft::discard(dir.path(), 4).unwrap());
        assert!(Draft::load(dir.path(), 4).unwrap().is_none());
    }

    #[test]
    fn test_seat_draft_tracks_edits() {
        let dir = TempDir::new().unwrap();
        let stored = SeatLayout::new_default(2, 3).unwrap();
        let mut draft = SeatDraft::open(7, stored.clone());
        assert!(!draft.is_dirty());

        let mut designer = GridDesigner::new(draft.layout);
        designer.set_brush(Brush::Door);
        designer.paint(1, 0);
        draft.layout = designer.into_layout();
        assert!(draft.is_dirty());
        assert!(!draft.is_stale(&stored));
        draft.store(dir.path()).unwrap();

        let loaded = SeatDraft::load(dir.path(), 7).unwrap().unwrap();
        assert_eq!(loaded.layout, draft.layout);
        assert!(loaded.is_dirty());
        assert!(loaded.is_stale(&SeatLayout::new_default(3, 3).unwrap()));
        assert!(Draft::load(dir.path(), 7).unwrap().is_none());

        assert!(SeatDraft::discard(dir.path(), 7).unwrap());
        assert!(SeatDraft::load(dir.path(), 7).unwrap().is_none());
    }

    #[test]
    fn test_stale_detection() {
        let draft = Draft::open(4, collection());
        assert!(!draft.is_stale(draft.collection.baseline()));
        assert!(draft.is_stale(&[OrderUpdate { id: ItemId(2), order: 1 }]));
    }
}

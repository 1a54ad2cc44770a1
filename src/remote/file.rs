// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! JSON file backend in the data directory

use super::{Dataset, RemoteStore};
use crate::error::RemoteError;
use crate::seatmap::SeatLayout;
use crate::types::{ItemId, OrderUpdate, PageLayout, PayloadPatch, Placement, TripSeats};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Dataset file name inside the data directory
pub const DATASET_FILE: &str = "busdesk.json";

/// Store backed by `busdesk.json`.
///
/// Every call reads the whole file; mutations write it back. Batch order
/// updates are validated in full first, so they are all-or-nothing.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open the store in a data directory
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(DATASET_FILE),
        }
    }

    /// Path of the dataset file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the dataset; a missing file is an empty dataset
    pub fn load(&self) -> Result<Dataset, RemoteError> {
        if !self.path.exists() {
            return Ok(Dataset::default());
        }
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| RemoteError::read(self.path.display().to_string(), e.to_string()))
    }

    /// Write the dataset
    pub fn save(&self, dataset: &Dataset) -> Result<(), RemoteError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(dataset)?;
        fs::write(&self.path, json)?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<(), RemoteError>
    where
        F: FnOnce(&mut Dataset) -> Result<(), RemoteError>,
    {
        let mut dataset = self.load()?;
        mutate(&mut dataset)?;
        self.save(&dataset)
    }
}

impl RemoteStore for FileStore {
    fn fetch_layouts(&self) -> Result<Vec<PageLayout>, RemoteError> {
        Ok(self.load()?.layouts())
    }

    fn set_layout_active(&self, layout_id: u64, active: bool) -> Result<(), RemoteError> {
        self.update(|d| d.set_layout_active(layout_id, active))
    }

    fn fetch_placements(&self, layout_id: u64) -> Result<Vec<Placement>, RemoteError> {
        self.load()?.placements(layout_id)
    }

    fn batch_update_order(&self, updates: &[OrderUpdate]) -> Result<(), RemoteError> {
        self.update(|d| d.apply_order(updates))
    }

    fn toggle_visibility(&self, id: ItemId, visible: bool) -> Result<(), RemoteError> {
        self.update(|d| d.set_visible(id, visible))
    }

    fn update_payload_field(&self, id: ItemId, patch: &PayloadPatch) -> Result<(), RemoteError> {
        self.update(|d| d.patch_payload(id, patch))
    }

    fn fetch_seat_layout(&self, bus_id: u64) -> Result<SeatLayout, RemoteError> {
        self.load()?.seat_layout(bus_id)
    }

    fn save_seat_layout(&self, bus_id: u64, layout: &SeatLayout) -> Result<(), RemoteError> {
        self.update(|d| d.set_seat_layout(bus_id, layout))
    }

    fn fetch_trip_seats(&self, trip_id: u64) -> Result<TripSeats, RemoteError> {
        self.load()?.trip_seats(trip_id)
    }

    fn save_blocked_seats(&self, trip_id: u64, blocked: &[String]) -> Result<(), RemoteError> {
        self.update(|d| d.set_blocked(trip_id, blocked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.fetch_layouts().unwrap().is_empty());
    }

    #[test]
    fn test_seat_layout_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let layout = SeatLayout::new_default(3, 4).unwrap();

        store.save_seat_layout(8, &layout).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.fetch_seat_layout(8).unwrap(), layout);
    }

    #[test]
    fn test_corrupt_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DATASET_FILE), "{ not json").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.fetch_layouts(), Err(RemoteError::Read { .. })));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! In-process backend with call accounting and failure injection

use super::{Dataset, RemoteStore};
use crate::error::RemoteError;
use crate::seatmap::SeatLayout;
use crate::types::{ItemId, OrderUpdate, PageLayout, PayloadPatch, Placement, TripSeats};
use std::cell::{Cell, RefCell};

/// Store holding a [`Dataset`] in memory.
///
/// Counts every call and can be told to reject writes or reads, which is how
/// the editors' failure paths are exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<Dataset>,
    reads: Cell<usize>,
    writes: Cell<usize>,
    order_batches: Cell<usize>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with rows
    #[must_use]
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            data: RefCell::new(dataset),
            ..Self::default()
        }
    }

    /// Copy of the current rows
    #[must_use]
    pub fn snapshot(&self) -> Dataset {
        self.data.borrow().clone()
    }

    /// Reject every following read
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Reject every following write
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of read calls so far
    #[must_use]
    pub fn read_calls(&self) -> usize {
        self.reads.get()
    }

    /// Number of write calls so far, including rejected ones
    #[must_use]
    pub fn write_calls(&self) -> usize {
        self.writes.get()
    }

    /// Number of `batch_update_order` calls so far
    #[must_use]
    pub fn order_batches(&self) -> usize {
        self.order_batches.get()
    }

    fn read<T>(&self, what: &str, f: impl FnOnce(&Dataset) -> Result<T, RemoteError>) -> Result<T, RemoteError> {
        self.reads.set(self.reads.get() + 1);
        if self.fail_reads.get() {
            return Err(RemoteError::read(what, "service unavailable"));
        }
        f(&self.data.borrow())
    }

    fn write(&self, what: &str, f: impl FnOnce(&mut Dataset) -> Result<(), RemoteError>) -> Result<(), RemoteError> {
        self.writes.set(self.writes.get() + 1);
        if self.fail_writes.get() {
            return Err(RemoteError::write(what, "service unavailable"));
        }
        f(&mut self.data.borrow_mut())
    }
}

impl RemoteStore for MemoryStore {
    fn fetch_layouts(&self) -> Result<Vec<PageLayout>, RemoteError> {
        self.read("layouts", |d| Ok(d.layouts()))
    }

    fn set_layout_active(&self, layout_id: u64, active: bool) -> Result<(), RemoteError> {
        self.write("layout", |d| d.set_layout_active(layout_id, active))
    }

    fn fetch_placements(&self, layout_id: u64) -> Result<Vec<Placement>, RemoteError> {
        self.read("placements", |d| d.placements(layout_id))
    }

    fn batch_update_order(&self, updates: &[OrderUpdate]) -> Result<(), RemoteError> {
        self.order_batches.set(self.order_batches.get() + 1);
        self.write("placement order", |d| d.apply_order(updates))
    }

    fn toggle_visibility(&self, id: ItemId, visible: bool) -> Result<(), RemoteError> {
        self.write("placement", |d| d.set_visible(id, visible))
    }

    fn update_payload_field(&self, id: ItemId, patch: &PayloadPatch) -> Result<(), RemoteError> {
        self.write("placement", |d| d.patch_payload(id, patch))
    }

    fn fetch_seat_layout(&self, bus_id: u64) -> Result<SeatLayout, RemoteError> {
        self.read("seat layout", |d| d.seat_layout(bus_id))
    }

    fn save_seat_layout(&self, bus_id: u64, layout: &SeatLayout) -> Result<(), RemoteError> {
        self.write("seat layout", |d| d.set_seat_layout(bus_id, layout))
    }

    fn fetch_trip_seats(&self, trip_id: u64) -> Result<TripSeats, RemoteError> {
        self.read("trip seats", |d| d.trip_seats(trip_id))
    }

    fn save_blocked_seats(&self, trip_id: u64, blocked: &[String]) -> Result<(), RemoteError> {
        self.write("blocked seats", |d| d.set_blocked(trip_id, blocked))
    }
}

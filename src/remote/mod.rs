// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! External data service
//!
//! Every durable effect goes through [`RemoteStore`]. Three backends exist:
//! a JSON file in the data directory, the hosted REST API, and an in-process
//! store used when embedding and in tests.

mod dataset;
mod file;
mod memory;
mod rest;

pub use dataset::{BusRecord, Dataset, PlacementRecord};
pub use file::{FileStore, DATASET_FILE};
pub use memory::MemoryStore;
pub use rest::RestStore;

use crate::error::RemoteError;
use crate::seatmap::SeatLayout;
use crate::types::{ItemId, OrderUpdate, PageLayout, PayloadPatch, Placement, TripSeats};

/// Operations the editors need from the data service
pub trait RemoteStore {
    /// All page layouts, by id
    fn fetch_layouts(&self) -> Result<Vec<PageLayout>, RemoteError>;

    /// Switch a layout on or off
    fn set_layout_active(&self, layout_id: u64, active: bool) -> Result<(), RemoteError>;

    /// Placements of one layout in display order
    fn fetch_placements(&self, layout_id: u64) -> Result<Vec<Placement>, RemoteError>;

    /// Write the display order of many placements.
    ///
    /// Callers treat this as all-or-nothing; backends document whether they
    /// actually are.
    fn batch_update_order(&self, updates: &[OrderUpdate]) -> Result<(), RemoteError>;

    /// Show or hide one placement
    fn toggle_visibility(&self, id: ItemId, visible: bool) -> Result<(), RemoteError>;

    /// Update payload fields of one placement
    fn update_payload_field(&self, id: ItemId, patch: &PayloadPatch) -> Result<(), RemoteError>;

    /// Seat layout of a bus; buses without one get the legacy default
    fn fetch_seat_layout(&self, bus_id: u64) -> Result<SeatLayout, RemoteError>;

    /// Replace the seat layout of a bus
    fn save_seat_layout(&self, bus_id: u64, layout: &SeatLayout) -> Result<(), RemoteError>;

    /// Blocked and booked seats of a trip
    fn fetch_trip_seats(&self, trip_id: u64) -> Result<TripSeats, RemoteError>;

    /// Replace the blocked-seat list of a trip
    fn save_blocked_seats(&self, trip_id: u64, blocked: &[String]) -> Result<(), RemoteError>;
}

impl<R: RemoteStore + ?Sized> RemoteStore for std::rc::Rc<R> {
    fn fetch_layouts(&self) -> Result<Vec<PageLayout>, RemoteError> {
        (**self).fetch_layouts()
    }

    fn set_layout_active(&self, layout_id: u64, active: bool) -> Result<(), RemoteError> {
        (**self).set_layout_active(layout_id, active)
    }

    fn fetch_placements(&self, layout_id: u64) -> Result<Vec<Placement>, RemoteError> {
        (**self).fetch_placements(layout_id)
    }

    fn batch_update_order(&self, updates: &[OrderUpdate]) -> Result<(), RemoteError> {
        (**self).batch_update_order(updates)
    }

    fn toggle_visibility(&self, id: ItemId, visible: bool) -> Result<(), RemoteError> {
        (**self).toggle_visibility(id, visible)
    }

    fn update_payload_field(&self, id: ItemId, patch: &PayloadPatch) -> Result<(), RemoteError> {
        (**self).update_payload_field(id, patch)
    }

    fn fetch_seat_layout(&self, bus_id: u64) -> Result<SeatLayout, RemoteError> {
        (**self).fetch_seat_layout(bus_id)
    }

    fn save_seat_layout(&self, bus_id: u64, layout: &SeatLayout) -> Result<(), RemoteError> {
        (**self).save_seat_layout(bus_id, layout)
    }

    fn fetch_trip_seats(&self, trip_id: u64) -> Result<TripSeats, RemoteError> {
        (**self).fetch_trip_seats(trip_id)
    }

    fn save_blocked_seats(&self, trip_id: u64, blocked: &[String]) -> Result<(), RemoteError> {
        (**self).save_blocked_seats(trip_id, blocked)
    }
}

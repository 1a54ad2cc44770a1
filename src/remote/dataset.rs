// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Row set shared by the file and in-memory stores

use crate::command::apply_patch;
use crate::error::RemoteError;
use crate::seatmap::SeatLayout;
use crate::types::{ItemId, OrderUpdate, PageLayout, PayloadPatch, Placement, TripSeats};
use serde::{Deserialize, Serialize};

/// A placement row with the layout it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// Owning layout
    pub layout_id: u64,
    /// The placement itself
    #[serde(flatten)]
    pub placement: Placement,
}

/// A bus row; only the seat layout is kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusRecord {
    /// Bus identifier
    pub bus_id: u64,
    /// Stored layout, possibly a JSON string from older clients
    #[serde(default)]
    pub seat_layout: Option<serde_json::Value>,
}

/// All rows the editors touch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Page layouts
    #[serde(default)]
    pub layouts: Vec<PageLayout>,
    /// Component placements of every layout
    #[serde(default)]
    pub placements: Vec<PlacementRecord>,
    /// Buses
    #[serde(default)]
    pub buses: Vec<BusRecord>,
    /// Trips
    #[serde(default)]
    pub trips: Vec<TripSeats>,
}

impl Dataset {
    /// Layouts ordered by id
    #[must_use]
    pub fn layouts(&self) -> Vec<PageLayout> {
        let mut layouts = self.layouts.clone();
        layouts.sort_by_key(|l| l.layout_id);
        layouts
    }

    /// Set the active flag of a layout
    pub fn set_layout_active(&mut self, layout_id: u64, active: bool) -> Result<(), RemoteError> {
        let layout = self
            .layouts
            .iter_mut()
            .find(|l| l.layout_id == layout_id)
            .ok_or_else(|| not_found("layout", layout_id))?;
        layout.is_active = active;
        Ok(())
    }

    /// Placements of a layout in display order
    pub fn placements(&self, layout_id: u64) -> Result<Vec<Placement>, RemoteError> {
        if !self.layouts.iter().any(|l| l.layout_id == layout_id) {
            return Err(not_found("layout", layout_id));
        }
        let mut placements: Vec<Placement> = self
            .placements
            .iter()
            .filter(|r| r.layout_id == layout_id)
            .map(|r| r.placement.clone())
            .collect();
        placements.sort_by_key(|p| p.order);
        Ok(placements)
    }

    /// Write display orders. Every id is checked before anything changes.
    pub fn apply_order(&mut self, updates: &[OrderUpdate]) -> Result<(), RemoteError> {
        for update in updates {
            if !self.placements.iter().any(|r| r.placement.id == update.id) {
                return Err(not_found("placement", update.id));
            }
        }
        for update in updates {
            if let Some(record) = self.placements.iter_mut().find(|r| r.placement.id == update.id) {
                record.placement.order = update.order;
            }
        }
        Ok(())
    }

    /// Set the visible flag of a placement
    pub fn set_visible(&mut self, id: ItemId, visible: bool) -> Result<(), RemoteError> {
        self.placement_mut(id)?.visible = visible;
        Ok(())
    }

    /// Patch the component fields of a placement
    pub fn patch_payload(&mut self, id: ItemId, patch: &PayloadPatch) -> Result<(), RemoteError> {
        let placement = self.placement_mut(id)?;
        placement.payload = apply_patch(&placement.payload, patch)
            .map_err(|e| RemoteError::write(format!("placement {id}"), e.to_string()))?;
        Ok(())
    }

    /// Seat layout of a bus
    pub fn seat_layout(&self, bus_id: u64) -> Result<SeatLayout, RemoteError> {
        let bus = self
            .buses
            .iter()
            .find(|b| b.bus_id == bus_id)
            .ok_or_else(|| not_found("bus", bus_id))?;
        let raw = bus.seat_layout.clone().unwrap_or(serde_json::Value::Null);
        Ok(SeatLayout::from_value(raw)?)
    }

    /// Store a seat layout, creating the bus row if needed
    pub fn set_seat_layout(&mut self, bus_id: u64, layout: &SeatLayout) -> Result<(), RemoteError> {
        let value = serde_json::to_value(layout)?;
        match self.buses.iter_mut().find(|b| b.bus_id == bus_id) {
            Some(bus) => bus.seat_layout = Some(value),
            None => self.buses.push(BusRecord {
                bus_id,
                seat_layout: Some(value),
            }),
        }
        Ok(())
    }

    /// Seat state of a trip
    pub fn trip_seats(&self, trip_id: u64) -> Result<TripSeats, RemoteError> {
        self.trips
            .iter()
            .find(|t| t.trip_id == trip_id)
            .cloned()
            .ok_or_else(|| not_found("trip", trip_id))
    }

    /// Replace the blocked list of a trip
    pub fn set_blocked(&mut self, trip_id: u64, blocked: &[String]) -> Result<(), RemoteError> {
        let trip = self
            .trips
            .iter_mut()
            .find(|t| t.trip_id == trip_id)
            .ok_or_else(|| not_found("trip", trip_id))?;
        trip.blocked = blocked.to_vec();
        Ok(())
    }

    fn placement_mut(&mut self, id: ItemId) -> Result<&mut Placement, RemoteError> {
        self.placements
            .iter_mut()
            .map(|r| &mut r.placement)
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("placement", id))
    }
}

fn not_found(kind: &'static str, id: impl ToString) -> RemoteError {
    RemoteError::NotFound {
        kind,
        id: id.to_string(),
    }
}

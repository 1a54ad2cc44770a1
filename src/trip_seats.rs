// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Blocked-seat editing for a single trip

use crate::seatmap::SeatLayout;
use crate::types::TripSeats;
use std::borrow::Cow;
use std::collections::HashSet;

/// Result of toggling one seat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockToggle {
    /// The seat is now withheld from sale
    Blocked,
    /// The seat is sellable again
    Unblocked,
    /// Booked seats cannot be blocked; nothing changed
    Booked,
    /// The bus layout has no seat with this label; nothing changed
    UnknownSeat,
}

/// Working copy of a trip's blocked-seat list
#[derive(Debug, Clone)]
pub struct TripSeatEditor {
    trip_id: u64,
    bus_id: Option<u64>,
    blocked: Vec<String>,
    booked: HashSet<String>,
    saved: Vec<String>,
    seats: Option<Vec<String>>,
}

impl TripSeatEditor {
    /// Start from the trip's current state
    #[must_use]
    pub fn new(seats: TripSeats) -> Self {
        Self {
            trip_id: seats.trip_id,
            bus_id: seats.bus_id,
            saved: seats.blocked.clone(),
            blocked: seats.blocked,
            booked: seats.booked.into_iter().collect(),
            seats: None,
        }
    }

    /// Restrict toggling to the seats of the bus layout.
    ///
    /// Unlabeled seats are addressed by their row-and-column label.
    #[must_use]
    pub fn with_layout(mut self, layout: &SeatLayout) -> Self {
        self.seats = Some(layout.seat_labels().into_iter().map(Cow::into_owned).collect());
        self
    }

    /// Trip being edited
    #[must_use]
    pub fn trip_id(&self) -> u64 {
        self.trip_id
    }

    /// Bus assigned to the trip
    #[must_use]
    pub fn bus_id(&self) -> Option<u64> {
        self.bus_id
    }

    /// Blocked labels in the order they were blocked
    #[must_use]
    pub fn blocked(&self) -> &[String] {
        &self.blocked
    }

    /// Whether a label is blocked
    #[must_use]
    pub fn is_blocked(&self, label: &str) -> bool {
        self.blocked.iter().any(|b| b == label)
    }

    /// Whether a label is held by a passenger
    #[must_use]
    pub fn is_booked(&self, label: &str) -> bool {
        self.booked.contains(label)
    }

    /// Whether the label names a seat on the bus, or no layout is attached
    #[must_use]
    pub fn is_seat(&self, label: &str) -> bool {
        match &self.seats {
            Some(seats) => seats.iter().any(|s| s == label),
            None => true,
        }
    }

    /// Block a free seat or unblock a blocked one.
    ///
    /// Stale blocks on labels the layout no longer has can still be lifted.
    pub fn toggle(&mut self, label: &str) -> BlockToggle {
        if !self.is_seat(label) && !self.is_blocked(label) {
            return BlockToggle::UnknownSeat;
        }
        if self.is_booked(label) {
            return BlockToggle::Booked;
        }
        if self.is_blocked(label) {
            self.blocked.retain(|b| b != label);
            BlockToggle::Unblocked
        } else {
            self.blocked.push(label.to_string());
            BlockToggle::Blocked
        }
    }

    /// Whether the list differs from what was last saved
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.blocked != self.saved
    }

    /// Record a successful save
    pub fn mark_saved(&mut self) {
        self.saved = self.blocked.clone();
    }

    /// Seats of the attached layout that are neither blocked nor booked.
    ///
    /// `None` when no layout is attached.
    #[must_use]
    pub fn available(&self) -> Option<Vec<&str>> {
        let seats = self.seats.as_ref()?;
        Some(
            seats
                .iter()
                .map(String::as_str)
                .filter(|label| !self.is_blocked(label) && !self.is_booked(label))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seatmap::GridDesigner;

    fn editor() -> TripSeatEditor {
        TripSeatEditor::new(TripSeats {
            trip_id: 3,
            bus_id: Some(1),
            blocked: vec!["4".into()],
            booked: vec!["1".into()],
        })
    }

    #[test]
    fn test_toggle_cycle() {
        let mut editor = editor();
        assert_eq!(editor.toggle("2"), BlockToggle::Blocked);
        assert!(editor.is_dirty());
        assert_eq!(editor.toggle("2"), BlockToggle::Unblocked);
        assert!(!editor.is_dirty());
        assert_eq!(editor.toggle("4"), BlockToggle::Unblocked);
        assert!(editor.blocked().is_empty());
    }

    #[test]
    fn test_booked_seat_cannot_be_blocked() {
        let mut editor = editor();
        assert_eq!(editor.toggle("1"), BlockToggle::Booked);
        assert!(!editor.is_blocked("1"));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_available_excludes_blocked_and_booked() {
        let mut designer = GridDesigner::new(SeatLayout::new_default(2, 2).unwrap());
        designer.auto_number();
        let editor = editor().with_layout(&designer.into_layout());
        assert_eq!(editor.available().unwrap(), ["2", "3"]);
    }

    #[test]
    fn test_legacy_grid_uses_row_and_column_labels() {
        let legacy = SeatLayout::from_value(serde_json::Value::Null).unwrap();
        let mut editor = TripSeatEditor::new(TripSeats {
            trip_id: 3,
            bus_id: Some(1),
            blocked: vec![],
            booked: vec!["1B".into()],
        })
        .with_layout(&legacy);

        assert_eq!(editor.available().unwrap().len(), 39);
        assert_eq!(editor.toggle("1A"), BlockToggle::Blocked);
        assert_eq!(editor.toggle("1B"), BlockToggle::Booked);
        assert_eq!(editor.available().unwrap()[..2], ["1D", "1E"]);
        assert_eq!(editor.available().unwrap().len(), 38);
    }

    #[test]
    fn test_labels_outside_layout_rejected() {
        let legacy = SeatLayout::from_value(serde_json::Value::Null).unwrap();
        let mut editor = editor().with_layout(&legacy);

        // Column C is the aisle, row 11 does not exist
        for label in ["1C", "11A", "banana"] {
            assert_eq!(editor.toggle(label), BlockToggle::UnknownSeat);
        }
        assert!(!editor.is_dirty());

        // A block left over from an older layout can still be lifted
        assert_eq!(editor.toggle("4"), BlockToggle::Unblocked);
        assert!(editor.blocked().is_empty());
    }

    #[test]
    fn test_without_layout_any_label_toggles() {
        let mut editor = editor();
        assert!(editor.available().is_none());
        assert_eq!(editor.toggle("anything"), BlockToggle::Blocked);
    }
}

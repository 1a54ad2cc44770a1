// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Busdesk library - back-office editors for a bus ticketing platform
//!
//! This crate provides the editing core behind the page-layout editor, the
//! seat-map designer and trip seat blocking: ordered collections with dense
//! order keys, dirty tracking, an explicit persistence gate, and a pluggable
//! remote store that owns all durability.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod collection;
pub mod command;
pub mod commands;
pub mod config;
pub mod draft;
pub mod editor;
pub mod error;
pub mod notify;
pub mod remote;
pub mod reorder;
pub mod seatmap;
pub mod trip_seats;

/// Core data types shared by the editors and the remote stores
pub mod types {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Stable identifier of a placed item, assigned by the remote store
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ItemId(pub u64);

    impl fmt::Display for ItemId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl From<u64> for ItemId {
        fn from(id: u64) -> Self {
            Self(id)
        }
    }

    // =========================================================================
    // Placed Items
    // =========================================================================

    /// One entry in an orderable collection
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PlacedItem<P> {
        /// Stable unique identifier, never reused
        pub id: ItemId,
        /// What is displayed at this slot
        pub payload: P,
        /// Dense 1-based display order
        pub order: u32,
        /// Shown or hidden, independent of order
        pub visible: bool,
    }

    impl<P> PlacedItem<P> {
        /// Create a visible item
        #[must_use]
        pub fn new(id: impl Into<ItemId>, payload: P, order: u32) -> Self {
            Self {
                id: id.into(),
                payload,
                order,
                visible: true,
            }
        }

        /// The `{id, order}` pair sent on persistence
        #[must_use]
        pub fn order_update(&self) -> OrderUpdate {
            OrderUpdate {
                id: self.id,
                order: self.order,
            }
        }
    }

    /// The only fields the persistence gate writes for each item
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct OrderUpdate {
        /// Item identifier
        pub id: ItemId,
        /// New display order
        pub order: u32,
    }

    /// Component shown at a page placement
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ComponentRef {
        /// Component identifier in the component library
        pub component_id: u64,
        /// Component type (hero, banner, features, stats, cta, ...)
        pub component_type: String,
        /// Internal component name
        pub component_name: String,
        /// Display title
        #[serde(default)]
        pub title: Option<String>,
        /// Page region the placement belongs to
        #[serde(default = "default_position")]
        pub position: String,
        /// Per-placement configuration overrides
        #[serde(default)]
        pub custom_config: Option<serde_json::Value>,
    }

    fn default_position() -> String {
        "main".into()
    }

    /// A page placement: a component at an ordered slot of a page layout
    pub type Placement = PlacedItem<ComponentRef>;

    /// Partial update of a payload: top-level field name to new value.
    /// A `null` value removes the field.
    pub type PayloadPatch = serde_json::Map<String, serde_json::Value>;

    // =========================================================================
    // Page Layouts
    // =========================================================================

    /// Pages that carry a server-driven layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum PageKey {
        /// Landing page
        Home,
        /// Trip search
        Search,
        /// Ticket booking
        Booking,
        /// About us
        About,
        /// Contact page
        Contact,
        /// Shared across every page
        All,
    }

    impl PageKey {
        /// Get the stable key used in storage
        #[must_use]
        pub fn code(&self) -> &'static str {
            match self {
                Self::Home => "home",
                Self::Search => "search",
                Self::Booking => "booking",
                Self::About => "about",
                Self::Contact => "contact",
                Self::All => "all",
            }
        }
    }

    /// A page layout owning one placement collection
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PageLayout {
        /// Layout identifier
        pub layout_id: u64,
        /// Which page this layout drives
        pub page_key: PageKey,
        /// Page title
        pub page_title: String,
        /// Page description
        #[serde(default)]
        pub page_description: Option<String>,
        /// Whether the layout is live
        pub is_active: bool,
    }

    // =========================================================================
    // Trips
    // =========================================================================

    /// Seat availability overrides for one trip
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct TripSeats {
        /// Trip identifier
        pub trip_id: u64,
        /// Bus running the trip, if assigned
        #[serde(default)]
        pub bus_id: Option<u64>,
        /// Seat labels withheld from sale
        #[serde(default)]
        pub blocked: Vec<String>,
        /// Seat labels held by active passengers
        #[serde(default)]
        pub booked: Vec<String>,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}

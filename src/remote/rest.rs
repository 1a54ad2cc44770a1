// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Hosted REST backend (PostgREST-style `/rest/v1/<table>` API)

use super::RemoteStore;
use crate::error::RemoteError;
use crate::seatmap::SeatLayout;
use crate::types::{
    ComponentRef, ItemId, OrderUpdate, PageLayout, PayloadPatch, PlacedItem, Placement, TripSeats,
};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Placement fields stored on the placement row rather than the component
const PLACEMENT_FIELDS: [&str; 2] = ["position", "custom_config"];

/// Client for the hosted data API.
///
/// Batch order updates are sent as one PATCH per row. The service does not
/// wrap them in a transaction, so a failure part-way leaves earlier rows
/// written; the caller is told the whole batch failed.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// Connect to a project URL with an API key.
    ///
    /// Without a timeout a request may wait indefinitely.
    pub fn new(base_url: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// URL of a table endpoint with a query string
    #[must_use]
    pub fn url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, query)
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn get<T: DeserializeOwned>(&self, table: &str, query: &str) -> Result<Vec<T>, RemoteError> {
        let url = self.url(table, query);
        debug!("GET {}", url);
        let rows = self
            .authorize(self.client.get(&url))
            .send()?
            .error_for_status()?
            .json::<Vec<T>>()?;
        Ok(rows)
    }

    fn patch(&self, table: &str, query: &str, body: &Value) -> Result<(), RemoteError> {
        let url = self.url(table, query);
        debug!("PATCH {}", url);
        self.authorize(self.client.patch(&url))
            .header("Prefer", "return=minimal")
            .json(body)
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct PlacementRow {
    placement_id: u64,
    component_id: u64,
    #[serde(default)]
    position: Option<String>,
    display_order: u32,
    is_visible: bool,
    #[serde(default)]
    custom_config: Option<Value>,
    #[serde(default)]
    component: Option<ComponentRow>,
}

#[derive(Debug, Deserialize)]
struct ComponentRow {
    component_type: String,
    component_name: String,
    #[serde(default)]
    title: Option<String>,
}

impl From<PlacementRow> for Placement {
    fn from(row: PlacementRow) -> Self {
        let (component_type, component_name, title) = match row.component {
            Some(c) => (c.component_type, c.component_name, c.title),
            None => ("unknown".to_string(), format!("component-{}", row.component_id), None),
        };
        PlacedItem {
            id: ItemId(row.placement_id),
            payload: ComponentRef {
                component_id: row.component_id,
                component_type,
                component_name,
                title,
                position: row.position.unwrap_or_else(|| "main".into()),
                custom_config: row.custom_config,
            },
            order: row.display_order,
            visible: row.is_visible,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComponentIdRow {
    component_id: u64,
}

#[derive(Debug, Deserialize)]
struct BusRow {
    #[serde(default)]
    seat_layout: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TripRow {
    trip_id: u64,
    #[serde(default)]
    bus_id: Option<u64>,
    #[serde(default)]
    blocked_seats: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PassengerRow {
    #[serde(default)]
    seats: Option<SeatRow>,
}

#[derive(Debug, Deserialize)]
struct SeatRow {
    seat_number: Value,
}

/// Seat labels stored as strings or numbers
fn labels_from(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(label_from).collect(),
        _ => Vec::new(),
    }
}

fn label_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Split a payload patch into placement-row and component-row fields
fn split_patch(patch: &PayloadPatch) -> (PayloadPatch, PayloadPatch) {
    patch
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .partition(|(k, _)| PLACEMENT_FIELDS.contains(&k.as_str()))
}

impl RemoteStore for RestStore {
    fn fetch_layouts(&self) -> Result<Vec<PageLayout>, RemoteError> {
        self.get("ui_page_layouts", "select=*&order=layout_id")
    }

    fn set_layout_active(&self, layout_id: u64, active: bool) -> Result<(), RemoteError> {
        self.patch(
            "ui_page_layouts",
            &format!("layout_id=eq.{layout_id}"),
            &json!({ "is_active": active }),
        )
    }

    fn fetch_placements(&self, layout_id: u64) -> Result<Vec<Placement>, RemoteError> {
        let rows: Vec<PlacementRow> = self.get(
            "ui_component_placements",
            &format!("select=*,component:ui_components(*)&layout_id=eq.{layout_id}&order=display_order"),
        )?;
        Ok(rows.into_iter().map(Placement::from).collect())
    }

    fn batch_update_order(&self, updates: &[OrderUpdate]) -> Result<(), RemoteError> {
        let mut failed = 0;
        for update in updates {
            let result = self.patch(
                "ui_component_placements",
                &format!("placement_id=eq.{}", update.id),
                &json!({ "display_order": update.order }),
            );
            if let Err(err) = result {
                warn!("Order update for placement {} failed: {}", update.id, err);
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(RemoteError::write(
                "placement order",
                format!("{failed} of {} updates failed", updates.len()),
            ));
        }
        Ok(())
    }

    fn toggle_visibility(&self, id: ItemId, visible: bool) -> Result<(), RemoteError> {
        self.patch(
            "ui_component_placements",
            &format!("placement_id=eq.{id}"),
            &json!({ "is_visible": visible }),
        )
    }

    fn update_payload_field(&self, id: ItemId, patch: &PayloadPatch) -> Result<(), RemoteError> {
        let (placement_fields, component_fields) = split_patch(patch);
        if !placement_fields.is_empty() {
            self.patch(
                "ui_component_placements",
                &format!("placement_id=eq.{id}"),
                &Value::Object(placement_fields),
            )?;
        }
        if !component_fields.is_empty() {
            let rows: Vec<ComponentIdRow> = self.get(
                "ui_component_placements",
                &format!("select=component_id&placement_id=eq.{id}"),
            )?;
            let row = rows.into_iter().next().ok_or_else(|| RemoteError::NotFound {
                kind: "placement",
                id: id.to_string(),
            })?;
            self.patch(
                "ui_components",
                &format!("component_id=eq.{}", row.component_id),
                &Value::Object(component_fields),
            )?;
        }
        Ok(())
    }

    fn fetch_seat_layout(&self, bus_id: u64) -> Result<SeatLayout, RemoteError> {
        let rows: Vec<BusRow> = self.get("buses", &format!("select=seat_layout&bus_id=eq.{bus_id}"))?;
        let row = rows.into_iter().next().ok_or_else(|| RemoteError::NotFound {
            kind: "bus",
            id: bus_id.to_string(),
        })?;
        Ok(SeatLayout::from_value(row.seat_layout.unwrap_or(Value::Null))?)
    }

    fn save_seat_layout(&self, bus_id: u64, layout: &SeatLayout) -> Result<(), RemoteError> {
        self.patch(
            "buses",
            &format!("bus_id=eq.{bus_id}"),
            &json!({ "seat_layout": layout }),
        )
    }

    fn fetch_trip_seats(&self, trip_id: u64) -> Result<TripSeats, RemoteError> {
        let trips: Vec<TripRow> = self.get(
            "trips",
            &format!("select=trip_id,bus_id,blocked_seats&trip_id=eq.{trip_id}"),
        )?;
        let trip = trips.into_iter().next().ok_or_else(|| RemoteError::NotFound {
            kind: "trip",
            id: trip_id.to_string(),
        })?;
        let passengers: Vec<PassengerRow> = self.get(
            "passengers",
            &format!("select=seats(seat_number)&trip_id=eq.{trip_id}&passenger_status=eq.active"),
        )?;
        Ok(TripSeats {
            trip_id: trip.trip_id,
            bus_id: trip.bus_id,
            blocked: labels_from(trip.blocked_seats),
            booked: passengers
                .iter()
                .filter_map(|p| p.seats.as_ref())
                .filter_map(|s| label_from(&s.seat_number))
                .collect(),
        })
    }

    fn save_blocked_seats(&self, trip_id: u64, blocked: &[String]) -> Result<(), RemoteError> {
        self.patch(
            "trips",
            &format!("trip_id=eq.{trip_id}"),
            &json!({ "blocked_seats": blocked }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let store = RestStore::new("https://project.example.co/", "key", None).unwrap();
        assert_eq!(
            store.url("buses", "bus_id=eq.3"),
            "https://project.example.co/rest/v1/buses?bus_id=eq.3"
        );
        assert_eq!(store.url("trips", ""), "https://project.example.co/rest/v1/trips");
    }

    #[test]
    fn test_placement_row_conversion() {
        let row: PlacementRow = serde_json::from_value(json!({
            "placement_id": 12,
            "layout_id": 1,
            "component_id": 4,
            "position": "top",
            "display_order": 3,
            "is_visible": false,
            "custom_config": null,
            "component": {"component_type": "hero", "component_name": "spring-hero", "title": "Spring"}
        }))
        .unwrap();
        let placement = Placement::from(row);
        assert_eq!(placement.id, ItemId(12));
        assert_eq!(placement.order, 3);
        assert!(!placement.visible);
        assert_eq!(placement.payload.component_type, "hero");
        assert_eq!(placement.payload.position, "top");
    }

    #[test]
    fn test_labels_accept_numbers_and_strings() {
        assert_eq!(labels_from(Some(json!([1, "2A", null]))), ["1", "2A"]);
        assert!(labels_from(Some(json!("1,2"))).is_empty());
    }

    #[test]
    fn test_split_patch() {
        let patch = json!({"title": "x", "position": "footer"}).as_object().cloned().unwrap();
        let (placement, component) = split_patch(&patch);
        assert!(placement.contains_key("position"));
        assert!(component.contains_key("title"));
        assert_eq!(placement.len() + component.len(), 2);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Editing sessions over the remote store
//!
//! A [`Workspace`] bundles the remote store, the query cache and the
//! notifier. Editors are seeded through it and every remote error is turned
//! into a notification at the call site.

use crate::cache::{keys, QueryCache};
use crate::collection::{CollectionStore, DragEnd, SaveOutcome};
use crate::command::RowCommand;
use crate::error::{EditorError, RemoteError};
use crate::notify::{Notification, Notifier};
use crate::remote::RemoteStore;
use crate::seatmap::SeatLayout;
use crate::trip_seats::TripSeatEditor;
use crate::types::{ComponentRef, ItemId, PageLayout, PayloadPatch, Placement};
use tracing::info;

/// Outcome of seeding a screen from the remote store
#[derive(Debug, Clone)]
pub enum LoadState<T> {
    /// Seeded and editable
    Ready(T),
    /// The seeding fetch failed
    Failed(String),
}

impl<T> LoadState<T> {
    /// The loaded value, if any
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// The loaded value for editing, if any
    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Failed(_) => None,
        }
    }
}

/// Placement editor for one page layout
#[derive(Debug, Clone)]
pub struct PageEditor {
    layout_id: u64,
    state: LoadState<CollectionStore<ComponentRef>>,
}

impl PageEditor {
    /// Editor over an already seeded collection (e.g. a resumed draft)
    #[must_use]
    pub fn resume(layout_id: u64, collection: CollectionStore<ComponentRef>) -> Self {
        Self {
            layout_id,
            state: LoadState::Ready(collection),
        }
    }

    /// Layout being edited
    #[must_use]
    pub fn layout_id(&self) -> u64 {
        self.layout_id
    }

    /// Seeding outcome
    #[must_use]
    pub fn state(&self) -> &LoadState<CollectionStore<ComponentRef>> {
        &self.state
    }

    /// The collection, once loaded
    #[must_use]
    pub fn collection(&self) -> Option<&CollectionStore<ComponentRef>> {
        self.state.ready()
    }

    /// Take the collection out of the editor
    #[must_use]
    pub fn into_collection(self) -> Option<CollectionStore<ComponentRef>> {
        match self.state {
            LoadState::Ready(collection) => Some(collection),
            LoadState::Failed(_) => None,
        }
    }

    /// Whether there are unsaved order changes
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.collection().is_some_and(CollectionStore::is_dirty)
    }

    /// Forward a drag gesture; ignored until the collection is loaded
    pub fn drag_end(&mut self, gesture: DragEnd) -> Result<bool, EditorError> {
        match self.state.ready_mut() {
            Some(collection) => collection.drag_end(gesture),
            None => Ok(false),
        }
    }

    fn collection_mut(&mut self) -> Result<&mut CollectionStore<ComponentRef>, EditorError> {
        let layout_id = self.layout_id;
        self.state
            .ready_mut()
            .ok_or_else(|| RemoteError::read(format!("layout {layout_id}"), "not loaded").into())
    }
}

/// Remote store, cache and notifier shared by the editors
pub struct Workspace {
    remote: Box<dyn RemoteStore>,
    cache: QueryCache,
    notifier: Box<dyn Notifier>,
}

impl Workspace {
    /// Build a workspace
    pub fn new(remote: Box<dyn RemoteStore>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            remote,
            cache: QueryCache::new(),
            notifier,
        }
    }

    /// The remote store
    #[must_use]
    pub fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    /// The query cache
    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    fn report<T>(&self, title: &str, result: Result<T, RemoteError>) -> Result<T, RemoteError> {
        if let Err(err) = &result {
            self.notify(Notification::error(title, err.to_string()));
        }
        result
    }

    // =========================================================================
    // Page Layouts
    // =========================================================================

    /// All page layouts (cached)
    pub fn layouts(&mut self) -> Result<Vec<PageLayout>, RemoteError> {
        let remote = self.remote.as_ref();
        let result = self.cache.get_or_fetch(keys::layouts(), || remote.fetch_layouts());
        self.report("Failed to load layouts", result)
    }

    /// Switch a layout on or off.
    ///
    /// A cached layout list is updated first and restored if the write is
    /// rejected.
    pub fn set_layout_active(&mut self, layout_id: u64, active: bool) -> Result<(), RemoteError> {
        let previous: Option<Vec<PageLayout>> = self.cache.get(&keys::layouts());
        if let Some(mut layouts) = previous.clone() {
            for layout in layouts.iter_mut().filter(|l| l.layout_id == layout_id) {
                layout.is_active = active;
            }
            self.cache.put(keys::layouts(), &layouts)?;
        }

        let result = self.remote.set_layout_active(layout_id, active);
        if result.is_err() {
            if let Some(layouts) = &previous {
                self.cache.put(keys::layouts(), layouts)?;
            }
        }
        self.report("Failed to update page", result)?;
        self.cache.invalidate(&keys::layouts());
        self.notify(Notification::info(
            "Page updated",
            format!("Layout {layout_id} is now {}", if active { "active" } else { "inactive" }),
        ));
        Ok(())
    }

    /// Placements of a layout (cached), for read-only views
    pub fn placements(&mut self, layout_id: u64) -> Result<Vec<Placement>, RemoteError> {
        let remote = self.remote.as_ref();
        let result = self
            .cache
            .get_or_fetch(keys::placements(layout_id), || remote.fetch_placements(layout_id));
        self.report("Failed to load page components", result)
    }

    /// Seed a placement editor from a fresh remote read
    pub fn open_page(&mut self, layout_id: u64) -> PageEditor {
        let state = match self.remote.fetch_placements(layout_id) {
            Ok(items) => {
                info!("Loaded {} placements of layout {}", items.len(), layout_id);
                LoadState::Ready(CollectionStore::seed(items))
            }
            Err(err) => {
                self.notify(Notification::error("Failed to load page components", err.to_string()));
                LoadState::Failed(err.to_string())
            }
        };
        PageEditor { layout_id, state }
    }

    /// Trigger the persistence gate of a page editor
    pub fn save_order(&mut self, editor: &mut PageEditor) -> SaveOutcome {
        let layout_id = editor.layout_id;
        let Some(collection) = editor.state.ready_mut() else {
            return SaveOutcome::NotDirty;
        };
        let outcome = collection.save(self.remote.as_ref());
        match &outcome {
            SaveOutcome::Saved { count } => {
                self.cache.invalidate(&keys::placements(layout_id));
                self.notify(Notification::info("Order saved", format!("{count} components reordered")));
            }
            SaveOutcome::Failed(err) => {
                self.notify(Notification::error("Failed to save order", err.to_string()));
            }
            SaveOutcome::NotDirty | SaveOutcome::InFlight => {}
        }
        outcome
    }

    /// Show or hide a placement, persisted immediately
    pub fn set_visibility(&mut self, editor: &mut PageEditor, id: ItemId, visible: bool) -> Result<(), EditorError> {
        let layout_id = editor.layout_id;
        let collection = editor.collection_mut()?;
        let item = collection.get(id).ok_or(EditorError::NoSuchItem(id))?;
        let command = RowCommand::visibility(item, visible);
        self.run_command(layout_id, collection, &command)
    }

    /// Change component fields of a placement, persisted immediately
    pub fn update_field(&mut self, editor: &mut PageEditor, id: ItemId, patch: PayloadPatch) -> Result<(), EditorError> {
        let layout_id = editor.layout_id;
        let collection = editor.collection_mut()?;
        let item = collection.get(id).ok_or(EditorError::NoSuchItem(id))?;
        let command = RowCommand::payload(item, patch)?;
        self.run_command(layout_id, collection, &command)
    }

    fn run_command(
        &mut self,
        layout_id: u64,
        collection: &mut CollectionStore<ComponentRef>,
        command: &RowCommand,
    ) -> Result<(), EditorError> {
        match command.execute(collection, self.remote.as_ref()) {
            Ok(()) => {
                self.cache.invalidate(&keys::placements(layout_id));
                self.notify(Notification::info("Updated", format!("Component {} updated", command.target)));
                Ok(())
            }
            Err(err) => {
                self.notify(Notification::error("Update failed", err.to_string()));
                Err(err)
            }
        }
    }

    // =========================================================================
    // Seat Maps
    // =========================================================================

    /// Seat layout of a bus (cached)
    pub fn seat_layout(&mut self, bus_id: u64) -> Result<SeatLayout, RemoteError> {
        let remote = self.remote.as_ref();
        let result = self
            .cache
            .get_or_fetch(keys::seat_layout(bus_id), || remote.fetch_seat_layout(bus_id));
        self.report("Failed to load seat layout", result)
    }

    /// Save a designed layout
    pub fn save_seat_layout(&mut self, bus_id: u64, layout: &SeatLayout) -> Result<(), RemoteError> {
        let result = self.remote.save_seat_layout(bus_id, layout);
        self.report("Failed to save seat layout", result)?;
        self.cache.invalidate(&keys::seat_layout(bus_id));
        self.notify(Notification::info(
            "Seat layout saved",
            format!("{} seats on bus {bus_id}", layout.seat_count()),
        ));
        Ok(())
    }

    // =========================================================================
    // Trip Seats
    // =========================================================================

    /// Open blocked-seat editing for a trip.
    ///
    /// When a bus is assigned its seat layout is attached, so only seats of
    /// that bus can be blocked.
    pub fn open_trip(&mut self, trip_id: u64) -> Result<TripSeatEditor, RemoteError> {
        let result = self.remote.fetch_trip_seats(trip_id);
        let seats = self.report("Failed to load seat data", result)?;
        let bus_id = seats.bus_id;
        let editor = TripSeatEditor::new(seats);
        match bus_id {
            Some(bus) => Ok(editor.with_layout(&self.seat_layout(bus)?)),
            None => Ok(editor),
        }
    }

    /// Persist the blocked-seat list of a trip
    pub fn save_trip(&mut self, editor: &mut TripSeatEditor) -> Result<(), RemoteError> {
        let result = self.remote.save_blocked_seats(editor.trip_id(), editor.blocked());
        self.report("Failed to save blocked seats", result)?;
        editor.mark_saved();
        self.cache.invalidate(&keys::trip_seats(editor.trip_id()));
        self.notify(Notification::info(
            "Saved",
            format!("{} seats blocked on trip {}", editor.blocked().len(), editor.trip_id()),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationLog, Severity};
    use crate::remote::{BusRecord, Dataset, MemoryStore, PlacementRecord};
    use crate::trip_seats::BlockToggle;
    use crate::types::{PageKey, PlacedItem, TripSeats};
    use serde_json::json;
    use std::rc::Rc;

    fn dataset() -> Dataset {
        let component = |name: &str| ComponentRef {
            component_id: 1,
            component_type: "section".into(),
            component_name: name.into(),
            title: None,
            position: "main".into(),
            custom_config: None,
        };
        Dataset {
            layouts: vec![PageLayout {
                layout_id: 1,
                page_key: PageKey::Home,
                page_title: "Home".into(),
                page_description: None,
                is_active: false,
            }],
            placements: ["A", "B", "C"]
                .iter()
                .enumerate()
                .map(|(i, name)| PlacementRecord {
                    layout_id: 1,
                    placement: PlacedItem::new(i as u64 + 1, component(name), i as u32 + 1),
                })
                .collect(),
            buses: vec![],
            trips: vec![],
        }
    }

    fn workspace() -> (Workspace, Rc<MemoryStore>, Rc<NotificationLog>) {
        workspace_with(dataset())
    }

    fn workspace_with(data: Dataset) -> (Workspace, Rc<MemoryStore>, Rc<NotificationLog>) {
        let remote = Rc::new(MemoryStore::with_dataset(data));
        let log = Rc::new(NotificationLog::new());
        let ws = Workspace::new(Box::new(Rc::clone(&remote)), Box::new(Rc::clone(&log)));
        (ws, remote, log)
    }

    #[test]
    fn test_failed_load_is_explicit() {
        let (mut ws, remote, log) = workspace();
        remote.fail_reads(true);
        let editor = ws.open_page(1);
        assert!(matches!(editor.state(), LoadState::Failed(_)));
        assert_eq!(log.errors(), 1);
    }

    #[test]
    fn test_save_order_invalidates_and_notifies() {
        let (mut ws, remote, log) = workspace();
        ws.placements(1).unwrap();
        assert_eq!(ws.cache().len(), 1);

        let mut editor = ws.open_page(1);
        editor.drag_end(DragEnd::dropped(2, 0)).unwrap();
        assert!(matches!(ws.save_order(&mut editor), SaveOutcome::Saved { count: 3 }));

        assert!(ws.cache().is_empty());
        assert_eq!(remote.order_batches(), 1);
        assert_eq!(log.entries().last().unwrap().title, "Order saved");
        let stored = remote.snapshot().placements(1).unwrap();
        assert_eq!(stored[0].payload.component_name, "C");
    }

    #[test]
    fn test_failed_save_order_keeps_edits_and_cache() {
        let (mut ws, remote, log) = workspace();
        ws.placements(1).unwrap();
        let mut editor = ws.open_page(1);
        editor.drag_end(DragEnd::dropped(2, 0)).unwrap();
        remote.fail_writes(true);

        assert!(matches!(ws.save_order(&mut editor), SaveOutcome::Failed(_)));
        assert!(editor.is_dirty());
        assert_eq!(remote.write_calls(), 1);
        assert!(ws.cache().get::<Vec<Placement>>(&keys::placements(1)).is_some());
        let last = log.entries().last().cloned().unwrap();
        assert_eq!(last.severity, Severity::Destructive);
        assert_eq!(last.title, "Failed to save order");
        assert_eq!(remote.snapshot().placements(1).unwrap()[0].payload.component_name, "A");

        // Retry once the service is back
        remote.fail_writes(false);
        assert!(matches!(ws.save_order(&mut editor), SaveOutcome::Saved { count: 3 }));
        assert_eq!(remote.write_calls(), 2);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_trip_on_legacy_bus_uses_grid_labels() {
        let mut data = dataset();
        data.buses.push(BusRecord {
            bus_id: 7,
            seat_layout: None,
        });
        data.trips.push(TripSeats {
            trip_id: 3,
            bus_id: Some(7),
            blocked: vec![],
            booked: vec!["1A".into()],
        });
        let (mut ws, remote, log) = workspace_with(data);

        let mut editor = ws.open_trip(3).unwrap();
        assert_eq!(editor.available().unwrap().len(), 39);
        assert_eq!(editor.toggle("2B"), BlockToggle::Blocked);
        assert_eq!(editor.toggle("Z9"), BlockToggle::UnknownSeat);

        ws.save_trip(&mut editor).unwrap();
        assert_eq!(remote.snapshot().trip_seats(3).unwrap().blocked, ["2B"]);
        assert_eq!(log.errors(), 0);
    }

    #[test]
    fn test_layout_toggle_refetches() {
        let (mut ws, remote, _log) = workspace();
        assert!(!ws.layouts().unwrap()[0].is_active);
        ws.layouts().unwrap();
        assert_eq!(remote.read_calls(), 1);

        ws.set_layout_active(1, true).unwrap();
        assert!(ws.layouts().unwrap()[0].is_active);
        assert_eq!(remote.read_calls(), 2);
    }

    #[test]
    fn test_rejected_toggle_restores_cached_layouts() {
        let (mut ws, remote, log) = workspace();
        ws.layouts().unwrap();
        remote.fail_writes(true);

        assert!(ws.set_layout_active(1, true).is_err());
        let cached: Vec<PageLayout> = ws.cache().get(&keys::layouts()).unwrap();
        assert!(!cached[0].is_active);
        assert_eq!(log.errors(), 1);
    }

    #[test]
    fn test_update_field_persists() {
        let (mut ws, remote, _log) = workspace();
        let mut editor = ws.open_page(1);
        let patch = json!({"title": "Summer deals"}).as_object().cloned().unwrap();
        ws.update_field(&mut editor, ItemId(2), patch).unwrap();

        let local = editor.collection().unwrap().get(ItemId(2)).unwrap();
        assert_eq!(local.payload.title.as_deref(), Some("Summer deals"));
        let stored = remote.snapshot().placements(1).unwrap();
        assert_eq!(stored[1].payload.title.as_deref(), Some("Summer deals"));
    }

    #[test]
    fn test_visibility_failure_rolls_back_and_notifies() {
        let (mut ws, remote, log) = workspace();
        let mut editor = ws.open_page(1);
        remote.fail_writes(true);

        assert!(ws.set_visibility(&mut editor, ItemId(1), false).is_err());
        assert!(editor.collection().unwrap().get(ItemId(1)).unwrap().visible);
        assert_eq!(log.errors(), 1);
    }

    #[test]
    fn test_drag_before_load_is_ignored() {
        let (mut ws, remote, _log) = workspace();
        remote.fail_reads(true);
        let mut editor = ws.open_page(1);
        assert!(!editor.drag_end(DragEnd::dropped(0, 1)).unwrap());
        assert!(!editor.is_dirty());
    }
}

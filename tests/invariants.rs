// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for the editing core
//!
//! These tests verify critical invariants:
//! 1. Order keys stay dense and drops on the own slot change nothing
//! 2. The dirty flag tracks the persisted baseline exactly
//! 3. The persistence gate never sends an unchanged order
//! 4. Grid cells keep their identity whatever is painted on them

use busdesk::cache::{keys, QueryCache};
use busdesk::collection::{CollectionStore, DragEnd, SaveOutcome, SaveRequest};
use busdesk::command::RowCommand;
use busdesk::remote::{Dataset, MemoryStore, PlacementRecord, RemoteStore};
use busdesk::reorder;
use busdesk::seatmap::{Brush, CellKind, GridDesigner, SeatCell, SeatLayout};
use busdesk::trip_seats::{BlockToggle, TripSeatEditor};
use busdesk::types::{ComponentRef, ItemId, PageKey, PageLayout, PlacedItem, Placement, TripSeats};
use proptest::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

fn component(name: &str) -> ComponentRef {
    ComponentRef {
        component_id: 1,
        component_type: "section".into(),
        component_name: name.into(),
        title: None,
        position: "main".into(),
        custom_config: None,
    }
}

fn placements(n: usize) -> Vec<Placement> {
    (0..n)
        .map(|i| PlacedItem::new(i as u64 + 1, component(&format!("c{i}")), i as u32 + 1))
        .collect()
}

fn store_with(items: &[Placement]) -> MemoryStore {
    MemoryStore::with_dataset(Dataset {
        layouts: vec![PageLayout {
            layout_id: 1,
            page_key: PageKey::Home,
            page_title: "Home".into(),
            page_description: None,
            is_active: true,
        }],
        placements: items
            .iter()
            .map(|p| PlacementRecord {
                layout_id: 1,
                placement: p.clone(),
            })
            .collect(),
        ..Dataset::default()
    })
}

fn names(store: &CollectionStore<ComponentRef>) -> Vec<(String, u32)> {
    store
        .items()
        .iter()
        .map(|item| (item.payload.component_name.clone(), item.order))
        .collect()
}

/// A list length plus a sequence of in-range moves
fn list_and_moves() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..8)))
}

fn brush() -> impl Strategy<Value = Brush> {
    prop_oneof![
        Just(Brush::Seat),
        Just(Brush::Aisle),
        Just(Brush::Door),
        Just(Brush::Stairs),
        Just(Brush::Driver),
    ]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_orders_are_dense_after_reorder(
        keys in prop::collection::vec(1u32..1000, 1..12),
        from in 0usize..12,
        to in 0usize..12,
    ) {
        let n = keys.len();
        prop_assume!(from < n && to < n && from != to);
        let mut items: Vec<PlacedItem<()>> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| PlacedItem::new(i as u64, (), *k))
            .collect();
        items.sort_by_key(|item| item.order);

        reorder::reorder(&mut items, from, to).unwrap();
        prop_assert!(reorder::is_dense(&items));
        prop_assert_eq!(items.len(), n);
    }

    #[test]
    fn prop_drop_on_own_slot_is_noop(
        keys in prop::collection::vec(1u32..1000, 1..12),
        index in 0usize..12,
    ) {
        prop_assume!(index < keys.len());
        let items: Vec<Placement> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| PlacedItem::new(i as u64, component("x"), *k))
            .collect();
        let mut store = CollectionStore::seed(items);
        let before = store.items().to_vec();
        let dirty_before = store.is_dirty();

        prop_assert!(!store.drag_end(DragEnd::dropped(index, index)).unwrap());
        prop_assert_eq!(store.items(), &before[..]);
        prop_assert_eq!(store.is_dirty(), dirty_before);
    }

    #[test]
    fn prop_dirty_tracks_baseline((n, moves) in list_and_moves()) {
        let items = placements(n);
        let remote = store_with(&items);
        let mut store = CollectionStore::seed(items);
        let baseline = store.baseline().to_vec();

        for (from, to) in moves {
            store.drag_end(DragEnd::dropped(from, to)).unwrap();
        }
        let changed = reorder::order_keys(store.items()) != baseline;
        prop_assert_eq!(store.is_dirty(), changed);

        remote.fail_writes(true);
        let failed = store.save(&remote);
        prop_assert_eq!(failed.called_remote(), changed);
        prop_assert_eq!(store.is_dirty(), changed);

        remote.fail_writes(false);
        store.save(&remote);
        prop_assert!(!store.is_dirty());
        prop_assert_eq!(remote.snapshot().placements(1).unwrap(), store.items().to_vec());
    }

    #[test]
    fn prop_resave_without_edits_calls_remote_once((n, moves) in list_and_moves()) {
        prop_assume!(n > 1);
        let items = placements(n);
        let remote = store_with(&items);
        let mut store = CollectionStore::seed(items);
        store.drag_end(DragEnd::dropped(0, n - 1)).unwrap();
        for (from, to) in moves {
            store.drag_end(DragEnd::dropped(from, to)).unwrap();
        }
        prop_assume!(store.is_dirty());

        prop_assert!(matches!(store.save(&remote), SaveOutcome::Saved { .. }), "expected SaveOutcome::Saved");
        prop_assert!(matches!(store.save(&remote), SaveOutcome::NotDirty));
        prop_assert_eq!(remote.order_batches(), 1);
    }

    #[test]
    fn prop_repaint_keeps_cell_identity(
        rows in 1u32..8,
        cols in 1u32..8,
        strokes in prop::collection::vec((0u32..8, 0u32..8, brush()), 0..30),
    ) {
        let layout = SeatLayout::new_default(rows, cols).unwrap();
        let identity = |l: &SeatLayout| -> Vec<(String, u32, u32)> {
            l.cells.iter().map(|c| (c.id.clone(), c.row, c.col)).collect()
        };
        let before = identity(&layout);
        let mut designer = GridDesigner::new(layout);

        for (row, col, brush) in strokes {
            designer.set_brush(brush);
            let painted = designer.paint(row, col);
            prop_assert_eq!(painted, row < rows && col < cols);
        }
        designer.auto_number();
        prop_assert_eq!(identity(designer.layout()), before);
    }

    #[test]
    fn prop_booked_seats_never_blocked(
        booked in prop::collection::hash_set(1u32..20, 0..10),
        toggles in prop::collection::vec(1u32..20, 0..30),
    ) {
        let mut editor = TripSeatEditor::new(TripSeats {
            trip_id: 1,
            bus_id: None,
            blocked: vec![],
            booked: booked.iter().map(ToString::to_string).collect(),
        });
        for label in toggles {
            let label = label.to_string();
            let result = editor.toggle(&label);
            prop_assert_eq!(result == BlockToggle::Booked, editor.is_booked(&label));
        }
        for label in editor.blocked() {
            prop_assert!(!editor.is_booked(label));
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_drag_third_item_to_front() {
    let items = ["A", "B", "C", "D"]
        .iter()
        .enumerate()
        .map(|(i, name)| PlacedItem::new(i as u64 + 1, component(name), i as u32 + 1))
        .collect();
    let mut store = CollectionStore::seed(items);

    assert!(store.drag_end(DragEnd::dropped(2, 0)).unwrap());
    assert_eq!(
        names(&store),
        [("C".into(), 1), ("A".into(), 2), ("B".into(), 3), ("D".into(), 4)]
    );
    assert!(store.is_dirty());
}

#[test]
fn test_auto_number_skips_non_seats() {
    let kinds = [CellKind::Seat, CellKind::Aisle, CellKind::Seat, CellKind::Seat, CellKind::Seat];
    let layout = SeatLayout {
        rows: 1,
        cols: 5,
        cells: kinds
            .iter()
            .enumerate()
            .map(|(col, kind)| SeatCell::new(0, col as u32, *kind))
            .collect(),
    };
    let mut designer = GridDesigner::new(layout);
    designer.set_brush(Brush::Driver);
    designer.paint(0, 3);

    assert_eq!(designer.auto_number(), 3);
    let labels: Vec<Option<&str>> = designer
        .layout()
        .cells
        .iter()
        .map(|c| c.label.as_deref())
        .collect();
    assert_eq!(labels, [Some("1"), None, Some("2"), Some("P"), Some("3")]);
}

#[test]
fn test_edit_during_pending_save_stays_dirty() {
    let items = placements(3);
    let remote = store_with(&items);
    let mut store = CollectionStore::seed(items);
    store.drag_end(DragEnd::dropped(0, 2)).unwrap();

    let SaveRequest::Ready(pending) = store.begin_save() else {
        panic!("expected a save ticket");
    };
    assert!(matches!(store.begin_save(), SaveRequest::InFlight));

    // The user keeps editing while the batch is on the wire
    store.drag_end(DragEnd::dropped(0, 1)).unwrap();
    let result = remote.batch_update_order(pending.updates());
    assert!(matches!(store.finish_save(pending, result), SaveOutcome::Saved { count: 3 }));

    assert!(store.is_dirty());
    assert!(!store.is_saving());
}

#[test]
fn test_failed_row_command_restores_value() {
    let items = placements(2);
    let remote = store_with(&items);
    let mut store = CollectionStore::seed(items);
    remote.fail_writes(true);

    let item = store.get(ItemId(2)).unwrap();
    let hide = RowCommand::visibility(item, false);
    assert!(hide.execute(&mut store, &remote).is_err());
    assert!(store.get(ItemId(2)).unwrap().visible);

    let item = store.get(ItemId(1)).unwrap();
    let patch = serde_json::json!({"title": "Deals", "position": null})
        .as_object()
        .cloned()
        .unwrap();
    let retitle = RowCommand::payload(item, patch).unwrap();
    assert!(retitle.execute(&mut store, &remote).is_err());
    assert_eq!(store.get(ItemId(1)).unwrap().payload, component("c0"));
}

#[test]
fn test_invalidate_prefix_drops_descendants() {
    let mut cache = QueryCache::new();
    for layout in 1..=3 {
        cache.put(keys::placements(layout), &layout).unwrap();
    }
    cache.put(keys::seat_layout(1), &0).unwrap();

    assert_eq!(cache.invalidate(&keys::all_placements()), 3);
    assert!(cache.get::<u64>(&keys::placements(2)).is_none());
    assert_eq!(cache.get::<u64>(&keys::seat_layout(1)), Some(0));
}

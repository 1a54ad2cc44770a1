// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Reorder engine - moves one item and re-keys the whole list

use crate::error::EditorError;
use crate::types::{ItemId, OrderUpdate, PlacedItem};

/// Move the element at `from` so it ends up at `to`, shifting the elements
/// in between by one slot toward the gap.
///
/// Returns `Ok(false)` when `from == to` (nothing moved).
pub fn array_move<T>(items: &mut [T], from: usize, to: usize) -> Result<bool, EditorError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(EditorError::IndexOutOfRange { index, len });
        }
    }

    if from == to {
        return Ok(false);
    }

    if from < to {
        items[from..=to].rotate_left(1);
    } else {
        items[to..=from].rotate_right(1);
    }

    Ok(true)
}

/// Assign `order = position + 1` to every item
pub fn densify<P>(items: &mut [PlacedItem<P>]) {
    for (position, item) in items.iter_mut().enumerate() {
        item.order = dense_key(position);
    }
}

/// Move an item and re-key the list.
///
/// Dropping an item on its own position leaves the list untouched, even when
/// its keys are sparse. Returns whether any item's `(id, order)` pair changed.
pub fn reorder<P>(items: &mut [PlacedItem<P>], from: usize, to: usize) -> Result<bool, EditorError> {
    let before = order_keys(items);
    if !array_move(items, from, to)? {
        return Ok(false);
    }
    densify(items);
    Ok(order_keys(items) != before)
}

/// Check that the orders are exactly `{1..N}` in list order
#[must_use]
pub fn is_dense<P>(items: &[PlacedItem<P>]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(position, item)| item.order == dense_key(position))
}

/// Snapshot the `(id, order)` sequence of a list
#[must_use]
pub fn order_keys<P>(items: &[PlacedItem<P>]) -> Vec<OrderUpdate> {
    items.iter().map(PlacedItem::order_update).collect()
}

/// Find the list position of an item
#[must_use]
pub fn position_of<P>(items: &[PlacedItem<P>], id: ItemId) -> Option<usize> {
    items.iter().position(|item| item.id == id)
}

fn dense_key(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Collection store - an ordered working copy with dirty tracking and an
//! explicit persistence gate

use crate::error::{EditorError, RemoteError};
use crate::remote::RemoteStore;
use crate::reorder;
use crate::types::{ItemId, OrderUpdate, PlacedItem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// End of a drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    /// Position the item was picked up from
    pub source: usize,
    /// Position it was dropped on; `None` when the gesture was cancelled
    pub target: Option<usize>,
}

impl DragEnd {
    /// A completed drop
    #[must_use]
    pub fn dropped(source: usize, target: usize) -> Self {
        Self {
            source,
            target: Some(target),
        }
    }

    /// A gesture released outside any drop target
    #[must_use]
    pub fn cancelled(source: usize) -> Self {
        Self {
            source,
            target: None,
        }
    }
}

/// Result of asking the persistence gate to open
#[derive(Debug)]
pub enum SaveRequest {
    /// Nothing diverged from the baseline
    NotDirty,
    /// A previous save has not completed yet
    InFlight,
    /// The gate is open; send these updates and report back
    Ready(PendingSave),
}

/// Ticket for one in-flight batch update
#[derive(Debug)]
#[must_use = "a pending save must be completed with finish_save"]
pub struct PendingSave {
    updates: Vec<OrderUpdate>,
}

impl PendingSave {
    /// The `{id, order}` pairs to send
    #[must_use]
    pub fn updates(&self) -> &[OrderUpdate] {
        &self.updates
    }
}

/// What happened when the persistence gate was triggered
#[derive(Debug)]
pub enum SaveOutcome {
    /// No call made: nothing to save
    NotDirty,
    /// No call made: a save is already pending
    InFlight,
    /// The batch update was accepted
    Saved {
        /// Number of rows sent
        count: usize,
    },
    /// The batch update failed; local edits are kept
    Failed(RemoteError),
}

impl SaveOutcome {
    /// Whether a network call was issued
    #[must_use]
    pub fn called_remote(&self) -> bool {
        matches!(self, Self::Saved { .. } | Self::Failed(_))
    }
}

/// In-memory ordered collection seeded from the remote store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStore<P> {
    items: Vec<PlacedItem<P>>,
    baseline: Vec<OrderUpdate>,
    #[serde(skip)]
    in_flight: bool,
}

impl<P> CollectionStore<P> {
    /// Seed from a remote read. Items are put in display order; the keys as
    /// fetched become the persisted baseline.
    #[must_use]
    pub fn seed(mut items: Vec<PlacedItem<P>>) -> Self {
        items.sort_by_key(|item| item.order);
        let baseline = reorder::order_keys(&items);
        Self {
            items,
            baseline,
            in_flight: false,
        }
    }

    /// Items in display order
    #[must_use]
    pub fn items(&self) -> &[PlacedItem<P>] {
        &self.items
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by id
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&PlacedItem<P>> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Get an item by id for in-place edits outside the reorder flow
    pub fn get_mut(&mut self, id: ItemId) -> Result<&mut PlacedItem<P>, EditorError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(EditorError::NoSuchItem(id))
    }

    /// The last persisted `(id, order)` sequence
    #[must_use]
    pub fn baseline(&self) -> &[OrderUpdate] {
        &self.baseline
    }

    /// True iff the current `(id, order)` sequence differs from the baseline
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.items.len() != self.baseline.len()
            || self
                .items
                .iter()
                .zip(&self.baseline)
                .any(|(item, saved)| item.order_update() != *saved)
    }

    /// Whether a batch update is pending
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.in_flight
    }

    /// Apply the end of a drag gesture.
    ///
    /// Returns whether the order changed. Cancelled gestures and drops on the
    /// starting position change nothing.
    pub fn drag_end(&mut self, gesture: DragEnd) -> Result<bool, EditorError> {
        let Some(target) = gesture.target else {
            debug!("Drag from {} cancelled", gesture.source);
            return Ok(false);
        };
        let changed = reorder::reorder(&mut self.items, gesture.source, target)?;
        if changed {
            debug!("Moved item {} -> {}", gesture.source, target);
        }
        Ok(changed)
    }

    /// Drag an item onto the slot currently held by another item.
    ///
    /// `over` is `None` when the gesture ended outside the list.
    pub fn move_by_id(&mut self, active: ItemId, over: Option<ItemId>) -> Result<bool, EditorError> {
        let source =
            reorder::position_of(&self.items, active).ok_or(EditorError::NoSuchItem(active))?;
        let target = match over {
            Some(id) => Some(reorder::position_of(&self.items, id).ok_or(EditorError::NoSuchItem(id))?),
            None => None,
        };
        self.drag_end(DragEnd { source, target })
    }

    /// Open the persistence gate.
    ///
    /// The gate stays closed until [`finish_save`](Self::finish_save) is
    /// called with the returned ticket. Edits remain allowed meanwhile.
    pub fn begin_save(&mut self) -> SaveRequest {
        if self.in_flight {
            return SaveRequest::InFlight;
        }
        if !self.is_dirty() {
            return SaveRequest::NotDirty;
        }
        self.in_flight = true;
        SaveRequest::Ready(PendingSave {
            updates: reorder::order_keys(&self.items),
        })
    }

    /// Close the gate with the remote result.
    ///
    /// On success the sent keys become the baseline, so edits made while the
    /// call was pending stay dirty. On failure nothing local changes.
    pub fn finish_save(&mut self, pending: PendingSave, result: Result<(), RemoteError>) -> SaveOutcome {
        self.in_flight = false;
        match result {
            Ok(()) => {
                let count = pending.updates.len();
                self.baseline = pending.updates;
                info!("Saved order of {} items", count);
                SaveOutcome::Saved { count }
            }
            Err(err) => {
                warn!("Order save failed: {}", err);
                SaveOutcome::Failed(err)
            }
        }
    }

    /// Run the persistence gate against a remote store in one step
    pub fn save<R: RemoteStore + ?Sized>(&mut self, remote: &R) -> SaveOutcome {
        match self.begin_save() {
            SaveRequest::NotDirty => SaveOutcome::NotDirty,
            SaveRequest::InFlight => SaveOutcome::InFlight,
            SaveRequest::Ready(pending) => {
                let result = remote.batch_update_order(pending.updates());
                self.finish_save(pending, result)
            }
        }
    }
}

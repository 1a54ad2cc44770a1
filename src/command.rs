// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Single-row mutations as reversible commands
//!
//! Visibility toggles and payload edits are applied locally and persisted
//! right away. Each carries the patch it intends and the patch that undoes
//! it, so a rejected write puts the row back exactly as it was.

use crate::collection::CollectionStore;
use crate::error::{EditorError, RemoteError, ValidationError};
use crate::remote::RemoteStore;
use crate::types::{ItemId, PayloadPatch, PlacedItem};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// A change to one row outside the reorder flow
#[derive(Debug, Clone, PartialEq)]
pub enum RowPatch {
    /// Set the visible flag
    Visibility(bool),
    /// Replace top-level payload fields
    Payload(PayloadPatch),
}

/// A row mutation with its inverse
#[derive(Debug, Clone, PartialEq)]
pub struct RowCommand {
    /// Row the command targets
    pub target: ItemId,
    /// What the user asked for
    pub intended: RowPatch,
    /// What restores the row
    pub rollback: RowPatch,
}

impl RowCommand {
    /// Show or hide an item
    #[must_use]
    pub fn visibility<P>(item: &PlacedItem<P>, visible: bool) -> Self {
        Self {
            target: item.id,
            intended: RowPatch::Visibility(visible),
            rollback: RowPatch::Visibility(item.visible),
        }
    }

    /// Change payload fields; the rollback captures their current values
    pub fn payload<P: Serialize>(item: &PlacedItem<P>, patch: PayloadPatch) -> Result<Self, ValidationError> {
        let current = to_object(&item.payload)?;
        let rollback = patch
            .keys()
            .map(|key| (key.clone(), current.get(key).cloned().unwrap_or(Value::Null)))
            .collect();
        Ok(Self {
            target: item.id,
            intended: RowPatch::Payload(patch),
            rollback: RowPatch::Payload(rollback),
        })
    }

    /// Apply the intended patch to the local collection
    pub fn apply<P>(&self, store: &mut CollectionStore<P>) -> Result<(), EditorError>
    where
        P: Serialize + DeserializeOwned,
    {
        apply_row_patch(store, self.target, &self.intended)
    }

    /// Apply the rollback patch to the local collection
    pub fn revert<P>(&self, store: &mut CollectionStore<P>) -> Result<(), EditorError>
    where
        P: Serialize + DeserializeOwned,
    {
        apply_row_patch(store, self.target, &self.rollback)
    }

    /// Persist the intended patch
    pub fn send<R: RemoteStore + ?Sized>(&self, remote: &R) -> Result<(), RemoteError> {
        match &self.intended {
            RowPatch::Visibility(visible) => remote.toggle_visibility(self.target, *visible),
            RowPatch::Payload(patch) => remote.update_payload_field(self.target, patch),
        }
    }

    /// Apply locally, persist, and revert if the write is rejected
    pub fn execute<P, R>(&self, store: &mut CollectionStore<P>, remote: &R) -> Result<(), EditorError>
    where
        P: Serialize + DeserializeOwned,
        R: RemoteStore + ?Sized,
    {
        self.apply(store)?;
        if let Err(err) = self.send(remote) {
            warn!("Write to item {} rejected, rolling back: {}", self.target, err);
            self.revert(store)?;
            return Err(err.into());
        }
        debug!("Item {} updated", self.target);
        Ok(())
    }
}

fn apply_row_patch<P>(store: &mut CollectionStore<P>, id: ItemId, patch: &RowPatch) -> Result<(), EditorError>
where
    P: Serialize + DeserializeOwned,
{
    let item = store.get_mut(id)?;
    match patch {
        RowPatch::Visibility(visible) => item.visible = *visible,
        RowPatch::Payload(fields) => item.payload = apply_patch(&item.payload, fields)?,
    }
    Ok(())
}

/// Merge a patch into a payload, removing fields patched to `null`.
///
/// Fails when the payload is not an object or the result no longer
/// deserializes into `P`.
pub fn apply_patch<P>(payload: &P, patch: &PayloadPatch) -> Result<P, ValidationError>
where
    P: Serialize + DeserializeOwned,
{
    let mut object = to_object(payload)?;
    for (key, value) in patch {
        if value.is_null() {
            object.remove(key);
        } else {
            object.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(Value::Object(object)).map_err(|e| ValidationError::Patch(e.to_string()))
}

fn to_object<P: Serialize>(payload: &P) -> Result<PayloadPatch, ValidationError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ValidationError::Patch("payload is not an object".into())),
        Err(e) => Err(ValidationError::Patch(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryStore;
    use crate::types::ComponentRef;
    use serde_json::json;

    fn component(title: Option<&str>) -> ComponentRef {
        ComponentRef {
            component_id: 4,
            component_type: "hero".into(),
            component_name: "main-hero".into(),
            title: title.map(String::from),
            position: "main".into(),
            custom_config: None,
        }
    }

    fn patch(value: serde_json::Value) -> PayloadPatch {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_apply_patch_sets_and_removes() {
        let payload = component(Some("Old"));
        let updated = apply_patch(&payload, &patch(json!({"title": "New"}))).unwrap();
        assert_eq!(updated.title.as_deref(), Some("New"));

        let cleared = apply_patch(&updated, &patch(json!({"title": null}))).unwrap();
        assert_eq!(cleared.title, None);
    }

    #[test]
    fn test_apply_patch_rejects_wrong_type() {
        let payload = component(None);
        let err = apply_patch(&payload, &patch(json!({"component_id": "four"}))).unwrap_err();
        assert!(matches!(err, ValidationError::Patch(_)));
    }

    #[test]
    fn test_rollback_captures_previous_values() {
        let item = PlacedItem::new(9, component(None), 1);
        let command = RowCommand::payload(&item, patch(json!({"title": "Hello"}))).unwrap();
        assert_eq!(command.rollback, RowPatch::Payload(patch(json!({"title": null}))));
    }

    #[test]
    fn test_failed_write_reverts_visibility() {
        let mut store = CollectionStore::seed(vec![PlacedItem::new(9, component(None), 1)]);
        let remote = MemoryStore::new();
        remote.fail_writes(true);

        let command = RowCommand::visibility(&store.items()[0], false);
        let err = command.execute(&mut store, &remote).unwrap_err();

        assert!(matches!(err, EditorError::Remote(_)));
        assert!(store.items()[0].visible);
    }

    #[test]
    fn test_failed_write_reverts_payload() {
        let mut store = CollectionStore::seed(vec![PlacedItem::new(9, component(Some("Keep")), 1)]);
        let remote = MemoryStore::new();
        remote.fail_writes(true);

        let command = RowCommand::payload(&store.items()[0], patch(json!({"title": "Lost"}))).unwrap();
        assert!(command.execute(&mut store, &remote).is_err());
        assert_eq!(store.items()[0].payload.title.as_deref(), Some("Keep"));
    }
}

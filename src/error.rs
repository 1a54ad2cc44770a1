// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for the editors and remote stores

use crate::types::ItemId;
use thiserror::Error;

/// Failure talking to the external data service
#[derive(Debug, Error)]
pub enum RemoteError {
    /// A read did not return usable data
    #[error("failed to read {what}: {reason}")]
    Read {
        /// What was being read
        what: String,
        /// Underlying cause
        reason: String,
    },

    /// A mutation was rejected or could not be delivered
    #[error("failed to write {what}: {reason}")]
    Write {
        /// What was being written
        what: String,
        /// Underlying cause
        reason: String,
    },

    /// A row addressed by a mutation does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Row kind (placement, layout, bus, trip)
        kind: &'static str,
        /// Row identifier
        id: String,
    },

    /// HTTP transport failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Local file access failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed stored or wire data
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RemoteError {
    /// Shorthand for a rejected write
    pub fn write(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Write {
            what: what.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a failed read
    pub fn read(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Read {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

/// Local input rejected before any remote call is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Grid dimensions outside the accepted range
    #[error("{field} must be between 1 and {max}, got {value}")]
    Dimension {
        /// `rows` or `cols`
        field: &'static str,
        /// Rejected value
        value: u32,
        /// Upper bound
        max: u32,
    },

    /// A required text field was left blank
    #[error("{0} is required")]
    Required(&'static str),

    /// A payload patch could not be applied to the item
    #[error("invalid patch: {0}")]
    Patch(String),
}

/// Errors raised by the in-memory editors
#[derive(Debug, Error)]
pub enum EditorError {
    /// A drag referenced a position outside the list
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Collection length
        len: usize,
    },

    /// No item with this id in the collection
    #[error("no such item: {0}")]
    NoSuchItem(ItemId),

    /// No grid cell at this coordinate
    #[error("no cell at row {row}, col {col}")]
    NoSuchCell {
        /// Row index
        row: u32,
        /// Column index
        col: u32,
    },

    /// Input failed local validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote store failed
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

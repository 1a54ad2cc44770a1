// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Seat-map grid designer
//!
//! A bus seat layout is a `rows x cols` grid of cells addressed by
//! `(row, col)`. The designer paints cells with a brush, numbers seats, and
//! lets an operator override individual labels. Coordinates are fixed for the
//! life of a cell; only its kind, class and label change.

use crate::error::{EditorError, ValidationError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use tracing::debug;

/// Largest accepted row or column count
pub const MAX_DIMENSION: u32 = 30;

/// Default designer grid (rows)
pub const DEFAULT_ROWS: u32 = 12;

/// Default designer grid (columns)
pub const DEFAULT_COLS: u32 = 4;

/// Label given to the driver cell
pub const DRIVER_LABEL: &str = "P";

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Sellable seat
    Seat,
    /// Walkway
    Aisle,
    /// Door
    Door,
    /// Stairs (double-deckers)
    Stairs,
    /// Nothing
    Empty,
    /// Driver position
    Driver,
}

impl CellKind {
    /// Parse a kind from its storage name
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "seat" => Some(Self::Seat),
            "aisle" => Some(Self::Aisle),
            "door" => Some(Self::Door),
            "stairs" => Some(Self::Stairs),
            "empty" => Some(Self::Empty),
            "driver" => Some(Self::Driver),
            _ => None,
        }
    }
}

/// Seat class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatClass {
    /// Regular seat
    #[default]
    Standard,
    /// Premium seat
    Vip,
}

impl SeatClass {
    /// Parse a class from its storage name
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "vip" => Some(Self::Vip),
            _ => None,
        }
    }
}

/// Paint tool of the designer. `Empty` is not paintable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Brush {
    /// Paint seats
    #[default]
    Seat,
    /// Paint aisles
    Aisle,
    /// Paint doors
    Door,
    /// Paint stairs
    Stairs,
    /// Paint the driver position
    Driver,
}

impl Brush {
    /// Parse a brush from its name
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match CellKind::parse(s)? {
            CellKind::Seat => Some(Self::Seat),
            CellKind::Aisle => Some(Self::Aisle),
            CellKind::Door => Some(Self::Door),
            CellKind::Stairs => Some(Self::Stairs),
            CellKind::Driver => Some(Self::Driver),
            CellKind::Empty => None,
        }
    }

    /// Cell kind this brush paints
    #[must_use]
    pub fn kind(self) -> CellKind {
        match self {
            Self::Seat => CellKind::Seat,
            Self::Aisle => CellKind::Aisle,
            Self::Door => CellKind::Door,
            Self::Stairs => CellKind::Stairs,
            Self::Driver => CellKind::Driver,
        }
    }
}

/// One grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatCell {
    /// `"{row}-{col}"`
    pub id: String,
    /// What occupies the cell
    #[serde(rename = "type")]
    pub kind: CellKind,
    /// Seat number or fixed marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Seat class, only meaningful for seats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<SeatClass>,
    /// Fare delta applied to this seat
    #[serde(default, rename = "priceAdjustment", skip_serializing_if = "Option::is_none")]
    pub price_adjustment: Option<f64>,
    /// Zero-based row
    pub row: u32,
    /// Zero-based column
    pub col: u32,
}

impl SeatCell {
    /// Create an unlabeled cell at a coordinate
    #[must_use]
    pub fn new(row: u32, col: u32, kind: CellKind) -> Self {
        Self {
            id: format!("{row}-{col}"),
            kind,
            label: None,
            class: None,
            price_adjustment: None,
            row,
            col,
        }
    }

    /// Whether this cell is a seat
    #[must_use]
    pub fn is_seat(&self) -> bool {
        self.kind == CellKind::Seat
    }

    /// Label a passenger sees: the stored one, else row number plus column
    /// letter (`"1A"`, `"2C"`)
    #[must_use]
    pub fn display_label(&self) -> Cow<'_, str> {
        match &self.label {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(format!("{}{}", u64::from(self.row) + 1, column_letter(self.col))),
        }
    }
}

fn column_letter(col: u32) -> char {
    u32::from(b'A').checked_add(col).and_then(char::from_u32).unwrap_or('?')
}

/// A bus seat layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatLayout {
    /// Row count
    pub rows: u32,
    /// Column count
    pub cols: u32,
    /// Cells in storage order
    #[serde(default)]
    pub cells: Vec<SeatCell>,
}

impl SeatLayout {
    /// Row-major grid with column 2 as the aisle and seats elsewhere
    pub fn new_default(rows: u32, cols: u32) -> Result<Self, ValidationError> {
        validate_dimensions(rows, cols)?;
        let cells = (0..rows)
            .flat_map(|row| {
                (0..cols).map(move |col| {
                    let kind = if col == 2 { CellKind::Aisle } else { CellKind::Seat };
                    SeatCell::new(row, col, kind)
                })
            })
            .collect();
        Ok(Self { rows, cols, cells })
    }

    /// Decode a stored layout leniently.
    ///
    /// Accepts the layout object or a JSON string containing it. A layout
    /// without cells becomes the default grid for its dimensions, and a
    /// missing layout becomes the legacy 10x5 coach. Dimensions outside
    /// `1..=MAX_DIMENSION` are an error. Cells outside the grid are dropped
    /// and only the first cell at each coordinate is kept.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        use serde::de::Error as _;

        let value = match value {
            serde_json::Value::String(raw) => serde_json::from_str(&raw)?,
            other => other,
        };
        if value.get("cells").is_none() {
            return Ok(legacy_default());
        }
        let mut layout: Self = serde_json::from_value(value)?;
        validate_dimensions(layout.rows, layout.cols).map_err(serde_json::Error::custom)?;
        if layout.cells.is_empty() {
            return Self::new_default(layout.rows, layout.cols).map_err(serde_json::Error::custom);
        }

        let (rows, cols) = (layout.rows, layout.cols);
        let stored = layout.cells.len();
        let mut seen = HashSet::new();
        layout
            .cells
            .retain(|c| c.row < rows && c.col < cols && seen.insert((c.row, c.col)));
        if layout.cells.len() < stored {
            debug!("Dropped {} stray cells from stored layout", stored - layout.cells.len());
        }
        Ok(layout)
    }

    /// Get the cell at a coordinate
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&SeatCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    fn cell_index(&self, row: u32, col: u32) -> Option<usize> {
        self.cells.iter().position(|c| c.row == row && c.col == col)
    }

    /// Number of seat cells
    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_seat()).count()
    }

    /// Display labels of seat cells in storage order
    #[must_use]
    pub fn seat_labels(&self) -> Vec<Cow<'_, str>> {
        self.cells
            .iter()
            .filter(|c| c.is_seat())
            .map(SeatCell::display_label)
            .collect()
    }

    /// Seat labels used more than once, with their counts.
    ///
    /// Duplicates are allowed; this is a report for the operator.
    #[must_use]
    pub fn duplicate_labels(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for label in self.seat_labels() {
            *counts.entry(label.into_owned()).or_default() += 1;
        }
        counts.retain(|_, n| *n > 1);
        counts
    }

    /// Render the grid as text, one line per row.
    ///
    /// Never draws more than `MAX_DIMENSION` rows or columns.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in 0..self.rows.min(MAX_DIMENSION) {
            let mut line = String::new();
            for col in 0..self.cols.min(MAX_DIMENSION) {
                let token = match self.cell(row, col) {
                    None => "    ".to_string(),
                    Some(cell) => match cell.kind {
                        CellKind::Seat => {
                            let marker = if cell.class == Some(SeatClass::Vip) { '*' } else { ' ' };
                            format!("{:>3}{}", cell.display_label(), marker)
                        }
                        CellKind::Aisle => "  . ".to_string(),
                        CellKind::Door => " [] ".to_string(),
                        CellKind::Stairs => " ## ".to_string(),
                        CellKind::Driver => format!("{:>3} ", cell.label.as_deref().unwrap_or(DRIVER_LABEL)),
                        CellKind::Empty => "    ".to_string(),
                    },
                };
                line.push_str(&token);
            }
            let _ = writeln!(out, "{}", line.trim_end());
        }
        out
    }
}

fn legacy_default() -> SeatLayout {
    SeatLayout::new_default(10, 5).unwrap_or(SeatLayout {
        rows: 10,
        cols: 5,
        cells: Vec::new(),
    })
}

/// Check grid dimensions before any remote call
pub fn validate_dimensions(rows: u32, cols: u32) -> Result<(), ValidationError> {
    for (field, value) in [("rows", rows), ("cols", cols)] {
        if value == 0 || value > MAX_DIMENSION {
            return Err(ValidationError::Dimension {
                field,
                value,
                max: MAX_DIMENSION,
            });
        }
    }
    Ok(())
}

/// Interactive designer state over one layout
#[derive(Debug, Clone)]
pub struct GridDesigner {
    layout: SeatLayout,
    brush: Brush,
    brush_class: SeatClass,
    selected: Option<(u32, u32)>,
}

impl GridDesigner {
    /// Start designing an existing layout with the seat brush
    #[must_use]
    pub fn new(layout: SeatLayout) -> Self {
        Self {
            layout,
            brush: Brush::default(),
            brush_class: SeatClass::default(),
            selected: None,
        }
    }

    /// The layout being edited
    #[must_use]
    pub fn layout(&self) -> &SeatLayout {
        &self.layout
    }

    /// Finish editing and hand the layout back
    #[must_use]
    pub fn into_layout(self) -> SeatLayout {
        self.layout
    }

    /// Current brush
    #[must_use]
    pub fn brush(&self) -> Brush {
        self.brush
    }

    /// Select the paint tool
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    /// Select the class given to painted seats
    pub fn set_brush_class(&mut self, class: SeatClass) {
        self.brush_class = class;
    }

    /// Currently selected cell
    #[must_use]
    pub fn selected(&self) -> Option<&SeatCell> {
        let (row, col) = self.selected?;
        self.layout.cell(row, col)
    }

    /// Paint the cell at a coordinate with the current brush.
    ///
    /// Seats get the brush class and the label `seat count + 1`, counted
    /// before the paint. Returns `false` when no cell sits at the coordinate.
    pub fn paint(&mut self, row: u32, col: u32) -> bool {
        let Some(index) = self.layout.cell_index(row, col) else {
            return false;
        };
        let seat_count = self.layout.seat_count();
        let cell = &mut self.layout.cells[index];

        cell.kind = self.brush.kind();
        match self.brush {
            Brush::Seat => {
                cell.class = Some(self.brush_class);
                cell.label = Some((seat_count + 1).to_string());
            }
            Brush::Driver => {
                cell.class = None;
                cell.label = Some(DRIVER_LABEL.to_string());
            }
            Brush::Aisle | Brush::Door | Brush::Stairs => {
                cell.class = None;
                cell.label = None;
            }
        }
        debug!("Painted {} as {:?}", cell.id, cell.kind);
        self.selected = Some((row, col));
        true
    }

    /// Label every seat `1..K` in storage order, overwriting existing labels.
    ///
    /// Returns the number of seats labelled.
    pub fn auto_number(&mut self) -> usize {
        let mut counter = 0;
        for cell in self.layout.cells.iter_mut().filter(|c| c.is_seat()) {
            counter += 1;
            cell.label = Some(counter.to_string());
        }
        counter
    }

    /// Override the label of one cell and select it
    pub fn set_label(&mut self, row: u32, col: u32, label: &str) -> Result<(), EditorError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ValidationError::Required("label").into());
        }
        let index = self
            .layout
            .cell_index(row, col)
            .ok_or(EditorError::NoSuchCell { row, col })?;
        self.layout.cells[index].label = Some(label.to_string());
        self.selected = Some((row, col));
        Ok(())
    }

    /// Change the grid dimensions.
    ///
    /// Cells outside the new bounds are dropped; new coordinates get empty
    /// cells appended after the survivors.
    pub fn resize(&mut self, rows: u32, cols: u32) -> Result<(), ValidationError> {
        validate_dimensions(rows, cols)?;
        self.layout.cells.retain(|c| c.row < rows && c.col < cols);
        for row in 0..rows {
            for col in 0..cols {
                if self.layout.cell_index(row, col).is_none() {
                    self.layout.cells.push(SeatCell::new(row, col, CellKind::Empty));
                }
            }
        }
        self.layout.rows = rows;
        self.layout.cols = cols;
        if self.selected.is_some_and(|(r, c)| r >= rows || c >= cols) {
            self.selected = None;
        }
        Ok(())
    }
}

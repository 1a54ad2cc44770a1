// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use busdesk::seatmap::{validate_dimensions, GridDesigner, SeatLayout};
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(layout) = SeatLayout::from_value(value) {
        assert!(validate_dimensions(layout.rows, layout.cols).is_ok());
        let coords: HashSet<_> = layout.cells.iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(coords.len(), layout.cells.len());
        assert!(layout.cells.iter().all(|c| c.row < layout.rows && c.col < layout.cols));
        let _ = layout.render();
        let _ = layout.duplicate_labels();
        let mut designer = GridDesigner::new(layout);
        let count = designer.auto_number();
        assert_eq!(count, designer.layout().seat_count());
    }
});

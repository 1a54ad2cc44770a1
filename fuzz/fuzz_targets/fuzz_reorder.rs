// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use busdesk::reorder;
use busdesk::types::PlacedItem;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (Vec<u32>, Vec<(u8, u8)>)| {
    let (keys, moves) = input;
    let mut items: Vec<PlacedItem<()>> = keys
        .iter()
        .enumerate()
        .map(|(i, order)| PlacedItem::new(i as u64, (), *order))
        .collect();
    items.sort_by_key(|item| item.order);

    for (from, to) in moves {
        let (from, to) = (usize::from(from), usize::from(to));
        match reorder::reorder(&mut items, from, to) {
            Ok(true) => assert!(reorder::is_dense(&items)),
            Ok(false) => assert_eq!(from, to),
            Err(_) => assert!(from >= items.len() || to >= items.len()),
        }
    }
    assert_eq!(items.len(), keys.len());
});

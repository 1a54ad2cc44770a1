// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Trip commands - withhold seats from sale

use super::Context;
use crate::trip_seats::BlockToggle;
use anyhow::Result;
use serde_json::json;

/// Run trip command
pub fn run(ctx: &Context, action: &str, trip: u64, labels: &[String]) -> Result<()> {
    let mut ws = ctx.workspace()?;

    match action {
        "seats" => {
            let editor = ws.open_trip(trip)?;
            let available = editor.available();

            if ctx.json {
                return ctx.print_json(&json!({
                    "trip_id": trip,
                    "bus_id": editor.bus_id(),
                    "blocked": editor.blocked(),
                    "available": available.as_deref().unwrap_or_default(),
                }));
            }
            println!("Trip {}:", trip);
            match editor.bus_id() {
                Some(bus) => println!("  bus: {}", bus),
                None => println!("  bus: {}", ctx.dim("unassigned")),
            }
            println!("  blocked ({}): {}", editor.blocked().len(), editor.blocked().join(", "));
            if let Some(available) = &available {
                println!("  available ({}): {}", available.len(), available.join(", "));
            }
        }

        "block" => {
            if labels.is_empty() {
                anyhow::bail!("At least one seat label is required");
            }
            let mut editor = ws.open_trip(trip)?;
            for label in labels {
                match editor.toggle(label) {
                    BlockToggle::Blocked => println!("Blocked seat {}", label),
                    BlockToggle::Unblocked => println!("Unblocked seat {}", label),
                    BlockToggle::Booked => {
                        println!("{}", ctx.warn(&format!("Seat {label} is booked and cannot be blocked")));
                    }
                    BlockToggle::UnknownSeat => {
                        println!("{}", ctx.warn(&format!("Seat {label} does not exist on this bus")));
                    }
                }
            }
            if editor.is_dirty() {
                ws.save_trip(&mut editor)?;
                println!("{} {} blocked seats", ctx.good("Saved"), editor.blocked().len());
            } else {
                println!("Nothing to save");
            }
        }

        other => {
            anyhow::bail!("Unknown action: {}. Valid: seats, block", other);
        }
    }

    Ok(())
}

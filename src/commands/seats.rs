// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Seat map commands - design the seat grid of a bus
//!
//! Designer edits go to a draft: `init`, `paint`, `number`, `label` and
//! `resize` change it, `save` writes the layout and `discard` drops it.

use super::{arg, require_id, Context};
use crate::draft::SeatDraft;
use crate::editor::Workspace;
use crate::error::ValidationError;
use crate::seatmap::{validate_dimensions, Brush, GridDesigner, SeatClass, SeatLayout, DEFAULT_COLS, DEFAULT_ROWS};
use anyhow::{Context as _, Result};
use tracing::warn;

/// Arguments for seat commands
#[derive(Debug, Default)]
pub struct SeatArgs {
    /// Grid rows for `init`
    pub rows: Option<u32>,
    /// Grid columns for `init`
    pub cols: Option<u32>,
    /// Brush for `paint`
    pub brush: Option<String>,
    /// Seat class for `paint`
    pub class: Option<String>,
}

/// Run seats command
pub fn run(ctx: &Context, action: &str, bus: Option<u64>, args: &[String], opts: SeatArgs) -> Result<()> {
    let bus = require_id(bus, "Bus")?;
    let mut ws = ctx.workspace()?;
    let cache_dir = &ctx.config.cache_dir;

    match action {
        "show" => {
            let draft = SeatDraft::load(cache_dir, bus)?;
            let layout = match &draft {
                Some(draft) => draft.layout.clone(),
                None => ws.seat_layout(bus)?,
            };
            if ctx.json {
                return ctx.print_json(&layout);
            }
            print_layout(ctx, bus, &layout);
            if let Some(draft) = &draft {
                print_dirty(ctx, draft);
            }
        }

        "init" => {
            let layout = SeatLayout::new_default(
                opts.rows.unwrap_or(DEFAULT_ROWS),
                opts.cols.unwrap_or(DEFAULT_COLS),
            )?;
            let mut designer = GridDesigner::new(layout);
            designer.auto_number();

            let mut draft = open_draft(ctx, &mut ws, bus)?;
            draft.layout = designer.into_layout();
            draft.store(cache_dir)?;
            print_layout(ctx, bus, &draft.layout);
            print_dirty(ctx, &draft);
        }

        "paint" => {
            let row: u32 = arg(args, 0, "row")?;
            let col: u32 = arg(args, 1, "col")?;
            let brush = match &opts.brush {
                Some(brush) => Some(Brush::parse(brush).ok_or_else(|| {
                    anyhow::anyhow!("Unknown brush: {}. Valid: seat, aisle, door, stairs, driver", brush)
                })?),
                None => None,
            };
            let class = match &opts.class {
                Some(class) => Some(
                    SeatClass::parse(class)
                        .ok_or_else(|| anyhow::anyhow!("Unknown seat class: {}. Valid: standard, vip", class))?,
                ),
                None => None,
            };

            let mut draft = open_draft(ctx, &mut ws, bus)?;
            let mut designer = GridDesigner::new(draft.layout);
            if let Some(brush) = brush {
                designer.set_brush(brush);
            }
            if let Some(class) = class {
                designer.set_brush_class(class);
            }
            if !designer.paint(row, col) {
                anyhow::bail!("No cell at row {}, col {} on bus {}", row, col, bus);
            }
            if let Some(cell) = designer.selected() {
                println!(
                    "Painted {} as {:?}{}",
                    cell.id,
                    cell.kind,
                    cell.label.as_deref().map(|l| format!(" '{l}'")).unwrap_or_default()
                );
            }
            draft.layout = designer.into_layout();
            draft.store(cache_dir)?;
            print_dirty(ctx, &draft);
        }

        "number" => {
            let mut draft = open_draft(ctx, &mut ws, bus)?;
            let mut designer = GridDesigner::new(draft.layout);
            let count = designer.auto_number();
            draft.layout = designer.into_layout();
            draft.store(cache_dir)?;
            println!("Numbered {} seats", count);
            print_dirty(ctx, &draft);
        }

        "label" => {
            let row: u32 = arg(args, 0, "row")?;
            let col: u32 = arg(args, 1, "col")?;
            let label: String = arg(args, 2, "label")?;
            let label = label.trim();
            if label.is_empty() {
                return Err(ValidationError::Required("label").into());
            }

            let mut draft = open_draft(ctx, &mut ws, bus)?;
            let mut designer = GridDesigner::new(draft.layout);
            designer.set_label(row, col, label)?;
            draft.layout = designer.into_layout();
            draft.store(cache_dir)?;
            println!("Labelled {}-{} '{}'", row, col, label);
            warn_duplicates(ctx, &draft.layout);
            print_dirty(ctx, &draft);
        }

        "resize" => {
            let rows: u32 = arg(args, 0, "rows")?;
            let cols: u32 = arg(args, 1, "cols")?;
            validate_dimensions(rows, cols)?;

            let mut draft = open_draft(ctx, &mut ws, bus)?;
            let mut designer = GridDesigner::new(draft.layout);
            designer.resize(rows, cols)?;
            draft.layout = designer.into_layout();
            draft.store(cache_dir)?;
            print_layout(ctx, bus, &draft.layout);
            print_dirty(ctx, &draft);
        }

        "save" => {
            let Some(draft) = SeatDraft::load(cache_dir, bus)? else {
                println!("No draft for bus {}", bus);
                return Ok(());
            };
            if !draft.is_dirty() {
                println!("Nothing to save");
                return Ok(());
            }
            let stored = ws
                .remote()
                .fetch_seat_layout(bus)
                .with_context(|| format!("Failed to load seat layout of bus {bus}"))?;
            if draft.is_stale(&stored) {
                warn!("Seat layout of bus {} changed remotely since the draft was opened; saving overwrites it", bus);
            }

            ws.save_seat_layout(bus, &draft.layout)
                .with_context(|| format!("Failed to save seat layout of bus {bus}; draft kept"))?;
            SeatDraft::discard(cache_dir, bus)?;
            println!("{} seat layout of bus {} ({} seats)", ctx.good("Saved"), bus, draft.layout.seat_count());
        }

        "discard" => {
            if SeatDraft::discard(cache_dir, bus)? {
                println!("Discarded draft for bus {}", bus);
            } else {
                println!("No draft for bus {}", bus);
            }
        }

        other => {
            anyhow::bail!(
                "Unknown action: {}. Valid: show, init, paint, number, label, resize, save, discard",
                other
            );
        }
    }

    Ok(())
}

/// Resume the bus draft, or start one from the stored layout
fn open_draft(ctx: &Context, ws: &mut Workspace, bus: u64) -> Result<SeatDraft> {
    if let Some(draft) = SeatDraft::load(&ctx.config.cache_dir, bus)? {
        return Ok(draft);
    }
    let layout = ws
        .seat_layout(bus)
        .with_context(|| format!("Could not load seat layout of bus {bus}"))?;
    Ok(SeatDraft::open(bus, layout))
}

fn print_layout(ctx: &Context, bus: u64, layout: &SeatLayout) {
    println!(
        "Bus {}: {}x{} grid, {} seats",
        bus,
        layout.rows,
        layout.cols,
        layout.seat_count()
    );
    print!("{}", layout.render());
    warn_duplicates(ctx, layout);
}

fn print_dirty(ctx: &Context, draft: &SeatDraft) {
    if draft.is_dirty() {
        println!("  {}", ctx.warn("unsaved changes"));
    } else {
        println!("  {}", ctx.good("no unsaved changes"));
    }
}

fn warn_duplicates(ctx: &Context, layout: &SeatLayout) {
    for (label, count) in layout.duplicate_labels() {
        println!("  {}", ctx.warn(&format!("label '{label}' used {count} times")));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Page layout commands - list pages, reorder their components, toggle rows
//!
//! Reordering happens in a draft: `edit` seeds it, `move` edits it, `save`
//! flushes it through the persistence gate and `discard` drops it.

use super::{arg, position, require_id, Context};
use crate::collection::{CollectionStore, DragEnd, SaveOutcome};
use crate::draft::Draft;
use crate::editor::{LoadState, PageEditor, Workspace};
use crate::types::{ComponentRef, ItemId, PayloadPatch};
use anyhow::{Context as _, Result};
use serde_json::Value;
use tracing::warn;

/// Run layout command
pub fn run(ctx: &Context, action: &str, id: Option<u64>, args: &[String]) -> Result<()> {
    let mut ws = ctx.workspace()?;

    match action {
        "list" | "ls" => {
            let layouts = ws.layouts()?;
            if ctx.json {
                return ctx.print_json(&layouts);
            }
            if layouts.is_empty() {
                println!("No page layouts defined.");
                return Ok(());
            }
            println!("Page layouts ({}):", layouts.len());
            for layout in &layouts {
                let state = if layout.is_active {
                    ctx.good("active")
                } else {
                    ctx.dim("inactive")
                };
                println!(
                    "  {:>3}  {:<8} {} [{}]",
                    layout.layout_id,
                    layout.page_key.code(),
                    layout.page_title,
                    state
                );
            }
        }

        "show" => {
            let id = require_id(id, "Layout")?;
            let placements = ws.placements(id)?;
            if ctx.json {
                return ctx.print_json(&placements);
            }
            println!("Layout {} ({} components):", id, placements.len());
            print_items(ctx, &placements);
        }

        "activate" | "deactivate" => {
            let id = require_id(id, "Layout")?;
            let active = action == "activate";
            ws.set_layout_active(id, active)?;
            println!("Layout {} {}", id, if active { "activated" } else { "deactivated" });
        }

        "edit" => {
            let id = require_id(id, "Layout")?;
            let cache_dir = &ctx.config.cache_dir;
            let draft = match Draft::load(cache_dir, id)? {
                Some(draft) => {
                    println!("Resuming draft for layout {} (opened {})", id, draft.opened_at.format("%Y-%m-%d %H:%M"));
                    draft
                }
                None => {
                    let editor = ws.open_page(id);
                    let collection = match editor.into_collection() {
                        Some(collection) => collection,
                        None => anyhow::bail!("Could not load layout {}", id),
                    };
                    let draft = Draft::open(id, collection);
                    draft.store(cache_dir)?;
                    println!("Editing layout {}", id);
                    draft
                }
            };
            print_items(ctx, draft.collection.items());
        }

        "move" => {
            let id = require_id(id, "Layout")?;
            let from = position(args, 0, "from")?;
            let to = position(args, 1, "to")?;
            let mut draft = require_draft(ctx, id)?;

            let changed = draft.collection.drag_end(DragEnd::dropped(from, to))?;
            if changed {
                draft.store(&ctx.config.cache_dir)?;
            } else {
                println!("Order unchanged");
            }
            print_items(ctx, draft.collection.items());
            print_dirty(ctx, &draft.collection);
        }

        "status" => {
            let id = require_id(id, "Layout")?;
            let Some(draft) = Draft::load(&ctx.config.cache_dir, id)? else {
                println!("No draft for layout {}", id);
                return Ok(());
            };
            println!("Draft for layout {} opened {}", id, draft.opened_at.format("%Y-%m-%d %H:%M"));
            print_dirty(ctx, &draft.collection);
            if is_stale(&ws, &draft)? {
                println!("  {}", ctx.warn("remote order changed since the draft was opened"));
            }
        }

        "save" => {
            let id = require_id(id, "Layout")?;
            let cache_dir = &ctx.config.cache_dir;
            let draft = require_draft(ctx, id)?;
            if is_stale(&ws, &draft)? {
                warn!("Layout {} changed remotely since the draft was opened; saving overwrites it", id);
            }

            let mut editor = PageEditor::resume(id, draft.collection);
            match ws.save_order(&mut editor) {
                SaveOutcome::Saved { count } => {
                    Draft::discard(cache_dir, id)?;
                    println!("{} order of {} components", ctx.good("Saved"), count);
                }
                SaveOutcome::NotDirty => println!("Nothing to save"),
                SaveOutcome::InFlight => println!("A save is already in progress"),
                SaveOutcome::Failed(err) => {
                    return Err(err).with_context(|| format!("Failed to save order of layout {id}; draft kept"));
                }
            }
        }

        "discard" => {
            let id = require_id(id, "Layout")?;
            if Draft::discard(&ctx.config.cache_dir, id)? {
                println!("Discarded draft for layout {}", id);
            } else {
                println!("No draft for layout {}", id);
            }
        }

        "hide" | "unhide" => {
            let id = require_id(id, "Layout")?;
            let placement: u64 = arg(args, 0, "placement")?;
            let visible = action == "unhide";
            with_editor(ctx, &mut ws, id, |ws, editor| {
                ws.set_visibility(editor, ItemId(placement), visible)
                    .map_err(Into::into)
            })?;
            println!("Placement {} {}", placement, if visible { "shown" } else { "hidden" });
        }

        "set" => {
            let id = require_id(id, "Layout")?;
            let placement: u64 = arg(args, 0, "placement")?;
            let field: String = arg(args, 1, "field")?;
            let raw: String = arg(args, 2, "value")?;
            let mut patch = PayloadPatch::new();
            patch.insert(field.clone(), parse_value(&raw));
            with_editor(ctx, &mut ws, id, |ws, editor| {
                ws.update_field(editor, ItemId(placement), patch)
                    .map_err(Into::into)
            })?;
            println!("Placement {} {} updated", placement, field);
        }

        other => {
            anyhow::bail!(
                "Unknown action: {}. Valid: list, show, activate, deactivate, edit, move, status, save, discard, hide, unhide, set",
                other
            );
        }
    }

    Ok(())
}

/// Run a row command on the draft if one is open, else on a fresh load
fn with_editor<F>(ctx: &Context, ws: &mut Workspace, id: u64, f: F) -> Result<()>
where
    F: FnOnce(&mut Workspace, &mut PageEditor) -> Result<()>,
{
    let cache_dir = &ctx.config.cache_dir;
    match Draft::load(cache_dir, id)? {
        Some(mut draft) => {
            let mut editor = PageEditor::resume(id, draft.collection);
            f(ws, &mut editor)?;
            if let Some(collection) = editor.into_collection() {
                draft.collection = collection;
                draft.store(cache_dir)?;
            }
        }
        None => {
            let mut editor = ws.open_page(id);
            if let LoadState::Failed(reason) = editor.state() {
                anyhow::bail!("Could not load layout {}: {}", id, reason);
            }
            f(ws, &mut editor)?;
        }
    }
    Ok(())
}

fn require_draft(ctx: &Context, id: u64) -> Result<Draft> {
    Draft::load(&ctx.config.cache_dir, id)?.ok_or_else(|| {
        anyhow::anyhow!("No draft for layout {}. Use 'busdesk layout edit {}' first.", id, id)
    })
}

fn is_stale(ws: &Workspace, draft: &Draft) -> Result<bool> {
    let remote = ws
        .remote()
        .fetch_placements(draft.layout_id)
        .with_context(|| format!("Failed to load layout {}", draft.layout_id))?;
    Ok(draft.is_stale(CollectionStore::seed(remote).baseline()))
}

/// Command-line values are JSON when they parse as JSON, else plain strings
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_items(ctx: &Context, items: &[crate::types::PlacedItem<ComponentRef>]) {
    for (index, item) in items.iter().enumerate() {
        let hidden = if item.visible {
            String::new()
        } else {
            format!(" {}", ctx.dim("(hidden)"))
        };
        println!(
            "  {:>3}. [{}] {} ({}, {}){}",
            index + 1,
            item.id,
            item.payload.title.as_deref().unwrap_or(&item.payload.component_name),
            item.payload.component_type,
            item.payload.position,
            hidden
        );
    }
}

fn print_dirty(ctx: &Context, collection: &CollectionStore<ComponentRef>) {
    if collection.is_dirty() {
        println!("  {}", ctx.warn("unsaved changes"));
    } else {
        println!("  {}", ctx.good("no unsaved changes"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), Value::from(42));
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value("Summer deals"), Value::from("Summer deals"));
        assert_eq!(parse_value("{\"a\":1}")["a"], 1);
    }
}

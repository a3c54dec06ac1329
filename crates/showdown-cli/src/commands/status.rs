use super::context::AppContext;
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;
use showdown_core::StateStore;
use showdown_models::{LifecycleStatus, RotationState};
use std::path::Path;

pub fn run_status(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let store = StateStore::new(ctx.state_file());

    if !store.exists() {
        output.info(format!(
            "No rotation state at {}; the next run starts from the top",
            store.path().display()
        ));
        return Ok(());
    }
    let state = store.load();
    if state.is_empty() {
        output.info(format!(
            "Rotation state at {} is empty or unreadable; the next run starts from the top",
            store.path().display()
        ));
        return Ok(());
    }

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            print_state(&state, store.path());
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&serde_json::to_value(&state)?);
        }
    }
    Ok(())
}

fn lifecycle_cell(status: LifecycleStatus) -> Cell {
    let cell = Cell::new(status.as_str());
    match status {
        LifecycleStatus::Spotlight => cell.fg(Color::Yellow),
        LifecycleStatus::Library => cell.fg(Color::Green),
        LifecycleStatus::Retire => cell.fg(Color::DarkGrey),
    }
}

fn print_state(state: &RotationState, path: &Path) {
    let mut info_table = Table::new();
    info_table.set_header(vec![
        Cell::new("State File").add_attribute(comfy_table::Attribute::Bold),
        Cell::new(path.display().to_string()),
    ]);
    info_table.add_row(vec![Cell::new("Next Position"), Cell::new(state.window_position)]);
    info_table.add_row(vec![
        Cell::new("Last Spotlight"),
        Cell::new(
            state
                .last_spotlight
                .as_deref()
                .map(|slug| state.display_name(slug))
                .unwrap_or("-"),
        ),
    ]);
    info_table.add_row(vec![
        Cell::new("Updated"),
        Cell::new(
            state
                .updated_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]);
    info_table.load_preset(comfy_table::presets::UTF8_FULL);
    info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", info_table);
    println!();

    if state.collection_lifecycles.is_empty() {
        println!("{}", "No collections tracked yet".bright_black());
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Collection").fg(Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Slug").fg(Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Lifecycle").fg(Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
    ]);
    for (slug, status) in &state.collection_lifecycles {
        table.add_row(vec![
            Cell::new(state.display_name(slug)),
            Cell::new(slug),
            lifecycle_cell(*status),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
}

use super::context::AppContext;
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use showdown_core::{assess, Assessment};
use showdown_sources::load_datasets;
use std::path::{Path, PathBuf};

pub async fn run_report(
    index_file: Option<PathBuf>,
    threshold: Option<usize>,
    config_path: Option<&Path>,
    output: &Output,
) -> Result<()> {
    let ctx = AppContext::load(config_path)?;
    let threshold = threshold.unwrap_or(ctx.config.showdown.threshold);

    let dataset_file = ctx.dataset_file();
    let datasets = load_datasets(&dataset_file)
        .map_err(|e| eyre!("Failed to load showdown dataset from {}: {}", dataset_file.display(), e))?;
    let index = ctx.load_index(index_file.as_deref(), None).await?;

    let assessments = assess(&datasets, &index, threshold);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            print_table(&assessments, threshold);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&report_json(&assessments, threshold));
        }
    }
    Ok(())
}

fn report_json(assessments: &[Assessment], threshold: usize) -> serde_json::Value {
    let lists: Vec<serde_json::Value> = assessments
        .iter()
        .map(|a| {
            json!({
                "slug": a.record.slug,
                "title": a.record.title,
                "available": a.record.available_entries,
                "total": a.record.total_entries,
                "percent": a.record.percent_owned(),
                "threshold_met": a.threshold_met,
                "missing": a.missing_entries.iter().map(|e| json!({
                    "rank": e.rank,
                    "film_name": e.film_name,
                    "tmdb_id": e.tmdb_id,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "threshold": threshold,
        "eligible": assessments.iter().filter(|a| a.threshold_met).count(),
        "lists": lists,
    })
}

fn print_table(assessments: &[Assessment], threshold: usize) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Status").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Showdown").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Owned").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("%").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for a in assessments {
        let status = if a.threshold_met {
            Cell::new("OK").fg(Color::Green)
        } else {
            Cell::new("MISSING").fg(Color::Red)
        };
        table.add_row(vec![
            status,
            Cell::new(&a.record.title),
            Cell::new(format!("{}/{}", a.record.available_entries, a.record.total_entries)),
            Cell::new(a.record.percent_owned()),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);

    for a in assessments.iter().filter(|a| !a.threshold_met && !a.missing_entries.is_empty()) {
        println!("\n{} {}", a.record.title.bold(), "missing:".bright_black());
        for entry in &a.missing_entries {
            println!(
                "  - {:>2}. {} (tmdb:{})",
                entry.rank,
                entry.film_name,
                entry.tmdb_id.as_deref().unwrap_or("unknown")
            );
        }
    }

    let eligible = assessments.iter().filter(|a| a.threshold_met).count();
    println!(
        "\n{} of {} lists have at least {} owned titles",
        eligible.to_string().green(),
        assessments.len(),
        threshold
    );
}

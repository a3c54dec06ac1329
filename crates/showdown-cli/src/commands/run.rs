use super::context::AppContext;
use crate::output::{Output, OutputFormat};
use clap::{ArgAction, Args};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use showdown_core::{JobReport, RotationJob, RotationSettings};
use showdown_models::LifecycleStatus;
use showdown_sources::load_datasets;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Compute the rotation without writing state or manifest
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Read the availability index from a JSON file instead of Plex
    #[arg(long, value_name = "PATH")]
    pub index_file: Option<PathBuf>,

    /// Minimum number of owned titles for a list to be eligible
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Number of collections kept visible at once
    #[arg(long)]
    pub window: Option<usize>,

    /// Ordering of eligible lists: matches_desc, matches_asc or none
    #[arg(long)]
    pub sort: Option<String>,

    /// Label applied to every managed collection
    #[arg(long)]
    pub label: Option<String>,

    /// Plex library section to index
    #[arg(long)]
    pub library: Option<String>,
}

pub async fn run_rotation(args: RunArgs, config_path: Option<&Path>, output: &Output) -> Result<()> {
    tracing::debug!("Run command started");

    let mut ctx = AppContext::load(config_path)?;
    apply_overrides(&mut ctx, &args);
    ctx.config.validate()?;
    let settings = RotationSettings::from_config(&ctx.config.showdown)?;

    let dataset_file = ctx.dataset_file();
    let datasets = load_datasets(&dataset_file)
        .map_err(|e| eyre!("Failed to load showdown dataset from {}: {}", dataset_file.display(), e))?;

    let index = ctx
        .load_index(args.index_file.as_deref(), args.library.as_deref())
        .await?;

    let job = RotationJob {
        state_path: ctx.state_file(),
        manifest_path: Some(ctx.manifest_file()),
        settings,
        dry_run: args.dry_run,
        config_source: Some(ctx.config_file.clone()),
    };
    let report = job
        .run(&datasets, &index)
        .map_err(|e| eyre!("Rotation failed: {:#}", e))?;

    print_report(&report, output)
}

fn apply_overrides(ctx: &mut AppContext, args: &RunArgs) {
    let showdown = &mut ctx.config.showdown;
    if let Some(threshold) = args.threshold {
        showdown.threshold = threshold;
    }
    if let Some(window) = args.window {
        showdown.window = window;
    }
    if let Some(sort) = &args.sort {
        showdown.sort = sort.clone();
    }
    if let Some(label) = &args.label {
        showdown.label = label.clone();
    }
    if let Some(library) = &args.library {
        ctx.config.plex.library = library.clone();
    }
}

fn print_report(report: &JobReport, output: &Output) -> Result<()> {
    if output.format() != OutputFormat::Human {
        output.json(&serde_json::to_value(report)?);
        return Ok(());
    }

    if report.idle {
        output.warn("No showdown list meets the threshold; nothing to rotate");
        return Ok(());
    }

    let prefix = if report.dry_run { "[dry run] " } else { "" };
    output.success(format!(
        "{}Rotated {} eligible lists, spotlight: {}",
        prefix,
        report.eligible,
        report.spotlight.as_deref().unwrap_or("none")
    ));

    for view in &report.collections {
        let marker = match view.lifecycle {
            Some(LifecycleStatus::Spotlight) => "★".yellow().to_string(),
            _ => " ".to_string(),
        };
        output.println(format!("  {} {}  {}", marker, view.sort_title, view.name.bright_black()));
    }

    if !report.retired.is_empty() {
        output.info(format!("Retiring: {}", report.retired.join(", ")));
    }
    if let Some(path) = &report.manifest_path {
        output.info(format!("Manifest written to {}", path.display()));
    }
    if report.state_saved {
        output.info(format!("Next position: {}", report.next_position));
    }
    Ok(())
}

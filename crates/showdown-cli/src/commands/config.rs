use super::context::{locate, AppContext};
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use showdown_config::{Config, CredentialStore};
use std::path::Path;

pub fn run_config(cmd: ConfigCommands, config_path: Option<&Path>, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(config_path, output),
        ConfigCommands::Init { force } => init_config(config_path, force, output),
    }
}

fn show_config(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let ctx = AppContext::load(config_path)?;

    let mut credentials = CredentialStore::new(ctx.paths.credentials_file());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;
    let token = credentials.resolve_plex_token();
    let validation = ctx.config.validate();

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if !ctx.config_file.exists() {
                output.warn(format!(
                    "Configuration file not found at {}; showing defaults",
                    ctx.config_file.display()
                ));
            }

            let showdown = &ctx.config.showdown;
            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(ctx.config_file.display().to_string()),
            ]);
            let rows = [
                ("Dataset", ctx.dataset_file().display().to_string()),
                ("State File", ctx.state_file().display().to_string()),
                ("Manifest", ctx.manifest_file().display().to_string()),
                ("Threshold", showdown.threshold.to_string()),
                ("Window", showdown.window.to_string()),
                ("Sort", showdown.sort_mode().to_string()),
                ("Label", showdown.label.clone()),
                ("Plex Server", ctx.config.plex.server_url.clone()),
                ("Plex Library", ctx.config.plex.library.clone()),
                (
                    "Plex Token",
                    token
                        .as_deref()
                        .map(mask_string)
                        .unwrap_or_else(|| "✗ not set".red().to_string()),
                ),
            ];
            for (name, value) in rows {
                table.add_row(vec![Cell::new(name), Cell::new(value)]);
            }
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);

            if let Err(e) = &validation {
                output.warn(format!("Invalid configuration: {}", e));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": ctx.config_file,
                "dataset_file": ctx.dataset_file(),
                "state_file": ctx.state_file(),
                "manifest_file": ctx.manifest_file(),
                "showdown": ctx.config.showdown,
                "plex": ctx.config.plex,
                "plex_token_set": token.is_some(),
                "valid": validation.is_ok(),
            }));
        }
    }
    Ok(())
}

fn init_config(config_path: Option<&Path>, force: bool, output: &Output) -> Result<()> {
    let (paths, path) = locate(config_path);

    if path.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }

    Config::default()
        .save_to_file(&path)
        .map_err(|e| eyre!("Failed to write config to {}: {}", path.display(), e))?;
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create data directories: {}", e))?;

    output.success(format!("Wrote default configuration to {}", path.display()));
    output.println(format!(
        "Set {} or add {} to {} before the first run",
        "PLEX_TOKEN".bold(),
        "plex_token".bold(),
        paths.credentials_file().display()
    ));
    Ok(())
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

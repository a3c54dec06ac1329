use clap::{ArgAction, Parser, Subcommand};
use commands::{config, report, reset, run, status};
use std::path::{Path, PathBuf};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "showdown")]
#[command(about = "Showdown Spotlight - rotate featured showdown lists through a Plex library")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to a daily-rotated file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Write logs to the default log file (logs/showdown.log next to the config)
    #[arg(long, global = true, action = ArgAction::SetTrue, conflicts_with = "log_file")]
    log_to_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one rotation step
    #[command(long_about = "Evaluate every showdown list against the library, advance the spotlight window by one position, update collection lifecycles and write the Kometa manifest. Intended to be run once per day from cron.")]
    Run(run::RunArgs),

    /// Show how well every showdown list is covered by the library
    #[command(long_about = "Print every showdown list with its owned/total count, whether it meets the threshold and, for lists below it, the entries the library is missing. Does not touch the rotation state.")]
    Report {
        /// Read the availability index from a JSON file instead of Plex
        #[arg(long, value_name = "PATH")]
        index_file: Option<PathBuf>,

        /// Override the configured threshold
        #[arg(long)]
        threshold: Option<usize>,
    },

    /// Show the stored rotation state
    Status,

    /// Delete the rotation state so the next run starts from the top
    Reset,

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = resolve_log_file(cli.log_file.clone(), cli.log_to_file, cli.config.as_deref());
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run(args) => run::run_rotation(args, config_path, &output).await,
        Commands::Report { index_file, threshold } => {
            report::run_report(index_file, threshold, config_path, &output).await
        }
        Commands::Status => status::run_status(config_path, &output),
        Commands::Reset => reset::run_reset(config_path, &output),
        Commands::Config { cmd } => config::run_config(cmd, config_path, &output),
    }
}

fn resolve_log_file(log_file: Option<PathBuf>, log_to_file: bool, config: Option<&Path>) -> Option<PathBuf> {
    match log_file {
        Some(path) => Some(path),
        None if log_to_file => Some(commands::context::locate(config).0.log_file()),
        None => None,
    }
}

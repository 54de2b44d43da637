//! Roster CLI
//!
//! Command-line interface for Roster - an offline-first student roster.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use roster_core::{Config, SortOrder, StudentStore};

mod commands;
mod output;

use commands::student::{NewStudent, StudentChanges};
use commands::with_hint;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Roster - Offline-first student roster")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Shell,
    /// List students
    #[command(alias = "ls")]
    List {
        /// Sort order (insertion or name)
        #[arg(short, long, default_value_t = SortOrder::Insertion)]
        sort: SortOrder,
    },
    /// Add a student
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        /// Avatar URL (defaults to a stock image)
        #[arg(long)]
        avatar: Option<String>,
        /// Explicit id (defaults to the next local id)
        #[arg(long)]
        id: Option<i64>,
    },
    /// Change fields of a student
    Update {
        /// Student ID
        id: i64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Remove a student
    #[command(alias = "rm")]
    Remove {
        /// Student ID
        id: i64,
    },
    /// Fetch the remote directory and add new students
    Sync,
    /// Show status (counts, storage, last sync)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, api_url, sync_on_start, ...)
        key: String,
        /// Configuration value ("none" clears optional keys)
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    let command = cli.command.unwrap_or(Commands::Shell);

    // Config commands don't need the store
    if let Commands::Config { command } = &command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let store = Arc::new(StudentStore::open(&config).map_err(with_hint)?);

    match command {
        Commands::Shell => commands::shell::run(store, &config, &output).await,
        Commands::List { sort } => commands::student::list(&store, sort, &output),
        Commands::Add {
            first_name,
            last_name,
            email,
            avatar,
            id,
        } => {
            let new = NewStudent {
                id,
                first_name,
                last_name,
                email,
                avatar,
            };
            commands::student::add(&store, &config, new, &output).map(|_| ())
        }
        Commands::Update {
            id,
            first_name,
            last_name,
            email,
            avatar,
        } => {
            let changes = StudentChanges {
                first_name,
                last_name,
                email,
                avatar,
            };
            commands::student::update(&store, id, changes, &output).map(|_| ())
        }
        Commands::Remove { id } => commands::student::remove(&store, id, &output),
        Commands::Sync => commands::sync::sync(store, &config, &output).await,
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize file-based logging
///
/// Only initializes if ROSTER_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("ROSTER_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "roster_core={},roster_cli={}",
        log_level, log_level
    ));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

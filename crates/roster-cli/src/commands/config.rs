//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use roster_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "api_url": config.api_url,
                    "request_timeout_secs": config.request_timeout_secs,
                    "sync_on_start": config.sync_on_start,
                    "sync_interval_secs": config.sync_interval_secs,
                    "avatar_base": config.avatar_base,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  api_url:              {}", config.api_url);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!("  sync_on_start:        {}", config.sync_on_start);
            println!(
                "  sync_interval_secs:   {}",
                config
                    .sync_interval_secs
                    .map(|secs| secs.to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  avatar_base:          {}", config.avatar_base);
            println!(
                "  log_file:             {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    let value = if value == "none" { String::new() } else { value };
    config.set_value(&key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

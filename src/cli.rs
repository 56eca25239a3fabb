//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for ipshorter using clap's derive macros.

use std::path::Path;

use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_CONFIG_PATH, StaticConfig};

/// IPShorter - URL shortener that records every visitor
#[derive(Parser, Debug)]
#[command(name = "ipshorter")]
#[command(version)]
#[command(about = "URL shortener with per-link visitor logging", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Write a sample configuration holding every default value.
pub fn config_generate(output_path: Option<String>, force: bool) -> Result<String> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());

    if !force && Path::new(&path).exists() {
        bail!("{} already exists, pass --force to overwrite it", path);
    }

    StaticConfig::default()
        .save_to_file(&path)
        .map_err(|e| anyhow!("Unable to write configuration file {}: {}", path, e))?;
    Ok(path)
}

//! Command-line interface for the `searchrelay` binary.

pub mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use sr_domain::config::Config;

#[derive(Debug, Parser)]
#[command(name = "searchrelay", about = "Streaming retrieval-augmented chat relay")]
pub struct Cli {
    /// Path to the TOML config file. Missing file falls back to defaults.
    #[arg(long, global = true, default_value = "searchrelay.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (the default when no subcommand is given).
    Serve,
    /// Inspect or validate the configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the version and exit.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Check the config file for problems without starting the server.
    Validate,
    /// Print the effective configuration (defaults applied) as TOML.
    Show,
}

pub fn load_config(path: &std::path::Path) -> anyhow::Result<Config> {
    Ok(Config::load(path)?)
}

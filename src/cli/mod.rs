//! CLI module for Safe Cache
//!
//! Provides subcommands:
//! - `regions`: list the cache regions a property resource declares
//! - `demo`: assemble a registry from configuration and exercise it

pub mod demo;
pub mod regions;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Safe Cache - type-checked named caches with defensive copies
#[derive(Parser)]
#[command(name = "safe-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the cache regions declared by a property resource
    Regions(regions::RegionsArgs),

    /// Build the configured registry and run a copy-semantics walkthrough
    Demo(demo::DemoArgs),
}

/// Loads `.env` and the layered configuration, then installs logging
fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("{}; using default configuration", e);
        AppConfig::default()
    });

    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Logging already initialized: {}", e);
    }

    config
}

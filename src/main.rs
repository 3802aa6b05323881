//! xldeck control surface CLI
//!
//! A command-line interface for 32-key LCD control surfaces.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use xldeck::DeckConfig;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

/// Log filter used when neither RUST_LOG, --log-level nor the config set one
const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let config_path = cli.config.clone().unwrap_or_else(DeckConfig::default_path);
    let config = DeckConfig::load(&config_path)?;

    // Initialize logging (stderr, so list --json stays clean)
    let log_level = cli
        .log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .unwrap_or(DEFAULT_LOG_LEVEL);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    debug!("Config from {:?}", config_path);

    // Create printer config if monitoring is enabled
    let printer_config =
        commands::create_printer_config(cli.monitor, cli.hex, cli.filter.as_deref())?;
    let ctx = commands::Context {
        device: cli.device.clone().or_else(|| config.device.clone()),
        printer_config,
    };

    match cli.command {
        None => {
            // Default: list attached surfaces
            commands::query::list(&ctx, false, false)?;
        }

        // === Query Commands ===
        Some(Commands::List { all, json }) => {
            commands::query::list(&ctx, all, json)?;
        }
        Some(Commands::Info) => {
            commands::query::info(&ctx)?;
        }

        // === Render Commands ===
        Some(Commands::Fill { key, color }) => {
            commands::render::fill(&ctx, key, &color)?;
        }
        Some(Commands::Image { key, file }) => {
            commands::render::image(&ctx, key, &file)?;
        }
        Some(Commands::Clear { key }) => {
            commands::render::clear(&ctx, key)?;
        }

        // === Panel Commands ===
        Some(Commands::Brightness { percent }) => {
            commands::set::brightness(&ctx, percent)?;
        }
        Some(Commands::Reset) => {
            commands::set::reset(&ctx)?;
        }

        // === Events ===
        Some(Commands::Watch) => {
            commands::watch::watch(&ctx)?;
        }
        Some(Commands::Apply) => {
            commands::apply::apply(&ctx, &config, &config_path)?;
        }
    }

    Ok(())
}

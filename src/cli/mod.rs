//! CLI module for Atelier
//!
//! - `serve`: run the HTTP server (default)
//! - `migrate`: create the database schema and exit
//! - `check-config`: load and validate configuration, print a redacted copy

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::server;

/// Atelier canvas backend
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(about = "Canvas workspace backend: files, assets, elements and sharing")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Create or update the database schema and exit
    Migrate,
    /// Validate configuration and print it with secrets redacted
    CheckConfig,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<()> {
    let config = server::load_config()?;
    server::init_tracing(&config.logging);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => server::run(config).await,
        Commands::Migrate => {
            server::open_store(&config.database).await?;
            info!(url = %config.database.url, "Database schema is up to date");
            Ok(())
        }
        Commands::CheckConfig => {
            server::validate_config(&config)?;
            server::validate_production_config(&config)?;
            let rendered = serde_json::to_string_pretty(&config.redacted())
                .context("Failed to render configuration")?;
            println!("{rendered}");
            Ok(())
        }
    }
}

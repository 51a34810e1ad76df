//! Atelier - canvas workspace backend
//!
//! CLI entry point for the Atelier server.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

mod api;
mod cli;
mod middleware;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    cli::run(cli).await
}

//! LegalWatch CLI: legislative-change monitoring from a legal-news feed.
//!
//! Collects feed items into a local database, extracts named entities from
//! them and asks a language model for an analytical report.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

//! Binary crate for the `citysky` weather lookup tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and installing logging
//! - Interactive configuration
//! - The interactive lookup screen and human-friendly output

use clap::Parser;

mod app;
mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}

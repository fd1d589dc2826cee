//! Binary crate for the `skyglance` terminal weather widget.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and the interactive prompt loop
//! - Rendering the view state for humans

use clap::Parser;

mod cli;
mod interactive;
mod logging;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}

//! # Manifestly CLI
//!
//! Binary entry point for the `manifestly` command-line tool: parses the
//! arguments with `clap` and runs the selected command. Everything the
//! commands do is implemented in the `manifestly` library.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}

//! # Image Updater CLI
//!
//! This is the binary entry point for the `image-updater` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Running one synchronization pass and translating any failure into a
//!   non-zero exit code.
//!
//! The engine itself lives in the `lib.rs` library crate, so the binary is a
//! thin wrapper around reusable library functionality.

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}

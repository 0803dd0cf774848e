//! lsdj - Command-line tool for LittleSoundDj saves and songs
//!
//! # Commands
//!
//! - `lsdj inspect` - List the projects in saves and song files
//! - `lsdj export` - Write projects from a save as `.lsdsng` files
//! - `lsdj import` - Build a new save from `.lsdsng` files
//!
//! # Usage
//!
//! ```bash
//! # Everything under a folder, recursively
//! lsdj inspect -r ~/lsdj
//!
//! # Slots 0 and 3, named like 00_YOKAI_v1B.lsdsng
//! lsdj export bangers.sav 0 3 -pv -o songs/
//!
//! # Fresh save with one project per slot
//! lsdj import -o new.sav songs/*.lsdsng
//! ```
//!
//! Set `RUST_LOG=lsdj_format=trace` to follow block jumps while reading.

mod export;
mod import;
mod inspect;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// lsdj - Inspect, export and import LittleSoundDj songs
#[derive(Parser)]
#[command(name = "lsdj")]
#[command(about = "Inspect, export and import LittleSoundDj songs")]
#[command(version)]
struct Cli {
    /// Log per-project compression details
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the contents of saves and song files (or whole folders)
    Inspect(inspect::InspectArgs),

    /// Export songs from a save as .lsdsng files
    Export(export::ExportArgs),

    /// Import .lsdsng files into a new save
    Import(import::ImportArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Export(args) => {
            export::execute(args)?;
            Ok(())
        }
        Commands::Import(args) => import::execute(args),
    }
}

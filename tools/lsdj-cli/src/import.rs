//! Import command - build a new save from `.lsdsng` files

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use lsdj_format::{LsdjError, PROJECT_COUNT, Project, Sav};

/// Arguments for the import command
#[derive(Args)]
pub struct ImportArgs {
    /// Song files to import, one slot each in the order given
    #[arg(required = true)]
    pub songs: Vec<PathBuf>,

    /// Path of the save to create
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Execute the import command
pub fn execute(args: ImportArgs) -> Result<()> {
    if args.songs.len() > PROJECT_COUNT {
        anyhow::bail!(
            "{} songs given but a save holds at most {}",
            args.songs.len(),
            PROJECT_COUNT
        );
    }

    let mut sav = Sav::new();
    for (index, path) in args.songs.iter().enumerate() {
        let project = Project::read_from_path(path)
            .with_context(|| format!("Failed to read song {}", path.display()))?;
        sav.set_project(index, project)?;
        println!("{:02} => {}", index, path.display());
    }

    // Compress before touching the output so a full save leaves no file behind
    let bytes = sav.to_bytes().map_err(|err| {
        let context = match err {
            LsdjError::ProjectDoesNotFit { index, .. } => {
                format!("Out of blocks while importing {}", args.songs[index].display())
            }
            _ => "Failed to build save".to_string(),
        };
        anyhow::Error::new(err).context(context)
    })?;

    std::fs::write(&args.output, bytes)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Wrote {}", args.output.display());

    Ok(())
}

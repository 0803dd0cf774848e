//! Inspect command - list the projects in saves and song files
//!
//! Directories are searched for `.sav` and `.lsdsng` files. A file that
//! fails to parse is reported and the rest are still listed.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use lsdj_format::{BLOCK_COUNT, Project, Sav, is_likely_project_file, is_likely_sav_file};

/// Width of the block usage bar
const BAR_WIDTH: usize = 24;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Save files, song files or folders to inspect
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Search folders recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

/// What was found in one file
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Listing {
    Sav {
        path: PathBuf,
        blocks_used: usize,
        block_count: usize,
        active_project: Option<usize>,
        working_memory_format_version: u8,
        projects: Vec<ProjectSummary>,
    },
    Project {
        path: PathBuf,
        #[serde(flatten)]
        project: ProjectSummary,
    },
}

/// One project, in a save slot or its own file
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub name: String,
    pub version: u8,
    pub format_version: u8,
    pub blocks: usize,
}

impl ProjectSummary {
    fn new(index: Option<usize>, project: &Project) -> Result<Self> {
        Ok(Self {
            index,
            name: project.name().as_str().into_owned(),
            version: project.version(),
            format_version: project.song().format_version,
            blocks: project.compressed_block_count()?,
        })
    }
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let files = collect_files(&args.paths, args.recursive)?;

    let mut listings = Vec::new();
    let mut failed = 0;
    for file in &files {
        match inspect_file(file) {
            Ok(listing) => listings.push(listing),
            Err(err) => {
                eprintln!("{}: {:#}", file.display(), err);
                failed += 1;
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else {
        for listing in &listings {
            print_listing(listing);
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files could not be inspected", failed, files.len());
    }
    Ok(())
}

/// Expand folders into the save and song files they contain
///
/// Files named directly are always kept, whatever their extension.
pub fn collect_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let depth = if recursive { usize::MAX } else { 1 };
        let mut found = Vec::new();
        for entry in WalkDir::new(path).max_depth(depth) {
            let entry =
                entry.with_context(|| format!("Failed to search {}", path.display()))?;
            if entry.file_type().is_file() && has_lsdj_extension(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn has_lsdj_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sav") || ext.eq_ignore_ascii_case("lsdsng"))
}

/// Parse one file as a save or a project, by its size and magic
pub fn inspect_file(path: &Path) -> Result<Listing> {
    if is_likely_sav_file(path).with_context(|| format!("Failed to open {}", path.display()))? {
        let sav = Sav::read_from_path(path)
            .with_context(|| format!("Failed to read save {}", path.display()))?;

        let projects = sav
            .projects()
            .map(|(index, project)| ProjectSummary::new(Some(index), project))
            .collect::<Result<Vec<_>>>()?;

        return Ok(Listing::Sav {
            path: path.to_path_buf(),
            blocks_used: sav.blocks_used()?,
            block_count: BLOCK_COUNT,
            active_project: sav.active_project(),
            working_memory_format_version: sav.working_memory().format_version,
            projects,
        });
    }

    if is_likely_project_file(path)? {
        let project = Project::read_from_path(path)
            .with_context(|| format!("Failed to read song {}", path.display()))?;
        return Ok(Listing::Project {
            path: path.to_path_buf(),
            project: ProjectSummary::new(None, &project)?,
        });
    }

    anyhow::bail!("Not an LSDj save or song file")
}

fn print_listing(listing: &Listing) {
    match listing {
        Listing::Sav {
            path,
            blocks_used,
            block_count,
            active_project,
            projects,
            ..
        } => {
            println!("{}", path.display());
            println!(
                "Mem {:3}/{}    [{}]",
                blocks_used,
                block_count,
                usage_bar(*blocks_used, *block_count)
            );
            for project in projects {
                let active = project.index.is_some() && project.index == *active_project;
                println!(
                    "{} {:2} | {:8} | v{:03} | f{:03}",
                    if active { '*' } else { ' ' },
                    project.index.unwrap_or_default(),
                    project.name,
                    project.version,
                    project.format_version
                );
            }
        }
        Listing::Project { path, project } => {
            println!(
                "{} | {:8} | v{:03} | f{:03} | {} blocks",
                path.display(),
                project.name,
                project.version,
                project.format_version,
                project.blocks
            );
        }
    }
}

fn usage_bar(used: usize, total: usize) -> String {
    let filled = (used * BAR_WIDTH / total.max(1)).min(BAR_WIDTH);
    format!("{}{}", "=".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

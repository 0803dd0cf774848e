//! Export command - write projects from a save as `.lsdsng` files

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use lsdj_format::{Project, ProjectName, Sav};

/// Arguments for the export command
#[derive(Args)]
pub struct ExportArgs {
    /// The save file to export from
    pub sav: PathBuf,

    /// Slots to export (all occupied slots when omitted)
    pub indices: Vec<usize>,

    /// Destination folder (defaults to the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Prepend the slot index to each file name
    #[arg(short = 'p', long)]
    pub output_pos: bool,

    /// Append the project version to each file name
    #[arg(short = 'v', long)]
    pub output_version: bool,

    /// Write versions in decimal instead of hexadecimal
    #[arg(short, long)]
    pub decimal: bool,

    /// Also export the song in working memory
    #[arg(long)]
    pub working_memory: bool,
}

/// Execute the export command
///
/// Returns the paths of the files written.
pub fn execute(args: ExportArgs) -> Result<Vec<PathBuf>> {
    let sav = Sav::read_from_path(&args.sav)
        .with_context(|| format!("Failed to read save {}", args.sav.display()))?;

    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let selected: Vec<(usize, &Project)> = if args.indices.is_empty() {
        sav.projects().collect()
    } else {
        args.indices
            .iter()
            .map(|&index| {
                sav.project(index)
                    .map(|project| (index, project))
                    .ok_or_else(|| {
                        anyhow::anyhow!("Slot {} of {} is empty", index, args.sav.display())
                    })
            })
            .collect::<Result<_>>()?
    };

    let mut written = Vec::new();
    for (index, project) in selected {
        let file_name = file_name(&args, Some(index), project.name(), project.version());
        let path = output.join(&file_name);
        project
            .write_to_path(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        println!("{:02}. {:8} => {}", index, project.name(), file_name);
        written.push(path);
    }

    if args.working_memory {
        let path = export_working_memory(&sav, &output)?;
        written.push(path);
    }

    Ok(written)
}

/// Working memory is written as a project named after the active slot
fn export_working_memory(sav: &Sav, output: &Path) -> Result<PathBuf> {
    let active = sav.active_project().and_then(|index| sav.project(index));
    let (name, version, file_name) = match active {
        Some(project) => (
            *project.name(),
            project.version(),
            format!("{}_WM.lsdsng", sanitize(&project.name().as_str())),
        ),
        None => (ProjectName::new("WORKING"), 0, "WORKING.lsdsng".to_string()),
    };

    let project = Project::with_song(name, version, sav.working_memory().clone());
    let path = output.join(&file_name);
    project
        .write_to_path(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("WM. {:8} => {}", name, file_name);
    Ok(path)
}

/// `[NN_]NAME[_vXX].lsdsng`
fn file_name(args: &ExportArgs, index: Option<usize>, name: &ProjectName, version: u8) -> String {
    let mut file_name = String::new();
    if let (true, Some(index)) = (args.output_pos, index) {
        file_name.push_str(&format!("{:02}_", index));
    }

    let name = sanitize(&name.as_str());
    file_name.push_str(if name.is_empty() { "UNTITLED" } else { &name });

    if args.output_version {
        if args.decimal {
            file_name.push_str(&format!("_v{:03}", version));
        } else {
            file_name.push_str(&format!("_v{:02X}", version));
        }
    }

    file_name.push_str(".lsdsng");
    file_name
}

/// Replace characters that cannot appear in a file name
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsdj_format::Song;
    use tempfile::tempdir;

    fn args(sav: PathBuf, output: PathBuf) -> ExportArgs {
        ExportArgs {
            sav,
            indices: Vec::new(),
            output: Some(output),
            output_pos: false,
            output_version: false,
            decimal: false,
            working_memory: false,
        }
    }

    fn write_sav(path: &Path) -> Sav {
        let mut sav = Sav::new();
        for (index, name, version) in [(0, "YOKAI", 0x1B), (4, "LOGCBN", 0x0F)] {
            let mut song = Song::new();
            song.tempo = 100 + index as u8;
            sav.set_project(
                index,
                Project::with_song(ProjectName::new(name), version, song),
            )
            .unwrap();
        }
        sav.write_to_path(path).unwrap();
        sav
    }

    #[test]
    fn test_file_names() {
        let mut args = args(PathBuf::from("x.sav"), PathBuf::from("."));
        let name = ProjectName::new("NOSTALGA");
        assert_eq!(file_name(&args, Some(5), &name, 0x1F), "NOSTALGA.lsdsng");

        args.output_pos = true;
        args.output_version = true;
        assert_eq!(
            file_name(&args, Some(5), &name, 0x1F),
            "05_NOSTALGA_v1F.lsdsng"
        );

        args.decimal = true;
        assert_eq!(
            file_name(&args, Some(5), &name, 0x1F),
            "05_NOSTALGA_v031.lsdsng"
        );

        assert_eq!(
            file_name(&args, None, &ProjectName::new("A/B"), 0),
            "A_B_v000.lsdsng"
        );
    }

    #[test]
    fn test_export_all_slots() {
        let dir = tempdir().unwrap();
        let sav_path = dir.path().join("bangers.sav");
        let sav = write_sav(&sav_path);
        let out = dir.path().join("out");

        let mut export_args = args(sav_path, out.clone());
        export_args.output_pos = true;
        let written = execute(export_args).unwrap();

        assert_eq!(
            written,
            [out.join("00_YOKAI.lsdsng"), out.join("04_LOGCBN.lsdsng")]
        );
        let logcbn = Project::read_from_path(&written[1]).unwrap();
        assert_eq!(Some(&logcbn), sav.project(4));
    }

    #[test]
    fn test_export_selected_and_working_memory() {
        let dir = tempdir().unwrap();
        let sav_path = dir.path().join("bangers.sav");
        write_sav(&sav_path);

        let mut export_args = args(sav_path, dir.path().to_path_buf());
        export_args.indices = vec![4];
        export_args.working_memory = true;
        let written = execute(export_args).unwrap();

        assert_eq!(
            written,
            [
                dir.path().join("LOGCBN.lsdsng"),
                dir.path().join("WORKING.lsdsng")
            ]
        );
        let working = Project::read_from_path(&written[1]).unwrap();
        assert_eq!(working.name().as_str(), "WORKING");
    }

    #[test]
    fn test_export_empty_slot_fails() {
        let dir = tempdir().unwrap();
        let sav_path = dir.path().join("bangers.sav");
        write_sav(&sav_path);

        let mut export_args = args(sav_path, dir.path().to_path_buf());
        export_args.indices = vec![1];
        let err = execute(export_args).unwrap_err();
        assert!(err.to_string().contains("Slot 1"));
    }
}

//! Save files: working memory plus 32 project slots sharing 191 blocks
//!
//! ```text
//! 0x00000  working memory song (uncompressed)
//! 0x08000  header (see `header`)
//! 0x08200  blocks 1..=191, 0x200 bytes each
//! ```
//!
//! - `header` - Names, versions, active project and block allocation table
//! - `tests` - Slot round trips and block allocation

mod header;

#[cfg(test)]
mod tests;

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, warn};

use self::header::{HEADER_RESERVED_LEN, Header, MAGIC_OFFSET};
use crate::compression::{compress, decompress};
use crate::error::{LsdjError, Result};
use crate::project::{Project, ProjectName};
use crate::song::Song;
use crate::stream::{ByteStream, FileStream, MemoryStream};
use crate::{
    BLOCK_COUNT, BLOCK_SIZE, EMPTY_BLOCK, NO_ACTIVE_PROJECT, PROJECT_COUNT, SAV_HEADER_SIZE,
    SAV_MAGIC, SAV_SIZE, SONG_DECOMPRESSED_SIZE,
};

/// Offset of block 1 from the start of the save
const BLOCKS_OFFSET: u64 = (SONG_DECOMPRESSED_SIZE + SAV_HEADER_SIZE) as u64;

/// A LittleSoundDj save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sav {
    working_memory: Song,
    projects: Vec<Option<Project>>,
    active_project: u8,
    reserved: [u8; HEADER_RESERVED_LEN],
}

impl Default for Sav {
    fn default() -> Self {
        Self::new()
    }
}

impl Sav {
    /// Save with a blank working memory and no projects
    pub fn new() -> Self {
        Self {
            working_memory: Song::new(),
            projects: vec![None; PROJECT_COUNT],
            active_project: NO_ACTIVE_PROJECT,
            reserved: [0; HEADER_RESERVED_LEN],
        }
    }

    /// Read a save from the stream's current position
    ///
    /// Each slot is decompressed from the first block the allocation table
    /// assigns to it; its block chain leads to the rest.
    ///
    /// # Errors
    /// - [`LsdjError::InvalidSavMagic`] if the header has no `"jk"`
    /// - [`LsdjError::InvalidBlockOwner`] if a block belongs to a slot above 31
    /// - [`LsdjError::Project`] wrapping the failure of a single slot
    pub fn read<S: ByteStream + ?Sized>(stream: &mut S) -> Result<Self> {
        let start = stream.tell()?;

        let mut image = vec![0u8; SONG_DECOMPRESSED_SIZE];
        stream.read_exact(&mut image, "working memory")?;
        let working_memory = Song::from_bytes(&image)?;

        let header = Header::read(stream)?;
        let block_origin = start + BLOCKS_OFFSET;

        let mut projects: Vec<Option<Project>> = vec![None; PROJECT_COUNT];
        for (block, &owner) in header.blocks.iter().enumerate() {
            if owner == EMPTY_BLOCK {
                continue;
            }
            let index = owner as usize;
            let slot = projects
                .get_mut(index)
                .ok_or(LsdjError::InvalidBlockOwner {
                    block: block + 1,
                    owner,
                })?;
            if slot.is_some() {
                continue;
            }

            // Decoding an earlier slot may have left the cursor anywhere
            stream.seek(SeekFrom::Start(block_origin + (block * BLOCK_SIZE) as u64))?;
            let song = decompress(stream, block_origin)
                .and_then(|image| Song::from_bytes(&image))
                .map_err(|err| err.in_project(index))?;

            debug!(index, first_block = block + 1, name = %header.names[index], "Read project");
            *slot = Some(Project::with_song(
                header.names[index],
                header.versions[index],
                song,
            ));
        }

        for (index, name) in header.names.iter().enumerate() {
            if projects[index].is_none() && !name.is_empty() {
                warn!(index, %name, "Project slot has a name but no blocks");
            }
        }

        stream.seek(SeekFrom::Start(start + SAV_SIZE as u64))?;

        Ok(Self {
            working_memory,
            projects,
            active_project: header.active_project,
            reserved: header.reserved,
        })
    }

    /// Write the save at the stream's current position
    ///
    /// Projects are compressed in slot order into consecutive blocks. The
    /// whole save is assembled first, so nothing is written if a project
    /// does not fit.
    ///
    /// # Errors
    /// - [`LsdjError::ProjectDoesNotFit`] naming the first slot that ran out of blocks
    /// - [`LsdjError::ShortWrite`] if the stream has no room for the save
    pub fn write<S: ByteStream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        let mut header = Header {
            active_project: self.active_project,
            reserved: self.reserved,
            ..Header::default()
        };

        let mut blocks = MemoryStream::with_capacity(BLOCK_COUNT * BLOCK_SIZE);
        let mut next_block = 1;

        for (index, project) in self.projects() {
            header.names[index] = *project.name();
            header.versions[index] = project.version();

            let available = BLOCK_COUNT + 1 - next_block;
            blocks.seek(SeekFrom::Start(((next_block - 1) * BLOCK_SIZE) as u64))?;
            let used = compress(
                &project.song().to_bytes(),
                &mut blocks,
                next_block as u8,
                available,
            )
            .map_err(|err| match err {
                LsdjError::OutOfBlocks { .. } => LsdjError::ProjectDoesNotFit { index, available },
                other => other,
            })?;

            debug!(index, first_block = next_block, blocks = used, "Compressed project");
            header.blocks[next_block - 1..next_block - 1 + used].fill(index as u8);
            next_block += used;
        }

        stream.write_all(&self.working_memory.to_bytes())?;
        header.write(stream)?;
        stream.write_all(blocks.get_ref())?;

        Ok(())
    }

    /// Parse a whole save held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read(&mut MemoryStream::new(bytes.to_vec()))
    }

    /// Encode as a 0x20000 byte save
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut stream = MemoryStream::with_capacity(SAV_SIZE);
        self.write(&mut stream)?;
        Ok(stream.into_inner())
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::read(&mut FileStream::open(path)?)
    }

    /// Write to a file, replacing it
    ///
    /// The file is only touched once every project has been compressed.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    // =========================================================================
    // Working Memory
    // =========================================================================

    /// The song currently being edited
    pub fn working_memory(&self) -> &Song {
        &self.working_memory
    }

    pub fn working_memory_mut(&mut self) -> &mut Song {
        &mut self.working_memory
    }

    pub fn set_working_memory(&mut self, song: Song) {
        self.working_memory = song;
    }

    /// Slot the working memory was loaded from or last saved to
    pub fn active_project(&self) -> Option<usize> {
        let index = self.active_project as usize;
        (index < PROJECT_COUNT).then_some(index)
    }

    /// Attach working memory to a slot, or detach it with `None`
    pub fn set_active_project(&mut self, index: Option<usize>) -> Result<()> {
        self.active_project = match index {
            Some(index) => {
                check_index(index)?;
                index as u8
            }
            None => NO_ACTIVE_PROJECT,
        };
        Ok(())
    }

    /// Copy a slot's song into working memory and make the slot active
    ///
    /// # Errors
    /// [`LsdjError::EmptySlot`] if the slot holds no project
    pub fn load_project_into_working_memory(&mut self, index: usize) -> Result<()> {
        check_index(index)?;
        let project = self.projects[index]
            .as_ref()
            .ok_or(LsdjError::EmptySlot { index })?;

        self.working_memory = project.song().clone();
        self.working_memory.meta.file_changed = false;
        self.active_project = index as u8;
        Ok(())
    }

    /// Store working memory in a slot under `name` and make the slot active
    ///
    /// Saving over an existing project bumps its version.
    pub fn save_working_memory_to_project(
        &mut self,
        index: usize,
        name: ProjectName,
    ) -> Result<()> {
        check_index(index)?;
        let version = match &self.projects[index] {
            Some(existing) => existing.version().wrapping_add(1),
            None => 0,
        };

        self.working_memory.meta.file_changed = false;
        let song = self.working_memory.clone();
        self.projects[index] = Some(Project::with_song(name, version, song));
        self.active_project = index as u8;
        Ok(())
    }

    // =========================================================================
    // Project Slots
    // =========================================================================

    pub fn project(&self, index: usize) -> Option<&Project> {
        self.projects.get(index).and_then(Option::as_ref)
    }

    pub fn project_mut(&mut self, index: usize) -> Option<&mut Project> {
        self.projects.get_mut(index).and_then(Option::as_mut)
    }

    /// Put a project in a slot, returning the one it replaced
    pub fn set_project(&mut self, index: usize, project: Project) -> Result<Option<Project>> {
        check_index(index)?;
        Ok(self.projects[index].replace(project))
    }

    /// Empty a slot
    ///
    /// Working memory is detached if it belonged to the slot.
    pub fn remove_project(&mut self, index: usize) -> Option<Project> {
        let removed = self.projects.get_mut(index).and_then(Option::take);
        if removed.is_some() && self.active_project() == Some(index) {
            self.active_project = NO_ACTIVE_PROJECT;
        }
        removed
    }

    /// Occupied slots with their index
    pub fn projects(&self) -> impl Iterator<Item = (usize, &Project)> {
        self.projects
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|project| (index, project)))
    }

    /// Number of occupied slots
    pub fn project_count(&self) -> usize {
        self.projects.iter().filter(|slot| slot.is_some()).count()
    }

    /// Blocks the projects would occupy if the save were written now
    pub fn blocks_used(&self) -> Result<usize> {
        let mut scratch = MemoryStream::with_capacity(BLOCK_COUNT * BLOCK_SIZE);
        let mut total = 0;
        for (index, project) in self.projects() {
            scratch.seek(SeekFrom::Start(0))?;
            total += compress(&project.song().to_bytes(), &mut scratch, 1, BLOCK_COUNT)
                .map_err(|err| err.in_project(index))?;
        }
        Ok(total)
    }
}

fn check_index(index: usize) -> Result<()> {
    if index >= PROJECT_COUNT {
        return Err(LsdjError::IndexOutOfRange {
            kind: "Project",
            index,
            count: PROJECT_COUNT,
        });
    }
    Ok(())
}

/// Cheap check that `bytes` could be a save: right size and magic
pub fn is_likely_sav(bytes: &[u8]) -> bool {
    let magic = SONG_DECOMPRESSED_SIZE + MAGIC_OFFSET;
    bytes.len() == SAV_SIZE && &bytes[magic..magic + 2] == SAV_MAGIC
}

/// [`is_likely_sav`] for the file at `path`, reading only its magic
pub fn is_likely_sav_file(path: impl AsRef<Path>) -> Result<bool> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() != SAV_SIZE as u64 {
        return Ok(false);
    }

    let mut magic = [0u8; 2];
    file.seek(SeekFrom::Start((SONG_DECOMPRESSED_SIZE + MAGIC_OFFSET) as u64))?;
    file.read_exact(&mut magic)?;
    Ok(&magic == SAV_MAGIC)
}

//! Projects: a named, versioned song and its `.lsdsng` file form
//!
//! ```text
//! 0x00  name (8 bytes, NUL padded)
//! 0x08  version
//! 0x09  compressed song, block 1 onwards
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::compression::{compress, decompress};
use crate::error::Result;
use crate::name::Name;
use crate::song::Song;
use crate::stream::{ByteStream, FileStream, MemoryStream};
use crate::{BLOCK_SIZE, PROJECT_MAX_SIZE, PROJECT_NAME_LENGTH};

/// Name of a project
pub type ProjectName = Name<PROJECT_NAME_LENGTH>;

/// Size of the name and version that precede the compressed song
const HEADER_SIZE: usize = PROJECT_NAME_LENGTH + 1;

/// Blocks a project file may use: an uncompressed song's worth
const PROJECT_BLOCK_COUNT: usize = (PROJECT_MAX_SIZE - HEADER_SIZE) / BLOCK_SIZE;

/// A song with the name and edit counter it is saved under
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Project {
    name: ProjectName,
    version: u8,
    song: Song,
}

impl Project {
    /// Unnamed project with version 0 and a blank song
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_song(name: ProjectName, version: u8, song: Song) -> Self {
        Self {
            name,
            version,
            song,
        }
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn set_name(&mut self, name: ProjectName) {
        self.name = name;
    }

    /// Edit counter, bumped by LSDj on every save
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn song_mut(&mut self) -> &mut Song {
        &mut self.song
    }

    pub fn set_song(&mut self, song: Song) {
        self.song = song;
    }

    pub fn into_song(self) -> Song {
        self.song
    }

    /// Read a project from the stream's current position
    ///
    /// Block jumps in the compressed song are relative to the byte after the
    /// version.
    ///
    /// # Errors
    /// - [`crate::LsdjError::UnexpectedEof`] if the header is cut short
    /// - any error from [`decompress`] or [`Song::from_bytes`]
    pub fn read<S: ByteStream + ?Sized>(stream: &mut S) -> Result<Self> {
        let mut name = [0u8; PROJECT_NAME_LENGTH];
        stream.read_exact(&mut name, "project name")?;
        let mut version = [0u8; 1];
        stream.read_exact(&mut version, "project version")?;

        let block_origin = stream.tell()?;
        let image = decompress(stream, block_origin)?;
        let song = Song::from_bytes(&image)?;

        let name = ProjectName::from_bytes(&name);
        debug!(%name, version = version[0], "Read project");
        Ok(Self::with_song(name, version[0], song))
    }

    /// Write the project at the stream's current position
    ///
    /// Nothing is written if the song does not compress into the largest
    /// project size.
    ///
    /// # Returns
    /// The number of bytes written
    ///
    /// # Errors
    /// - [`crate::LsdjError::OutOfBlocks`] if the compressed song is too large
    /// - [`crate::LsdjError::ShortWrite`] if the stream runs out of room
    pub fn write<S: ByteStream + ?Sized>(&self, stream: &mut S) -> Result<usize> {
        let (blocks, used) = self.compress_blocks()?;

        stream.write_all(self.name.raw())?;
        stream.write_all(&[self.version])?;
        stream.write_all(&blocks[..used * BLOCK_SIZE])?;

        debug!(name = %self.name, version = self.version, blocks = used, "Wrote project");
        Ok(HEADER_SIZE + used * BLOCK_SIZE)
    }

    /// Parse a whole `.lsdsng` file held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read(&mut MemoryStream::new(bytes.to_vec()))
    }

    /// Encode as a `.lsdsng` file
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut stream = MemoryStream::with_capacity(PROJECT_MAX_SIZE);
        let written = self.write(&mut stream)?;
        let mut bytes = stream.into_inner();
        bytes.truncate(written);
        Ok(bytes)
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::read(&mut FileStream::open(path)?)
    }

    /// Write to a file, replacing it
    ///
    /// The file is only created once the song has compressed successfully.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes)?;
        Ok(bytes.len())
    }

    /// Number of blocks the compressed song occupies
    pub fn compressed_block_count(&self) -> Result<usize> {
        Ok(self.compress_blocks()?.1)
    }

    fn compress_blocks(&self) -> Result<(Vec<u8>, usize)> {
        let image = self.song.to_bytes();
        let mut buffer = MemoryStream::with_capacity(PROJECT_BLOCK_COUNT * BLOCK_SIZE);
        let used = compress(&image, &mut buffer, 1, PROJECT_BLOCK_COUNT)?;
        Ok((buffer.into_inner(), used))
    }
}

/// Cheap check that a file of `len` bytes could be a project
///
/// Project files are a 9 byte header followed by whole blocks. Advisory
/// only: a match does not mean the contents parse.
pub fn is_likely_project(len: u64) -> bool {
    len > HEADER_SIZE as u64 && len % BLOCK_SIZE as u64 == HEADER_SIZE as u64
}

/// [`is_likely_project`] on the size of the file at `path`
pub fn is_likely_project_file(path: impl AsRef<Path>) -> Result<bool> {
    let metadata = fs::metadata(path)?;
    Ok(metadata.is_file() && is_likely_project(metadata.len()))
}

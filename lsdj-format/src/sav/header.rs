//! The 0x200 byte save header that follows working memory
//!
//! ```text
//! 0x000  project names (32 x 8)
//! 0x100  project versions (32)
//! 0x120  reserved (30)
//! 0x13E  "jk"
//! 0x140  active project (0xFF = none)
//! 0x141  block allocation table (191, 0xFF = free)
//! ```

use crate::error::{LsdjError, Result};
use crate::project::ProjectName;
use crate::stream::ByteStream;
use crate::{
    BLOCK_COUNT, EMPTY_BLOCK, NO_ACTIVE_PROJECT, PROJECT_COUNT, PROJECT_NAME_LENGTH, SAV_MAGIC,
};

/// Reserved bytes between the versions and the magic
pub(crate) const HEADER_RESERVED_LEN: usize = 30;

/// Offset of the magic within the header
pub(crate) const MAGIC_OFFSET: usize =
    PROJECT_COUNT * PROJECT_NAME_LENGTH + PROJECT_COUNT + HEADER_RESERVED_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) names: [ProjectName; PROJECT_COUNT],
    pub(crate) versions: [u8; PROJECT_COUNT],
    pub(crate) reserved: [u8; HEADER_RESERVED_LEN],
    pub(crate) active_project: u8,
    /// Owning slot of each block, block 1 first
    pub(crate) blocks: [u8; BLOCK_COUNT],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            names: [ProjectName::EMPTY; PROJECT_COUNT],
            versions: [0; PROJECT_COUNT],
            reserved: [0; HEADER_RESERVED_LEN],
            active_project: NO_ACTIVE_PROJECT,
            blocks: [EMPTY_BLOCK; BLOCK_COUNT],
        }
    }
}

impl Header {
    /// Read the header, rejecting anything without the save magic
    pub(crate) fn read<S: ByteStream + ?Sized>(stream: &mut S) -> Result<Self> {
        let mut header = Self::default();

        for name in header.names.iter_mut() {
            let mut raw = [0u8; PROJECT_NAME_LENGTH];
            stream.read_exact(&mut raw, "project names")?;
            *name = ProjectName::from_bytes(&raw);
        }
        stream.read_exact(&mut header.versions, "project versions")?;
        stream.read_exact(&mut header.reserved, "save header")?;

        let mut magic = [0u8; 2];
        stream.read_exact(&mut magic, "save magic")?;
        if &magic != SAV_MAGIC {
            return Err(LsdjError::InvalidSavMagic { found: magic });
        }

        let mut active = [0u8; 1];
        stream.read_exact(&mut active, "active project")?;
        header.active_project = active[0];
        stream.read_exact(&mut header.blocks, "block allocation table")?;

        Ok(header)
    }

    pub(crate) fn write<S: ByteStream + ?Sized>(&self, stream: &mut S) -> Result<()> {
        for name in &self.names {
            stream.write_all(name.raw())?;
        }
        stream.write_all(&self.versions)?;
        stream.write_all(&self.reserved)?;
        stream.write_all(SAV_MAGIC)?;
        stream.write_all(&[self.active_project])?;
        stream.write_all(&self.blocks)?;
        Ok(())
    }
}

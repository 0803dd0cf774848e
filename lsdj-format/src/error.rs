//! Error types for song, project and save I/O

/// Errors raised while reading or writing LSDj data
#[derive(Debug, thiserror::Error)]
pub enum LsdjError {
    /// Underlying stream failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream ended before a fixed-size region was fully read
    #[error("Unexpected end of stream while reading {context}")]
    UnexpectedEof { context: &'static str },

    /// Stream accepted fewer bytes than requested
    #[error("Short write: {written} of {expected} bytes written")]
    ShortWrite { written: usize, expected: usize },

    /// A `"rb"` memory flag is missing from the song image
    #[error("Memory flag 'rb' not found at 0x{offset:04X}")]
    MissingSentinel { offset: usize },

    /// Instrument parameter byte 0 holds no known instrument type
    #[error("Unknown type {tag} for instrument {index:02X}")]
    UnknownInstrumentType { index: usize, tag: u8 },

    /// Save header does not carry the "jk" magic
    #[error("Not a save file: expected magic 'jk', found {found:02X?}")]
    InvalidSavMagic { found: [u8; 2] },

    /// Compressed stream ran out before its end marker
    #[error("Compressed song has no end marker (stream ended at offset 0x{offset:X})")]
    MissingTerminator { offset: u64 },

    /// A block jump names a block that cannot exist
    #[error("Invalid jump to block {block} at offset 0x{offset:X}")]
    InvalidBlockJump { block: u8, offset: u64 },

    /// Block jumps never reached the end marker
    #[error("Compressed song jumps between blocks more than {0} times")]
    JumpLimitExceeded(usize),

    /// Decompression produced the wrong amount of song memory
    #[error("Decompressed song is 0x{size:X} bytes, expected 0x8000")]
    DecompressedSize { size: usize },

    /// The block allocation table names a slot that does not exist
    #[error("Block {block} is assigned to invalid project slot {owner}")]
    InvalidBlockOwner { block: usize, owner: u8 },

    /// Compressed song needs more blocks than are available
    #[error("Compressed song does not fit in {available} blocks")]
    OutOfBlocks { available: usize },

    /// A save slot could not be compressed into the remaining blocks
    #[error("Project {index} does not fit in the remaining {available} blocks")]
    ProjectDoesNotFit { index: usize, available: usize },

    /// Slot index past the end of a fixed-size collection
    #[error("{kind} index {index} out of range (max {max})", max = .count - 1)]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },

    /// A save slot that was expected to hold a project is empty
    #[error("Project slot {index} is empty")]
    EmptySlot { index: usize },

    /// Failure while decoding one project of a save
    #[error("Project {index}: {source}")]
    Project {
        index: usize,
        #[source]
        source: Box<LsdjError>,
    },
}

impl LsdjError {
    /// Attach the save slot a failure happened in
    pub(crate) fn in_project(self, index: usize) -> Self {
        LsdjError::Project {
            index,
            source: Box::new(self),
        }
    }

    /// True for errors that mean the data is not in the expected format
    pub fn is_format_error(&self) -> bool {
        match self {
            LsdjError::MissingSentinel { .. }
            | LsdjError::UnknownInstrumentType { .. }
            | LsdjError::InvalidSavMagic { .. }
            | LsdjError::MissingTerminator { .. }
            | LsdjError::InvalidBlockJump { .. }
            | LsdjError::JumpLimitExceeded(_)
            | LsdjError::DecompressedSize { .. }
            | LsdjError::InvalidBlockOwner { .. } => true,
            LsdjError::Project { source, .. } => source.is_format_error(),
            _ => false,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = LsdjError> = std::result::Result<T, E>;

//! LSDJ-Format: LittleSoundDj save and song codec
//!
//! This crate reads and writes the persisted state of LittleSoundDj, the
//! Game Boy music tracker:
//!
//! - **Songs**: the 32 KiB decompressed song memory (sequence rows, chains,
//!   phrases, instruments, soft synths, tables, grooves, waves, speech words)
//! - **Projects** (`.lsdsng`): a named, versioned song stored compressed
//! - **Saves** (`.sav`): one working-memory song plus up to 32 projects
//!   sharing a pool of 191 compressed blocks
//!
//! # Song Memory Overview
//!
//! A song is a flat 0x8000 byte image split into four 0x2000 byte banks.
//! Sparse entities (chains, phrases, instruments, tables) are only present
//! when their slot is marked in an allocation table; absent slots are
//! written back with a fixed fill pattern. The sentinel `"rb"` appears at
//! three offsets and the format version lives in the very last byte.
//!
//! # Compression Overview
//!
//! Projects are compressed into 0x200 byte blocks with a run-length scheme
//! built on two escape bytes:
//!
//! ```text
//! C0 C0        literal 0xC0
//! C0 vv nn     vv repeated nn times
//! E0 E0        literal 0xE0
//! E0 F0 nn     default wave repeated nn times
//! E0 F1 nn     default instrument repeated nn times
//! E0 bb        continue reading at block bb (1-based)
//! E0 FF        end of song
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use lsdj_format::Sav;
//!
//! let sav = Sav::read_from_path("bangers.sav")?;
//! for (index, project) in sav.projects() {
//!     println!("{:02} {} v{:02X}", index, project.name(), project.version());
//! }
//! ```

mod compression;
mod error;
mod name;
mod project;
mod sav;
mod song;
mod stream;

pub use compression::{
    DEFAULT_INSTRUMENT_PATTERN, DEFAULT_WAVE_PATTERN, compress, decompress,
};
pub use error::{LsdjError, Result};
pub use name::Name;
pub use project::{Project, ProjectName, is_likely_project, is_likely_project_file};
pub use sav::{Sav, is_likely_sav, is_likely_sav_file};
pub use song::{
    Channel, Chain, CloneMode, Command, Groove, Instrument, InstrumentKind, InstrumentName,
    KitDistortion, KitInstrument, KitLoopMode, Meta, NoiseInstrument, NoiseStability, Panning,
    Phrase, PlayMode, PulseInstrument, PulseWidth, Row, Song, Synth, SynthDistortion, SynthFilter,
    SynthPhase, SynthWaveform, Table, TotalTime, Vibrato, VibratoDirection, VibratoShape,
    VibratoSpeed, Wave, WaveInstrument, Word, WordName, WorkTime,
};
pub use stream::{ByteStream, FileStream, MemoryStream};

// =============================================================================
// Memory Layout Constants
// =============================================================================

/// Size of a decompressed song image
pub const SONG_DECOMPRESSED_SIZE: usize = 0x8000;

/// Size of one song memory bank
pub const BANK_SIZE: usize = 0x2000;

/// Number of banks in a song image
pub const BANK_COUNT: usize = 4;

/// Size of one compressed block
pub const BLOCK_SIZE: usize = 0x200;

/// Number of compressed blocks available in a save
pub const BLOCK_COUNT: usize = 191;

/// Allocation table value for a block no project owns
pub const EMPTY_BLOCK: u8 = 0xFF;

/// Number of project slots in a save
pub const PROJECT_COUNT: usize = 32;

/// Width of a project name in bytes
pub const PROJECT_NAME_LENGTH: usize = 8;

/// Active project index meaning "working memory is not attached to a slot"
pub const NO_ACTIVE_PROJECT: u8 = 0xFF;

/// Header magic found in every save
pub const SAV_MAGIC: &[u8; 2] = b"jk";

/// Size of the save header (project names, versions, block table)
pub const SAV_HEADER_SIZE: usize = BLOCK_SIZE;

/// Total size of a save file
pub const SAV_SIZE: usize = SONG_DECOMPRESSED_SIZE + SAV_HEADER_SIZE + BLOCK_COUNT * BLOCK_SIZE;

/// Largest possible project file: name, version and an uncompressed song
pub const PROJECT_MAX_SIZE: usize = PROJECT_NAME_LENGTH + 1 + SONG_DECOMPRESSED_SIZE;

/// Sentinel bytes that mark initialised song memory
pub const SONG_SENTINEL: &[u8; 2] = b"rb";

// =============================================================================
// Entity Count Constants
// =============================================================================

/// Number of channels in a sequence row
pub const CHANNEL_COUNT: usize = 4;

/// Number of sequence rows in a song
pub const ROW_COUNT: usize = 256;

/// Number of chain slots
pub const CHAIN_COUNT: usize = 128;

/// Number of phrase slots
pub const PHRASE_COUNT: usize = 0xFF;

/// Number of instrument slots
pub const INSTRUMENT_COUNT: usize = 64;

/// Number of soft synths
pub const SYNTH_COUNT: usize = 16;

/// Number of table slots
pub const TABLE_COUNT: usize = 32;

/// Number of wave frames
pub const WAVE_COUNT: usize = 256;

/// Number of grooves
pub const GROOVE_COUNT: usize = 32;

/// Number of speech words
pub const WORD_COUNT: usize = 42;

/// Number of bookmark bytes
pub const BOOKMARK_COUNT: usize = 64;

/// Steps in a chain, phrase, table or groove
pub const STEP_COUNT: usize = 16;

/// Bytes in a wave frame
pub const WAVE_LENGTH: usize = 16;

/// Bytes of instrument parameters
pub const INSTRUMENT_BYTE_COUNT: usize = 16;

/// Width of an instrument name in bytes
pub const INSTRUMENT_NAME_LENGTH: usize = 5;

/// Width of a speech word name in bytes
pub const WORD_NAME_LENGTH: usize = 4;

/// Allophones (and lengths) per speech word
pub const WORD_LENGTH: usize = 16;

// =============================================================================
// Tests
// =============================================================================

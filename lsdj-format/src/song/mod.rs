//! Song model and the structural codec for decompressed song memory
//!
//! - `layout` - Offsets of every region in the 0x8000 byte image
//! - `allocation` - Allocation tables for chains, phrases, instruments and tables
//! - `types` - Rows, chains, phrases, tables, words and settings
//! - `instrument` - Instrument variants and their bit packing
//! - `synth` - Soft synth parameters
//! - `read` / `write` - Bank-by-bank image decoding and encoding

mod allocation;
mod instrument;
mod layout;
mod read;
mod synth;
mod types;
mod write;

#[cfg(test)]
mod tests;

pub use instrument::{
    Instrument, InstrumentKind, InstrumentName, KitDistortion, KitInstrument, KitLoopMode,
    NoiseInstrument, NoiseStability, Panning, PlayMode, PulseInstrument, PulseWidth, Vibrato,
    VibratoDirection, VibratoShape, VibratoSpeed, WaveInstrument,
};
pub use synth::{Synth, SynthDistortion, SynthFilter, SynthPhase, SynthWaveform};
pub use types::{
    Chain, Channel, CloneMode, Command, Groove, Meta, Phrase, Row, Table, TotalTime, Wave, Word,
    WordName, WorkTime,
};

use crate::error::{LsdjError, Result};
use crate::{
    BOOKMARK_COUNT, CHAIN_COUNT, DEFAULT_WAVE_PATTERN, GROOVE_COUNT, INSTRUMENT_COUNT,
    PHRASE_COUNT, ROW_COUNT, SYNTH_COUNT, TABLE_COUNT, WAVE_COUNT, WORD_COUNT,
};

/// Bytes of song memory with no known meaning, kept for lossless rewrites
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reserved {
    pub(crate) after_bookmarks: [u8; layout::RESERVED_1030_LEN],
    pub(crate) after_instrument_names: [u8; layout::RESERVED_1FBA_LEN],
    pub(crate) bank1_start: [u8; layout::RESERVED_2000_LEN],
    pub(crate) time_checksum: u8,
    pub(crate) after_color_set: u8,
    pub(crate) after_synth_flags: [u8; layout::RESERVED_3FC6_LEN],
    pub(crate) after_drum_max: [u8; layout::RESERVED_3FD1_LEN],
    pub(crate) bank2_end: [u8; layout::RESERVED_5FE0_LEN],
    pub(crate) after_bank3_sentinel: [u8; layout::RESERVED_7FF2_LEN],
}

impl Default for Reserved {
    fn default() -> Self {
        Self {
            after_bookmarks: [0; layout::RESERVED_1030_LEN],
            after_instrument_names: [0; layout::RESERVED_1FBA_LEN],
            bank1_start: [0; layout::RESERVED_2000_LEN],
            time_checksum: 0,
            after_color_set: 0,
            after_synth_flags: [0; layout::RESERVED_3FC6_LEN],
            after_drum_max: [0; layout::RESERVED_3FD1_LEN],
            bank2_end: [0; layout::RESERVED_5FE0_LEN],
            after_bank3_sentinel: [0; layout::RESERVED_7FF2_LEN],
        }
    }
}

/// A complete LSDj song
///
/// Chains, phrases, instruments and tables are sparse: a slot either holds
/// an entity or is absent, and only present entities are marked in the
/// allocation tables on write. Everything else is dense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Format revision of the song memory layout
    pub format_version: u8,
    pub tempo: u8,
    /// Global transposition applied to every channel
    pub transposition: u8,
    /// Volume ceiling for kit instruments
    pub drum_max: u8,
    pub meta: Meta,
    pub rows: [Row; ROW_COUNT],
    pub synths: [Synth; SYNTH_COUNT],
    pub waves: [Wave; WAVE_COUNT],
    pub grooves: [Groove; GROOVE_COUNT],
    pub words: [Word; WORD_COUNT],
    pub word_names: [WordName; WORD_COUNT],
    pub bookmarks: [u8; BOOKMARK_COUNT],
    chains: Vec<Option<Chain>>,
    phrases: Vec<Option<Phrase>>,
    instruments: Vec<Option<Instrument>>,
    tables: Vec<Option<Table>>,
    pub(crate) reserved: Reserved,
}

impl Default for Song {
    fn default() -> Self {
        Self::new()
    }
}

/// Getters and setters for one kind of sparse entity
macro_rules! sparse_accessors {
    ($ty:ty, $field:ident, $count:expr, $kind:literal,
     $get:ident, $get_mut:ident, $set:ident, $remove:ident, $iter:ident) => {
        #[doc = concat!("The ", $kind, " in slot `index`, if allocated")]
        pub fn $get(&self, index: usize) -> Option<&$ty> {
            self.$field.get(index).and_then(Option::as_ref)
        }

        pub fn $get_mut(&mut self, index: usize) -> Option<&mut $ty> {
            self.$field.get_mut(index).and_then(Option::as_mut)
        }

        #[doc = concat!("Store a ", $kind, ", returning the one it replaced")]
        ///
        /// # Errors
        /// [`LsdjError::IndexOutOfRange`] if `index` is past the last slot
        pub fn $set(&mut self, index: usize, value: $ty) -> Result<Option<$ty>> {
            let slot = self
                .$field
                .get_mut(index)
                .ok_or(LsdjError::IndexOutOfRange {
                    kind: $kind,
                    index,
                    count: $count,
                })?;
            Ok(slot.replace(value))
        }

        #[doc = concat!("Free a ", $kind, " slot")]
        pub fn $remove(&mut self, index: usize) -> Option<$ty> {
            self.$field.get_mut(index).and_then(Option::take)
        }

        #[doc = concat!("Allocated ", $kind, "s with their slot index")]
        pub fn $iter(&self) -> impl Iterator<Item = (usize, &$ty)> {
            self.$field
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| slot.as_ref().map(|value| (index, value)))
        }
    };
}

impl Song {
    /// Format version written for newly created songs
    pub const FORMAT_VERSION: u8 = 4;

    /// Blank song: nothing allocated, factory waves and default settings
    pub fn new() -> Self {
        let mut grooves = [[0u8; 16]; GROOVE_COUNT];
        grooves[0][..2].copy_from_slice(&[6, 6]);

        Self {
            format_version: Self::FORMAT_VERSION,
            tempo: 128,
            transposition: 0,
            drum_max: 0x6C,
            meta: Meta::default(),
            rows: [Row::default(); ROW_COUNT],
            synths: [Synth::default(); SYNTH_COUNT],
            waves: [DEFAULT_WAVE_PATTERN; WAVE_COUNT],
            grooves,
            words: [Word::default(); WORD_COUNT],
            word_names: [WordName::EMPTY; WORD_COUNT],
            bookmarks: [0xFF; BOOKMARK_COUNT],
            chains: vec![None; CHAIN_COUNT],
            phrases: vec![None; PHRASE_COUNT],
            instruments: vec![None; INSTRUMENT_COUNT],
            tables: vec![None; TABLE_COUNT],
            reserved: Reserved::default(),
        }
    }

    /// Decode a 0x8000 byte song image
    ///
    /// # Errors
    /// - [`LsdjError::DecompressedSize`] if `image` has the wrong length
    /// - [`LsdjError::MissingSentinel`] if a `"rb"` flag is missing
    /// - [`LsdjError::UnknownInstrumentType`] for an allocated instrument
    ///   of no known type
    pub fn from_bytes(image: &[u8]) -> Result<Self> {
        read::parse_song(image)
    }

    /// Encode into a 0x8000 byte song image
    pub fn to_bytes(&self) -> Vec<u8> {
        write::serialize_song(self)
    }

    /// True when LSDj marked the song as edited since it was last saved
    pub fn has_unsaved_changes(&self) -> bool {
        self.meta.file_changed
    }

    sparse_accessors!(
        Chain, chains, CHAIN_COUNT, "chain",
        chain, chain_mut, set_chain, remove_chain, chains
    );
    sparse_accessors!(
        Phrase, phrases, PHRASE_COUNT, "phrase",
        phrase, phrase_mut, set_phrase, remove_phrase, phrases
    );
    sparse_accessors!(
        Instrument, instruments, INSTRUMENT_COUNT, "instrument",
        instrument, instrument_mut, set_instrument, remove_instrument, instruments
    );
    sparse_accessors!(
        Table, tables, TABLE_COUNT, "table",
        table, table_mut, set_table, remove_table, tables
    );
}

//! Song memory offsets
//!
//! ```text
//! Bank 0  0x0000  phrase notes            Bank 1  0x2000  reserved
//!         0x0FF0  bookmarks                       0x2020  table allocation
//!         0x1030  reserved                        0x2040  instrument allocation
//!         0x1090  grooves                         0x2080  chain phrases
//!         0x1290  rows                            0x2880  chain transpositions
//!         0x1690  table volumes                   0x3080  instrument parameters
//!         0x1890  words                           0x3480  table transpositions
//!         0x1DD0  word names                      0x3680  table commands 1 (+ values)
//!         0x1E78  "rb"                            0x3A80  table commands 2 (+ values)
//!         0x1E7A  instrument names                0x3E80  "rb"
//!         0x1FBA  reserved                        0x3E82  phrase allocation bitmap
//!                                                 0x3EA2  chain allocation bitmap
//! Bank 2  0x4000  phrase commands                 0x3EB2  soft synths
//!         0x4FF0  phrase command values           0x3FB2  settings, clocks, tempo
//!         0x5FE0  reserved
//!                                         Bank 3  0x6000  waves
//!                                                 0x7000  phrase instruments
//!                                                 0x7FF0  "rb"
//!                                                 0x7FF2  reserved
//!                                                 0x7FFF  format version
//! ```

// Bank 0
pub(crate) const PHRASE_NOTES: usize = 0x0000;
pub(crate) const BOOKMARKS: usize = 0x0FF0;
pub(crate) const RESERVED_1030_LEN: usize = 0x60;
pub(crate) const GROOVES: usize = 0x1090;
pub(crate) const ROWS: usize = 0x1290;
pub(crate) const TABLE_VOLUMES: usize = 0x1690;
pub(crate) const WORDS: usize = 0x1890;
pub(crate) const WORD_NAMES: usize = 0x1DD0;
pub(crate) const SENTINEL_BANK0: usize = 0x1E78;
pub(crate) const INSTRUMENT_NAMES: usize = 0x1E7A;
pub(crate) const RESERVED_1FBA: usize = 0x1FBA;
pub(crate) const RESERVED_1FBA_LEN: usize = 0x46;

// Bank 1
pub(crate) const BANK1: usize = 0x2000;
pub(crate) const RESERVED_2000_LEN: usize = 0x20;
pub(crate) const TABLE_ALLOCATION: usize = 0x2020;
pub(crate) const INSTRUMENT_ALLOCATION: usize = 0x2040;
pub(crate) const CHAIN_PHRASES: usize = 0x2080;
pub(crate) const CHAIN_TRANSPOSITIONS: usize = 0x2880;
pub(crate) const INSTRUMENT_PARAMS: usize = 0x3080;
pub(crate) const TABLE_TRANSPOSITIONS: usize = 0x3480;
pub(crate) const TABLE_COMMANDS1: usize = 0x3680;
pub(crate) const TABLE_COMMANDS2: usize = 0x3A80;
pub(crate) const SENTINEL_BANK1: usize = 0x3E80;
pub(crate) const PHRASE_ALLOCATION: usize = 0x3E82;
pub(crate) const CHAIN_ALLOCATION: usize = 0x3EA2;
pub(crate) const SYNTHS: usize = 0x3EB2;
pub(crate) const SETTINGS: usize = 0x3FB2;
pub(crate) const RESERVED_3FC6_LEN: usize = 0x0A;
pub(crate) const DRUM_MAX: usize = 0x3FD0;
pub(crate) const RESERVED_3FD1_LEN: usize = 0x2F;

// Bank 2
pub(crate) const BANK2: usize = 0x4000;
pub(crate) const PHRASE_COMMAND_VALUES: usize = 0x4FF0;
pub(crate) const RESERVED_5FE0: usize = 0x5FE0;
pub(crate) const RESERVED_5FE0_LEN: usize = 0x20;

// Bank 3
pub(crate) const BANK3: usize = 0x6000;
pub(crate) const PHRASE_INSTRUMENTS: usize = 0x7000;
pub(crate) const SENTINEL_BANK3: usize = 0x7FF0;
pub(crate) const RESERVED_7FF2_LEN: usize = 0x0D;
pub(crate) const FORMAT_VERSION: usize = 0x7FFF;

/// Bytes in the table allocation table (one per table)
pub(crate) const TABLE_ALLOCATION_LEN: usize = crate::TABLE_COUNT;

/// Bytes in the instrument allocation table (one per instrument)
pub(crate) const INSTRUMENT_ALLOCATION_LEN: usize = crate::INSTRUMENT_COUNT;

/// Bytes in the phrase allocation bitmap
pub(crate) const PHRASE_ALLOCATION_LEN: usize = 0x20;

/// Bytes in the chain allocation bitmap
pub(crate) const CHAIN_ALLOCATION_LEN: usize = 0x10;

/// Bytes in one soft synth record
pub(crate) const SYNTH_LEN: usize = 16;

/// Byte marking "no chain/phrase/instrument" in reference columns
pub(crate) const NO_REFERENCE: u8 = 0xFF;

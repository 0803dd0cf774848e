//! Block compression for songs
//!
//! This is a pure codec: it turns a 0x8000 byte song image into a chain of
//! 0x200 byte blocks and back. Which blocks belong to which project is
//! tracked by the caller (the save's block allocation table, or the implicit
//! single chain of a project file).
//!
//! - `decode` - Following escape codes and block jumps back into song memory
//! - `encode` - Run-length encoding into consecutive blocks
//! - `tests` - Round trip and hand-built stream tests

mod decode;
mod encode;


pub use decode::decompress;
pub use encode::compress;

// =============================================================================
// Escape Codes
// =============================================================================

/// Introduces a run (`C0 vv nn`) or a literal 0xC0 (`C0 C0`)
pub(crate) const RLE_BYTE: u8 = 0xC0;

/// Introduces a special action (`E0 xx`)
pub(crate) const SPECIAL_ACTION_BYTE: u8 = 0xE0;

/// Special action: repeat the default wave
pub(crate) const DEFAULT_WAVE_BYTE: u8 = 0xF0;

/// Special action: repeat the default instrument
pub(crate) const DEFAULT_INSTRUMENT_BYTE: u8 = 0xF1;

/// Special action: end of song
pub(crate) const END_OF_SONG_BYTE: u8 = 0xFF;

/// Shortest run worth encoding as `C0 vv nn`
pub(crate) const MIN_RUN_LENGTH: usize = 4;

// =============================================================================
// Default Patterns
// =============================================================================

/// Factory wave frame, emitted by `E0 F0 nn`
pub const DEFAULT_WAVE_PATTERN: [u8; 16] = [
    0x8E, 0xCD, 0xCC, 0xBB, 0xAA, 0xA9, 0x99, 0x88, 0x87, 0x76, 0x66, 0x55, 0x54, 0x43, 0x32, 0x31,
];

/// Factory instrument bytes, emitted by `E0 F1 nn`
///
/// The run starts one byte into an instrument record: the type byte (0 for
/// a pulse instrument) precedes it in song memory.
pub const DEFAULT_INSTRUMENT_PATTERN: [u8; 16] = [
    0xA8, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x03, 0x00, 0x00, 0xD0, 0x00, 0x00, 0x00, 0xF3, 0x00, 0x00,
];

//! Compression of song memory into consecutive blocks

use tracing::debug;

use super::{
    DEFAULT_INSTRUMENT_BYTE, DEFAULT_INSTRUMENT_PATTERN, DEFAULT_WAVE_BYTE, DEFAULT_WAVE_PATTERN,
    END_OF_SONG_BYTE, MIN_RUN_LENGTH, RLE_BYTE, SPECIAL_ACTION_BYTE,
};
use crate::error::{LsdjError, Result};
use crate::stream::ByteStream;
use crate::{BLOCK_SIZE, SONG_DECOMPRESSED_SIZE};

/// Highest block number a jump can name (0xE0 and up are escape codes)
const MAX_BLOCK_ID: usize = 0xDF;

/// Room kept free at the end of every block for a jump or the end marker
const TRAILER_LEN: usize = 2;

/// Compress one song image into whole blocks
///
/// The stream must be positioned at the start of block `first_block`
/// (1-based); the song may use that block and the `block_count - 1` blocks
/// physically following it. Blocks are written in full, zero padded after
/// the last jump or end marker.
///
/// Nothing is written unless the whole song fits.
///
/// # Returns
/// The number of blocks used
///
/// # Errors
/// - [`LsdjError::OutOfBlocks`] if the song needs more than `block_count` blocks
/// - [`LsdjError::DecompressedSize`] if `song` is not a 0x8000 byte image
pub fn compress<S: ByteStream + ?Sized>(
    song: &[u8],
    stream: &mut S,
    first_block: u8,
    block_count: usize,
) -> Result<usize> {
    if song.len() != SONG_DECOMPRESSED_SIZE {
        return Err(LsdjError::DecompressedSize { size: song.len() });
    }
    if first_block == 0 {
        return Err(LsdjError::InvalidBlockJump {
            block: 0,
            offset: stream.tell()?,
        });
    }

    let first_block = first_block as usize;
    let available = block_count.min((MAX_BLOCK_ID + 1).saturating_sub(first_block));
    if available == 0 {
        return Err(LsdjError::OutOfBlocks { available });
    }

    let mut writer = BlockWriter::new(first_block, available);
    let mut pos = 0;

    while pos < song.len() {
        let rest = &song[pos..];

        let waves = count_patterns(rest, &DEFAULT_WAVE_PATTERN);
        if waves > 0 {
            writer.push(&[SPECIAL_ACTION_BYTE, DEFAULT_WAVE_BYTE, waves as u8])?;
            pos += waves * DEFAULT_WAVE_PATTERN.len();
            continue;
        }

        let instruments = count_patterns(rest, &DEFAULT_INSTRUMENT_PATTERN);
        if instruments > 0 {
            writer.push(&[SPECIAL_ACTION_BYTE, DEFAULT_INSTRUMENT_BYTE, instruments as u8])?;
            pos += instruments * DEFAULT_INSTRUMENT_PATTERN.len();
            continue;
        }

        match rest[0] {
            RLE_BYTE => writer.push(&[RLE_BYTE, RLE_BYTE])?,
            SPECIAL_ACTION_BYTE => writer.push(&[SPECIAL_ACTION_BYTE, SPECIAL_ACTION_BYTE])?,
            value => {
                let run = rest
                    .iter()
                    .take(u8::MAX as usize)
                    .take_while(|&&b| b == value)
                    .count();
                if run >= MIN_RUN_LENGTH {
                    writer.push(&[RLE_BYTE, value, run as u8])?;
                    pos += run;
                    continue;
                }
                writer.push(&[value])?;
            }
        }
        pos += 1;
    }

    let (blocks, used) = writer.finish();
    stream.write_all(&blocks)?;

    debug!(first_block, used, "Compressed song");
    Ok(used)
}

/// Number of back-to-back copies of `pattern` at the start of `data` (max 255)
fn count_patterns(data: &[u8], pattern: &[u8; 16]) -> usize {
    data.chunks_exact(pattern.len())
        .take(u8::MAX as usize)
        .take_while(|chunk| *chunk == pattern)
        .count()
}

/// Accumulates compressed events into blocks, chaining them with jumps
struct BlockWriter {
    output: Vec<u8>,
    /// Bytes used in the current block
    fill: usize,
    first_block: usize,
    current_block: usize,
    available: usize,
}

impl BlockWriter {
    fn new(first_block: usize, available: usize) -> Self {
        Self {
            output: Vec::with_capacity(BLOCK_SIZE * 8),
            fill: 0,
            first_block,
            current_block: first_block,
            available,
        }
    }

    /// Append one encoding unit, moving to the next block if it won't fit
    /// alongside the trailer
    fn push(&mut self, event: &[u8]) -> Result<()> {
        if self.fill + event.len() + TRAILER_LEN > BLOCK_SIZE {
            let next = self.current_block + 1;
            if next - self.first_block >= self.available {
                return Err(LsdjError::OutOfBlocks {
                    available: self.available,
                });
            }

            self.output.extend_from_slice(&[SPECIAL_ACTION_BYTE, next as u8]);
            self.fill += TRAILER_LEN;
            self.pad_block();
            self.current_block = next;
        }

        self.output.extend_from_slice(event);
        self.fill += event.len();
        Ok(())
    }

    fn pad_block(&mut self) {
        self.output.resize(self.output.len() + BLOCK_SIZE - self.fill, 0);
        self.fill = 0;
    }

    /// Write the end marker and return the blocks plus how many were used
    fn finish(mut self) -> (Vec<u8>, usize) {
        self.output
            .extend_from_slice(&[SPECIAL_ACTION_BYTE, END_OF_SONG_BYTE]);
        self.fill += TRAILER_LEN;
        self.pad_block();

        let used = self.current_block - self.first_block + 1;
        (self.output, used)
    }
}

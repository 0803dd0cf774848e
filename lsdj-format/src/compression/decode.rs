//! Decompression of block-chained song data

use std::io::SeekFrom;

use tracing::trace;

use super::{
    DEFAULT_INSTRUMENT_BYTE, DEFAULT_INSTRUMENT_PATTERN, DEFAULT_WAVE_BYTE, DEFAULT_WAVE_PATTERN,
    END_OF_SONG_BYTE, RLE_BYTE, SPECIAL_ACTION_BYTE,
};
use crate::error::{LsdjError, Result};
use crate::stream::ByteStream;
use crate::{BLOCK_SIZE, SONG_DECOMPRESSED_SIZE};

/// More jumps than there are addressable blocks means the chain loops
const MAX_BLOCK_JUMPS: usize = 0xFF;

/// Decompress one song, starting at the stream's current position
///
/// Block jumps (`E0 bb`) move the stream to
/// `block_origin + (bb - 1) * BLOCK_SIZE`, so `block_origin` is the position
/// of block 1: the first block after the header of a project file, or the
/// first block after the save header.
///
/// Decoding stops at the end marker (`E0 FF`) and the result must be exactly
/// one song image. The stream is left just past the end marker.
///
/// # Errors
/// - [`LsdjError::MissingTerminator`] if the stream ends before `E0 FF`
/// - [`LsdjError::InvalidBlockJump`] for a jump to block 0
/// - [`LsdjError::JumpLimitExceeded`] if the block chain loops
/// - [`LsdjError::DecompressedSize`] if the output is not 0x8000 bytes
pub fn decompress<S: ByteStream + ?Sized>(stream: &mut S, block_origin: u64) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(SONG_DECOMPRESSED_SIZE);
    let mut jumps = 0;

    loop {
        match next_byte(stream)? {
            RLE_BYTE => {
                let value = next_byte(stream)?;
                if value == RLE_BYTE {
                    output.push(RLE_BYTE);
                } else {
                    let count = next_byte(stream)? as usize;
                    output.resize(output.len() + count, value);
                }
            }
            SPECIAL_ACTION_BYTE => match next_byte(stream)? {
                SPECIAL_ACTION_BYTE => output.push(SPECIAL_ACTION_BYTE),
                DEFAULT_WAVE_BYTE => {
                    let count = next_byte(stream)?;
                    for _ in 0..count {
                        output.extend_from_slice(&DEFAULT_WAVE_PATTERN);
                    }
                }
                DEFAULT_INSTRUMENT_BYTE => {
                    let count = next_byte(stream)?;
                    for _ in 0..count {
                        output.extend_from_slice(&DEFAULT_INSTRUMENT_PATTERN);
                    }
                }
                END_OF_SONG_BYTE => break,
                block => {
                    let offset = stream.tell()?;
                    if block == 0 {
                        return Err(LsdjError::InvalidBlockJump { block, offset });
                    }

                    jumps += 1;
                    if jumps > MAX_BLOCK_JUMPS {
                        return Err(LsdjError::JumpLimitExceeded(MAX_BLOCK_JUMPS));
                    }

                    let target = block_origin + (block as u64 - 1) * BLOCK_SIZE as u64;
                    trace!(block, offset, target, "Following block jump");
                    stream.seek(SeekFrom::Start(target))?;
                }
            },
            literal => output.push(literal),
        }

        if output.len() > SONG_DECOMPRESSED_SIZE {
            return Err(LsdjError::DecompressedSize { size: output.len() });
        }
    }

    if output.len() != SONG_DECOMPRESSED_SIZE {
        return Err(LsdjError::DecompressedSize { size: output.len() });
    }

    Ok(output)
}

/// Next compressed byte; running out here means the end marker is missing
fn next_byte<S: ByteStream + ?Sized>(stream: &mut S) -> Result<u8> {
    match stream.read_byte()? {
        Some(byte) => Ok(byte),
        None => Err(LsdjError::MissingTerminator {
            offset: stream.tell()?,
        }),
    }
}

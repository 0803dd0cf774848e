//! Decoding song memory into a [`Song`]

use std::io::{Cursor, Read};

use super::allocation::Allocation;
use super::layout;
use super::types::reference;
use super::{
    Chain, CloneMode, Command, Instrument, InstrumentName, Phrase, Row, Song, Synth, Table,
    TotalTime, WordName, WorkTime,
};
use crate::error::{LsdjError, Result};
use crate::{
    CHANNEL_COUNT, INSTRUMENT_BYTE_COUNT, INSTRUMENT_COUNT, INSTRUMENT_NAME_LENGTH,
    SONG_DECOMPRESSED_SIZE, SONG_SENTINEL, STEP_COUNT, SYNTH_COUNT, WORD_NAME_LENGTH,
};

type Reader<'a> = Cursor<&'a [u8]>;

/// Decode a full song image
///
/// The allocation tables and format version are read up front: they decide
/// which sparse entities are materialised and how instruments are unpacked.
/// The four banks are then read front to back.
pub(crate) fn parse_song(image: &[u8]) -> Result<Song> {
    if image.len() != SONG_DECOMPRESSED_SIZE {
        return Err(LsdjError::DecompressedSize { size: image.len() });
    }

    let allocation = Allocation::read(image);
    let format_version = image[layout::FORMAT_VERSION];

    let mut song = Song::new();
    song.format_version = format_version;
    for (slot, _) in song.chains.iter_mut().zip(allocation.chains).filter(|(_, used)| *used) {
        *slot = Some(Chain::default());
    }
    for (slot, _) in song.phrases.iter_mut().zip(allocation.phrases).filter(|(_, used)| *used) {
        *slot = Some(Phrase::default());
    }
    for (slot, _) in song.tables.iter_mut().zip(allocation.tables).filter(|(_, used)| *used) {
        *slot = Some(Table::default());
    }

    let mut reader = Cursor::new(image);
    let instrument_names = read_bank0(&mut reader, &mut song)?;
    read_bank1(&mut reader, &mut song, &allocation, &instrument_names)?;
    read_bank2(&mut reader, &mut song)?;
    read_bank3(&mut reader, &mut song)?;

    Ok(song)
}

fn read_bank0(
    r: &mut Reader,
    song: &mut Song,
) -> Result<[InstrumentName; INSTRUMENT_COUNT]> {
    expect_at(r, layout::PHRASE_NOTES);
    for phrase in song.phrases.iter_mut() {
        let notes = read_array(r)?;
        if let Some(phrase) = phrase {
            phrase.notes = notes;
        }
    }

    expect_at(r, layout::BOOKMARKS);
    song.bookmarks = read_array(r)?;
    song.reserved.after_bookmarks = read_array(r)?;

    expect_at(r, layout::GROOVES);
    for groove in song.grooves.iter_mut() {
        *groove = read_array(r)?;
    }

    expect_at(r, layout::ROWS);
    for row in song.rows.iter_mut() {
        let chains: [u8; CHANNEL_COUNT] = read_array(r)?;
        *row = Row {
            chains: chains.map(reference),
        };
    }

    expect_at(r, layout::TABLE_VOLUMES);
    for table in song.tables.iter_mut() {
        let volumes = read_array(r)?;
        if let Some(table) = table {
            table.volumes = volumes;
        }
    }

    expect_at(r, layout::WORDS);
    for word in song.words.iter_mut() {
        word.allophones = read_array(r)?;
        word.lengths = read_array(r)?;
    }

    expect_at(r, layout::WORD_NAMES);
    for name in song.word_names.iter_mut() {
        *name = WordName::from_bytes(&read_array::<WORD_NAME_LENGTH>(r)?);
    }

    expect_sentinel(r)?;

    expect_at(r, layout::INSTRUMENT_NAMES);
    let mut names = [InstrumentName::EMPTY; INSTRUMENT_COUNT];
    for name in names.iter_mut() {
        *name = InstrumentName::from_bytes(&read_array::<INSTRUMENT_NAME_LENGTH>(r)?);
    }

    song.reserved.after_instrument_names = read_array(r)?;
    expect_at(r, layout::BANK1);

    Ok(names)
}

fn read_bank1(
    r: &mut Reader,
    song: &mut Song,
    allocation: &Allocation,
    instrument_names: &[InstrumentName; INSTRUMENT_COUNT],
) -> Result<()> {
    song.reserved.bank1_start = read_array(r)?;

    // Allocation tables were read up front
    expect_at(r, layout::TABLE_ALLOCATION);
    skip(r, layout::TABLE_ALLOCATION_LEN + layout::INSTRUMENT_ALLOCATION_LEN);

    expect_at(r, layout::CHAIN_PHRASES);
    for chain in song.chains.iter_mut() {
        let phrases: [u8; STEP_COUNT] = read_array(r)?;
        if let Some(chain) = chain {
            chain.phrases = phrases.map(reference);
        }
    }
    for chain in song.chains.iter_mut() {
        let transpositions = read_array(r)?;
        if let Some(chain) = chain {
            chain.transpositions = transpositions;
        }
    }

    expect_at(r, layout::INSTRUMENT_PARAMS);
    for (index, slot) in song.instruments.iter_mut().enumerate() {
        let params: [u8; INSTRUMENT_BYTE_COUNT] = read_array(r)?;
        if allocation.instruments[index] {
            let name = instrument_names[index];
            *slot = Some(Instrument::decode(index, name, &params, song.format_version)?);
        }
    }

    expect_at(r, layout::TABLE_TRANSPOSITIONS);
    for table in song.tables.iter_mut() {
        let transpositions = read_array(r)?;
        if let Some(table) = table {
            table.transpositions = transpositions;
        }
    }

    expect_at(r, layout::TABLE_COMMANDS1);
    read_table_commands(r, song, |table| &mut table.commands1)?;
    expect_at(r, layout::TABLE_COMMANDS2);
    read_table_commands(r, song, |table| &mut table.commands2)?;

    expect_sentinel(r)?;

    expect_at(r, layout::PHRASE_ALLOCATION);
    skip(r, layout::PHRASE_ALLOCATION_LEN + layout::CHAIN_ALLOCATION_LEN);

    expect_at(r, layout::SYNTHS);
    let mut synth_bytes = [[0u8; layout::SYNTH_LEN]; SYNTH_COUNT];
    for bytes in synth_bytes.iter_mut() {
        *bytes = read_array(r)?;
    }

    expect_at(r, layout::SETTINGS);
    song.meta.work_time = WorkTime {
        hours: read_u8(r)?,
        minutes: read_u8(r)?,
    };
    song.tempo = read_u8(r)?;
    song.transposition = read_u8(r)?;
    song.meta.total_time = TotalTime {
        days: read_u8(r)?,
        hours: read_u8(r)?,
        minutes: read_u8(r)?,
    };
    song.reserved.time_checksum = read_u8(r)?;
    song.meta.key_delay = read_u8(r)?;
    song.meta.key_repeat = read_u8(r)?;
    song.meta.font = read_u8(r)?;
    song.meta.sync = read_u8(r)?;
    song.meta.color_set = read_u8(r)?;
    song.reserved.after_color_set = read_u8(r)?;
    song.meta.clone_mode = CloneMode::from_byte(read_u8(r)?);
    song.meta.file_changed = read_u8(r)? != 0;
    song.meta.power_save = read_u8(r)?;
    song.meta.pre_listen = read_u8(r)? != 0;

    let overwritten = u16::from_le_bytes(read_array(r)?);
    for (index, (synth, bytes)) in song.synths.iter_mut().zip(&synth_bytes).enumerate() {
        *synth = Synth::decode(bytes, overwritten & (1 << index) != 0);
    }
    song.reserved.after_synth_flags = read_array(r)?;

    expect_at(r, layout::DRUM_MAX);
    song.drum_max = read_u8(r)?;
    song.reserved.after_drum_max = read_array(r)?;
    expect_at(r, layout::BANK2);

    Ok(())
}

fn read_bank2(r: &mut Reader, song: &mut Song) -> Result<()> {
    for phrase in song.phrases.iter_mut() {
        let codes: [u8; STEP_COUNT] = read_array(r)?;
        if let Some(phrase) = phrase {
            for (command, code) in phrase.commands.iter_mut().zip(codes) {
                command.code = code;
            }
        }
    }

    expect_at(r, layout::PHRASE_COMMAND_VALUES);
    for phrase in song.phrases.iter_mut() {
        let values: [u8; STEP_COUNT] = read_array(r)?;
        if let Some(phrase) = phrase {
            for (command, value) in phrase.commands.iter_mut().zip(values) {
                command.value = value;
            }
        }
    }

    expect_at(r, layout::RESERVED_5FE0);
    song.reserved.bank2_end = read_array(r)?;
    expect_at(r, layout::BANK3);

    Ok(())
}

fn read_bank3(r: &mut Reader, song: &mut Song) -> Result<()> {
    for wave in song.waves.iter_mut() {
        *wave = read_array(r)?;
    }

    expect_at(r, layout::PHRASE_INSTRUMENTS);
    for phrase in song.phrases.iter_mut() {
        let instruments: [u8; STEP_COUNT] = read_array(r)?;
        if let Some(phrase) = phrase {
            phrase.instruments = instruments.map(reference);
        }
    }

    expect_sentinel(r)?;
    song.reserved.after_bank3_sentinel = read_array(r)?;

    // Format version was read up front
    expect_at(r, layout::FORMAT_VERSION);

    Ok(())
}

/// Read one table command column: all codes, then all values
fn read_table_commands(
    r: &mut Reader,
    song: &mut Song,
    column: fn(&mut Table) -> &mut [Command; STEP_COUNT],
) -> Result<()> {
    for table in song.tables.iter_mut() {
        let codes: [u8; STEP_COUNT] = read_array(r)?;
        if let Some(table) = table {
            for (command, code) in column(table).iter_mut().zip(codes) {
                command.code = code;
            }
        }
    }
    for table in song.tables.iter_mut() {
        let values: [u8; STEP_COUNT] = read_array(r)?;
        if let Some(table) = table {
            for (command, value) in column(table).iter_mut().zip(values) {
                command.value = value;
            }
        }
    }
    Ok(())
}

// =============================================================================
// Cursor Helpers
// =============================================================================

fn read_array<const N: usize>(r: &mut Reader) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_u8(r: &mut Reader) -> Result<u8> {
    let [byte] = read_array::<1>(r)?;
    Ok(byte)
}

fn skip(r: &mut Reader, len: usize) {
    r.set_position(r.position() + len as u64);
}

/// Check for the `"rb"` flag at the cursor
fn expect_sentinel(r: &mut Reader) -> Result<()> {
    let offset = r.position() as usize;
    let found: [u8; 2] = read_array(r)?;
    if &found != SONG_SENTINEL {
        return Err(LsdjError::MissingSentinel { offset });
    }
    Ok(())
}

/// Every region is read in layout order; drift here is a bug in this module
fn expect_at(r: &Reader, offset: usize) {
    debug_assert_eq!(
        r.position() as usize,
        offset,
        "song reader is at 0x{:04X}, expected 0x{:04X}",
        r.position(),
        offset
    );
}

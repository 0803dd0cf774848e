//! Encoding a [`Song`] into song memory

use super::allocation::Allocation;
use super::instrument::DEFAULT_INSTRUMENT;
use super::layout::{self, NO_REFERENCE};
use super::types::reference_byte;
use super::{Command, InstrumentName, Song, Table};
use crate::{SONG_DECOMPRESSED_SIZE, SONG_SENTINEL, STEP_COUNT};

/// Encode a full song image
///
/// Absent entities are written with their empty fill so that a later read
/// sees exactly the same absence.
pub(crate) fn serialize_song(song: &Song) -> Vec<u8> {
    let allocation = Allocation::of(song);
    let mut out = Vec::with_capacity(SONG_DECOMPRESSED_SIZE);

    write_bank0(&mut out, song);
    write_bank1(&mut out, song, &allocation);
    write_bank2(&mut out, song);
    write_bank3(&mut out, song);

    debug_assert_eq!(out.len(), SONG_DECOMPRESSED_SIZE);
    out
}

fn write_bank0(out: &mut Vec<u8>, song: &Song) {
    for phrase in &song.phrases {
        match phrase {
            Some(phrase) => out.extend_from_slice(&phrase.notes),
            None => fill(out, 0, STEP_COUNT),
        }
    }

    expect_at(out, layout::BOOKMARKS);
    out.extend_from_slice(&song.bookmarks);
    out.extend_from_slice(&song.reserved.after_bookmarks);

    expect_at(out, layout::GROOVES);
    for groove in &song.grooves {
        out.extend_from_slice(groove);
    }

    expect_at(out, layout::ROWS);
    for row in &song.rows {
        out.extend(row.chains.map(reference_byte));
    }

    expect_at(out, layout::TABLE_VOLUMES);
    for table in &song.tables {
        out.extend_from_slice(&table.unwrap_or_default().volumes);
    }

    expect_at(out, layout::WORDS);
    for word in &song.words {
        out.extend_from_slice(&word.allophones);
        out.extend_from_slice(&word.lengths);
    }

    expect_at(out, layout::WORD_NAMES);
    for name in &song.word_names {
        out.extend_from_slice(name.raw());
    }

    expect_at(out, layout::SENTINEL_BANK0);
    out.extend_from_slice(SONG_SENTINEL);

    for instrument in &song.instruments {
        let name = instrument.map_or(InstrumentName::EMPTY, |instrument| instrument.name);
        out.extend_from_slice(name.raw());
    }

    expect_at(out, layout::RESERVED_1FBA);
    out.extend_from_slice(&song.reserved.after_instrument_names);
}

fn write_bank1(out: &mut Vec<u8>, song: &Song, allocation: &Allocation) {
    expect_at(out, layout::BANK1);
    out.extend_from_slice(&song.reserved.bank1_start);

    expect_at(out, layout::TABLE_ALLOCATION);
    out.extend_from_slice(&allocation.table_bytes());
    out.extend_from_slice(&allocation.instrument_bytes());

    expect_at(out, layout::CHAIN_PHRASES);
    for chain in &song.chains {
        match chain {
            Some(chain) => out.extend(chain.phrases.map(reference_byte)),
            None => fill(out, NO_REFERENCE, STEP_COUNT),
        }
    }
    for chain in &song.chains {
        match chain {
            Some(chain) => out.extend_from_slice(&chain.transpositions),
            None => fill(out, 0, STEP_COUNT),
        }
    }

    expect_at(out, layout::INSTRUMENT_PARAMS);
    for instrument in &song.instruments {
        match instrument {
            Some(instrument) => out.extend_from_slice(&instrument.encode()),
            None => out.extend_from_slice(&DEFAULT_INSTRUMENT),
        }
    }

    expect_at(out, layout::TABLE_TRANSPOSITIONS);
    for table in &song.tables {
        out.extend_from_slice(&table.unwrap_or_default().transpositions);
    }

    expect_at(out, layout::TABLE_COMMANDS1);
    write_table_commands(out, song, |table| &table.commands1);
    expect_at(out, layout::TABLE_COMMANDS2);
    write_table_commands(out, song, |table| &table.commands2);

    expect_at(out, layout::SENTINEL_BANK1);
    out.extend_from_slice(SONG_SENTINEL);
    out.extend_from_slice(&allocation.phrase_bitmap());
    out.extend_from_slice(&allocation.chain_bitmap());

    expect_at(out, layout::SYNTHS);
    for synth in &song.synths {
        out.extend_from_slice(&synth.encode());
    }

    expect_at(out, layout::SETTINGS);
    let meta = &song.meta;
    out.extend_from_slice(&[
        meta.work_time.hours,
        meta.work_time.minutes,
        song.tempo,
        song.transposition,
        meta.total_time.days,
        meta.total_time.hours,
        meta.total_time.minutes,
        song.reserved.time_checksum,
        meta.key_delay,
        meta.key_repeat,
        meta.font,
        meta.sync,
        meta.color_set,
        song.reserved.after_color_set,
        meta.clone_mode.to_byte(),
        u8::from(meta.file_changed),
        meta.power_save,
        u8::from(meta.pre_listen),
    ]);

    let overwritten = song
        .synths
        .iter()
        .enumerate()
        .filter(|(_, synth)| synth.overwritten)
        .fold(0u16, |bits, (index, _)| bits | (1 << index));
    out.extend_from_slice(&overwritten.to_le_bytes());
    out.extend_from_slice(&song.reserved.after_synth_flags);

    expect_at(out, layout::DRUM_MAX);
    out.push(song.drum_max);
    out.extend_from_slice(&song.reserved.after_drum_max);
}

fn write_bank2(out: &mut Vec<u8>, song: &Song) {
    expect_at(out, layout::BANK2);
    for phrase in &song.phrases {
        let commands = phrase.map(|phrase| phrase.commands).unwrap_or_default();
        out.extend(commands.map(|command| command.code));
    }

    expect_at(out, layout::PHRASE_COMMAND_VALUES);
    for phrase in &song.phrases {
        let commands = phrase.map(|phrase| phrase.commands).unwrap_or_default();
        out.extend(commands.map(|command| command.value));
    }

    expect_at(out, layout::RESERVED_5FE0);
    out.extend_from_slice(&song.reserved.bank2_end);
}

fn write_bank3(out: &mut Vec<u8>, song: &Song) {
    expect_at(out, layout::BANK3);
    for wave in &song.waves {
        out.extend_from_slice(wave);
    }

    expect_at(out, layout::PHRASE_INSTRUMENTS);
    for phrase in &song.phrases {
        match phrase {
            Some(phrase) => out.extend(phrase.instruments.map(reference_byte)),
            None => fill(out, NO_REFERENCE, STEP_COUNT),
        }
    }

    expect_at(out, layout::SENTINEL_BANK3);
    out.extend_from_slice(SONG_SENTINEL);
    out.extend_from_slice(&song.reserved.after_bank3_sentinel);

    expect_at(out, layout::FORMAT_VERSION);
    out.push(song.format_version);
}

/// Write one table command column: all codes, then all values
fn write_table_commands(
    out: &mut Vec<u8>,
    song: &Song,
    column: fn(&Table) -> &[Command; STEP_COUNT],
) {
    for table in &song.tables {
        let commands = table.as_ref().map(column).copied().unwrap_or_default();
        out.extend(commands.map(|command| command.code));
    }
    for table in &song.tables {
        let commands = table.as_ref().map(column).copied().unwrap_or_default();
        out.extend(commands.map(|command| command.value));
    }
}

fn fill(out: &mut Vec<u8>, value: u8, len: usize) {
    out.resize(out.len() + len, value);
}

fn expect_at(out: &[u8], offset: usize) {
    debug_assert_eq!(
        out.len(),
        offset,
        "song writer is at 0x{:04X}, expected 0x{:04X}",
        out.len(),
        offset
    );
}

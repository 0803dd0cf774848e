//! Tests for the song structural codec

use super::instrument::DEFAULT_INSTRUMENT;
use super::layout;
use super::*;
use crate::{SONG_DECOMPRESSED_SIZE, SONG_SENTINEL, STEP_COUNT};

/// A song touching every entity kind and every settings field
fn busy_song() -> Song {
    let mut song = Song::new();
    song.tempo = 0xA0;
    song.transposition = 0xF4;
    song.drum_max = 0x42;
    song.meta.work_time = WorkTime {
        hours: 3,
        minutes: 59,
    };
    song.meta.total_time = TotalTime {
        days: 1,
        hours: 2,
        minutes: 3,
    };
    song.meta.key_delay = 4;
    song.meta.font = 1;
    song.meta.sync = 2;
    song.meta.color_set = 5;
    song.meta.clone_mode = CloneMode::Slim;
    song.meta.file_changed = true;
    song.meta.power_save = 1;
    song.meta.pre_listen = false;

    song.rows[0].set_chain(Channel::Pulse1, Some(0));
    song.rows[0].set_chain(Channel::Noise, Some(0x7F));
    song.rows[255].set_chain(Channel::Wave, Some(0x10));
    song.bookmarks[3] = 0x20;
    song.grooves[31] = [3; STEP_COUNT];
    song.waves[0] = [0x0F; 16];
    song.words[41].allophones[0] = 0x2A;
    song.words[41].lengths[15] = 0x07;
    song.word_names[0] = WordName::new("HEY");

    let mut chain = Chain::default();
    chain.phrases[0] = Some(0);
    chain.phrases[15] = Some(0xFE);
    chain.transpositions[1] = 0x0C;
    song.set_chain(0, chain).unwrap();
    song.set_chain(0x7F, chain).unwrap();

    let mut phrase = Phrase::default();
    phrase.notes[0] = 0x24;
    phrase.instruments[0] = Some(0x3F);
    phrase.commands[4] = Command {
        code: 0x0B,
        value: 0x80,
    };
    song.set_phrase(0, phrase).unwrap();
    song.set_phrase(0xFE, phrase).unwrap();

    let mut table = Table::default();
    table.volumes[2] = 0x0F;
    table.transpositions[3] = 0x0C;
    table.commands1[0] = Command {
        code: 0x01,
        value: 0x02,
    };
    table.commands2[15] = Command {
        code: 0x03,
        value: 0x04,
    };
    song.set_table(31, table).unwrap();

    let mut lead = Instrument::new(InstrumentKind::Pulse(PulseInstrument {
        pulse_width: PulseWidth::ThreeQuarters,
        length: Some(12),
        ..PulseInstrument::default()
    }));
    lead.name = InstrumentName::new("LEAD");
    lead.table = Some(31);
    song.set_instrument(0, lead).unwrap();

    let mut bass = Instrument::new(InstrumentKind::Wave(WaveInstrument {
        synth: 2,
        play_mode: PlayMode::PingPong,
        ..WaveInstrument::default()
    }));
    bass.name = InstrumentName::new("BASS!");
    song.set_instrument(1, bass).unwrap();

    let kit = Instrument::new(InstrumentKind::Kit(KitInstrument {
        loop1: KitLoopMode::Attack,
        distortion: KitDistortion::Wrap,
        ..KitInstrument::default()
    }));
    song.set_instrument(2, kit).unwrap();

    let mut hats = Instrument::new(InstrumentKind::Noise(NoiseInstrument::default()));
    hats.panning = Panning::Left;
    song.set_instrument(63, hats).unwrap();

    song.synths[3].waveform = SynthWaveform::Square;
    song.synths[3].overwritten = true;
    song.synths[15].overwritten = true;

    song
}

#[test]
fn test_new_song_image() {
    let image = Song::new().to_bytes();
    assert_eq!(image.len(), SONG_DECOMPRESSED_SIZE);
    assert_eq!(&image[0x1E78..0x1E7A], SONG_SENTINEL);
    assert_eq!(&image[0x3E80..0x3E82], SONG_SENTINEL);
    assert_eq!(&image[0x7FF0..0x7FF2], SONG_SENTINEL);
    assert_eq!(image[0x7FFF], Song::FORMAT_VERSION);
    assert_eq!(Song::from_bytes(&image).unwrap(), Song::new());
}

#[test]
fn test_roundtrip_busy_song() {
    let song = busy_song();
    let image = song.to_bytes();
    let decoded = Song::from_bytes(&image).unwrap();

    assert_eq!(decoded, song);
    assert_eq!(decoded.to_bytes(), image);
}

#[test]
fn test_settings_offsets() {
    let image = busy_song().to_bytes();
    assert_eq!(image[0x3FB2], 3);
    assert_eq!(image[0x3FB3], 59);
    assert_eq!(image[0x3FB4], 0xA0);
    assert_eq!(image[0x3FB5], 0xF4);
    assert_eq!(image[0x3FC0], 1);
    assert_eq!(image[0x3FC1], 1);
    assert_eq!(&image[0x3FC4..0x3FC6], &[0x08, 0x80]);
    assert_eq!(image[0x3FD0], 0x42);
}

#[test]
fn test_sparse_entities_stay_absent() {
    let song = busy_song();
    let decoded = Song::from_bytes(&song.to_bytes()).unwrap();

    let chains: Vec<usize> = decoded.chains().map(|(index, _)| index).collect();
    let phrases: Vec<usize> = decoded.phrases().map(|(index, _)| index).collect();
    let instruments: Vec<usize> = decoded.instruments().map(|(index, _)| index).collect();
    let tables: Vec<usize> = decoded.tables().map(|(index, _)| index).collect();

    assert_eq!(chains, [0, 0x7F]);
    assert_eq!(phrases, [0, 0xFE]);
    assert_eq!(instruments, [0, 1, 2, 63]);
    assert_eq!(tables, [31]);
}

#[test]
fn test_empty_entity_fills() {
    let image = busy_song().to_bytes();

    // Phrase 1: notes zero, instruments none
    let notes = layout::PHRASE_NOTES + STEP_COUNT;
    assert!(image[notes..notes + STEP_COUNT].iter().all(|&b| b == 0));
    let instruments = layout::PHRASE_INSTRUMENTS + STEP_COUNT;
    assert!(image[instruments..instruments + STEP_COUNT].iter().all(|&b| b == 0xFF));
    let commands = layout::BANK2 + STEP_COUNT;
    assert!(image[commands..commands + STEP_COUNT].iter().all(|&b| b == 0));

    // Chain 1: phrases none, transpositions zero
    let phrases = layout::CHAIN_PHRASES + STEP_COUNT;
    assert!(image[phrases..phrases + STEP_COUNT].iter().all(|&b| b == 0xFF));
    let transpositions = layout::CHAIN_TRANSPOSITIONS + STEP_COUNT;
    assert!(image[transpositions..transpositions + STEP_COUNT].iter().all(|&b| b == 0));

    // Instrument 3: empty name, default parameters
    let name = layout::INSTRUMENT_NAMES + 3 * 5;
    assert_eq!(&image[name..name + 5], &[0; 5]);
    let params = layout::INSTRUMENT_PARAMS + 3 * 16;
    assert_eq!(&image[params..params + 16], &DEFAULT_INSTRUMENT);

    // Table 0: all zero
    assert!(image[layout::TABLE_VOLUMES..layout::TABLE_VOLUMES + STEP_COUNT]
        .iter()
        .all(|&b| b == 0));
    let command_values = layout::TABLE_COMMANDS1 + 0x200;
    assert!(image[command_values..command_values + STEP_COUNT]
        .iter()
        .all(|&b| b == 0));
}

#[test]
fn test_removed_entities_are_written_empty() {
    let mut song = busy_song();
    let removed = song.remove_chain(0x7F).unwrap();
    assert_eq!(removed.phrases[15], Some(0xFE));
    assert!(song.remove_chain(0x7F).is_none());
    song.remove_instrument(63);

    let decoded = Song::from_bytes(&song.to_bytes()).unwrap();
    assert!(decoded.chain(0x7F).is_none());
    assert!(decoded.instrument(63).is_none());
    assert!(decoded.chain(0).is_some());
}

#[test]
fn test_reserved_bytes_roundtrip() {
    let mut image = Song::new().to_bytes();
    image[0x1030] = 0x11;
    image[0x1FFF] = 0x22;
    image[0x2000] = 0x33;
    image[0x3FB9] = 0x44;
    image[0x3FBF] = 0x55;
    image[0x3FC6] = 0x66;
    image[0x3FFF] = 0x77;
    image[0x5FE0] = 0x88;
    image[0x7FFE] = 0x99;
    // Reserved tail of a synth record
    image[layout::SYNTHS + 13] = 0xAA;

    let song = Song::from_bytes(&image).unwrap();
    assert_eq!(song.to_bytes(), image);
}

#[test]
fn test_missing_sentinels() {
    for offset in [0x1E78, 0x3E80, 0x7FF0] {
        let mut image = Song::new().to_bytes();
        image[offset + 1] = b'x';
        let err = Song::from_bytes(&image).unwrap_err();
        assert!(
            matches!(err, LsdjError::MissingSentinel { offset: found } if found == offset),
            "unexpected error {err} for sentinel at 0x{offset:04X}"
        );
        assert!(err.is_format_error());
    }
}

#[test]
fn test_unknown_instrument_type() {
    let mut song = Song::new();
    song.set_instrument(5, Instrument::default()).unwrap();
    let mut image = song.to_bytes();
    image[layout::INSTRUMENT_PARAMS + 5 * 16] = 7;

    assert!(matches!(
        Song::from_bytes(&image),
        Err(LsdjError::UnknownInstrumentType { index: 5, tag: 7 })
    ));
}

#[test]
fn test_odd_field_bytes_roundtrip() {
    let mut song = Song::new();
    song.set_instrument(5, Instrument::default()).unwrap();
    song.set_instrument(6, Instrument::default()).unwrap();
    let mut image = song.to_bytes();

    // Vibrato speed 3, unknown synth enums and an unknown clone mode
    image[layout::INSTRUMENT_PARAMS + 5 * 16 + 8] = 3;
    image[layout::SYNTHS] = 3;
    image[layout::SYNTHS + 16 + 4] = 0x80;
    image[layout::SETTINGS + 14] = 9;
    // Pulse bytes 9 and 12 belong to no field
    let params = [
        0x00, 0xA8, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x03, 0x00, 0x42, 0xD0, 0x00, 0x17, 0x00, 0xF3,
        0x00,
    ];
    let offset = layout::INSTRUMENT_PARAMS + 6 * 16;
    image[offset..offset + 16].copy_from_slice(&params);

    let decoded = Song::from_bytes(&image).unwrap();
    assert_eq!(decoded.synths[0].waveform, SynthWaveform::Unknown(3));
    assert_eq!(decoded.synths[1].phase, SynthPhase::Unknown(0x80));
    assert_eq!(decoded.meta.clone_mode, CloneMode::Unknown(9));
    assert_eq!(decoded.to_bytes(), image);
}

#[test]
fn test_unallocated_instrument_bytes_are_ignored() {
    let mut image = Song::new().to_bytes();
    image[layout::INSTRUMENT_PARAMS + 5 * 16] = 7;

    let song = Song::from_bytes(&image).unwrap();
    assert!(song.instrument(5).is_none());
}

#[test]
fn test_old_format_ignores_tuning_bits() {
    let mut song = Song::new();
    song.format_version = 2;
    song.set_instrument(
        0,
        Instrument::new(InstrumentKind::Wave(WaveInstrument {
            transpose: false,
            ..WaveInstrument::default()
        })),
    )
    .unwrap();

    let decoded = Song::from_bytes(&song.to_bytes()).unwrap();
    let Some(Instrument {
        kind: InstrumentKind::Wave(wave),
        ..
    }) = decoded.instrument(0)
    else {
        panic!("expected a wave instrument");
    };
    assert!(wave.transpose);
}

#[test]
fn test_wrong_image_size() {
    assert!(matches!(
        Song::from_bytes(&[0u8; 0x4000]),
        Err(LsdjError::DecompressedSize { size: 0x4000 })
    ));
}

#[test]
fn test_sparse_index_out_of_range() {
    let mut song = Song::new();
    assert!(matches!(
        song.set_phrase(0xFF, Phrase::default()),
        Err(LsdjError::IndexOutOfRange {
            kind: "phrase",
            index: 0xFF,
            count: 0xFF
        })
    ));
    assert!(song.chain(200).is_none());
    assert!(song.table_mut(32).is_none());
}

#[test]
fn test_mutating_through_accessors() {
    let mut song = Song::new();
    song.set_table(4, Table::default()).unwrap();
    song.table_mut(4).unwrap().volumes[0] = 0x0A;

    let replaced = song.set_table(4, Table::default()).unwrap();
    assert_eq!(replaced.map(|table| table.volumes[0]), Some(0x0A));
    assert!(!song.has_unsaved_changes());
}

//! Tests for save reading, writing and slot management

use super::*;
use crate::compression::{
    DEFAULT_INSTRUMENT_BYTE, DEFAULT_WAVE_BYTE, END_OF_SONG_BYTE, RLE_BYTE, SPECIAL_ACTION_BYTE,
};
use crate::song::Chain;

fn song_with_tempo(tempo: u8) -> Song {
    let mut song = Song::new();
    song.tempo = tempo;
    song
}

/// Song whose waves defeat run-length coding, so it spans many blocks
fn noisy_song(seed: u8) -> Song {
    let mut song = Song::new();
    for (index, wave) in song.waves.iter_mut().enumerate() {
        for (i, sample) in wave.iter_mut().enumerate() {
            *sample = (index as u8)
                .wrapping_mul(31)
                .wrapping_add((i as u8).wrapping_mul(17))
                .wrapping_add(seed);
        }
    }
    song
}

fn named(name: &str, version: u8, song: Song) -> Project {
    Project::with_song(ProjectName::new(name), version, song)
}

/// Position of the block number in a block's trailing jump, if it has one
fn jump_position(block: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < block.len() {
        match (block[i], block.get(i + 1).copied()) {
            (RLE_BYTE, Some(RLE_BYTE)) => i += 2,
            (RLE_BYTE, _) => i += 3,
            (SPECIAL_ACTION_BYTE, Some(SPECIAL_ACTION_BYTE)) => i += 2,
            (SPECIAL_ACTION_BYTE, Some(DEFAULT_WAVE_BYTE | DEFAULT_INSTRUMENT_BYTE)) => i += 3,
            (SPECIAL_ACTION_BYTE, Some(END_OF_SONG_BYTE)) => return None,
            (SPECIAL_ACTION_BYTE, Some(_)) => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

#[test]
fn test_empty_save_layout() {
    let bytes = Sav::new().to_bytes().unwrap();
    assert_eq!(bytes.len(), SAV_SIZE);
    assert!(is_likely_sav(&bytes));
    assert_eq!(&bytes[0x813E..0x8140], b"jk");
    assert_eq!(bytes[0x8140], NO_ACTIVE_PROJECT);
    assert!(bytes[0x8141..0x8200].iter().all(|&b| b == EMPTY_BLOCK));

    let sav = Sav::from_bytes(&bytes).unwrap();
    assert_eq!(sav, Sav::new());
    assert_eq!(sav.project_count(), 0);
    assert_eq!(sav.active_project(), None);
}

#[test]
fn test_slots_roundtrip() {
    let mut sav = Sav::new();
    sav.set_project(0, named("FIRST", 1, song_with_tempo(100)))
        .unwrap();
    sav.set_project(5, named("MIDDLE", 2, song_with_tempo(150)))
        .unwrap();
    sav.set_project(31, named("LAST", 0xFF, song_with_tempo(200)))
        .unwrap();
    sav.working_memory_mut().tempo = 90;
    sav.set_active_project(Some(5)).unwrap();

    let bytes = sav.to_bytes().unwrap();
    let decoded = Sav::from_bytes(&bytes).unwrap();

    assert_eq!(decoded, sav);
    assert_eq!(decoded.project_count(), 3);
    assert_eq!(decoded.active_project(), Some(5));
    assert_eq!(decoded.working_memory().tempo, 90);
    assert_eq!(decoded.project(31).unwrap().name().as_str(), "LAST");
    assert_eq!(decoded.project(31).unwrap().version(), 0xFF);
    assert!(decoded.project(1).is_none());
}

#[test]
fn test_blocks_are_packed_in_slot_order() {
    let mut sav = Sav::new();
    sav.set_project(3, named("BIG", 0, noisy_song(0))).unwrap();
    sav.set_project(1, named("SMALL", 0, Song::new())).unwrap();

    let bytes = sav.to_bytes().unwrap();
    let table = &bytes[0x8141..0x8200];

    // Slot 1 is written first
    let small = sav.project(1).unwrap().compressed_block_count().unwrap();
    let big = sav.project(3).unwrap().compressed_block_count().unwrap();
    assert!(big > small);
    assert!(table[..small].iter().all(|&owner| owner == 1));
    assert!(table[small..small + big].iter().all(|&owner| owner == 3));
    assert!(table[small + big..].iter().all(|&owner| owner == EMPTY_BLOCK));

    assert_eq!(sav.blocks_used().unwrap(), small + big);
    assert_eq!(Sav::from_bytes(&bytes).unwrap(), sav);
}

#[test]
fn test_reserved_header_bytes_survive() {
    let mut bytes = Sav::new().to_bytes().unwrap();
    bytes[0x8120] = 0x12;
    bytes[0x813D] = 0x34;

    let sav = Sav::from_bytes(&bytes).unwrap();
    assert_eq!(sav.to_bytes().unwrap(), bytes);
}

#[test]
fn test_bad_magic_is_rejected() {
    let mut bytes = Sav::new().to_bytes().unwrap();
    bytes[0x813E] = b'J';

    assert!(!is_likely_sav(&bytes));
    let err = Sav::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, LsdjError::InvalidSavMagic { found } if &found == b"Jk"));
    assert!(err.is_format_error());
}

#[test]
fn test_invalid_block_owner() {
    let mut bytes = Sav::new().to_bytes().unwrap();
    bytes[0x8141 + 9] = 0x20;

    assert!(matches!(
        Sav::from_bytes(&bytes),
        Err(LsdjError::InvalidBlockOwner {
            block: 10,
            owner: 0x20
        })
    ));
}

#[test]
fn test_scattered_block_chains() {
    let mut sav = Sav::new();
    sav.set_project(0, named("SCATTER", 3, noisy_song(1)))
        .unwrap();
    sav.set_project(1, named("WEAVE", 4, noisy_song(9)))
        .unwrap();
    let packed = sav.to_bytes().unwrap();

    let table = &packed[0x8141..0x8200];
    let first = table.iter().filter(|&&owner| owner == 0).count();
    let total = first + table.iter().filter(|&&owner| owner == 1).count();
    assert!(first > 3 && total - first > 1);

    // Slot 0 keeps its first block, then runs backwards through the rest
    // of its chain, interleaved with slot 1
    let mut order = vec![1, first + 1];
    let mut backwards = (2..=first).rev();
    let mut forwards = first + 2..=total;
    loop {
        let pair: Vec<usize> = backwards.next().into_iter().chain(forwards.next()).collect();
        if pair.is_empty() {
            break;
        }
        order.extend(pair);
    }
    let mut moved_to = vec![0; total + 1];
    for (position, &block) in order.iter().enumerate() {
        moved_to[block] = position + 1;
    }

    let mut bytes = packed.clone();
    for (position, &block) in order.iter().enumerate() {
        let source = 0x8200 + (block - 1) * BLOCK_SIZE;
        let mut data = packed[source..source + BLOCK_SIZE].to_vec();
        if let Some(at) = jump_position(&data) {
            data[at] = moved_to[data[at] as usize] as u8;
        }

        let target = 0x8200 + position * BLOCK_SIZE;
        bytes[target..target + BLOCK_SIZE].copy_from_slice(&data);
        bytes[0x8141 + position] = packed[0x8141 + block - 1];
    }
    assert_eq!(&bytes[0x8141..0x8145], &[0, 1, 0, 1]);

    let decoded = Sav::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, sav);
}

#[test]
fn test_corrupt_project_names_its_slot() {
    let mut sav = Sav::new();
    sav.set_project(7, named("BROKEN", 0, Song::new())).unwrap();
    let mut bytes = sav.to_bytes().unwrap();

    // Replace the first block with an immediate jump to a non-existent block
    let first_block = 0x8200;
    bytes[first_block..first_block + BLOCK_SIZE].fill(0);
    bytes[first_block] = 0xE0;
    bytes[first_block + 1] = 0xD0;

    let err = Sav::from_bytes(&bytes).unwrap_err();
    let LsdjError::Project { index, source } = &err else {
        panic!("expected a project error, got {err}");
    };
    assert_eq!(*index, 7);
    assert!(source.is_format_error());
}

#[test]
fn test_out_of_blocks_leaves_stream_untouched() {
    let mut sav = Sav::new();
    for index in 0..PROJECT_COUNT {
        sav.set_project(index, named("NOISE", 0, noisy_song(index as u8)))
            .unwrap();
    }

    let mut stream = MemoryStream::new(vec![0xAAu8; SAV_SIZE]);
    let err = sav.write(&mut stream).unwrap_err();

    let LsdjError::ProjectDoesNotFit { index, available } = err else {
        panic!("expected ProjectDoesNotFit, got {err}");
    };
    assert!(index > 0);
    assert!(available < BLOCK_COUNT);
    assert_eq!(stream.tell().unwrap(), 0);
    assert!(stream.get_ref().iter().all(|&b| b == 0xAA));
}

#[test]
fn test_load_and_save_working_memory() {
    let mut sav = Sav::new();
    let mut song = song_with_tempo(133);
    song.meta.file_changed = true;
    sav.set_project(2, named("LOADME", 4, song)).unwrap();

    sav.load_project_into_working_memory(2).unwrap();
    assert_eq!(sav.active_project(), Some(2));
    assert_eq!(sav.working_memory().tempo, 133);
    assert!(!sav.working_memory().has_unsaved_changes());

    let mut chain = Chain::default();
    chain.phrases[0] = Some(3);
    sav.working_memory_mut().set_chain(0, chain).unwrap();
    sav.working_memory_mut().meta.file_changed = true;

    sav.save_working_memory_to_project(2, ProjectName::new("LOADME"))
        .unwrap();
    let saved = sav.project(2).unwrap();
    assert_eq!(saved.version(), 5);
    assert_eq!(saved.song().chain(0), Some(&chain));
    assert!(!saved.song().has_unsaved_changes());

    sav.save_working_memory_to_project(9, ProjectName::new("COPY"))
        .unwrap();
    assert_eq!(sav.project(9).unwrap().version(), 0);
    assert_eq!(sav.active_project(), Some(9));
}

#[test]
fn test_load_empty_slot() {
    let mut sav = Sav::new();
    assert!(matches!(
        sav.load_project_into_working_memory(4),
        Err(LsdjError::EmptySlot { index: 4 })
    ));
    assert!(matches!(
        sav.load_project_into_working_memory(32),
        Err(LsdjError::IndexOutOfRange { index: 32, .. })
    ));
}

#[test]
fn test_remove_active_project_detaches_working_memory() {
    let mut sav = Sav::new();
    sav.set_project(6, named("GONE", 0, Song::new())).unwrap();
    sav.set_active_project(Some(6)).unwrap();

    assert!(sav.remove_project(6).is_some());
    assert_eq!(sav.active_project(), None);
    assert!(sav.remove_project(6).is_none());
    assert!(sav.remove_project(40).is_none());
}

#[test]
fn test_set_project_replaces() {
    let mut sav = Sav::new();
    assert!(sav.set_project(0, named("A", 0, Song::new())).unwrap().is_none());
    let previous = sav.set_project(0, named("B", 0, Song::new())).unwrap();
    assert_eq!(previous.unwrap().name().as_str(), "A");
    assert!(sav.set_project(32, Project::new()).is_err());
    assert!(sav.set_active_project(Some(32)).is_err());
}

#[test]
fn test_read_from_offset() {
    let mut sav = Sav::new();
    sav.set_project(0, named("OFFSET", 0, noisy_song(7))).unwrap();
    let bytes = sav.to_bytes().unwrap();

    let mut padded = vec![0u8; 0x40];
    padded.extend_from_slice(&bytes);
    let mut stream = MemoryStream::new(padded);
    stream.seek(SeekFrom::Start(0x40)).unwrap();

    assert_eq!(Sav::read(&mut stream).unwrap(), sav);
    assert_eq!(stream.tell().unwrap(), 0x40 + SAV_SIZE as u64);
}

#[test]
fn test_sav_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bangers.sav");

    let mut sav = Sav::new();
    sav.set_project(12, named("ONDISK", 3, song_with_tempo(111)))
        .unwrap();
    sav.write_to_path(&path).unwrap();

    assert!(is_likely_sav_file(&path).unwrap());
    assert_eq!(Sav::read_from_path(&path).unwrap(), sav);

    let other = dir.path().join("short.sav");
    fs::write(&other, [0u8; 16]).unwrap();
    assert!(!is_likely_sav_file(&other).unwrap());
}

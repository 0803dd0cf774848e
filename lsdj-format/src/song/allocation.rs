//! Allocation tables for the sparse entities
//!
//! Tables and instruments use one byte per slot (non-zero = in use).
//! Phrases and chains use bitmaps, slot `i` being bit `i % 8` of byte `i / 8`.

use crate::song::Song;
use crate::song::layout::{
    CHAIN_ALLOCATION, CHAIN_ALLOCATION_LEN, INSTRUMENT_ALLOCATION, INSTRUMENT_ALLOCATION_LEN,
    PHRASE_ALLOCATION, PHRASE_ALLOCATION_LEN, TABLE_ALLOCATION, TABLE_ALLOCATION_LEN,
};
use crate::{CHAIN_COUNT, INSTRUMENT_COUNT, PHRASE_COUNT, TABLE_COUNT};

/// Which chain, phrase, instrument and table slots hold data
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Allocation {
    pub(crate) chains: [bool; CHAIN_COUNT],
    pub(crate) phrases: [bool; PHRASE_COUNT],
    pub(crate) instruments: [bool; INSTRUMENT_COUNT],
    pub(crate) tables: [bool; TABLE_COUNT],
}

impl Allocation {
    /// Read every allocation table from a full song image
    pub(crate) fn read(image: &[u8]) -> Self {
        let tables = &image[TABLE_ALLOCATION..TABLE_ALLOCATION + TABLE_ALLOCATION_LEN];
        let instruments =
            &image[INSTRUMENT_ALLOCATION..INSTRUMENT_ALLOCATION + INSTRUMENT_ALLOCATION_LEN];
        let phrases = &image[PHRASE_ALLOCATION..PHRASE_ALLOCATION + PHRASE_ALLOCATION_LEN];
        let chains = &image[CHAIN_ALLOCATION..CHAIN_ALLOCATION + CHAIN_ALLOCATION_LEN];

        Self {
            chains: std::array::from_fn(|i| bit(chains, i)),
            phrases: std::array::from_fn(|i| bit(phrases, i)),
            instruments: std::array::from_fn(|i| instruments[i] != 0),
            tables: std::array::from_fn(|i| tables[i] != 0),
        }
    }

    /// Allocation matching the entities present in `song`
    pub(crate) fn of(song: &Song) -> Self {
        Self {
            chains: std::array::from_fn(|i| song.chain(i).is_some()),
            phrases: std::array::from_fn(|i| song.phrase(i).is_some()),
            instruments: std::array::from_fn(|i| song.instrument(i).is_some()),
            tables: std::array::from_fn(|i| song.table(i).is_some()),
        }
    }

    pub(crate) fn table_bytes(&self) -> [u8; TABLE_ALLOCATION_LEN] {
        self.tables.map(u8::from)
    }

    pub(crate) fn instrument_bytes(&self) -> [u8; INSTRUMENT_ALLOCATION_LEN] {
        self.instruments.map(u8::from)
    }

    pub(crate) fn phrase_bitmap(&self) -> [u8; PHRASE_ALLOCATION_LEN] {
        bitmap(&self.phrases)
    }

    pub(crate) fn chain_bitmap(&self) -> [u8; CHAIN_ALLOCATION_LEN] {
        bitmap(&self.chains)
    }
}

fn bit(bitmap: &[u8], index: usize) -> bool {
    bitmap[index / 8] & (1 << (index % 8)) != 0
}

fn bitmap<const N: usize>(flags: &[bool]) -> [u8; N] {
    let mut bytes = [0u8; N];
    for (index, _) in flags.iter().enumerate().filter(|(_, used)| **used) {
        bytes[index / 8] |= 1 << (index % 8);
    }
    bytes
}

//! Sequencer entities stored in song memory

use crate::name::Name;
use crate::song::layout::NO_REFERENCE;
use crate::{CHANNEL_COUNT, STEP_COUNT, WAVE_LENGTH, WORD_LENGTH, WORD_NAME_LENGTH};

/// One 16-byte wave frame
pub type Wave = [u8; WAVE_LENGTH];

/// Tick counts for each groove step
pub type Groove = [u8; STEP_COUNT];

/// Name of a speech word
pub type WordName = Name<WORD_NAME_LENGTH>;

/// Game Boy sound channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Pulse1 = 0,
    Pulse2 = 1,
    Wave = 2,
    Noise = 3,
}

impl Channel {
    /// All channels in sequence column order
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Pulse1,
        Channel::Pulse2,
        Channel::Wave,
        Channel::Noise,
    ];

    /// Column of this channel in a sequence row
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Chain reference from a stored byte (0xFF means empty)
pub(crate) fn reference(byte: u8) -> Option<u8> {
    (byte != NO_REFERENCE).then_some(byte)
}

/// Stored byte for an optional reference
pub(crate) fn reference_byte(value: Option<u8>) -> u8 {
    value.unwrap_or(NO_REFERENCE)
}

/// One row of the song sequence: the chain each channel plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Row {
    /// Chain per channel, indexed by [`Channel::index`]
    pub chains: [Option<u8>; CHANNEL_COUNT],
}

impl Row {
    pub fn chain(&self, channel: Channel) -> Option<u8> {
        self.chains[channel.index()]
    }

    pub fn set_chain(&mut self, channel: Channel, chain: Option<u8>) {
        self.chains[channel.index()] = chain;
    }

    /// True when no channel plays anything on this row
    pub fn is_empty(&self) -> bool {
        self.chains.iter().all(Option::is_none)
    }
}

/// Effect command: code and parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Command {
    pub code: u8,
    pub value: u8,
}

/// Sixteen phrase references with per-step transposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chain {
    pub phrases: [Option<u8>; STEP_COUNT],
    pub transpositions: [u8; STEP_COUNT],
}

/// Sixteen steps of notes, instruments and commands
///
/// A note of 0 is an empty step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Phrase {
    pub notes: [u8; STEP_COUNT],
    pub instruments: [Option<u8>; STEP_COUNT],
    pub commands: [Command; STEP_COUNT],
}

/// Sixteen steps of volume, transposition and two command columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Table {
    pub volumes: [u8; STEP_COUNT],
    pub transpositions: [u8; STEP_COUNT],
    pub commands1: [Command; STEP_COUNT],
    pub commands2: [Command; STEP_COUNT],
}

/// Speech synthesizer word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Word {
    pub allophones: [u8; WORD_LENGTH],
    pub lengths: [u8; WORD_LENGTH],
}

/// Time spent editing since the clock was last reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkTime {
    pub hours: u8,
    pub minutes: u8,
}

/// Total time the song has been open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TotalTime {
    pub days: u8,
    pub hours: u8,
    pub minutes: u8,
}

/// How chains are copied when cloned in the song screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneMode {
    /// Copy the chain and all of its phrases
    #[default]
    Deep,
    /// Copy the chain, sharing its phrases
    Slim,
    /// A byte LSDj never writes, kept as read
    Unknown(u8),
}

impl CloneMode {
    pub(crate) fn from_byte(value: u8) -> Self {
        match value {
            0 => CloneMode::Deep,
            1 => CloneMode::Slim,
            value => CloneMode::Unknown(value),
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            CloneMode::Deep => 0,
            CloneMode::Slim => 1,
            CloneMode::Unknown(value) => value,
        }
    }
}

/// Global settings and clocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meta {
    pub work_time: WorkTime,
    pub total_time: TotalTime,
    pub key_delay: u8,
    pub key_repeat: u8,
    pub font: u8,
    pub sync: u8,
    pub color_set: u8,
    pub clone_mode: CloneMode,
    /// Set by LSDj when working memory holds edits not yet saved to a project
    pub file_changed: bool,
    pub power_save: u8,
    pub pre_listen: bool,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            work_time: WorkTime::default(),
            total_time: TotalTime::default(),
            key_delay: 7,
            key_repeat: 2,
            font: 0,
            sync: 0,
            color_set: 0,
            clone_mode: CloneMode::Deep,
            file_changed: false,
            power_save: 0,
            pre_listen: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_channels() {
        let mut row = Row::default();
        assert!(row.is_empty());

        row.set_chain(Channel::Wave, Some(0x12));
        assert_eq!(row.chain(Channel::Wave), Some(0x12));
        assert_eq!(row.chains, [None, None, Some(0x12), None]);
        assert!(!row.is_empty());
    }

    #[test]
    fn test_reference_bytes() {
        assert_eq!(reference(0xFF), None);
        assert_eq!(reference(0x00), Some(0));
        assert_eq!(reference_byte(None), 0xFF);
        assert_eq!(reference_byte(Some(0x7F)), 0x7F);
    }

    #[test]
    fn test_clone_mode_keeps_unknown_bytes() {
        assert_eq!(CloneMode::from_byte(1), CloneMode::Slim);
        assert_eq!(CloneMode::from_byte(2), CloneMode::Unknown(2));
        assert_eq!(CloneMode::Unknown(2).to_byte(), 2);
    }
}

//! Soft synth parameters (wave channel waveform generator)

use crate::song::layout::SYNTH_LEN;

/// Base waveform of a soft synth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthWaveform {
    #[default]
    Sawtooth,
    Square,
    Sine,
    /// A byte LSDj never writes, kept as read
    Unknown(u8),
}

impl SynthWaveform {
    fn from_byte(value: u8) -> Self {
        match value {
            0 => Self::Sawtooth,
            1 => Self::Square,
            2 => Self::Sine,
            value => Self::Unknown(value),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Sawtooth => 0,
            Self::Square => 1,
            Self::Sine => 2,
            Self::Unknown(value) => value,
        }
    }
}

/// Filter applied to the soft synth waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthFilter {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    AllPass,
    Unknown(u8),
}

impl SynthFilter {
    fn from_byte(value: u8) -> Self {
        match value {
            0 => Self::LowPass,
            1 => Self::HighPass,
            2 => Self::BandPass,
            3 => Self::AllPass,
            value => Self::Unknown(value),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::LowPass => 0,
            Self::HighPass => 1,
            Self::BandPass => 2,
            Self::AllPass => 3,
            Self::Unknown(value) => value,
        }
    }
}

/// How the soft synth output is limited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthDistortion {
    #[default]
    Clip,
    Wrap,
    Unknown(u8),
}

impl SynthDistortion {
    fn from_byte(value: u8) -> Self {
        match value {
            0 => Self::Clip,
            1 => Self::Wrap,
            value => Self::Unknown(value),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Clip => 0,
            Self::Wrap => 1,
            Self::Unknown(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthPhase {
    #[default]
    Normal,
    Resync,
    Resync2,
    Unknown(u8),
}

impl SynthPhase {
    fn from_byte(value: u8) -> Self {
        match value {
            0 => Self::Normal,
            1 => Self::Resync,
            2 => Self::Resync2,
            value => Self::Unknown(value),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Resync => 1,
            Self::Resync2 => 2,
            Self::Unknown(value) => value,
        }
    }
}

/// One soft synth: parameters interpolated from start to end values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Synth {
    pub waveform: SynthWaveform,
    pub filter: SynthFilter,
    /// Resonance at the start (0..=15)
    pub resonance_start: u8,
    /// Resonance at the end (0..=15)
    pub resonance_end: u8,
    pub distortion: SynthDistortion,
    pub phase: SynthPhase,
    pub volume_start: u8,
    pub cutoff_start: u8,
    pub phase_start: u8,
    pub vshift_start: u8,
    pub volume_end: u8,
    pub cutoff_end: u8,
    pub phase_end: u8,
    pub vshift_end: u8,
    /// Wave frames of this synth were edited by hand after generation
    pub overwritten: bool,
    reserved: [u8; 3],
}

impl Default for Synth {
    fn default() -> Self {
        Self {
            waveform: SynthWaveform::Sawtooth,
            filter: SynthFilter::LowPass,
            resonance_start: 0,
            resonance_end: 0,
            distortion: SynthDistortion::Clip,
            phase: SynthPhase::Normal,
            volume_start: 0x10,
            cutoff_start: 0xFF,
            phase_start: 0,
            vshift_start: 0,
            volume_end: 0x10,
            cutoff_end: 0xFF,
            phase_end: 0,
            vshift_end: 0,
            overwritten: false,
            reserved: [0; 3],
        }
    }
}

impl Synth {
    /// Unknown enumerated bytes are kept, so decoding never fails
    pub(crate) fn decode(bytes: &[u8; SYNTH_LEN], overwritten: bool) -> Self {
        Self {
            waveform: SynthWaveform::from_byte(bytes[0]),
            filter: SynthFilter::from_byte(bytes[1]),
            resonance_start: bytes[2] >> 4,
            resonance_end: bytes[2] & 0x0F,
            distortion: SynthDistortion::from_byte(bytes[3]),
            phase: SynthPhase::from_byte(bytes[4]),
            volume_start: bytes[5],
            cutoff_start: bytes[6],
            phase_start: bytes[7],
            vshift_start: bytes[8],
            volume_end: bytes[9],
            cutoff_end: bytes[10],
            phase_end: bytes[11],
            vshift_end: bytes[12],
            overwritten,
            reserved: [bytes[13], bytes[14], bytes[15]],
        }
    }

    pub(crate) fn encode(&self) -> [u8; SYNTH_LEN] {
        [
            self.waveform.to_byte(),
            self.filter.to_byte(),
            ((self.resonance_start & 0x0F) << 4) | (self.resonance_end & 0x0F),
            self.distortion.to_byte(),
            self.phase.to_byte(),
            self.volume_start,
            self.cutoff_start,
            self.phase_start,
            self.vshift_start,
            self.volume_end,
            self.cutoff_end,
            self.phase_end,
            self.vshift_end,
            self.reserved[0],
            self.reserved[1],
            self.reserved[2],
        ]
    }
}

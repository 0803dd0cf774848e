//! Instruments and their 16-byte parameter packing
//!
//! Byte 0 of the parameters is the type tag; the meaning of the other
//! bytes depends on it. Fields shared by every type:
//!
//! ```text
//! byte 5  bit 3     automate
//! byte 6  bit 5     table enabled, bits 0-4 table
//! byte 7  bits 0-1  panning
//! ```

use crate::error::{LsdjError, Result};
use crate::name::Name;
use crate::{INSTRUMENT_BYTE_COUNT, INSTRUMENT_NAME_LENGTH};

/// Name of an instrument
pub type InstrumentName = Name<INSTRUMENT_NAME_LENGTH>;

/// Parameters of a freshly created instrument (a pulse instrument)
pub(crate) const DEFAULT_INSTRUMENT: [u8; INSTRUMENT_BYTE_COUNT] = [
    0x00, 0xA8, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x03, 0x00, 0x00, 0xD0, 0x00, 0x00, 0x00, 0xF3, 0x00,
];

/// Oldest format version that stores the tuning bits
pub(crate) const TUNING_FORMAT_VERSION: u8 = 3;

const TYPE_PULSE: u8 = 0;
const TYPE_WAVE: u8 = 1;
const TYPE_KIT: u8 = 2;
const TYPE_NOISE: u8 = 3;

const LENGTH_ENABLED: u8 = 0x40;
const LENGTH_MASK: u8 = 0x3F;
const TABLE_ENABLED: u8 = 0x20;
const TABLE_MASK: u8 = 0x1F;
const AUTOMATE: u8 = 0x08;
const TRANSPOSE_OFF: u8 = 0x20;
const DRUM_MODE: u8 = 0x40;
const KIT_LOOP1_ON: u8 = 0x40;
const KIT_LOOP2_ON: u8 = 0x20;
const KIT_ATTACK: u8 = 0x40;
const KIT_HALF_SPEED: u8 = 0x80;
const KIT_MASK: u8 = 0x3F;
const VIBRATO_FLAGS: u8 = 0x07;
const VIBRATO_SPEED_MASK: u8 = 0x03;

// =============================================================================
// Field Enums
// =============================================================================

/// Stereo output of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panning {
    Off = 0,
    Right = 1,
    Left = 2,
    #[default]
    Both = 3,
}

impl Panning {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Panning::Off,
            1 => Panning::Right,
            2 => Panning::Left,
            _ => Panning::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VibratoShape {
    #[default]
    HighFrequency = 0,
    Sawtooth = 1,
    Sine = 2,
    Square = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VibratoDirection {
    #[default]
    Up = 0,
    Down = 1,
}

/// Rate at which vibrato (and pitch commands) update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VibratoSpeed {
    #[default]
    Fast,
    Tick,
    Step,
    /// The fourth bit pattern, which LSDj never writes
    Unknown(u8),
}

impl VibratoSpeed {
    fn from_bits(bits: u8) -> Self {
        match bits & VIBRATO_SPEED_MASK {
            0 => VibratoSpeed::Fast,
            1 => VibratoSpeed::Tick,
            2 => VibratoSpeed::Step,
            bits => VibratoSpeed::Unknown(bits),
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            VibratoSpeed::Fast => 0,
            VibratoSpeed::Tick => 1,
            VibratoSpeed::Step => 2,
            VibratoSpeed::Unknown(bits) => bits & VIBRATO_SPEED_MASK,
        }
    }
}

/// Vibrato settings of a pulse or wave instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vibrato {
    pub shape: VibratoShape,
    pub direction: VibratoDirection,
    pub speed: VibratoSpeed,
}

impl Vibrato {
    /// Unpack from the flags byte (5) and the speed byte (8)
    fn unpack(flags: u8, speed: u8) -> Self {
        let shape = match (flags >> 1) & 0x03 {
            0 => VibratoShape::HighFrequency,
            1 => VibratoShape::Sawtooth,
            2 => VibratoShape::Sine,
            _ => VibratoShape::Square,
        };
        let direction = if flags & 0x01 == 0 {
            VibratoDirection::Up
        } else {
            VibratoDirection::Down
        };
        Self {
            shape,
            direction,
            speed: VibratoSpeed::from_bits(speed),
        }
    }

    fn flag_bits(&self) -> u8 {
        ((self.shape as u8) << 1) | self.direction as u8
    }
}

/// Duty cycle of a pulse instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PulseWidth {
    /// 12.5%
    #[default]
    Eighth = 0,
    /// 25%
    Quarter = 1,
    /// 50%
    Half = 2,
    /// 75%
    ThreeQuarters = 3,
}

/// How a wave instrument steps through its synth frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    #[default]
    Once = 0,
    Loop = 1,
    PingPong = 2,
    Manual = 3,
}

/// Whether a kit sample loops, and from where
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KitLoopMode {
    #[default]
    Off,
    /// Loop the whole sample
    On,
    /// Loop after the attack portion
    Attack,
}

impl KitLoopMode {
    fn unpack(attack: bool, on: bool) -> Self {
        if attack {
            KitLoopMode::Attack
        } else if on {
            KitLoopMode::On
        } else {
            KitLoopMode::Off
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KitDistortion {
    #[default]
    Clip,
    Shape,
    Shape2,
    Wrap,
    /// A byte outside 0xD0..=0xD3, kept as read
    Unknown(u8),
}

impl KitDistortion {
    fn from_byte(value: u8) -> Self {
        match value {
            0xD0 => KitDistortion::Clip,
            0xD1 => KitDistortion::Shape,
            0xD2 => KitDistortion::Shape2,
            0xD3 => KitDistortion::Wrap,
            value => KitDistortion::Unknown(value),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            KitDistortion::Clip => 0xD0,
            KitDistortion::Shape => 0xD1,
            KitDistortion::Shape2 => 0xD2,
            KitDistortion::Wrap => 0xD3,
            KitDistortion::Unknown(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseStability {
    #[default]
    Free = 0,
    Stable = 1,
}

// =============================================================================
// Instrument Variants
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseInstrument {
    pub envelope: u8,
    pub pulse2_tune: u8,
    /// Sound length (0..=63), `None` to sound until the next note
    pub length: Option<u8>,
    pub sweep: u8,
    pub vibrato: Vibrato,
    /// Follow the song and chain transposition
    pub transpose: bool,
    pub drum_mode: bool,
    pub pulse_width: PulseWidth,
    /// Detune (0..=15)
    pub fine_tune: u8,
}

impl Default for PulseInstrument {
    fn default() -> Self {
        Self {
            envelope: 0xA8,
            pulse2_tune: 0,
            length: None,
            sweep: 0xFF,
            vibrato: Vibrato::default(),
            transpose: true,
            drum_mode: false,
            pulse_width: PulseWidth::Eighth,
            fine_tune: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveInstrument {
    pub volume: u8,
    /// Soft synth played (0..=15)
    pub synth: u8,
    /// Frame the loop restarts at (0..=15)
    pub repeat: u8,
    pub vibrato: Vibrato,
    pub transpose: bool,
    pub play_mode: PlayMode,
    /// Frame count (0..=15)
    pub length: u8,
    /// Frame speed (0..=15)
    pub speed: u8,
}

impl Default for WaveInstrument {
    fn default() -> Self {
        Self {
            volume: 3,
            synth: 0,
            repeat: 0,
            vibrato: Vibrato::default(),
            transpose: true,
            play_mode: PlayMode::Once,
            length: 0x0F,
            speed: 0x03,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KitInstrument {
    pub volume: u8,
    /// First kit (0..=63)
    pub kit1: u8,
    /// Second kit (0..=63)
    pub kit2: u8,
    pub offset1: u8,
    pub offset2: u8,
    pub length1: u8,
    pub length2: u8,
    pub loop1: KitLoopMode,
    pub loop2: KitLoopMode,
    pub pitch: u8,
    pub half_speed: bool,
    pub distortion: KitDistortion,
}

impl Default for KitInstrument {
    fn default() -> Self {
        Self {
            volume: 3,
            kit1: 0,
            kit2: 0,
            offset1: 0,
            offset2: 0,
            length1: 0,
            length2: 0,
            loop1: KitLoopMode::Off,
            loop2: KitLoopMode::Off,
            pitch: 0,
            half_speed: false,
            distortion: KitDistortion::Clip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseInstrument {
    pub envelope: u8,
    pub stability: NoiseStability,
    /// Sound length (0..=63), `None` to sound until the next note
    pub length: Option<u8>,
    pub shape: u8,
}

impl Default for NoiseInstrument {
    fn default() -> Self {
        Self {
            envelope: 0xA8,
            stability: NoiseStability::Free,
            length: None,
            shape: 0xFF,
        }
    }
}

/// Type-specific instrument parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    Pulse(PulseInstrument),
    Wave(WaveInstrument),
    Kit(KitInstrument),
    Noise(NoiseInstrument),
}

impl InstrumentKind {
    fn tag(&self) -> u8 {
        match self {
            InstrumentKind::Pulse(_) => TYPE_PULSE,
            InstrumentKind::Wave(_) => TYPE_WAVE,
            InstrumentKind::Kit(_) => TYPE_KIT,
            InstrumentKind::Noise(_) => TYPE_NOISE,
        }
    }

    /// Lowercase type name as shown in LSDj
    pub fn type_name(&self) -> &'static str {
        match self {
            InstrumentKind::Pulse(_) => "pulse",
            InstrumentKind::Wave(_) => "wave",
            InstrumentKind::Kit(_) => "kit",
            InstrumentKind::Noise(_) => "noise",
        }
    }
}

/// A named instrument
#[derive(Debug, Clone, Copy, Eq)]
pub struct Instrument {
    pub name: InstrumentName,
    pub panning: Panning,
    /// Table run alongside each note (0..=31)
    pub table: Option<u8>,
    pub automate: bool,
    pub kind: InstrumentKind,
    /// Parameter bits no field decodes, with the type tag they belong to
    /// in byte 0
    unmapped: [u8; INSTRUMENT_BYTE_COUNT],
}

impl Default for Instrument {
    fn default() -> Self {
        Self::new(InstrumentKind::Pulse(PulseInstrument::default()))
    }
}

impl PartialEq for Instrument {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.panning == other.panning
            && self.table == other.table
            && self.automate == other.automate
            && self.kind == other.kind
            && self.unmapped_bits() == other.unmapped_bits()
    }
}

impl Instrument {
    /// Unnamed instrument with both speakers on and no table
    pub fn new(kind: InstrumentKind) -> Self {
        Self {
            name: InstrumentName::EMPTY,
            panning: Panning::Both,
            table: None,
            automate: false,
            unmapped: template(kind.tag()),
            kind,
        }
    }

    /// Decode the parameters of instrument `index`
    ///
    /// Bits no field covers are kept and written back by [`Self::encode`].
    ///
    /// # Errors
    /// - [`LsdjError::UnknownInstrumentType`] for a type tag above 3
    pub(crate) fn decode(
        index: usize,
        name: InstrumentName,
        bytes: &[u8; INSTRUMENT_BYTE_COUNT],
        format_version: u8,
    ) -> Result<Self> {
        let has_tuning = format_version >= TUNING_FORMAT_VERSION;

        let kind = match bytes[0] {
            TYPE_PULSE => InstrumentKind::Pulse(PulseInstrument {
                envelope: bytes[1],
                pulse2_tune: bytes[2],
                length: unpack_length(bytes[3]),
                sweep: bytes[4],
                vibrato: Vibrato::unpack(bytes[5], bytes[8]),
                transpose: !has_tuning || bytes[5] & TRANSPOSE_OFF == 0,
                drum_mode: has_tuning && bytes[5] & DRUM_MODE != 0,
                pulse_width: match bytes[7] >> 6 {
                    0 => PulseWidth::Eighth,
                    1 => PulseWidth::Quarter,
                    2 => PulseWidth::Half,
                    _ => PulseWidth::ThreeQuarters,
                },
                fine_tune: (bytes[7] >> 2) & 0x0F,
            }),
            TYPE_WAVE => InstrumentKind::Wave(WaveInstrument {
                volume: bytes[1],
                synth: bytes[2] >> 4,
                repeat: bytes[2] & 0x0F,
                vibrato: Vibrato::unpack(bytes[5], bytes[8]),
                transpose: !has_tuning || bytes[5] & TRANSPOSE_OFF == 0,
                play_mode: match bytes[9] & 0x03 {
                    0 => PlayMode::Once,
                    1 => PlayMode::Loop,
                    2 => PlayMode::PingPong,
                    _ => PlayMode::Manual,
                },
                length: bytes[14] >> 4,
                speed: bytes[14] & 0x0F,
            }),
            TYPE_KIT => InstrumentKind::Kit(KitInstrument {
                volume: bytes[1],
                kit1: bytes[2] & KIT_MASK,
                kit2: bytes[9] & KIT_MASK,
                offset1: bytes[11],
                offset2: bytes[12],
                length1: bytes[3],
                length2: bytes[13],
                loop1: KitLoopMode::unpack(
                    bytes[2] & KIT_ATTACK != 0,
                    bytes[5] & KIT_LOOP1_ON != 0,
                ),
                loop2: KitLoopMode::unpack(
                    bytes[9] & KIT_ATTACK != 0,
                    bytes[5] & KIT_LOOP2_ON != 0,
                ),
                pitch: bytes[8],
                half_speed: bytes[2] & KIT_HALF_SPEED != 0,
                distortion: KitDistortion::from_byte(bytes[10]),
            }),
            TYPE_NOISE => InstrumentKind::Noise(NoiseInstrument {
                envelope: bytes[1],
                stability: if bytes[2] & 0x01 == 0 {
                    NoiseStability::Free
                } else {
                    NoiseStability::Stable
                },
                length: unpack_length(bytes[3]),
                shape: bytes[4],
            }),
            tag => return Err(LsdjError::UnknownInstrumentType { index, tag }),
        };

        Ok(Self {
            name,
            panning: Panning::from_bits(bytes[7]),
            table: (bytes[6] & TABLE_ENABLED != 0).then_some(bytes[6] & TABLE_MASK),
            automate: bytes[5] & AUTOMATE != 0,
            kind,
            unmapped: unmapped(bytes, has_tuning),
        })
    }

    /// Bits to pack the fields onto
    ///
    /// An instrument whose type changed since it was read starts over from
    /// the default instrument bytes.
    fn unmapped_bits(&self) -> [u8; INSTRUMENT_BYTE_COUNT] {
        let tag = self.kind.tag();
        if self.unmapped[0] == tag {
            self.unmapped
        } else {
            template(tag)
        }
    }

    /// Pack the fields onto the bits kept from the last read
    pub(crate) fn encode(&self) -> [u8; INSTRUMENT_BYTE_COUNT] {
        let mut bytes = self.unmapped_bits();
        bytes[5] |= if self.automate { AUTOMATE } else { 0 };
        bytes[6] = match self.table {
            Some(table) => {
                (bytes[6] & !(TABLE_ENABLED | TABLE_MASK)) | TABLE_ENABLED | (table & TABLE_MASK)
            }
            None => bytes[6] & !TABLE_ENABLED,
        };
        bytes[7] |= self.panning as u8;

        match &self.kind {
            InstrumentKind::Pulse(pulse) => {
                bytes[1] = pulse.envelope;
                bytes[2] = pulse.pulse2_tune;
                bytes[3] = pack_length(bytes[3], pulse.length);
                bytes[4] = pulse.sweep;
                bytes[5] |= pulse.vibrato.flag_bits()
                    | if pulse.transpose { 0 } else { TRANSPOSE_OFF }
                    | if pulse.drum_mode { DRUM_MODE } else { 0 };
                bytes[7] |= ((pulse.pulse_width as u8) << 6) | ((pulse.fine_tune & 0x0F) << 2);
                bytes[8] |= pulse.vibrato.speed.to_bits();
            }
            InstrumentKind::Wave(wave) => {
                bytes[1] = wave.volume;
                bytes[2] = ((wave.synth & 0x0F) << 4) | (wave.repeat & 0x0F);
                bytes[5] |=
                    wave.vibrato.flag_bits() | if wave.transpose { 0 } else { TRANSPOSE_OFF };
                bytes[8] |= wave.vibrato.speed.to_bits();
                bytes[9] |= wave.play_mode as u8;
                bytes[14] = ((wave.length & 0x0F) << 4) | (wave.speed & 0x0F);
            }
            InstrumentKind::Kit(kit) => {
                bytes[1] = kit.volume;
                bytes[2] = (kit.kit1 & KIT_MASK)
                    | if kit.half_speed { KIT_HALF_SPEED } else { 0 }
                    | if kit.loop1 == KitLoopMode::Attack { KIT_ATTACK } else { 0 };
                bytes[3] = kit.length1;
                bytes[5] = pack_loop_on(bytes[5], kit.loop1, KIT_LOOP1_ON);
                bytes[5] = pack_loop_on(bytes[5], kit.loop2, KIT_LOOP2_ON);
                bytes[8] = kit.pitch;
                bytes[9] |= (kit.kit2 & KIT_MASK)
                    | if kit.loop2 == KitLoopMode::Attack { KIT_ATTACK } else { 0 };
                bytes[10] = kit.distortion.to_byte();
                bytes[11] = kit.offset1;
                bytes[12] = kit.offset2;
                bytes[13] = kit.length2;
            }
            InstrumentKind::Noise(noise) => {
                bytes[1] = noise.envelope;
                bytes[2] |= noise.stability as u8;
                bytes[3] = pack_length(bytes[3], noise.length);
                bytes[4] = noise.shape;
            }
        }

        bytes
    }
}

/// Bits of `bytes` that a field of its instrument type decodes
///
/// Before format version 3 the tuning bits are not fields. A disabled
/// table or length leaves its value bits unread, and a kit attack bit
/// hides its loop-on bit.
fn field_bits(
    bytes: &[u8; INSTRUMENT_BYTE_COUNT],
    has_tuning: bool,
) -> [u8; INSTRUMENT_BYTE_COUNT] {
    let mut mask = [0u8; INSTRUMENT_BYTE_COUNT];
    mask[0] = 0xFF;
    mask[5] = AUTOMATE;
    mask[6] = if bytes[6] & TABLE_ENABLED != 0 {
        TABLE_ENABLED | TABLE_MASK
    } else {
        TABLE_ENABLED
    };
    mask[7] = 0x03;

    match bytes[0] {
        TYPE_PULSE => {
            mask[1] = 0xFF;
            mask[2] = 0xFF;
            mask[3] = length_bits(bytes[3]);
            mask[4] = 0xFF;
            mask[5] |= VIBRATO_FLAGS;
            if has_tuning {
                mask[5] |= TRANSPOSE_OFF | DRUM_MODE;
            }
            mask[7] = 0xFF;
            mask[8] = VIBRATO_SPEED_MASK;
        }
        TYPE_WAVE => {
            mask[1] = 0xFF;
            mask[2] = 0xFF;
            mask[5] |= VIBRATO_FLAGS;
            if has_tuning {
                mask[5] |= TRANSPOSE_OFF;
            }
            mask[8] = VIBRATO_SPEED_MASK;
            mask[9] = 0x03;
            mask[14] = 0xFF;
        }
        TYPE_KIT => {
            for index in [1, 2, 3, 8, 10, 11, 12, 13] {
                mask[index] = 0xFF;
            }
            if bytes[2] & KIT_ATTACK == 0 {
                mask[5] |= KIT_LOOP1_ON;
            }
            if bytes[9] & KIT_ATTACK == 0 {
                mask[5] |= KIT_LOOP2_ON;
            }
            mask[9] = KIT_ATTACK | KIT_MASK;
        }
        TYPE_NOISE => {
            mask[1] = 0xFF;
            mask[2] = 0x01;
            mask[3] = length_bits(bytes[3]);
            mask[4] = 0xFF;
        }
        _ => {}
    }

    mask
}

/// `bytes` with every field bit cleared, keeping the type tag
fn unmapped(bytes: &[u8; INSTRUMENT_BYTE_COUNT], has_tuning: bool) -> [u8; INSTRUMENT_BYTE_COUNT] {
    let mask = field_bits(bytes, has_tuning);
    let mut unmapped: [u8; INSTRUMENT_BYTE_COUNT] = std::array::from_fn(|i| bytes[i] & !mask[i]);
    unmapped[0] = bytes[0];
    unmapped
}

/// Unmapped bits of the default instrument, retagged
fn template(tag: u8) -> [u8; INSTRUMENT_BYTE_COUNT] {
    let mut bytes = DEFAULT_INSTRUMENT;
    bytes[0] = tag;
    unmapped(&bytes, true)
}

/// The loop-on bit is left alone under an attack loop, which takes precedence
fn pack_loop_on(byte: u8, mode: KitLoopMode, bit: u8) -> u8 {
    match mode {
        KitLoopMode::On => byte | bit,
        KitLoopMode::Off => byte & !bit,
        KitLoopMode::Attack => byte,
    }
}

fn length_bits(byte: u8) -> u8 {
    if byte & LENGTH_ENABLED != 0 {
        LENGTH_ENABLED | LENGTH_MASK
    } else {
        LENGTH_ENABLED
    }
}

fn unpack_length(byte: u8) -> Option<u8> {
    (byte & LENGTH_ENABLED != 0).then_some(!byte & LENGTH_MASK)
}

/// Pack onto `byte`, keeping the value bits of a disabled length
fn pack_length(byte: u8, length: Option<u8>) -> u8 {
    match length {
        Some(length) => {
            (byte & !(LENGTH_ENABLED | LENGTH_MASK)) | LENGTH_ENABLED | (!length & LENGTH_MASK)
        }
        None => byte & !LENGTH_ENABLED,
    }
}

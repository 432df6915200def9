//! Register-map decoding.
//!
//! The bus slave owns a 24-byte register map that an upstream controller
//! writes. This module reads a snapshot of it; nothing here writes back.
//!
//! | Offset | Contents                       |
//! |--------|--------------------------------|
//! | 0-7    | aspect code per channel        |
//! | 8-15   | option byte per channel        |
//! | 16-23  | reserved                       |

use crate::types::{Aspect, ChannelOptions, Polarity, Topology};

/// Size of the register map in bytes.
pub const REGISTER_MAP_SIZE: usize = 24;

/// Number of channels the register map describes.
pub const MAX_CHANNELS: usize = 8;

/// Offset of the first aspect register.
pub const ASPECTS_BASE: usize = 0;

/// Offset of the first option register.
pub const OPTIONS_BASE: usize = 8;

const POLARITY_MASK: u8 = 0xC0;
const POLARITY_ANODE: u8 = 0x80;
const POLARITY_CATHODE: u8 = 0x40;
const POLARITY_SENSE: u8 = 0x00;

const TOPOLOGY_MASK: u8 = 0x07;
const TOPOLOGY_SEARCHLIGHT: u8 = 0x01;

/// Trait for abstracting the bus slave that owns the register map.
pub trait RegisterBus {
    /// Returns true while a bus transaction may be modifying the map.
    fn is_busy(&self) -> bool;

    /// Copies the current register map.
    fn snapshot(&self) -> RegisterMap;
}

/// How a channel's polarity is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PolaritySelect {
    /// Fixed common anode.
    Anode,
    /// Fixed common cathode.
    Cathode,
    /// Follow the board's anode/cathode sense input.
    Sensed,
}

impl PolaritySelect {
    /// Decodes option bits `[7:6]`. The unassigned `11` selects cathode.
    pub const fn from_option_byte(byte: u8) -> Self {
        match byte & POLARITY_MASK {
            POLARITY_ANODE => PolaritySelect::Anode,
            POLARITY_SENSE => PolaritySelect::Sensed,
            POLARITY_CATHODE => PolaritySelect::Cathode,
            _ => PolaritySelect::Cathode,
        }
    }

    /// Resolves the selection against the sensed polarity.
    pub const fn resolve(self, sensed_anode: bool) -> Polarity {
        match self {
            PolaritySelect::Anode => Polarity::CommonAnode,
            PolaritySelect::Cathode => Polarity::CommonCathode,
            PolaritySelect::Sensed if sensed_anode => Polarity::CommonAnode,
            PolaritySelect::Sensed => Polarity::CommonCathode,
        }
    }
}

/// Decodes option bits `[2:0]`. Unknown values select a three-lamp head.
pub const fn topology_from_option_byte(byte: u8) -> Topology {
    match byte & TOPOLOGY_MASK {
        TOPOLOGY_SEARCHLIGHT => Topology::Searchlight,
        _ => Topology::ThreeLamp,
    }
}

/// Decodes a full option byte.
pub const fn decode_options(byte: u8, sensed_anode: bool) -> ChannelOptions {
    ChannelOptions::new(
        PolaritySelect::from_option_byte(byte).resolve(sensed_anode),
        topology_from_option_byte(byte),
    )
}

/// What one channel's registers ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelRequest {
    pub channel: usize,
    pub aspect: Aspect,
    pub options: ChannelOptions,
    /// The raw aspect byte was out of range and was replaced by `Off`.
    pub normalized: bool,
}

/// A copy of the register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    bytes: [u8; REGISTER_MAP_SIZE],
}

impl RegisterMap {
    /// An all-zero map, as after reset.
    pub const fn new() -> Self {
        Self {
            bytes: [0; REGISTER_MAP_SIZE],
        }
    }

    pub const fn from_bytes(bytes: [u8; REGISTER_MAP_SIZE]) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; REGISTER_MAP_SIZE] {
        &self.bytes
    }

    /// Writes one register. For building maps in bus drivers and tests.
    pub fn set(&mut self, offset: usize, value: u8) {
        if let Some(byte) = self.bytes.get_mut(offset) {
            *byte = value;
        }
    }

    /// Sets a channel's aspect register.
    pub fn set_aspect(&mut self, channel: usize, aspect: Aspect) {
        if channel < MAX_CHANNELS {
            self.set(ASPECTS_BASE + channel, aspect.code());
        }
    }

    /// Sets a channel's option register.
    pub fn set_option_byte(&mut self, channel: usize, byte: u8) {
        if channel < MAX_CHANNELS {
            self.set(OPTIONS_BASE + channel, byte);
        }
    }

    /// Raw aspect byte for a channel, or 0 for channels past the map.
    pub fn aspect_code(&self, channel: usize) -> u8 {
        self.channel_byte(ASPECTS_BASE, channel)
    }

    /// Raw option byte for a channel, or 0 for channels past the map.
    pub fn option_byte(&self, channel: usize) -> u8 {
        self.channel_byte(OPTIONS_BASE, channel)
    }

    /// Requested aspect for a channel; out-of-range codes read as `Off`.
    pub fn aspect(&self, channel: usize) -> Aspect {
        Aspect::from_code(self.aspect_code(channel))
    }

    /// Resolved options for a channel.
    pub fn options(&self, channel: usize, sensed_anode: bool) -> ChannelOptions {
        decode_options(self.option_byte(channel), sensed_anode)
    }

    /// Decodes everything one channel asks for.
    pub fn request(&self, channel: usize, sensed_anode: bool) -> ChannelRequest {
        let code = self.aspect_code(channel);
        let (aspect, normalized) = match Aspect::try_from(code) {
            Ok(aspect) => (aspect, false),
            Err(_) => (Aspect::Off, true),
        };

        ChannelRequest {
            channel,
            aspect,
            options: self.options(channel, sensed_anode),
            normalized,
        }
    }

    fn channel_byte(&self, base: usize, channel: usize) -> u8 {
        if channel >= MAX_CHANNELS {
            return 0;
        }
        self.bytes[base + channel]
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::new()
    }
}

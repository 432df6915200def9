//! Core value types shared by the transition engine and the output stage.

/// The maximum duty level. A lamp at this level is lit for 31 of the 32 PWM phases.
pub const MAX_DUTY: u8 = 0x1F;

/// The aspect a signal head displays.
///
/// The discriminants are the codes an upstream controller writes into the
/// register map and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Aspect {
    /// All lamps dark.
    #[default]
    Off = 0,
    Green = 1,
    FlashGreen = 2,
    Yellow = 3,
    FlashYellow = 4,
    Red = 5,
    FlashRed = 6,
    /// Lunar white. A three-color head has no lunar lamp, so this displays dark.
    Lunar = 7,
}

impl Aspect {
    /// Decodes a register-map aspect code, treating anything out of range as `Off`.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        Self::try_from(code).unwrap_or(Aspect::Off)
    }

    /// Returns the register-map code for this aspect.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns true for the three flashing variants.
    #[inline]
    pub const fn is_flashing(self) -> bool {
        matches!(
            self,
            Aspect::FlashGreen | Aspect::FlashYellow | Aspect::FlashRed
        )
    }

    /// Returns the steady aspect a flashing aspect shows while lit.
    ///
    /// Non-flashing aspects are returned unchanged.
    #[inline]
    pub const fn steady(self) -> Self {
        match self {
            Aspect::FlashGreen => Aspect::Green,
            Aspect::FlashYellow => Aspect::Yellow,
            Aspect::FlashRed => Aspect::Red,
            other => other,
        }
    }

    /// Returns the lamp lit by this aspect, if any.
    #[inline]
    pub const fn lamp(self) -> Option<Lamp> {
        match self {
            Aspect::Red | Aspect::FlashRed => Some(Lamp::Red),
            Aspect::Yellow | Aspect::FlashYellow => Some(Lamp::Yellow),
            Aspect::Green | Aspect::FlashGreen => Some(Lamp::Green),
            Aspect::Off | Aspect::Lunar => None,
        }
    }
}

impl TryFrom<u8> for Aspect {
    type Error = InvalidAspect;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Aspect::Off),
            1 => Ok(Aspect::Green),
            2 => Ok(Aspect::FlashGreen),
            3 => Ok(Aspect::Yellow),
            4 => Ok(Aspect::FlashYellow),
            5 => Ok(Aspect::Red),
            6 => Ok(Aspect::FlashRed),
            7 => Ok(Aspect::Lunar),
            other => Err(InvalidAspect(other)),
        }
    }
}

/// An aspect code outside the defined range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidAspect(pub u8);

impl core::fmt::Display for InvalidAspect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "aspect code {} is out of range (0-7)", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidAspect {}

/// One of the three lamps of a signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lamp {
    Red,
    Yellow,
    Green,
}

impl Lamp {
    /// All lamps, in output order.
    pub const ALL: [Lamp; 3] = [Lamp::Red, Lamp::Yellow, Lamp::Green];

    /// Position of this lamp within a channel's output triple.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Lamp::Red => 0,
            Lamp::Yellow => 1,
            Lamp::Green => 2,
        }
    }
}

/// Brightness of the three lamps of one head, each `0..=MAX_DUTY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Duties {
    pub red: u8,
    pub yellow: u8,
    pub green: u8,
}

impl Duties {
    /// All lamps dark.
    pub const OFF: Duties = Duties {
        red: 0,
        yellow: 0,
        green: 0,
    };

    /// Creates a duty triple.
    #[inline]
    pub const fn new(red: u8, yellow: u8, green: u8) -> Self {
        Self { red, yellow, green }
    }

    /// The steady-state duties for an aspect: its lamp at full, the others dark.
    pub const fn steady(aspect: Aspect) -> Self {
        match aspect.lamp() {
            Some(Lamp::Red) => Duties::new(MAX_DUTY, 0, 0),
            Some(Lamp::Yellow) => Duties::new(0, MAX_DUTY, 0),
            Some(Lamp::Green) => Duties::new(0, 0, MAX_DUTY),
            None => Duties::OFF,
        }
    }

    /// Returns the duty of one lamp.
    #[inline]
    pub const fn get(&self, lamp: Lamp) -> u8 {
        match lamp {
            Lamp::Red => self.red,
            Lamp::Yellow => self.yellow,
            Lamp::Green => self.green,
        }
    }

    /// Sets the duty of one lamp.
    #[inline]
    pub fn set(&mut self, lamp: Lamp, duty: u8) {
        match lamp {
            Lamp::Red => self.red = duty,
            Lamp::Yellow => self.yellow = duty,
            Lamp::Green => self.green = duty,
        }
    }
}

/// LED wiring polarity of a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Lamps share a cathode; a lamp is lit while its line is high.
    #[default]
    CommonCathode,
    /// Lamps share an anode; a lamp is lit while its line is low.
    CommonAnode,
}

/// Physical construction of a head, which decides how transitions look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Topology {
    /// Three independent bulbs that fade in and out.
    #[default]
    ThreeLamp,
    /// A single bulb behind a moving roundel.
    Searchlight,
}

/// Per-channel options resolved from the register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelOptions {
    pub polarity: Polarity,
    pub topology: Topology,
}

impl ChannelOptions {
    const COMMON_ANODE: u8 = 0x01;
    const SEARCHLIGHT: u8 = 0x02;

    /// Creates an option set.
    #[inline]
    pub const fn new(polarity: Polarity, topology: Topology) -> Self {
        Self { polarity, topology }
    }

    /// Returns true if the head needs searchlight transitions.
    #[inline]
    pub const fn is_searchlight(&self) -> bool {
        matches!(self.topology, Topology::Searchlight)
    }

    /// Returns true if the head is wired common-anode.
    #[inline]
    pub const fn is_common_anode(&self) -> bool {
        matches!(self.polarity, Polarity::CommonAnode)
    }

    /// Packs the options into a flag byte for single-byte shared storage.
    pub const fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.is_common_anode() {
            bits |= Self::COMMON_ANODE;
        }
        if self.is_searchlight() {
            bits |= Self::SEARCHLIGHT;
        }
        bits
    }

    /// Unpacks a flag byte produced by [`ChannelOptions::to_bits`]. Unknown bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        let polarity = if bits & Self::COMMON_ANODE != 0 {
            Polarity::CommonAnode
        } else {
            Polarity::CommonCathode
        };
        let topology = if bits & Self::SEARCHLIGHT != 0 {
            Topology::Searchlight
        } else {
            Topology::ThreeLamp
        };
        Self { polarity, topology }
    }
}

//! Transition tables.
//!
//! Each table is a list of packed words describing lamp brightness over
//! successive PWM cycles (one entry per 8 ms at the reference 125 Hz cycle
//! rate). A word holds three 5-bit duty levels:
//!
//! ```text
//!  15 | 14..10 | 9..5 | 4..0
//!   x | down   | up   | red
//! ```
//!
//! `down` drives the lamp of the aspect being left, `up` the lamp of the
//! aspect being entered, and `red` the red bounce a searchlight roundel shows
//! while swinging between green and yellow.

use crate::types::{Aspect, Lamp, Topology};

const FIELD_MASK: u16 = 0x1F;
const DOWN_SHIFT: u16 = 10;
const UP_SHIFT: u16 = 5;

/// Packs a down/red/up triple into a table word.
pub const fn dru(down: u8, red: u8, up: u8) -> u16 {
    ((down as u16 & FIELD_MASK) << DOWN_SHIFT)
        | ((up as u16 & FIELD_MASK) << UP_SHIFT)
        | (red as u16 & FIELD_MASK)
}

/// One decoded table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransitionStep {
    pub down: u8,
    pub up: u8,
    pub red: u8,
}

impl TransitionStep {
    /// Decodes a packed table word.
    #[inline]
    pub const fn unpack(word: u16) -> Self {
        Self {
            down: ((word >> DOWN_SHIFT) & FIELD_MASK) as u8,
            up: ((word >> UP_SHIFT) & FIELD_MASK) as u8,
            red: (word & FIELD_MASK) as u8,
        }
    }
}

/// A read-only table of packed transition words.
#[derive(Debug, Clone, Copy)]
pub struct TransitionTable {
    words: &'static [u16],
}

impl TransitionTable {
    const fn new(words: &'static [u16]) -> Self {
        Self { words }
    }

    /// Number of entries (PWM cycles) in the table.
    #[inline]
    pub const fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the decoded entry at `phase`, or `None` past the end.
    #[inline]
    pub fn get(&self, phase: usize) -> Option<TransitionStep> {
        self.words.get(phase).copied().map(TransitionStep::unpack)
    }

    /// Returns the first index after `phase` whose up level is non-zero.
    pub fn next_rising(&self, phase: usize) -> Option<(usize, TransitionStep)> {
        (phase + 1..self.len())
            .filter_map(|i| self.get(i).map(|step| (i, step)))
            .find(|(_, step)| step.up != 0)
    }

    /// Iterates over the decoded entries.
    pub fn steps(&self) -> impl Iterator<Item = TransitionStep> + '_ {
        self.words.iter().copied().map(TransitionStep::unpack)
    }
}

// Searchlight green <-> yellow, measured off a US&S H2 at 60 frames/s and
// stretched to 125 Hz: down to red, over to target, back to red, settle.
const THROUGH_RED_WORDS: [u16; 32] = [
    dru(27, 0, 0),
    dru(17, 0, 0),
    dru(12, 0, 0),
    dru(0, 0, 0),
    dru(0, 17, 0),
    dru(0, 25, 0),
    dru(0, 25, 0),
    dru(0, 17, 0),
    dru(0, 0, 0),
    dru(0, 0, 12),
    dru(0, 0, 17),
    dru(0, 7, 17),
    dru(0, 0, 17),
    dru(0, 0, 17),
    dru(0, 0, 22),
    dru(0, 0, 22),
    dru(0, 0, 17),
    dru(0, 0, 17),
    dru(0, 0, 17),
    dru(0, 7, 17),
    dru(0, 0, 17),
    dru(0, 0, 12),
    dru(0, 12, 7),
    dru(0, 17, 0),
    dru(0, 22, 0),
    dru(0, 17, 0),
    dru(0, 12, 7),
    dru(0, 0, 12),
    dru(0, 0, 17),
    dru(0, 0, 22),
    dru(0, 0, 27),
    dru(0, 0, 31),
];

// Searchlight between red and another color: a quick roundel bounce, no fade.
const INVOLVING_RED_WORDS: [u16; 20] = [
    dru(31, 0, 0),
    dru(27, 0, 0),
    dru(22, 0, 0),
    dru(17, 0, 0),
    dru(12, 0, 0),
    dru(5, 0, 0),
    dru(0, 0, 0),
    dru(0, 0, 5),
    dru(0, 0, 12),
    dru(0, 0, 12),
    dru(0, 0, 5),
    dru(5, 0, 0),
    dru(12, 0, 0),
    dru(5, 0, 0),
    dru(0, 0, 5),
    dru(0, 0, 12),
    dru(0, 0, 17),
    dru(0, 0, 22),
    dru(0, 0, 27),
    dru(0, 0, 31),
];

// Incandescent fade: out over 15 cycles, two dark cycles, in over 15 cycles.
const FADE_WORDS: [u16; 32] = [
    dru(30, 0, 0),
    dru(28, 0, 0),
    dru(26, 0, 0),
    dru(24, 0, 0),
    dru(22, 0, 0),
    dru(20, 0, 0),
    dru(18, 0, 0),
    dru(16, 0, 0),
    dru(14, 0, 0),
    dru(12, 0, 0),
    dru(10, 0, 0),
    dru(8, 0, 0),
    dru(6, 0, 0),
    dru(4, 0, 0),
    dru(2, 0, 0),
    dru(0, 0, 0),
    dru(0, 0, 0),
    dru(0, 0, 2),
    dru(0, 0, 4),
    dru(0, 0, 6),
    dru(0, 0, 8),
    dru(0, 0, 10),
    dru(0, 0, 12),
    dru(0, 0, 14),
    dru(0, 0, 16),
    dru(0, 0, 18),
    dru(0, 0, 20),
    dru(0, 0, 22),
    dru(0, 0, 24),
    dru(0, 0, 26),
    dru(0, 0, 28),
    dru(0, 0, 31),
];

/// Searchlight green <-> yellow, bouncing through red.
pub static SEARCHLIGHT_THROUGH_RED: TransitionTable = TransitionTable::new(&THROUGH_RED_WORDS);

/// Searchlight moves to or from red.
pub static SEARCHLIGHT_INVOLVING_RED: TransitionTable = TransitionTable::new(&INVOLVING_RED_WORDS);

/// Lamp fade out then in, used for three-lamp heads and for any change to or from dark.
pub static FADE: TransitionTable = TransitionTable::new(&FADE_WORDS);

/// Which table drives a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransitionKind {
    /// Searchlight green <-> yellow.
    ThroughRed,
    /// Searchlight between any other pair of lit (non-`Off`) aspects.
    InvolvingRed,
    /// Everything else.
    Fade,
}

impl TransitionKind {
    /// Picks the table for a transition from `start` to `end` on a head of `topology`.
    pub fn select(topology: Topology, start: Aspect, end: Aspect) -> Self {
        if topology != Topology::Searchlight || start == Aspect::Off || end == Aspect::Off {
            return TransitionKind::Fade;
        }

        if is_green_yellow_swap(start, end) {
            TransitionKind::ThroughRed
        } else {
            TransitionKind::InvolvingRed
        }
    }

    /// Returns the table for this kind.
    pub fn table(self) -> &'static TransitionTable {
        match self {
            TransitionKind::ThroughRed => &SEARCHLIGHT_THROUGH_RED,
            TransitionKind::InvolvingRed => &SEARCHLIGHT_INVOLVING_RED,
            TransitionKind::Fade => &FADE,
        }
    }
}

/// True for green to yellow or yellow to green, flashing variants included.
pub fn is_green_yellow_swap(start: Aspect, end: Aspect) -> bool {
    matches!(
        (start.lamp(), end.lamp()),
        (Some(Lamp::Green), Some(Lamp::Yellow)) | (Some(Lamp::Yellow), Some(Lamp::Green))
    )
}

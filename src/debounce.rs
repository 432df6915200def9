//! Eight-input parallel debouncer.
//!
//! Each bit of the input byte has its own two-bit counter, stored across the
//! `clock_a` (high bit) and `clock_b` (low bit) planes so that all eight
//! inputs advance with a handful of bitwise operations per sample.

/// Number of consecutive disagreeing samples before a debounced bit flips.
pub const STABLE_SAMPLES: u8 = 2;

/// Debounced state of up to eight boolean inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    clock_a: u8,
    clock_b: u8,
    state: u8,
}

impl Debouncer {
    /// Creates a debouncer whose stable state is `initial`, with all counters cleared.
    pub const fn new(initial: u8) -> Self {
        Self {
            clock_a: 0,
            clock_b: 0,
            state: initial,
        }
    }

    /// Resets the stable state to `initial` and clears all counters.
    pub fn init(&mut self, initial: u8) {
        *self = Self::new(initial);
    }

    /// Runs one filter step and returns the bits that flipped on this call.
    ///
    /// A bit that differs from the stable state advances its counter; a bit
    /// that agrees resets it. When a counter reaches [`STABLE_SAMPLES`] the
    /// stable bit flips and its counter is cleared.
    pub fn sample(&mut self, raw: u8) -> u8 {
        let delta = raw ^ self.state;

        self.clock_a ^= self.clock_b;
        self.clock_b = !self.clock_b;

        self.clock_a &= delta;
        self.clock_b &= delta;

        // counter == 0b10
        let changes = delta & self.clock_a & !self.clock_b;

        self.state ^= changes;
        self.clock_a &= !changes;
        self.clock_b &= !changes;

        changes
    }

    /// Returns the last stable value.
    #[inline]
    pub const fn debounced_state(&self) -> u8 {
        self.state
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(0)
    }
}

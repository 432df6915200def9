//! Software PWM output stage.
//!
//! All heads are driven from the same tick using one shared 0-31 phase
//! counter, so a lamp at duty `d` is lit for `d` of every 32 ticks.

use portable_atomic::{AtomicU8, Ordering};

use crate::types::{ChannelOptions, Duties, Lamp, Polarity};

/// Number of phases in one PWM cycle.
pub const PWM_PHASES: u8 = 32;

/// Trait for abstracting the lamp output lines.
///
/// Implement this for your board to let the output stage drive the three lines
/// of each channel. A line is *asserted* when it is driven low (sinking
/// current) and *cleared* when it is driven high. Handle any hardware errors
/// internally - these methods cannot fail and are called from the tick
/// interrupt.
pub trait SignalOutputs {
    /// Drives a lamp line low.
    fn assert(&mut self, channel: usize, lamp: Lamp);

    /// Drives a lamp line high.
    fn clear(&mut self, channel: usize, lamp: Lamp);
}

/// Returns true if a lamp line should be asserted at `pwm_phase`.
#[inline]
pub fn line_asserted(duty: u8, polarity: Polarity, pwm_phase: u8) -> bool {
    let invert = polarity == Polarity::CommonCathode;
    (duty > pwm_phase) != invert
}

/// Sets the three lines of `channel` for one PWM phase.
pub fn drive<O: SignalOutputs + ?Sized>(
    outputs: &mut O,
    channel: usize,
    duties: Duties,
    options: ChannelOptions,
    pwm_phase: u8,
) {
    for lamp in Lamp::ALL {
        if line_asserted(duties.get(lamp), options.polarity, pwm_phase) {
            outputs.assert(channel, lamp);
        } else {
            outputs.clear(channel, lamp);
        }
    }
}

/// The duties and options of one channel as seen by the tick interrupt.
///
/// Written only by the main loop and read only by the tick. Each field is a
/// single byte updated independently, so a read racing a publish can mix old
/// and new values for at most one tick.
#[derive(Debug)]
pub struct LampCell {
    red: AtomicU8,
    yellow: AtomicU8,
    green: AtomicU8,
    options: AtomicU8,
}

impl LampCell {
    /// Creates a dark cell with default options.
    pub const fn new() -> Self {
        Self {
            red: AtomicU8::new(0),
            yellow: AtomicU8::new(0),
            green: AtomicU8::new(0),
            options: AtomicU8::new(0),
        }
    }

    /// Publishes new duties.
    #[inline]
    pub fn publish(&self, duties: Duties) {
        self.red.store(duties.red, Ordering::Relaxed);
        self.yellow.store(duties.yellow, Ordering::Relaxed);
        self.green.store(duties.green, Ordering::Relaxed);
    }

    /// Publishes new options.
    #[inline]
    pub fn set_options(&self, options: ChannelOptions) {
        self.options.store(options.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn duties(&self) -> Duties {
        Duties::new(
            self.red.load(Ordering::Relaxed),
            self.yellow.load(Ordering::Relaxed),
            self.green.load(Ordering::Relaxed),
        )
    }

    #[inline]
    pub fn options(&self) -> ChannelOptions {
        ChannelOptions::from_bits(self.options.load(Ordering::Relaxed))
    }
}

impl Default for LampCell {
    fn default() -> Self {
        Self::new()
    }
}

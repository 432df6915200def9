//! Concrete [`SignalOutputs`] backends.
//!
//! [`PinBank`] wraps `embedded-hal` output pins, one triple per channel.
//! [`PortOutputs`] works on raw 8-bit ports and bitmasks, for targets where
//! the tick handler writes port registers directly.

use embedded_hal::digital::OutputPin;

use crate::pwm::SignalOutputs;
use crate::types::Lamp;

/// Red, yellow and green pins for each of `N` channels.
pub struct PinBank<P: OutputPin, const N: usize> {
    pins: [[P; 3]; N],
}

impl<P: OutputPin, const N: usize> PinBank<P, N> {
    /// Creates a bank from `[red, yellow, green]` triples.
    pub fn new(pins: [[P; 3]; N]) -> Self {
        Self { pins }
    }

    /// Releases the pins.
    pub fn release(self) -> [[P; 3]; N] {
        self.pins
    }

    fn pin(&mut self, channel: usize, lamp: Lamp) -> Option<&mut P> {
        self.pins.get_mut(channel).map(|triple| &mut triple[lamp.index()])
    }
}

impl<P: OutputPin, const N: usize> SignalOutputs for PinBank<P, N> {
    fn assert(&mut self, channel: usize, lamp: Lamp) {
        if let Some(pin) = self.pin(channel, lamp) {
            // A failed write is corrected on the next tick.
            let _ = pin.set_low();
        }
    }

    fn clear(&mut self, channel: usize, lamp: Lamp) {
        if let Some(pin) = self.pin(channel, lamp) {
            let _ = pin.set_high();
        }
    }
}

/// An 8-bit GPIO port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
    D,
}

/// The port bit driving one lamp line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LampBinding {
    pub port: Port,
    pub mask: u8,
}

impl LampBinding {
    pub const fn new(port: Port, bit: u8) -> Self {
        Self {
            port,
            mask: 1 << bit,
        }
    }
}

/// Read-modify-write access to output port registers.
pub trait PortWriter {
    /// Sets the masked bits of `port` high.
    fn set_bits(&mut self, port: Port, mask: u8);

    /// Clears the masked bits of `port`.
    fn clear_bits(&mut self, port: Port, mask: u8);
}

/// Pinout of the reference eight-head board, `[red, yellow, green]` per channel.
pub const REFERENCE_BINDINGS: [[LampBinding; 3]; 8] = {
    use Port::*;
    const fn b(port: Port, bit: u8) -> LampBinding {
        LampBinding::new(port, bit)
    }
    [
        [b(D, 0), b(D, 1), b(D, 2)],
        [b(D, 3), b(D, 4), b(A, 2)],
        [b(A, 3), b(B, 6), b(B, 7)],
        [b(D, 5), b(D, 6), b(D, 7)],
        [b(B, 0), b(B, 1), b(B, 2)],
        [b(B, 3), b(B, 4), b(B, 5)],
        [b(C, 7), b(A, 1), b(C, 0)],
        [b(C, 1), b(C, 2), b(C, 3)],
    ]
};

/// Lamp lines bound to port bits at configuration time.
pub struct PortOutputs<W: PortWriter, const N: usize> {
    writer: W,
    bindings: [[LampBinding; 3]; N],
}

impl<W: PortWriter, const N: usize> PortOutputs<W, N> {
    pub fn new(writer: W, bindings: [[LampBinding; 3]; N]) -> Self {
        Self { writer, bindings }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn binding(&self, channel: usize, lamp: Lamp) -> Option<LampBinding> {
        self.bindings.get(channel).map(|triple| triple[lamp.index()])
    }
}

impl<W: PortWriter> PortOutputs<W, 8> {
    /// Binds the reference board's pinout.
    pub fn reference(writer: W) -> Self {
        Self::new(writer, REFERENCE_BINDINGS)
    }
}

impl<W: PortWriter, const N: usize> SignalOutputs for PortOutputs<W, N> {
    fn assert(&mut self, channel: usize, lamp: Lamp) {
        if let Some(binding) = self.binding(channel, lamp) {
            self.writer.clear_bits(binding.port, binding.mask);
        }
    }

    fn clear(&mut self, channel: usize, lamp: Lamp) {
        if let Some(binding) = self.binding(channel, lamp) {
            self.writer.set_bits(binding.port, binding.mask);
        }
    }
}

//! Shared test infrastructure for signal-head-coprocessor integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::{Cell, RefCell};
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};
use signal_head_coprocessor::{
    Aspect, ChannelOptions, Lamp, Polarity, RegisterBus, RegisterMap, SignalHead, SignalOutputs,
    Topology,
};

// ============================================================================
// Option shorthands
// ============================================================================

pub const THREE_LAMP: ChannelOptions =
    ChannelOptions::new(Polarity::CommonCathode, Topology::ThreeLamp);
pub const SEARCHLIGHT: ChannelOptions =
    ChannelOptions::new(Polarity::CommonCathode, Topology::Searchlight);

pub const ALL_ASPECTS: [Aspect; 8] = [
    Aspect::Off,
    Aspect::Green,
    Aspect::FlashGreen,
    Aspect::Yellow,
    Aspect::FlashYellow,
    Aspect::Red,
    Aspect::FlashRed,
    Aspect::Lunar,
];

// ============================================================================
// Mock outputs
// ============================================================================

/// Records the level of every lamp line and how often each was asserted.
pub struct MockOutputs {
    /// `true` while a line is driven low.
    pub low: [[bool; 3]; 8],
    pub assert_counts: [[u32; 3]; 8],
    pub writes: heapless::Vec<(usize, Lamp, bool), 64>,
}

impl MockOutputs {
    pub fn new() -> Self {
        Self {
            low: [[false; 3]; 8],
            assert_counts: [[0; 3]; 8],
            writes: heapless::Vec::new(),
        }
    }

    pub fn is_low(&self, channel: usize, lamp: Lamp) -> bool {
        self.low[channel][lamp.index()]
    }

    pub fn asserted(&self, channel: usize, lamp: Lamp) -> u32 {
        self.assert_counts[channel][lamp.index()]
    }

    pub fn reset_counts(&mut self) {
        self.assert_counts = [[0; 3]; 8];
    }

    fn record(&mut self, channel: usize, lamp: Lamp, low: bool) {
        self.low[channel][lamp.index()] = low;
        // Only the first writes are kept for inspection.
        let _ = self.writes.push((channel, lamp, low));
    }
}

impl SignalOutputs for MockOutputs {
    fn assert(&mut self, channel: usize, lamp: Lamp) {
        self.assert_counts[channel][lamp.index()] += 1;
        self.record(channel, lamp, true);
    }

    fn clear(&mut self, channel: usize, lamp: Lamp) {
        self.record(channel, lamp, false);
    }
}

// ============================================================================
// Mock sense input
// ============================================================================

/// Sense pin whose level the test controls through a shared cell.
pub struct MockSensePin<'a> {
    pub level: &'a Cell<bool>,
}

impl ErrorType for MockSensePin<'_> {
    type Error = Infallible;
}

impl InputPin for MockSensePin<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

// ============================================================================
// Mock register bus
// ============================================================================

/// Register bus with a controllable busy flag and snapshot counter.
pub struct MockBus {
    map: RefCell<RegisterMap>,
    busy: Cell<bool>,
    snapshots: Cell<u32>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            map: RefCell::new(RegisterMap::new()),
            busy: Cell::new(false),
            snapshots: Cell::new(0),
        }
    }

    pub fn set_aspect(&self, channel: usize, aspect: Aspect) {
        self.map.borrow_mut().set_aspect(channel, aspect);
    }

    pub fn set_raw(&self, offset: usize, value: u8) {
        self.map.borrow_mut().set(offset, value);
    }

    pub fn set_option_byte(&self, channel: usize, byte: u8) {
        self.map.borrow_mut().set_option_byte(channel, byte);
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.set(busy);
    }

    pub fn snapshot_count(&self) -> u32 {
        self.snapshots.get()
    }
}

impl RegisterBus for MockBus {
    fn is_busy(&self) -> bool {
        self.busy.get()
    }

    fn snapshot(&self) -> RegisterMap {
        self.snapshots.set(self.snapshots.get() + 1);
        *self.map.borrow()
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Advances a head until it is steady, returning the number of cycles taken.
///
/// Panics if the head is still transitioning after 64 cycles.
pub fn settle(head: &mut SignalHead, flasher: bool, options: ChannelOptions) -> usize {
    for cycle in 1..=64 {
        head.advance(flasher, options);
        if head.is_steady() {
            return cycle;
        }
    }
    panic!("head did not settle: {:?}", head);
}

/// Creates a head that is already steady at `aspect`.
pub fn steady_head(aspect: Aspect, options: ChannelOptions) -> SignalHead {
    let mut head = SignalHead::new();
    head.set_target(aspect);
    settle(&mut head, true, options);
    head.advance(true, options);
    head
}

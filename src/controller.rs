//! Scheduling glue between the tick interrupt and the main loop.
//!
//! [`SharedState`] is what the tick interrupt sees: one [`LampCell`] per
//! channel plus the [`TickClock`]. It is meant to live in a `static`.
//! [`Controller`] is owned by the main loop; it runs the transition engine
//! once per PWM cycle and polls the register map.
//!
//! ```ignore
//! static SHARED: SharedState = SharedState::new(TimingConfig::REFERENCE);
//!
//! // tick interrupt, 4 kHz
//! SHARED.on_tick(&mut outputs);
//!
//! // main loop
//! let mut controller = Controller::new(&SHARED, sense_pin);
//! loop {
//!     controller.service(&bus);
//! }
//! ```

use embedded_hal::digital::InputPin;
use heapless::Vec;

use crate::config::TimingConfig;
use crate::debounce::Debouncer;
use crate::pwm::{LampCell, SignalOutputs, drive};
use crate::registers::{MAX_CHANNELS, PolaritySelect, RegisterBus};
use crate::signal_head::SignalHead;
use crate::time::TickClock;
use crate::types::{ChannelOptions, Topology};

/// Debouncer bit carrying the anode/cathode sense line (set = common anode).
pub const SENSE_COMMON_ANODE: u8 = 0x01;

/// Errors from channel-indexed accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// The channel index is not below the channel count.
    OutOfRange { channel: usize, count: usize },
}

impl core::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChannelError::OutOfRange { channel, count } => {
                write!(f, "channel {} is out of range (have {})", channel, count)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ChannelError {}

/// State shared between the tick interrupt and the main loop.
///
/// # Type Parameters
/// * `N` - Number of channels, at most [`MAX_CHANNELS`]
#[derive(Debug)]
pub struct SharedState<const N: usize = MAX_CHANNELS> {
    cells: [LampCell; N],
    clock: TickClock,
    config: TimingConfig,
}

impl<const N: usize> SharedState<N> {
    /// Creates dark channels and a clock at zero.
    pub const fn new(config: TimingConfig) -> Self {
        const { assert!(N <= MAX_CHANNELS, "register map has eight channels") };
        Self {
            cells: [const { LampCell::new() }; N],
            clock: TickClock::new(config),
            config,
        }
    }

    /// The tick interrupt body.
    ///
    /// Drives every channel for the current PWM phase first, then advances
    /// the clock. Never blocks.
    pub fn on_tick<O: SignalOutputs + ?Sized>(&self, outputs: &mut O) {
        let phase = self.clock.pwm_phase();
        for (channel, cell) in self.cells.iter().enumerate() {
            drive(outputs, channel, cell.duties(), cell.options(), phase);
        }
        self.clock.tick();
    }

    #[inline]
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    #[inline]
    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Returns the tick-visible cell of a channel.
    pub fn cell(&self, channel: usize) -> Result<&LampCell, ChannelError> {
        self.cells.get(channel).ok_or(ChannelError::OutOfRange {
            channel,
            count: N,
        })
    }
}

/// Outcome of one [`Controller::service`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReport<const N: usize = MAX_CHANNELS> {
    /// The heads were advanced by one PWM cycle.
    pub advanced: bool,
    /// The register map was polled.
    pub polled: bool,
    /// Channels whose requested aspect changed in this poll.
    pub retargeted: Vec<usize, N>,
}

impl<const N: usize> ServiceReport<N> {
    fn new() -> Self {
        Self {
            advanced: false,
            polled: false,
            retargeted: Vec::new(),
        }
    }
}

/// Main-loop side of the co-processor.
///
/// Owns the signal heads and the sense debouncer; the heads' duties reach the
/// tick interrupt through the [`SharedState`] cells.
///
/// # Type Parameters
/// * `'s` - Lifetime of the shared state (usually `'static`)
/// * `S` - Anode/cathode sense input
/// * `N` - Number of channels
pub struct Controller<'s, S: InputPin, const N: usize = MAX_CHANNELS> {
    shared: &'s SharedState<N>,
    sense_pin: S,
    sense: Debouncer,
    last_sense_raw: u8,
    heads: [SignalHead; N],
    options: [ChannelOptions; N],
    last_poll: u32,
}

impl<'s, S: InputPin, const N: usize> Controller<'s, S, N> {
    /// Creates the controller with every head dark.
    ///
    /// Seeds the sense debouncer from one read and publishes sensed polarity
    /// with three-lamp topology for every channel, which is what an all-zero
    /// register map selects. Call before enabling the tick interrupt.
    pub fn new(shared: &'s SharedState<N>, mut sense_pin: S) -> Self {
        let raw = read_sense(&mut sense_pin, 0);
        let sense = Debouncer::new(raw);
        let default_options = ChannelOptions::new(
            PolaritySelect::Sensed.resolve(raw & SENSE_COMMON_ANODE != 0),
            Topology::ThreeLamp,
        );

        let controller = Self {
            shared,
            sense_pin,
            sense,
            last_sense_raw: raw,
            heads: [SignalHead::new(); N],
            options: [default_options; N],
            last_poll: shared.clock().millis(),
        };

        for (cell, head) in shared.cells.iter().zip(controller.heads.iter()) {
            cell.set_options(default_options);
            cell.publish(head.duties());
        }

        info!("signal head controller: {} channels, {}", N, default_options);
        controller
    }

    /// Runs one main-loop pass.
    ///
    /// Advances every head if a PWM cycle completed since the last call, then
    /// polls the register map if the poll interval has elapsed and the bus is
    /// idle.
    pub fn service<B: RegisterBus + ?Sized>(&mut self, bus: &B) -> ServiceReport<N> {
        let mut report = ServiceReport::new();

        if self.shared.clock().take_update() {
            self.advance_all();
            report.advanced = true;
        }

        let now = self.shared.clock().millis();
        if now.wrapping_sub(self.last_poll) > self.shared.config().poll_interval_ms() {
            if bus.is_busy() {
                trace!("register poll deferred, bus busy");
            } else {
                self.last_poll = now;
                self.poll(bus, &mut report);
                report.polled = true;
            }
        }

        report
    }

    /// Advances every head one PWM cycle and publishes its duties.
    pub fn advance_all(&mut self) {
        let flasher = self.shared.clock().flasher();
        for ((head, options), cell) in self
            .heads
            .iter_mut()
            .zip(self.options.iter())
            .zip(self.shared.cells.iter())
        {
            head.advance(flasher, *options);
            cell.publish(head.duties());
        }
    }

    fn poll<B: RegisterBus + ?Sized>(&mut self, bus: &B, report: &mut ServiceReport<N>) {
        self.last_sense_raw = read_sense(&mut self.sense_pin, self.last_sense_raw);
        self.sense.sample(self.last_sense_raw);
        let sensed_anode = self.sensed_common_anode();

        let map = bus.snapshot();
        for (channel, ((head, options), cell)) in self
            .heads
            .iter_mut()
            .zip(self.options.iter_mut())
            .zip(self.shared.cells.iter())
            .enumerate()
        {
            let request = map.request(channel, sensed_anode);
            if request.normalized {
                warn!(
                    "channel {}: aspect code {} out of range, using Off",
                    channel,
                    map.aspect_code(channel)
                );
            }

            *options = request.options;
            cell.set_options(request.options);

            if head.target() != request.aspect {
                debug!("channel {}: {} -> {}", channel, head.target(), request.aspect);
                // Capacity equals the channel count.
                let _ = report.retargeted.push(channel);
            }
            head.set_target(request.aspect);
        }
    }

    /// Returns true if the debounced sense line reports common anode.
    #[inline]
    pub fn sensed_common_anode(&self) -> bool {
        self.sense.debounced_state() & SENSE_COMMON_ANODE != 0
    }

    /// Returns a head by channel.
    pub fn head(&self, channel: usize) -> Result<&SignalHead, ChannelError> {
        self.heads.get(channel).ok_or(ChannelError::OutOfRange {
            channel,
            count: N,
        })
    }

    /// Returns the options in effect for a channel.
    pub fn options(&self, channel: usize) -> Result<ChannelOptions, ChannelError> {
        self.options
            .get(channel)
            .copied()
            .ok_or(ChannelError::OutOfRange {
                channel,
                count: N,
            })
    }

    /// All heads, in channel order.
    pub fn heads(&self) -> &[SignalHead; N] {
        &self.heads
    }

    /// Releases the sense pin.
    pub fn release(self) -> S {
        self.sense_pin
    }
}

/// Reads the sense pin as a debouncer byte, keeping `previous` if the read fails.
fn read_sense<S: InputPin>(pin: &mut S, previous: u8) -> u8 {
    match pin.is_high() {
        Ok(true) => SENSE_COMMON_ANODE,
        Ok(false) => 0,
        Err(_) => previous,
    }
}

//! Timing configuration.
//!
//! [`TimingConfig::REFERENCE`] matches the reference board: a 4 kHz tick
//! (8 MHz clock, 1:8 prescaler, compare match at 250), a 125 Hz PWM cycle, a
//! register poll every 50 ms and a flasher that toggles every 95 cycles.

use crate::pwm::PWM_PHASES;

const DEFAULT_TICK_HZ: u32 = 4_000;
const DEFAULT_POLL_INTERVAL_MS: u32 = 50;
const DEFAULT_FLASH_HALF_PERIOD_MS: u32 = 760;

/// Timing parameters shared by the tick handler and the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    tick_hz: u32,
    ticks_per_milli: u8,
    flash_cycles: u8,
    poll_interval_ms: u32,
}

impl TimingConfig {
    /// The reference board's timing.
    pub const REFERENCE: TimingConfig = TimingConfig {
        tick_hz: DEFAULT_TICK_HZ,
        ticks_per_milli: 4,
        flash_cycles: 95,
        poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
    };

    /// Creates a builder starting from the reference values.
    pub fn builder() -> TimingConfigBuilder {
        TimingConfigBuilder::new()
    }

    #[inline]
    pub const fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    /// PWM cycles (and transition steps) per second.
    #[inline]
    pub const fn cycle_hz(&self) -> u32 {
        self.tick_hz / PWM_PHASES as u32
    }

    #[inline]
    pub const fn ticks_per_milli(&self) -> u8 {
        self.ticks_per_milli
    }

    /// PWM cycles between flasher toggles.
    #[inline]
    pub const fn flash_cycles(&self) -> u8 {
        self.flash_cycles
    }

    /// Minimum time between register-map polls.
    #[inline]
    pub const fn poll_interval_ms(&self) -> u32 {
        self.poll_interval_ms
    }

    /// Compare-match value for a CTC timer producing the tick rate.
    ///
    /// Returns `None` unless `cpu_hz / prescaler` divides evenly into ticks.
    pub fn timer_compare(&self, cpu_hz: u32, prescaler: u32) -> Option<u32> {
        let timer_hz = cpu_hz.checked_div(prescaler)?;
        if timer_hz % self.tick_hz != 0 {
            return None;
        }
        Some(timer_hz / self.tick_hz)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Builder for [`TimingConfig`].
#[derive(Debug, Clone, Copy)]
pub struct TimingConfigBuilder {
    tick_hz: u32,
    poll_interval_ms: u32,
    flash_half_period_ms: u32,
}

impl TimingConfigBuilder {
    pub fn new() -> Self {
        Self {
            tick_hz: DEFAULT_TICK_HZ,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            flash_half_period_ms: DEFAULT_FLASH_HALF_PERIOD_MS,
        }
    }

    /// Sets the tick rate. Must be a whole number of ticks per millisecond.
    pub fn tick_hz(mut self, tick_hz: u32) -> Self {
        self.tick_hz = tick_hz;
        self
    }

    /// Sets the register-map poll interval.
    pub fn poll_interval_ms(mut self, poll_interval_ms: u32) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Sets how long flashing aspects stay lit (and dark).
    pub fn flash_half_period_ms(mut self, flash_half_period_ms: u32) -> Self {
        self.flash_half_period_ms = flash_half_period_ms;
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> Result<TimingConfig, ConfigError> {
        if self.tick_hz == 0 || self.tick_hz % 1_000 != 0 || self.tick_hz / 1_000 > u8::MAX as u32 {
            return Err(ConfigError::TickRate(self.tick_hz));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::PollInterval);
        }

        let cycle_hz = self.tick_hz / PWM_PHASES as u32;
        let flash_cycles = self.flash_half_period_ms.saturating_mul(cycle_hz) / 1_000;
        if flash_cycles == 0 || flash_cycles > u8::MAX as u32 {
            return Err(ConfigError::FlashPeriod(self.flash_half_period_ms));
        }

        Ok(TimingConfig {
            tick_hz: self.tick_hz,
            ticks_per_milli: (self.tick_hz / 1_000) as u8,
            flash_cycles: flash_cycles as u8,
            poll_interval_ms: self.poll_interval_ms,
        })
    }
}

impl Default for TimingConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Tick rate is zero, not a multiple of 1 kHz, or above 255 ticks per millisecond.
    TickRate(u32),

    /// Poll interval is zero.
    PollInterval,

    /// Flash half period rounds to zero cycles or more than 255.
    FlashPeriod(u32),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::TickRate(hz) => {
                write!(f, "tick rate {} Hz must be a non-zero multiple of 1 kHz up to 255 kHz", hz)
            }
            ConfigError::PollInterval => {
                write!(f, "poll interval must be non-zero")
            }
            ConfigError::FlashPeriod(ms) => {
                write!(f, "flash half period of {} ms is outside 1-255 PWM cycles", ms)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

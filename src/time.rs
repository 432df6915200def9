//! Tick-driven clock shared between the tick interrupt and the main loop.

use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::config::TimingConfig;
use crate::pwm::PWM_PHASES;

/// Counters advanced once per tick.
///
/// Only the tick handler writes the counters, so plain loads and stores are
/// enough; the main loop only reads them, apart from consuming the
/// update-request flag.
#[derive(Debug)]
pub struct TickClock {
    ticks_per_milli: u8,
    flash_cycles: u8,
    pwm_phase: AtomicU8,
    sub_millis: AtomicU8,
    millis: AtomicU32,
    flash_counter: AtomicU8,
    flasher: AtomicBool,
    update_pending: AtomicBool,
}

impl TickClock {
    /// Creates a clock at phase 0, time 0, flasher clear.
    pub const fn new(config: TimingConfig) -> Self {
        Self {
            ticks_per_milli: config.ticks_per_milli(),
            flash_cycles: config.flash_cycles(),
            pwm_phase: AtomicU8::new(0),
            sub_millis: AtomicU8::new(0),
            millis: AtomicU32::new(0),
            flash_counter: AtomicU8::new(0),
            flasher: AtomicBool::new(false),
            update_pending: AtomicBool::new(false),
        }
    }

    /// The PWM phase the next tick drives.
    #[inline]
    pub fn pwm_phase(&self) -> u8 {
        self.pwm_phase.load(Ordering::Relaxed)
    }

    /// Milliseconds since start, wrapping after about 49 days.
    #[inline]
    pub fn millis(&self) -> u32 {
        self.millis.load(Ordering::Acquire)
    }

    /// The shared flash bit for flashing aspects.
    #[inline]
    pub fn flasher(&self) -> bool {
        self.flasher.load(Ordering::Relaxed)
    }

    /// Returns true if a PWM cycle completed since the last call, and clears the request.
    #[inline]
    pub fn take_update(&self) -> bool {
        self.update_pending.swap(false, Ordering::Acquire)
    }

    /// Advances the counters by one tick.
    ///
    /// Call from the tick interrupt after the outputs for the current phase
    /// have been driven.
    pub fn tick(&self) {
        let sub = self.sub_millis.load(Ordering::Relaxed) + 1;
        if sub >= self.ticks_per_milli {
            self.sub_millis.store(0, Ordering::Relaxed);
            let ms = self.millis.load(Ordering::Relaxed).wrapping_add(1);
            self.millis.store(ms, Ordering::Release);
        } else {
            self.sub_millis.store(sub, Ordering::Relaxed);
        }

        let phase = (self.pwm_phase.load(Ordering::Relaxed) + 1) % PWM_PHASES;
        self.pwm_phase.store(phase, Ordering::Relaxed);

        if phase == 0 {
            let count = self.flash_counter.load(Ordering::Relaxed) + 1;
            if count >= self.flash_cycles {
                self.flash_counter.store(0, Ordering::Relaxed);
                self.flasher.store(!self.flasher(), Ordering::Relaxed);
            } else {
                self.flash_counter.store(count, Ordering::Relaxed);
            }

            self.update_pending.store(true, Ordering::Release);
        }
    }
}

//! Per-head aspect transition state machine.
//!
//! Provides [`SignalHead`], which turns a requested [`Aspect`] into a sequence
//! of lamp duty levels, one step per PWM cycle, using the tables in
//! [`crate::transition`].

use crate::transition::{FADE, SEARCHLIGHT_INVOLVING_RED, SEARCHLIGHT_THROUGH_RED, TransitionKind};
use crate::types::{Aspect, ChannelOptions, Duties, Lamp};

/// Transition state of one signal head.
///
/// `start_aspect == end_aspect` means the head is steady. While they differ a
/// transition is running and `phase` indexes the active table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalHead {
    start_aspect: Aspect,
    end_aspect: Aspect,
    next_aspect: Aspect,
    phase: u8,
    duties: Duties,
}

impl SignalHead {
    /// Creates a dark, steady head.
    pub const fn new() -> Self {
        Self {
            start_aspect: Aspect::Off,
            end_aspect: Aspect::Off,
            next_aspect: Aspect::Off,
            phase: 0,
            duties: Duties::OFF,
        }
    }

    /// Records the requested aspect. Takes effect on a later [`advance`](Self::advance).
    #[inline]
    pub fn set_target(&mut self, aspect: Aspect) {
        self.next_aspect = aspect;
    }

    /// Records a requested aspect from a raw register code; unknown codes request `Off`.
    #[inline]
    pub fn set_target_code(&mut self, code: u8) {
        self.set_target(Aspect::from_code(code));
    }

    /// Returns the requested aspect.
    #[inline]
    pub fn target(&self) -> Aspect {
        self.next_aspect
    }

    #[inline]
    pub fn start_aspect(&self) -> Aspect {
        self.start_aspect
    }

    #[inline]
    pub fn end_aspect(&self) -> Aspect {
        self.end_aspect
    }

    #[inline]
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Returns the current lamp duties.
    #[inline]
    pub fn duties(&self) -> Duties {
        self.duties
    }

    /// Returns true when no transition is running.
    #[inline]
    pub fn is_steady(&self) -> bool {
        self.start_aspect == self.end_aspect
    }

    /// Advances the head by one PWM cycle.
    ///
    /// `flasher` is the shared flash bit; flashing aspects show their color
    /// while it is set and go dark while it is clear. `options` are the head's
    /// options as of this call.
    pub fn advance(&mut self, flasher: bool, options: ChannelOptions) {
        let target = match self.next_aspect {
            aspect if aspect.is_flashing() && !flasher => Aspect::Off,
            aspect => aspect.steady(),
        };

        if self.is_steady() && target != self.start_aspect {
            trace!("transition {} -> {}", self.start_aspect, target);
            self.phase = 0;
            self.end_aspect = target;
        }

        if self.is_steady() {
            // Recomputed every cycle so a stray write cannot stick.
            self.duties = Duties::steady(self.start_aspect);
            return;
        }

        match TransitionKind::select(options.topology, self.start_aspect, self.end_aspect) {
            TransitionKind::ThroughRed => self.step_through_red(),
            TransitionKind::InvolvingRed => self.step_involving_red(),
            TransitionKind::Fade => self.step_fade(),
        }
    }

    fn step_through_red(&mut self) {
        let table = &SEARCHLIGHT_THROUGH_RED;
        let Some(step) = table.get(self.phase as usize) else {
            self.finish();
            return;
        };

        self.duties.red = step.red;
        if self.start_aspect.lamp() == Some(Lamp::Green) {
            self.duties.green = step.down;
            self.duties.yellow = step.up;
        } else {
            self.duties.green = step.up;
            self.duties.yellow = step.down;
        }

        self.phase += 1;
        if self.phase as usize >= table.len() {
            self.finish();
        }
    }

    fn step_involving_red(&mut self) {
        let table = &SEARCHLIGHT_INVOLVING_RED;
        let Some(step) = table.get(self.phase as usize) else {
            self.finish();
            return;
        };

        self.duties = Duties::OFF;
        if let Some(lamp) = self.start_aspect.lamp() {
            self.duties.set(lamp, step.down);
        }
        if let Some(lamp) = self.end_aspect.lamp() {
            self.duties.set(lamp, step.up);
        }

        self.phase += 1;
        if self.phase as usize >= table.len() {
            self.finish();
        }
    }

    fn step_fade(&mut self) {
        let table = &FADE;
        let Some(step) = table.get(self.phase as usize) else {
            self.finish();
            return;
        };
        let mut up = step.up;
        let mut lamp_dark = false;

        self.duties = Duties::OFF;

        match self.start_aspect.lamp() {
            Some(lamp) => self.duties.set(lamp, step.down),
            None if self.start_aspect == Aspect::Off && up == 0 => {
                // Coming on from dark: jump to just before the first lit entry.
                // That entry is shown now and again on the next cycle.
                match table.next_rising(self.phase as usize) {
                    Some((index, rising)) => {
                        up = rising.up;
                        self.phase = (index - 1) as u8;
                    }
                    None => {
                        up = 0;
                        self.phase = (table.len() - 1) as u8;
                    }
                }
            }
            None => {}
        }

        match self.end_aspect.lamp() {
            Some(lamp) => self.duties.set(lamp, up),
            // Going dark ends as soon as the departing lamp is out.
            None if self.end_aspect == Aspect::Off => lamp_dark = step.down == 0,
            None => {}
        }

        self.phase += 1;
        if lamp_dark || self.phase as usize >= table.len() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        trace!("transition to {} complete", self.end_aspect);
        self.phase = 0;
        self.start_aspect = self.end_aspect;
    }
}

impl Default for SignalHead {
    fn default() -> Self {
        Self::new()
    }
}

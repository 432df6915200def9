//! Integration tests for the software PWM output stage

mod common;
use common::*;

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use signal_head_coprocessor::pwm::{PWM_PHASES, line_asserted};
use signal_head_coprocessor::{
    ChannelOptions, Duties, Lamp, PinBank, Polarity, SignalOutputs, Topology, drive,
};

const ANODE: ChannelOptions = ChannelOptions::new(Polarity::CommonAnode, Topology::ThreeLamp);
const CATHODE: ChannelOptions = ChannelOptions::new(Polarity::CommonCathode, Topology::ThreeLamp);

fn run_cycle(outputs: &mut MockOutputs, channel: usize, duties: Duties, options: ChannelOptions) {
    for phase in 0..PWM_PHASES {
        drive(outputs, channel, duties, options, phase);
    }
}

#[test]
fn common_anode_asserts_each_lamp_for_its_duty() {
    for duty in 0..=31u8 {
        let mut outputs = MockOutputs::new();
        run_cycle(&mut outputs, 0, Duties::new(duty, 31 - duty, duty / 2), ANODE);
        assert_eq!(outputs.asserted(0, Lamp::Red), duty as u32);
        assert_eq!(outputs.asserted(0, Lamp::Yellow), (31 - duty) as u32);
        assert_eq!(outputs.asserted(0, Lamp::Green), (duty / 2) as u32);
    }
}

#[test]
fn common_cathode_flips_sense_but_keeps_lit_time() {
    for duty in 0..=31u8 {
        let mut outputs = MockOutputs::new();
        run_cycle(&mut outputs, 2, Duties::new(duty, 0, 0), CATHODE);
        let asserted = outputs.asserted(2, Lamp::Red);
        assert_eq!(asserted, 32 - duty as u32);
        // Lit while cleared (high) on a common-cathode head.
        assert_eq!(32 - asserted, duty as u32);
    }
}

#[test]
fn lit_phases_come_first_in_the_cycle() {
    for phase in 0..PWM_PHASES {
        assert_eq!(line_asserted(10, Polarity::CommonAnode, phase), phase < 10);
        assert_eq!(line_asserted(10, Polarity::CommonCathode, phase), phase >= 10);
    }
}

#[test]
fn dark_lamp_is_never_lit() {
    let mut outputs = MockOutputs::new();
    run_cycle(&mut outputs, 0, Duties::OFF, ANODE);
    for lamp in Lamp::ALL {
        assert_eq!(outputs.asserted(0, lamp), 0);
        assert!(!outputs.is_low(0, lamp));
    }
}

#[test]
fn drive_writes_every_line_once_per_call() {
    let mut outputs = MockOutputs::new();
    drive(&mut outputs, 5, Duties::new(1, 2, 3), ANODE, 0);
    assert_eq!(outputs.writes.len(), 3);
    assert_eq!(outputs.writes[0], (5, Lamp::Red, true));
    assert_eq!(outputs.writes[1], (5, Lamp::Yellow, true));
    assert_eq!(outputs.writes[2], (5, Lamp::Green, true));
}

// ============================================================================
// PinBank over embedded-hal pins
// ============================================================================

struct FakePin<'a> {
    high: &'a Cell<bool>,
}

impl ErrorType for FakePin<'_> {
    type Error = Infallible;
}

impl OutputPin for FakePin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high.set(true);
        Ok(())
    }
}

#[test]
fn pin_bank_asserts_by_driving_low() {
    let levels: [Cell<bool>; 6] = core::array::from_fn(|_| Cell::new(false));
    let pins = [
        [
            FakePin { high: &levels[0] },
            FakePin { high: &levels[1] },
            FakePin { high: &levels[2] },
        ],
        [
            FakePin { high: &levels[3] },
            FakePin { high: &levels[4] },
            FakePin { high: &levels[5] },
        ],
    ];
    let mut bank = PinBank::new(pins);

    bank.clear(1, Lamp::Yellow);
    assert!(levels[4].get());
    bank.assert(1, Lamp::Yellow);
    assert!(!levels[4].get());

    drive(&mut bank, 0, Duties::new(31, 0, 0), CATHODE, 0);
    assert!(levels[0].get(), "lit cathode lamp is high");
    assert!(!levels[1].get());
    assert!(!levels[2].get());

    // Channels outside the bank are ignored.
    bank.clear(7, Lamp::Red);
}

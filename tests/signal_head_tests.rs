//! Integration tests for SignalHead

mod common;
use common::*;

use signal_head_coprocessor::{Aspect, Duties, SignalHead, TransitionKind};

#[test]
fn every_transition_terminates_within_one_table() {
    for options in [THREE_LAMP, SEARCHLIGHT] {
        for start in ALL_ASPECTS {
            for end in ALL_ASPECTS {
                let mut head = steady_head(start, options);
                head.set_target(end);

                let cycles = settle(&mut head, true, options);
                assert!(
                    cycles <= 32,
                    "{:?} -> {:?} ({:?}) took {} cycles",
                    start,
                    end,
                    options.topology,
                    cycles
                );
                assert!(head.is_steady());
                assert_eq!(head.start_aspect(), end.steady());
                assert_eq!(head.end_aspect(), end.steady());
                assert_eq!(head.phase(), 0);
            }
        }
    }
}

#[test]
fn settled_heads_show_their_steady_duties() {
    for options in [THREE_LAMP, SEARCHLIGHT] {
        for start in ALL_ASPECTS {
            for end in ALL_ASPECTS {
                let mut head = steady_head(start, options);
                head.set_target(end);
                settle(&mut head, true, options);
                head.advance(true, options);
                assert_eq!(head.duties(), Duties::steady(end));
            }
        }
    }
}

#[test]
fn advancing_a_steady_head_changes_nothing() {
    for aspect in ALL_ASPECTS {
        let mut head = steady_head(aspect, SEARCHLIGHT);
        let duties = head.duties();
        for _ in 0..100 {
            head.advance(true, SEARCHLIGHT);
            assert_eq!(head.duties(), duties);
            assert_eq!(head.phase(), 0);
            assert!(head.is_steady());
        }
    }
}

#[test]
fn end_to_end_off_to_red_on_three_lamp_head() {
    let mut head = SignalHead::new();
    head.set_target(Aspect::Red);
    for _ in 0..32 {
        head.advance(false, THREE_LAMP);
    }
    let duties = head.duties();
    assert_eq!(duties.red, 31);
    assert_eq!(duties.yellow, 0);
    assert_eq!(duties.green, 0);
    assert_eq!(head.start_aspect(), Aspect::Red);
    assert_eq!(head.end_aspect(), Aspect::Red);
}

#[test]
fn flashing_green_follows_the_flasher_with_full_fades() {
    let mut head = SignalHead::new();
    head.set_target(Aspect::FlashGreen);

    for _ in 0..3 {
        let cycles = settle(&mut head, true, THREE_LAMP);
        assert!(cycles > 1, "lighting should fade in");
        head.advance(true, THREE_LAMP);
        assert_eq!(head.end_aspect(), Aspect::Green);
        assert_eq!(head.duties(), Duties::new(0, 0, 31));

        let cycles = settle(&mut head, false, THREE_LAMP);
        assert!(cycles > 1, "going dark should fade out");
        head.advance(false, THREE_LAMP);
        assert_eq!(head.end_aspect(), Aspect::Off);
        assert_eq!(head.duties(), Duties::OFF);
    }
}

#[test]
fn flash_fade_out_ramps_down_monotonically() {
    let mut head = steady_head(Aspect::FlashYellow, THREE_LAMP);
    let mut previous = head.duties().yellow;
    while {
        head.advance(false, THREE_LAMP);
        !head.is_steady()
    } {
        let yellow = head.duties().yellow;
        assert!(yellow < previous);
        previous = yellow;
    }
    assert_eq!(head.duties().yellow, 0);
}

#[test]
fn switching_between_flashing_and_steady_same_color_is_silent() {
    let mut head = steady_head(Aspect::FlashRed, THREE_LAMP);
    head.set_target(Aspect::Red);
    head.advance(true, THREE_LAMP);
    assert!(head.is_steady());
    assert_eq!(head.duties(), Duties::new(31, 0, 0));
}

#[test]
fn searchlight_green_to_yellow_bounces_through_red() {
    let mut head = steady_head(Aspect::Green, SEARCHLIGHT);
    head.set_target(Aspect::Yellow);

    let mut saw_red_only = false;
    loop {
        head.advance(true, SEARCHLIGHT);
        let d = head.duties();
        if d.red > 0 && d.green == 0 && d.yellow == 0 {
            saw_red_only = true;
        }
        if head.is_steady() {
            break;
        }
    }
    assert!(saw_red_only);
    assert_eq!(head.duties(), Duties::new(0, 31, 0));
}

#[test]
fn three_lamp_green_to_yellow_never_lights_red() {
    let mut head = steady_head(Aspect::Green, THREE_LAMP);
    head.set_target(Aspect::Yellow);
    loop {
        head.advance(true, THREE_LAMP);
        assert_eq!(head.duties().red, 0);
        if head.is_steady() {
            break;
        }
    }
}

#[test]
fn three_lamp_fade_never_overlaps_lamps() {
    let mut head = steady_head(Aspect::Red, THREE_LAMP);
    head.set_target(Aspect::Green);
    loop {
        head.advance(true, THREE_LAMP);
        let d = head.duties();
        assert!(d.red == 0 || d.green == 0, "both lamps lit: {:?}", d);
        assert_eq!(d.yellow, 0);
        if head.is_steady() {
            break;
        }
    }
}

#[test]
fn searchlight_to_red_bounces_back_once() {
    let mut head = steady_head(Aspect::Green, SEARCHLIGHT);
    head.set_target(Aspect::Red);

    let mut green = heapless::Vec::<u8, 32>::new();
    loop {
        head.advance(true, SEARCHLIGHT);
        green.push(head.duties().green).unwrap();
        if head.is_steady() {
            break;
        }
    }

    assert_eq!(green.len(), 20);
    // Green drops out, briefly returns, then stays dark.
    let rises = green.windows(2).filter(|w| w[1] > w[0]).count();
    assert_eq!(rises, 2);
    assert_eq!(head.duties(), Duties::new(31, 0, 0));
}

#[test]
fn searchlight_from_dark_uses_the_fade_table() {
    assert_eq!(
        TransitionKind::select(SEARCHLIGHT.topology, Aspect::Off, Aspect::Red),
        TransitionKind::Fade
    );

    let mut head = SignalHead::new();
    head.set_target(Aspect::Red);
    head.advance(true, SEARCHLIGHT);
    assert_eq!(head.duties(), Duties::new(2, 0, 0));
}

#[test]
fn unknown_register_codes_request_off() {
    let mut head = steady_head(Aspect::Yellow, THREE_LAMP);
    head.set_target_code(0x42);
    assert_eq!(head.target(), Aspect::Off);
    settle(&mut head, true, THREE_LAMP);
    assert_eq!(head.end_aspect(), Aspect::Off);
    assert_eq!(head.duties(), Duties::OFF);
}

#[test]
fn transition_in_flight_finishes_before_a_new_target() {
    let mut head = steady_head(Aspect::Green, THREE_LAMP);
    head.set_target(Aspect::Red);
    for _ in 0..10 {
        head.advance(true, THREE_LAMP);
    }
    head.set_target(Aspect::Yellow);
    settle(&mut head, true, THREE_LAMP);
    assert_eq!(head.end_aspect(), Aspect::Red);

    settle(&mut head, true, THREE_LAMP);
    assert_eq!(head.end_aspect(), Aspect::Yellow);
}

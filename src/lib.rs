#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Aspect`**: What a head shows (off, steady or flashing red/yellow/green, lunar)
//! - **`SignalHead`**: Per-head state machine that steps lamp duties through a transition table once per PWM cycle
//! - **`TransitionKind`**: Which of the three tables (fade, searchlight through red, searchlight involving red) a transition uses
//! - **`SignalOutputs`**: Trait to implement for your lamp output lines
//! - **`SharedState`**: Tick-interrupt view of every channel plus the tick clock
//! - **`Controller`**: Main-loop service that advances heads and polls the register map
//! - **`RegisterBus`**: Trait to implement for the bus slave that owns the register map
//! - **`Debouncer`**: Eight-input parallel debouncer used for the anode/cathode sense line
//!
//! Duties are integers `0..=31`. A lamp at duty `d` is lit for `d` of the 32
//! ticks of each PWM cycle.
//!
//! The tick interrupt and the main loop share only single-byte atomics (plus
//! the millisecond counter), so no locking is needed between them.

#[macro_use]
#[allow(unused_macros)]
mod log;

pub mod config;
pub mod controller;
pub mod debounce;
pub mod outputs;
pub mod pwm;
pub mod registers;
pub mod signal_head;
pub mod time;
pub mod transition;
pub mod types;

pub use config::{ConfigError, TimingConfig, TimingConfigBuilder};
pub use controller::{ChannelError, Controller, ServiceReport, SharedState};
pub use debounce::Debouncer;
pub use outputs::{LampBinding, PinBank, Port, PortOutputs, PortWriter};
pub use pwm::{LampCell, SignalOutputs, drive};
pub use registers::{RegisterBus, RegisterMap};
pub use signal_head::SignalHead;
pub use time::TickClock;
pub use transition::{TransitionKind, TransitionStep, TransitionTable};
pub use types::{Aspect, ChannelOptions, Duties, InvalidAspect, Lamp, MAX_DUTY, Polarity, Topology};

/// Number of signal heads on the reference board.
pub const NUM_CHANNELS: usize = registers::MAX_CHANNELS;

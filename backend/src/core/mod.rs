//! Core simulation primitives: the integer-minute clock.

pub mod time;

pub use time::{format_clock, parse_clock, SimulationClock, MINUTES_PER_DAY};

//! Tests for SimulationClock

use parking_simulator_core_rs::core::time::{format_clock, parse_clock, MINUTES_PER_DAY};
use parking_simulator_core_rs::SimulationClock;

#[test]
fn test_clock_new() {
    let clock = SimulationClock::new(360, 1320);
    assert_eq!(clock.current(), 360);
    assert_eq!(clock.start(), 360);
    assert_eq!(clock.end(), 1320);
    assert!(!clock.at_or_past_end());
}

#[test]
fn test_advance() {
    let mut clock = SimulationClock::new(360, 1320);

    clock.advance();
    assert_eq!(clock.current(), 361);

    clock.advance();
    assert_eq!(clock.current(), 362);
    assert_eq!(clock.peek_next(), 363);
}

#[test]
fn test_reaches_end() {
    let mut clock = SimulationClock::new(360, 362);
    clock.advance();
    assert!(!clock.at_or_past_end());
    clock.advance();
    assert!(clock.at_or_past_end());
}

#[test]
fn test_display_crosses_hour() {
    let mut clock = SimulationClock::new(539, 600);
    assert_eq!(clock.to_string(), "08:59");

    clock.advance();
    assert_eq!(clock.to_string(), "09:00");
}

#[test]
fn test_format_and_parse_agree() {
    for minutes in [0, 59, 360, 450, 1020, MINUTES_PER_DAY - 1] {
        assert_eq!(parse_clock(&format_clock(minutes)), Some(minutes));
    }
}

#[test]
fn test_parse_rejects_missing_colon() {
    assert_eq!(parse_clock("0600"), None);
    assert_eq!(parse_clock(""), None);
}

//! Time management for the simulation
//!
//! The simulation operates in discrete ticks of one simulated minute. The
//! clock counts minutes from midnight and runs over a configured day window
//! `[start, end]`. It is decoupled from wall-clock time.

use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Integer-minute simulation clock
///
/// # Example
/// ```
/// use parking_simulator_core_rs::SimulationClock;
///
/// let mut clock = SimulationClock::new(360, 1320); // 06:00 - 22:00
/// assert_eq!(clock.current(), 360);
///
/// clock.advance();
/// assert_eq!(clock.current(), 361);
/// assert_eq!(clock.to_string(), "06:01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Current minute from midnight
    current: u32,
    /// First minute of the simulated day
    start: u32,
    /// Closing minute (inclusive)
    end: u32,
}

impl SimulationClock {
    /// Create a clock positioned at `start`
    ///
    /// # Panics
    /// Panics if `start >= end`
    pub fn new(start: u32, end: u32) -> Self {
        assert!(start < end, "start must be before end");
        Self {
            current: start,
            start,
            end,
        }
    }

    /// Advance time by one minute
    pub fn advance(&mut self) {
        self.current += 1;
    }

    /// Current minute from midnight
    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Minute the next tick would land on
    pub fn peek_next(&self) -> u32 {
        self.current + 1
    }

    /// Whether the clock reached closing time
    pub fn at_or_past_end(&self) -> bool {
        self.current >= self.end
    }

    /// Move the clock up to `start` if it is behind. Returns true if moved.
    pub fn snap_to_start(&mut self) -> bool {
        if self.current < self.start {
            self.current = self.start;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Display for SimulationClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_clock(self.current))
    }
}

/// Format minutes from midnight as `HH:MM`
///
/// # Example
/// ```
/// use parking_simulator_core_rs::core::time::format_clock;
///
/// assert_eq!(format_clock(450), "07:30");
/// ```
pub fn format_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parse `HH:MM` into minutes from midnight
///
/// # Example
/// ```
/// use parking_simulator_core_rs::core::time::parse_clock;
///
/// assert_eq!(parse_clock("17:00"), Some(1020));
/// assert_eq!(parse_clock("25:00"), None);
/// ```
pub fn parse_clock(text: &str) -> Option<u32> {
    let (h, m) = text.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h < 24 && m < 60 {
        Some(h * 60 + m)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "start must be before end")]
    fn test_inverted_window_panics() {
        SimulationClock::new(600, 600);
    }

    #[test]
    fn test_snap_to_start_leaves_running_clock() {
        let mut clock = SimulationClock::new(360, 1320);
        assert!(!clock.snap_to_start());
        clock.advance();
        assert!(!clock.snap_to_start());
        assert_eq!(clock.current(), 361);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_clock("noon"), None);
        assert_eq!(parse_clock("12:60"), None);
        assert_eq!(parse_clock(" 06:00 "), Some(360));
    }
}

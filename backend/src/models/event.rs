//! Event logging for simulation replay and display.
//!
//! This module defines the Event enum which captures every significant state
//! change during a run. Events enable:
//! - Deterministic replay checks (compare event sequences or their digest)
//! - Event-log display (bounded, newest first)
//! - Analysis (arrivals, rejections and departures per minute)
//!
//! # Event Types
//!
//! - **Vehicle flow**: Arrival, Rejection, Departure
//! - **Control**: Started, Paused, Finished, StartRefused, ClockAdjusted, Reset
//! - **Testing**: ChiSquareCompleted
//!
//! # Example
//!
//! ```rust
//! use parking_simulator_core_rs::models::Event;
//!
//! let event = Event::Rejection { minute: 480, attempt: 3 };
//! assert_eq!(event.minute(), 480);
//! assert_eq!(event.event_type(), "Rejection");
//! assert!(event.message().contains("rejected"));
//! ```

use crate::core::time::format_clock;
use crate::rng::PrngMethod;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;

/// Number of entries the display log keeps.
pub const MAX_LOG_ENTRIES: usize = 100;

/// Simulation event capturing a state change.
///
/// All events carry the simulation minute (minutes from midnight) at which
/// they happened. Events are produced in the order they occur within a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Vehicle allocated to a space
    Arrival {
        minute: u32,
        vehicle_id: String,
        zone_id: String,
        space_id: String,
        duration: u32,
    },

    /// Arrival attempt found no free space in any active zone
    Rejection {
        minute: u32,
        /// 1-based rejection count in this run
        attempt: u64,
    },

    /// Vehicle left its space
    Departure {
        minute: u32,
        vehicle_id: Option<String>,
        zone_id: String,
        space_id: String,
        duration: Option<u32>,
    },

    Started {
        minute: u32,
    },

    Paused {
        minute: u32,
    },

    /// Closing time reached
    Finished {
        minute: u32,
    },

    /// Start requested after closing time
    StartRefused {
        minute: u32,
    },

    /// Clock snapped forward to the configured start time
    ClockAdjusted {
        minute: u32,
    },

    Reset {
        minute: u32,
        to_defaults: bool,
    },

    ChiSquareCompleted {
        minute: u32,
        method: PrngMethod,
        sample_size: usize,
        num_bins: usize,
        statistic: f64,
    },
}

impl Event {
    /// Get the simulation minute when this event occurred
    pub fn minute(&self) -> u32 {
        match self {
            Event::Arrival { minute, .. }
            | Event::Rejection { minute, .. }
            | Event::Departure { minute, .. }
            | Event::Started { minute }
            | Event::Paused { minute }
            | Event::Finished { minute }
            | Event::StartRefused { minute }
            | Event::ClockAdjusted { minute }
            | Event::Reset { minute, .. }
            | Event::ChiSquareCompleted { minute, .. } => *minute,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Arrival { .. } => "Arrival",
            Event::Rejection { .. } => "Rejection",
            Event::Departure { .. } => "Departure",
            Event::Started { .. } => "Started",
            Event::Paused { .. } => "Paused",
            Event::Finished { .. } => "Finished",
            Event::StartRefused { .. } => "StartRefused",
            Event::ClockAdjusted { .. } => "ClockAdjusted",
            Event::Reset { .. } => "Reset",
            Event::ChiSquareCompleted { .. } => "ChiSquareCompleted",
        }
    }

    /// Get the vehicle ID if the event concerns one vehicle
    pub fn vehicle_id(&self) -> Option<&str> {
        match self {
            Event::Arrival { vehicle_id, .. } => Some(vehicle_id),
            Event::Departure { vehicle_id, .. } => vehicle_id.as_deref(),
            _ => None,
        }
    }

    /// Human-readable log line
    pub fn message(&self) -> String {
        match self {
            Event::Arrival {
                vehicle_id,
                zone_id,
                space_id,
                duration,
                ..
            } => format!(
                "Vehicle {} arrived and parked in {} space {}. Duration: {} min.",
                vehicle_id, zone_id, space_id, duration
            ),
            Event::Rejection { attempt, .. } => {
                format!("Vehicle rejected (rejection #{}). No free space.", attempt)
            }
            Event::Departure {
                vehicle_id,
                zone_id,
                space_id,
                duration,
                ..
            } => format!(
                "Vehicle {} left {} space {}. Parked ~{} min.",
                vehicle_id.as_deref().unwrap_or("N/A"),
                zone_id,
                space_id,
                duration.map_or_else(|| "?".to_string(), |d| d.to_string())
            ),
            Event::Started { .. } => "Simulation started/resumed.".to_string(),
            Event::Paused { .. } => "Simulation paused.".to_string(),
            Event::Finished { .. } => "Simulation finished: closing time reached.".to_string(),
            Event::StartRefused { .. } => {
                "Simulation already reached its end time. Reset to start again.".to_string()
            }
            Event::ClockAdjusted { minute } => {
                format!("Clock adjusted to simulation start: {}.", format_clock(*minute))
            }
            Event::Reset { to_defaults, .. } => {
                if *to_defaults {
                    "Simulation reset to default values.".to_string()
                } else {
                    "Simulation reset.".to_string()
                }
            }
            Event::ChiSquareCompleted {
                method,
                sample_size,
                num_bins,
                statistic,
                ..
            } => format!(
                "Chi-square test run for {}. N={}, K={}. Statistic: {:.3}.",
                method, sample_size, num_bins, statistic
            ),
        }
    }
}

/// One line of the display log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// `evt-<n>`, sequential since the last reset
    pub id: String,
    /// HH:MM of the event
    pub timestamp: String,
    pub message: String,
    pub event: Event,
}

/// Bounded event log for display, newest entry first.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Create a new empty event log keeping [`MAX_LOG_ENTRIES`] entries
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOG_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Add an event, evicting the oldest entry when full
    pub fn log(&mut self, event: Event) {
        let entry = LogEntry {
            id: format!("evt-{}", self.next_id),
            timestamp: format_clock(event.minute()),
            message: event.message(),
            event,
        };
        self.next_id += 1;
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Get the number of entries kept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Total events ever logged since the last clear
    pub fn total_logged(&self) -> u64 {
        self.next_id
    }

    /// Get kept events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.entries
            .iter()
            .map(|e| &e.event)
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get kept events for a specific minute
    pub fn events_at_minute(&self, minute: u32) -> Vec<&Event> {
        self.entries
            .iter()
            .map(|e| &e.event)
            .filter(|e| e.minute() == minute)
            .collect()
    }

    /// Clear all entries and restart ids at `evt-0`
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_id = 0;
    }
}

/// Hex SHA-256 of the JSON encoding of an event sequence.
///
/// Two runs with the same seed and parameters produce the same digest.
pub fn event_digest(events: &[Event]) -> Result<String, serde_json::Error> {
    let encoded = serde_json::to_vec(events)?;
    let digest = Sha256::digest(&encoded);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(minute: u32, n: u32) -> Event {
        Event::Arrival {
            minute,
            vehicle_id: format!("V-{}", n),
            zone_id: "internal".to_string(),
            space_id: format!("I-{}", n),
            duration: 300,
        }
    }

    #[test]
    fn test_event_minute_and_type() {
        let event = arrival(421, 1);
        assert_eq!(event.minute(), 421);
        assert_eq!(event.event_type(), "Arrival");
        assert_eq!(event.vehicle_id(), Some("V-1"));
    }

    #[test]
    fn test_departure_message_without_vehicle() {
        let event = Event::Departure {
            minute: 10,
            vehicle_id: None,
            zone_id: "external".to_string(),
            space_id: "E-1".to_string(),
            duration: Some(42),
        };
        assert_eq!(event.message(), "Vehicle N/A left external space E-1. Parked ~42 min.");
    }

    #[test]
    fn test_event_log_newest_first_with_ids() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.log(arrival(360, 1));
        log.log(Event::Rejection { minute: 361, attempt: 1 });

        let entries: Vec<_> = log.entries().collect();
        assert_eq!(entries[0].id, "evt-1");
        assert_eq!(entries[0].timestamp, "06:01");
        assert_eq!(entries[1].id, "evt-0");
    }

    #[test]
    fn test_event_log_is_bounded() {
        let mut log = EventLog::with_capacity(3);
        for i in 0..5 {
            log.log(arrival(400 + i, i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.total_logged(), 5);
        assert_eq!(log.entries().last().map(|e| e.event.minute()), Some(402));
    }

    #[test]
    fn test_event_log_query() {
        let mut log = EventLog::new();
        log.log(arrival(400, 1));
        log.log(Event::Rejection { minute: 400, attempt: 1 });
        log.log(arrival(401, 2));

        assert_eq!(log.events_of_type("Arrival").len(), 2);
        assert_eq!(log.events_at_minute(400).len(), 2);

        log.clear();
        assert!(log.is_empty());
        log.log(arrival(402, 3));
        assert_eq!(log.entries().next().map(|e| e.id.as_str()), Some("evt-0"));
    }

    #[test]
    fn test_digest_distinguishes_sequences() {
        let a = vec![arrival(400, 1)];
        let b = vec![arrival(400, 2)];
        assert_eq!(event_digest(&a).unwrap(), event_digest(&a.clone()).unwrap());
        assert_ne!(event_digest(&a).unwrap(), event_digest(&b).unwrap());
        assert_eq!(event_digest(&a).unwrap().len(), 64);
    }
}

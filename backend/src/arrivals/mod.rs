//! Arrival scheduling with time-of-day dependent rates.
//!
//! Vehicles arrive one at a time. After each arrival attempt the engine
//! samples the gap to the next attempt from an exponential distribution whose
//! mean depends on the time band the current minute falls in.
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same seed + same schedule → same gaps
//! 2. **Step function**: The mean is constant within a band; bands are half-open `[start, end)`
//! 3. **Integer gaps**: Gaps are rounded to whole minutes and never below 1
//!
//! # Bands
//!
//! ```text
//! morning | morning peak | afternoon | evening peak | late afternoon
//!       07:30          09:00       17:00          18:00
//! ```
//!
//! The evening bands only exist when [`ArrivalSchedule::evening_peak`] is set;
//! otherwise the afternoon band runs to closing time.
//!
//! # Example
//!
//! ```
//! use parking_simulator_core_rs::arrivals::{ArrivalSchedule, TimeBand};
//!
//! let schedule = ArrivalSchedule::default();
//! assert_eq!(schedule.band_at(449), TimeBand::Morning);
//! assert_eq!(schedule.band_at(450), TimeBand::MorningPeak);
//! assert_eq!(schedule.band_at(540), TimeBand::Afternoon);
//! assert_eq!(schedule.mean_at(500), schedule.peak_arrival_mean);
//! ```

use crate::rng::PrngProvider;
use serde::{Deserialize, Serialize};

/// Default morning peak: 07:30-09:00
pub const MORNING_PEAK: PeakWindow = PeakWindow { start: 450, end: 540 };

/// Default evening peak: 17:00-18:00
pub const EVENING_PEAK: PeakWindow = PeakWindow {
    start: 1020,
    end: 1080,
};

/// Half-open window `[start, end)` in minutes from midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakWindow {
    pub start: u32,
    pub end: u32,
}

impl PeakWindow {
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start && minute < self.end
    }
}

/// Optional evening bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EveningPeakConfig {
    pub window: PeakWindow,
    /// Mean minutes between arrivals during the evening peak
    pub evening_peak_arrival_mean: f64,
    /// Mean minutes between arrivals after the evening peak
    pub late_afternoon_arrival_mean: f64,
}

/// Which band a minute falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeBand {
    Morning,
    MorningPeak,
    Afternoon,
    EveningPeak,
    LateAfternoon,
}

/// Mean inter-arrival times per band (minutes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalSchedule {
    /// Before the morning peak
    pub morning_arrival_mean: f64,
    /// During the morning peak
    pub peak_arrival_mean: f64,
    /// After the morning peak
    pub afternoon_arrival_mean: f64,
    pub morning_peak: PeakWindow,
    pub evening_peak: Option<EveningPeakConfig>,
}

impl Default for ArrivalSchedule {
    fn default() -> Self {
        Self {
            morning_arrival_mean: 1.8,
            peak_arrival_mean: 1.0,
            afternoon_arrival_mean: 3.5,
            morning_peak: MORNING_PEAK,
            evening_peak: None,
        }
    }
}

impl ArrivalSchedule {
    /// Same mean for every band
    pub fn constant(mean: f64) -> Self {
        Self {
            morning_arrival_mean: mean,
            peak_arrival_mean: mean,
            afternoon_arrival_mean: mean,
            ..Self::default()
        }
    }

    /// Band containing `minute`
    pub fn band_at(&self, minute: u32) -> TimeBand {
        if minute < self.morning_peak.start {
            return TimeBand::Morning;
        }
        if self.morning_peak.contains(minute) {
            return TimeBand::MorningPeak;
        }
        match &self.evening_peak {
            Some(evening) if evening.window.contains(minute) => TimeBand::EveningPeak,
            Some(evening) if minute >= evening.window.end => TimeBand::LateAfternoon,
            _ => TimeBand::Afternoon,
        }
    }

    /// Mean inter-arrival time at `minute`
    pub fn mean_at(&self, minute: u32) -> f64 {
        match (self.band_at(minute), &self.evening_peak) {
            (TimeBand::Morning, _) => self.morning_arrival_mean,
            (TimeBand::MorningPeak, _) => self.peak_arrival_mean,
            (TimeBand::EveningPeak, Some(evening)) => evening.evening_peak_arrival_mean,
            (TimeBand::LateAfternoon, Some(evening)) => evening.late_afternoon_arrival_mean,
            _ => self.afternoon_arrival_mean,
        }
    }

    /// Sample the number of ticks until the next arrival attempt:
    /// `max(1, round(exponential(mean_at(minute))))`
    pub fn sample_gap(&self, minute: u32, rng: &mut PrngProvider) -> u32 {
        let gap = rng.exponential(self.mean_at(minute)).round();
        (gap as u32).max(1)
    }

    /// Every mean configured for this schedule
    pub fn means(&self) -> Vec<f64> {
        let mut means = vec![
            self.morning_arrival_mean,
            self.peak_arrival_mean,
            self.afternoon_arrival_mean,
        ];
        if let Some(evening) = &self.evening_peak {
            means.push(evening.evening_peak_arrival_mean);
            means.push(evening.late_afternoon_arrival_mean);
        }
        means
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PrngMethod;

    fn with_evening() -> ArrivalSchedule {
        ArrivalSchedule {
            evening_peak: Some(EveningPeakConfig {
                window: EVENING_PEAK,
                evening_peak_arrival_mean: 0.8,
                late_afternoon_arrival_mean: 5.0,
            }),
            ..ArrivalSchedule::default()
        }
    }

    #[test]
    fn test_bands_without_evening_peak() {
        let schedule = ArrivalSchedule::default();
        assert_eq!(schedule.band_at(0), TimeBand::Morning);
        assert_eq!(schedule.band_at(539), TimeBand::MorningPeak);
        assert_eq!(schedule.band_at(1100), TimeBand::Afternoon);
        assert_eq!(schedule.mean_at(1100), 3.5);
    }

    #[test]
    fn test_bands_with_evening_peak() {
        let schedule = with_evening();
        assert_eq!(schedule.band_at(1019), TimeBand::Afternoon);
        assert_eq!(schedule.band_at(1020), TimeBand::EveningPeak);
        assert_eq!(schedule.band_at(1079), TimeBand::EveningPeak);
        assert_eq!(schedule.band_at(1080), TimeBand::LateAfternoon);
        assert_eq!(schedule.mean_at(1030), 0.8);
        assert_eq!(schedule.mean_at(1200), 5.0);
    }

    #[test]
    fn test_gap_at_least_one() {
        let schedule = ArrivalSchedule::constant(0.01);
        let mut rng = PrngProvider::new(PrngMethod::Lcg, Some(1), None);
        for minute in 360..460 {
            assert_eq!(schedule.sample_gap(minute, &mut rng), 1);
        }
    }

    #[test]
    fn test_gap_deterministic() {
        let schedule = ArrivalSchedule::default();
        let mut rng1 = PrngProvider::new(PrngMethod::MersenneTwister, Some(42), None);
        let mut rng2 = PrngProvider::new(PrngMethod::MersenneTwister, Some(42), None);
        for minute in 360..600 {
            assert_eq!(
                schedule.sample_gap(minute, &mut rng1),
                schedule.sample_gap(minute, &mut rng2)
            );
        }
    }

    #[test]
    fn test_means_lists_evening_bands() {
        assert_eq!(ArrivalSchedule::default().means().len(), 3);
        assert_eq!(with_evening().means().len(), 5);
    }
}

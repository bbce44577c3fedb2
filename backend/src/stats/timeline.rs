//! Hourly arrivals/rejections timeline

use serde::{Deserialize, Serialize};

/// Counts for one hour of the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBucket {
    /// Hour of day (0-23)
    pub hour: u32,
    /// `HH:00-HH:00`
    pub label: String,
    /// Admitted attempts
    pub arrivals: u64,
    pub rejections: u64,
}

/// One bucket per hour from `floor(start/60)` up to `ceil(end/60)` (exclusive).
/// An attempt lands in bucket `floor(minute/60) - floor(start/60)`; one with
/// no bucket (such as a closing minute on the hour) is dropped.
///
/// # Example
/// ```
/// use parking_simulator_core_rs::stats::HourlyTimeline;
///
/// let mut timeline = HourlyTimeline::new(360, 1320);
/// assert_eq!(timeline.buckets().len(), 16);
/// assert_eq!(timeline.buckets()[0].label, "06:00-07:00");
///
/// timeline.record(400, false);
/// assert_eq!(timeline.buckets()[0].arrivals, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyTimeline {
    start_hour: u32,
    buckets: Vec<TimelineBucket>,
}

impl HourlyTimeline {
    pub fn new(start: u32, end: u32) -> Self {
        let start_hour = start / 60;
        let end_hour = end.div_ceil(60);
        let buckets = (start_hour..end_hour)
            .map(|hour| TimelineBucket {
                hour,
                label: format!("{:02}:00-{:02}:00", hour, hour + 1),
                arrivals: 0,
                rejections: 0,
            })
            .collect();
        Self {
            start_hour,
            buckets,
        }
    }

    /// Count one arrival attempt at `minute`: admitted attempts as
    /// arrivals, the rest as rejections. Attempts outside every bucket are
    /// dropped.
    pub fn record(&mut self, minute: u32, rejected: bool) {
        let Some(index) = (minute / 60).checked_sub(self.start_hour) else {
            return;
        };
        if let Some(bucket) = self.buckets.get_mut(index as usize) {
            if rejected {
                bucket.rejections += 1;
            } else {
                bucket.arrivals += 1;
            }
        }
    }

    pub fn buckets(&self) -> &[TimelineBucket] {
        &self.buckets
    }

    pub fn total_arrivals(&self) -> u64 {
        self.buckets.iter().map(|b| b.arrivals).sum()
    }

    pub fn total_rejections(&self) -> u64 {
        self.buckets.iter().map(|b| b.rejections).sum()
    }
}

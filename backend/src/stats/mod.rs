//! Statistics aggregator
//!
//! Statistics are never mutated in place by the engine. Each tick folds the
//! tick's activity into the previous snapshot with [`aggregate`], which
//! recounts occupancy from the facility from scratch.
//!
//! # Counter semantics
//!
//! - `total_arrivals` counts arrival **attempts** (admitted + rejected) and is
//!   the rejection-rate denominator
//! - `total_rejections` counts attempts that found no free space
//! - `total_departures` counts vehicles that left
//!
//! # Sentinel
//!
//! A disabled projected zone reports `occupied = -1` ("not applicable") and
//! is excluded from the overall occupancy rate.

use crate::models::{Facility, ZoneRole};
use serde::{Deserialize, Serialize};

pub mod report;
pub mod timeline;

pub use report::{duration_histogram, DurationBin, OccupancyBreakdown, DEFAULT_BIN_MINUTES};
pub use timeline::{HourlyTimeline, TimelineBucket};

/// Occupancy value reported for a disabled zone
pub const NOT_APPLICABLE: i64 = -1;

/// Occupancy of one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneOccupancy {
    pub zone_id: String,
    /// Occupied spaces, or [`NOT_APPLICABLE`] when the zone is inactive
    pub occupied: i64,
    pub capacity: usize,
    /// Percentage 0-100 (0 for an empty or inactive zone)
    pub occupancy_rate: f64,
    pub active: bool,
}

impl ZoneOccupancy {
    fn inactive(role: ZoneRole, capacity: usize) -> Self {
        Self {
            zone_id: role.id().to_string(),
            occupied: NOT_APPLICABLE,
            capacity,
            occupancy_rate: 0.0,
            active: false,
        }
    }

    fn empty(role: ZoneRole, capacity: usize) -> Self {
        Self {
            occupied: 0,
            active: true,
            ..Self::inactive(role, capacity)
        }
    }
}

/// Feature toggles that change how occupancy is counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountingRules {
    pub projected_enabled: bool,
    pub reservations_enabled: bool,
}

/// One arrival attempt during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalAttempt {
    pub minute: u32,
    pub admitted: bool,
}

/// Everything a tick contributes to the counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickActivity {
    pub departed_durations: Vec<u32>,
    pub attempts: Vec<ArrivalAttempt>,
}

/// Running statistics of one simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStatistics {
    pub total_arrivals: u64,
    pub total_departures: u64,
    pub total_rejections: u64,

    pub internal: ZoneOccupancy,
    pub external: ZoneOccupancy,
    pub projected: ZoneOccupancy,

    /// Percentage over active zones
    pub overall_occupancy_rate: f64,
    /// `total_rejections / total_arrivals * 100`
    pub rejection_rate: f64,
    /// Mean minutes parked by departed vehicles
    pub avg_parking_time: f64,

    pub simulation_clock: u32,

    /// Duration of every departed vehicle, in departure order
    pub parking_durations: Vec<u32>,
    pub total_parking_minutes: u64,

    pub timeline: HourlyTimeline,
}

impl SimulationStatistics {
    /// Fresh statistics for a day window `[start, end]` and an empty facility
    pub fn new(start: u32, end: u32, facility: &Facility, rules: CountingRules) -> Self {
        let empty = Self {
            total_arrivals: 0,
            total_departures: 0,
            total_rejections: 0,
            internal: ZoneOccupancy::empty(ZoneRole::Internal, 0),
            external: ZoneOccupancy::empty(ZoneRole::External, 0),
            projected: ZoneOccupancy::inactive(ZoneRole::Projected, 0),
            overall_occupancy_rate: 0.0,
            rejection_rate: 0.0,
            avg_parking_time: 0.0,
            simulation_clock: start,
            parking_durations: Vec::new(),
            total_parking_minutes: 0,
            timeline: HourlyTimeline::new(start, end),
        };
        empty.recompute(facility, rules)
    }

    pub fn zone(&self, role: ZoneRole) -> &ZoneOccupancy {
        match role {
            ZoneRole::Internal => &self.internal,
            ZoneRole::External => &self.external,
            ZoneRole::Projected => &self.projected,
        }
    }

    fn zone_mut(&mut self, role: ZoneRole) -> &mut ZoneOccupancy {
        match role {
            ZoneRole::Internal => &mut self.internal,
            ZoneRole::External => &mut self.external,
            ZoneRole::Projected => &mut self.projected,
        }
    }

    /// Zones included in the overall rate
    pub fn active_zones(&self) -> impl Iterator<Item = &ZoneOccupancy> {
        [&self.internal, &self.external, &self.projected]
            .into_iter()
            .filter(|z| z.active)
    }

    /// Vehicles that got a space
    pub fn admitted(&self) -> u64 {
        self.total_arrivals - self.total_rejections
    }

    /// Re-derive occupancy and rates without touching counters or clock.
    ///
    /// Used when only a counting toggle changed.
    pub fn recompute(&self, facility: &Facility, rules: CountingRules) -> Self {
        aggregate(self, &TickActivity::default(), facility, rules, self.simulation_clock)
    }
}

/// Fold one tick's activity into `previous`.
///
/// Pure: occupancy, capacity and every rate are recomputed from `facility`;
/// only the counters, duration history and timeline carry over.
pub fn aggregate(
    previous: &SimulationStatistics,
    activity: &TickActivity,
    facility: &Facility,
    rules: CountingRules,
    clock: u32,
) -> SimulationStatistics {
    let mut next = previous.clone();
    next.simulation_clock = clock;

    let mut total_occupied = 0usize;
    let mut total_capacity = 0usize;
    for zone in facility.zones() {
        let role = zone.role();
        let capacity = zone.capacity();
        if zone.is_projected() && !rules.projected_enabled {
            *next.zone_mut(role) = ZoneOccupancy::inactive(role, capacity);
            continue;
        }
        let occupied = zone.occupied_count(rules.reservations_enabled);
        total_occupied += occupied;
        total_capacity += capacity;
        *next.zone_mut(role) = ZoneOccupancy {
            zone_id: zone.id().to_string(),
            occupied: occupied as i64,
            capacity,
            occupancy_rate: percentage(occupied as u64, capacity as u64),
            active: true,
        };
    }
    next.overall_occupancy_rate = percentage(total_occupied as u64, total_capacity as u64);

    for attempt in &activity.attempts {
        next.total_arrivals += 1;
        if !attempt.admitted {
            next.total_rejections += 1;
        }
        next.timeline.record(attempt.minute, !attempt.admitted);
    }

    next.total_departures += activity.departed_durations.len() as u64;
    next.total_parking_minutes += activity
        .departed_durations
        .iter()
        .map(|&d| d as u64)
        .sum::<u64>();
    next.parking_durations
        .extend_from_slice(&activity.departed_durations);

    next.rejection_rate = percentage(next.total_rejections, next.total_arrivals);
    next.avg_parking_time = if next.total_departures > 0 {
        next.total_parking_minutes as f64 / next.total_departures as f64
    } else {
        0.0
    };
    next
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FacilityLayout;

    fn layout(internal: usize, external: usize, projected: usize) -> Facility {
        Facility::new(FacilityLayout {
            internal,
            external,
            projected,
        })
    }

    #[test]
    fn test_initial_projected_sentinel() {
        let facility = layout(20, 30, 24);
        let stats = SimulationStatistics::new(360, 1320, &facility, CountingRules::default());
        assert_eq!(stats.projected.occupied, NOT_APPLICABLE);
        assert_eq!(stats.internal.occupied, 0);
        assert_eq!(stats.simulation_clock, 360);
        assert_eq!(stats.active_zones().count(), 2);
    }

    #[test]
    fn test_aggregate_counts_attempts() {
        let mut facility = layout(1, 0, 0);
        let rules = CountingRules::default();
        let stats = SimulationStatistics::new(360, 1320, &facility, rules);

        facility
            .park(ZoneRole::Internal, "V-1".to_string(), 700, 300)
            .unwrap();
        let activity = TickActivity {
            departed_durations: vec![],
            attempts: vec![
                ArrivalAttempt { minute: 400, admitted: true },
                ArrivalAttempt { minute: 401, admitted: false },
            ],
        };
        let next = aggregate(&stats, &activity, &facility, rules, 401);

        assert_eq!(next.total_arrivals, 2);
        assert_eq!(next.total_rejections, 1);
        assert_eq!(next.admitted(), 1);
        assert_eq!(next.rejection_rate, 50.0);
        assert_eq!(next.internal.occupancy_rate, 100.0);
        assert_eq!(next.external.occupancy_rate, 0.0);
        assert_eq!(next.overall_occupancy_rate, 100.0);
        assert_eq!(next.timeline.buckets()[0].arrivals, 1);
        assert_eq!(next.timeline.buckets()[0].rejections, 1);
    }

    #[test]
    fn test_average_parking_time() {
        let facility = layout(20, 30, 24);
        let rules = CountingRules::default();
        let stats = SimulationStatistics::new(360, 1320, &facility, rules);
        let activity = TickActivity {
            departed_durations: vec![200, 400],
            attempts: vec![],
        };
        let next = aggregate(&stats, &activity, &facility, rules, 700);
        assert_eq!(next.total_departures, 2);
        assert_eq!(next.avg_parking_time, 300.0);
        assert_eq!(next.parking_durations, vec![200, 400]);
    }

    #[test]
    fn test_recompute_keeps_counters() {
        let mut facility = layout(20, 30, 24);
        let off = CountingRules::default();
        let on = CountingRules {
            projected_enabled: true,
            reservations_enabled: false,
        };
        let stats = SimulationStatistics::new(360, 1320, &facility, off);
        let stats = aggregate(
            &stats,
            &TickActivity {
                departed_durations: vec![],
                attempts: vec![ArrivalAttempt { minute: 361, admitted: false }],
            },
            &facility,
            off,
            361,
        );
        facility
            .park(ZoneRole::Projected, "V-1".to_string(), 900, 300)
            .unwrap();

        let refreshed = stats.recompute(&facility, on);
        assert_eq!(refreshed.total_rejections, 1);
        assert_eq!(refreshed.simulation_clock, 361);
        assert_eq!(refreshed.projected.occupied, 1);
        assert!((refreshed.overall_occupancy_rate - 100.0 / 74.0).abs() < 1e-9);
    }

    #[test]
    fn test_reserved_counted_only_when_enabled() {
        let mut facility = layout(2, 0, 0);
        facility
            .zone_by_id_mut("internal")
            .and_then(|z| z.space_mut("I-1"))
            .unwrap()
            .reserve()
            .unwrap();
        let stats = SimulationStatistics::new(360, 1320, &facility, CountingRules::default());
        assert_eq!(stats.internal.occupied, 0);

        let rules = CountingRules {
            projected_enabled: false,
            reservations_enabled: true,
        };
        assert_eq!(stats.recompute(&facility, rules).internal.occupied, 1);
    }
}

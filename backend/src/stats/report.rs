//! Chart-ready reports derived from statistics

use super::SimulationStatistics;
use serde::{Deserialize, Serialize};

/// Default histogram bin width (minutes)
pub const DEFAULT_BIN_MINUTES: u32 = 60;

/// One histogram bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBin {
    /// `lo-hi min`
    pub label: String,
    pub lower: u32,
    pub upper: u32,
    pub count: u64,
}

/// Histogram of completed parking durations.
///
/// Bins are `bin_minutes` wide and cover up to the longest duration, so
/// each duration is counted in the bin whose label contains it. Without
/// data a single empty bin is returned.
///
/// # Example
/// ```
/// use parking_simulator_core_rs::stats::duration_histogram;
///
/// let bins = duration_histogram(&[30, 90, 100, 120], 60);
/// assert_eq!(bins.len(), 3);
/// assert_eq!(bins[0].label, "0-59 min");
/// assert_eq!(bins[1].count, 2);
/// assert_eq!(bins[2].label, "120-179 min");
/// ```
pub fn duration_histogram(durations: &[u32], bin_minutes: u32) -> Vec<DurationBin> {
    let width = bin_minutes.max(1);
    let max = durations.iter().copied().max().unwrap_or(0);
    let num_bins = max / width + 1;

    let mut bins: Vec<DurationBin> = (0..num_bins)
        .map(|i| DurationBin {
            label: format!("{}-{} min", i * width, (i + 1) * width - 1),
            lower: i * width,
            upper: (i + 1) * width - 1,
            count: 0,
        })
        .collect();

    for &duration in durations {
        let index = (duration / width) as usize;
        bins[index].count += 1;
    }
    bins
}

/// Occupied vs free spaces summed over active zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyBreakdown {
    pub occupied: u64,
    pub free: u64,
}

impl OccupancyBreakdown {
    pub fn from_statistics(stats: &SimulationStatistics) -> Self {
        let occupied = stats.active_zones().map(|z| z.occupied.max(0) as u64).sum::<u64>();
        let capacity = stats.active_zones().map(|z| z.capacity as u64).sum::<u64>();
        Self {
            occupied,
            free: capacity.saturating_sub(occupied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_histogram_has_one_bin() {
        let bins = duration_histogram(&[], DEFAULT_BIN_MINUTES);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].label, "0-59 min");
        assert_eq!(bins[0].count, 0);
    }

    #[test]
    fn test_bin_edge_counted_under_matching_label() {
        let bins = duration_histogram(&[300, 299, 1], 60);
        assert_eq!(bins.len(), 6);
        assert_eq!(bins[5].label, "300-359 min");
        assert_eq!(bins[5].count, 1);
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins[0].count, 1);
        for bin in &bins {
            assert_eq!(bin.label, format!("{}-{} min", bin.lower, bin.upper));
        }
    }
}

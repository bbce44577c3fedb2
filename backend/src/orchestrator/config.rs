//! Simulation parameters and parameter updates
//!
//! Parameters deserialize with `#[serde(default)]`, so a partial JSON
//! document overrides only the fields it names:
//!
//! ```rust
//! use parking_simulator_core_rs::orchestrator::SimulationParameters;
//!
//! let params: SimulationParameters =
//!     serde_json::from_str(r#"{ "enable_projected_zone": true }"#).unwrap();
//! assert!(params.enable_projected_zone);
//! assert_eq!(params.simulation_start_time, 360);
//! assert!(params.validate().is_ok());
//! ```

use super::engine::SimulationError;
use crate::arrivals::{ArrivalSchedule, EveningPeakConfig};
use crate::chi_square::ChiSquareTest;
use crate::core::time::MINUTES_PER_DAY;
use crate::models::FacilityLayout;
use crate::policy::AllocationPolicyConfig;
use crate::rng::{McgParams, PrngConfig, PrngMethod};
use serde::{Deserialize, Serialize};

/// Allowed real-time pacing range (ticks per second)
pub const TICK_RATE_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

// ============================================================================
// Parameters
// ============================================================================

/// Complete simulation configuration
///
/// Immutable while a tick runs. Changes go through
/// [`ParkingSimulator::update_parameter`](super::ParkingSimulator::update_parameter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Inter-arrival means per time band
    pub arrivals: ArrivalSchedule,

    /// Mean parking duration (minutes)
    pub parking_duration_mean: f64,

    /// Parking duration standard deviation (minutes)
    pub parking_duration_std_dev: f64,

    /// Count Reserved spaces as occupied and let them depart
    pub enable_reservations: bool,

    /// Let the projected zone take part in allocation and reporting
    pub enable_projected_zone: bool,

    /// Real-time pacing for external drivers (ticks per second)
    pub tick_rate: u32,

    pub prng: PrngConfig,

    /// Chi-square sample count (N)
    pub chi_square_sample_size: usize,

    /// Chi-square bin count (K)
    pub chi_square_num_bins: usize,

    /// Opening minute (from midnight)
    pub simulation_start_time: u32,

    /// Closing minute (from midnight, inclusive)
    pub simulation_end_time: u32,

    pub allocation_policy: AllocationPolicyConfig,

    pub layout: FacilityLayout,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            arrivals: ArrivalSchedule::default(),
            parking_duration_mean: 300.0,
            parking_duration_std_dev: 60.0,
            enable_reservations: false,
            enable_projected_zone: false,
            tick_rate: 10,
            prng: PrngConfig::default(),
            chi_square_sample_size: 1000,
            chi_square_num_bins: 10,
            simulation_start_time: 6 * 60,
            simulation_end_time: 22 * 60,
            allocation_policy: AllocationPolicyConfig::default(),
            layout: FacilityLayout::default(),
        }
    }
}

impl SimulationParameters {
    /// Check every field. Nothing is mutated.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.simulation_start_time >= self.simulation_end_time {
            return Err(invalid(format!(
                "start time {} must be before end time {}",
                self.simulation_start_time, self.simulation_end_time
            )));
        }
        if self.simulation_end_time > MINUTES_PER_DAY {
            return Err(invalid(format!(
                "end time {} is past midnight",
                self.simulation_end_time
            )));
        }

        for mean in self.arrivals.means() {
            if !(mean.is_finite() && mean > 0.0) {
                return Err(invalid(format!("arrival mean must be positive, got {}", mean)));
            }
        }
        let morning_peak = self.arrivals.morning_peak;
        if morning_peak.start >= morning_peak.end {
            return Err(invalid("morning peak window is empty".to_string()));
        }
        if let Some(evening) = &self.arrivals.evening_peak {
            if evening.window.start >= evening.window.end {
                return Err(invalid("evening peak window is empty".to_string()));
            }
            if evening.window.start < morning_peak.end {
                return Err(invalid(
                    "evening peak must start after the morning peak ends".to_string(),
                ));
            }
        }

        let day = f64::from(MINUTES_PER_DAY);
        if !(self.parking_duration_mean > 0.0 && self.parking_duration_mean <= day) {
            return Err(invalid(format!(
                "parking duration mean must be within (0, {}], got {}",
                MINUTES_PER_DAY, self.parking_duration_mean
            )));
        }
        if !(self.parking_duration_std_dev >= 0.0 && self.parking_duration_std_dev <= day) {
            return Err(invalid(format!(
                "parking duration std dev must be within [0, {}], got {}",
                MINUTES_PER_DAY, self.parking_duration_std_dev
            )));
        }

        if !TICK_RATE_RANGE.contains(&self.tick_rate) {
            return Err(invalid(format!(
                "tick rate must be within {:?}, got {}",
                TICK_RATE_RANGE, self.tick_rate
            )));
        }

        if self.prng.method == PrngMethod::MixedCongruential && self.prng.mcg.m == 0 {
            return Err(invalid("MCG modulus must be positive".to_string()));
        }

        self.chi_square_test().validate().map_err(invalid)?;

        for p in self.allocation_policy.probabilities() {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!(
                    "allocation probability must be within [0, 1], got {}",
                    p
                )));
            }
        }

        Ok(())
    }

    /// Chi-square request for the configured generator.
    ///
    /// The seed is passed only for seedable methods, and MCG parameters only
    /// for the mixed congruential generator.
    pub fn chi_square_test(&self) -> ChiSquareTest {
        let method = self.prng.method;
        ChiSquareTest {
            sample_size: self.chi_square_sample_size,
            num_bins: self.chi_square_num_bins,
            method,
            seed: method.is_seedable().then_some(self.prng.seed),
            mcg: (method == PrngMethod::MixedCongruential).then_some(self.prng.mcg),
        }
    }
}

fn invalid(msg: String) -> SimulationError {
    SimulationError::InvalidConfig(msg)
}

// ============================================================================
// Parameter Updates
// ============================================================================

/// Change to a single parameter
///
/// Serialized as `{"key": "...", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum ParameterUpdate {
    MorningArrivalMean(f64),
    PeakArrivalMean(f64),
    AfternoonArrivalMean(f64),
    EveningPeak(Option<EveningPeakConfig>),
    ParkingDurationMean(f64),
    ParkingDurationStdDev(f64),
    EnableReservations(bool),
    EnableProjectedZone(bool),
    TickRate(u32),
    PrngMethod(PrngMethod),
    PrngSeed(i64),
    McgParams(McgParams),
    ChiSquareSampleSize(usize),
    ChiSquareNumBins(usize),
    SimulationStartTime(u32),
    SimulationEndTime(u32),
    AllocationPolicy(AllocationPolicyConfig),
    Layout(FacilityLayout),
}

/// What the engine does after accepting an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateEffect {
    /// Rebuild clock, zones, counters, event log and generator
    /// (only while Configured)
    FullReset,
    /// Re-derive occupancy figures without touching counters or zones
    Recompute,
    /// Picked up by subsequent ticks
    Deferred,
}

impl ParameterUpdate {
    pub fn effect(&self) -> UpdateEffect {
        match self {
            ParameterUpdate::SimulationStartTime(_)
            | ParameterUpdate::SimulationEndTime(_)
            | ParameterUpdate::PrngMethod(_)
            | ParameterUpdate::PrngSeed(_)
            | ParameterUpdate::McgParams(_)
            | ParameterUpdate::Layout(_) => UpdateEffect::FullReset,
            ParameterUpdate::EnableReservations(_) | ParameterUpdate::EnableProjectedZone(_) => {
                UpdateEffect::Recompute
            }
            _ => UpdateEffect::Deferred,
        }
    }

    /// Whether the update touches generator configuration
    pub fn is_prng_related(&self) -> bool {
        matches!(
            self,
            ParameterUpdate::PrngMethod(_)
                | ParameterUpdate::PrngSeed(_)
                | ParameterUpdate::McgParams(_)
        )
    }

    /// Write the new value into `params`
    pub fn apply(&self, params: &mut SimulationParameters) {
        match self.clone() {
            ParameterUpdate::MorningArrivalMean(v) => params.arrivals.morning_arrival_mean = v,
            ParameterUpdate::PeakArrivalMean(v) => params.arrivals.peak_arrival_mean = v,
            ParameterUpdate::AfternoonArrivalMean(v) => params.arrivals.afternoon_arrival_mean = v,
            ParameterUpdate::EveningPeak(v) => params.arrivals.evening_peak = v,
            ParameterUpdate::ParkingDurationMean(v) => params.parking_duration_mean = v,
            ParameterUpdate::ParkingDurationStdDev(v) => params.parking_duration_std_dev = v,
            ParameterUpdate::EnableReservations(v) => params.enable_reservations = v,
            ParameterUpdate::EnableProjectedZone(v) => params.enable_projected_zone = v,
            ParameterUpdate::TickRate(v) => params.tick_rate = v,
            ParameterUpdate::PrngMethod(v) => params.prng.method = v,
            ParameterUpdate::PrngSeed(v) => params.prng.seed = v,
            ParameterUpdate::McgParams(v) => params.prng.mcg = v,
            ParameterUpdate::ChiSquareSampleSize(v) => params.chi_square_sample_size = v,
            ParameterUpdate::ChiSquareNumBins(v) => params.chi_square_num_bins = v,
            ParameterUpdate::SimulationStartTime(v) => params.simulation_start_time = v,
            ParameterUpdate::SimulationEndTime(v) => params.simulation_end_time = v,
            ParameterUpdate::AllocationPolicy(v) => params.allocation_policy = v,
            ParameterUpdate::Layout(v) => params.layout = v,
        }
    }
}

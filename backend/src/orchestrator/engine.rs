//! Parking Simulator Engine
//!
//! Main simulation loop integrating all components:
//! - Departures (spaces whose stay has expired)
//! - Arrivals (exponential inter-arrival countdown, time-of-day bands)
//! - Zone allocation (pluggable [`AllocationPolicy`])
//! - Statistics (pure fold after every tick)
//! - Event logging (bounded display log plus per-tick event lists)
//!
//! # Architecture
//!
//! ```text
//! Configured ──start──▶ Running ──pause──▶ Paused
//!     ▲                  │   ▲               │
//!     │                  │   └────start──────┘
//!     │                  ▼
//!     └────reset──── Finished
//! ```
//!
//! For each tick (one simulated minute) at clock `t`:
//! ```text
//! 1. t' = t + 1; past closing → Finished
//! 2. Free every space due at t
//! 3. Countdown exhausted → one arrival attempt at t', resample countdown
//!    otherwise → decrement countdown
//! 4. Fold departures and attempts into statistics
//! 5. t' == closing → Finished
//! ```
//!
//! # Example
//!
//! ```rust
//! use parking_simulator_core_rs::orchestrator::{EngineState, ParkingSimulator, SimulationParameters};
//! use parking_simulator_core_rs::rng::PrngMethod;
//!
//! let mut params = SimulationParameters::default();
//! params.prng.method = PrngMethod::Lcg;
//! params.prng.seed = 12345;
//!
//! let mut sim = ParkingSimulator::new(params).unwrap();
//! sim.start().unwrap();
//!
//! for _ in 0..60 {
//!     let result = sim.tick().unwrap();
//!     assert_eq!(result.minute, result.statistics.simulation_clock);
//! }
//! assert_eq!(sim.clock().current(), 420);
//! assert_eq!(sim.engine_state(), EngineState::Running);
//! ```

use super::config::{ParameterUpdate, SimulationParameters, UpdateEffect};
use crate::chi_square::{ChiSquareResult, ChiSquareTest};
use crate::core::time::SimulationClock;
use crate::models::{Event, EventLog, Facility, ParkingZone, SpaceError, SpaceStatus};
use crate::policy::{AllocationPolicy, ZoneAvailability};
use crate::rng::PrngProvider;
use crate::stats::{aggregate, ArrivalAttempt, CountingRules, SimulationStatistics, TickActivity};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Engine State & Errors
// ============================================================================

/// Lifecycle of one simulated day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Reset and ready; no tick processed since
    Configured,
    Running,
    Paused,
    /// Closing time reached; terminal until reset
    Finished,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Configured => "configured",
            EngineState::Running => "running",
            EngineState::Paused => "paused",
            EngineState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Operation not allowed in the current engine state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: EngineState,
    },

    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    #[error("Unknown space {space} in zone {zone}")]
    UnknownSpace { zone: String, space: String },

    #[error("Space {space} in zone {zone} is not free")]
    SpaceUnavailable { zone: String, space: String },

    /// Space bookkeeping failed during allocation
    #[error("Space error: {0}")]
    Space(#[from] SpaceError),
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    /// Clock after the tick
    pub minute: u32,

    /// Events produced by this tick, in order
    pub events: Vec<Event>,

    /// Statistics after the tick
    pub statistics: SimulationStatistics,

    pub state: EngineState,
}

/// Read-only view for collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub state: EngineState,
    pub clock: u32,
    /// Active zones only
    pub zones: Vec<ParkingZone>,
    pub statistics: SimulationStatistics,
}

// ============================================================================
// Parking Simulator
// ============================================================================

/// Owns all simulation state and drives the tick loop
///
/// # Determinism
///
/// All randomness goes through the owned [`PrngProvider`]. Same seedable
/// method + seed + parameters = identical event sequence.
pub struct ParkingSimulator {
    params: SimulationParameters,

    state: EngineState,

    clock: SimulationClock,

    facility: Facility,

    rng: PrngProvider,

    policy: Box<dyn AllocationPolicy>,

    statistics: SimulationStatistics,

    event_log: EventLog,

    /// Ticks until the next arrival attempt; `<= 0` means due
    next_arrival_due: i64,

    /// Latest chi-square result, cleared by resets
    last_chi_square: Option<ChiSquareResult>,
}

impl ParkingSimulator {
    /// Create a simulator in the Configured state
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `params` fails validation.
    pub fn new(params: SimulationParameters) -> Result<Self, SimulationError> {
        params.validate()?;

        if !params.prng.method.is_seedable() {
            warn!("using the system generator; runs are not reproducible");
        }

        let clock = SimulationClock::new(params.simulation_start_time, params.simulation_end_time);
        let facility = Facility::new(params.layout);
        let rules = counting_rules(&params);
        let statistics = SimulationStatistics::new(
            params.simulation_start_time,
            params.simulation_end_time,
            &facility,
            rules,
        );

        Ok(Self {
            rng: PrngProvider::from_config(&params.prng),
            policy: params.allocation_policy.build(),
            state: EngineState::Configured,
            clock,
            facility,
            statistics,
            event_log: EventLog::new(),
            next_arrival_due: 0,
            last_chi_square: None,
            params,
        })
    }

    /// Replace the parameters and reinitialize everything
    ///
    /// Validation happens first; on error nothing changes.
    pub fn configure(&mut self, params: SimulationParameters) -> Result<(), SimulationError> {
        params.validate()?;
        self.params = params;
        self.reinitialize();
        info!("simulation configured");
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn engine_state(&self) -> EngineState {
        self.state
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    pub fn statistics(&self) -> &SimulationStatistics {
        &self.statistics
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn prng(&self) -> &PrngProvider {
        &self.rng
    }

    pub fn next_arrival_due(&self) -> i64 {
        self.next_arrival_due
    }

    pub fn last_chi_square(&self) -> Option<&ChiSquareResult> {
        self.last_chi_square.as_ref()
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn is_finished(&self) -> bool {
        self.state == EngineState::Finished
    }

    /// Zones, statistics and clock for display
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            state: self.state,
            clock: self.clock.current(),
            zones: self
                .facility
                .active_zones(self.params.enable_projected_zone)
                .cloned()
                .collect(),
            statistics: self.statistics.clone(),
        }
    }

    // ========================================================================
    // State Machine
    // ========================================================================

    /// Start or resume.
    ///
    /// Past closing time the start is refused: a `StartRefused` event is
    /// emitted and the engine moves to Finished. Returns the events produced.
    pub fn start(&mut self) -> Result<Vec<Event>, SimulationError> {
        if self.state == EngineState::Running {
            return Err(self.invalid_state("start"));
        }

        let resuming = self.state == EngineState::Paused;
        let mut events = Vec::new();

        if self.clock.at_or_past_end() {
            info!("start refused: closing time {} reached", self.clock);
            self.state = EngineState::Finished;
            events.push(Event::StartRefused {
                minute: self.clock.current(),
            });
            self.log_events(&events);
            return Ok(events);
        }

        if self.clock.snap_to_start() {
            events.push(Event::ClockAdjusted {
                minute: self.clock.current(),
            });
        }

        self.state = EngineState::Running;
        events.push(Event::Started {
            minute: self.clock.current(),
        });

        // A resumed run keeps a pending countdown; an exhausted one is reseeded
        if !resuming || self.next_arrival_due <= 0 {
            self.next_arrival_due = self.sample_arrival_gap(self.clock.current());
        }

        info!(
            "simulation running at {} (next arrival in {} min)",
            self.clock, self.next_arrival_due
        );
        self.log_events(&events);
        Ok(events)
    }

    /// Suspend ticking; state is kept as is
    pub fn pause(&mut self) -> Result<Vec<Event>, SimulationError> {
        if self.state != EngineState::Running {
            return Err(self.invalid_state("pause"));
        }
        self.state = EngineState::Paused;
        info!("simulation paused at {}", self.clock);

        let events = vec![Event::Paused {
            minute: self.clock.current(),
        }];
        self.log_events(&events);
        Ok(events)
    }

    /// Full reset with the current parameters
    pub fn reset(&mut self) -> Vec<Event> {
        self.reinitialize();
        info!("simulation reset");
        let events = vec![Event::Reset {
            minute: self.clock.current(),
            to_defaults: false,
        }];
        self.log_events(&events);
        events
    }

    /// Restore default parameters, then full reset
    pub fn reset_to_defaults(&mut self) -> Vec<Event> {
        self.params = SimulationParameters::default();
        self.reinitialize();
        info!("simulation reset to default parameters");
        let events = vec![Event::Reset {
            minute: self.clock.current(),
            to_defaults: true,
        }];
        self.log_events(&events);
        events
    }

    // ========================================================================
    // Tick Loop
    // ========================================================================

    /// Execute one simulation tick (one simulated minute)
    ///
    /// # Returns
    ///
    /// * `Ok(TickResult)` - events and statistics of this tick; empty once
    ///   Finished
    /// * `Err(SimulationError::InvalidState)` - engine is Configured or Paused
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        match self.state {
            EngineState::Running => {}
            EngineState::Finished => return Ok(self.tick_result(Vec::new())),
            _ => return Err(self.invalid_state("tick")),
        }

        let previous = self.clock.current();
        let minute = self.clock.peek_next();

        if minute > self.clock.end() {
            self.state = EngineState::Finished;
            info!("closing time {} passed; simulation finished", self.clock);
            let events = vec![Event::Finished { minute: previous }];
            self.log_events(&events);
            return Ok(self.tick_result(events));
        }

        self.clock.advance();
        trace!("tick {}", self.clock);

        let mut events = Vec::new();
        let mut activity = TickActivity::default();

        // STEP 1: DEPARTURES
        // Due against the clock before this tick's increment
        for departure in self
            .facility
            .release_due(previous, self.params.enable_reservations)
        {
            let duration = departure
                .duration
                .unwrap_or_else(|| self.params.parking_duration_mean.round() as u32);
            debug!(
                "{} left {} space {} after {} min",
                departure.vehicle_id.as_deref().unwrap_or("N/A"),
                departure.zone_id,
                departure.space_id,
                duration
            );
            activity.departed_durations.push(duration);
            events.push(Event::Departure {
                minute,
                vehicle_id: departure.vehicle_id,
                zone_id: departure.zone_id,
                space_id: departure.space_id,
                duration: departure.duration,
            });
        }

        // STEP 2: ARRIVALS
        if self.next_arrival_due <= 0 {
            let event = self.attempt_arrival(minute)?;
            activity.attempts.push(ArrivalAttempt {
                minute,
                admitted: matches!(event, Event::Arrival { .. }),
            });
            events.push(event);
            self.next_arrival_due = self.sample_arrival_gap(minute);
        } else {
            self.next_arrival_due -= 1;
        }

        // STEP 3: STATISTICS
        self.statistics = aggregate(
            &self.statistics,
            &activity,
            &self.facility,
            counting_rules(&self.params),
            minute,
        );

        // STEP 4: CLOSING TIME
        if self.clock.at_or_past_end() {
            self.state = EngineState::Finished;
            info!("closing time {} reached; simulation finished", self.clock);
            events.push(Event::Finished { minute });
        }

        self.log_events(&events);
        Ok(self.tick_result(events))
    }

    /// Start if needed and tick until Finished. Returns every tick event.
    pub fn run_to_end(&mut self) -> Result<Vec<Event>, SimulationError> {
        if matches!(self.state, EngineState::Configured | EngineState::Paused) {
            self.start()?;
        }
        let mut events = Vec::new();
        while self.state == EngineState::Running {
            events.extend(self.tick()?.events);
        }
        Ok(events)
    }

    /// One allocation attempt against the post-departure zone state
    fn attempt_arrival(&mut self, minute: u32) -> Result<Event, SimulationError> {
        let availability =
            ZoneAvailability::from_facility(&self.facility, self.params.enable_projected_zone);
        let candidates = self.policy.candidates(&availability, &mut self.rng);
        let vehicle_id = format!("V-{}", self.statistics.admitted() + 1);

        for role in candidates {
            if self.facility.zone(role).free_count() == 0 {
                continue;
            }
            let duration = self.sample_parking_duration();
            let departure_time = minute.saturating_add(duration);
            let placement =
                self.facility
                    .park(role, vehicle_id.clone(), departure_time, duration)?;
            if let Some(placement) = placement {
                debug!(
                    "{} parked in {} space {} for {} min",
                    vehicle_id, role, placement.space_id, duration
                );
                return Ok(Event::Arrival {
                    minute,
                    vehicle_id,
                    zone_id: role.id().to_string(),
                    space_id: placement.space_id,
                    duration,
                });
            }
        }

        let attempt = self.statistics.total_rejections + 1;
        debug!(
            "arrival rejected at minute {} ({} free in active zones)",
            minute,
            availability.total_free()
        );
        Ok(Event::Rejection { minute, attempt })
    }

    /// `max(1, round(normal(mean, sd)))`
    fn sample_parking_duration(&mut self) -> u32 {
        let sampled = self.rng.normal(
            self.params.parking_duration_mean,
            self.params.parking_duration_std_dev,
        );
        sampled.round().max(1.0) as u32
    }

    fn sample_arrival_gap(&mut self, minute: u32) -> i64 {
        self.params.arrivals.sample_gap(minute, &mut self.rng) as i64
    }

    // ========================================================================
    // Chi-Square, Parameters, Reservations
    // ========================================================================

    /// Run a chi-square test on a borrowed generator
    ///
    /// The live stream is restored afterwards. Not allowed while Running.
    pub fn run_chi_square_test(
        &mut self,
        test: &ChiSquareTest,
    ) -> Result<ChiSquareResult, SimulationError> {
        if self.state == EngineState::Running {
            return Err(self.invalid_state("run a chi-square test"));
        }

        let result = test.run(&mut self.rng);
        info!(
            "chi-square test for {}: {}",
            test.method, result.interpretation
        );

        self.log_events(&[Event::ChiSquareCompleted {
            minute: self.clock.current(),
            method: test.method,
            sample_size: test.sample_size,
            num_bins: test.num_bins,
            statistic: result.statistic,
        }]);
        self.last_chi_square = Some(result.clone());
        Ok(result)
    }

    /// Chi-square test of the configured generator, N and K
    pub fn run_configured_chi_square_test(&mut self) -> Result<ChiSquareResult, SimulationError> {
        let test = self.params.chi_square_test();
        self.run_chi_square_test(&test)
    }

    /// Change one parameter
    ///
    /// The new parameter set is validated before anything changes. While
    /// Configured, time-window, generator and layout changes reset the
    /// simulation; in other states they wait for the next reset. Counting
    /// toggles refresh the occupancy figures in every state.
    pub fn update_parameter(
        &mut self,
        update: ParameterUpdate,
    ) -> Result<SimulationStatistics, SimulationError> {
        let mut candidate = self.params.clone();
        update.apply(&mut candidate);
        candidate.validate()?;

        debug!("parameter update accepted: {:?}", update);
        self.params = candidate;

        if matches!(update, ParameterUpdate::AllocationPolicy(_)) {
            self.policy = self.params.allocation_policy.build();
        }
        if update.is_prng_related() {
            self.last_chi_square = None;
        }

        match update.effect() {
            UpdateEffect::FullReset if self.state == EngineState::Configured => {
                self.reinitialize();
                info!("parameters changed; simulation reinitialized");
            }
            UpdateEffect::FullReset => {
                info!(
                    "parameter change deferred until reset (simulation {})",
                    self.state
                );
            }
            UpdateEffect::Recompute => {
                self.statistics = self
                    .statistics
                    .recompute(&self.facility, counting_rules(&self.params));
            }
            UpdateEffect::Deferred => {}
        }

        Ok(self.statistics.clone())
    }

    /// Mark a Free space Reserved
    pub fn reserve_space(&mut self, zone_id: &str, space_id: &str) -> Result<(), SimulationError> {
        let zone = self
            .facility
            .zone_by_id_mut(zone_id)
            .ok_or_else(|| SimulationError::UnknownZone(zone_id.to_string()))?;
        let space = zone
            .space_mut(space_id)
            .ok_or_else(|| SimulationError::UnknownSpace {
                zone: zone_id.to_string(),
                space: space_id.to_string(),
            })?;
        if space.status() != SpaceStatus::Free {
            return Err(SimulationError::SpaceUnavailable {
                zone: zone_id.to_string(),
                space: space_id.to_string(),
            });
        }
        space.reserve()?;
        debug!("space {} in {} reserved", space_id, zone_id);

        self.statistics = self
            .statistics
            .recompute(&self.facility, counting_rules(&self.params));
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Rebuild clock, zones, statistics, log and generator from `params`
    fn reinitialize(&mut self) {
        let params = &self.params;
        self.clock = SimulationClock::new(params.simulation_start_time, params.simulation_end_time);
        self.facility = Facility::new(params.layout);
        self.rng = PrngProvider::from_config(&params.prng);
        self.policy = params.allocation_policy.build();
        self.statistics = SimulationStatistics::new(
            params.simulation_start_time,
            params.simulation_end_time,
            &self.facility,
            counting_rules(params),
        );
        self.event_log.clear();
        self.next_arrival_due = 0;
        self.last_chi_square = None;
        self.state = EngineState::Configured;
    }

    fn log_events(&mut self, events: &[Event]) {
        for event in events {
            self.event_log.log(event.clone());
        }
    }

    fn tick_result(&self, events: Vec<Event>) -> TickResult {
        TickResult {
            minute: self.clock.current(),
            events,
            statistics: self.statistics.clone(),
            state: self.state,
        }
    }

    fn invalid_state(&self, operation: &'static str) -> SimulationError {
        SimulationError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

fn counting_rules(params: &SimulationParameters) -> CountingRules {
    CountingRules {
        projected_enabled: params.enable_projected_zone,
        reservations_enabled: params.enable_reservations,
    }
}

impl fmt::Debug for ParkingSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParkingSimulator")
            .field("state", &self.state)
            .field("clock", &self.clock.current())
            .field("policy", &self.policy.name())
            .field("prng", &self.rng.method())
            .field("next_arrival_due", &self.next_arrival_due)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrivals::ArrivalSchedule;
    use crate::models::FacilityLayout;
    use crate::rng::PrngMethod;

    fn seeded(seed: i64) -> SimulationParameters {
        let mut params = SimulationParameters::default();
        params.prng.method = PrngMethod::Lcg;
        params.prng.seed = seed;
        params
    }

    #[test]
    fn test_new_rejects_invalid_window() {
        let params = SimulationParameters {
            simulation_start_time: 700,
            simulation_end_time: 600,
            ..seeded(1)
        };
        assert!(matches!(
            ParkingSimulator::new(params),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_tick_requires_running() {
        let mut sim = ParkingSimulator::new(seeded(1)).unwrap();
        assert_eq!(
            sim.tick().unwrap_err(),
            SimulationError::InvalidState {
                operation: "tick",
                state: EngineState::Configured
            }
        );
    }

    #[test]
    fn test_start_seeds_countdown() {
        let mut sim = ParkingSimulator::new(seeded(1)).unwrap();
        assert_eq!(sim.next_arrival_due(), 0);
        let events = sim.start().unwrap();
        assert_eq!(events, vec![Event::Started { minute: 360 }]);
        assert!(sim.next_arrival_due() >= 1);
    }

    #[test]
    fn test_pause_requires_running() {
        let mut sim = ParkingSimulator::new(seeded(1)).unwrap();
        assert!(sim.pause().is_err());
        sim.start().unwrap();
        sim.pause().unwrap();
        assert_eq!(sim.engine_state(), EngineState::Paused);
        assert!(sim.tick().is_err());
    }

    #[test]
    fn test_chi_square_refused_while_running() {
        let mut sim = ParkingSimulator::new(seeded(1)).unwrap();
        sim.start().unwrap();
        assert!(matches!(
            sim.run_configured_chi_square_test(),
            Err(SimulationError::InvalidState { .. })
        ));
        sim.pause().unwrap();
        let result = sim.run_configured_chi_square_test().unwrap();
        assert!(result.is_computed());
        assert!(sim.last_chi_square().is_some());
    }

    #[test]
    fn test_vehicle_ids_follow_admissions() {
        let params = SimulationParameters {
            arrivals: ArrivalSchedule::constant(0.01),
            layout: FacilityLayout {
                internal: 5,
                external: 5,
                projected: 0,
            },
            ..seeded(3)
        };
        let mut sim = ParkingSimulator::new(params).unwrap();
        sim.start().unwrap();
        let mut ids = Vec::new();
        for _ in 0..20 {
            for event in sim.tick().unwrap().events {
                if let Event::Arrival { vehicle_id, .. } = event {
                    ids.push(vehicle_id);
                }
            }
        }
        let expected: Vec<String> = (1..=ids.len()).map(|n| format!("V-{}", n)).collect();
        assert_eq!(ids, expected);
        assert!(!ids.is_empty());
    }

    #[test]
    fn test_reserve_space_errors() {
        let mut sim = ParkingSimulator::new(seeded(1)).unwrap();
        assert_eq!(
            sim.reserve_space("basement", "B-1"),
            Err(SimulationError::UnknownZone("basement".to_string()))
        );
        assert!(matches!(
            sim.reserve_space("internal", "I-99"),
            Err(SimulationError::UnknownSpace { .. })
        ));
        sim.reserve_space("internal", "I-1").unwrap();
        assert!(matches!(
            sim.reserve_space("internal", "I-1"),
            Err(SimulationError::SpaceUnavailable { .. })
        ));
    }

    #[test]
    fn test_reset_to_defaults_restores_parameters() {
        let mut sim = ParkingSimulator::new(seeded(99)).unwrap();
        sim.update_parameter(ParameterUpdate::EnableProjectedZone(true))
            .unwrap();
        let events = sim.reset_to_defaults();
        assert_eq!(sim.parameters(), &SimulationParameters::default());
        assert_eq!(
            events,
            vec![Event::Reset {
                minute: 360,
                to_defaults: true
            }]
        );
        assert_eq!(sim.event_log().len(), 1);
    }
}

//! Parking Simulator Core - Rust Engine
//!
//! Discrete-event simulation of a multi-zone parking facility with
//! deterministic, swappable random number generation.
//!
//! # Architecture
//!
//! - **core**: Integer-minute simulation clock
//! - **rng**: Uniform generators (system, LCG, MCG, MT19937) and variate sampling
//! - **chi_square**: Goodness-of-fit test for the generators
//! - **models**: Domain types (spaces, zones, facility, events)
//! - **arrivals**: Time-of-day arrival schedule
//! - **policy**: Zone allocation policies
//! - **stats**: Statistics aggregation and chart-ready reports
//! - **orchestrator**: Parameters, state machine and tick loop
//!
//! # Critical Invariants
//!
//! 1. All randomness goes through one owned `PrngProvider`
//! 2. Same seedable method + seed + parameters = identical event sequence
//! 3. A rejected arrival is a counted outcome, never an error
//! 4. Validation happens before mutation; a rejected call changes nothing

// Module declarations
pub mod arrivals;
pub mod chi_square;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod rng;
pub mod stats;

// Re-exports for convenience
pub use arrivals::{ArrivalSchedule, TimeBand};
pub use chi_square::{ChiSquareOutcome, ChiSquareResult, ChiSquareTest, SignificanceLevel};
pub use core::time::SimulationClock;
pub use models::{
    event::{event_digest, Event, EventLog},
    facility::{Facility, FacilityLayout},
    zone::{ParkingZone, ZoneRole},
};
pub use orchestrator::{
    EngineState, ParameterUpdate, ParkingSimulator, SimulationError, SimulationParameters,
    TickResult,
};
pub use policy::AllocationPolicyConfig;
pub use rng::{McgParams, PrngMethod, PrngProvider};
pub use stats::SimulationStatistics;

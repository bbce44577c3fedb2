//! Orchestrator - parameters, state machine and tick loop
//!
//! See `engine.rs` for the tick loop and `config.rs` for parameters.

pub mod config;
pub mod engine;

// Re-export main types for convenience
pub use config::{ParameterUpdate, SimulationParameters, UpdateEffect, TICK_RATE_RANGE};
pub use engine::{
    EngineState, ParkingSimulator, SimulationError, SimulationSnapshot, TickResult,
};

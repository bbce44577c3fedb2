//! Deterministic random number generation
//!
//! Several interchangeable uniform generators behind one [`PrngProvider`],
//! plus the exponential and normal samplers built on top of it.
//! CRITICAL: All randomness in the simulator MUST go through this module.

mod congruential;
mod mersenne;
mod provider;
mod variates;

pub use congruential::{Lcg, McgParams, MixedCongruential, LCG_A, LCG_C, LCG_M};
pub use mersenne::MersenneTwister;
pub use provider::{PrngConfig, PrngMethod, PrngProvider, PrngSnapshot};

//! Swappable uniform generator
//!
//! [`PrngProvider`] owns exactly one active algorithm and hands out uniforms
//! in [0.0, 1.0). Reconfiguring discards the previous generator state; there
//! is no carry-over between methods.
//!
//! The provider is an explicit value owned by the engine. Code that needs to
//! borrow it for a different configuration (the chi-square tester) takes a
//! [`PrngSnapshot`] first and restores it afterwards, so the live stream
//! continues exactly where it stopped.

use super::congruential::{Lcg, McgParams, MixedCongruential};
use super::mersenne::MersenneTwister;
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Uniform generator algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrngMethod {
    /// Platform generator (`rand::thread_rng`). Not reproducible.
    #[default]
    Default,
    /// Fixed-constant linear congruential generator.
    Lcg,
    /// Congruential generator with caller-supplied a/c/m.
    MixedCongruential,
    /// MT19937.
    MersenneTwister,
}

impl PrngMethod {
    /// Whether a fixed seed yields a reproducible stream.
    pub fn is_seedable(self) -> bool {
        !matches!(self, PrngMethod::Default)
    }
}

impl fmt::Display for PrngMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrngMethod::Default => "Default",
            PrngMethod::Lcg => "LCG",
            PrngMethod::MixedCongruential => "MixedCongruential",
            PrngMethod::MersenneTwister => "Mersenne-Twister",
        };
        f.write_str(name)
    }
}

/// Serializable PRNG selection (part of the simulation parameters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrngConfig {
    pub method: PrngMethod,
    pub seed: i64,
    pub mcg: McgParams,
}

impl Default for PrngConfig {
    fn default() -> Self {
        Self {
            method: PrngMethod::Default,
            seed: 1,
            mcg: McgParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Generator {
    System,
    Lcg(Lcg),
    Mcg(MixedCongruential),
    Mt(MersenneTwister),
}

/// The active uniform generator.
///
/// # Example
/// ```
/// use parking_simulator_core_rs::rng::{PrngMethod, PrngProvider};
///
/// let mut a = PrngProvider::new(PrngMethod::MersenneTwister, Some(7), None);
/// let mut b = PrngProvider::new(PrngMethod::MersenneTwister, Some(7), None);
/// assert_eq!(a.next(), b.next());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PrngProvider {
    method: PrngMethod,
    seed: i64,
    mcg: McgParams,
    generator: Generator,
}

/// Complete copy of a provider's state: method, seed, MCG parameters and
/// generator registers.
#[derive(Debug, Clone, PartialEq)]
pub struct PrngSnapshot(PrngProvider);

impl Default for PrngProvider {
    fn default() -> Self {
        Self::from_config(&PrngConfig::default())
    }
}

impl PrngProvider {
    /// Create a provider for `method`.
    ///
    /// A missing seed is taken from the system clock, which makes the
    /// stream non-reproducible.
    pub fn new(method: PrngMethod, seed: Option<i64>, mcg: Option<McgParams>) -> Self {
        let mut provider = Self {
            method: PrngMethod::Default,
            seed: 1,
            mcg: McgParams::default(),
            generator: Generator::System,
        };
        provider.set(method, seed, mcg);
        provider
    }

    pub fn from_config(config: &PrngConfig) -> Self {
        Self::new(config.method, Some(config.seed), Some(config.mcg))
    }

    /// Reconfigure the active generator, discarding its previous state.
    pub fn set(&mut self, method: PrngMethod, seed: Option<i64>, mcg: Option<McgParams>) {
        let seed = seed.unwrap_or_else(|| {
            let seed = time_seed();
            if method.is_seedable() {
                warn!("no seed given for {}; using time-based seed {}", method, seed);
            }
            seed
        });
        let mcg = mcg.unwrap_or_default().normalized();

        self.generator = match method {
            PrngMethod::Default => Generator::System,
            PrngMethod::Lcg => Generator::Lcg(Lcg::new(seed)),
            PrngMethod::MixedCongruential => Generator::Mcg(MixedCongruential::new(seed, mcg)),
            PrngMethod::MersenneTwister => Generator::Mt(MersenneTwister::new(seed)),
        };
        self.method = method;
        self.seed = seed;
        self.mcg = mcg;
    }

    /// Draw a uniform in [0.0, 1.0).
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f64 {
        match &mut self.generator {
            Generator::System => rand::thread_rng().gen::<f64>(),
            Generator::Lcg(lcg) => lcg.next_f64(),
            Generator::Mcg(mcg) => mcg.next_f64(),
            Generator::Mt(mt) => mt.next_f64(),
        }
    }

    pub fn method(&self) -> PrngMethod {
        self.method
    }

    /// Seed the current generator was created with.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// MCG parameters (only meaningful for [`PrngMethod::MixedCongruential`]).
    pub fn mcg_params(&self) -> McgParams {
        self.mcg
    }

    pub fn snapshot(&self) -> PrngSnapshot {
        PrngSnapshot(self.clone())
    }

    pub fn restore(&mut self, snapshot: PrngSnapshot) {
        *self = snapshot.0;
    }
}

fn time_seed() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(1)
}

//! Congruential generators
//!
//! Both generators share the recurrence
//!
//! ```text
//! x_{n+1} = (a * x_n + c) mod m
//! u_{n+1} = x_{n+1} / m
//! ```
//!
//! [`Lcg`] fixes the Numerical Recipes constants (a = 1664525,
//! c = 1013904223, m = 2^32). [`MixedCongruential`] takes caller-supplied
//! parameters.
//!
//! # Determinism
//!
//! Same seed → same sequence. Arithmetic is carried out in `u128` so the
//! register never overflows for any `m` up to `u64::MAX`.

use serde::{Deserialize, Serialize};

/// Multiplier of the fixed LCG.
pub const LCG_A: u64 = 1_664_525;
/// Increment of the fixed LCG.
pub const LCG_C: u64 = 1_013_904_223;
/// Modulus of the fixed LCG (2^32).
pub const LCG_M: u64 = 1 << 32;

/// Largest `f64` strictly below 1.0.
pub(crate) const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Parameters of a mixed congruential generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct McgParams {
    pub a: u64,
    pub c: u64,
    pub m: u64,
}

impl Default for McgParams {
    fn default() -> Self {
        Self {
            a: LCG_A,
            c: LCG_C,
            m: LCG_M,
        }
    }
}

impl McgParams {
    /// Returns the parameters with `m = 0` replaced by 2^32.
    pub fn normalized(self) -> Self {
        let m = if self.m == 0 { LCG_M } else { self.m };
        Self { m, ..self }
    }
}

/// Linear congruential generator with fixed Numerical Recipes constants.
///
/// # Example
/// ```
/// use parking_simulator_core_rs::rng::Lcg;
///
/// let mut lcg = Lcg::new(1);
/// let u = lcg.next_f64();
/// assert_eq!(u, 1_015_568_748.0 / 4_294_967_296.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a new LCG.
    ///
    /// The seed is coerced to a positive register value: its absolute value
    /// reduced modulo 2^32, with 0 replaced by 1.
    pub fn new(seed: i64) -> Self {
        let state = seed.unsigned_abs() % LCG_M;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Advance the register and return it.
    pub fn next_u32(&mut self) -> u32 {
        self.state = step(self.state, LCG_A, LCG_C, LCG_M);
        self.state as u32
    }

    /// Generate the next uniform in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / LCG_M as f64
    }

    /// Current register value.
    pub fn state(&self) -> u64 {
        self.state
    }
}

/// Mixed congruential generator with configurable `a`, `c`, `m`.
///
/// # Example
/// ```
/// use parking_simulator_core_rs::rng::{McgParams, MixedCongruential};
///
/// let params = McgParams { a: 5, c: 3, m: 16 };
/// let mut mcg = MixedCongruential::new(7, params);
/// assert_eq!(mcg.next_f64(), 6.0 / 16.0); // (5*7 + 3) mod 16 = 6
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedCongruential {
    params: McgParams,
    state: u64,
}

impl MixedCongruential {
    /// Create a new generator.
    ///
    /// `m = 0` falls back to 2^32. The seed is reduced to its non-negative
    /// residue modulo `m`.
    pub fn new(seed: i64, params: McgParams) -> Self {
        let params = params.normalized();
        let m = params.m as i128;
        let state = ((seed as i128 % m) + m) % m;
        Self {
            params,
            state: state as u64,
        }
    }

    /// Advance the register and return it.
    pub fn next_u64(&mut self) -> u64 {
        let McgParams { a, c, m } = self.params;
        self.state = step(self.state, a, c, m);
        self.state
    }

    /// Generate the next uniform in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let x = self.next_u64();
        let u = x as f64 / self.params.m as f64;
        // x / m can round up to 1.0 once m exceeds 2^53
        if u >= 1.0 {
            BELOW_ONE
        } else {
            u
        }
    }

    pub fn params(&self) -> McgParams {
        self.params
    }

    pub fn state(&self) -> u64 {
        self.state
    }
}

fn step(x: u64, a: u64, c: u64, m: u64) -> u64 {
    let m = m as u128;
    let a = a as u128 % m;
    let c = c as u128 % m;
    ((a * (x as u128 % m) + c) % m) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_zero_seed_becomes_one() {
        assert_eq!(Lcg::new(0).state(), 1);
    }

    #[test]
    fn test_lcg_negative_seed_uses_absolute_value() {
        let mut a = Lcg::new(-42);
        let mut b = Lcg::new(42);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn test_lcg_seed_reduced_mod_2_32() {
        let mut a = Lcg::new((1i64 << 32) + 5);
        let mut b = Lcg::new(5);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn test_mcg_zero_modulus_defaults() {
        let mcg = MixedCongruential::new(1, McgParams { a: 3, c: 1, m: 0 });
        assert_eq!(mcg.params().m, LCG_M);
    }

    #[test]
    fn test_mcg_negative_seed_normalized() {
        let mcg = MixedCongruential::new(-3, McgParams { a: 5, c: 3, m: 16 });
        assert_eq!(mcg.state(), 13);
    }

    #[test]
    fn test_mcg_matches_lcg_with_default_params() {
        let mut lcg = Lcg::new(2024);
        let mut mcg = MixedCongruential::new(2024, McgParams::default());
        for _ in 0..100 {
            assert_eq!(lcg.next_f64(), mcg.next_f64());
        }
    }

    #[test]
    fn test_mcg_huge_modulus_stays_below_one() {
        let params = McgParams {
            a: 1,
            c: u64::MAX - 2,
            m: u64::MAX,
        };
        let mut mcg = MixedCongruential::new(1, params);
        for _ in 0..10 {
            let u = mcg.next_f64();
            assert!((0.0..1.0).contains(&u), "{} outside [0, 1)", u);
        }
    }
}

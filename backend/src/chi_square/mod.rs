//! Chi-square goodness-of-fit test for the uniform generators.
//!
//! Draws N samples from a requested generator configuration, bins them into
//! K equal-width intervals over [0, 1) and computes Pearson's statistic
//! against the uniform expectation N/K.
//!
//! The live provider is borrowed for the draw: its complete state is
//! snapshotted first and restored afterwards, so a simulation stream in
//! progress is left untouched.
//!
//! # Example
//!
//! ```
//! use parking_simulator_core_rs::chi_square::{ChiSquareOutcome, ChiSquareTest};
//! use parking_simulator_core_rs::rng::{PrngMethod, PrngProvider};
//!
//! let mut live = PrngProvider::new(PrngMethod::Lcg, Some(1), None);
//! let test = ChiSquareTest {
//!     sample_size: 1000,
//!     num_bins: 10,
//!     method: PrngMethod::MersenneTwister,
//!     seed: Some(42),
//!     mcg: None,
//! };
//! let result = test.run(&mut live);
//! assert_eq!(result.outcome, ChiSquareOutcome::Computed);
//! assert_eq!(result.degrees_of_freedom, 9);
//! assert_eq!(live.method(), PrngMethod::Lcg);
//! ```

use crate::rng::{McgParams, PrngMethod, PrngProvider};
use log::debug;
use serde::{Deserialize, Serialize};

/// Minimum expected count per bin (N >= 5K).
pub const MIN_EXPECTED_PER_BIN: usize = 5;

/// A chi-square test request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareTest {
    /// Number of samples (N)
    pub sample_size: usize,
    /// Number of equal-width bins (K)
    pub num_bins: usize,
    pub method: PrngMethod,
    /// Seed for the tested generator (None = time-based / unseeded)
    pub seed: Option<i64>,
    /// a/c/m for [`PrngMethod::MixedCongruential`]
    pub mcg: Option<McgParams>,
}

/// Whether the statistic could be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChiSquareOutcome {
    Computed,
    /// N, K violate N > 0, K > 1, N >= 5K. No samples were drawn.
    InvalidInput { reason: String },
    /// Expected frequency per bin is zero.
    Degenerate { reason: String },
}

/// Result of a chi-square run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub sample_size: usize,
    pub num_bins: usize,
    pub degrees_of_freedom: usize,
    pub method: PrngMethod,
    pub seed_used: Option<i64>,
    pub mcg_params_used: Option<McgParams>,
    pub statistic: f64,
    pub observed_frequencies: Vec<u64>,
    pub expected_frequencies: Vec<f64>,
    pub interpretation: String,
    pub outcome: ChiSquareOutcome,
}

impl ChiSquareResult {
    pub fn is_computed(&self) -> bool {
        self.outcome == ChiSquareOutcome::Computed
    }

    /// Whether the statistic stays below the approximate critical value at
    /// `level`. Always false for a result that was not computed.
    pub fn passes(&self, level: SignificanceLevel) -> bool {
        self.is_computed() && self.statistic < critical_value(self.degrees_of_freedom, level)
    }
}

/// Upper-tail significance levels supported by [`critical_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignificanceLevel {
    /// alpha = 0.10
    P10,
    /// alpha = 0.05
    P05,
    /// alpha = 0.01
    P01,
}

impl SignificanceLevel {
    pub fn alpha(self) -> f64 {
        match self {
            SignificanceLevel::P10 => 0.10,
            SignificanceLevel::P05 => 0.05,
            SignificanceLevel::P01 => 0.01,
        }
    }

    /// Standard normal upper quantile z_(1-alpha).
    fn z(self) -> f64 {
        match self {
            SignificanceLevel::P10 => 1.281_551_565_5,
            SignificanceLevel::P05 => 1.644_853_626_9,
            SignificanceLevel::P01 => 2.326_347_874_0,
        }
    }
}

/// Approximate upper critical value of the chi-square distribution
/// (Wilson-Hilferty). Within 1% of table values for df >= 3.
pub fn critical_value(df: usize, level: SignificanceLevel) -> f64 {
    if df == 0 {
        return 0.0;
    }
    let k = df as f64;
    let h = 2.0 / (9.0 * k);
    k * (1.0 - h + level.z() * h.sqrt()).powi(3)
}

/// Bin for a uniform sample. A value of exactly 1.0 lands in the last bin.
pub fn bin_index(sample: f64, num_bins: usize) -> usize {
    let idx = (sample * num_bins as f64).floor();
    if idx < 0.0 {
        0
    } else {
        (idx as usize).min(num_bins - 1)
    }
}

impl ChiSquareTest {
    /// Check N > 0, K > 1, N >= 5K.
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_size == 0 || self.num_bins <= 1 {
            return Err(format!(
                "N must be greater than 0 and K greater than 1 (got N={}, K={})",
                self.sample_size, self.num_bins
            ));
        }
        if self.sample_size < self.num_bins * MIN_EXPECTED_PER_BIN {
            return Err(format!(
                "N must be at least {}*K for a valid test (got N={}, K={})",
                MIN_EXPECTED_PER_BIN, self.sample_size, self.num_bins
            ));
        }
        Ok(())
    }

    /// Run the test, borrowing `provider` and restoring it afterwards.
    pub fn run(&self, provider: &mut PrngProvider) -> ChiSquareResult {
        if let Err(reason) = self.validate() {
            return self.empty_result(0, None, Vec::new(), Vec::new(), ChiSquareOutcome::InvalidInput { reason });
        }

        let snapshot = provider.snapshot();
        let seed = if self.method.is_seedable() { self.seed } else { None };
        provider.set(self.method, seed, self.mcg);
        let seed_used = self.method.is_seedable().then(|| provider.seed());
        let samples: Vec<f64> = (0..self.sample_size).map(|_| provider.next()).collect();
        provider.restore(snapshot);

        let k = self.num_bins;
        let df = k - 1;
        let expected = self.sample_size as f64 / k as f64;
        let mut observed = vec![0u64; k];

        if expected == 0.0 {
            let reason = "expected frequency is 0; check N and K".to_string();
            return self.empty_result(
                df,
                seed_used,
                observed,
                vec![expected; k],
                ChiSquareOutcome::Degenerate { reason },
            );
        }

        for sample in samples {
            observed[bin_index(sample, k)] += 1;
        }

        let statistic: f64 = observed
            .iter()
            .map(|&o| (o as f64 - expected).powi(2) / expected)
            .sum();

        debug!(
            "chi-square {} N={} K={}: statistic {:.3}",
            self.method, self.sample_size, k, statistic
        );

        ChiSquareResult {
            sample_size: self.sample_size,
            num_bins: k,
            degrees_of_freedom: df,
            method: self.method,
            seed_used,
            mcg_params_used: self.mcg_used(),
            statistic,
            observed_frequencies: observed,
            expected_frequencies: vec![expected; k],
            interpretation: self.interpret(statistic, df, seed_used),
            outcome: ChiSquareOutcome::Computed,
        }
    }

    fn mcg_used(&self) -> Option<McgParams> {
        (self.method == PrngMethod::MixedCongruential)
            .then(|| self.mcg.unwrap_or_default().normalized())
    }

    fn empty_result(
        &self,
        df: usize,
        seed_used: Option<i64>,
        observed: Vec<u64>,
        expected: Vec<f64>,
        outcome: ChiSquareOutcome,
    ) -> ChiSquareResult {
        let interpretation = match &outcome {
            ChiSquareOutcome::InvalidInput { reason } | ChiSquareOutcome::Degenerate { reason } => {
                reason.clone()
            }
            ChiSquareOutcome::Computed => String::new(),
        };
        ChiSquareResult {
            sample_size: self.sample_size,
            num_bins: self.num_bins,
            degrees_of_freedom: df,
            method: self.method,
            seed_used: seed_used.or(self.seed.filter(|_| self.method.is_seedable())),
            mcg_params_used: self.mcg_used(),
            statistic: 0.0,
            observed_frequencies: observed,
            expected_frequencies: expected,
            interpretation,
            outcome,
        }
    }

    fn interpret(&self, statistic: f64, df: usize, seed_used: Option<i64>) -> String {
        let mut generator = self.method.to_string();
        if let Some(seed) = seed_used {
            generator.push_str(&format!(", seed {}", seed));
        }
        if let Some(McgParams { a, c, m }) = self.mcg_used() {
            generator.push_str(&format!(", a={} c={} m={}", a, c, m));
        }
        format!(
            "Chi-square statistic: {:.3}, degrees of freedom: {}. A lower statistic relative to \
             the degrees of freedom (K-1 = {}) suggests the generator ({}) fits a uniform \
             distribution well. Consult a chi-square critical-value table to judge significance \
             (e.g. at alpha = 0.05).",
            statistic, df, df, generator
        )
    }
}

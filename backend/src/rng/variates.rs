//! Continuous variates derived from the provider's uniform stream.

use super::provider::PrngProvider;
use std::f64::consts::PI;

impl PrngProvider {
    /// Sample an exponential variate with the given mean.
    ///
    /// Returns `-mean * ln(1 - u)`, redrawing while `u == 0`. A non-positive
    /// mean yields 0 without consuming the stream.
    ///
    /// # Example
    /// ```
    /// use parking_simulator_core_rs::rng::{PrngMethod, PrngProvider};
    ///
    /// let mut rng = PrngProvider::new(PrngMethod::Lcg, Some(1), None);
    /// assert!(rng.exponential(2.0) > 0.0);
    /// assert_eq!(rng.exponential(0.0), 0.0);
    /// ```
    pub fn exponential(&mut self, mean: f64) -> f64 {
        if mean <= 0.0 {
            return 0.0;
        }
        let u = self.nonzero_uniform();
        -mean * (1.0 - u).ln()
    }

    /// Sample a normal variate via the Box-Muller transform.
    ///
    /// Draws `u` then `v` (each redrawn while exactly 0) and returns
    /// `mean + sqrt(-2 ln u) * cos(2 pi v) * std_dev`. A negative standard
    /// deviation returns `mean` without consuming the stream.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev < 0.0 {
            return mean;
        }
        let u = self.nonzero_uniform();
        let v = self.nonzero_uniform();
        let z = (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos();
        mean + z * std_dev
    }

    fn nonzero_uniform(&mut self) -> f64 {
        loop {
            let u = self.next();
            if u != 0.0 {
                return u;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::rng::{McgParams, PrngMethod, PrngProvider};

    #[test]
    fn test_exponential_formula_matches_first_uniform() {
        let mut sampler = PrngProvider::new(PrngMethod::Lcg, Some(1), None);
        let mut raw = PrngProvider::new(PrngMethod::Lcg, Some(1), None);
        let u = raw.next();
        assert_eq!(sampler.exponential(3.0), -3.0 * (1.0 - u).ln());
    }

    #[test]
    fn test_exponential_redraws_zero() {
        // x -> x + 1 mod 4 starting at 3: draws 0.0, then 0.25
        let params = McgParams { a: 1, c: 1, m: 4 };
        let mut rng = PrngProvider::new(PrngMethod::MixedCongruential, Some(3), Some(params));
        let value = rng.exponential(1.0);
        // second draw u = 0.25
        assert_eq!(value, -(0.75f64).ln());
    }

    #[test]
    fn test_exponential_mean_roughly_correct() {
        let mut rng = PrngProvider::new(PrngMethod::MersenneTwister, Some(11), None);
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| rng.exponential(4.0)).sum::<f64>() / n as f64;
        assert!((mean - 4.0).abs() < 0.2, "sample mean {}", mean);
    }

    #[test]
    fn test_normal_negative_std_dev_returns_mean() {
        let mut rng = PrngProvider::new(PrngMethod::Lcg, Some(1), None);
        let before = rng.snapshot();
        assert_eq!(rng.normal(300.0, -1.0), 300.0);
        assert_eq!(rng.snapshot(), before);
    }

    #[test]
    fn test_normal_zero_std_dev_is_mean() {
        let mut rng = PrngProvider::new(PrngMethod::Lcg, Some(5), None);
        assert_eq!(rng.normal(42.0, 0.0), 42.0);
    }

    #[test]
    fn test_normal_moments() {
        let mut rng = PrngProvider::new(PrngMethod::MersenneTwister, Some(99), None);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| rng.normal(300.0, 60.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 300.0).abs() < 3.0, "mean {}", mean);
        assert!((var.sqrt() - 60.0).abs() < 3.0, "std {}", var.sqrt());
    }
}

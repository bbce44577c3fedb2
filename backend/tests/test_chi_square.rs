//! Chi-square tester: statistics, preconditions and generator restore

use parking_simulator_core_rs::chi_square::{
    bin_index, critical_value, ChiSquareOutcome, ChiSquareTest, SignificanceLevel,
};
use parking_simulator_core_rs::rng::{McgParams, PrngMethod, PrngProvider};

/// Table value for df = 9, alpha = 0.01
const CRITICAL_DF9_P01: f64 = 21.666;

fn request(method: PrngMethod, seed: Option<i64>) -> ChiSquareTest {
    ChiSquareTest {
        sample_size: 10_000,
        num_bins: 10,
        method,
        seed,
        mcg: None,
    }
}

#[test]
fn test_default_generator_rarely_fails_at_one_percent() {
    let mut provider = PrngProvider::default();
    let trials = 50;
    let failures = (0..trials)
        .map(|_| request(PrngMethod::Default, None).run(&mut provider))
        .filter(|result| result.statistic >= CRITICAL_DF9_P01)
        .count();
    // Expected failure rate is 1%; six or more in fifty is vanishingly rare
    assert!(failures <= 5, "{} of {} trials failed", failures, trials);
}

#[test]
fn test_seeded_result_is_reproducible() {
    let mut provider = PrngProvider::default();
    let first = request(PrngMethod::MersenneTwister, Some(123)).run(&mut provider);
    let second = request(PrngMethod::MersenneTwister, Some(123)).run(&mut provider);
    assert_eq!(first, second);
    assert_eq!(first.seed_used, Some(123));
    assert_eq!(first.degrees_of_freedom, 9);
    assert_eq!(first.observed_frequencies.iter().sum::<u64>(), 10_000);
    assert!(first.expected_frequencies.iter().all(|&e| e == 1000.0));
}

#[test]
fn test_live_stream_resumes_after_test() {
    let params = McgParams {
        a: 69_069,
        c: 1,
        m: 1 << 32,
    };
    let mut live = PrngProvider::new(PrngMethod::MixedCongruential, Some(5), Some(params));
    live.next();
    let mut untouched = live.clone();

    let result = request(PrngMethod::MersenneTwister, Some(1)).run(&mut live);
    assert!(result.is_computed());

    assert_eq!(live.method(), PrngMethod::MixedCongruential);
    assert_eq!(live.mcg_params(), params);
    for _ in 0..100 {
        assert_eq!(live.next(), untouched.next());
    }
}

#[test]
fn test_mcg_parameters_reported() {
    let params = McgParams { a: 5, c: 3, m: 1 << 20 };
    let mut provider = PrngProvider::default();
    let test = ChiSquareTest {
        mcg: Some(params),
        ..request(PrngMethod::MixedCongruential, Some(9))
    };
    let result = test.run(&mut provider);
    assert_eq!(result.mcg_params_used, Some(params));
    assert!(result.interpretation.contains("a=5"));
}

#[test]
fn test_invalid_requests_produce_results() {
    let mut provider = PrngProvider::default();
    for (n, k) in [(0, 10), (100, 0), (100, 1), (40, 10)] {
        let test = ChiSquareTest {
            sample_size: n,
            num_bins: k,
            ..request(PrngMethod::Lcg, Some(1))
        };
        let result = test.run(&mut provider);
        assert!(
            matches!(result.outcome, ChiSquareOutcome::InvalidInput { .. }),
            "N={} K={}",
            n,
            k
        );
        assert_eq!(result.statistic, 0.0);
        assert!(!result.passes(SignificanceLevel::P10));
    }
}

#[test]
fn test_minimum_sample_size_accepted() {
    let mut provider = PrngProvider::default();
    let test = ChiSquareTest {
        sample_size: 50,
        num_bins: 10,
        ..request(PrngMethod::Lcg, Some(1))
    };
    assert!(test.run(&mut provider).is_computed());
}

#[test]
fn test_interpretation_mentions_table() {
    let mut provider = PrngProvider::default();
    let result = request(PrngMethod::Lcg, Some(3)).run(&mut provider);
    assert!(result.interpretation.contains("LCG"));
    assert!(result.interpretation.contains("critical-value table"));
}

#[test]
fn test_bin_clamp_and_critical_values() {
    assert_eq!(bin_index(1.0, 7), 6);
    assert!(critical_value(9, SignificanceLevel::P01) > critical_value(9, SignificanceLevel::P05));
    assert!((critical_value(9, SignificanceLevel::P01) - CRITICAL_DF9_P01).abs() < 0.15);
}

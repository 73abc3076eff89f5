//! Property-based tests for the relationship explorer
//!
//! - Sample generation is a pure function of (n, seed, σ)
//! - Pearson r is bounded, symmetric, and invariant under positive scaling
//! - The slider never stores a value outside its range
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use quickcheck::{quickcheck, TestResult};
use relationship_explorer::config::{NotebookConfig, SliderConfig};
use relationship_explorer::control::Slider;
use relationship_explorer::notebook::Notebook;
use relationship_explorer::sample::SampleGenerator;
use relationship_explorer::stats::{pearson, try_pearson, Trend};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Paired columns of equal length with enough spread to be non-degenerate
fn arb_pairs(max_len: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (3..=max_len).prop_flat_map(|n| {
        (
            proptest::collection::vec(-1000.0f64..1000.0, n),
            proptest::collection::vec(-1000.0f64..1000.0, n),
        )
    })
}

/// Slider grid positions for the default slider (0.0, 0.1, ..., 2.0)
fn arb_grid_sigma() -> impl Strategy<Value = f64> {
    (0u32..=20).prop_map(|i| f64::from(i) / 10.0)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: identical (n, seed, σ) give identical samples
    #[test]
    fn prop_generation_deterministic(
        n in 2usize..300,
        seed in any::<u64>(),
        sigma in 0.0f64..=2.0
    ) {
        let generator = SampleGenerator::new(n, seed).unwrap();
        let a = generator.generate(sigma).unwrap();
        let b = generator.generate(sigma).unwrap();
        prop_assert_eq!(a.len(), n);
        prop_assert_eq!(a, b);
    }

    /// Property: x does not depend on σ, only the noise does
    #[test]
    fn prop_x_independent_of_sigma(
        seed in any::<u64>(),
        s1 in 0.0f64..=2.0,
        s2 in 0.0f64..=2.0
    ) {
        let generator = SampleGenerator::new(50, seed).unwrap();
        let a = generator.generate(s1).unwrap();
        let b = generator.generate(s2).unwrap();
        prop_assert_eq!(a.x(), b.x());
        prop_assert!(a.x().iter().all(|x| (0.0..1.0).contains(x)));
    }

    /// Property: r is always within [-1, 1] when defined
    #[test]
    fn prop_pearson_bounded((x, y) in arb_pairs(60)) {
        let r = pearson(&x, &y);
        if !r.is_nan() {
            prop_assert!((-1.0..=1.0).contains(&r), "r = {}", r);
        }
    }

    /// Property: r(x, y) == r(y, x)
    #[test]
    fn prop_pearson_symmetric((x, y) in arb_pairs(60)) {
        let rxy = pearson(&x, &y);
        let ryx = pearson(&y, &x);
        prop_assert!(
            (rxy.is_nan() && ryx.is_nan()) || (rxy - ryx).abs() < 1e-12,
            "{} vs {}", rxy, ryx
        );
    }

    /// Property: r is unchanged by positive affine maps of either column
    #[test]
    fn prop_pearson_affine_invariant(
        (x, y) in arb_pairs(60),
        scale in 0.1f64..100.0,
        shift in -100.0f64..100.0
    ) {
        let r = pearson(&x, &y);
        prop_assume!(!r.is_nan());
        let moved: Vec<f64> = x.iter().map(|v| v.mul_add(scale, shift)).collect();
        let r2 = pearson(&moved, &y);
        prop_assert!((r - r2).abs() < 1e-9, "{} vs {}", r, r2);
    }

    /// Property: try_pearson and pearson agree wherever r is defined
    #[test]
    fn prop_try_pearson_matches_sentinel((x, y) in arb_pairs(40)) {
        match try_pearson(&x, &y) {
            Ok(r) => prop_assert!((r - pearson(&x, &y)).abs() < f64::EPSILON),
            Err(_) => prop_assert!(pearson(&x, &y).is_nan()),
        }
    }

    /// Property: classification thresholds are ordered
    #[test]
    fn prop_trend_monotone_in_magnitude(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let rank = |t: Trend| match t {
            Trend::VeryWeak => 0,
            Trend::Weak => 1,
            Trend::Moderate => 2,
            Trend::Strong => 3,
            Trend::Undefined => -1,
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rank(Trend::classify(lo)) <= rank(Trend::classify(hi)));
        prop_assert_eq!(Trend::classify(hi), Trend::classify(-hi));
    }

    /// Property: accepted slider values lie inside the range, on the grid
    #[test]
    fn prop_slider_check_in_range(value in -1.0f64..3.0) {
        let slider = Slider::new("σ", SliderConfig::default()).unwrap();
        match slider.check(value) {
            Ok(v) => {
                prop_assert!((0.0..=2.0).contains(&v));
                prop_assert!((v - value).abs() <= 0.05 + 1e-9);
                let steps = v / 0.1;
                prop_assert!((steps - steps.round()).abs() < 1e-6);
            }
            Err(_) => prop_assert!(!(0.0..=2.0).contains(&value)),
        }
    }

    /// Property: a rejected update leaves the slider where it was
    #[test]
    fn prop_slider_rejection_keeps_value(good in arb_grid_sigma(), bad in 2.01f64..10.0) {
        let mut slider = Slider::new("σ", SliderConfig::default()).unwrap();
        slider.set(good).unwrap();
        prop_assert!(slider.set(bad).is_err());
        prop_assert!(slider.set(-bad).is_err());
        prop_assert!((slider.value() - good).abs() < f64::EPSILON);
    }
}

proptest! {
    // Each case builds a whole notebook, charts included
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Property: after any sequence of changes the outputs match a fresh
    /// computation at the final σ
    #[test]
    fn prop_notebook_consistent_after_sequence(
        sigmas in proptest::collection::vec(arb_grid_sigma(), 1..6)
    ) {
        let config = NotebookConfig::default().with_sample_size(60);
        let mut notebook = Notebook::new(config).unwrap();
        for &sigma in &sigmas {
            notebook.set_sigma(sigma).unwrap();
        }

        let last = *sigmas.last().unwrap();
        let fresh = SampleGenerator::new(60, 42).unwrap().generate(last).unwrap();
        prop_assert_eq!(notebook.sample(), &fresh);
        let r = pearson(fresh.x(), fresh.y());
        prop_assert!((notebook.correlation() - r).abs() < 1e-12);
        prop_assert_eq!(notebook.graph().run_count("intro"), Some(1));
    }
}

// ============================================================================
// QuickCheck
// ============================================================================

#[test]
fn qc_pearson_self_correlation_is_one() {
    fn prop(x: Vec<f64>) -> TestResult {
        if x.len() < 2 || x.iter().any(|v| !v.is_finite() || v.abs() > 1e100) {
            return TestResult::discard();
        }
        let r = pearson(&x, &x);
        if x.iter().all(|v| v.total_cmp(&x[0]).is_eq()) {
            return TestResult::from_bool(r.is_nan());
        }
        // NaN only when the spread underflows to zero
        TestResult::from_bool(r.is_nan() || (r - 1.0).abs() < 1e-9)
    }
    quickcheck(prop as fn(Vec<f64>) -> TestResult);
}

#[test]
fn qc_pearson_length_mismatch_is_nan() {
    fn prop(x: Vec<f64>, extra: f64) -> bool {
        let mut y = x.clone();
        y.push(extra);
        pearson(&x, &y).is_nan() && try_pearson(&x, &y).is_err()
    }
    quickcheck(prop as fn(Vec<f64>, f64) -> bool);
}

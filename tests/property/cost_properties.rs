//! Properties of the cost estimator over arbitrary inputs.

use adloom::config::{PricingConfig, VideoRate};
use adloom::cost::CostEstimator;

/// Image cost is always base plus the capped font add-on, for any font count.
#[test]
fn image_cost_formula_property() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let estimator = CostEstimator::new(PricingConfig::default());

    runner
        .run(
            &(proptest::sample::select(vec!["1K", "2K", "4K"]), 0usize..32),
            |(resolution, font_count)| {
                let cost = estimator.image_cost(resolution, font_count).unwrap();
                let base = if resolution == "4K" { 60 } else { 27 };
                let expected = base + 5 * font_count.min(2) as u32;
                assert_eq!(cost.total, expected);
                assert_eq!(cost.base, base);
                Ok(())
            },
        )
        .unwrap();
}

/// Video cost equals the rate-duration product rounded to nearest, and the
/// total never differs from the exact product by more than half a point.
#[test]
fn video_cost_rounding_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(0.01f64..100.0, 0.1f64..600.0),
            |(rate, duration)| {
                let pricing = PricingConfig {
                    video_rates: vec![VideoRate {
                        model: "m".to_string(),
                        resolution: "r".to_string(),
                        points_per_second: rate,
                    }],
                    ..PricingConfig::default()
                };
                let estimator = CostEstimator::new(pricing);
                let cost = estimator.video_cost("m", "r", Some(duration)).unwrap();

                let exact = rate * duration;
                assert_eq!(cost.total, exact.round() as u32);
                assert!((cost.total as f64 - exact).abs() <= 0.5);
                Ok(())
            },
        )
        .unwrap();
}

/// A missing or non-positive duration always prices at zero.
#[test]
fn unknown_duration_is_free_property() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let estimator = CostEstimator::new(PricingConfig::default());

    runner
        .run(&proptest::option::of(-10.0f64..=0.0), |duration| {
            let cost = estimator
                .video_cost("kling-avatar-v2-standard", "720p", duration)
                .unwrap();
            assert_eq!(cost.total, 0);
            Ok(())
        })
        .unwrap();
}

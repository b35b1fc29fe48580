//! Property-based tests for the coverage ratio invariants (spec §8,
//! invariant 2) and the config serialization round-trip (§8, round-trip
//! property 2).

use dlogcover::config::Config;
use dlogcover::coverage::AxisStats;
use proptest::prelude::*;

proptest! {
    #[test]
    fn axis_ratio_is_between_zero_and_one_and_matches_covered_over_total(
        total in 0u64..10_000,
        covered_raw in 0u64..10_000,
    ) {
        let covered = covered_raw.min(total);
        let stats = AxisStats { total, covered };
        let ratio = stats.ratio();

        prop_assert!((0.0..=1.0).contains(&ratio));
        if total == 0 {
            prop_assert_eq!(ratio, 1.0);
        } else {
            prop_assert!((ratio - covered as f64 / total as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn axis_covered_never_exceeds_total_after_clamping(
        total in 0u64..10_000,
        covered_raw in 0u64..20_000,
    ) {
        let covered = covered_raw.min(total);
        prop_assert!(covered <= total);
    }
}

#[test]
fn config_json_round_trip_is_equal() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    let reparsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(config.version, reparsed.version);
    assert_eq!(config.scan.file_extensions, reparsed.scan.file_extensions);
    assert_eq!(
        config.analysis.function_coverage,
        reparsed.analysis.function_coverage
    );
}

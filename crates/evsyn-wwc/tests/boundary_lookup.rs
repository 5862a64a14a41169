use evsyn_wwc::{calculate_baseline_equivalence, is_low_attrition, AttritionBoundary, BaselineStatus};
use proptest::prelude::*;

#[test]
fn cautious_boundary_rows() {
    let cautious = AttritionBoundary::Cautious;
    assert!(is_low_attrition(0.08, 0.04, cautious));
    assert!(!is_low_attrition(0.15, 0.06, cautious));
    assert!(is_low_attrition(0.10, 0.05, cautious));
    assert!(is_low_attrition(0.25, 0.01, cautious));
    assert!(is_low_attrition(0.40, 0.00, cautious));
    assert!(!is_low_attrition(0.40, 0.001, cautious));
}

#[test]
fn optimistic_boundary_rows() {
    let optimistic = AttritionBoundary::Optimistic;
    assert!(is_low_attrition(0.12, 0.04, optimistic));
    assert!(!is_low_attrition(0.15, 0.08, optimistic));
    assert!(is_low_attrition(0.35, 0.01, optimistic));
}

#[test]
fn attrition_above_forty_percent_always_fails() {
    for boundary in [AttritionBoundary::Cautious, AttritionBoundary::Optimistic] {
        assert!(!is_low_attrition(0.45, 0.0, boundary));
        assert!(!is_low_attrition(0.45, 0.01, boundary));
    }
}

#[test]
fn boundary_names_parse_with_fallback() {
    assert_eq!("optimistic".parse::<AttritionBoundary>().unwrap(), AttritionBoundary::Optimistic);
    let err = "invalid_value".parse::<AttritionBoundary>().unwrap_err();
    assert_eq!(err.info().code, "unknown-attrition-boundary");
    assert_eq!(AttritionBoundary::parse_or_cautious("invalid_value"), AttritionBoundary::Cautious);
    assert_eq!(AttritionBoundary::parse_or_cautious("optimistic"), AttritionBoundary::Optimistic);
    assert_eq!(AttritionBoundary::default(), AttritionBoundary::Cautious);
}

#[test]
fn baseline_bands() {
    let equivalent = calculate_baseline_equivalence(50.0, 50.5, 10.0, 10.0);
    assert_eq!(equivalent.status, BaselineStatus::Equivalent);
    assert!(equivalent.effect_size.abs() <= 0.05);
    assert_eq!(equivalent.message, "Baseline groups are equivalent (≤0.05 SD difference)");

    let adjustable = calculate_baseline_equivalence(50.0, 51.5, 10.0, 10.0);
    assert_eq!(adjustable.status, BaselineStatus::Adjustable);
    assert!(adjustable.effect_size.abs() > 0.05 && adjustable.effect_size.abs() <= 0.25);

    let distinct = calculate_baseline_equivalence(50.0, 60.0, 10.0, 10.0);
    assert_eq!(distinct.status, BaselineStatus::NotEquivalent);
    assert!(distinct.effect_size.abs() > 0.25);
    assert!((distinct.effect_size + 1.0).abs() < 1e-12);
}

#[test]
fn zero_variance_is_equivalent() {
    let result = calculate_baseline_equivalence(50.0, 55.0, 0.0, 0.0);
    assert_eq!(result.status, BaselineStatus::Equivalent);
    assert_eq!(result.effect_size, 0.0);
    assert_eq!(result.message, "No variance in baseline measures");
}

proptest! {
    #[test]
    fn optimistic_is_never_stricter(overall in 0.0f64..0.6, differential in 0.0f64..0.1) {
        if is_low_attrition(overall, differential, AttritionBoundary::Cautious) {
            prop_assert!(is_low_attrition(overall, differential, AttritionBoundary::Optimistic));
        }
    }

    #[test]
    fn lower_differential_stays_low(overall in 0.0f64..0.4, differential in 0.0f64..0.1) {
        for boundary in [AttritionBoundary::Cautious, AttritionBoundary::Optimistic] {
            if is_low_attrition(overall, differential, boundary) {
                prop_assert!(is_low_attrition(overall, differential / 2.0, boundary));
            }
        }
    }
}

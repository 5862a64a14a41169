use evsyn_core::EffectSizeRecord;
use evsyn_meta::{eggers_test, eggers_test_records};

#[test]
fn fewer_than_three_studies_is_reported() {
    let result = eggers_test(&[0.2, 0.4], &[0.1, 0.2]);
    assert!(result.intercept.is_none());
    assert!(result.intercept_se.is_none());
    assert!(result.intercept_pvalue.is_none());
    assert_eq!(result.interpretation, "Egger's test requires at least 3 studies");
    assert!(!result.indicates_bias());
}

#[test]
fn identical_standard_errors_fail_gracefully() {
    let result = eggers_test(&[0.1, 0.4, 0.3, 0.2], &[0.25, 0.25, 0.25, 0.25]);
    assert!(result.intercept.is_none());
    assert!(result.intercept_pvalue.is_none());
    assert!(
        result.interpretation.starts_with("Egger's test failed: "),
        "unexpected interpretation: {}",
        result.interpretation
    );
}

#[test]
fn varied_precision_produces_a_test() {
    let effects = [0.62, 0.41, 0.35, 0.22, 0.18, 0.05];
    let ses = [0.30, 0.22, 0.18, 0.12, 0.09, 0.06];
    let result = eggers_test(&effects, &ses);
    let p = result.intercept_pvalue.expect("p-value");
    assert!((0.0..=1.0).contains(&p));
    assert!(result.intercept_se.expect("se") > 0.0);
    assert!(result.intercept.is_some());
    let expected = if p < 0.05 {
        "Evidence of publication bias (p < 0.05)"
    } else {
        "No significant evidence of publication bias (p >= 0.05)"
    };
    assert_eq!(result.interpretation, expected);
    assert_eq!(result.indicates_bias(), p < 0.05);
}

#[test]
fn records_and_slices_agree() {
    let records = vec![
        EffectSizeRecord::new(0.50, 0.25).unwrap(),
        EffectSizeRecord::new(0.30, 0.15).unwrap(),
        EffectSizeRecord::new(0.15, 0.08).unwrap(),
        EffectSizeRecord::new(0.40, 0.20).unwrap(),
    ];
    let from_records = eggers_test_records(&records);
    let from_slices = eggers_test(&[0.50, 0.30, 0.15, 0.40], &[0.25, 0.15, 0.08, 0.20]);
    assert_eq!(from_records, from_slices);
}

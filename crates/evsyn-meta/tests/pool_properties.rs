use evsyn_core::{EffectSizeRecord, EvsynError};
use evsyn_meta::{pool, HeterogeneityLevel};
use proptest::prelude::*;

fn records(pairs: &[(f64, f64)]) -> Vec<EffectSizeRecord> {
    pairs
        .iter()
        .map(|&(d, se)| EffectSizeRecord::new(d, se).unwrap())
        .collect()
}

#[test]
fn single_study_is_rejected() {
    let err = pool(&records(&[(0.5, 0.1)])).unwrap_err();
    assert!(matches!(err, EvsynError::Validation(_)));
    assert_eq!(err.info().message, "at least 2 studies required");
}

#[test]
fn non_positive_standard_error_is_rejected() {
    let mut input = records(&[(0.5, 0.1), (0.3, 0.2)]);
    input[1].std_error = 0.0;
    let err = pool(&input).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.info().message, "standard errors must be positive");
    assert_eq!(err.info().context["index"], "1");

    input[1].std_error = -0.2;
    assert!(pool(&input).unwrap_err().is_validation());
}

#[test]
fn non_finite_effect_is_a_computation_error() {
    let mut input = records(&[(0.5, 0.1), (0.3, 0.2)]);
    input[0].effect_size = f64::NAN;
    assert!(matches!(pool(&input), Err(EvsynError::Computation(_))));
}

#[test]
fn two_study_scenario() {
    let result = pool(&records(&[(0.5, 0.15), (0.3, 0.12)])).unwrap();
    assert_eq!(result.n_studies, 2);
    assert!(result.ci_lower < result.pooled_effect && result.pooled_effect < result.ci_upper);
    assert!(result.pooled_effect > 0.3 && result.pooled_effect < 0.5);
    assert!((0.0..=1.0).contains(&result.p_value));
    assert!((0.0..=1.0).contains(&result.q_p_value));
    assert_eq!(result.per_study.len(), 2);
    for study in &result.per_study {
        assert!(study.ci_lower < study.effect_size && study.effect_size < study.ci_upper);
        assert!((study.ci_upper - study.effect_size - 1.96 * study.std_error).abs() < 1e-12);
    }
    assert_eq!(result.per_study[0].study_label, "Study 1");
    assert_eq!(result.per_study[1].study_label, "Study 2");
}

#[test]
fn dersimonian_laird_closed_form() {
    // w = 100 each, Q = 8, C = 200, so tau² = (8 - 2) / 200 and I² = 75.
    let result = pool(&records(&[(0.1, 0.1), (0.3, 0.1), (0.5, 0.1)])).unwrap();
    assert!((result.q_statistic - 8.0).abs() < 1e-9);
    assert!((result.tau_squared - 0.03).abs() < 1e-9);
    assert!((result.i_squared - 75.0).abs() < 1e-9);
    assert!((result.q_p_value - (-4.0f64).exp()).abs() < 1e-6);
    assert!((result.pooled_effect - 0.3).abs() < 1e-12);

    // se = sqrt(0.04 / 3); t(0.975, 2) = 4.3027
    let se = (0.04f64 / 3.0).sqrt();
    assert!((result.ci_upper - result.pooled_effect - 4.302_65 * se).abs() < 1e-3);
    assert!((result.p_value - 0.1217).abs() < 1e-3);
    for study in &result.per_study {
        assert!((study.weight - 1.0 / 3.0).abs() < 1e-12);
    }
}

#[test]
fn widely_split_studies_are_considerably_heterogeneous() {
    // w = 100 each, Q = 18 with df = 1, so I² = 100 * 17 / 18.
    let result = pool(&records(&[(0.0, 0.1), (0.6, 0.1)])).unwrap();
    assert!((result.q_statistic - 18.0).abs() < 1e-9);
    assert!((result.i_squared - 1700.0 / 18.0).abs() < 1e-9);
    assert_eq!(result.heterogeneity(), HeterogeneityLevel::Considerable);
}

#[test]
fn homogeneous_studies_have_no_heterogeneity() {
    let result = pool(&records(&[(0.4, 0.1), (0.4, 0.2), (0.4, 0.3)])).unwrap();
    assert!(result.q_statistic < 1e-20);
    assert_eq!(result.tau_squared, 0.0);
    assert_eq!(result.i_squared, 0.0);
    assert!(result.q_p_value > 0.999_999);
    assert_eq!(result.heterogeneity(), HeterogeneityLevel::Low);
}

#[test]
fn labels_and_paper_ids_are_carried() {
    let input = vec![
        EffectSizeRecord::new(0.2, 0.1).unwrap().with_label("Smith 2023").with_paper_id(11_i64),
        EffectSizeRecord::new(0.4, 0.1).unwrap(),
    ];
    let result = pool(&input).unwrap();
    assert_eq!(result.per_study[0].study_label, "Smith 2023");
    assert_eq!(result.per_study[0].paper_id, Some(11_i64.into()));
    assert_eq!(result.per_study[1].study_label, "Study 2");
    assert_eq!(result.per_study[1].paper_id, None);
}

#[test]
fn pooling_is_idempotent() {
    let input = records(&[(0.45, 0.12), (0.62, 0.15), (0.12, 0.2), (0.9, 0.3)]);
    let first = pool(&input).unwrap();
    let second = pool(&input).unwrap();
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(first.pooled_effect.to_bits(), second.pooled_effect.to_bits());
}

proptest! {
    #[test]
    fn pooled_invariants_hold(
        studies in prop::collection::vec((-2.0f64..2.0, 0.01f64..1.0), 2..12)
    ) {
        let result = pool(&records(&studies)).unwrap();
        prop_assert!(result.ci_lower <= result.pooled_effect);
        prop_assert!(result.pooled_effect <= result.ci_upper);
        prop_assert!(result.tau_squared >= 0.0);
        prop_assert!((0.0..=100.0).contains(&result.i_squared));
        prop_assert!(result.q_statistic >= 0.0);
        prop_assert!((0.0..=1.0).contains(&result.q_p_value));
        prop_assert!((0.0..=1.0).contains(&result.p_value));
        prop_assert_eq!(result.n_studies, studies.len());
        let weight_sum: f64 = result.per_study.iter().map(|s| s.weight).sum();
        prop_assert!((weight_sum - 1.0).abs() < 1e-6);
    }
}

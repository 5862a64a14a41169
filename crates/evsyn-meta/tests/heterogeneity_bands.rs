use evsyn_meta::{interpret_heterogeneity, HeterogeneityLevel, HeterogeneityStats};

#[test]
fn bands_include_their_lower_edge() {
    assert_eq!(interpret_heterogeneity(0.0), "Low heterogeneity");
    assert_eq!(interpret_heterogeneity(24.9), "Low heterogeneity");
    assert_eq!(interpret_heterogeneity(25.0), "Moderate heterogeneity");
    assert_eq!(interpret_heterogeneity(49.99), "Moderate heterogeneity");
    assert_eq!(interpret_heterogeneity(50.0), "Substantial heterogeneity");
    assert_eq!(interpret_heterogeneity(74.9), "Substantial heterogeneity");
    assert_eq!(interpret_heterogeneity(75.0), "Considerable heterogeneity");
    assert_eq!(interpret_heterogeneity(100.0), "Considerable heterogeneity");
}

#[test]
fn levels_serialize_in_snake_case() {
    let json = serde_json::to_string(&HeterogeneityLevel::from_i_squared(60.0)).unwrap();
    assert_eq!(json, "\"substantial\"");
}

#[test]
fn q_below_df_clamps_tau_and_i_squared() {
    // Q = 0.08 with df = 2 would give negative moment estimates.
    let stats = HeterogeneityStats::compute(&[0.28, 0.3, 0.32], &[0.1, 0.1, 0.1]);
    assert!(stats.q_statistic < stats.df as f64);
    assert_eq!(stats.tau_squared, 0.0);
    assert_eq!(stats.i_squared, 0.0);
    assert_eq!(
        HeterogeneityLevel::from_i_squared(stats.i_squared),
        HeterogeneityLevel::Low
    );
    assert!(stats.q_p_value > 0.9);
}

use evsyn_core::errors::{ErrorInfo, EvsynError};
use evsyn_core::{EffectSizeRecord, PaperId};
use serde::{Deserialize, Serialize};

use crate::dist::{t_critical_95, two_tailed_normal, two_tailed_t, Z_95};
use crate::heterogeneity::{HeterogeneityLevel, HeterogeneityStats};

/// Half-width used when no standard error of the pooled mean is available.
const FALLBACK_HALF_WIDTH: f64 = 0.5;

/// Per-study entry of a [`PooledResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyResult {
    /// Source paper identifier.
    pub paper_id: Option<PaperId>,
    /// Study label (defaults to `Study N`).
    pub study_label: String,
    /// Observed effect size.
    pub effect_size: f64,
    /// Observed standard error.
    pub std_error: f64,
    /// Normalised random-effects weight; weights of one pooling sum to 1.
    pub weight: f64,
    /// Lower bound of the study's own `effect ± 1.96·se` interval.
    pub ci_lower: f64,
    /// Upper bound of the study's own `effect ± 1.96·se` interval.
    pub ci_upper: f64,
}

/// Random-effects pooled estimate with heterogeneity statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledResult {
    /// Random-effects pooled mean.
    pub pooled_effect: f64,
    /// Lower bound of the 95% confidence interval.
    pub ci_lower: f64,
    /// Upper bound of the 95% confidence interval.
    pub ci_upper: f64,
    /// Two-tailed p-value of the pooled mean against zero.
    pub p_value: f64,
    /// DerSimonian-Laird between-study variance.
    pub tau_squared: f64,
    /// I² percentage.
    pub i_squared: f64,
    /// Cochran's Q.
    pub q_statistic: f64,
    /// p-value of Cochran's Q.
    pub q_p_value: f64,
    /// Number of pooled studies.
    pub n_studies: usize,
    /// Input-ordered per-study results.
    pub per_study: Vec<StudyResult>,
}

impl PooledResult {
    /// Heterogeneity band of the result.
    pub fn heterogeneity(&self) -> HeterogeneityLevel {
        HeterogeneityLevel::from_i_squared(self.i_squared)
    }

    /// Standard error backed out of the confidence interval width.
    pub fn ci_standard_error(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / (2.0 * Z_95)
    }
}

pub(crate) fn require_studies(n: usize, min: usize) -> Result<(), EvsynError> {
    if n < min {
        return Err(EvsynError::Validation(
            ErrorInfo::new(
                "too-few-studies",
                format!("at least {min} studies required"),
            )
            .with_context("n_studies", n),
        ));
    }
    Ok(())
}

fn validate_records(records: &[EffectSizeRecord]) -> Result<(), EvsynError> {
    for (idx, record) in records.iter().enumerate() {
        record.validate().map_err(|err| match err {
            EvsynError::Validation(info) => EvsynError::Validation(info.with_context("index", idx)),
            other => other,
        })?;
    }
    Ok(())
}

fn confidence_interval(pooled: f64, se: f64, df: f64) -> (f64, f64) {
    if se.is_finite() && se > 0.0 {
        let crit = t_critical_95(df).unwrap_or(Z_95);
        let lower = pooled - crit * se;
        let upper = pooled + crit * se;
        if lower.is_finite() && upper.is_finite() {
            return (lower, upper);
        }
        let lower = pooled - Z_95 * se;
        let upper = pooled + Z_95 * se;
        if lower.is_finite() && upper.is_finite() {
            return (lower, upper);
        }
    }
    (pooled - FALLBACK_HALF_WIDTH, pooled + FALLBACK_HALF_WIDTH)
}

fn pooled_p_value(pooled: f64, se: f64, df: f64, ci: (f64, f64)) -> f64 {
    let p = if se.is_finite() && se > 0.0 {
        let stat = pooled / se;
        two_tailed_t(stat, df).or_else(|| two_tailed_normal(stat))
    } else {
        let approx_se = (ci.1 - ci.0) / (2.0 * Z_95);
        if approx_se > 0.0 {
            two_tailed_normal(pooled / approx_se)
        } else {
            None
        }
    };
    p.unwrap_or(1.0)
}

/// Pools independent effect sizes with the DerSimonian-Laird random-effects model.
///
/// Fails with a validation error for fewer than two studies or a
/// non-positive standard error, and with a computation error when the
/// weighted mean cannot be formed.
pub fn pool(records: &[EffectSizeRecord]) -> Result<PooledResult, EvsynError> {
    require_studies(records.len(), 2)?;
    validate_records(records)?;

    let effects: Vec<f64> = records.iter().map(|r| r.effect_size).collect();
    let std_errors: Vec<f64> = records.iter().map(|r| r.std_error).collect();
    let het = HeterogeneityStats::compute(&effects, &std_errors);

    let raw_weights: Vec<f64> = std_errors
        .iter()
        .map(|se| 1.0 / (se * se + het.tau_squared))
        .collect();
    let total: f64 = raw_weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(EvsynError::Computation(
            ErrorInfo::new("degenerate-weights", "random-effects weights do not sum to a finite positive value")
                .with_context("total_weight", total),
        ));
    }

    let pooled_effect = raw_weights
        .iter()
        .zip(&effects)
        .map(|(w, y)| w * y)
        .sum::<f64>()
        / total;
    if !pooled_effect.is_finite() {
        return Err(EvsynError::Computation(
            ErrorInfo::new("non-finite-pooled-effect", "pooled effect is not finite")
                .with_hint("check the effect sizes for NaN or infinite values"),
        ));
    }

    let se = (1.0 / total).sqrt();
    let df = het.df as f64;
    let (ci_lower, ci_upper) = confidence_interval(pooled_effect, se, df);
    let p_value = pooled_p_value(pooled_effect, se, df, (ci_lower, ci_upper));

    let per_study = records
        .iter()
        .zip(&raw_weights)
        .enumerate()
        .map(|(idx, (record, weight))| StudyResult {
            paper_id: record.paper_id.clone(),
            study_label: record.label_or_default(idx),
            effect_size: record.effect_size,
            std_error: record.std_error,
            weight: weight / total,
            ci_lower: record.effect_size - Z_95 * record.std_error,
            ci_upper: record.effect_size + Z_95 * record.std_error,
        })
        .collect();

    tracing::debug!(
        n_studies = records.len(),
        pooled_effect,
        tau_squared = het.tau_squared,
        i_squared = het.i_squared,
        "random-effects pooling complete"
    );

    Ok(PooledResult {
        pooled_effect,
        ci_lower,
        ci_upper,
        p_value,
        tau_squared: het.tau_squared,
        i_squared: het.i_squared,
        q_statistic: het.q_statistic,
        q_p_value: het.q_p_value,
        n_studies: records.len(),
        per_study,
    })
}

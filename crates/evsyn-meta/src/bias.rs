use evsyn_core::errors::{ErrorInfo, EvsynError};
use evsyn_core::EffectSizeRecord;
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::dist::{two_tailed_t, ALPHA};

/// Largest tolerated condition number of the normal-equation matrix.
pub const MAX_CONDITION_NUMBER: f64 = 1e12;

/// Result of Egger's regression test. Numeric fields are `None` when the test is infeasible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasTestResult {
    /// Regression intercept.
    pub intercept: Option<f64>,
    /// Standard error of the intercept.
    pub intercept_se: Option<f64>,
    /// Two-tailed p-value of the intercept against zero.
    pub intercept_pvalue: Option<f64>,
    /// Human readable verdict.
    pub interpretation: String,
}

impl BiasTestResult {
    fn unavailable(interpretation: impl Into<String>) -> Self {
        Self {
            intercept: None,
            intercept_se: None,
            intercept_pvalue: None,
            interpretation: interpretation.into(),
        }
    }

    /// Returns `true` when the intercept is significant at α = 0.05.
    pub fn indicates_bias(&self) -> bool {
        self.intercept_pvalue.is_some_and(|p| p < ALPHA)
    }
}

struct EggerFit {
    intercept: f64,
    intercept_se: f64,
    intercept_pvalue: f64,
}

fn ill_conditioned(message: String) -> EvsynError {
    EvsynError::Computation(ErrorInfo::new("ill-conditioned", message))
}

fn egger_regression(effect_sizes: &[f64], std_errors: &[f64]) -> Result<EggerFit, EvsynError> {
    if effect_sizes.len() != std_errors.len() {
        return Err(EvsynError::Validation(
            ErrorInfo::new("length-mismatch", "effect sizes and standard errors differ in length")
                .with_context("effect_sizes", effect_sizes.len())
                .with_context("std_errors", std_errors.len()),
        ));
    }

    let mut xtwx = Matrix2::<f64>::zeros();
    let mut xtwy = Vector2::<f64>::zeros();
    for (&y, &se) in effect_sizes.iter().zip(std_errors) {
        let weight = 1.0 / (se * se);
        let row = Vector2::new(1.0, 1.0 / se);
        xtwx += row * row.transpose() * weight;
        xtwy += row * (weight * y);
    }
    if xtwx.iter().chain(xtwy.iter()).any(|v| !v.is_finite()) {
        return Err(EvsynError::computation(
            "non-finite-design",
            "design matrix contains non-finite values",
        ));
    }

    let singular = xtwx.singular_values();
    let condition = singular.max() / singular.min();
    if !(condition <= MAX_CONDITION_NUMBER) {
        return Err(ill_conditioned(format!(
            "Matrix is ill-conditioned (condition number: {condition:.2e})"
        )));
    }
    let inverse = xtwx
        .try_inverse()
        .ok_or_else(|| ill_conditioned("Matrix is singular".to_string()))?;
    let beta = inverse * xtwy;

    let k = effect_sizes.len();
    let df = (k - 2) as f64;
    let weighted_sse: f64 = effect_sizes
        .iter()
        .zip(std_errors)
        .map(|(&y, &se)| {
            let residual = y - (beta[0] + beta[1] / se);
            residual * residual / (se * se)
        })
        .sum();
    let mse = weighted_sse / df;
    let var_intercept = mse * inverse[(0, 0)];
    if !(var_intercept > 0.0) {
        return Err(EvsynError::computation(
            "degenerate-variance",
            format!("Invalid variance for intercept: {var_intercept}"),
        ));
    }

    let intercept = beta[0];
    let intercept_se = var_intercept.sqrt();
    let intercept_pvalue = two_tailed_t(intercept / intercept_se, df).ok_or_else(|| {
        EvsynError::computation("non-finite-pvalue", "intercept p-value is not finite")
    })?;

    Ok(EggerFit {
        intercept,
        intercept_se,
        intercept_pvalue,
    })
}

/// Egger's regression test for small-study effects.
///
/// Regresses effect size on precision with inverse-variance weights. Never
/// fails: infeasible inputs yield `None` fields and an explanatory
/// interpretation.
pub fn eggers_test(effect_sizes: &[f64], std_errors: &[f64]) -> BiasTestResult {
    if effect_sizes.len() < 3 {
        return BiasTestResult::unavailable("Egger's test requires at least 3 studies");
    }
    match egger_regression(effect_sizes, std_errors) {
        Ok(fit) => {
            let interpretation = if fit.intercept_pvalue < ALPHA {
                "Evidence of publication bias (p < 0.05)"
            } else {
                "No significant evidence of publication bias (p >= 0.05)"
            };
            BiasTestResult {
                intercept: Some(fit.intercept),
                intercept_se: Some(fit.intercept_se),
                intercept_pvalue: Some(fit.intercept_pvalue),
                interpretation: interpretation.to_string(),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "Egger's test failed");
            BiasTestResult::unavailable(format!("Egger's test failed: {}", err.info().message))
        }
    }
}

/// [`eggers_test`] over study records.
pub fn eggers_test_records(records: &[EffectSizeRecord]) -> BiasTestResult {
    let effects: Vec<f64> = records.iter().map(|r| r.effect_size).collect();
    let std_errors: Vec<f64> = records.iter().map(|r| r.std_error).collect();
    eggers_test(&effects, &std_errors)
}

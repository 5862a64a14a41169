//! Numeric series behind forest and funnel plots. Rendering happens elsewhere.

use evsyn_core::errors::{ErrorInfo, EvsynError};
use evsyn_core::EffectSizeRecord;
use serde::{Deserialize, Serialize};

use crate::combine::PooledResult;

/// Label of the pooled row of a forest plot.
pub const POOLED_LABEL: &str = "Pooled Effect";

const FUNNEL_LABEL_CHARS: usize = 20;
const FUNNEL_EXTREME_EFFECT: f64 = 2.0;
const FUNNEL_PRECISION_SHARE: f64 = 0.8;

/// One row of a forest plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRow {
    /// Row label.
    pub label: String,
    /// Point estimate.
    pub effect_size: f64,
    /// Lower whisker.
    pub ci_lower: f64,
    /// Upper whisker.
    pub ci_upper: f64,
    /// Marker weight (1.0 for the pooled row).
    pub weight: f64,
}

/// Data for a forest plot: study rows followed by the pooled diamond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestPlotData {
    /// Per-study rows in input order.
    pub rows: Vec<ForestRow>,
    /// Pooled estimate row.
    pub pooled: ForestRow,
    /// Position of the null-effect reference line.
    pub null_effect: f64,
    /// Text annotation for the pooled row.
    pub annotation: String,
}

impl ForestPlotData {
    /// Builds the series from a pooled result.
    pub fn from_pooled(result: &PooledResult) -> Self {
        let rows = result
            .per_study
            .iter()
            .map(|study| ForestRow {
                label: study.study_label.clone(),
                effect_size: study.effect_size,
                ci_lower: study.ci_lower,
                ci_upper: study.ci_upper,
                weight: study.weight,
            })
            .collect();
        Self {
            rows,
            pooled: ForestRow {
                label: POOLED_LABEL.to_string(),
                effect_size: result.pooled_effect,
                ci_lower: result.ci_lower,
                ci_upper: result.ci_upper,
                weight: 1.0,
            },
            null_effect: 0.0,
            annotation: format!(
                "d = {:.3} [{:.3}, {:.3}]",
                result.pooled_effect, result.ci_lower, result.ci_upper
            ),
        }
    }
}

/// One study in a funnel plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelPoint {
    /// Study label, truncated to 20 characters.
    pub label: String,
    /// Effect size (x axis).
    pub effect_size: f64,
    /// Precision `1/se` (y axis).
    pub precision: f64,
    /// Whether the renderer should annotate the point.
    pub annotate: bool,
}

/// Data for a funnel plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelPlotData {
    /// Points in input order.
    pub points: Vec<FunnelPoint>,
    /// Position of the null-effect reference line.
    pub null_effect: f64,
}

impl FunnelPlotData {
    /// Builds the series from parallel slices.
    pub fn new(
        effect_sizes: &[f64],
        std_errors: &[f64],
        labels: &[String],
    ) -> Result<Self, EvsynError> {
        if effect_sizes.len() != std_errors.len() || effect_sizes.len() != labels.len() {
            return Err(EvsynError::Validation(
                ErrorInfo::new("length-mismatch", "funnel plot series differ in length")
                    .with_context("effect_sizes", effect_sizes.len())
                    .with_context("std_errors", std_errors.len())
                    .with_context("labels", labels.len()),
            ));
        }
        if std_errors.iter().any(|se| !(*se > 0.0)) {
            return Err(EvsynError::validation(
                "non-positive-std-error",
                "standard errors must be positive",
            ));
        }

        let precision: Vec<f64> = std_errors.iter().map(|se| 1.0 / se).collect();
        let max_precision = precision.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let points = effect_sizes
            .iter()
            .zip(&precision)
            .zip(labels)
            .map(|((&effect_size, &precision), label)| FunnelPoint {
                label: label.chars().take(FUNNEL_LABEL_CHARS).collect(),
                effect_size,
                precision,
                annotate: effect_size.abs() > FUNNEL_EXTREME_EFFECT
                    || precision > max_precision * FUNNEL_PRECISION_SHARE,
            })
            .collect();
        Ok(Self {
            points,
            null_effect: 0.0,
        })
    }

    /// Builds the series from study records.
    pub fn from_records(records: &[EffectSizeRecord]) -> Result<Self, EvsynError> {
        let effects: Vec<f64> = records.iter().map(|r| r.effect_size).collect();
        let std_errors: Vec<f64> = records.iter().map(|r| r.std_error).collect();
        let labels: Vec<String> = records
            .iter()
            .enumerate()
            .map(|(idx, r)| r.label_or_default(idx))
            .collect();
        Self::new(&effects, &std_errors, &labels)
    }
}

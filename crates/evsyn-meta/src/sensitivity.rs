use evsyn_core::errors::EvsynError;
use evsyn_core::{EffectSizeRecord, PaperId};
use serde::{Deserialize, Serialize};

use crate::combine::{pool, require_studies};

/// Pooled estimate with one study held out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveOneOut {
    /// Label of the omitted study.
    pub removed_study: String,
    /// Paper identifier of the omitted study.
    pub removed_paper_id: Option<PaperId>,
    /// Pooled effect without the study.
    pub pooled_effect: f64,
    /// Lower CI bound without the study.
    pub ci_lower: f64,
    /// Upper CI bound without the study.
    pub ci_upper: f64,
    /// `pooled_effect - overall_effect`.
    pub difference_from_overall: f64,
}

/// Weighted deviation of a study from the random-effects mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluenceDiagnostic {
    /// Study label.
    pub study_label: String,
    /// Paper identifier.
    pub paper_id: Option<PaperId>,
    /// `weight × |effect - weighted mean|`.
    pub influence_score: f64,
    /// Normalised weight under the overall τ².
    pub weight: f64,
    /// Observed effect size.
    pub effect_size: f64,
}

/// Leave-one-out and influence report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    /// Pooled effect over every study.
    pub overall_effect: f64,
    /// One entry per held-out study, in input order.
    pub leave_one_out: Vec<LeaveOneOut>,
    /// Influence entries sorted by descending score.
    pub influence_diagnostics: Vec<InfluenceDiagnostic>,
    /// Number of studies analysed.
    pub n_studies: usize,
}

/// Runs leave-one-out pooling and per-study influence diagnostics.
pub fn analyze(records: &[EffectSizeRecord]) -> Result<SensitivityResult, EvsynError> {
    require_studies(records.len(), 3)?;

    let overall = pool(records)?;
    let overall_effect = overall.pooled_effect;

    let mut leave_one_out = Vec::with_capacity(records.len());
    for (idx, removed) in records.iter().enumerate() {
        let remaining: Vec<EffectSizeRecord> = records
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != idx)
            .map(|(_, record)| record.clone())
            .collect();
        if remaining.len() < 2 {
            continue;
        }
        match pool(&remaining) {
            Ok(result) => leave_one_out.push(LeaveOneOut {
                removed_study: removed.label_or_default(idx),
                removed_paper_id: removed.paper_id.clone(),
                pooled_effect: result.pooled_effect,
                ci_lower: result.ci_lower,
                ci_upper: result.ci_upper,
                difference_from_overall: result.pooled_effect - overall_effect,
            }),
            Err(err) => {
                tracing::warn!(study = idx + 1, error = %err, "leave-one-out pooling failed; skipped");
            }
        }
    }

    let influence_diagnostics = influence(records, overall.tau_squared);

    Ok(SensitivityResult {
        overall_effect,
        leave_one_out,
        influence_diagnostics,
        n_studies: records.len(),
    })
}

/// Influence of each study under a fixed between-study variance, highest first.
pub fn influence(records: &[EffectSizeRecord], tau_squared: f64) -> Vec<InfluenceDiagnostic> {
    let raw: Vec<f64> = records
        .iter()
        .map(|r| 1.0 / (r.std_error * r.std_error + tau_squared))
        .collect();
    let total: f64 = raw.iter().sum();
    let weights: Vec<f64> = raw.iter().map(|w| w / total).collect();
    let mean = weights
        .iter()
        .zip(records)
        .map(|(w, r)| w * r.effect_size)
        .sum::<f64>();

    let mut diagnostics: Vec<InfluenceDiagnostic> = records
        .iter()
        .zip(&weights)
        .enumerate()
        .map(|(idx, (record, weight))| InfluenceDiagnostic {
            study_label: record.label_or_default(idx),
            paper_id: record.paper_id.clone(),
            influence_score: weight * (record.effect_size - mean).abs(),
            weight: *weight,
            effect_size: record.effect_size,
        })
        .collect();
    diagnostics.sort_by(|a, b| b.influence_score.total_cmp(&a.influence_score));
    diagnostics
}

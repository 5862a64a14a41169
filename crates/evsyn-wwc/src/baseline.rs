use serde::{Deserialize, Serialize};

/// Largest |d| treated as equivalent without adjustment.
pub const EQUIVALENT_MAX: f64 = 0.05;
/// Largest |d| that a valid statistical adjustment can rescue.
pub const ADJUSTABLE_MAX: f64 = 0.25;

/// Classification of a baseline difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStatus {
    /// |d| ≤ 0.05.
    Equivalent,
    /// 0.05 < |d| ≤ 0.25; requires a valid statistical adjustment.
    Adjustable,
    /// |d| > 0.25.
    NotEquivalent,
}

/// Baseline effect size together with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEquivalence {
    /// Cohen's d between treatment and control at baseline.
    pub effect_size: f64,
    /// Equivalence band of `effect_size`.
    pub status: BaselineStatus,
    /// Explanation suitable for a rating justification.
    pub message: String,
}

/// Cohen's d of the baseline difference with pooled SD `sqrt((sd_t² + sd_c²) / 2)`.
pub fn calculate_baseline_equivalence(
    treatment_mean: f64,
    control_mean: f64,
    treatment_sd: f64,
    control_sd: f64,
) -> BaselineEquivalence {
    let pooled_sd = ((treatment_sd.powi(2) + control_sd.powi(2)) / 2.0).sqrt();
    if pooled_sd == 0.0 {
        return BaselineEquivalence {
            effect_size: 0.0,
            status: BaselineStatus::Equivalent,
            message: "No variance in baseline measures".to_string(),
        };
    }

    let effect_size = (treatment_mean - control_mean) / pooled_sd;
    let magnitude = effect_size.abs();
    let (status, message) = if magnitude <= EQUIVALENT_MAX {
        (
            BaselineStatus::Equivalent,
            "Baseline groups are equivalent (≤0.05 SD difference)",
        )
    } else if magnitude <= ADJUSTABLE_MAX {
        (
            BaselineStatus::Adjustable,
            "Baseline groups require statistical adjustment (>0.05 and ≤0.25 SD difference)",
        )
    } else {
        (
            BaselineStatus::NotEquivalent,
            "Baseline groups are not equivalent (>0.25 SD difference)",
        )
    };
    BaselineEquivalence {
        effect_size,
        status,
        message: message.to_string(),
    }
}

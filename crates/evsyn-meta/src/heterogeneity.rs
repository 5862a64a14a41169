use serde::{Deserialize, Serialize};

use crate::dist::chi_square_upper_tail;

/// Higgins et al. (2003) bands for the I² statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeterogeneityLevel {
    /// I² below 25.
    Low,
    /// I² in [25, 50).
    Moderate,
    /// I² in [50, 75).
    Substantial,
    /// I² of 75 or more.
    Considerable,
}

impl HeterogeneityLevel {
    /// Classifies an I² percentage. Each band includes its lower edge.
    pub fn from_i_squared(i_squared: f64) -> Self {
        if i_squared < 25.0 {
            HeterogeneityLevel::Low
        } else if i_squared < 50.0 {
            HeterogeneityLevel::Moderate
        } else if i_squared < 75.0 {
            HeterogeneityLevel::Substantial
        } else {
            HeterogeneityLevel::Considerable
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            HeterogeneityLevel::Low => "Low heterogeneity",
            HeterogeneityLevel::Moderate => "Moderate heterogeneity",
            HeterogeneityLevel::Substantial => "Substantial heterogeneity",
            HeterogeneityLevel::Considerable => "Considerable heterogeneity",
        }
    }
}

/// Interprets an I² percentage (0-100).
pub fn interpret_heterogeneity(i_squared: f64) -> &'static str {
    HeterogeneityLevel::from_i_squared(i_squared).label()
}

/// Cochran's Q and the DerSimonian-Laird moment estimates derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeterogeneityStats {
    /// Fixed-effect (inverse-variance) pooled mean.
    pub fixed_effect: f64,
    /// Cochran's Q.
    pub q_statistic: f64,
    /// Degrees of freedom of Q (k - 1).
    pub df: usize,
    /// Upper-tail chi-square p-value of Q.
    pub q_p_value: f64,
    /// Between-study variance, clamped at zero.
    pub tau_squared: f64,
    /// I² as a percentage, clamped to [0, 100].
    pub i_squared: f64,
}

impl HeterogeneityStats {
    /// Computes the statistics from paired effects and standard errors.
    ///
    /// Non-finite intermediate values collapse to their safe defaults
    /// (0 for τ² and I², 1 for the Q p-value).
    pub fn compute(effects: &[f64], std_errors: &[f64]) -> Self {
        let weights: Vec<f64> = std_errors.iter().map(|se| 1.0 / (se * se)).collect();
        let sum_w: f64 = weights.iter().sum();
        let sum_w2: f64 = weights.iter().map(|w| w * w).sum();
        let fixed_effect = weights
            .iter()
            .zip(effects)
            .map(|(w, y)| w * y)
            .sum::<f64>()
            / sum_w;

        let q_statistic: f64 = weights
            .iter()
            .zip(effects)
            .map(|(w, y)| w * (y - fixed_effect).powi(2))
            .sum();
        let df = effects.len().saturating_sub(1);
        let df_f = df as f64;

        let scaling = sum_w - sum_w2 / sum_w;
        let tau_squared = if scaling > 0.0 {
            ((q_statistic - df_f) / scaling).max(0.0)
        } else {
            0.0
        };
        let tau_squared = if tau_squared.is_finite() {
            tau_squared
        } else {
            0.0
        };

        let q_p_value = chi_square_upper_tail(q_statistic, df_f).unwrap_or(1.0);

        let i_squared = if q_statistic > 0.0 {
            (100.0 * (q_statistic - df_f) / q_statistic).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let i_squared = if i_squared.is_finite() { i_squared } else { 0.0 };

        Self {
            fixed_effect,
            q_statistic,
            df,
            q_p_value,
            tau_squared,
            i_squared,
        }
    }
}

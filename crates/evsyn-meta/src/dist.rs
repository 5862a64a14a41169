//! Thin wrappers over `statrs` distributions that never surface NaN.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

/// Two-sided 95% normal critical value.
pub const Z_95: f64 = 1.96;

/// Significance level used for every interpretation string.
pub const ALPHA: f64 = 0.05;

fn finite_probability(p: f64) -> Option<f64> {
    p.is_finite().then(|| p.clamp(0.0, 1.0))
}

/// Two-tailed p-value of a t statistic with `df` degrees of freedom.
pub fn two_tailed_t(stat: f64, df: f64) -> Option<f64> {
    if !stat.is_finite() {
        return None;
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    finite_probability(2.0 * (1.0 - dist.cdf(stat.abs())))
}

/// Two-tailed p-value of a z statistic.
pub fn two_tailed_normal(stat: f64) -> Option<f64> {
    if !stat.is_finite() {
        return None;
    }
    let dist = Normal::new(0.0, 1.0).ok()?;
    finite_probability(2.0 * (1.0 - dist.cdf(stat.abs())))
}

/// Upper 97.5% quantile of Student's t, i.e. the 95% two-sided critical value.
pub fn t_critical_95(df: f64) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let crit = dist.inverse_cdf(0.975);
    (crit.is_finite() && crit > 0.0).then_some(crit)
}

/// Upper-tail probability of a chi-square statistic.
pub fn chi_square_upper_tail(stat: f64, df: f64) -> Option<f64> {
    if !stat.is_finite() || stat < 0.0 {
        return None;
    }
    let dist = ChiSquared::new(df).ok()?;
    finite_probability(1.0 - dist.cdf(stat))
}

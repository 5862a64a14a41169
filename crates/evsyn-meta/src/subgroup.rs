use evsyn_core::errors::EvsynError;
use evsyn_core::{EffectSizeRecord, SUBGROUP_FIELD};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::combine::{pool, require_studies, PooledResult};
use crate::dist::{chi_square_upper_tail, ALPHA};

/// Category assigned to records whose subgroup value is missing.
pub const UNKNOWN_SUBGROUP: &str = "unknown";

/// Between-subgroup heterogeneity test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgroupComparison {
    /// Q-between statistic.
    pub q_between: Option<f64>,
    /// Degrees of freedom (qualifying subgroups - 1).
    pub df: Option<usize>,
    /// Upper-tail chi-square p-value.
    pub p_value: Option<f64>,
    /// Human readable verdict at α = 0.05.
    pub interpretation: String,
}

impl SubgroupComparison {
    fn unavailable(df: Option<usize>, interpretation: &str) -> Self {
        Self {
            q_between: None,
            df,
            p_value: None,
            interpretation: interpretation.to_string(),
        }
    }
}

/// Per-subgroup pooled estimates plus the overall estimate and their comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgroupResult {
    /// Pooled result per subgroup with at least two studies, in first-seen order.
    pub subgroups: IndexMap<String, PooledResult>,
    /// Pooled result across every record.
    pub overall: PooledResult,
    /// Name of the grouping variable.
    pub subgroup_variable: String,
    /// Number of subgroups that were pooled.
    pub n_subgroups: usize,
    /// Q-between comparison.
    pub comparison: SubgroupComparison,
}

/// Pools studies per subgroup and tests whether subgroup means differ.
///
/// `key` extracts the subgroup of a record; `None` maps to
/// [`UNKNOWN_SUBGROUP`]. Subgroups with fewer than two studies are left
/// out of `subgroups` but still contribute to `overall`.
pub fn compare<F>(
    records: &[EffectSizeRecord],
    subgroup_variable: &str,
    key: F,
) -> Result<SubgroupResult, EvsynError>
where
    F: Fn(&EffectSizeRecord) -> Option<String>,
{
    require_studies(records.len(), 2)?;

    let mut groups: IndexMap<String, Vec<EffectSizeRecord>> = IndexMap::new();
    for record in records {
        let value = key(record).unwrap_or_else(|| UNKNOWN_SUBGROUP.to_string());
        groups.entry(value).or_default().push(record.clone());
    }

    let mut subgroups = IndexMap::new();
    for (name, members) in &groups {
        if members.len() < 2 {
            tracing::info!(subgroup = %name, n_studies = members.len(), "subgroup too small to pool; skipped");
            continue;
        }
        match pool(members) {
            Ok(result) => {
                subgroups.insert(name.clone(), result);
            }
            Err(err) => {
                tracing::warn!(subgroup = %name, error = %err, "subgroup pooling failed; skipped");
            }
        }
    }

    let overall = pool(records)?;
    let comparison = compare_subgroups(&subgroups, &overall);

    Ok(SubgroupResult {
        n_subgroups: subgroups.len(),
        subgroups,
        overall,
        subgroup_variable: subgroup_variable.to_string(),
        comparison,
    })
}

/// [`compare`] keyed on each record's own `subgroup_value`.
pub fn compare_by_subgroup(records: &[EffectSizeRecord]) -> Result<SubgroupResult, EvsynError> {
    compare_by_variable(records, SUBGROUP_FIELD)
}

/// [`compare`] keyed on a named grouping variable (see [`EffectSizeRecord::grouping_value`]).
pub fn compare_by_variable(
    records: &[EffectSizeRecord],
    variable: &str,
) -> Result<SubgroupResult, EvsynError> {
    compare(records, variable, |record| {
        record.grouping_value(variable).map(str::to_string)
    })
}

/// Q-between = Σ w_g (θ_g - θ_overall)², with w_g = 1/SE_g² and SE_g taken from the CI width.
pub fn compare_subgroups(
    subgroups: &IndexMap<String, PooledResult>,
    overall: &PooledResult,
) -> SubgroupComparison {
    if subgroups.len() < 2 {
        return SubgroupComparison::unavailable(None, "At least 2 subgroups required for comparison");
    }

    let mut q_between = 0.0;
    for result in subgroups.values() {
        let se = result.ci_standard_error();
        if se > 0.0 {
            q_between += (result.pooled_effect - overall.pooled_effect).powi(2) / (se * se);
        }
    }
    let df = subgroups.len() - 1;

    let p_value = if q_between > 0.0 {
        chi_square_upper_tail(q_between, df as f64)
    } else {
        None
    };
    let Some(p_value) = p_value else {
        return SubgroupComparison::unavailable(Some(df), "Subgroup comparison could not be calculated");
    };

    let verdict = if p_value < ALPHA {
        "Significant differences between subgroups"
    } else {
        "No significant differences between subgroups"
    };
    SubgroupComparison {
        q_between: Some(q_between),
        df: Some(df),
        p_value: Some(p_value),
        interpretation: format!("{verdict} (Q-between = {q_between:.3}, p = {p_value:.4})"),
    }
}

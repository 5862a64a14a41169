//! Study observations consumed by the meta-analysis engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, EvsynError};

/// Opaque identifier of the paper a study was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaperId {
    /// Numeric database identifier.
    Numeric(i64),
    /// Free-form identifier (DOI, external key, ...).
    Text(String),
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperId::Numeric(id) => write!(f, "{id}"),
            PaperId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for PaperId {
    fn from(value: i64) -> Self {
        PaperId::Numeric(value)
    }
}

impl From<&str> for PaperId {
    fn from(value: &str) -> Self {
        PaperId::Text(value.to_string())
    }
}

/// A single study's standardized effect estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSizeRecord {
    /// Standardized mean difference (Cohen's d, Hedges' g, ...).
    pub effect_size: f64,
    /// Standard error of the effect size. Must be strictly positive.
    pub std_error: f64,
    /// Display label; defaults to `Study N` by position when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_label: Option<String>,
    /// Identifier of the source paper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<PaperId>,
    /// Category tag used for subgroup comparisons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgroup_value: Option<String>,
    /// Further study characteristics usable as grouping variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Grouping variable that reads [`EffectSizeRecord::subgroup_value`].
pub const SUBGROUP_FIELD: &str = "subgroup_value";

impl EffectSizeRecord {
    /// Creates a validated record.
    pub fn new(effect_size: f64, std_error: f64) -> Result<Self, EvsynError> {
        let record = Self {
            effect_size,
            std_error,
            study_label: None,
            paper_id: None,
            subgroup_value: None,
            attributes: BTreeMap::new(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Attaches a display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.study_label = Some(label.into());
        self
    }

    /// Attaches the source paper identifier.
    pub fn with_paper_id(mut self, paper_id: impl Into<PaperId>) -> Self {
        self.paper_id = Some(paper_id.into());
        self
    }

    /// Attaches a subgroup category.
    pub fn with_subgroup(mut self, value: impl Into<String>) -> Self {
        self.subgroup_value = Some(value.into());
        self
    }

    /// Attaches a named study characteristic.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Value of a grouping variable: `subgroup_value` or a named attribute.
    pub fn grouping_value(&self, variable: &str) -> Option<&str> {
        if variable == SUBGROUP_FIELD {
            self.subgroup_value.as_deref()
        } else {
            self.attributes.get(variable).map(String::as_str)
        }
    }

    /// Checks the positivity invariant on the standard error.
    pub fn validate(&self) -> Result<(), EvsynError> {
        // Written negated so that NaN is rejected as well.
        if !(self.std_error > 0.0) {
            return Err(EvsynError::Validation(
                ErrorInfo::new("non-positive-std-error", "standard errors must be positive")
                    .with_context("std_error", self.std_error),
            ));
        }
        Ok(())
    }

    /// Returns the label, falling back to `Study {position + 1}`.
    pub fn label_or_default(&self, position: usize) -> String {
        self.study_label
            .clone()
            .unwrap_or_else(|| format!("Study {}", position + 1))
    }
}

/// Stored `{d, se}` pair for one outcome of a paper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSizeEntry {
    /// Effect size (Cohen's d).
    pub d: f64,
    /// Standard error of `d`.
    pub se: f64,
}

/// Paper-level view of the persisted study metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperEffectSizes {
    /// Paper identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<PaperId>,
    /// Paper title used as the study label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Outcome name to effect size mapping.
    #[serde(default)]
    pub effect_sizes: BTreeMap<String, EffectSizeEntry>,
    /// Optional subgroup category attached to the paper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgroup_value: Option<String>,
    /// Study characteristics copied onto the converted record.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl PaperEffectSizes {
    /// Picks the requested outcome, or the first outcome by name when none is requested.
    pub fn select(&self, outcome: Option<&str>) -> Option<(&str, EffectSizeEntry)> {
        match outcome {
            Some(name) => self
                .effect_sizes
                .get_key_value(name)
                .map(|(key, entry)| (key.as_str(), *entry)),
            None => self
                .effect_sizes
                .iter()
                .next()
                .map(|(key, entry)| (key.as_str(), *entry)),
        }
    }
}

/// Converts stored paper metadata into records, skipping papers without the outcome.
pub fn records_from_papers(
    papers: &[PaperEffectSizes],
    outcome: Option<&str>,
) -> Result<Vec<EffectSizeRecord>, EvsynError> {
    let mut records = Vec::with_capacity(papers.len());
    for (idx, paper) in papers.iter().enumerate() {
        let Some((name, entry)) = paper.select(outcome) else {
            tracing::warn!(paper = idx, outcome = ?outcome, "paper has no matching effect size; skipped");
            continue;
        };
        let mut record = EffectSizeRecord::new(entry.d, entry.se).map_err(|err| match err {
            EvsynError::Validation(info) => EvsynError::Validation(
                info.with_context("paper", idx).with_context("outcome", name),
            ),
            other => other,
        })?;
        record.study_label = paper.title.clone();
        record.paper_id = paper.paper_id.clone();
        record.subgroup_value = paper.subgroup_value.clone();
        record.attributes = paper.attributes.clone();
        records.push(record);
    }
    Ok(records)
}

/// Serialized collection of study records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StudySet {
    /// Ready-made study records.
    #[serde(default)]
    pub studies: Vec<EffectSizeRecord>,
    /// Paper metadata converted through [`records_from_papers`].
    #[serde(default)]
    pub papers: Vec<PaperEffectSizes>,
}

impl StudySet {
    /// Flattens the set into records: explicit studies first, then converted papers.
    pub fn into_records(self, outcome: Option<&str>) -> Result<Vec<EffectSizeRecord>, EvsynError> {
        for record in &self.studies {
            record.validate()?;
        }
        let mut records = self.studies;
        records.extend(records_from_papers(&self.papers, outcome)?);
        Ok(records)
    }
}

//! YAML analysis plans executed by `evsyn run`.

use std::path::{Path, PathBuf};

use evsyn_core::errors::{ErrorInfo, EvsynError};
use evsyn_core::serde::from_yaml_slice;
use evsyn_core::SUBGROUP_FIELD;
use serde::{Deserialize, Serialize};

use crate::io::OutputFormat;

/// One analysis in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisStep {
    Pool,
    Subgroup {
        #[serde(default = "default_subgroup_key")]
        key: String,
    },
    Sensitivity,
    Bias,
    Forest,
    Funnel,
}

impl AnalysisStep {
    /// Base name of the artefact the step writes.
    pub fn artefact_stem(&self) -> String {
        match self {
            AnalysisStep::Pool => "pool".into(),
            AnalysisStep::Subgroup { key } => {
                let key: String = key
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                    .collect();
                format!("subgroup_{key}")
            }
            AnalysisStep::Sensitivity => "sensitivity".into(),
            AnalysisStep::Bias => "bias".into(),
            AnalysisStep::Forest => "forest".into(),
            AnalysisStep::Funnel => "funnel".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::default(),
        }
    }
}

/// Analysis plan. Relative paths resolve against the plan's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPlan {
    pub input: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default = "default_analyses")]
    pub analyses: Vec<AnalysisStep>,
    #[serde(default)]
    pub output: OutputSpec,
}

fn default_subgroup_key() -> String {
    SUBGROUP_FIELD.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("evsyn-out")
}

fn default_analyses() -> Vec<AnalysisStep> {
    vec![AnalysisStep::Pool]
}

impl AnalysisPlan {
    /// Parses and validates a YAML plan.
    pub fn from_yaml(bytes: &[u8]) -> Result<Self, EvsynError> {
        let plan: Self = from_yaml_slice(bytes)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), EvsynError> {
        if self.input.as_os_str().is_empty() {
            return Err(EvsynError::Config(ErrorInfo::new(
                "missing-input",
                "plan input path is empty",
            )));
        }
        if self.analyses.is_empty() {
            return Err(EvsynError::Config(
                ErrorInfo::new("empty-analyses", "plan lists no analyses")
                    .with_hint("add at least one entry such as `- kind: pool`"),
            ));
        }
        for (idx, step) in self.analyses.iter().enumerate() {
            if let AnalysisStep::Subgroup { key } = step {
                if key.trim().is_empty() {
                    return Err(EvsynError::Config(
                        ErrorInfo::new("empty-subgroup-key", "subgroup analysis needs a grouping key")
                            .with_context("analysis", idx),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Joins a relative plan path onto the plan's directory.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

use evsyn_core::PaperId;
use serde::{Deserialize, Serialize};

/// Treatment/control pair of a baseline statistic.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupValues {
    /// Treatment group value.
    #[serde(default)]
    pub treatment: Option<f64>,
    /// Control group value.
    #[serde(default)]
    pub control: Option<f64>,
}

/// Study data extracted from a paper. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudyFacts {
    /// Paper identifier.
    pub paper_id: Option<PaperId>,
    /// Paper title.
    pub paper_title: Option<String>,
    /// Randomized sample size.
    pub baseline_n: Option<u64>,
    /// Analysed sample size.
    pub endline_n: Option<u64>,
    /// Treatment group attrition rate in `[0, 1]`.
    pub treatment_attrition: Option<f64>,
    /// Control group attrition rate in `[0, 1]`.
    pub control_attrition: Option<f64>,
    /// Study design, e.g. `RCT` or `Quasi-experimental`.
    pub methodology: Option<String>,
    /// Whether the randomization procedure is described.
    pub randomization_documented: Option<bool>,
    /// Baseline means by group.
    pub baseline_means: GroupValues,
    /// Baseline standard deviations by group.
    pub baseline_sds: GroupValues,
}

impl StudyFacts {
    /// `true` when the methodology is `RCT`, ignoring case.
    pub fn is_rct(&self) -> bool {
        self.methodology
            .as_deref()
            .is_some_and(|m| m.to_uppercase() == "RCT")
    }

    /// Overall attrition from sample sizes, else the mean of the group rates.
    pub fn overall_attrition(&self) -> Option<f64> {
        match (self.baseline_n, self.endline_n) {
            (Some(baseline), Some(endline)) if baseline > 0 => {
                Some((baseline as f64 - endline as f64) / baseline as f64)
            }
            _ => match (self.treatment_attrition, self.control_attrition) {
                (Some(t), Some(c)) => Some((t + c) / 2.0),
                _ => None,
            },
        }
    }

    /// Absolute gap between group attrition rates.
    pub fn differential_attrition(&self) -> Option<f64> {
        match (self.treatment_attrition, self.control_attrition) {
            (Some(t), Some(c)) => Some((t - c).abs()),
            _ => None,
        }
    }
}

/// Reviewer judgments that override or complete the extracted facts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserJudgments {
    /// `cautious` or `optimistic`; anything else falls back to cautious.
    pub chosen_attrition_boundary: Option<String>,
    /// Whether a valid statistical adjustment was applied.
    pub adjustment_strategy_is_valid: Option<bool>,
    /// Overrides the extracted randomization flag when set.
    pub randomization_documented: Option<bool>,
}

/// Study facts and judgments read together from one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssessmentRequest {
    /// Extracted study facts.
    pub extracted: StudyFacts,
    /// Reviewer judgments.
    pub judgments: UserJudgments,
}

#![deny(missing_docs)]
#![doc = "What Works Clearinghouse (Handbook v5.0) rating of individual studies."]

/// Sequential rating procedure.
pub mod assess;
/// Baseline equivalence effect size.
pub mod baseline;
/// Attrition boundary tables.
pub mod boundary;
/// Extracted study facts and reviewer judgments.
pub mod facts;

pub use assess::{assess, WwcAssessment, WwcRating};
pub use baseline::{calculate_baseline_equivalence, BaselineEquivalence, BaselineStatus};
pub use boundary::{is_low_attrition, AttritionBoundary};
pub use facts::{AssessmentRequest, GroupValues, StudyFacts, UserJudgments};

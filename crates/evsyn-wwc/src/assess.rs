use std::fmt;

use evsyn_core::PaperId;
use serde::{Deserialize, Serialize};

use crate::baseline::{calculate_baseline_equivalence, BaselineStatus};
use crate::boundary::{is_low_attrition, AttritionBoundary};
use crate::facts::{StudyFacts, UserJudgments};

/// WWC rating levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WwcRating {
    /// Meets WWC Standards Without Reservations.
    MeetsWithoutReservations,
    /// Meets WWC Standards With Reservations.
    MeetsWithReservations,
    /// Does Not Meet WWC Standards.
    DoesNotMeet,
}

impl WwcRating {
    /// Handbook wording of the rating.
    pub fn label(self) -> &'static str {
        match self {
            WwcRating::MeetsWithoutReservations => "Meets WWC Standards Without Reservations",
            WwcRating::MeetsWithReservations => "Meets WWC Standards With Reservations",
            WwcRating::DoesNotMeet => "Does Not Meet WWC Standards",
        }
    }
}

impl fmt::Display for WwcRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of [`assess`]: the inputs that drove the decision, the rating and
/// the justification trail in decision order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WwcAssessment {
    /// Paper identifier copied from the facts.
    pub paper_id: Option<PaperId>,
    /// Paper title copied from the facts.
    pub paper_title: Option<String>,
    /// Boundary used for the attrition lookup.
    pub chosen_attrition_boundary: AttritionBoundary,
    /// Reviewer judgment on the statistical adjustment.
    pub adjustment_strategy_is_valid: Option<bool>,
    /// Randomization flag after applying the reviewer override.
    pub randomization_documented: Option<bool>,
    /// Whether the design is a randomized controlled trial.
    pub is_rct: bool,
    /// Overall attrition rate.
    pub overall_attrition: Option<f64>,
    /// Differential attrition rate.
    pub differential_attrition: Option<f64>,
    /// `None` when attrition could not be classified.
    pub is_high_attrition: Option<bool>,
    /// Baseline Cohen's d, when it was computed.
    pub baseline_effect_size: Option<f64>,
    /// Set once baseline equivalence is established.
    pub baseline_equivalence_satisfied: Option<bool>,
    /// Final rating.
    pub final_rating: WwcRating,
    /// Justifications and warnings in the order they were produced.
    pub rating_justification: Vec<String>,
}

impl WwcAssessment {
    fn open(facts: &StudyFacts, judgments: &UserJudgments) -> Self {
        let chosen_attrition_boundary = judgments
            .chosen_attrition_boundary
            .as_deref()
            .map(AttritionBoundary::parse_or_cautious)
            .unwrap_or_default();
        Self {
            paper_id: facts.paper_id.clone(),
            paper_title: facts.paper_title.clone(),
            chosen_attrition_boundary,
            adjustment_strategy_is_valid: judgments.adjustment_strategy_is_valid,
            randomization_documented: judgments
                .randomization_documented
                .or(facts.randomization_documented),
            is_rct: facts.is_rct(),
            overall_attrition: None,
            differential_attrition: None,
            is_high_attrition: None,
            baseline_effect_size: None,
            baseline_equivalence_satisfied: None,
            final_rating: WwcRating::DoesNotMeet,
            rating_justification: Vec::new(),
        }
    }

    fn note(&mut self, line: impl Into<String>) {
        self.rating_justification.push(line.into());
    }

    fn conclude(mut self, rating: WwcRating, line: impl Into<String>) -> Self {
        self.final_rating = rating;
        self.note(line);
        tracing::debug!(rating = ?rating, steps = self.rating_justification.len(), "wwc assessment complete");
        self
    }

    fn attrition_summary(&self) -> String {
        format!(
            "overall: {}, differential: {}",
            percent(self.overall_attrition),
            percent(self.differential_attrition)
        )
    }

    fn requires_baseline_check(&self) -> bool {
        !self.is_rct || self.is_high_attrition == Some(true)
    }
}

fn percent(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}%", rate * 100.0),
        None => "n/a".to_string(),
    }
}

/// Rates a study against the WWC standards.
///
/// Gates run in a fixed order (randomization, attrition, baseline
/// equivalence, final rating); a failing gate ends the procedure. Missing
/// data never fails the call: it adds a warning to the justification and
/// steers the rating towards [`WwcRating::DoesNotMeet`].
pub fn assess(facts: &StudyFacts, judgments: &UserJudgments) -> WwcAssessment {
    let mut assessment = WwcAssessment::open(facts, judgments);

    if assessment.randomization_documented == Some(false) {
        return assessment.conclude(
            WwcRating::DoesNotMeet,
            "Randomization was not documented or not properly described.",
        );
    }

    assessment.overall_attrition = facts.overall_attrition();
    assessment.differential_attrition = facts.differential_attrition();
    match (assessment.overall_attrition, assessment.differential_attrition) {
        (Some(overall), Some(differential)) => {
            assessment.is_high_attrition = Some(!is_low_attrition(
                overall,
                differential,
                assessment.chosen_attrition_boundary,
            ));
        }
        _ => assessment.note("Warning: Attrition data incomplete. Assessment may be inaccurate."),
    }

    if assessment.requires_baseline_check() {
        let means = facts.baseline_means;
        let sds = facts.baseline_sds;
        match (means.treatment, means.control, sds.treatment, sds.control) {
            (Some(t_mean), Some(c_mean), Some(t_sd), Some(c_sd)) => {
                let baseline = calculate_baseline_equivalence(t_mean, c_mean, t_sd, c_sd);
                assessment.baseline_effect_size = Some(baseline.effect_size);
                match baseline.status {
                    BaselineStatus::NotEquivalent => {
                        return assessment.conclude(WwcRating::DoesNotMeet, baseline.message);
                    }
                    BaselineStatus::Adjustable
                        if assessment.adjustment_strategy_is_valid != Some(true) =>
                    {
                        return assessment.conclude(
                            WwcRating::DoesNotMeet,
                            format!(
                                "{} Valid statistical adjustment required but not confirmed.",
                                baseline.message
                            ),
                        );
                    }
                    BaselineStatus::Adjustable => {
                        assessment.baseline_equivalence_satisfied = Some(true);
                        assessment.note(format!(
                            "{} Valid statistical adjustment confirmed.",
                            baseline.message
                        ));
                    }
                    BaselineStatus::Equivalent => {
                        assessment.baseline_equivalence_satisfied = Some(true);
                        assessment.note(baseline.message);
                    }
                }
            }
            _ => assessment.note(
                "Warning: Baseline equivalence data incomplete. Assessment may be inaccurate.",
            ),
        }
    }

    match assessment.is_high_attrition {
        Some(false) => {
            let line = format!("Low attrition ({}) meets WWC standards.", assessment.attrition_summary());
            assessment.conclude(WwcRating::MeetsWithoutReservations, line)
        }
        Some(true) if assessment.baseline_equivalence_satisfied == Some(true) => {
            let line = format!(
                "High attrition ({}) but baseline equivalence satisfied.",
                assessment.attrition_summary()
            );
            assessment.conclude(WwcRating::MeetsWithReservations, line)
        }
        Some(true) => {
            let line = format!(
                "High attrition ({}) and baseline equivalence not satisfied.",
                assessment.attrition_summary()
            );
            assessment.conclude(WwcRating::DoesNotMeet, line)
        }
        None => assessment.conclude(
            WwcRating::DoesNotMeet,
            "Insufficient data to complete WWC assessment.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_matches_one_decimal() {
        assert_eq!(percent(Some(0.05)), "5.0%");
        assert_eq!(percent(Some(0.019999999999999997)), "2.0%");
        assert_eq!(percent(None), "n/a");
    }

    #[test]
    fn labels_follow_handbook_wording() {
        assert_eq!(WwcRating::DoesNotMeet.to_string(), "Does Not Meet WWC Standards");
        assert_eq!(
            WwcRating::MeetsWithReservations.label(),
            "Meets WWC Standards With Reservations"
        );
    }
}

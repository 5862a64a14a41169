use std::fmt;
use std::str::FromStr;

use evsyn_core::errors::{ErrorInfo, EvsynError};
use serde::{Deserialize, Serialize};

/// Overall attrition above which a study always has high attrition.
pub const MAX_OVERALL_ATTRITION: f64 = 0.40;

/// `(overall threshold, max differential)` pairs in ascending order.
const CAUTIOUS: [(f64, f64); 4] = [(0.10, 0.05), (0.20, 0.03), (0.30, 0.01), (0.40, 0.00)];
const OPTIMISTIC: [(f64, f64); 4] = [(0.10, 0.07), (0.20, 0.05), (0.30, 0.03), (0.40, 0.01)];

/// Attrition boundary chosen by the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttritionBoundary {
    /// Optimistic boundary, for interventions where attrition is unlikely to relate to treatment.
    Optimistic,
    /// Cautious boundary.
    #[default]
    Cautious,
}

impl AttritionBoundary {
    /// Name as used in judgments and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            AttritionBoundary::Optimistic => "optimistic",
            AttritionBoundary::Cautious => "cautious",
        }
    }

    fn table(self) -> &'static [(f64, f64)] {
        match self {
            AttritionBoundary::Optimistic => &OPTIMISTIC,
            AttritionBoundary::Cautious => &CAUTIOUS,
        }
    }

    /// Parses a boundary name, falling back to [`AttritionBoundary::Cautious`]
    /// with a warning when the name is not recognised.
    pub fn parse_or_cautious(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: EvsynError| {
            tracing::warn!(boundary = name, error = %err, "invalid attrition boundary; using cautious");
            AttritionBoundary::Cautious
        })
    }
}

impl FromStr for AttritionBoundary {
    type Err = EvsynError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optimistic" => Ok(AttritionBoundary::Optimistic),
            "cautious" => Ok(AttritionBoundary::Cautious),
            other => Err(EvsynError::Validation(
                ErrorInfo::new("unknown-attrition-boundary", "attrition boundary must be cautious or optimistic")
                    .with_context("boundary", other),
            )),
        }
    }
}

impl fmt::Display for AttritionBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` when the attrition pair falls inside the boundary.
///
/// The first row whose overall threshold is not exceeded decides the
/// allowed differential; overall attrition above 40% always fails.
pub fn is_low_attrition(overall: f64, differential: f64, boundary: AttritionBoundary) -> bool {
    if !(overall <= MAX_OVERALL_ATTRITION) {
        return false;
    }
    boundary
        .table()
        .iter()
        .find(|(overall_max, _)| overall <= *overall_max)
        .is_some_and(|(_, differential_max)| differential <= *differential_max)
}

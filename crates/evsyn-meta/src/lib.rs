#![deny(missing_docs)]
#![doc = "Random-effects meta-analysis: pooling, heterogeneity, subgroup comparison, sensitivity analysis and Egger's test."]

/// Egger's regression test for publication bias.
pub mod bias;
/// DerSimonian-Laird inverse-variance pooling.
pub mod combine;
/// Distribution helpers.
pub mod dist;
/// Heterogeneity statistics and their interpretation.
pub mod heterogeneity;
pub mod plot;
/// Leave-one-out and influence diagnostics.
pub mod sensitivity;
/// Subgroup pooling and Q-between comparison.
pub mod subgroup;

pub use bias::{eggers_test, eggers_test_records, BiasTestResult};
pub use combine::{pool, PooledResult, StudyResult};
pub use heterogeneity::{interpret_heterogeneity, HeterogeneityLevel, HeterogeneityStats};
pub use plot::{ForestPlotData, ForestRow, FunnelPlotData, FunnelPoint};
pub use sensitivity::{analyze, influence, InfluenceDiagnostic, LeaveOneOut, SensitivityResult};
pub use subgroup::{
    compare, compare_by_subgroup, compare_by_variable, SubgroupComparison, SubgroupResult,
};

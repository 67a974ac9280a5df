// Statistical hypothesis tests for comparing two methods across benchmarks
//
// - Mann-Whitney U (rank test, no distribution assumption) for coverage rates
// - Fisher's method to combine per-benchmark p-values
// - Stratified Cox proportional hazards for time-to-completion with censoring
//
// Distribution functions come from statrs; the tests themselves are small
// enough to carry here, following the usual textbook conventions.

mod cox;
mod mann_whitney;
mod significance;
mod stratified;

pub use cox::{fit_stratified_cox, CoxFit, SurvivalObservation};
pub use mann_whitney::{mann_whitney_u, rank_average, MannWhitneyResult};
pub use significance::Significance;
pub use stratified::{
    fisher_combine, stratified_mann_whitney, Observation, StratifiedTest, StratumTest,
};

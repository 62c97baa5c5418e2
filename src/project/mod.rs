//! Project-wide views: investor pool aggregation and refund coverage

mod aggregate;
mod coverage;

pub use aggregate::{PoolTotals, ProjectAggregator, ProjectTotals};
pub use coverage::{CoverageAssessment, RefundCoverageModel, ShutdownScenario};

//! Retirement Projection - investment and cost projection engine for a
//! senior-living community
//!
//! This library provides:
//! - Per-tier investor payout schedules, outcomes and IRR
//! - Pool aggregation across share positions
//! - Compounded comparison lines for reference instruments
//! - Refund coverage of resident liabilities under each allocation model
//! - Resident stay costs net of the deposit refund
//! - A scenario runner that recomputes all of the above for one selection

pub mod error;
pub mod assumptions;
pub mod projection;
pub mod project;
pub mod resident;
pub mod scenario;
pub mod units;

// Re-export commonly used types
pub use error::{ConfigError, EngineError, Result};
pub use assumptions::{Assumptions, RiskModel, ShareClass, ValidatedAssumptions};
pub use projection::{CaOutcome, InvestorInput, InvestorScenarioCalculator, IrrBasis, IrrSolver};
pub use project::{PoolTotals, ProjectAggregator, RefundCoverageModel};
pub use resident::{ResidentCalculation, ResidentCostCalculator, ResidentRequest};
pub use scenario::{ScenarioRunner, Selection, Snapshot};

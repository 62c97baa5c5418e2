//! Investor-side projections: payout schedules, IRR, outcomes and comparison lines

mod schedule;
mod investor;
mod alternatives;
pub mod irr;

pub use schedule::{CashFlowScheduler, CashFlowsByYear, ScheduleRow};
pub use investor::{CaOutcome, InvestorInput, InvestorProjection, InvestorScenarioCalculator, IrrBasis};
pub use alternatives::{AlternativeInstrumentProjector, InstrumentSeries};
pub use irr::{calculate_irr, npv, IrrSolver, IrrSolverConfig};

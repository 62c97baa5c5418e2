//! Single-tier investor outcome: totals at the horizon plus IRR

use serde::{Deserialize, Serialize};

use crate::assumptions::{ShareClass, ShareTierCatalog, ValidatedAssumptions};
use crate::error::{EngineError, Result};

use super::irr::IrrSolver;
use super::schedule::{CashFlowScheduler, CashFlowsByYear};

/// Which cash-flow timing the headline IRR is solved on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrrBasis {
    /// All receipts treated as arriving at the horizon (CA-reviewed figure)
    #[default]
    HorizonBullet,
    /// Equal annual payouts with capital and surplus in the final year
    DistributedSchedule,
}

/// One investor position as supplied by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorInput {
    pub share_class: ShareClass,
    pub number_of_shares: u32,
    pub horizon_years: u32,
}

impl InvestorInput {
    pub fn new(share_class: ShareClass, number_of_shares: u32, horizon_years: u32) -> Self {
        Self {
            share_class,
            number_of_shares,
            horizon_years,
        }
    }

    /// Validate raw form values
    pub fn parse(share_class: &str, number_of_shares: i64, horizon_years: i64) -> Result<Self> {
        let share_class: ShareClass = share_class.parse()?;
        let number_of_shares = u32::try_from(number_of_shares)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| EngineError::quantity("number of shares", number_of_shares, "at least 1"))?;
        let horizon_years = u32::try_from(horizon_years)
            .ok()
            .filter(|&y| y > 0)
            .ok_or_else(|| EngineError::quantity("horizon years", horizon_years, "at least 1"))?;
        Ok(Self::new(share_class, number_of_shares, horizon_years))
    }
}

/// Outcome figures reviewed by the CA for one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaOutcome {
    pub share_class: ShareClass,
    pub number_of_shares: u32,
    pub horizon_years: u32,
    pub total_invested: f64,
    pub total_dividends: f64,
    pub total_interest: f64,
    pub total_cash_in_hand_during_term: f64,
    /// Surplus share released at the horizon
    pub final_surplus: f64,
    pub final_net_worth_at_horizon: f64,
    pub total_return: f64,
    /// Headline IRR on the configured basis
    pub irr: f64,
    /// IRR of the distributed payout schedule
    pub schedule_irr: f64,
    pub irr_basis: IrrBasis,
}

/// Outcome plus the schedule it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorProjection {
    pub outcome: CaOutcome,
    pub schedule: CashFlowsByYear,
}

/// Composes the tier catalog, scheduler and IRR solver
#[derive(Debug, Clone, Copy)]
pub struct InvestorScenarioCalculator<'a> {
    tiers: &'a ShareTierCatalog,
    solver: IrrSolver,
    basis: IrrBasis,
}

impl<'a> InvestorScenarioCalculator<'a> {
    pub(crate) fn new(tiers: &'a ShareTierCatalog, solver: IrrSolver, basis: IrrBasis) -> Self {
        Self { tiers, solver, basis }
    }

    pub fn from_assumptions(assumptions: &'a ValidatedAssumptions) -> Self {
        Self::new(
            &assumptions.tiers,
            IrrSolver::new(assumptions.solver),
            assumptions.irr_basis,
        )
    }

    /// IRR of a single share of `class` on `basis`
    pub fn tier_irr(&self, class: ShareClass, basis: IrrBasis) -> Result<f64> {
        let tier = self.tiers.get(class)?;
        let schedule = CashFlowScheduler.schedule(tier, 1, tier.horizon_years)?;
        self.irr_of(&schedule, basis)
    }

    fn irr_of(&self, schedule: &CashFlowsByYear, basis: IrrBasis) -> Result<f64> {
        let flows = match basis {
            IrrBasis::HorizonBullet => schedule.horizon_bullet_flows(),
            IrrBasis::DistributedSchedule => schedule.net_cash_flows(),
        };
        self.solver.solve(&flows)
    }

    pub fn calculate(&self, input: &InvestorInput) -> Result<CaOutcome> {
        self.project(input).map(|p| p.outcome)
    }

    pub fn project(&self, input: &InvestorInput) -> Result<InvestorProjection> {
        let tier = self.tiers.get(input.share_class)?;
        let schedule = CashFlowScheduler.schedule(tier, input.number_of_shares, input.horizon_years)?;

        // The rate is a property of the tier, so it is solved on one share.
        let unit = CashFlowScheduler.schedule(tier, 1, input.horizon_years)?;
        let irr = self.irr_of(&unit, self.basis)?;
        let schedule_irr = match self.basis {
            IrrBasis::DistributedSchedule => irr,
            IrrBasis::HorizonBullet => self.irr_of(&unit, IrrBasis::DistributedSchedule)?,
        };

        let shares = input.number_of_shares as f64;
        let total_invested = tier.principal * shares;
        let total_dividends = tier.dividend_total * shares;
        let total_interest = tier.interest_total * shares;
        let final_surplus = tier.surplus_at_horizon * shares;
        let total_cash_in_hand_during_term = total_dividends + total_interest;
        let final_net_worth_at_horizon = total_invested + final_surplus;

        let outcome = CaOutcome {
            share_class: input.share_class,
            number_of_shares: input.number_of_shares,
            horizon_years: input.horizon_years,
            total_invested,
            total_dividends,
            total_interest,
            total_cash_in_hand_during_term,
            final_surplus,
            final_net_worth_at_horizon,
            total_return: total_cash_in_hand_during_term + final_net_worth_at_horizon,
            irr,
            schedule_irr,
            irr_basis: self.basis,
        };

        Ok(InvestorProjection { outcome, schedule })
    }
}

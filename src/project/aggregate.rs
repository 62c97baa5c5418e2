//! Pool-wide totals across investor positions

use std::ops::Add;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::ShareClass;
use crate::error::{EngineError, Result};
use crate::projection::{CaOutcome, InvestorInput, InvestorScenarioCalculator};
use crate::units::format_inr_compact;

use super::coverage::CoverageAssessment;

/// Relative tolerance for the surplus reconciliation
const SURPLUS_TOLERANCE: f64 = 1e-9;

/// Linear sums over a set of positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolTotals {
    pub positions: usize,
    pub shares: u64,
    pub total_capital: f64,
    pub total_dividends: f64,
    pub total_interest: f64,
    pub total_distributed: f64,
    pub total_surplus: f64,
    pub total_net_worth: f64,
    pub total_return: f64,
}

impl PoolTotals {
    fn from_outcome(outcome: &CaOutcome) -> Self {
        Self {
            positions: 1,
            shares: outcome.number_of_shares as u64,
            total_capital: outcome.total_invested,
            total_dividends: outcome.total_dividends,
            total_interest: outcome.total_interest,
            total_distributed: outcome.total_cash_in_hand_during_term,
            total_surplus: outcome.final_surplus,
            total_net_worth: outcome.final_net_worth_at_horizon,
            total_return: outcome.total_return,
        }
    }
}

impl Add for PoolTotals {
    type Output = PoolTotals;

    fn add(self, rhs: PoolTotals) -> PoolTotals {
        PoolTotals {
            positions: self.positions + rhs.positions,
            shares: self.shares + rhs.shares,
            total_capital: self.total_capital + rhs.total_capital,
            total_dividends: self.total_dividends + rhs.total_dividends,
            total_interest: self.total_interest + rhs.total_interest,
            total_distributed: self.total_distributed + rhs.total_distributed,
            total_surplus: self.total_surplus + rhs.total_surplus,
            total_net_worth: self.total_net_worth + rhs.total_net_worth,
            total_return: self.total_return + rhs.total_return,
        }
    }
}

/// Project-wide figures for the investor dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub total_capital: f64,
    pub total_shareholder_net_worth: f64,
    pub fd_pool: f64,
    pub current_assets: f64,
    pub liability_inmates: f64,
    /// (fd_pool + current_assets) - liability_inmates
    pub safety_buffer: f64,
    pub dividend_paid_label: String,
}

impl ProjectTotals {
    pub fn assemble(pool: &PoolTotals, coverage: &CoverageAssessment) -> Self {
        Self {
            total_capital: pool.total_capital,
            total_shareholder_net_worth: pool.total_net_worth,
            fd_pool: coverage.fd_pool,
            current_assets: coverage.current_assets,
            liability_inmates: coverage.liability,
            safety_buffer: (coverage.fd_pool + coverage.current_assets) - coverage.liability,
            dividend_paid_label: format!("Dividend paid: {}", format_inr_compact(pool.total_dividends)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectAggregator;

impl ProjectAggregator {
    /// Sum outcomes and reconcile net worth against capital plus surplus
    pub fn aggregate(&self, outcomes: &[CaOutcome]) -> Result<PoolTotals> {
        let totals = outcomes
            .iter()
            .map(PoolTotals::from_outcome)
            .fold(PoolTotals::default(), Add::add);

        let implied_surplus = totals.total_net_worth - totals.total_capital;
        let scale = totals.total_net_worth.abs().max(1.0);
        if (implied_surplus - totals.total_surplus).abs() > SURPLUS_TOLERANCE * scale {
            return Err(EngineError::AggregationMismatch {
                expected: totals.total_surplus,
                actual: implied_surplus,
            });
        }

        Ok(totals)
    }

    /// Run every position through the calculator, then aggregate
    pub fn evaluate_pool(
        &self,
        calculator: &InvestorScenarioCalculator<'_>,
        positions: &[InvestorInput],
    ) -> Result<(Vec<CaOutcome>, PoolTotals)> {
        let outcomes = positions
            .par_iter()
            .map(|position| calculator.calculate(position))
            .collect::<Result<Vec<_>>>()?;
        let totals = self.aggregate(&outcomes)?;
        Ok((outcomes, totals))
    }

    /// `count` single-share positions per tier
    pub fn uniform_pool(counts: &[(ShareClass, u32)], horizon_years: u32) -> Vec<InvestorInput> {
        counts
            .iter()
            .flat_map(|&(class, count)| {
                (0..count).map(move |_| InvestorInput::new(class, 1, horizon_years))
            })
            .collect()
    }
}

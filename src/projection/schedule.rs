//! Year-indexed investor cash flows for one tier position

use serde::{Deserialize, Serialize};

use crate::assumptions::TierConstants;
use crate::error::{EngineError, Result};

/// Distributed payouts for a position, with capital and surplus returned at the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowsByYear {
    /// Dividend paid in each year, index 0 = year 1
    pub yearly_dividends: Vec<f64>,
    pub yearly_interest: Vec<f64>,
    pub final_capital_return: f64,
    pub final_surplus_share: f64,
    /// Amount committed at year 0
    pub invested: f64,
}

/// One display/export row of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub year: u32,
    pub dividend: f64,
    pub interest: f64,
    pub capital_return: f64,
    pub surplus_share: f64,
    pub total: f64,
}

impl CashFlowsByYear {
    pub fn horizon_years(&self) -> u32 {
        self.yearly_dividends.len() as u32
    }

    pub fn total_dividends(&self) -> f64 {
        self.yearly_dividends.iter().sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.yearly_interest.iter().sum()
    }

    /// Signed flows for the IRR solver: outflow at t=0, then each year's receipts
    pub fn net_cash_flows(&self) -> Vec<f64> {
        let mut flows = Vec::with_capacity(self.yearly_dividends.len() + 1);
        flows.push(-self.invested);
        flows.extend(self.rows().map(|r| r.total));
        flows
    }

    /// Same receipts, all deferred to the final year
    pub fn horizon_bullet_flows(&self) -> Vec<f64> {
        let n = self.yearly_dividends.len();
        let mut flows = vec![0.0; n + 1];
        flows[0] = -self.invested;
        flows[n] = self.total_dividends()
            + self.total_interest()
            + self.final_capital_return
            + self.final_surplus_share;
        flows
    }

    pub fn rows(&self) -> impl Iterator<Item = ScheduleRow> + '_ {
        let last = self.yearly_dividends.len();
        self.yearly_dividends
            .iter()
            .zip(&self.yearly_interest)
            .enumerate()
            .map(move |(i, (&dividend, &interest))| {
                let year = i + 1;
                let (capital_return, surplus_share) = if year == last {
                    (self.final_capital_return, self.final_surplus_share)
                } else {
                    (0.0, 0.0)
                };
                ScheduleRow {
                    year: year as u32,
                    dividend,
                    interest,
                    capital_return,
                    surplus_share,
                    total: dividend + interest + capital_return + surplus_share,
                }
            })
    }
}

/// Spreads a tier's dividends and interest evenly across its horizon
#[derive(Debug, Clone, Copy, Default)]
pub struct CashFlowScheduler;

impl CashFlowScheduler {
    pub fn schedule(
        &self,
        tier: &TierConstants,
        number_of_shares: u32,
        horizon_years: u32,
    ) -> Result<CashFlowsByYear> {
        if number_of_shares == 0 {
            return Err(EngineError::quantity("number of shares", 0, "at least 1"));
        }
        if horizon_years != tier.horizon_years {
            return Err(EngineError::InvalidHorizon {
                expected: tier.horizon_years,
                actual: horizon_years,
            });
        }

        let shares = number_of_shares as f64;
        let years = horizon_years as usize;
        let annual_dividend = tier.dividend_total * shares / horizon_years as f64;
        let annual_interest = tier.interest_total * shares / horizon_years as f64;

        Ok(CashFlowsByYear {
            yearly_dividends: vec![annual_dividend; years],
            yearly_interest: vec![annual_interest; years],
            final_capital_return: tier.principal * shares,
            final_surplus_share: tier.surplus_at_horizon * shares,
            invested: tier.principal * shares,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{ShareClass, ShareTierCatalog};
    use approx::assert_relative_eq;

    fn platinum() -> TierConstants {
        *ShareTierCatalog::ca_reviewed().get(ShareClass::Platinum).unwrap()
    }

    #[test]
    fn test_equal_split() {
        let flows = CashFlowScheduler.schedule(&platinum(), 1, 15).unwrap();

        assert_eq!(flows.horizon_years(), 15);
        assert_relative_eq!(flows.yearly_dividends[0], 370_000.0);
        assert_relative_eq!(flows.yearly_interest[14], 400_000.0 / 15.0);
        assert!(flows.yearly_dividends.iter().all(|&d| d == flows.yearly_dividends[0]));
    }

    #[test]
    fn test_sums_match_totals() {
        let flows = CashFlowScheduler.schedule(&platinum(), 7, 15).unwrap();

        assert_relative_eq!(flows.total_dividends(), 5_550_000.0 * 7.0, max_relative = 1e-12);
        assert_relative_eq!(flows.total_interest(), 400_000.0 * 7.0, max_relative = 1e-12);
        assert_eq!(flows.final_capital_return, 21_000_000.0);
        assert_eq!(flows.final_surplus_share, 2_068_023.0 * 7.0);
    }

    #[test]
    fn test_capital_only_in_final_year() {
        let flows = CashFlowScheduler.schedule(&platinum(), 1, 15).unwrap();
        let rows: Vec<_> = flows.rows().collect();

        assert_eq!(rows.len(), 15);
        assert!(rows[..14].iter().all(|r| r.capital_return == 0.0 && r.surplus_share == 0.0));
        assert_eq!(rows[14].capital_return, 3_000_000.0);
        assert_eq!(rows[14].surplus_share, 2_068_023.0);
    }

    #[test]
    fn test_net_flow_shapes() {
        let flows = CashFlowScheduler.schedule(&platinum(), 1, 15).unwrap();

        let net = flows.net_cash_flows();
        assert_eq!(net.len(), 16);
        assert_eq!(net[0], -3_000_000.0);

        let bullet = flows.horizon_bullet_flows();
        assert_eq!(bullet.len(), 16);
        assert!(bullet[1..15].iter().all(|&cf| cf == 0.0));
        assert_relative_eq!(bullet[15], 11_018_023.0, max_relative = 1e-12);
        assert_relative_eq!(net.iter().sum::<f64>(), bullet.iter().sum::<f64>(), max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_other_horizons() {
        assert_eq!(
            CashFlowScheduler.schedule(&platinum(), 1, 10),
            Err(EngineError::InvalidHorizon { expected: 15, actual: 10 })
        );
    }

    #[test]
    fn test_rejects_zero_shares() {
        assert!(matches!(
            CashFlowScheduler.schedule(&platinum(), 0, 15),
            Err(EngineError::InvalidQuantity { .. })
        ));
    }
}

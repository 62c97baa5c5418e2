//! Resident cost of a stay: upfront, recurring, and net of the exit refund

use serde::{Deserialize, Serialize};

use crate::assumptions::{DepositBandSchedule, ResidentFees, UnitCatalog, UnitType, ValidatedAssumptions};
use crate::error::{EngineError, Result};
use crate::units::to_lakh;

pub const RESIDENTS: std::ops::RangeInclusive<u32> = 1..=3;
pub const CARS: std::ops::RangeInclusive<u32> = 0..=3;
pub const STAY_YEARS: std::ops::RangeInclusive<u32> = 5..=25;

/// Resident selection as plain values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentRequest {
    pub unit_id: String,
    pub residents: u32,
    pub cars: u32,
    pub stay_years: u32,
}

/// One year of the cost ledger. Year 0 holds the upfront payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub year: u32,
    pub service_cost: f64,
    pub cumulative_cost: f64,
    pub cumulative_lakh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentCalculation {
    pub unit: UnitType,
    pub residents: u32,
    pub cars: u32,
    pub stay_years: u32,
    pub deposit_amount: f64,
    /// Base price plus refundable deposit
    pub upfront_cost: f64,
    pub annual_cost: f64,
    pub total_cost_before_refund: f64,
    pub refund_percentage: f64,
    pub refund_amount: f64,
    pub effective_net_cost: f64,
    pub ledger: Vec<LedgerRow>,
}

impl ResidentCalculation {
    /// Effective cost per year of stay
    pub fn effective_annual_cost(&self) -> f64 {
        self.effective_net_cost / self.stay_years as f64
    }
}

fn check_range(field: &'static str, value: u32, range: &std::ops::RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(EngineError::quantity(
            field,
            value as i64,
            format!("{}..={}", range.start(), range.end()),
        ))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResidentCostCalculator<'a> {
    units: &'a UnitCatalog,
    fees: ResidentFees,
    bands: &'a DepositBandSchedule,
}

impl<'a> ResidentCostCalculator<'a> {
    pub(crate) fn new(units: &'a UnitCatalog, fees: ResidentFees, bands: &'a DepositBandSchedule) -> Self {
        Self { units, fees, bands }
    }

    pub fn from_assumptions(assumptions: &'a ValidatedAssumptions) -> Self {
        Self::new(&assumptions.units, assumptions.fees, &assumptions.deposit_bands)
    }

    /// Recurring yearly cost: service fee with GST plus parking
    pub fn annual_cost(&self, residents: u32, cars: u32) -> f64 {
        self.fees.service_fee_per_person_per_month * 12.0 * residents as f64 * (1.0 + self.fees.gst_rate)
            + self.fees.parking_fee_per_car_per_month * 12.0 * cars as f64
    }

    pub fn calculate_for(&self, request: &ResidentRequest) -> Result<ResidentCalculation> {
        let unit = self.units.get(&request.unit_id)?;
        self.calculate(unit, request.residents, request.cars, request.stay_years)
    }

    pub fn calculate(
        &self,
        unit: &UnitType,
        residents: u32,
        cars: u32,
        stay_years: u32,
    ) -> Result<ResidentCalculation> {
        check_range("residents", residents, &RESIDENTS)?;
        check_range("cars", cars, &CARS)?;
        check_range("stay years", stay_years, &STAY_YEARS)?;

        let deposit_amount = unit.base_price * self.fees.deposit_percentage;
        let upfront_cost = unit.base_price + deposit_amount;
        let annual_cost = self.annual_cost(residents, cars);
        let total_cost_before_refund = upfront_cost + annual_cost * stay_years as f64;

        let refund_percentage = self.bands.refund_percentage(stay_years);
        let refund_amount = deposit_amount * refund_percentage;

        // Same expression as the total, so the last row closes exactly.
        let ledger = (0..=stay_years)
            .map(|year| {
                let cumulative_cost = upfront_cost + annual_cost * year as f64;
                LedgerRow {
                    year,
                    service_cost: if year == 0 { 0.0 } else { annual_cost },
                    cumulative_cost,
                    cumulative_lakh: to_lakh(cumulative_cost),
                }
            })
            .collect();

        Ok(ResidentCalculation {
            unit: unit.clone(),
            residents,
            cars,
            stay_years,
            deposit_amount,
            upfront_cost,
            annual_cost,
            total_cost_before_refund,
            refund_percentage,
            refund_amount,
            effective_net_cost: total_cost_before_refund - refund_amount,
            ledger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn request(unit: &str, residents: u32, cars: u32, stay_years: u32) -> ResidentRequest {
        ResidentRequest {
            unit_id: unit.to_string(),
            residents,
            cars,
            stay_years,
        }
    }

    #[test]
    fn test_five_year_stay_first_band() {
        let assumptions = ValidatedAssumptions::ca_reviewed().unwrap();
        let calc = ResidentCostCalculator::from_assumptions(&assumptions);
        let result = calc.calculate_for(&request("1bhk", 2, 1, 5)).unwrap();

        assert_eq!(result.unit.base_price, 3_500_000.0);
        assert_relative_eq!(result.deposit_amount, 525_000.0, max_relative = 1e-12);
        assert_eq!(result.refund_percentage, 0.90);
        assert_relative_eq!(result.refund_amount, 472_500.0, max_relative = 1e-12);
        assert_relative_eq!(
            result.effective_net_cost,
            result.total_cost_before_refund - 472_500.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_annual_cost_formula() {
        let assumptions = ValidatedAssumptions::ca_reviewed().unwrap();
        let calc = ResidentCostCalculator::from_assumptions(&assumptions);

        // 18,000 * 12 * 2 * 1.18 + 1,500 * 12 * 1
        assert_relative_eq!(calc.annual_cost(2, 1), 509_760.0 + 18_000.0, max_relative = 1e-12);
        assert_relative_eq!(calc.annual_cost(1, 0), 254_880.0, max_relative = 1e-12);
    }

    #[test]
    fn test_ledger_closes_exactly() {
        let assumptions = ValidatedAssumptions::ca_reviewed().unwrap();
        let calc = ResidentCostCalculator::from_assumptions(&assumptions);

        for stay in [5, 9, 10, 17, 25] {
            let result = calc.calculate_for(&request("villa", 3, 2, stay)).unwrap();
            let last = result.ledger.last().unwrap();

            assert_eq!(result.ledger.len(), stay as usize + 1);
            assert_eq!(last.year, stay);
            assert_eq!(last.cumulative_cost, result.total_cost_before_refund);
            assert_eq!(last.cumulative_lakh, to_lakh(result.total_cost_before_refund));
            assert_eq!(result.ledger[0].cumulative_cost, result.upfront_cost);
        }
    }

    #[test]
    fn test_longer_stay_smaller_refund() {
        let assumptions = ValidatedAssumptions::ca_reviewed().unwrap();
        let calc = ResidentCostCalculator::from_assumptions(&assumptions);
        let short = calc.calculate_for(&request("2bhk", 1, 0, 9)).unwrap();
        let long = calc.calculate_for(&request("2bhk", 1, 0, 21)).unwrap();

        assert_eq!(short.refund_percentage, 0.90);
        assert_eq!(long.refund_percentage, 0.50);
        assert!(long.refund_amount < short.refund_amount);
    }

    #[test]
    fn test_out_of_range_inputs_rejected() {
        let assumptions = ValidatedAssumptions::ca_reviewed().unwrap();
        let calc = ResidentCostCalculator::from_assumptions(&assumptions);

        for bad in [request("1bhk", 0, 0, 5), request("1bhk", 4, 0, 5)] {
            assert!(matches!(
                calc.calculate_for(&bad),
                Err(EngineError::InvalidQuantity { field: "residents", .. })
            ));
        }
        assert!(matches!(
            calc.calculate_for(&request("1bhk", 1, 4, 5)),
            Err(EngineError::InvalidQuantity { field: "cars", .. })
        ));
        assert!(matches!(
            calc.calculate_for(&request("1bhk", 1, 0, 4)),
            Err(EngineError::InvalidQuantity { field: "stay years", .. })
        ));
        assert!(matches!(
            calc.calculate_for(&request("1bhk", 1, 0, 26)),
            Err(EngineError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            calc.calculate_for(&request("castle", 1, 0, 5)),
            Err(EngineError::UnknownUnitType(_))
        ));
    }
}

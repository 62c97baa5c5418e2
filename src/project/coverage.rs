//! Refund coverage of resident liabilities under an allocation model

use log::warn;
use serde::{Deserialize, Serialize};

use crate::assumptions::{AllocationModel, AllocationSplit, CoverageAssumptions, RiskModel, ValidatedAssumptions};
use crate::error::{EngineError, Result};

/// Ring-fenced assets against the refund liability for one risk model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageAssessment {
    pub risk_model: RiskModel,
    pub split: AllocationSplit,
    pub description: String,
    pub fd_pool: f64,
    pub current_assets: f64,
    pub total_assets: f64,
    pub liability: f64,
    pub coverage_ratio: f64,
    /// Assets minus liability; negative on shortfall
    pub safety_buffer: f64,
    pub is_shortfall: bool,
}

impl CoverageAssessment {
    /// Investor's pro-rata share of the safety buffer, never negative
    pub fn buffer_share(&self, investor_capital: f64, total_capital: f64) -> f64 {
        if self.is_shortfall || total_capital <= 0.0 {
            return 0.0;
        }
        self.safety_buffer * investor_capital / total_capital
    }
}

/// Full liquidation with every resident refunded at the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutdownScenario {
    pub risk_model: RiskModel,
    pub assets: f64,
    pub liability: f64,
    pub refund_paid: f64,
    pub unfunded_refund: f64,
    pub residual: f64,
    /// Residual returned per rupee of shareholder capital
    pub residual_per_rupee: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct RefundCoverageModel<'a> {
    allocation: &'a AllocationModel,
    coverage: &'a CoverageAssumptions,
}

impl<'a> RefundCoverageModel<'a> {
    pub(crate) fn new(allocation: &'a AllocationModel, coverage: &'a CoverageAssumptions) -> Self {
        Self { allocation, coverage }
    }

    pub fn from_assumptions(assumptions: &'a ValidatedAssumptions) -> Self {
        Self::new(&assumptions.allocation, &assumptions.coverage)
    }

    pub fn assess(&self, model: RiskModel) -> Result<CoverageAssessment> {
        let profile = self
            .allocation
            .profile(model)
            .ok_or_else(|| EngineError::UnknownRiskModel(model.to_string()))?;
        let assets = self.coverage.assets(model);
        // Positive by construction of CoverageAssumptions.
        let liability = self.coverage.liability();

        let total_assets = assets.total();
        let coverage_ratio = total_assets / liability;
        let is_shortfall = coverage_ratio < 1.0;
        if is_shortfall {
            warn!(
                "{} allocation leaves a refund shortfall: coverage {:.3}",
                model, coverage_ratio
            );
        }

        Ok(CoverageAssessment {
            risk_model: model,
            split: profile.split,
            description: profile.description.clone(),
            fd_pool: assets.fd_pool,
            current_assets: assets.current_assets,
            total_assets,
            liability,
            coverage_ratio,
            safety_buffer: total_assets - liability,
            is_shortfall,
        })
    }

    pub fn shutdown_scenario(&self, model: RiskModel, total_capital: f64) -> ShutdownScenario {
        let assets = self.coverage.assets(model).total();
        let liability = self.coverage.liability();
        let refund_paid = assets.min(liability);
        let residual = (assets - liability).max(0.0);

        ShutdownScenario {
            risk_model: model,
            assets,
            liability,
            refund_paid,
            unfunded_refund: liability - refund_paid,
            residual,
            residual_per_rupee: if total_capital > 0.0 { residual / total_capital } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{Assumptions, PoolAssets};
    use crate::error::ConfigError;
    use approx::assert_relative_eq;

    #[test]
    fn test_moderate_is_covered() {
        let assumptions = ValidatedAssumptions::ca_reviewed().unwrap();
        let assessment = RefundCoverageModel::from_assumptions(&assumptions)
            .assess(RiskModel::Moderate)
            .unwrap();

        assert_relative_eq!(assessment.coverage_ratio, 195.0 / 180.0);
        assert!(!assessment.is_shortfall);
        assert_eq!(assessment.safety_buffer, 15_000_000.0);
        assert_relative_eq!(assessment.buffer_share(3_000_000.0, 200_000_000.0), 225_000.0);
    }

    #[test]
    fn test_aggressive_shortfall_clamps_share() {
        let assumptions = ValidatedAssumptions::ca_reviewed().unwrap();
        let assessment = RefundCoverageModel::from_assumptions(&assumptions)
            .assess(RiskModel::Aggressive)
            .unwrap();

        assert!(assessment.is_shortfall);
        assert!(assessment.coverage_ratio < 1.0);
        assert!(assessment.safety_buffer < 0.0);
        assert_eq!(assessment.buffer_share(3_000_000.0, 200_000_000.0), 0.0);
    }

    #[test]
    fn test_exact_cover_is_not_shortfall() {
        let even = PoolAssets { fd_pool: 80.0, current_assets: 20.0 };
        let coverage = CoverageAssumptions::new(100.0, even, even, even).unwrap();
        let allocation = AllocationModel::ca_reviewed();
        let assessment = RefundCoverageModel::new(&allocation, &coverage)
            .assess(RiskModel::Conservative)
            .unwrap();

        assert_eq!(assessment.coverage_ratio, 1.0);
        assert!(!assessment.is_shortfall);
    }

    #[test]
    fn test_shutdown_scenario() {
        let assumptions = ValidatedAssumptions::ca_reviewed().unwrap();
        let model = RefundCoverageModel::from_assumptions(&assumptions);

        let conservative = model.shutdown_scenario(RiskModel::Conservative, 200_000_000.0);
        assert_eq!(conservative.refund_paid, 180_000_000.0);
        assert_eq!(conservative.unfunded_refund, 0.0);
        assert_eq!(conservative.residual, 35_000_000.0);
        assert_relative_eq!(conservative.residual_per_rupee, 0.175);

        let aggressive = model.shutdown_scenario(RiskModel::Aggressive, 200_000_000.0);
        assert_eq!(aggressive.residual, 0.0);
        assert_eq!(aggressive.unfunded_refund, 10_000_000.0);
    }

    #[test]
    fn test_unbalanced_split_cannot_build_model() {
        let rows: Vec<_> = AllocationModel::ca_reviewed()
            .iter()
            .map(|(m, p)| {
                let mut profile = p.clone();
                if m == RiskModel::Moderate {
                    profile.split = AllocationSplit { fd: 0.3, mf: 0.3, cash: 0.1 };
                }
                (m, profile)
            })
            .collect();

        let mut table = Assumptions::ca_reviewed();
        table.allocation = AllocationModel::from_loaded(rows);

        // The only public route to a coverage model is through a validated table.
        assert!(matches!(
            ValidatedAssumptions::new(table),
            Err(ConfigError::AllocationSplitMismatch { .. })
        ));
    }
}

//! Scenario runner for dashboard selections
//!
//! Holds one validated assumption table and recomputes every derived figure for
//! a selection in a single call, so callers never see a partially updated view.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, RiskModel, ShareClass, ValidatedAssumptions};
use crate::error::{ConfigError, Result};
use crate::project::{
    CoverageAssessment, PoolTotals, ProjectAggregator, ProjectTotals, RefundCoverageModel, ShutdownScenario,
};
use crate::projection::{
    AlternativeInstrumentProjector, InstrumentSeries, InvestorInput, InvestorProjection, InvestorScenarioCalculator,
};
use crate::resident::{ResidentCalculation, ResidentCostCalculator, ResidentRequest};

/// Pool composition reviewed by the CA: 40 Platinum, 30 Gold, 20 Silver
pub const CA_POOL: [(ShareClass, u32); 3] = [
    (ShareClass::Platinum, 40),
    (ShareClass::Gold, 30),
    (ShareClass::Silver, 20),
];

/// Everything the dashboard lets a user pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub share_class: ShareClass,
    pub number_of_shares: u32,
    pub risk_model: RiskModel,
    pub unit_id: String,
    pub residents: u32,
    pub cars: u32,
    pub stay_years: u32,
    /// Overrides the conservative-fund comparison rate
    pub conservative_rate: Option<f64>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            share_class: ShareClass::Platinum,
            number_of_shares: 1,
            risk_model: RiskModel::Moderate,
            unit_id: "1bhk".to_string(),
            residents: 2,
            cars: 1,
            stay_years: 5,
            conservative_rate: None,
        }
    }
}

impl Selection {
    fn resident_request(&self) -> ResidentRequest {
        ResidentRequest {
            unit_id: self.unit_id.clone(),
            residents: self.residents,
            cars: self.cars,
            stay_years: self.stay_years,
        }
    }
}

/// Pool totals joined with the coverage view for one risk model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolReport {
    pub composition: Vec<(ShareClass, u32)>,
    pub risk_model: RiskModel,
    pub totals: PoolTotals,
    pub project: ProjectTotals,
}

/// Derived figures for one selection, computed together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub selection: Selection,
    pub investor: InvestorProjection,
    pub comparison: Vec<InstrumentSeries>,
    pub coverage: CoverageAssessment,
    /// Investor's pro-rata share of the safety buffer
    pub buffer_share: f64,
    pub shutdown: ShutdownScenario,
    pub pool: PoolReport,
    pub resident: ResidentCalculation,
}

/// Pre-loaded runner for single selections and batches
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
/// let snapshot = runner.evaluate(&Selection::default())?;
/// println!("{}", snapshot.investor.outcome.irr);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    assumptions: ValidatedAssumptions,
    pool: Vec<(ShareClass, u32)>,
}

impl ScenarioRunner {
    /// Validate and take ownership of an assumption table
    pub fn new(assumptions: Assumptions) -> std::result::Result<Self, ConfigError> {
        Ok(Self::from_validated(ValidatedAssumptions::new(assumptions)?))
    }

    pub fn from_validated(assumptions: ValidatedAssumptions) -> Self {
        Self {
            assumptions,
            pool: CA_POOL.to_vec(),
        }
    }

    /// Runner over the compiled CA-reviewed table
    pub fn ca_reviewed() -> std::result::Result<Self, ConfigError> {
        Self::new(Assumptions::ca_reviewed())
    }

    /// Create runner by loading assumptions from CSV files
    pub fn from_csv() -> std::result::Result<Self, ConfigError> {
        Self::new(Assumptions::from_csv()?)
    }

    /// Create runner from specific assumptions directory
    pub fn from_csv_path(path: &Path) -> std::result::Result<Self, ConfigError> {
        Self::new(Assumptions::from_csv_path(path)?)
    }

    /// Replace the pool composition used for project totals
    pub fn with_pool(mut self, composition: &[(ShareClass, u32)]) -> Self {
        self.pool = composition.to_vec();
        self
    }

    pub fn assumptions(&self) -> &ValidatedAssumptions {
        &self.assumptions
    }

    pub fn pool(&self) -> &[(ShareClass, u32)] {
        &self.pool
    }

    fn calculator(&self) -> InvestorScenarioCalculator<'_> {
        InvestorScenarioCalculator::from_assumptions(&self.assumptions)
    }

    pub fn investor(&self, input: &InvestorInput) -> Result<InvestorProjection> {
        self.calculator().project(input)
    }

    pub fn compare(&self, principal: f64, horizon_years: u32, conservative_rate: Option<f64>) -> Vec<InstrumentSeries> {
        AlternativeInstrumentProjector::from_assumptions(&self.assumptions).compare(
            principal,
            horizon_years,
            conservative_rate,
        )
    }

    pub fn coverage(&self, model: RiskModel) -> Result<CoverageAssessment> {
        RefundCoverageModel::from_assumptions(&self.assumptions).assess(model)
    }

    pub fn resident(&self, request: &ResidentRequest) -> Result<ResidentCalculation> {
        ResidentCostCalculator::from_assumptions(&self.assumptions).calculate_for(request)
    }

    /// Single-share positions for every tier in `composition`, each on its tier's horizon
    pub fn evaluate_pool(&self, composition: &[(ShareClass, u32)], model: RiskModel) -> Result<PoolReport> {
        let mut positions = Vec::new();
        for &(class, count) in composition {
            let horizon = self.assumptions.tiers.get(class)?.horizon_years;
            positions.extend(ProjectAggregator::uniform_pool(&[(class, count)], horizon));
        }

        let (_, totals) = ProjectAggregator.evaluate_pool(&self.calculator(), &positions)?;
        let coverage = self.coverage(model)?;

        Ok(PoolReport {
            composition: composition.to_vec(),
            risk_model: model,
            project: ProjectTotals::assemble(&totals, &coverage),
            totals,
        })
    }

    /// Recompute every derived value for `selection`
    pub fn evaluate(&self, selection: &Selection) -> Result<Snapshot> {
        let horizon = self.assumptions.tiers.get(selection.share_class)?.horizon_years;
        let input = InvestorInput::new(selection.share_class, selection.number_of_shares, horizon);

        let investor = self.investor(&input)?;
        let resident = self.resident(&selection.resident_request())?;
        let coverage = self.coverage(selection.risk_model)?;
        let pool = self.evaluate_pool(&self.pool, selection.risk_model)?;

        let invested = investor.outcome.total_invested;
        let total_capital = pool.totals.total_capital;

        Ok(Snapshot {
            selection: selection.clone(),
            comparison: self.compare(invested, horizon, selection.conservative_rate),
            buffer_share: coverage.buffer_share(invested, total_capital),
            shutdown: RefundCoverageModel::from_assumptions(&self.assumptions)
                .shutdown_scenario(selection.risk_model, total_capital),
            investor,
            coverage,
            pool,
            resident,
        })
    }

    /// Evaluate many selections in parallel; each result stands alone
    pub fn evaluate_batch(&self, selections: &[Selection]) -> Vec<Result<Snapshot>> {
        selections.par_iter().map(|s| self.evaluate(s)).collect()
    }
}

//! Static project assumptions: tiers, allocations, resident fees, refund bands,
//! reference rates and coverage figures
//!
//! Assumptions are loaded once, validated, and never mutated afterwards. A
//! table that fails validation is a fatal configuration error.

mod tiers;
mod allocation;
mod residence;
mod rates;
pub mod loader;

pub use tiers::{ShareClass, ShareTierCatalog, TierConstants};
pub use allocation::{AllocationModel, AllocationProfile, AllocationSplit, RiskModel};
pub use residence::{DepositBand, DepositBandSchedule, ResidentFees, UnitCatalog, UnitType};
pub use rates::{CoverageAssumptions, Instrument, PoolAssets, ReferenceRates};
pub use loader::LoadedAssumptions;

use std::collections::HashSet;
use std::ops::Deref;
use std::path::Path;

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::projection::{IrrBasis, IrrSolver, IrrSolverConfig, CashFlowScheduler};

/// Published IRRs must agree with the solver to one basis point
const TIER_IRR_TOLERANCE: f64 = 1e-4;

/// Provenance of an assumption table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumptionsVersion {
    pub tag: String,
    pub effective: NaiveDate,
    pub source: String,
}

/// Container for all engine assumptions
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub version: AssumptionsVersion,
    pub tiers: ShareTierCatalog,
    pub allocation: AllocationModel,
    pub units: UnitCatalog,
    pub fees: ResidentFees,
    pub deposit_bands: DepositBandSchedule,
    pub reference_rates: ReferenceRates,
    pub coverage: CoverageAssumptions,
    pub irr_basis: IrrBasis,
    pub solver: IrrSolverConfig,
}

impl Assumptions {
    /// The CA-reviewed table compiled into the binary
    pub fn ca_reviewed() -> Self {
        Self {
            version: AssumptionsVersion {
                tag: "ca-reviewed-2024.1".to_string(),
                effective: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or_default(),
                source: "CA-reviewed 15-year investor schedule".to_string(),
            },
            tiers: ShareTierCatalog::ca_reviewed(),
            allocation: AllocationModel::ca_reviewed(),
            units: UnitCatalog::ca_reviewed(),
            fees: ResidentFees::default(),
            deposit_bands: DepositBandSchedule::ca_reviewed(),
            reference_rates: ReferenceRates::default(),
            coverage: CoverageAssumptions::ca_reviewed(),
            irr_basis: IrrBasis::default(),
            solver: IrrSolverConfig::default(),
        }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> Result<Self, ConfigError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load and validate assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, ConfigError> {
        let loaded = LoadedAssumptions::load_from(path)?;
        let assumptions = Self::from_loaded(loaded)?;
        assumptions.validate()?;
        info!(
            "Loaded assumptions {} (effective {}) from {}",
            assumptions.version.tag,
            assumptions.version.effective,
            path.display()
        );
        Ok(assumptions)
    }

    fn from_loaded(loaded: LoadedAssumptions) -> Result<Self, ConfigError> {
        let coverage_for = |model: RiskModel| {
            loaded
                .coverage
                .iter()
                .find(|(m, _)| *m == model)
                .map(|(_, assets)| *assets)
                .ok_or_else(|| ConfigError::InvalidValue(format!("coverage.csv has no row for {}", model)))
        };

        Ok(Self {
            coverage: CoverageAssumptions::new(
                loaded.project.liability_inmates,
                coverage_for(RiskModel::Aggressive)?,
                coverage_for(RiskModel::Moderate)?,
                coverage_for(RiskModel::Conservative)?,
            )?,
            version: loaded.version,
            tiers: ShareTierCatalog::from_loaded(&loaded.share_tiers),
            allocation: AllocationModel::from_loaded(loaded.allocation_splits),
            units: UnitCatalog::from_loaded(loaded.unit_catalog),
            fees: loaded.resident_fees,
            deposit_bands: DepositBandSchedule::new(loaded.deposit_bands)?,
            reference_rates: loaded.reference_rates,
            irr_basis: loaded.project.irr_basis,
            solver: IrrSolverConfig::default(),
        })
    }

    /// Check every table invariant. Any failure means the engine must not serve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_solver()?;
        self.validate_tiers()?;
        self.validate_allocation()?;

        DepositBandSchedule::new(self.deposit_bands.bands().to_vec())?;

        let liability = self.coverage.liability();
        if !(liability > 0.0) {
            return Err(ConfigError::NegativeLiabilityConfig(liability));
        }

        self.validate_resident()?;

        for instrument in Instrument::ALL {
            let rate = self.reference_rates.rate(instrument);
            if !rate.is_finite() || rate <= -1.0 {
                return Err(ConfigError::InvalidValue(format!("{} rate {}", instrument, rate)));
            }
        }

        Ok(())
    }

    fn validate_solver(&self) -> Result<(), ConfigError> {
        let s = &self.solver;
        if !(s.tolerance > 0.0) || s.max_iterations == 0 || !(s.lower_bound > -1.0) || s.lower_bound >= s.upper_bound {
            return Err(ConfigError::InvalidValue(format!("IRR solver settings {:?}", s)));
        }
        Ok(())
    }

    fn validate_tiers(&self) -> Result<(), ConfigError> {
        let solver = IrrSolver::new(self.solver);

        for class in ShareClass::ALL {
            let invalid = |reason: &str| ConfigError::InvalidTier {
                tier: class.to_string(),
                reason: reason.to_string(),
            };

            let tier = self.tiers.get(class).map_err(|_| invalid("missing from catalog"))?;
            if !(tier.principal > 0.0) {
                return Err(invalid("principal must be positive"));
            }
            if tier.horizon_years == 0 {
                return Err(invalid("horizon must be at least one year"));
            }
            let payouts = [tier.interest_total, tier.dividend_total, tier.surplus_at_horizon];
            if payouts.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(invalid("payout totals must be finite and non-negative"));
            }

            // The published rate is the horizon-bullet figure.
            let schedule = CashFlowScheduler
                .schedule(tier, 1, tier.horizon_years)
                .map_err(|e| invalid(&e.to_string()))?;
            let solved = solver
                .solve(&schedule.horizon_bullet_flows())
                .map_err(|e| invalid(&e.to_string()))?;
            if (solved - tier.irr).abs() > TIER_IRR_TOLERANCE {
                return Err(ConfigError::TierIrrMismatch {
                    tier: class.to_string(),
                    published: tier.irr,
                    solved,
                });
            }
        }
        Ok(())
    }

    fn validate_allocation(&self) -> Result<(), ConfigError> {
        for model in RiskModel::ALL {
            let split = self
                .allocation
                .split(model)
                .ok_or_else(|| ConfigError::MissingAllocation(model.to_string()))?;
            let parts = [split.fd, split.mf, split.cash];
            if parts.iter().any(|p| !(0.0..=1.0).contains(p)) || !split.is_balanced() {
                return Err(ConfigError::AllocationSplitMismatch {
                    model: model.to_string(),
                    sum: split.sum(),
                });
            }
        }
        Ok(())
    }

    fn validate_resident(&self) -> Result<(), ConfigError> {
        let fees = &self.fees;
        if !(0.0..=1.0).contains(&fees.deposit_percentage) {
            return Err(ConfigError::InvalidValue(format!(
                "deposit percentage {}",
                fees.deposit_percentage
            )));
        }
        let amounts = [
            fees.service_fee_per_person_per_month,
            fees.gst_rate,
            fees.parking_fee_per_car_per_month,
        ];
        if amounts.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::InvalidValue("resident fees must be non-negative".to_string()));
        }

        if self.units.units().is_empty() {
            return Err(ConfigError::InvalidValue("unit catalog is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for unit in self.units.units() {
            if !(unit.base_price > 0.0) {
                return Err(ConfigError::InvalidValue(format!("unit {} has no price", unit.id)));
            }
            if !seen.insert(unit.id.to_ascii_lowercase()) {
                return Err(ConfigError::InvalidValue(format!("duplicate unit id {}", unit.id)));
            }
        }
        Ok(())
    }
}

/// An assumption table that passed `Assumptions::validate`.
///
/// Calculators are only built from this type, so a table that failed
/// validation can never serve a result. Read access goes through `Deref`;
/// there is no way to mutate the inner table.
#[derive(Debug, Clone)]
pub struct ValidatedAssumptions(Assumptions);

impl ValidatedAssumptions {
    pub fn new(assumptions: Assumptions) -> Result<Self, ConfigError> {
        assumptions.validate()?;
        Ok(Self(assumptions))
    }

    pub fn ca_reviewed() -> Result<Self, ConfigError> {
        Self::new(Assumptions::ca_reviewed())
    }

    pub fn from_csv() -> Result<Self, ConfigError> {
        Self::new(Assumptions::from_csv()?)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, ConfigError> {
        Self::new(Assumptions::from_csv_path(path)?)
    }

    pub fn into_inner(self) -> Assumptions {
        self.0
    }
}

impl Deref for ValidatedAssumptions {
    type Target = Assumptions;

    fn deref(&self) -> &Assumptions {
        &self.0
    }
}

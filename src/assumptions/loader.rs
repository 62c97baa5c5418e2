//! CSV-based assumption loader
//!
//! Loads the versioned assumption tables from CSV files in data/assumptions/

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::projection::IrrBasis;

use super::allocation::{AllocationProfile, AllocationSplit, RiskModel};
use super::rates::{Instrument, PoolAssets, ReferenceRates};
use super::residence::{DepositBand, ResidentFees, UnitType};
use super::tiers::{ShareClass, TierConstants};
use super::AssumptionsVersion;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

fn read_rows<T: DeserializeOwned>(path: &Path, file_name: &str) -> Result<Vec<T>, ConfigError> {
    let file = File::open(path.join(file_name))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

fn read_single<T: DeserializeOwned>(path: &Path, file_name: &str) -> Result<T, ConfigError> {
    read_rows(path, file_name)?
        .into_iter()
        .next()
        .ok_or_else(|| ConfigError::InvalidValue(format!("{} has no data row", file_name)))
}

#[derive(Debug, Deserialize)]
struct VersionRow {
    tag: String,
    effective: String,
    source: String,
}

/// Load the table version from version.csv
pub fn load_version(path: &Path) -> Result<AssumptionsVersion, ConfigError> {
    let row: VersionRow = read_single(path, "version.csv")?;
    Ok(AssumptionsVersion {
        tag: row.tag,
        effective: NaiveDate::parse_from_str(row.effective.trim(), "%Y-%m-%d")?,
        source: row.source,
    })
}

#[derive(Debug, Deserialize)]
struct TierRow {
    tier: ShareClass,
    principal: f64,
    interest_total: f64,
    dividend_total: f64,
    surplus_at_horizon: f64,
    irr: f64,
    horizon_years: u32,
}

/// Load tier constants from share_tiers.csv
pub fn load_share_tiers(path: &Path) -> Result<Vec<(ShareClass, TierConstants)>, ConfigError> {
    let rows: Vec<TierRow> = read_rows(path, "share_tiers.csv")?;
    Ok(rows
        .into_iter()
        .map(|r| {
            (
                r.tier,
                TierConstants {
                    principal: r.principal,
                    interest_total: r.interest_total,
                    dividend_total: r.dividend_total,
                    surplus_at_horizon: r.surplus_at_horizon,
                    irr: r.irr,
                    horizon_years: r.horizon_years,
                },
            )
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct AllocationRow {
    model: RiskModel,
    fd: f64,
    mf: f64,
    cash: f64,
    description: String,
}

/// Load risk-model splits from allocation_splits.csv
pub fn load_allocation_splits(path: &Path) -> Result<Vec<(RiskModel, AllocationProfile)>, ConfigError> {
    let rows: Vec<AllocationRow> = read_rows(path, "allocation_splits.csv")?;
    Ok(rows
        .into_iter()
        .map(|r| {
            (
                r.model,
                AllocationProfile {
                    split: AllocationSplit { fd: r.fd, mf: r.mf, cash: r.cash },
                    description: r.description,
                },
            )
        })
        .collect())
}

/// Load the dwelling catalog from unit_catalog.csv
pub fn load_unit_catalog(path: &Path) -> Result<Vec<UnitType>, ConfigError> {
    read_rows(path, "unit_catalog.csv")
}

/// Load recurring fee parameters from resident_fees.csv (one row)
pub fn load_resident_fees(path: &Path) -> Result<ResidentFees, ConfigError> {
    read_single(path, "resident_fees.csv")
}

/// Load refund bands from deposit_bands.csv; an empty max_years marks the open band
pub fn load_deposit_bands(path: &Path) -> Result<Vec<DepositBand>, ConfigError> {
    read_rows(path, "deposit_bands.csv")
}

#[derive(Debug, Deserialize)]
struct RateRow {
    instrument: String,
    rate: f64,
}

/// Load comparison rates from reference_rates.csv. Instruments not listed keep their defaults.
pub fn load_reference_rates(path: &Path) -> Result<ReferenceRates, ConfigError> {
    let rows: Vec<RateRow> = read_rows(path, "reference_rates.csv")?;
    let mut rates = ReferenceRates::default();
    for row in rows {
        let instrument: Instrument = row.instrument.parse()?;
        rates.set_rate(instrument, row.rate);
    }
    Ok(rates)
}

#[derive(Debug, Deserialize)]
struct CoverageRow {
    model: RiskModel,
    fd_pool: f64,
    current_assets: f64,
}

/// Load per-model pool assets from coverage.csv
pub fn load_coverage(path: &Path) -> Result<Vec<(RiskModel, PoolAssets)>, ConfigError> {
    let rows: Vec<CoverageRow> = read_rows(path, "coverage.csv")?;
    Ok(rows
        .into_iter()
        .map(|r| {
            (
                r.model,
                PoolAssets {
                    fd_pool: r.fd_pool,
                    current_assets: r.current_assets,
                },
            )
        })
        .collect())
}

/// Project-level settings from project.csv (one row)
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRow {
    pub liability_inmates: f64,
    pub irr_basis: IrrBasis,
}

pub fn load_project(path: &Path) -> Result<ProjectRow, ConfigError> {
    read_single(path, "project.csv")
}

/// Raw tables read from an assumptions directory
pub struct LoadedAssumptions {
    pub version: AssumptionsVersion,
    pub share_tiers: Vec<(ShareClass, TierConstants)>,
    pub allocation_splits: Vec<(RiskModel, AllocationProfile)>,
    pub unit_catalog: Vec<UnitType>,
    pub resident_fees: ResidentFees,
    pub deposit_bands: Vec<DepositBand>,
    pub reference_rates: ReferenceRates,
    pub coverage: Vec<(RiskModel, PoolAssets)>,
    pub project: ProjectRow,
}

impl LoadedAssumptions {
    /// Load all assumptions from the default path
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load all assumptions from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            version: load_version(path)?,
            share_tiers: load_share_tiers(path)?,
            allocation_splits: load_allocation_splits(path)?,
            unit_catalog: load_unit_catalog(path)?,
            resident_fees: load_resident_fees(path)?,
            deposit_bands: load_deposit_bands(path)?,
            reference_rates: load_reference_rates(path)?,
            coverage: load_coverage(path)?,
            project: load_project(path)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_assumptions() {
        let result = LoadedAssumptions::load_default();
        assert!(result.is_ok(), "Failed to load assumptions: {:?}", result.err());

        let loaded = result.unwrap();

        assert_eq!(loaded.share_tiers.len(), 3);
        assert_eq!(loaded.allocation_splits.len(), 3);
        assert_eq!(loaded.coverage.len(), 3);
        assert!(!loaded.unit_catalog.is_empty());
        assert_eq!(loaded.deposit_bands.first().map(|b| b.min_years), Some(0));
        assert_eq!(loaded.deposit_bands.last().and_then(|b| b.max_years), None);
        assert!(loaded.project.liability_inmates > 0.0);
    }

    #[test]
    fn test_missing_directory() {
        let result = LoadedAssumptions::load_from(Path::new("data/does-not-exist"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}

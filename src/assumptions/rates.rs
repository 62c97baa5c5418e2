//! Reference rates for comparison instruments and refund-pool coverage figures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::allocation::RiskModel;

/// Comparison instrument shown next to the project's return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    FixedDeposit,
    GovernmentBond,
    ConservativeFund,
    AggressiveEquity,
}

impl Instrument {
    pub const ALL: [Instrument; 4] = [
        Instrument::FixedDeposit,
        Instrument::GovernmentBond,
        Instrument::ConservativeFund,
        Instrument::AggressiveEquity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Instrument::FixedDeposit => "Bank Fixed Deposit",
            Instrument::GovernmentBond => "Government Bond",
            Instrument::ConservativeFund => "Conservative Mutual Fund",
            Instrument::AggressiveEquity => "Aggressive Equity Fund",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Instrument::FixedDeposit => "fixed_deposit",
            Instrument::GovernmentBond => "government_bond",
            Instrument::ConservativeFund => "conservative_fund",
            Instrument::AggressiveEquity => "aggressive_equity",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Instrument {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::ALL
            .into_iter()
            .find(|i| i.key() == s.trim())
            .ok_or_else(|| ConfigError::InvalidValue(format!("unknown instrument '{}'", s)))
    }
}

/// Annual reference rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRates {
    pub fixed_deposit: f64,
    pub government_bond: f64,
    /// Default for the conservative fund line; callers may pass 10-14%
    pub conservative_fund: f64,
    pub aggressive_equity: f64,
}

impl Default for ReferenceRates {
    fn default() -> Self {
        Self {
            fixed_deposit: 0.06,
            government_bond: 0.07,
            conservative_fund: 0.10,
            aggressive_equity: 0.13,
        }
    }
}

impl ReferenceRates {
    pub fn rate(&self, instrument: Instrument) -> f64 {
        match instrument {
            Instrument::FixedDeposit => self.fixed_deposit,
            Instrument::GovernmentBond => self.government_bond,
            Instrument::ConservativeFund => self.conservative_fund,
            Instrument::AggressiveEquity => self.aggressive_equity,
        }
    }

    pub fn set_rate(&mut self, instrument: Instrument, rate: f64) {
        match instrument {
            Instrument::FixedDeposit => self.fixed_deposit = rate,
            Instrument::GovernmentBond => self.government_bond = rate,
            Instrument::ConservativeFund => self.conservative_fund = rate,
            Instrument::AggressiveEquity => self.aggressive_equity = rate,
        }
    }
}

/// Ring-fenced assets held under one allocation model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolAssets {
    pub fd_pool: f64,
    pub current_assets: f64,
}

impl PoolAssets {
    pub fn total(&self) -> f64 {
        self.fd_pool + self.current_assets
    }
}

/// Static project figures for the refund-coverage view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageAssumptions {
    /// Total resident refund liability
    liability: f64,
    aggressive: PoolAssets,
    moderate: PoolAssets,
    conservative: PoolAssets,
}

impl CoverageAssumptions {
    /// The liability must be strictly positive; this is the only place it is checked.
    pub fn new(
        liability: f64,
        aggressive: PoolAssets,
        moderate: PoolAssets,
        conservative: PoolAssets,
    ) -> Result<Self, ConfigError> {
        if !(liability > 0.0) || !liability.is_finite() {
            return Err(ConfigError::NegativeLiabilityConfig(liability));
        }
        for (model, assets) in [
            (RiskModel::Aggressive, &aggressive),
            (RiskModel::Moderate, &moderate),
            (RiskModel::Conservative, &conservative),
        ] {
            let amounts = [assets.fd_pool, assets.current_assets];
            if amounts.iter().any(|v| !(*v >= 0.0) || !v.is_finite()) {
                return Err(ConfigError::InvalidValue(format!(
                    "pool assets for {} must be finite and non-negative",
                    model
                )));
            }
        }
        Ok(Self {
            liability,
            aggressive,
            moderate,
            conservative,
        })
    }

    pub fn ca_reviewed() -> Self {
        Self {
            liability: 180_000_000.0,
            aggressive: PoolAssets { fd_pool: 110_000_000.0, current_assets: 60_000_000.0 },
            moderate: PoolAssets { fd_pool: 150_000_000.0, current_assets: 45_000_000.0 },
            conservative: PoolAssets { fd_pool: 185_000_000.0, current_assets: 30_000_000.0 },
        }
    }

    pub fn liability(&self) -> f64 {
        self.liability
    }

    pub fn assets(&self, model: RiskModel) -> PoolAssets {
        match model {
            RiskModel::Aggressive => self.aggressive,
            RiskModel::Moderate => self.moderate,
            RiskModel::Conservative => self.conservative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reference_rates() {
        let rates = ReferenceRates::default();
        assert_eq!(rates.rate(Instrument::FixedDeposit), 0.06);
        assert_eq!(rates.rate(Instrument::GovernmentBond), 0.07);
        assert_eq!(rates.rate(Instrument::AggressiveEquity), 0.13);
    }

    #[test]
    fn test_instrument_keys_parse() {
        assert_eq!("government_bond".parse::<Instrument>().unwrap(), Instrument::GovernmentBond);
        assert!("crypto".parse::<Instrument>().is_err());
    }

    #[test]
    fn test_rejects_non_positive_liability() {
        let assets = PoolAssets { fd_pool: 1.0, current_assets: 1.0 };
        for liability in [0.0, -5.0, f64::NAN] {
            assert!(matches!(
                CoverageAssumptions::new(liability, assets, assets, assets),
                Err(ConfigError::NegativeLiabilityConfig(_))
            ));
        }
    }

    #[test]
    fn test_rejects_non_finite_pool_assets() {
        let good = PoolAssets { fd_pool: 1.0, current_assets: 1.0 };
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            let fd = PoolAssets { fd_pool: bad, ..good };
            let current = PoolAssets { current_assets: bad, ..good };
            assert!(matches!(
                CoverageAssumptions::new(100.0, good, fd, good),
                Err(ConfigError::InvalidValue(_))
            ));
            assert!(matches!(
                CoverageAssumptions::new(100.0, good, good, current),
                Err(ConfigError::InvalidValue(_))
            ));
        }
    }
}

//! Share tier constants (principal, payouts, terminal surplus, published IRR)

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Investment tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShareClass {
    Platinum,
    Gold,
    Silver,
}

impl ShareClass {
    pub const ALL: [ShareClass; 3] = [ShareClass::Platinum, ShareClass::Gold, ShareClass::Silver];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShareClass::Platinum => "Platinum",
            ShareClass::Gold => "Gold",
            ShareClass::Silver => "Silver",
        }
    }
}

impl fmt::Display for ShareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareClass {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "platinum" => Ok(ShareClass::Platinum),
            "gold" => Ok(ShareClass::Gold),
            "silver" => Ok(ShareClass::Silver),
            _ => Err(EngineError::UnknownShareClass(s.to_string())),
        }
    }
}

/// Per-share constants for one tier. All amounts are in rupees per share.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierConstants {
    /// Capital committed per share
    pub principal: f64,

    /// Interest paid over the whole horizon
    pub interest_total: f64,

    /// Dividends paid over the whole horizon
    pub dividend_total: f64,

    /// Surplus share released at the horizon
    pub surplus_at_horizon: f64,

    /// Published annualised return
    pub irr: f64,

    /// Length of the tier's payout schedule in years
    pub horizon_years: u32,
}

impl TierConstants {
    /// Dividends plus interest received during the term
    pub fn cash_in_hand(&self) -> f64 {
        self.dividend_total + self.interest_total
    }
}

/// Lookup of tier constants
#[derive(Debug, Clone)]
pub struct ShareTierCatalog {
    tiers: HashMap<ShareClass, TierConstants>,
}

impl ShareTierCatalog {
    /// Build from loaded rows. Later rows for the same tier replace earlier ones.
    pub fn from_loaded(rows: &[(ShareClass, TierConstants)]) -> Self {
        Self {
            tiers: rows.iter().copied().collect(),
        }
    }

    /// The CA-reviewed 15-year tier table
    pub fn ca_reviewed() -> Self {
        let mut tiers = HashMap::new();

        tiers.insert(
            ShareClass::Platinum,
            TierConstants {
                principal: 3_000_000.0,
                interest_total: 400_000.0,
                dividend_total: 5_550_000.0,
                surplus_at_horizon: 2_068_023.0,
                irr: 0.0906,
                horizon_years: 15,
            },
        );
        tiers.insert(
            ShareClass::Gold,
            TierConstants {
                principal: 2_000_000.0,
                interest_total: 266_000.0,
                dividend_total: 3_700_000.0,
                surplus_at_horizon: 1_378_682.0,
                irr: 0.0906,
                horizon_years: 15,
            },
        );
        tiers.insert(
            ShareClass::Silver,
            TierConstants {
                principal: 1_000_000.0,
                interest_total: 133_000.0,
                dividend_total: 1_850_000.0,
                surplus_at_horizon: 833_674.0,
                irr: 0.0934,
                horizon_years: 15,
            },
        );

        Self { tiers }
    }

    /// Constants for a tier. A catalog missing a tier fails validation at load,
    /// so a miss here is reported as an unknown class.
    pub fn get(&self, class: ShareClass) -> Result<&TierConstants, EngineError> {
        self.tiers
            .get(&class)
            .ok_or_else(|| EngineError::UnknownShareClass(class.to_string()))
    }

    /// Look up by display name, e.g. from a form field
    pub fn get_by_name(&self, name: &str) -> Result<&TierConstants, EngineError> {
        let class: ShareClass = name.parse()?;
        self.get(class)
    }

    /// Tiers in catalog order (Platinum, Gold, Silver)
    pub fn iter(&self) -> impl Iterator<Item = (ShareClass, &TierConstants)> {
        ShareClass::ALL
            .into_iter()
            .filter_map(move |class| self.tiers.get(&class).map(|t| (class, t)))
    }

    pub fn contains(&self, class: ShareClass) -> bool {
        self.tiers.contains_key(&class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_class_parse() {
        assert_eq!("platinum".parse::<ShareClass>().unwrap(), ShareClass::Platinum);
        assert_eq!(" GOLD ".parse::<ShareClass>().unwrap(), ShareClass::Gold);
        assert_eq!(
            "diamond".parse::<ShareClass>(),
            Err(EngineError::UnknownShareClass("diamond".to_string()))
        );
    }

    #[test]
    fn test_ca_reviewed_platinum() {
        let catalog = ShareTierCatalog::ca_reviewed();
        let platinum = catalog.get(ShareClass::Platinum).unwrap();

        assert_eq!(platinum.principal, 3_000_000.0);
        assert_eq!(platinum.cash_in_hand(), 5_950_000.0);
        assert_eq!(platinum.horizon_years, 15);
    }

    #[test]
    fn test_missing_tier() {
        let catalog = ShareTierCatalog::from_loaded(&[]);
        assert!(catalog.get(ShareClass::Gold).is_err());
        assert!(catalog.get_by_name("Gold").is_err());
    }
}

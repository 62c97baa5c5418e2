//! Risk-model allocation splits between fixed deposits, mutual funds and cash

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tolerance for an allocation split summing to one
pub const SPLIT_TOLERANCE: f64 = 1e-6;

/// Investment posture for the ring-fenced refund pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskModel {
    Aggressive,
    Moderate,
    Conservative,
}

impl RiskModel {
    pub const ALL: [RiskModel; 3] = [RiskModel::Aggressive, RiskModel::Moderate, RiskModel::Conservative];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskModel::Aggressive => "Aggressive",
            RiskModel::Moderate => "Moderate",
            RiskModel::Conservative => "Conservative",
        }
    }
}

impl fmt::Display for RiskModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskModel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Ok(RiskModel::Aggressive),
            "moderate" => Ok(RiskModel::Moderate),
            "conservative" => Ok(RiskModel::Conservative),
            _ => Err(EngineError::UnknownRiskModel(s.to_string())),
        }
    }
}

/// Fractions of the pool held in each bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationSplit {
    pub fd: f64,
    pub mf: f64,
    pub cash: f64,
}

impl AllocationSplit {
    pub fn sum(&self) -> f64 {
        self.fd + self.mf + self.cash
    }

    pub fn is_balanced(&self) -> bool {
        (self.sum() - 1.0).abs() <= SPLIT_TOLERANCE
    }
}

/// Split plus the text shown next to the selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationProfile {
    pub split: AllocationSplit,
    pub description: String,
}

/// Risk model -> allocation profile
#[derive(Debug, Clone)]
pub struct AllocationModel {
    profiles: HashMap<RiskModel, AllocationProfile>,
}

impl AllocationModel {
    pub fn from_loaded(rows: Vec<(RiskModel, AllocationProfile)>) -> Self {
        Self {
            profiles: rows.into_iter().collect(),
        }
    }

    pub fn ca_reviewed() -> Self {
        let mut profiles = HashMap::new();

        profiles.insert(
            RiskModel::Aggressive,
            AllocationProfile {
                split: AllocationSplit { fd: 0.40, mf: 0.50, cash: 0.10 },
                description: "Growth-oriented: half the pool in mutual funds, higher return with market exposure".to_string(),
            },
        );
        profiles.insert(
            RiskModel::Moderate,
            AllocationProfile {
                split: AllocationSplit { fd: 0.60, mf: 0.30, cash: 0.10 },
                description: "Balanced: fixed deposits anchor the refund pool with a measured fund allocation".to_string(),
            },
        );
        profiles.insert(
            RiskModel::Conservative,
            AllocationProfile {
                split: AllocationSplit { fd: 0.80, mf: 0.10, cash: 0.10 },
                description: "Capital protection: refund pool held almost entirely in fixed deposits".to_string(),
            },
        );

        Self { profiles }
    }

    pub fn profile(&self, model: RiskModel) -> Option<&AllocationProfile> {
        self.profiles.get(&model)
    }

    /// Split for a model. Completeness is checked at load.
    pub fn split(&self, model: RiskModel) -> Option<AllocationSplit> {
        self.profiles.get(&model).map(|p| p.split)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiskModel, &AllocationProfile)> {
        RiskModel::ALL
            .into_iter()
            .filter_map(move |m| self.profiles.get(&m).map(|p| (m, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ca_reviewed_splits_balanced() {
        let model = AllocationModel::ca_reviewed();
        for risk in RiskModel::ALL {
            let split = model.split(risk).unwrap();
            assert!(split.is_balanced(), "{} sums to {}", risk, split.sum());
        }
    }

    #[test]
    fn test_conservative_holds_most_fd() {
        let model = AllocationModel::ca_reviewed();
        let conservative = model.split(RiskModel::Conservative).unwrap();
        let aggressive = model.split(RiskModel::Aggressive).unwrap();
        assert!(conservative.fd > aggressive.fd);
        assert!(conservative.mf < aggressive.mf);
    }

    #[test]
    fn test_risk_model_parse() {
        assert_eq!("Moderate".parse::<RiskModel>().unwrap(), RiskModel::Moderate);
        assert!(matches!(
            "reckless".parse::<RiskModel>(),
            Err(EngineError::UnknownRiskModel(_))
        ));
    }
}

//! Resident-side assumptions: unit catalog, recurring fees and deposit refund bands

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EngineError};

/// A dwelling unit on offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub id: String,
    pub category: String,
    pub sqft: u32,
    pub base_price: f64,
    pub bedrooms: u8,
}

/// Static unit catalog
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    units: Vec<UnitType>,
}

impl UnitCatalog {
    pub fn from_loaded(units: Vec<UnitType>) -> Self {
        Self { units }
    }

    pub fn ca_reviewed() -> Self {
        let unit = |id: &str, category: &str, sqft, base_price, bedrooms| UnitType {
            id: id.to_string(),
            category: category.to_string(),
            sqft,
            base_price,
            bedrooms,
        };

        Self {
            units: vec![
                unit("studio", "Studio Suite", 450, 2_500_000.0, 0),
                unit("1bhk", "One Bedroom Apartment", 650, 3_500_000.0, 1),
                unit("2bhk", "Two Bedroom Apartment", 950, 5_200_000.0, 2),
                unit("villa", "Garden Villa", 1_400, 7_800_000.0, 3),
            ],
        }
    }

    /// Case-insensitive lookup by id
    pub fn get(&self, id: &str) -> Result<&UnitType, EngineError> {
        self.units
            .iter()
            .find(|u| u.id.eq_ignore_ascii_case(id.trim()))
            .ok_or_else(|| EngineError::UnknownUnitType(id.to_string()))
    }

    pub fn units(&self) -> &[UnitType] {
        &self.units
    }
}

/// Recurring fee and deposit parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidentFees {
    /// Refundable deposit as a fraction of base price
    pub deposit_percentage: f64,
    pub service_fee_per_person_per_month: f64,
    /// GST applied to the service fee only
    pub gst_rate: f64,
    pub parking_fee_per_car_per_month: f64,
}

impl Default for ResidentFees {
    fn default() -> Self {
        Self {
            deposit_percentage: 0.15,
            service_fee_per_person_per_month: 18_000.0,
            gst_rate: 0.18,
            parking_fee_per_car_per_month: 1_500.0,
        }
    }
}

/// Stay-duration interval mapped to a refund percentage.
/// `max_years == None` marks the open-ended final band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepositBand {
    pub min_years: u32,
    pub max_years: Option<u32>,
    pub refund_percentage: f64,
}

impl DepositBand {
    pub fn contains(&self, stay_years: u32) -> bool {
        stay_years >= self.min_years && self.max_years.map_or(true, |max| stay_years < max)
    }
}

/// Ordered refund bands covering [0, inf)
#[derive(Debug, Clone)]
pub struct DepositBandSchedule {
    bands: Vec<DepositBand>,
}

impl DepositBandSchedule {
    /// Build and validate. Bands must start at 0, be contiguous, end open,
    /// and never increase the refund as the stay lengthens.
    pub fn new(bands: Vec<DepositBand>) -> Result<Self, ConfigError> {
        let invalid = |msg: String| Err(ConfigError::InvalidDepositBands(msg));

        let Some(first) = bands.first() else {
            return invalid("no bands defined".to_string());
        };
        if first.min_years != 0 {
            return invalid(format!("first band starts at {} years, expected 0", first.min_years));
        }

        for (i, band) in bands.iter().enumerate() {
            if !(0.0..=1.0).contains(&band.refund_percentage) {
                return invalid(format!("band {} refund {} outside [0, 1]", i, band.refund_percentage));
            }
            let is_last = i + 1 == bands.len();
            match (band.max_years, is_last) {
                (None, true) => {}
                (None, false) => return invalid(format!("band {} is open-ended but not last", i)),
                (Some(_), true) => return invalid("final band must be open-ended".to_string()),
                (Some(max), false) => {
                    if max <= band.min_years {
                        return invalid(format!("band {} is empty: [{}, {})", i, band.min_years, max));
                    }
                    let next = &bands[i + 1];
                    if next.min_years != max {
                        return invalid(format!(
                            "gap or overlap between band {} (ends {}) and band {} (starts {})",
                            i, max, i + 1, next.min_years
                        ));
                    }
                    if next.refund_percentage > band.refund_percentage {
                        return invalid(format!("refund increases from band {} to band {}", i, i + 1));
                    }
                }
            }
        }

        Ok(Self { bands })
    }

    /// Fallback schedule used by `Assumptions::ca_reviewed`
    pub fn ca_reviewed() -> Self {
        Self {
            bands: vec![
                DepositBand { min_years: 0, max_years: Some(10), refund_percentage: 0.90 },
                DepositBand { min_years: 10, max_years: Some(15), refund_percentage: 0.75 },
                DepositBand { min_years: 15, max_years: Some(20), refund_percentage: 0.60 },
                DepositBand { min_years: 20, max_years: None, refund_percentage: 0.50 },
            ],
        }
    }

    /// Band containing the given stay
    pub fn band_for(&self, stay_years: u32) -> &DepositBand {
        // Validated schedules cover every u32, and the last band is open.
        self.bands
            .iter()
            .find(|b| b.contains(stay_years))
            .unwrap_or_else(|| &self.bands[self.bands.len() - 1])
    }

    pub fn refund_percentage(&self, stay_years: u32) -> f64 {
        self.band_for(stay_years).refund_percentage
    }

    pub fn bands(&self) -> &[DepositBand] {
        &self.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_lookup_edges() {
        let schedule = DepositBandSchedule::ca_reviewed();

        assert_eq!(schedule.refund_percentage(0), 0.90);
        assert_eq!(schedule.refund_percentage(5), 0.90);
        assert_eq!(schedule.refund_percentage(9), 0.90);
        assert_eq!(schedule.refund_percentage(10), 0.75);
        assert_eq!(schedule.refund_percentage(19), 0.60);
        assert_eq!(schedule.refund_percentage(20), 0.50);
        assert_eq!(schedule.refund_percentage(u32::MAX), 0.50);
    }

    #[test]
    fn test_ca_reviewed_bands_validate() {
        let bands = DepositBandSchedule::ca_reviewed().bands().to_vec();
        assert!(DepositBandSchedule::new(bands).is_ok());
    }

    #[test]
    fn test_rejects_gap() {
        let bands = vec![
            DepositBand { min_years: 0, max_years: Some(10), refund_percentage: 0.9 },
            DepositBand { min_years: 12, max_years: None, refund_percentage: 0.5 },
        ];
        assert!(matches!(
            DepositBandSchedule::new(bands),
            Err(ConfigError::InvalidDepositBands(_))
        ));
    }

    #[test]
    fn test_rejects_increasing_refund() {
        let bands = vec![
            DepositBand { min_years: 0, max_years: Some(10), refund_percentage: 0.5 },
            DepositBand { min_years: 10, max_years: None, refund_percentage: 0.9 },
        ];
        assert!(DepositBandSchedule::new(bands).is_err());
    }

    #[test]
    fn test_rejects_closed_final_band() {
        let bands = vec![DepositBand { min_years: 0, max_years: Some(30), refund_percentage: 0.9 }];
        assert!(DepositBandSchedule::new(bands).is_err());
    }

    #[test]
    fn test_unit_lookup() {
        let catalog = UnitCatalog::ca_reviewed();
        assert_eq!(catalog.get("1BHK").unwrap().base_price, 3_500_000.0);
        assert_eq!(
            catalog.get("penthouse"),
            Err(EngineError::UnknownUnitType("penthouse".to_string()))
        );
    }
}

//! Compounded comparison lines (fixed deposit, bond, funds)

use serde::{Deserialize, Serialize};

use crate::assumptions::{Instrument, ReferenceRates, ValidatedAssumptions};
use crate::units::to_lakh;

/// Year-end values of one comparison instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSeries {
    pub instrument: Instrument,
    pub label: String,
    pub rate: f64,
    /// value[t] for t = 0..=horizon, rupees
    pub values: Vec<f64>,
    /// Same values in lakhs for the chart renderer
    pub values_lakh: Vec<f64>,
}

impl InstrumentSeries {
    pub fn final_value(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }
}

/// Compounds a principal at the configured reference rates
#[derive(Debug, Clone, Copy)]
pub struct AlternativeInstrumentProjector {
    rates: ReferenceRates,
}

impl AlternativeInstrumentProjector {
    pub(crate) fn new(rates: ReferenceRates) -> Self {
        Self { rates }
    }

    pub fn from_assumptions(assumptions: &ValidatedAssumptions) -> Self {
        Self::new(assumptions.reference_rates)
    }

    /// `principal * (1 + annual_rate)^t` for t = 0..=horizon_years
    pub fn project(principal: f64, horizon_years: u32, annual_rate: f64) -> Vec<f64> {
        (0..=horizon_years)
            .map(|t| principal * (1.0 + annual_rate).powi(t as i32))
            .collect()
    }

    pub fn series(&self, instrument: Instrument, principal: f64, horizon_years: u32) -> InstrumentSeries {
        self.series_at(instrument, principal, horizon_years, self.rates.rate(instrument))
    }

    fn series_at(&self, instrument: Instrument, principal: f64, horizon_years: u32, rate: f64) -> InstrumentSeries {
        let values = Self::project(principal, horizon_years, rate);
        InstrumentSeries {
            instrument,
            label: instrument.label().to_string(),
            rate,
            values_lakh: values.iter().copied().map(to_lakh).collect(),
            values,
        }
    }

    /// One series per reference instrument. `conservative_rate` overrides the
    /// configured conservative-fund rate when the caller shows a 10-14% band.
    pub fn compare(
        &self,
        principal: f64,
        horizon_years: u32,
        conservative_rate: Option<f64>,
    ) -> Vec<InstrumentSeries> {
        Instrument::ALL
            .into_iter()
            .map(|instrument| {
                let rate = match (instrument, conservative_rate) {
                    (Instrument::ConservativeFund, Some(rate)) => rate,
                    _ => self.rates.rate(instrument),
                };
                self.series_at(instrument, principal, horizon_years, rate)
            })
            .collect()
    }
}

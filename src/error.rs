//! Error types for the projection engine
//!
//! `EngineError` covers per-call failures surfaced to the presentation layer.
//! `ConfigError` covers assumption-table problems, which are fatal at load.

use thiserror::Error;

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, EngineError>;

/// Per-call calculation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid {field}: {value} (allowed: {allowed})")]
    InvalidQuantity {
        field: &'static str,
        value: i64,
        allowed: String,
    },

    #[error("invalid horizon: tier schedule is defined for {expected} years, got {actual}")]
    InvalidHorizon { expected: u32, actual: u32 },

    #[error("unknown share class '{0}'")]
    UnknownShareClass(String),

    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("unknown risk model '{0}'")]
    UnknownRiskModel(String),

    #[error("IRR solver found no root: {reason}")]
    NoRootFound { reason: String },

    #[error("pool surplus mismatch: expected {expected:.2}, aggregated {actual:.2}")]
    AggregationMismatch { expected: f64, actual: f64 },
}

impl EngineError {
    pub(crate) fn quantity(field: &'static str, value: i64, allowed: impl Into<String>) -> Self {
        EngineError::InvalidQuantity {
            field,
            value,
            allowed: allowed.into(),
        }
    }
}

/// Assumption-table failures. Any of these means no calculation may be served.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("resident refund liability must be positive, got {0}")]
    NegativeLiabilityConfig(f64),

    #[error("allocation split for {model} sums to {sum}, expected 1.0")]
    AllocationSplitMismatch { model: String, sum: f64 },

    #[error("allocation split for {0} is missing")]
    MissingAllocation(String),

    #[error("invalid deposit bands: {0}")]
    InvalidDepositBands(String),

    #[error("invalid tier {tier}: {reason}")]
    InvalidTier { tier: String, reason: String },

    #[error("published IRR for {tier} is {published:.4}, solver gives {solved:.6}")]
    TierIrrMismatch {
        tier: String,
        published: f64,
        solved: f64,
    },

    #[error("invalid assumption value: {0}")]
    InvalidValue(String),

    #[error("failed to read assumptions: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse assumptions CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse assumption date: {0}")]
    Date(#[from] chrono::ParseError),
}

//! Error types for baseline construction and projection

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Failures reported by the baseline and the projection engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The assumption set does not cover exactly the baseline's sectors
    #[error("Assumption set does not match baseline sectors (missing: {missing:?}, unexpected: {unexpected:?})")]
    AssumptionMismatch {
        /// Baseline sectors with no assumption
        missing: Vec<String>,
        /// Assumptions naming a sector absent from the baseline
        unexpected: Vec<String>,
    },

    /// Compounding base `1 + rate` would be negative (or the rate is not finite)
    #[error("Invalid growth rate for {sector_id}: {rate} (1 + rate must be >= 0)")]
    InvalidGrowthRate { sector_id: String, rate: f64 },

    /// Target multiple must be positive and finite
    #[error("Invalid target multiple for {sector_id}: {multiple} (must be > 0)")]
    InvalidMultiple { sector_id: String, multiple: f64 },

    /// Baseline failed validation at construction
    #[error("Invalid baseline: {reason}")]
    InvalidBaseline { reason: String },

    /// Lookup of a sector that the baseline does not contain
    #[error("Unknown sector: {sector_id}")]
    UnknownSector { sector_id: String },

    /// Individually finite sector figures summed or divided past the f64 range
    #[error("Projected {quantity} is not finite")]
    NonFiniteTotal { quantity: &'static str },
}

impl ProjectionError {
    pub(crate) fn invalid_baseline(reason: impl Into<String>) -> Self {
        ProjectionError::InvalidBaseline { reason: reason.into() }
    }
}

/// Failures while reading baseline or assumption tables from CSV
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Rejected `start:end:step` axis for a sensitivity sweep
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AxisError {
    #[error("Axis bounds and step must be finite (start {start}, end {end}, step {step})")]
    NonFinite { start: f64, end: f64, step: f64 },

    #[error("Axis step must be positive, got {step}")]
    NonPositiveStep { step: f64 },

    #[error("Axis end {end} is below start {start}")]
    Reversed { start: f64, end: f64 },

    #[error("Axis would have more than {max} points")]
    TooManyPoints { max: usize },
}

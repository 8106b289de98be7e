//! Index Projection - sector-weighted forward valuation of an equity index
//!
//! This library provides:
//! - An immutable baseline composition (sector weights, current P/Es, index price)
//! - Per-sector growth and target-multiple assumptions, built uniformly or per sector
//! - A pure projection engine compounding sector earnings to a horizon
//! - Scenario batches and sensitivity grids over a shared baseline

pub mod error;
pub mod baseline;
pub mod assumptions;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{AxisError, LoadError, ProjectionError};
pub use baseline::{load_baseline, Baseline, SectorRecord};
pub use assumptions::{AssumptionSet, SectorAssumption};
pub use projection::{project, ProjectionConfig, ProjectionEngine, ProjectionResult, ProjectionSummary, SectorProjection};
pub use scenario::ScenarioRunner;

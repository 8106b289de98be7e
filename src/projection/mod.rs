//! Projection engine for forward index valuation

mod contributions;
mod engine;
pub mod writer;

pub use contributions::{ProjectionResult, ProjectionSummary, SectorProjection};
pub use engine::{
    compound_factor, project, ProjectionConfig, ProjectionEngine, REFERENCE_HORIZON_PERIODS,
};

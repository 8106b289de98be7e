//! Baseline index composition: sector weights, current multiples, and base price
//!
//! A `Baseline` is validated once at construction and never mutated afterwards.
//! It allocates the index's aggregate earnings across sectors in proportion to
//! each sector's weight-to-multiple ratio.

mod reference;
pub mod loader;

pub use reference::{load_baseline, reference_as_of, REFERENCE_BASE_PRICE, REFERENCE_MULTIPLE};

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Allowed deviation of the weight sum from 1.0
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// One row of the baseline composition table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRecord {
    pub sector_id: String,

    /// Fraction of index value, in (0, 1]
    pub weight: f64,

    /// Current price/earnings multiple, > 0
    pub current_multiple: f64,
}

impl SectorRecord {
    pub fn new(sector_id: impl Into<String>, weight: f64, current_multiple: f64) -> Self {
        Self {
            sector_id: sector_id.into(),
            weight,
            current_multiple,
        }
    }

    /// Weight per unit of multiple; the sector's share of earnings before normalization
    pub fn weight_over_multiple(&self) -> f64 {
        self.weight / self.current_multiple
    }
}

/// Immutable reference decomposition of the index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Baseline {
    base_index_price: f64,

    /// Blended multiple used to back aggregate earnings out of the index price
    reference_multiple: f64,

    /// Valuation date of the table, if known
    as_of: Option<NaiveDate>,

    records: Vec<SectorRecord>,
}

impl Baseline {
    /// Build a baseline, rejecting weights that do not sum to 1.0
    pub fn new(
        base_index_price: f64,
        reference_multiple: f64,
        records: Vec<SectorRecord>,
    ) -> Result<Self> {
        validate_scalars(base_index_price, reference_multiple)?;
        validate_records(&records)?;

        let total_weight: f64 = records.iter().map(|r| r.weight).sum();
        if (total_weight - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ProjectionError::invalid_baseline(format!(
                "sector weights sum to {total_weight}, expected 1.0"
            )));
        }

        Ok(Self {
            base_index_price,
            reference_multiple,
            as_of: None,
            records,
        })
    }

    /// Build a baseline after rescaling weights proportionally so they sum to 1.0
    ///
    /// Published sector weights are rounded and rarely sum to exactly one.
    /// Rescaling leaves each sector's base earnings contribution unchanged since
    /// the allocation is normalized by the weight-over-multiple total anyway.
    pub fn new_normalized(
        base_index_price: f64,
        reference_multiple: f64,
        records: Vec<SectorRecord>,
    ) -> Result<Self> {
        validate_records(&records)?;
        Self::new(base_index_price, reference_multiple, normalize_weights(records))
    }

    /// Build a baseline whose reference multiple is the weighted harmonic mean
    /// of the sector multiples
    ///
    /// With this choice, zero growth and unchanged multiples reproduce
    /// `base_index_price` exactly at any horizon.
    pub fn with_harmonic_reference(base_index_price: f64, records: Vec<SectorRecord>) -> Result<Self> {
        validate_records(&records)?;
        let total: f64 = records.iter().map(SectorRecord::weight_over_multiple).sum();
        let weight: f64 = records.iter().map(|r| r.weight).sum();
        Self::new(base_index_price, weight / total, records)
    }

    /// Attach the valuation date of the table
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn base_index_price(&self) -> f64 {
        self.base_index_price
    }

    pub fn reference_multiple(&self) -> f64 {
        self.reference_multiple
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    /// Records in table order
    pub fn records(&self) -> &[SectorRecord] {
        &self.records
    }

    pub fn record(&self, sector_id: &str) -> Option<&SectorRecord> {
        self.records.iter().find(|r| r.sector_id == sector_id)
    }

    pub fn sector_ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.sector_id.as_str())
    }

    pub fn contains(&self, sector_id: &str) -> bool {
        self.record(sector_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Weighted harmonic mean of current multiples, `1 / total_weight_over_multiple`
    ///
    /// The multiple at which today's sector earnings reprice to the base index
    /// price. Differs from `reference_multiple` unless the baseline was built
    /// with `with_harmonic_reference`.
    pub fn harmonic_multiple(&self) -> f64 {
        1.0 / self.total_weight_over_multiple()
    }

    /// Aggregate index earnings implied by price and reference multiple
    pub fn base_index_earnings(&self) -> f64 {
        self.base_index_price / self.reference_multiple
    }

    /// Sum of weight / current_multiple over all sectors
    ///
    /// Never zero: construction guarantees at least one record with positive
    /// weight and a positive, finite multiple.
    pub fn total_weight_over_multiple(&self) -> f64 {
        self.records.iter().map(SectorRecord::weight_over_multiple).sum()
    }

    /// Share of base index earnings attributed to a sector
    ///
    /// `(weight / current_multiple / total_weight_over_multiple) * base_index_earnings`.
    /// A sector trading at a richer multiple for the same weight contributes
    /// proportionally less current earnings. Summed over all sectors this equals
    /// `base_index_earnings`.
    pub fn base_earnings_contribution(&self, sector_id: &str) -> Result<f64> {
        let record = self.lookup(sector_id)?;
        Ok(self.earnings_share(record))
    }

    /// Today's price contribution of a sector: weight * base index price
    pub fn spot_price_contribution(&self, sector_id: &str) -> Result<f64> {
        let record = self.lookup(sector_id)?;
        Ok(record.weight * self.base_index_price)
    }

    pub(crate) fn earnings_share(&self, record: &SectorRecord) -> f64 {
        record.weight_over_multiple() / self.total_weight_over_multiple()
            * self.base_index_earnings()
    }

    fn lookup(&self, sector_id: &str) -> Result<&SectorRecord> {
        self.record(sector_id).ok_or_else(|| ProjectionError::UnknownSector {
            sector_id: sector_id.to_string(),
        })
    }
}

fn validate_scalars(base_index_price: f64, reference_multiple: f64) -> Result<()> {
    if !(base_index_price.is_finite() && base_index_price > 0.0) {
        return Err(ProjectionError::invalid_baseline(format!(
            "base index price must be positive, got {base_index_price}"
        )));
    }
    if !(reference_multiple.is_finite() && reference_multiple > 0.0) {
        return Err(ProjectionError::invalid_baseline(format!(
            "reference multiple must be positive, got {reference_multiple}"
        )));
    }
    Ok(())
}

fn validate_records(records: &[SectorRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(ProjectionError::invalid_baseline("no sector records"));
    }

    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if record.sector_id.trim().is_empty() {
            return Err(ProjectionError::invalid_baseline("empty sector id"));
        }
        if !seen.insert(record.sector_id.as_str()) {
            return Err(ProjectionError::invalid_baseline(format!(
                "duplicate sector id {}",
                record.sector_id
            )));
        }
        if !(record.weight.is_finite() && record.weight > 0.0 && record.weight <= 1.0) {
            return Err(ProjectionError::invalid_baseline(format!(
                "weight for {} must be in (0, 1], got {}",
                record.sector_id, record.weight
            )));
        }
        if !(record.current_multiple.is_finite() && record.current_multiple > 0.0) {
            return Err(ProjectionError::invalid_baseline(format!(
                "current multiple for {} must be positive, got {}",
                record.sector_id, record.current_multiple
            )));
        }
    }

    Ok(())
}

/// Rescale weights to sum to 1.0. Callers must pass validated (positive) weights.
fn normalize_weights(records: Vec<SectorRecord>) -> Vec<SectorRecord> {
    let total: f64 = records.iter().map(|r| r.weight).sum();
    records
        .into_iter()
        .map(|r| SectorRecord {
            weight: r.weight / total,
            ..r
        })
        .collect()
}

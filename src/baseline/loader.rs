//! Load a baseline composition table from CSV
//!
//! Expected columns: `Sector,Weight,CurrentPE`. Row order becomes the
//! baseline's sector order.

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{Baseline, SectorRecord};
use crate::error::LoadError;

/// Default location of the baseline table
pub const DEFAULT_BASELINE_PATH: &str = "data/baseline.csv";

/// How to treat weights that do not sum to exactly 1.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightHandling {
    /// Reject the table unless weights sum to 1.0 within tolerance
    #[default]
    Strict,
    /// Rescale weights proportionally
    Normalize,
}

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Sector")]
    sector: String,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "CurrentPE")]
    current_pe: f64,
}

impl CsvRow {
    fn into_record(self) -> SectorRecord {
        SectorRecord::new(self.sector.trim(), self.weight, self.current_pe)
    }
}

/// Load a baseline from a CSV file
pub fn load_baseline_from_csv<P: AsRef<Path>>(
    path: P,
    base_index_price: f64,
    reference_multiple: f64,
    weights: WeightHandling,
) -> Result<Baseline, LoadError> {
    let path = path.as_ref();
    log::debug!("Loading baseline from {}", path.display());
    let reader = Reader::from_path(path)?;
    build(reader, base_index_price, reference_multiple, weights)
}

/// Load a baseline from any reader (e.g., string buffer, request body)
pub fn load_baseline_from_reader<R: Read>(
    reader: R,
    base_index_price: f64,
    reference_multiple: f64,
    weights: WeightHandling,
) -> Result<Baseline, LoadError> {
    build(Reader::from_reader(reader), base_index_price, reference_multiple, weights)
}

fn build<R: Read>(
    mut reader: Reader<R>,
    base_index_price: f64,
    reference_multiple: f64,
    weights: WeightHandling,
) -> Result<Baseline, LoadError> {
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.into_record());
    }
    log::debug!("Read {} sector rows", records.len());

    let baseline = match weights {
        WeightHandling::Strict => Baseline::new(base_index_price, reference_multiple, records)?,
        WeightHandling::Normalize => {
            Baseline::new_normalized(base_index_price, reference_multiple, records)?
        }
    };
    Ok(baseline)
}

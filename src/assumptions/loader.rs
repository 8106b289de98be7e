//! CSV-based assumption loader
//!
//! Expected columns: `Sector,AnnualGrowth,TargetPE`, growth as a fraction.

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{AssumptionSet, SectorAssumption};
use crate::error::LoadError;

/// Default path to the sample assumption table
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions.csv";

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Sector")]
    sector: String,
    #[serde(rename = "AnnualGrowth")]
    annual_growth: f64,
    #[serde(rename = "TargetPE")]
    target_pe: f64,
}

/// Load an assumption set from a CSV file
pub fn load_assumptions<P: AsRef<Path>>(path: P) -> Result<AssumptionSet, LoadError> {
    let path = path.as_ref();
    log::debug!("Loading assumptions from {}", path.display());
    read_all(Reader::from_path(path)?)
}

/// Load an assumption set from any reader
pub fn load_assumptions_from_reader<R: Read>(reader: R) -> Result<AssumptionSet, LoadError> {
    read_all(Reader::from_reader(reader))
}

fn read_all<R: Read>(mut reader: Reader<R>) -> Result<AssumptionSet, LoadError> {
    let mut set = AssumptionSet::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let sector_id = row.sector.trim().to_string();
        if set
            .insert(SectorAssumption::new(sector_id.as_str(), row.annual_growth, row.target_pe))
            .is_some()
        {
            log::warn!("Duplicate assumption row for {sector_id}; keeping the last one");
        }
    }

    log::debug!("Read {} sector assumptions", set.len());
    Ok(set)
}

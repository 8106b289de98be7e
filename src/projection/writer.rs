//! CSV output of per-sector contributions

use std::io::Write;
use std::path::Path;

use csv::Writer;

use super::contributions::ProjectionResult;

const HEADER: [&str; 5] = ["Sector", "BaseEPS", "ProjectedEPS", "SpotPrice", "ProjectedPrice"];

/// Write per-sector rows followed by a `Total` row
pub fn write_projection<W: Write>(result: &ProjectionResult, out: W) -> Result<(), csv::Error> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(HEADER)?;

    for row in &result.per_sector {
        writer.write_record([
            row.sector_id.clone(),
            format!("{:.6}", row.base_earnings_contribution),
            format!("{:.6}", row.projected_earnings_contribution),
            format!("{:.4}", row.spot_price_contribution),
            format!("{:.4}", row.projected_price_contribution),
        ])?;
    }

    let spot_total: f64 = result.per_sector.iter().map(|r| r.spot_price_contribution).sum();
    writer.write_record([
        "Total".to_string(),
        format!("{:.6}", result.base_index_earnings),
        format!("{:.6}", result.total_projected_earnings),
        format!("{:.4}", spot_total),
        format!("{:.4}", result.total_projected_price),
    ])?;

    writer.flush()?;
    Ok(())
}

/// Write the projection to a CSV file
pub fn write_projection_csv<P: AsRef<Path>>(result: &ProjectionResult, path: P) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_projection(result, file)
}

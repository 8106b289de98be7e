//! Static reference composition: S&P 500 sector breakdown, February 2026

use chrono::NaiveDate;

use super::{normalize_weights, Baseline, SectorRecord};

/// Index level on the reference date
pub const REFERENCE_BASE_PRICE: f64 = 6858.47;

/// Blended P/E used to back out index earnings from the reference price
pub const REFERENCE_MULTIPLE: f64 = 22.0;

/// Valuation date of the reference table
pub fn reference_as_of() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2026, 2, 1)
}

/// Published GICS sector weights and forward P/Es.
/// Weights are rounded to 0.5% and sum to 1.005 as published.
const REFERENCE_SECTORS: [(&str, f64, f64); 11] = [
    ("Info Tech", 0.315, 31.0),
    ("Financials", 0.130, 15.5),
    ("Health Care", 0.120, 19.0),
    ("Cons Discret", 0.100, 26.5),
    ("Comm Svcs", 0.090, 21.5),
    ("Industrials", 0.085, 23.0),
    ("Cons Staples", 0.060, 20.5),
    ("Energy", 0.035, 12.5),
    ("Utilities", 0.025, 19.0),
    ("Real Estate", 0.025, 18.0),
    ("Materials", 0.020, 20.0),
];

/// Published records before weight normalization
pub(super) fn reference_records() -> Vec<SectorRecord> {
    REFERENCE_SECTORS
        .iter()
        .map(|&(id, weight, pe)| SectorRecord::new(id, weight, pe))
        .collect()
}

/// Reference baseline shared read-only by projection calls
///
/// The table is fixed and known valid, so this is infallible; weights are
/// rescaled to sum to 1.0.
pub fn load_baseline() -> Baseline {
    Baseline {
        base_index_price: REFERENCE_BASE_PRICE,
        reference_multiple: REFERENCE_MULTIPLE,
        as_of: reference_as_of(),
        records: normalize_weights(reference_records()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_baseline_passes_validation() {
        let validated =
            Baseline::new_normalized(REFERENCE_BASE_PRICE, REFERENCE_MULTIPLE, reference_records())
                .unwrap();
        let baseline = load_baseline();

        assert_eq!(baseline.records(), validated.records());
        assert_eq!(baseline.len(), 11);
    }

    #[test]
    fn test_reference_base_earnings() {
        let baseline = load_baseline();
        assert_relative_eq!(baseline.base_index_earnings(), 6858.47 / 22.0);
        assert_eq!(baseline.as_of(), NaiveDate::from_ymd_opt(2026, 2, 1));
    }

    #[test]
    fn test_reference_order_is_table_order() {
        let ids: Vec<_> = load_baseline().sector_ids().map(str::to_string).collect();
        assert_eq!(ids.first().map(String::as_str), Some("Info Tech"));
        assert_eq!(ids.last().map(String::as_str), Some("Materials"));
    }

    #[test]
    fn test_published_weights_are_slightly_over_one() {
        let total: f64 = reference_records().iter().map(|r| r.weight).sum();
        assert!((total - 1.005).abs() < 1e-9);
    }
}

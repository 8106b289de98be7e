//! Projection output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Projected contribution of one sector at the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorProjection {
    pub sector_id: String,

    // Today
    pub base_earnings_contribution: f64,
    pub spot_price_contribution: f64,

    // Horizon
    pub projected_earnings_contribution: f64,
    pub projected_price_contribution: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Number of compounding periods applied
    pub horizon_periods: u32,

    /// Baseline `as_of` date moved forward by `horizon_periods` years
    pub horizon_date: Option<NaiveDate>,

    /// Per-sector rows in baseline order
    pub per_sector: Vec<SectorProjection>,

    pub total_projected_price: f64,
    pub total_projected_earnings: f64,

    /// Projected price / projected earnings, or 0 when earnings are 0
    pub implied_multiple: f64,

    pub base_index_price: f64,
    pub base_index_earnings: f64,
}

impl ProjectionResult {
    pub(crate) fn new(
        horizon_periods: u32,
        horizon_date: Option<NaiveDate>,
        base_index_price: f64,
        base_index_earnings: f64,
        capacity: usize,
    ) -> Self {
        Self {
            horizon_periods,
            horizon_date,
            per_sector: Vec::with_capacity(capacity),
            total_projected_price: 0.0,
            total_projected_earnings: 0.0,
            implied_multiple: 0.0,
            base_index_price,
            base_index_earnings,
        }
    }

    /// Append a sector row and accumulate totals
    pub(crate) fn add_sector(&mut self, row: SectorProjection) {
        self.total_projected_price += row.projected_price_contribution;
        self.total_projected_earnings += row.projected_earnings_contribution;
        self.per_sector.push(row);
    }

    /// Derive the aggregate multiple once all sectors are in.
    /// Totals and the multiple must all be finite.
    pub(crate) fn finish(mut self) -> Result<Self> {
        ensure_finite(self.total_projected_earnings, "earnings")?;
        ensure_finite(self.total_projected_price, "price")?;

        // Earnings wiped out (all rates at -100%) yields a zero multiple rather than a division error
        self.implied_multiple = if self.total_projected_earnings != 0.0 {
            self.total_projected_price / self.total_projected_earnings
        } else {
            0.0
        };
        ensure_finite(self.implied_multiple, "implied multiple")?;
        Ok(self)
    }

    pub fn sector(&self, sector_id: &str) -> Option<&SectorProjection> {
        self.per_sector.iter().find(|s| s.sector_id == sector_id)
    }

    /// Headline figures relative to the baseline
    pub fn summary(&self) -> ProjectionSummary {
        let price_ratio = self.total_projected_price / self.base_index_price;
        let earnings_ratio = self.total_projected_earnings / self.base_index_earnings;

        let annualized_price_return = if self.horizon_periods == 0 || price_ratio <= 0.0 {
            0.0
        } else {
            price_ratio.powf(1.0 / f64::from(self.horizon_periods)) - 1.0
        };

        ProjectionSummary {
            horizon_periods: self.horizon_periods,
            horizon_date: self.horizon_date,
            projected_price: self.total_projected_price,
            projected_earnings: self.total_projected_earnings,
            implied_multiple: self.implied_multiple,
            price_change_pct: (price_ratio - 1.0) * 100.0,
            earnings_change_pct: (earnings_ratio - 1.0) * 100.0,
            annualized_price_return,
        }
    }
}

fn ensure_finite(value: f64, quantity: &'static str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::NonFiniteTotal { quantity })
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub horizon_periods: u32,
    pub horizon_date: Option<NaiveDate>,
    pub projected_price: f64,
    pub projected_earnings: f64,
    pub implied_multiple: f64,

    /// Total change over the horizon, in percent
    pub price_change_pct: f64,
    pub earnings_change_pct: f64,

    /// Per-period compound price return, as a fraction
    pub annualized_price_return: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(id: &str, earnings: f64, price: f64) -> SectorProjection {
        SectorProjection {
            sector_id: id.to_string(),
            base_earnings_contribution: 0.0,
            spot_price_contribution: 0.0,
            projected_earnings_contribution: earnings,
            projected_price_contribution: price,
        }
    }

    #[test]
    fn test_totals_and_multiple() {
        let mut result = ProjectionResult::new(3, None, 1000.0, 50.0, 2);
        result.add_sector(row("A", 40.0, 800.0));
        result.add_sector(row("B", 20.0, 400.0));
        let result = result.finish().unwrap();

        assert_relative_eq!(result.total_projected_earnings, 60.0);
        assert_relative_eq!(result.total_projected_price, 1200.0);
        assert_relative_eq!(result.implied_multiple, 20.0);
        assert!(result.sector("B").is_some());
        assert!(result.sector("C").is_none());
    }

    #[test]
    fn test_zero_earnings_gives_zero_multiple() {
        let mut result = ProjectionResult::new(3, None, 1000.0, 50.0, 1);
        result.add_sector(row("A", 0.0, 0.0));
        let result = result.finish().unwrap();

        assert_eq!(result.implied_multiple, 0.0);
    }

    #[test]
    fn test_non_finite_totals_rejected() {
        let mut result = ProjectionResult::new(3, None, 1000.0, 50.0, 2);
        result.add_sector(row("A", 10.0, f64::MAX));
        result.add_sector(row("B", 10.0, f64::MAX));
        assert_eq!(
            result.finish().unwrap_err(),
            ProjectionError::NonFiniteTotal { quantity: "price" }
        );

        let mut result = ProjectionResult::new(3, None, 1000.0, 50.0, 1);
        result.add_sector(row("A", 1e-320, 1e10));
        assert_eq!(
            result.finish().unwrap_err(),
            ProjectionError::NonFiniteTotal { quantity: "implied multiple" }
        );
    }

    #[test]
    fn test_summary() {
        let mut result = ProjectionResult::new(2, None, 1000.0, 50.0, 1);
        result.add_sector(row("A", 60.0, 1210.0));
        let summary = result.finish().unwrap().summary();

        assert_relative_eq!(summary.price_change_pct, 21.0, max_relative = 1e-12);
        assert_relative_eq!(summary.earnings_change_pct, 20.0, max_relative = 1e-12);
        assert_relative_eq!(summary.annualized_price_return, 0.10, max_relative = 1e-12);
    }

    #[test]
    fn test_summary_degenerate_horizon() {
        let mut result = ProjectionResult::new(0, None, 1000.0, 50.0, 1);
        result.add_sector(row("A", 50.0, 1000.0));
        assert_eq!(result.finish().unwrap().summary().annualized_price_return, 0.0);
    }
}

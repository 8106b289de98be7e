//! Core projection engine: sector earnings compounded to the horizon and repriced

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::contributions::{ProjectionResult, SectorProjection};
use crate::assumptions::{AssumptionSet, SectorAssumption};
use crate::baseline::{Baseline, SectorRecord};
use crate::error::{ProjectionError, Result};

/// Horizon of the reference scenario (three annual periods)
pub const REFERENCE_HORIZON_PERIODS: u32 = 3;

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Number of compounding periods (years) between baseline and horizon
    pub horizon_periods: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_periods: REFERENCE_HORIZON_PERIODS,
        }
    }
}

/// Main projection engine
///
/// Stateless apart from its config; `project` is a pure function of the
/// baseline and assumption set, so one engine can serve any number of
/// concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn with_horizon(horizon_periods: u32) -> Self {
        Self::new(ProjectionConfig { horizon_periods })
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project every baseline sector to the horizon and aggregate
    pub fn project(&self, baseline: &Baseline, assumptions: &AssumptionSet) -> Result<ProjectionResult> {
        let paired = pair_with_baseline(baseline, assumptions)?;
        for (_, assumption) in &paired {
            validate_assumption(assumption)?;
        }

        let horizon = self.config.horizon_periods;
        let mut result = ProjectionResult::new(
            horizon,
            horizon_date(baseline.as_of(), horizon),
            baseline.base_index_price(),
            baseline.base_index_earnings(),
            paired.len(),
        );

        for (record, assumption) in paired {
            result.add_sector(self.project_sector(baseline, record, assumption)?);
        }

        result.finish()
    }

    fn project_sector(
        &self,
        baseline: &Baseline,
        record: &SectorRecord,
        assumption: &SectorAssumption,
    ) -> Result<SectorProjection> {
        let base_earnings = baseline.earnings_share(record);

        // Uniform compounding over the horizon; no intra-horizon path
        let growth_factor = compound_factor(assumption.annual_growth_rate, self.config.horizon_periods);
        let projected_earnings = base_earnings * growth_factor;
        if !projected_earnings.is_finite() {
            return Err(ProjectionError::InvalidGrowthRate {
                sector_id: record.sector_id.clone(),
                rate: assumption.annual_growth_rate,
            });
        }

        let projected_price = projected_earnings * assumption.target_multiple;
        if !projected_price.is_finite() {
            return Err(ProjectionError::InvalidMultiple {
                sector_id: record.sector_id.clone(),
                multiple: assumption.target_multiple,
            });
        }

        Ok(SectorProjection {
            sector_id: record.sector_id.clone(),
            base_earnings_contribution: base_earnings,
            spot_price_contribution: record.weight * baseline.base_index_price(),
            projected_earnings_contribution: projected_earnings,
            projected_price_contribution: projected_price,
        })
    }
}

/// Project with an explicit horizon
pub fn project(
    baseline: &Baseline,
    assumptions: &AssumptionSet,
    horizon_periods: u32,
) -> Result<ProjectionResult> {
    ProjectionEngine::with_horizon(horizon_periods).project(baseline, assumptions)
}

/// `(1 + rate)^periods`
pub fn compound_factor(annual_growth_rate: f64, periods: u32) -> f64 {
    (1.0 + annual_growth_rate).powf(f64::from(periods))
}

/// Match assumptions to baseline records, in baseline order.
/// The sets must agree exactly; both directions of disagreement are reported.
fn pair_with_baseline<'a>(
    baseline: &'a Baseline,
    assumptions: &'a AssumptionSet,
) -> Result<Vec<(&'a SectorRecord, &'a SectorAssumption)>> {
    let mut paired = Vec::with_capacity(baseline.len());
    let mut missing = Vec::new();

    for record in baseline.records() {
        match assumptions.get(&record.sector_id) {
            Some(assumption) => paired.push((record, assumption)),
            None => missing.push(record.sector_id.clone()),
        }
    }

    let unexpected: Vec<String> = assumptions
        .sector_ids()
        .filter(|id| !baseline.contains(id))
        .map(str::to_string)
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(paired)
    } else {
        Err(ProjectionError::AssumptionMismatch { missing, unexpected })
    }
}

fn validate_assumption(assumption: &SectorAssumption) -> Result<()> {
    let rate = assumption.annual_growth_rate;
    if !(rate.is_finite() && 1.0 + rate >= 0.0) {
        return Err(ProjectionError::InvalidGrowthRate {
            sector_id: assumption.sector_id.clone(),
            rate,
        });
    }

    let multiple = assumption.target_multiple;
    if !(multiple.is_finite() && multiple > 0.0) {
        return Err(ProjectionError::InvalidMultiple {
            sector_id: assumption.sector_id.clone(),
            multiple,
        });
    }

    Ok(())
}

fn horizon_date(as_of: Option<NaiveDate>, horizon_periods: u32) -> Option<NaiveDate> {
    let months = horizon_periods.checked_mul(12)?;
    as_of?.checked_add_months(Months::new(months))
}

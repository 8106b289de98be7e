//! Scenario runner for batch projections against one shared baseline
//!
//! The baseline is loaded once and borrowed read-only by every run, including
//! parallel runs.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::AssumptionSet;
use crate::baseline::loader::{load_baseline_from_csv, WeightHandling};
use crate::baseline::{load_baseline, Baseline};
use crate::error::{AxisError, LoadError, Result};
use crate::projection::{ProjectionEngine, ProjectionResult};

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let scenarios: Vec<_> = [0.03, 0.05, 0.07]
///     .iter()
///     .map(|&g| AssumptionSet::hold_multiples(runner.baseline(), g))
///     .collect();
/// let results = runner.run_scenarios(&scenarios, 3);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    baseline: Baseline,
}

impl ScenarioRunner {
    /// Runner over the built-in reference baseline
    pub fn new() -> Self {
        Self {
            baseline: load_baseline(),
        }
    }

    pub fn with_baseline(baseline: Baseline) -> Self {
        Self { baseline }
    }

    /// Runner over a baseline table read from CSV
    pub fn from_csv_path(
        path: &Path,
        base_index_price: f64,
        reference_multiple: f64,
        weights: WeightHandling,
    ) -> std::result::Result<Self, LoadError> {
        Ok(Self {
            baseline: load_baseline_from_csv(path, base_index_price, reference_multiple, weights)?,
        })
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Run a single projection
    pub fn run(&self, assumptions: &AssumptionSet, horizon_periods: u32) -> Result<ProjectionResult> {
        ProjectionEngine::with_horizon(horizon_periods).project(&self.baseline, assumptions)
    }

    /// Run several assumption sets; results are in input order
    pub fn run_scenarios(
        &self,
        scenarios: &[AssumptionSet],
        horizon_periods: u32,
    ) -> Vec<Result<ProjectionResult>> {
        let engine = ProjectionEngine::with_horizon(horizon_periods);
        scenarios
            .iter()
            .map(|assumptions| engine.project(&self.baseline, assumptions))
            .collect()
    }

    /// Same as `run_scenarios`, spread across the rayon pool
    pub fn run_scenarios_parallel(
        &self,
        scenarios: &[AssumptionSet],
        horizon_periods: u32,
    ) -> Vec<Result<ProjectionResult>> {
        let engine = ProjectionEngine::with_horizon(horizon_periods);
        scenarios
            .par_iter()
            .map(|assumptions| engine.project(&self.baseline, assumptions))
            .collect()
    }

    /// Uniform growth/multiple sweep over the shared baseline
    pub fn sensitivity_grid(
        &self,
        growth_rates: &[f64],
        multiples: &[f64],
        horizon_periods: u32,
    ) -> Result<Vec<GridPoint>> {
        sensitivity_grid(&self.baseline, growth_rates, multiples, horizon_periods)
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// One cell of a uniform-assumption sensitivity grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub annual_growth_rate: f64,
    pub target_multiple: f64,
    pub projected_price: f64,
    pub projected_earnings: f64,
    pub implied_multiple: f64,
}

/// Project every (growth, multiple) pair with uniform assumptions, in parallel.
/// Points are ordered growth-major; the first invalid pair aborts the sweep.
pub fn sensitivity_grid(
    baseline: &Baseline,
    growth_rates: &[f64],
    multiples: &[f64],
    horizon_periods: u32,
) -> Result<Vec<GridPoint>> {
    let engine = ProjectionEngine::with_horizon(horizon_periods);
    let cells: Vec<(f64, f64)> = growth_rates
        .iter()
        .flat_map(|&g| multiples.iter().map(move |&m| (g, m)))
        .collect();

    cells
        .par_iter()
        .map(|&(growth, multiple)| {
            let assumptions = AssumptionSet::uniform(baseline, growth, multiple);
            let result = engine.project(baseline, &assumptions)?;
            Ok(GridPoint {
                annual_growth_rate: growth,
                target_multiple: multiple,
                projected_price: result.total_projected_price,
                projected_earnings: result.total_projected_earnings,
                implied_multiple: result.implied_multiple,
            })
        })
        .collect()
}

/// Upper bound on the number of points in one sweep axis
pub const MAX_AXIS_POINTS: usize = 1_000;

/// Inclusive arithmetic range `start, start + step, ..., end`
///
/// Built from integer step counts so the endpoints do not drift. `start == end`
/// gives a single point.
pub fn stepped_range(start: f64, end: f64, step: f64) -> std::result::Result<Vec<f64>, AxisError> {
    if !(start.is_finite() && end.is_finite() && step.is_finite()) {
        return Err(AxisError::NonFinite { start, end, step });
    }
    if step <= 0.0 {
        return Err(AxisError::NonPositiveStep { step });
    }
    if end < start {
        return Err(AxisError::Reversed { start, end });
    }

    let intervals = ((end - start) / step + 1e-9).floor();
    if !(intervals < MAX_AXIS_POINTS as f64) {
        return Err(AxisError::TooManyPoints { max: MAX_AXIS_POINTS });
    }
    let count = intervals as usize;
    Ok((0..=count).map(|i| start + step * i as f64).collect())
}

/// Growth axis of the global-assumption controls: -10% to 30% in 1% steps
pub fn default_growth_axis() -> Vec<f64> {
    (-10_i32..=30).map(|pct| f64::from(pct) / 100.0).collect()
}

/// Multiple axis of the global-assumption controls: 10x to 35x in 0.5 steps
pub fn default_multiple_axis() -> Vec<f64> {
    (20_i32..=70).map(|half| f64::from(half) * 0.5).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectionError;

    #[test]
    fn test_scenario_runner_batch() {
        let runner = ScenarioRunner::new();
        let scenarios: Vec<_> = [0.03, 0.05, 0.07]
            .iter()
            .map(|&g| AssumptionSet::hold_multiples(runner.baseline(), g))
            .collect();

        let results = runner.run_scenarios(&scenarios, 3);
        assert_eq!(results.len(), 3);

        // Higher growth should give a higher projected price
        let prices: Vec<f64> = results
            .iter()
            .map(|r| r.as_ref().unwrap().total_projected_price)
            .collect();
        assert!(prices[2] > prices[1] && prices[1] > prices[0]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let runner = ScenarioRunner::new();
        let mut scenarios: Vec<_> = (0..32_i32)
            .map(|i| AssumptionSet::uniform(runner.baseline(), f64::from(i) / 100.0, 15.0 + f64::from(i) * 0.25))
            .collect();
        scenarios.push(AssumptionSet::new());

        let sequential = runner.run_scenarios(&scenarios, 5);
        let parallel = runner.run_scenarios_parallel(&scenarios, 5);

        assert_eq!(sequential, parallel);
        assert!(matches!(
            parallel.last(),
            Some(Err(ProjectionError::AssumptionMismatch { .. }))
        ));
    }

    #[test]
    fn test_sensitivity_grid_order_and_values() {
        let runner = ScenarioRunner::new();
        let grid = runner.sensitivity_grid(&[0.0, 0.1], &[20.0, 25.0], 3).unwrap();

        assert_eq!(grid.len(), 4);
        assert_eq!((grid[1].annual_growth_rate, grid[1].target_multiple), (0.0, 25.0));
        assert_eq!((grid[2].annual_growth_rate, grid[2].target_multiple), (0.1, 20.0));

        let single = runner
            .run(&AssumptionSet::uniform(runner.baseline(), 0.1, 25.0), 3)
            .unwrap();
        assert_eq!(grid[3].projected_price, single.total_projected_price);
    }

    #[test]
    fn test_sensitivity_grid_rejects_bad_cell() {
        let runner = ScenarioRunner::new();
        let err = runner.sensitivity_grid(&[0.05], &[20.0, 0.0], 3).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidMultiple { .. }));
    }

    #[test]
    fn test_default_axes() {
        let growth = default_growth_axis();
        assert_eq!(growth.len(), 41);
        assert_eq!(growth[0], -0.10);
        assert_eq!(growth[40], 0.30);

        let multiples = default_multiple_axis();
        assert_eq!(multiples.len(), 51);
        assert_eq!(multiples[0], 10.0);
        assert_eq!(multiples[50], 35.0);
    }

    #[test]
    fn test_stepped_range() {
        assert_eq!(stepped_range(10.0, 12.0, 0.5).unwrap(), vec![10.0, 10.5, 11.0, 11.5, 12.0]);
        assert_eq!(stepped_range(5.0, 5.0, 1.0).unwrap(), vec![5.0]);
        assert_eq!(stepped_range(10.0, 35.0, 0.5).unwrap(), default_multiple_axis());
    }

    #[test]
    fn test_stepped_range_rejects_bad_axes() {
        assert_eq!(
            stepped_range(30.0, -10.0, 1.0),
            Err(AxisError::Reversed { start: 30.0, end: -10.0 })
        );
        assert_eq!(stepped_range(5.0, 6.0, 0.0), Err(AxisError::NonPositiveStep { step: 0.0 }));
        assert_eq!(stepped_range(5.0, 6.0, -1.0), Err(AxisError::NonPositiveStep { step: -1.0 }));
        assert!(matches!(stepped_range(f64::NAN, 6.0, 1.0), Err(AxisError::NonFinite { .. })));
        assert_eq!(
            stepped_range(10.0, 35.0, 1e-12),
            Err(AxisError::TooManyPoints { max: MAX_AXIS_POINTS })
        );
        // Exactly at the cap is still accepted
        assert_eq!(stepped_range(0.0, 999.0, 1.0).unwrap().len(), MAX_AXIS_POINTS);
    }
}

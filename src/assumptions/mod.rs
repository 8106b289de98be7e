//! Per-sector forward assumptions: annual earnings growth and target multiple
//!
//! An `AssumptionSet` is a keyed collection supplied to the projection engine
//! as an explicit argument. It can be built uniformly (one growth rate and one
//! target multiple for every sector) or sector by sector; the engine does not
//! care which.

pub mod loader;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::baseline::Baseline;

/// Forward assumption for one sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorAssumption {
    pub sector_id: String,

    /// Fractional annual earnings growth (0.07 = 7%), compounded over the horizon
    pub annual_growth_rate: f64,

    /// Price/earnings multiple applied to horizon earnings
    pub target_multiple: f64,
}

impl SectorAssumption {
    pub fn new(sector_id: impl Into<String>, annual_growth_rate: f64, target_multiple: f64) -> Self {
        Self {
            sector_id: sector_id.into(),
            annual_growth_rate,
            target_multiple,
        }
    }
}

/// Assumptions keyed by sector id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssumptionSet {
    by_sector: BTreeMap<String, SectorAssumption>,
}

impl AssumptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same growth rate and target multiple for every baseline sector
    pub fn uniform(baseline: &Baseline, annual_growth_rate: f64, target_multiple: f64) -> Self {
        baseline
            .sector_ids()
            .map(|id| SectorAssumption::new(id, annual_growth_rate, target_multiple))
            .collect()
    }

    /// Same growth rate for every sector, each sector keeping its current multiple
    pub fn hold_multiples(baseline: &Baseline, annual_growth_rate: f64) -> Self {
        baseline
            .records()
            .iter()
            .map(|r| SectorAssumption::new(r.sector_id.as_str(), annual_growth_rate, r.current_multiple))
            .collect()
    }

    /// Build from individual assumptions; a repeated sector id keeps the last one
    pub fn from_assumptions<I>(assumptions: I) -> Self
    where
        I: IntoIterator<Item = SectorAssumption>,
    {
        assumptions.into_iter().collect()
    }

    /// Add or replace a sector's assumption, returning the previous one
    pub fn insert(&mut self, assumption: SectorAssumption) -> Option<SectorAssumption> {
        self.by_sector.insert(assumption.sector_id.clone(), assumption)
    }

    /// Builder-style override of a single sector
    pub fn with_override(
        mut self,
        sector_id: impl Into<String>,
        annual_growth_rate: f64,
        target_multiple: f64,
    ) -> Self {
        self.insert(SectorAssumption::new(sector_id, annual_growth_rate, target_multiple));
        self
    }

    pub fn get(&self, sector_id: &str) -> Option<&SectorAssumption> {
        self.by_sector.get(sector_id)
    }

    pub fn contains(&self, sector_id: &str) -> bool {
        self.by_sector.contains_key(sector_id)
    }

    /// Sector ids in sorted order
    pub fn sector_ids(&self) -> impl Iterator<Item = &str> {
        self.by_sector.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectorAssumption> {
        self.by_sector.values()
    }

    pub fn len(&self) -> usize {
        self.by_sector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sector.is_empty()
    }
}

impl FromIterator<SectorAssumption> for AssumptionSet {
    fn from_iter<T: IntoIterator<Item = SectorAssumption>>(iter: T) -> Self {
        let mut set = Self::new();
        for assumption in iter {
            set.insert(assumption);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{load_baseline, SectorRecord};

    fn two_sector() -> Baseline {
        Baseline::new(
            6000.0,
            20.0,
            vec![SectorRecord::new("A", 0.6, 30.0), SectorRecord::new("B", 0.4, 15.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_uniform_covers_every_sector() {
        let baseline = load_baseline();
        let set = AssumptionSet::uniform(&baseline, 0.07, 22.0);

        assert_eq!(set.len(), baseline.len());
        for id in baseline.sector_ids() {
            let a = set.get(id).unwrap();
            assert_eq!(a.annual_growth_rate, 0.07);
            assert_eq!(a.target_multiple, 22.0);
        }
    }

    #[test]
    fn test_hold_multiples_uses_current_multiple() {
        let set = AssumptionSet::hold_multiples(&two_sector(), 0.08);

        assert_eq!(set.get("A").unwrap().target_multiple, 30.0);
        assert_eq!(set.get("B").unwrap().target_multiple, 15.0);
        assert_eq!(set.get("B").unwrap().annual_growth_rate, 0.08);
    }

    #[test]
    fn test_global_and_per_sector_construction_agree() {
        let baseline = two_sector();
        let global = AssumptionSet::uniform(&baseline, 0.05, 18.0);
        let per_sector = AssumptionSet::from_assumptions([
            SectorAssumption::new("B", 0.05, 18.0),
            SectorAssumption::new("A", 0.05, 18.0),
        ]);

        assert_eq!(global, per_sector);
    }

    #[test]
    fn test_last_assumption_wins() {
        let set = AssumptionSet::from_assumptions([
            SectorAssumption::new("A", 0.01, 10.0),
            SectorAssumption::new("A", 0.02, 12.0),
        ]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("A").unwrap().annual_growth_rate, 0.02);
    }

    #[test]
    fn test_with_override() {
        let set = AssumptionSet::uniform(&two_sector(), 0.05, 20.0).with_override("A", 0.10, 32.0);

        assert_eq!(set.get("A").unwrap().target_multiple, 32.0);
        assert_eq!(set.get("B").unwrap().target_multiple, 20.0);
    }

    #[test]
    fn test_serializes_as_map() {
        let set = AssumptionSet::from_assumptions([SectorAssumption::new("A", 0.1, 32.0)]);
        let json = serde_json::to_value(&set).unwrap();

        assert_eq!(json["A"]["target_multiple"], 32.0);
    }
}

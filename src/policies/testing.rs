//! Shared fixture for policy unit tests.

use std::collections::HashMap;

use crate::error::Result;
use crate::population::Population;
use crate::sim::history::EnergyHistory;
use crate::sim::sampling::{Sampler, SeedPolicy};
use crate::sim::state::BuildingState;
use crate::sim::types::{FuelVector, MechanismReductions};

use super::types::{Policy, PolicyContext};

pub const BASELINE_YEAR: i32 = 2020;

/// Emission factors used by the unit tests (kgCO2e/kBtu).
pub fn test_factors() -> FuelVector {
    FuelVector::new(6.164e-3, 52.98e-3, 52.99e-3)
}

/// Minimal engine stand-in: one population, flat history, fresh state.
pub struct Fixture {
    pub population: Population,
    pub history: EnergyHistory,
    pub states: Vec<BuildingState>,
    pub reductions: Vec<MechanismReductions>,
    pub sampler: Sampler,
    pub compliant_sets: HashMap<usize, Vec<usize>>,
    pub factors: FuelVector,
}

impl Fixture {
    pub fn new(buildings: &[(&str, f64, FuelVector)]) -> Self {
        let mut population = Population::new(BASELINE_YEAR);
        for &(ty, area, energy) in buildings {
            population.push(ty, area, energy);
        }
        let history = EnergyHistory::new(BASELINE_YEAR, population.baseline().to_vec());
        let n = population.len();
        Self {
            population,
            history,
            states: vec![BuildingState::default(); n],
            reductions: vec![MechanismReductions::default(); n],
            sampler: Sampler::new(0, SeedPolicy::PerRun),
            compliant_sets: HashMap::new(),
            factors: test_factors(),
        }
    }

    pub fn uniform(n: usize, area: f64, energy: FuelVector) -> Self {
        let buildings: Vec<(&str, f64, FuelVector)> =
            (0..n).map(|_| ("Hotel", area, energy)).collect();
        Self::new(&buildings)
    }

    /// Extends the history with unchanged energy through `year - 1`.
    pub fn materialize_until(&mut self, year: i32) {
        while self.history.latest_year() < year - 1 {
            let latest = self.history.latest_year();
            let energy = self.history.year(latest).unwrap_or_default().to_vec();
            self.history.push(energy);
        }
    }

    pub fn apply(&mut self, year: i32, policy: &impl Policy) -> Result<()> {
        self.materialize_until(year);
        let mut ctx = PolicyContext {
            year,
            population: &self.population,
            history: &self.history,
            emission_factors: &self.factors,
            states: &mut self.states,
            reductions: &mut self.reductions,
            sampler: &mut self.sampler,
            compliant_sets: &mut self.compliant_sets,
        };
        policy.apply(0, &mut ctx)
    }

    /// Year boundary: clear reductions and roll the clocks.
    pub fn next_year(&mut self) {
        for r in &mut self.reductions {
            *r = MechanismReductions::default();
        }
        for s in &mut self.states {
            s.roll_over();
        }
    }
}

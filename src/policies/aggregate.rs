//! Population-wide aggregates computed before per-building reductions.

use crate::population::Population;
use crate::sim::history::EnergyHistory;
use crate::sim::types::FuelVector;

/// Mean intensity (quantity per square foot) over a subset of buildings in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityAggregate {
    pub year: i32,
    /// Mean of each member's `quantity / area`.
    pub mean_per_area: f64,
    pub members: usize,
}

impl IntensityAggregate {
    /// Averages `weights · energy[year] / area` over `members`.
    ///
    /// With unit weights this is the mean EUI (kBtu/ft²); with emission
    /// factors it is the mean emission intensity (kgCO2e/ft²). Returns `None`
    /// for an empty subset.
    pub fn mean_intensity(
        population: &Population,
        history: &EnergyHistory,
        members: &[usize],
        year: i32,
        weights: &FuelVector,
    ) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        let sum: f64 = members
            .iter()
            .map(|&b| history.energy(year, b).weighted_total(weights) / population.area(b))
            .sum();
        Some(Self {
            year,
            mean_per_area: sum / members.len() as f64,
            members: members.len(),
        })
    }

    /// A building's target under this aggregate: mean intensity times its own area.
    pub fn target_for(&self, area: f64) -> f64 {
        self.mean_per_area * area
    }
}

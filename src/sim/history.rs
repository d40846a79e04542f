//! Per-year energy levels materialized by the engine.

use super::types::FuelVector;

/// Energy per building for every year computed so far, starting at the baseline.
#[derive(Debug, Clone)]
pub struct EnergyHistory {
    baseline_year: i32,
    years: Vec<Vec<FuelVector>>,
}

impl EnergyHistory {
    /// Starts a history from the baseline-year energy of every building.
    pub fn new(baseline_year: i32, baseline: Vec<FuelVector>) -> Self {
        Self {
            baseline_year,
            years: vec![baseline],
        }
    }

    pub fn baseline_year(&self) -> i32 {
        self.baseline_year
    }

    /// Most recent materialized year.
    pub fn latest_year(&self) -> i32 {
        self.baseline_year + self.years.len() as i32 - 1
    }

    /// Returns `true` if `year`'s energy levels are available.
    pub fn has_year(&self, year: i32) -> bool {
        year >= self.baseline_year && year <= self.latest_year()
    }

    /// All buildings' energy in `year`, if materialized.
    pub fn year(&self, year: i32) -> Option<&[FuelVector]> {
        if !self.has_year(year) {
            return None;
        }
        Some(&self.years[(year - self.baseline_year) as usize])
    }

    /// Energy of one building in `year`.
    ///
    /// # Panics
    ///
    /// Panics if `year` has not been materialized. Catalog validation keeps
    /// every baseline and reference year at or before the year being computed.
    pub fn energy(&self, year: i32, building: usize) -> FuelVector {
        assert!(
            self.has_year(year),
            "energy for {year} requested but history covers {}..={}",
            self.baseline_year,
            self.latest_year()
        );
        self.years[(year - self.baseline_year) as usize][building]
    }

    /// Appends the next year's energy levels.
    pub fn push(&mut self, energy: Vec<FuelVector>) {
        self.years.push(energy);
    }
}

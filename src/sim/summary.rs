//! Post-hoc population summary computed from a scenario result.

use std::fmt;

use super::engine::ScenarioResult;
use super::types::{Fuel, FuelVector, Mechanism, MechanismVector};

/// Population-level totals for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSummary {
    pub year: i32,
    /// Total energy per fuel (kBtu).
    pub energy: FuelVector,
    /// Total emissions per fuel (kgCO2e).
    pub emissions: FuelVector,
    /// Energy reductions per mechanism (kBtu); zero in the baseline year.
    pub reductions: MechanismVector,
    /// Emission reductions per mechanism (kgCO2e).
    pub emission_reductions: MechanismVector,
    /// Buildings electrified in or before this year.
    pub electrified: usize,
}

/// Per-year aggregates for one scenario.
///
/// Computed post-hoc from a [`ScenarioResult`] so reported figures always
/// agree with the per-building output table.
#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub scenario: String,
    /// Baseline year first, then every simulated year.
    pub years: Vec<YearSummary>,
}

impl ScenarioSummary {
    /// Aggregates every year of `result`.
    pub fn from_result(result: &ScenarioResult) -> Self {
        let factors = result.config.emission_factors;
        let history = &result.history;
        let mut years = Vec::with_capacity(result.years.len() + 1);

        for year in history.baseline_year()..=history.latest_year() {
            let energy = history
                .year(year)
                .map(|e| e.iter().fold(FuelVector::ZERO, |acc, v| acc + *v))
                .unwrap_or_default();

            let mut reductions = MechanismVector::default();
            let mut emission_reductions = MechanismVector::default();
            if let Some(record) = result.record(year) {
                for r in &record.reductions {
                    for mechanism in Mechanism::ALL {
                        reductions[mechanism] += r[mechanism].total();
                        emission_reductions[mechanism] += r[mechanism].weighted_total(&factors);
                    }
                }
            }

            let electrified = result
                .electrification_years
                .iter()
                .filter(|y| y.is_some_and(|y| y <= year))
                .count();

            years.push(YearSummary {
                year,
                energy,
                emissions: energy.weighted(&factors),
                reductions,
                emission_reductions,
                electrified,
            });
        }

        Self {
            scenario: result.scenario.clone(),
            years,
        }
    }

    pub fn baseline(&self) -> Option<&YearSummary> {
        self.years.first()
    }

    pub fn last(&self) -> Option<&YearSummary> {
        self.years.last()
    }

    /// Reductions per mechanism summed over every simulated year.
    pub fn cumulative_reductions(&self) -> (MechanismVector, MechanismVector) {
        let mut energy = MechanismVector::default();
        let mut emissions = MechanismVector::default();
        for y in &self.years {
            for mechanism in Mechanism::ALL {
                energy[mechanism] += y.reductions[mechanism];
                emissions[mechanism] += y.emission_reductions[mechanism];
            }
        }
        (energy, emissions)
    }
}

fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        0.0
    } else {
        100.0 * (to - from) / from
    }
}

impl fmt::Display for ScenarioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Scenario: {} ---", self.scenario)?;
        let (Some(first), Some(last)) = (self.baseline(), self.last()) else {
            return write!(f, "(no years)");
        };

        for (label, y) in [("Baseline", first), ("Final", last)] {
            writeln!(
                f,
                "{label:<8} ({}): energy {:.4e} kBtu, emissions {:.4e} kgCO2e",
                y.year,
                y.energy.total(),
                y.emissions.total()
            )?;
            for fuel in Fuel::ALL {
                writeln!(f, "    {fuel:<5} {:.4e} kBtu", y.energy[fuel])?;
            }
        }
        writeln!(
            f,
            "Change:  energy {:+.1}%, emissions {:+.1}%",
            percent_change(first.energy.total(), last.energy.total()),
            percent_change(first.emissions.total(), last.emissions.total())
        )?;

        let (energy, emissions) = self.cumulative_reductions();
        writeln!(f, "Cumulative reductions ({}-{}):", first.year + 1, last.year)?;
        for mechanism in Mechanism::ALL {
            writeln!(
                f,
                "    {:<16} {:.4e} kBtu, {:.4e} kgCO2e",
                mechanism.display_name(),
                energy[mechanism],
                emissions[mechanism]
            )?;
        }
        write!(f, "Buildings electrified: {}", last.electrified)
    }
}

//! Core simulation types: fuels, mechanisms, per-fuel vectors, and run configuration.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub};

use serde::{Deserialize, Serialize};

use super::sampling::SeedPolicy;

/// Fuels tracked per building, in fixed column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fuel {
    Elec,
    Gas,
    Steam,
}

impl Fuel {
    /// All fuels in column order.
    pub const ALL: [Fuel; 3] = [Fuel::Elec, Fuel::Gas, Fuel::Steam];

    /// Fuels displaced by electrification.
    pub const NON_ELECTRIC: [Fuel; 2] = [Fuel::Gas, Fuel::Steam];

    /// Column label used in input and output tables.
    pub fn label(self) -> &'static str {
        match self {
            Fuel::Elec => "elec",
            Fuel::Gas => "gas",
            Fuel::Steam => "steam",
        }
    }

    pub fn is_electric(self) -> bool {
        self == Fuel::Elec
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Fuel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reduction mechanisms in precedence order.
///
/// Later mechanisms subtract reductions already committed by earlier ones in
/// the same year, so the declaration order here is the evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    Tuneup,
    Eui,
    Ghg,
    Electrify,
}

impl Mechanism {
    /// All mechanisms in precedence order.
    pub const ALL: [Mechanism; 4] = [
        Mechanism::Tuneup,
        Mechanism::Eui,
        Mechanism::Ghg,
        Mechanism::Electrify,
    ];

    /// Mechanisms that amortize a reduction over a period and keep a start-year clock.
    pub const AMORTIZED: [Mechanism; 3] = [Mechanism::Tuneup, Mechanism::Eui, Mechanism::Ghg];

    /// Column label used in output tables.
    pub fn label(self) -> &'static str {
        match self {
            Mechanism::Tuneup => "tuneup",
            Mechanism::Eui => "eui",
            Mechanism::Ghg => "ghg",
            Mechanism::Electrify => "electrify",
        }
    }

    /// Human-readable name for reports.
    pub fn display_name(self) -> &'static str {
        match self {
            Mechanism::Tuneup => "tune-ups",
            Mechanism::Eui => "EUI targets",
            Mechanism::Ghg => "GHG targets",
            Mechanism::Electrify => "electrification",
        }
    }

    pub fn is_amortized(self) -> bool {
        self != Mechanism::Electrify
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per fuel (energy in kBtu, emissions in kgCO2e, or factors).
///
/// # Examples
///
/// ```
/// use bepsim::sim::types::{Fuel, FuelVector};
///
/// let v = FuelVector::new(1000.0, 2000.0, 0.0);
/// assert_eq!(v[Fuel::Gas], 2000.0);
/// assert_eq!(v.total(), 3000.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelVector(pub [f64; 3]);

impl FuelVector {
    pub const ZERO: FuelVector = FuelVector([0.0; 3]);

    pub fn new(elec: f64, gas: f64, steam: f64) -> Self {
        Self([elec, gas, steam])
    }

    /// Sum across fuels.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Element-wise product, e.g. energy times emission factors.
    pub fn weighted(&self, weights: &FuelVector) -> FuelVector {
        let mut out = *self;
        for fuel in Fuel::ALL {
            out[fuel] *= weights[fuel];
        }
        out
    }

    /// Dot product with `weights`.
    pub fn weighted_total(&self, weights: &FuelVector) -> f64 {
        self.weighted(weights).total()
    }
}

impl Index<Fuel> for FuelVector {
    type Output = f64;

    fn index(&self, fuel: Fuel) -> &f64 {
        &self.0[fuel.index()]
    }
}

impl IndexMut<Fuel> for FuelVector {
    fn index_mut(&mut self, fuel: Fuel) -> &mut f64 {
        &mut self.0[fuel.index()]
    }
}

impl Add for FuelVector {
    type Output = FuelVector;

    fn add(mut self, rhs: FuelVector) -> FuelVector {
        self += rhs;
        self
    }
}

impl AddAssign for FuelVector {
    fn add_assign(&mut self, rhs: FuelVector) {
        for fuel in Fuel::ALL {
            self[fuel] += rhs[fuel];
        }
    }
}

impl Sub for FuelVector {
    type Output = FuelVector;

    fn sub(mut self, rhs: FuelVector) -> FuelVector {
        for fuel in Fuel::ALL {
            self[fuel] -= rhs[fuel];
        }
        self
    }
}

/// One value per mechanism.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MechanismVector(pub [f64; 4]);

impl Index<Mechanism> for MechanismVector {
    type Output = f64;

    fn index(&self, mechanism: Mechanism) -> &f64 {
        &self.0[mechanism.index()]
    }
}

impl IndexMut<Mechanism> for MechanismVector {
    fn index_mut(&mut self, mechanism: Mechanism) -> &mut f64 {
        &mut self.0[mechanism.index()]
    }
}

/// A building's reductions for one year, split by mechanism and fuel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MechanismReductions(pub [FuelVector; 4]);

impl MechanismReductions {
    /// Reductions per fuel summed over mechanisms.
    pub fn fuel_totals(&self) -> FuelVector {
        self.0.iter().fold(FuelVector::ZERO, |acc, v| acc + *v)
    }

    /// Reductions per mechanism summed over fuels.
    pub fn mechanism_totals(&self) -> MechanismVector {
        let mut out = MechanismVector::default();
        for mechanism in Mechanism::ALL {
            out[mechanism] = self[mechanism].total();
        }
        out
    }
}

impl Index<Mechanism> for MechanismReductions {
    type Output = FuelVector;

    fn index(&self, mechanism: Mechanism) -> &FuelVector {
        &self.0[mechanism.index()]
    }
}

impl IndexMut<Mechanism> for MechanismReductions {
    fn index_mut(&mut self, mechanism: Mechanism) -> &mut FuelVector {
        &mut self.0[mechanism.index()]
    }
}

/// Centralized run configuration shared by the engine and every mechanism.
///
/// # Examples
///
/// ```
/// use bepsim::sim::sampling::SeedPolicy;
/// use bepsim::sim::types::{FuelVector, SimConfig};
///
/// let cfg = SimConfig::new(2020, 2050, 0, SeedPolicy::PerRun, FuelVector::new(1.0, 1.0, 1.0));
/// assert_eq!(cfg.horizon(), 30);
/// assert_eq!(cfg.simulated_years().next(), Some(2021));
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Year whose energy is read from the population table.
    pub baseline_year: i32,
    /// Last simulated year (inclusive).
    pub end_year: i32,
    /// Master random seed.
    pub seed: u64,
    /// How the seed is applied to randomized selections.
    pub seed_policy: SeedPolicy,
    /// Emission factors in kgCO2e per kBtu.
    pub emission_factors: FuelVector,
}

impl SimConfig {
    /// Creates a new run configuration.
    ///
    /// # Panics
    ///
    /// Panics if `end_year <= baseline_year`.
    pub fn new(
        baseline_year: i32,
        end_year: i32,
        seed: u64,
        seed_policy: SeedPolicy,
        emission_factors: FuelVector,
    ) -> Self {
        assert!(end_year > baseline_year, "end_year must be > baseline_year");
        Self {
            baseline_year,
            end_year,
            seed,
            seed_policy,
            emission_factors,
        }
    }

    /// Number of simulated years after the baseline.
    pub fn horizon(&self) -> usize {
        (self.end_year - self.baseline_year) as usize
    }

    /// Simulated years in increasing order, excluding the baseline.
    pub fn simulated_years(&self) -> impl Iterator<Item = i32> {
        (self.baseline_year + 1)..=self.end_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_vector_arithmetic() {
        let a = FuelVector::new(1.0, 2.0, 3.0);
        let b = FuelVector::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, FuelVector::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, FuelVector::new(0.5, 1.5, 2.5));
        assert_eq!(a.total(), 6.0);
        assert_eq!(a.weighted_total(&FuelVector::new(1.0, 0.0, 2.0)), 7.0);
    }

    #[test]
    fn reductions_reconcile_both_ways() {
        let mut r = MechanismReductions::default();
        r[Mechanism::Tuneup] = FuelVector::new(10.0, 20.0, 0.0);
        r[Mechanism::Electrify] = FuelVector::new(-5.0, 8.0, 2.0);

        assert_eq!(r.fuel_totals(), FuelVector::new(5.0, 28.0, 2.0));
        let m = r.mechanism_totals();
        assert_eq!(m[Mechanism::Tuneup], 30.0);
        assert_eq!(m[Mechanism::Eui], 0.0);
        assert_eq!(m[Mechanism::Electrify], 5.0);
    }

    #[test]
    fn precedence_order_is_declaration_order() {
        assert!(Mechanism::Tuneup < Mechanism::Eui);
        assert!(Mechanism::Eui < Mechanism::Ghg);
        assert!(Mechanism::Ghg < Mechanism::Electrify);
        assert!(!Mechanism::Electrify.is_amortized());
    }

    #[test]
    #[should_panic]
    fn sim_config_rejects_empty_horizon() {
        SimConfig::new(2020, 2020, 0, SeedPolicy::PerRun, FuelVector::ZERO);
    }
}

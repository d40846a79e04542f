//! Common types and traits for policy targets.

use std::collections::{BTreeSet, HashMap};

use crate::error::Result;
use crate::population::Population;
use crate::sim::history::EnergyHistory;
use crate::sim::sampling::Sampler;
use crate::sim::state::BuildingState;
use crate::sim::types::{Fuel, FuelVector, Mechanism, MechanismReductions};

/// Inclusive range of years in which a target is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Creates a new year range spanning `[start, end]`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: i32, end: i32) -> Self {
        assert!(start <= end, "year range start must be <= end");
        Self { start, end }
    }

    /// Returns `true` when `year` falls within the range.
    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    pub fn is_first(&self, year: i32) -> bool {
        year == self.start
    }

    pub fn is_last(&self, year: i32) -> bool {
        year == self.end
    }

    /// Number of years from `from` through the end of the range, inclusive.
    pub fn years_remaining(&self, from: i32) -> i32 {
        self.end - from + 1
    }
}

/// Half-open floor-area interval `[min, max)` in square feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaRange {
    pub min: f64,
    pub max: f64,
}

impl AreaRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, area: f64) -> bool {
        area >= self.min && area < self.max
    }
}

/// Which buildings a target applies to, and when.
///
/// Absent filters match everything; present filters are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetScope {
    pub years: YearRange,
    pub types: Option<BTreeSet<String>>,
    pub not_types: Option<BTreeSet<String>>,
    pub areas: Option<AreaRange>,
}

impl TargetScope {
    pub fn new(years: YearRange) -> Self {
        Self {
            years,
            types: None,
            not_types: None,
            areas: None,
        }
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn without_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.not_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_areas(mut self, min: f64, max: f64) -> Self {
        self.areas = Some(AreaRange::new(min, max));
        self
    }

    /// Returns `true` if a building of `building_type` and `area` falls in scope.
    pub fn matches(&self, building_type: &str, area: f64) -> bool {
        if let Some(types) = &self.types {
            if !types.contains(building_type) {
                return false;
            }
        }
        if let Some(not_types) = &self.not_types {
            if not_types.contains(building_type) {
                return false;
            }
        }
        self.areas.is_none_or(|a| a.contains(area))
    }

    /// Indices of every building in scope, in population order.
    pub fn select(&self, population: &Population) -> Vec<usize> {
        (0..population.len())
            .filter(|&i| self.matches(population.building_type(i), population.area(i)))
            .collect()
    }

    pub fn is_active(&self, year: i32) -> bool {
        self.years.contains(year)
    }
}

/// Per-year step of an amortized reduction.
///
/// Spreads `max(0, baseline - target)` evenly over `periods` years.
pub fn annual_step(baseline: f64, target: f64, periods: i32) -> f64 {
    debug_assert!(periods > 0);
    (baseline - target).max(0.0) / f64::from(periods)
}

/// Splits `amount` across fuels in proportion to `shares`.
///
/// Returns zero for every fuel when the shares sum to zero or less.
pub fn distribute(amount: f64, shares: &FuelVector) -> FuelVector {
    let total = shares.total();
    if total <= 0.0 {
        return FuelVector::ZERO;
    }
    let mut out = FuelVector::ZERO;
    for fuel in Fuel::ALL {
        out[fuel] = amount * shares[fuel] / total;
    }
    out
}

/// Mutable view of one scenario's state for the current year.
pub struct PolicyContext<'a> {
    /// Year being computed.
    pub year: i32,
    pub population: &'a Population,
    /// Energy materialized through `year - 1`.
    pub history: &'a EnergyHistory,
    /// kgCO2e per kBtu.
    pub emission_factors: &'a FuelVector,
    pub states: &'a mut [BuildingState],
    /// Reductions committed so far this year, per building.
    pub reductions: &'a mut [MechanismReductions],
    pub sampler: &'a mut Sampler,
    /// Compliant subsets already drawn, keyed by GHG target index.
    pub compliant_sets: &'a mut HashMap<usize, Vec<usize>>,
}

impl PolicyContext<'_> {
    /// Energy of `building` at the end of `year`.
    pub fn energy(&self, year: i32, building: usize) -> FuelVector {
        self.history.energy(year, building)
    }

    /// Sum of reductions already committed this year by mechanisms preceding `mechanism`.
    pub fn committed_before(&self, mechanism: Mechanism, building: usize) -> FuelVector {
        Mechanism::ALL
            .into_iter()
            .take_while(|m| *m != mechanism)
            .fold(FuelVector::ZERO, |acc, m| acc + self.reductions[building][m])
    }
}

/// A configured target for one mechanism.
///
/// Implementations compute the mechanism's reductions for every building they
/// match in `ctx.year` and drive the per-building amortization clocks.
pub trait Policy {
    fn mechanism(&self) -> Mechanism;

    fn scope(&self) -> &TargetScope;

    /// Applies the target for `ctx.year`.
    ///
    /// `index` is the target's position in its mechanism's list and keys any
    /// randomized draws.
    ///
    /// # Errors
    ///
    /// Returns an error if a randomized selection is infeasible.
    fn apply(&self, index: usize, ctx: &mut PolicyContext<'_>) -> Result<()>;
}

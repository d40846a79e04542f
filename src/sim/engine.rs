//! Annual driver that advances one scenario's population year by year.

use std::collections::HashMap;

use tracing::{debug, info, trace};

use crate::error::Result;
use crate::policies::{Policy, PolicyContext, TargetCatalog};
use crate::population::Population;

use super::clock::YearClock;
use super::history::EnergyHistory;
use super::integrity::{self, Diagnostics};
use super::sampling::Sampler;
use super::state::BuildingState;
use super::types::{FuelVector, Mechanism, MechanismReductions, MechanismVector, SimConfig};

/// Reductions computed for one simulated year, reconciled both ways.
#[derive(Debug, Clone)]
pub struct YearRecord {
    pub year: i32,
    /// Per building, per mechanism and fuel.
    pub reductions: Vec<MechanismReductions>,
    /// Per building, summed over mechanisms.
    pub fuel_totals: Vec<FuelVector>,
    /// Per building, summed over fuels.
    pub mechanism_totals: Vec<MechanismVector>,
}

/// Complete outcome of one scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub scenario: String,
    pub config: SimConfig,
    /// Energy per building from the baseline through the last simulated year.
    pub history: EnergyHistory,
    /// One record per simulated year, in order.
    pub years: Vec<YearRecord>,
    pub electrification_years: Vec<Option<i32>>,
    pub diagnostics: Diagnostics,
}

impl ScenarioResult {
    /// Reductions record for `year`, if it was simulated.
    pub fn record(&self, year: i32) -> Option<&YearRecord> {
        let offset = year - self.config.baseline_year - 1;
        usize::try_from(offset).ok().and_then(|i| self.years.get(i))
    }
}

/// Simulation engine owning one scenario's mutable state.
///
/// The population and catalog are borrowed; every run starts from a fresh
/// copy of the baseline energy and fresh per-building state.
pub struct Engine<'a> {
    scenario: String,
    config: SimConfig,
    population: &'a Population,
    catalog: &'a TargetCatalog,
    history: EnergyHistory,
    states: Vec<BuildingState>,
    sampler: Sampler,
    compliant_sets: HashMap<usize, Vec<usize>>,
    years: Vec<YearRecord>,
}

impl<'a> Engine<'a> {
    /// Creates a new engine for one scenario.
    ///
    /// # Arguments
    ///
    /// * `scenario` - Scenario name, carried into the result
    /// * `config` - Horizon, seed policy, and emission factors
    /// * `population` - Baseline population
    /// * `catalog` - The scenario's targets
    pub fn new(
        scenario: impl Into<String>,
        config: SimConfig,
        population: &'a Population,
        catalog: &'a TargetCatalog,
    ) -> Self {
        let history = EnergyHistory::new(config.baseline_year, population.baseline().to_vec());
        let sampler = Sampler::new(config.seed, config.seed_policy);
        Self {
            scenario: scenario.into(),
            config,
            population,
            catalog,
            history,
            states: vec![BuildingState::default(); population.len()],
            sampler,
            compliant_sets: HashMap::new(),
            years: Vec::new(),
        }
    }

    /// Computes one year and appends it to the history.
    ///
    /// # Panics
    ///
    /// Panics if `year` is not the year right after the latest computed one.
    ///
    /// # Errors
    ///
    /// Returns an error if a randomized selection is infeasible.
    pub fn step(&mut self, year: i32) -> Result<&YearRecord> {
        assert_eq!(
            year,
            self.history.latest_year() + 1,
            "years must be computed in order"
        );
        let n = self.population.len();

        // 1. Zeroed accumulators
        let mut reductions = vec![MechanismReductions::default(); n];

        // 2. Mechanisms in precedence order
        {
            let mut ctx = PolicyContext {
                year,
                population: self.population,
                history: &self.history,
                emission_factors: &self.config.emission_factors,
                states: &mut self.states,
                reductions: &mut reductions,
                sampler: &mut self.sampler,
                compliant_sets: &mut self.compliant_sets,
            };
            apply_targets(&self.catalog.tuneup, &mut ctx)?;
            apply_targets(&self.catalog.eui, &mut ctx)?;
            apply_targets(&self.catalog.ghg, &mut ctx)?;
            apply_targets(&self.catalog.electrify, &mut ctx)?;
        }

        // 3. Reconcile
        let fuel_totals: Vec<FuelVector> = reductions.iter().map(|r| r.fuel_totals()).collect();
        let mechanism_totals: Vec<MechanismVector> =
            reductions.iter().map(|r| r.mechanism_totals()).collect();

        // 4. New energy levels
        let energy: Vec<FuelVector> = (0..n)
            .map(|b| self.history.energy(year - 1, b) - fuel_totals[b])
            .collect();

        // 5. Staged start years take effect next year
        for state in &mut self.states {
            state.roll_over();
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            let mut by_mechanism = MechanismVector::default();
            for totals in &mechanism_totals {
                for m in Mechanism::ALL {
                    by_mechanism[m] += totals[m];
                }
            }
            debug!(
                scenario = %self.scenario,
                year,
                tuneup = by_mechanism[Mechanism::Tuneup],
                eui = by_mechanism[Mechanism::Eui],
                ghg = by_mechanism[Mechanism::Ghg],
                electrify = by_mechanism[Mechanism::Electrify],
                "year computed"
            );
        }

        self.history.push(energy);
        self.years.push(YearRecord {
            year,
            reductions,
            fuel_totals,
            mechanism_totals,
        });
        Ok(&self.years[self.years.len() - 1])
    }

    /// Executes every year of the horizon and returns the scenario result.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any year.
    pub fn run(mut self) -> Result<ScenarioResult> {
        info!(
            scenario = %self.scenario,
            buildings = self.population.len(),
            targets = self.catalog.len(),
            first_year = self.config.baseline_year + 1,
            last_year = self.config.end_year,
            "scenario started"
        );

        let mut clock = YearClock::new(self.config.baseline_year + 1, self.config.end_year);
        clock.try_run(|year| self.step(year).map(|_| ()))?;

        let diagnostics = integrity::check(&self.history, &self.years);
        diagnostics.log(&self.scenario);

        let electrification_years = self
            .states
            .iter()
            .map(BuildingState::electrification_year)
            .collect();

        info!(
            scenario = %self.scenario,
            anomalies = diagnostics.len(),
            "scenario finished"
        );

        Ok(ScenarioResult {
            scenario: self.scenario,
            config: self.config,
            history: self.history,
            years: self.years,
            electrification_years,
            diagnostics,
        })
    }

    /// Per-building state (clocks and electrification year).
    pub fn states(&self) -> &[BuildingState] {
        &self.states
    }

    /// Energy materialized so far, from the baseline through the last computed year.
    pub fn history(&self) -> &EnergyHistory {
        &self.history
    }

    /// Horizon, seed policy, and emission factors of this run.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

/// Applies every target of one mechanism that is active in `ctx.year`, in catalog order.
fn apply_targets<P: Policy>(targets: &[P], ctx: &mut PolicyContext<'_>) -> Result<()> {
    for (index, target) in targets.iter().enumerate() {
        if !target.scope().is_active(ctx.year) {
            continue;
        }
        trace!(
            year = ctx.year,
            mechanism = %target.mechanism(),
            target = index,
            "applying target"
        );
        target.apply(index, ctx)?;
    }
    Ok(())
}

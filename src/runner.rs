//! Runs catalog scenarios against one population and writes their outputs.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::info;

use crate::config::CatalogConfig;
use crate::error::{Result, SimError};
use crate::io::export;
use crate::population::Population;
use crate::sim::engine::{Engine, ScenarioResult};
use crate::sim::summary::ScenarioSummary;

/// Which scenarios to run and how.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Scenario names to run; empty runs every scenario in catalog order.
    pub scenarios: Vec<String>,
    /// Worker threads; `None` uses rayon's default, `Some(1)` runs sequentially.
    pub jobs: Option<usize>,
}

/// Fails with the first validation error of `config`, if any.
fn ensure_valid(config: &CatalogConfig) -> Result<()> {
    match config.validate().into_iter().next() {
        Some(error) => Err(SimError::Config(error)),
        None => Ok(()),
    }
}

/// Runs one scenario from a fresh copy of the population state.
///
/// # Errors
///
/// Returns [`SimError::Config`] if the catalog does not validate,
/// [`SimError::UnknownScenario`] for an unknown name, or any error raised
/// while simulating.
pub fn run_scenario(
    config: &CatalogConfig,
    population: &Population,
    name: &str,
) -> Result<ScenarioResult> {
    ensure_valid(config)?;
    let catalog = config.catalog_for(name)?;
    Engine::new(name, config.sim_config(), population, &catalog).run()
}

/// Runs the requested scenarios, in parallel across scenarios.
///
/// The catalog is validated and every name resolved before any simulation
/// starts. Results are returned in request order regardless of scheduling.
///
/// # Errors
///
/// Returns the first validation or resolution error, or the first scenario
/// error in request order.
pub fn run_scenarios(
    config: &CatalogConfig,
    population: &Population,
    options: &RunOptions,
) -> Result<Vec<ScenarioResult>> {
    ensure_valid(config)?;
    let names: Vec<String> = if options.scenarios.is_empty() {
        config.scenario_names().into_iter().map(String::from).collect()
    } else {
        options.scenarios.clone()
    };

    let catalogs = names
        .iter()
        .map(|name| config.catalog_for(name).map(|c| (name.as_str(), c)))
        .collect::<Result<Vec<_>>>()?;
    let sim_config = config.sim_config();

    info!(
        scenarios = catalogs.len(),
        buildings = population.len(),
        seed = sim_config.seed,
        seed_policy = %sim_config.seed_policy,
        "running scenarios"
    );

    let run_all = || {
        catalogs
            .par_iter()
            .map(|(name, catalog)| {
                Engine::new(*name, sim_config.clone(), population, catalog).run()
            })
            .collect::<Result<Vec<_>>>()
    };

    match options.jobs {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(run_all),
        None => run_all(),
    }
}

/// Files written for one scenario.
#[derive(Debug, Clone)]
pub struct WrittenOutputs {
    pub table: PathBuf,
    pub summary: PathBuf,
}

/// Writes the per-building table and summary for each result under `out_dir`,
/// plus the diagnostics report when `report` is given.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be written.
pub fn write_outputs(
    population: &Population,
    results: &[ScenarioResult],
    out_dir: &Path,
    report: Option<&Path>,
) -> Result<Vec<WrittenOutputs>> {
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(results.len());
    for result in results {
        let table = export::table_path(out_dir, &result.scenario);
        export::export_csv(population, result, &table)?;

        let summary = export::summary_path(out_dir, &result.scenario);
        export::export_summary_csv(&ScenarioSummary::from_result(result), &summary)?;

        info!(
            scenario = %result.scenario,
            table = %table.display(),
            summary = %summary.display(),
            "outputs written"
        );
        written.push(WrittenOutputs { table, summary });
    }

    if let Some(path) = report {
        export::export_report_json(
            results
                .iter()
                .map(|r| (r.scenario.as_str(), &r.diagnostics)),
            path,
        )?;
        info!(path = %path.display(), "diagnostics report written");
    }

    Ok(written)
}

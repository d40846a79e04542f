//! bepsim entry point: CLI parsing, catalog loading, and scenario runs.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bepsim::config::CatalogConfig;
use bepsim::error::SimError;
use bepsim::population::Population;
use bepsim::runner::{self, RunOptions};
use bepsim::sim::sampling::SeedPolicy;
use bepsim::sim::summary::ScenarioSummary;

/// Building-energy policy scenario simulator.
///
/// Runs each scenario of a target catalog against a building population and
/// writes one CSV table and one summary CSV per scenario.
#[derive(Parser, Debug)]
#[command(name = "bepsim", version, about)]
struct Args {
    /// Target catalog TOML file
    #[arg(long, conflicts_with = "preset")]
    catalog: Option<PathBuf>,

    /// Built-in catalog (demo, empty); used when --catalog is absent
    #[arg(long)]
    preset: Option<String>,

    /// Building population CSV (type, area, {year}_elec, {year}_gas, {year}_steam)
    #[arg(long)]
    buildings: PathBuf,

    /// Scenario to run; repeat for several. Defaults to every scenario
    #[arg(long = "scenario")]
    scenarios: Vec<String>,

    /// Output directory
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Override the catalog's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the catalog's seed policy (per_run, per_target, per_draw)
    #[arg(long, value_parser = parse_seed_policy)]
    seed_policy: Option<SeedPolicy>,

    /// Write a JSON diagnostics report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Worker threads across scenarios (1 runs sequentially)
    #[arg(long)]
    jobs: Option<usize>,
}

fn parse_seed_policy(s: &str) -> Result<SeedPolicy, String> {
    SeedPolicy::from_name(s).ok_or_else(|| {
        format!(
            "unknown seed policy \"{s}\", available: {}",
            SeedPolicy::NAMES.join(", ")
        )
    })
}

fn load_catalog(args: &Args) -> CatalogConfig {
    // --catalog takes priority, then --preset, then the demo catalog
    let loaded = if let Some(ref path) = args.catalog {
        CatalogConfig::from_toml_file(path)
    } else if let Some(ref name) = args.preset {
        CatalogConfig::from_preset(name)
    } else {
        Ok(CatalogConfig::demo())
    };

    let mut catalog = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(seed) = args.seed {
        catalog.simulation.seed = seed;
    }
    if let Some(policy) = args.seed_policy {
        catalog.simulation.seed_policy = policy;
    }

    let errors = catalog.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    catalog
}

fn run(args: &Args, catalog: &CatalogConfig) -> Result<(), SimError> {
    let population = Population::from_csv_path(
        &args.buildings,
        catalog.simulation.baseline_year,
        &catalog.population.vocabulary(),
    )?;

    let options = RunOptions {
        scenarios: args.scenarios.clone(),
        jobs: args.jobs,
    };
    let results = runner::run_scenarios(catalog, &population, &options)?;
    runner::write_outputs(
        &population,
        &results,
        &args.out_dir,
        args.report.as_deref(),
    )?;

    for result in &results {
        println!("{}\n", ScenarioSummary::from_result(result));
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bepsim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let catalog = load_catalog(&args);

    if let Err(e) = run(&args, &catalog) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use bepsim::config::CatalogConfig;
use bepsim::policies::TargetCatalog;
use bepsim::population::Population;
use bepsim::sim::engine::{Engine, ScenarioResult};
use bepsim::sim::sampling::SeedPolicy;
use bepsim::sim::types::{FuelVector, SimConfig};

/// Default emission factors (kgCO2e/kBtu).
pub fn default_factors() -> FuelVector {
    FuelVector::new(6.164e-3, 52.98e-3, 52.99e-3)
}

/// Run configuration over `2020..=end_year` with seed 0 and the default factors.
pub fn config(end_year: i32) -> SimConfig {
    SimConfig::new(2020, end_year, 0, SeedPolicy::PerRun, default_factors())
}

/// Three buildings of distinct types, 25,000 ft², {elec 1000, gas 2000, steam 0}.
pub fn three_buildings() -> Population {
    let mut pop = Population::new(2020);
    for ty in ["Hotel", "Hospital", "Warehouse"] {
        pop.push(ty, 25_000.0, FuelVector::new(1000.0, 2000.0, 0.0));
    }
    pop
}

/// `n` buildings with varied size and fuel mix across two types.
pub fn mixed_population(n: usize) -> Population {
    let mut pop = Population::new(2020);
    for i in 0..n {
        let ty = if i % 2 == 0 { "Hotel" } else { "Large Office" };
        let area = 20e3 + 15e3 * i as f64;
        let eui = 60.0 + 7.0 * (i % 5) as f64;
        let total = eui * area;
        let steam = if i % 3 == 0 { 0.1 * total } else { 0.0 };
        let gas = 0.4 * total;
        pop.push(ty, area, FuelVector::new(total - gas - steam, gas, steam));
    }
    pop
}

/// Runs `catalog` over `population` for `config`.
pub fn run(population: &Population, catalog: &TargetCatalog, config: SimConfig) -> ScenarioResult {
    Engine::new("test", config, population, catalog)
        .run()
        .expect("scenario should run")
}

pub fn manifest_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

/// The sample catalog shipped under `scenarios/`.
pub fn sample_catalog() -> CatalogConfig {
    CatalogConfig::from_toml_file(&manifest_path("scenarios/sample.toml"))
        .expect("sample catalog should parse")
}

/// The sample population shipped under `tests/fixtures/`.
pub fn sample_population(catalog: &CatalogConfig) -> Population {
    Population::from_csv_path(
        &manifest_path("tests/fixtures/buildings.csv"),
        catalog.simulation.baseline_year,
        &catalog.population.vocabulary(),
    )
    .expect("sample population should load")
}

/// A fresh, empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bepsim-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

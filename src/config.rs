//! TOML target catalog: run horizon, emission factors, building vocabulary,
//! and per-scenario target lists.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, SimError};
use crate::policies::{
    ElectrifyTarget, EuiTarget, GhgGoal, GhgTarget, TargetCatalog, TargetScope, TuneupTarget,
    YearRange,
};
use crate::sim::sampling::SeedPolicy;
use crate::sim::types::{FuelVector, Mechanism, SimConfig};

/// Benchmarking building categories accepted by default.
pub const DEFAULT_BUILDING_TYPES: [&str; 22] = [
    "Distribution Center",
    "High-Rise Multifamily",
    "Hospital",
    "Hotel",
    "K-12 School",
    "Laboratory",
    "Large Office",
    "Low-Rise Multifamily",
    "Medical Office",
    "Mid-Rise Multifamily",
    "Mixed Use Property",
    "Other",
    "Residence Hall",
    "Restaurant",
    "Retail Store",
    "Self-Storage Facility",
    "Senior Care Community",
    "Small- and Mid-Sized Office",
    "Supermarket / Grocery Store",
    "University",
    "Warehouse",
    "Worship Facility",
];

/// Top-level catalog parsed from TOML.
///
/// All sections have defaults. Load from TOML with
/// [`CatalogConfig::from_toml_file`] or use [`CatalogConfig::demo`] for the
/// built-in catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Horizon and seeding.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// kgCO2e per kBtu for each fuel.
    #[serde(default)]
    pub emission_factors: EmissionFactorsConfig,
    /// Building-type vocabulary.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Scenarios in catalog order.
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

/// Horizon and seeding.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Year whose energy is read from the population table.
    pub baseline_year: i32,
    /// Last simulated year (inclusive, must be > `baseline_year`).
    pub end_year: i32,
    /// Master random seed.
    pub seed: u64,
    /// How the seed drives randomized selections.
    pub seed_policy: SeedPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            baseline_year: 2020,
            end_year: 2050,
            seed: 0,
            seed_policy: SeedPolicy::PerRun,
        }
    }
}

/// Emission factors in kgCO2e/kBtu.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmissionFactorsConfig {
    pub elec: f64,
    pub gas: f64,
    pub steam: f64,
}

impl Default for EmissionFactorsConfig {
    fn default() -> Self {
        Self {
            elec: 6.164e-3,
            gas: 52.98e-3,
            steam: 52.99e-3,
        }
    }
}

impl EmissionFactorsConfig {
    pub fn to_vector(&self) -> FuelVector {
        FuelVector::new(self.elec, self.gas, self.steam)
    }
}

/// Building-type vocabulary. An empty list accepts any type.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationConfig {
    pub building_types: Vec<String>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            building_types: DEFAULT_BUILDING_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PopulationConfig {
    pub fn vocabulary(&self) -> BTreeSet<String> {
        self.building_types.iter().cloned().collect()
    }
}

/// One named scenario and its targets per mechanism.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    pub name: String,
    #[serde(default)]
    pub tuneup: Vec<TargetRecord>,
    #[serde(default)]
    pub eui: Vec<TargetRecord>,
    #[serde(default)]
    pub ghg: Vec<TargetRecord>,
    #[serde(default)]
    pub electrify: Vec<TargetRecord>,
}

impl ScenarioSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tuneup: Vec::new(),
            eui: Vec::new(),
            ghg: Vec::new(),
            electrify: Vec::new(),
        }
    }

    fn records(&self, mechanism: Mechanism) -> &[TargetRecord] {
        match mechanism {
            Mechanism::Tuneup => &self.tuneup,
            Mechanism::Eui => &self.eui,
            Mechanism::Ghg => &self.ghg,
            Mechanism::Electrify => &self.electrify,
        }
    }
}

/// Raw target record as written in the catalog.
///
/// Which fields are required depends on the mechanism the record is listed
/// under; see [`CatalogConfig::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetRecord {
    /// Inclusive `[start, end]`.
    pub years: Option<[i32; 2]>,
    pub types: Option<Vec<String>>,
    pub not_types: Option<Vec<String>>,
    /// Half-open `[min, max)` in ft².
    pub area_range: Option<[f64; 2]>,
    pub reduction_fraction: Option<f64>,
    pub reference_year: Option<i32>,
    /// kgCO2e/ft².
    pub target_intensity: Option<f64>,
    pub compliance_fraction: Option<f64>,
    pub bldg_fraction: Option<f64>,
    pub fuel_substitution_fraction: Option<f64>,
    pub coefficient_of_performance: Option<f64>,
}

impl TargetRecord {
    /// Record active over `[start, end]` matching every building.
    pub fn spanning(start: i32, end: i32) -> Self {
        Self {
            years: Some([start, end]),
            ..Self::default()
        }
    }

    pub fn for_type(mut self, building_type: &str) -> Self {
        self.types = Some(vec![building_type.to_string()]);
        self
    }

    pub fn with_areas(mut self, min: f64, max: f64) -> Self {
        self.area_range = Some([min, max]);
        self
    }

    /// Names of the set fields that `mechanism` does not use.
    fn foreign_fields(&self, mechanism: Mechanism) -> Vec<&'static str> {
        let set = [
            ("reduction_fraction", self.reduction_fraction.is_some()),
            ("reference_year", self.reference_year.is_some()),
            ("target_intensity", self.target_intensity.is_some()),
            ("compliance_fraction", self.compliance_fraction.is_some()),
            ("bldg_fraction", self.bldg_fraction.is_some()),
            (
                "fuel_substitution_fraction",
                self.fuel_substitution_fraction.is_some(),
            ),
            (
                "coefficient_of_performance",
                self.coefficient_of_performance.is_some(),
            ),
        ];
        let allowed: &[&str] = match mechanism {
            Mechanism::Tuneup => &["reduction_fraction"],
            Mechanism::Eui => &["reference_year"],
            Mechanism::Ghg => &[
                "reference_year",
                "reduction_fraction",
                "target_intensity",
                "compliance_fraction",
            ],
            Mechanism::Electrify => &[
                "bldg_fraction",
                "fuel_substitution_fraction",
                "coefficient_of_performance",
            ],
        };
        set.into_iter()
            .filter(|(name, present)| *present && !allowed.contains(name))
            .map(|(name, _)| name)
            .collect()
    }

    fn scope(&self, path: &str) -> Result<TargetScope, ConfigError> {
        let [start, end] = required(self.years, path, "years")?;
        if start > end {
            return Err(ConfigError::new(
                format!("{path}.years"),
                "start must be <= end",
            ));
        }
        let mut scope = TargetScope::new(YearRange::new(start, end));
        if let Some(types) = &self.types {
            scope = scope.with_types(types.iter().cloned());
        }
        if let Some(not_types) = &self.not_types {
            scope = scope.without_types(not_types.iter().cloned());
        }
        if let Some([min, max]) = self.area_range {
            scope = scope.with_areas(min, max);
        }
        Ok(scope)
    }

    fn ghg_goal(&self, path: &str) -> Result<GhgGoal, ConfigError> {
        match (
            self.reference_year,
            self.reduction_fraction,
            self.target_intensity,
        ) {
            (Some(year), None, None) => Ok(GhgGoal::ReferenceYear(year)),
            (None, Some(fraction), None) => Ok(GhgGoal::ReductionFraction(fraction)),
            (None, None, Some(value)) => Ok(GhgGoal::Intensity(value)),
            _ => Err(ConfigError::new(
                path,
                "exactly one of reference_year, reduction_fraction, target_intensity is required",
            )),
        }
    }
}

fn required<T: Copy>(value: Option<T>, path: &str, field: &str) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::new(format!("{path}.{field}"), "is required"))
}

fn check_fraction(value: Option<f64>, path: &str, field: &str, errors: &mut Vec<ConfigError>) {
    if let Some(v) = value {
        if !(0.0..=1.0).contains(&v) {
            errors.push(ConfigError::new(
                format!("{path}.{field}"),
                format!("must be in [0.0, 1.0], got {v}"),
            ));
        }
    }
}

impl CatalogConfig {
    /// Catalog with the default horizon and vocabulary and no scenarios.
    pub fn empty() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            emission_factors: EmissionFactorsConfig::default(),
            population: PopulationConfig::default(),
            scenarios: Vec::new(),
        }
    }

    /// Built-in demonstration catalog.
    ///
    /// `Basecase` carries a one-year tune-up for buildings of 50k ft² and up
    /// plus tiered EUI targets every five years. `Phasing-Option A` adds a 20%
    /// GHG cut tiered over 2026-2028 and full electrification tiered over
    /// 2036-2038. Targets are per building type so peer means stay per type.
    pub fn demo() -> Self {
        let mut catalog = Self::empty();
        let types = catalog.population.building_types.clone();
        let tiers = [
            (220e3, f64::INFINITY),
            (90e3, 220e3),
            (50e3, 90e3),
        ];

        let mut basecase = ScenarioSpec::new("Basecase");
        for ty in &types {
            basecase.tuneup.push(TargetRecord {
                reduction_fraction: Some(0.1),
                ..TargetRecord::spanning(2021, 2021)
                    .for_type(ty)
                    .with_areas(50e3, f64::INFINITY)
            });
            for (cycle, reference_year) in [(2025, 2020), (2030, 2029), (2035, 2034)] {
                for (offset, (min, max)) in (0..).zip(tiers) {
                    let start = cycle + offset;
                    basecase.eui.push(TargetRecord {
                        reference_year: Some(reference_year),
                        ..TargetRecord::spanning(start, start + 1)
                            .for_type(ty)
                            .with_areas(min, max)
                    });
                }
            }
        }

        let mut option_a = basecase.clone();
        option_a.name = "Phasing-Option A".to_string();
        for ty in &types {
            for (offset, (min, max)) in (0..).zip(tiers) {
                option_a.ghg.push(TargetRecord {
                    reduction_fraction: Some(0.2),
                    compliance_fraction: Some(1.0),
                    ..TargetRecord::spanning(2025 + offset, 2026 + offset)
                        .for_type(ty)
                        .with_areas(min, max)
                });
                option_a.electrify.push(TargetRecord {
                    bldg_fraction: Some(1.0),
                    fuel_substitution_fraction: Some(1.0),
                    coefficient_of_performance: Some(2.0),
                    ..TargetRecord::spanning(2035 + offset, 2036 + offset)
                        .for_type(ty)
                        .with_areas(min, max)
                });
            }
        }

        catalog.scenarios = vec![basecase, option_a];
        catalog
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "empty"];

    /// Loads a catalog from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "empty" => Ok(Self::empty()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("catalog", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a catalog from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates every section and target, returning all errors found.
    ///
    /// Returns an empty vector if the catalog is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.end_year <= s.baseline_year {
            errors.push(ConfigError::new(
                "simulation.end_year",
                "must be > simulation.baseline_year",
            ));
        }

        let f = &self.emission_factors;
        for (name, value) in [("elec", f.elec), ("gas", f.gas), ("steam", f.steam)] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(
                    format!("emission_factors.{name}"),
                    "must be finite and >= 0",
                ));
            }
        }

        let vocabulary = self.population.vocabulary();
        let mut names = HashSet::new();
        for (i, scenario) in self.scenarios.iter().enumerate() {
            if scenario.name.trim().is_empty() {
                errors.push(ConfigError::new(
                    format!("scenarios[{i}].name"),
                    "must not be empty",
                ));
            } else if !names.insert(scenario.name.as_str()) {
                errors.push(ConfigError::new(
                    format!("scenarios[{i}].name"),
                    format!("duplicate scenario \"{}\"", scenario.name),
                ));
            }
            for mechanism in Mechanism::ALL {
                for (j, record) in scenario.records(mechanism).iter().enumerate() {
                    let path = format!("scenarios[{i}].{mechanism}[{j}]");
                    self.validate_record(mechanism, record, &path, &vocabulary, &mut errors);
                }
            }
        }

        errors
    }

    fn validate_record(
        &self,
        mechanism: Mechanism,
        record: &TargetRecord,
        path: &str,
        vocabulary: &BTreeSet<String>,
        errors: &mut Vec<ConfigError>,
    ) {
        let baseline_year = self.simulation.baseline_year;

        match record.years {
            None => errors.push(ConfigError::new(format!("{path}.years"), "is required")),
            Some([start, end]) => {
                if start > end {
                    errors.push(ConfigError::new(
                        format!("{path}.years"),
                        "start must be <= end",
                    ));
                }
                if start <= baseline_year {
                    errors.push(ConfigError::new(
                        format!("{path}.years"),
                        format!("start must be > simulation.baseline_year ({baseline_year})"),
                    ));
                }
                if let Some(reference) = record.reference_year {
                    if reference < baseline_year || reference >= start {
                        errors.push(ConfigError::new(
                            format!("{path}.reference_year"),
                            format!("must be in [{baseline_year}, {}]", start - 1),
                        ));
                    }
                }
            }
        }

        if !vocabulary.is_empty() {
            for (field, list) in [("types", &record.types), ("not_types", &record.not_types)] {
                for ty in list.iter().flatten() {
                    if !vocabulary.contains(ty) {
                        errors.push(ConfigError::new(
                            format!("{path}.{field}"),
                            format!("unknown building type \"{ty}\""),
                        ));
                    }
                }
            }
        }

        if let Some([min, max]) = record.area_range {
            if min.is_nan() || max.is_nan() || min >= max {
                errors.push(ConfigError::new(
                    format!("{path}.area_range"),
                    "must satisfy min < max",
                ));
            }
        }

        for field in record.foreign_fields(mechanism) {
            errors.push(ConfigError::new(
                format!("{path}.{field}"),
                format!("not used by {mechanism} targets"),
            ));
        }

        match mechanism {
            Mechanism::Tuneup => {
                if record.reduction_fraction.is_none() {
                    errors.push(ConfigError::new(
                        format!("{path}.reduction_fraction"),
                        "is required",
                    ));
                }
                check_fraction(record.reduction_fraction, path, "reduction_fraction", errors);
            }
            Mechanism::Eui => {
                if record.reference_year.is_none() {
                    errors.push(ConfigError::new(
                        format!("{path}.reference_year"),
                        "is required",
                    ));
                }
            }
            Mechanism::Ghg => {
                if let Err(e) = record.ghg_goal(path) {
                    errors.push(e);
                }
                check_fraction(record.reduction_fraction, path, "reduction_fraction", errors);
                check_fraction(record.compliance_fraction, path, "compliance_fraction", errors);
                if let Some(v) = record.target_intensity {
                    if !v.is_finite() || v < 0.0 {
                        errors.push(ConfigError::new(
                            format!("{path}.target_intensity"),
                            "must be finite and >= 0",
                        ));
                    }
                }
            }
            Mechanism::Electrify => {
                for (field, value) in [
                    ("bldg_fraction", record.bldg_fraction),
                    (
                        "fuel_substitution_fraction",
                        record.fuel_substitution_fraction,
                    ),
                ] {
                    if value.is_none() {
                        errors.push(ConfigError::new(format!("{path}.{field}"), "is required"));
                    }
                    check_fraction(value, path, field, errors);
                }
                match record.coefficient_of_performance {
                    None => errors.push(ConfigError::new(
                        format!("{path}.coefficient_of_performance"),
                        "is required",
                    )),
                    Some(cop) if !cop.is_finite() || cop <= 0.0 => {
                        errors.push(ConfigError::new(
                            format!("{path}.coefficient_of_performance"),
                            "must be finite and > 0",
                        ))
                    }
                    Some(_) => {}
                }
            }
        }
    }

    /// Scenario names in catalog order.
    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn scenario(&self, name: &str) -> Option<&ScenarioSpec> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Run configuration shared by every scenario.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(
            self.simulation.baseline_year,
            self.simulation.end_year,
            self.simulation.seed,
            self.simulation.seed_policy,
            self.emission_factors.to_vector(),
        )
    }

    /// Typed targets for the scenario called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownScenario`] if no scenario has that name, or
    /// a configuration error if a record lacks a required field.
    pub fn catalog_for(&self, name: &str) -> Result<TargetCatalog, SimError> {
        let (i, spec) = self
            .scenarios
            .iter()
            .enumerate()
            .find(|(_, s)| s.name == name)
            .ok_or_else(|| SimError::UnknownScenario {
                name: name.to_string(),
                available: self.scenario_names().join(", "),
            })?;

        let path = |mechanism: Mechanism, j: usize| format!("scenarios[{i}].{mechanism}[{j}]");
        let mut catalog = TargetCatalog::default();

        for (j, r) in spec.tuneup.iter().enumerate() {
            let p = path(Mechanism::Tuneup, j);
            catalog.tuneup.push(TuneupTarget::new(
                r.scope(&p)?,
                required(r.reduction_fraction, &p, "reduction_fraction")?,
            ));
        }
        for (j, r) in spec.eui.iter().enumerate() {
            let p = path(Mechanism::Eui, j);
            catalog.eui.push(EuiTarget::new(
                r.scope(&p)?,
                required(r.reference_year, &p, "reference_year")?,
            ));
        }
        for (j, r) in spec.ghg.iter().enumerate() {
            let p = path(Mechanism::Ghg, j);
            catalog.ghg.push(GhgTarget::new(
                r.scope(&p)?,
                r.ghg_goal(&p)?,
                r.compliance_fraction.unwrap_or(1.0),
            ));
        }
        for (j, r) in spec.electrify.iter().enumerate() {
            let p = path(Mechanism::Electrify, j);
            catalog.electrify.push(ElectrifyTarget::new(
                r.scope(&p)?,
                required(r.bldg_fraction, &p, "bldg_fraction")?,
                required(r.fuel_substitution_fraction, &p, "fuel_substitution_fraction")?,
                required(r.coefficient_of_performance, &p, "coefficient_of_performance")?,
            ));
        }

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_preset_valid() {
        let cfg = CatalogConfig::demo();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "demo should be valid: {errors:?}");
        assert_eq!(cfg.scenario_names(), vec!["Basecase", "Phasing-Option A"]);
    }

    #[test]
    fn all_presets_are_valid() {
        for name in CatalogConfig::PRESETS {
            let cfg = CatalogConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn from_preset_unknown() {
        let e = CatalogConfig::from_preset("nonexistent").unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn demo_catalog_converts() {
        let cfg = CatalogConfig::demo();
        let catalog = cfg.catalog_for("Phasing-Option A").unwrap();
        assert_eq!(catalog.tuneup.len(), 22);
        assert_eq!(catalog.eui.len(), 22 * 9);
        assert_eq!(catalog.ghg.len(), 22 * 3);
        assert_eq!(catalog.electrify.len(), 22 * 3);
        assert_eq!(cfg.catalog_for("Basecase").unwrap().ghg.len(), 0);
    }

    #[test]
    fn full_toml_parses() {
        let toml = r#"
[simulation]
baseline_year = 2020
end_year = 2030
seed = 7
seed_policy = "per_target"

[emission_factors]
elec = 0.01
gas = 0.05
steam = 0.06

[population]
building_types = ["Office", "Hotel"]

[[scenarios]]
name = "Strict"

[[scenarios.tuneup]]
years = [2021, 2021]
reduction_fraction = 0.1
area_range = [50e3, inf]

[[scenarios.ghg]]
years = [2025, 2026]
target_intensity = 1.7
compliance_fraction = 0.8
types = ["Hotel"]

[[scenarios.electrify]]
years = [2026, 2028]
not_types = ["Office"]
bldg_fraction = 1.0
fuel_substitution_fraction = 0.5
coefficient_of_performance = 2.0
"#;
        let cfg = CatalogConfig::from_toml_str(toml).unwrap();
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
        assert_eq!(cfg.simulation.seed_policy, SeedPolicy::PerTarget);
        assert_eq!(cfg.sim_config().horizon(), 10);

        let catalog = cfg.catalog_for("Strict").unwrap();
        assert_eq!(catalog.tuneup[0].scope.areas.map(|a| a.max), Some(f64::INFINITY));
        assert_eq!(catalog.ghg[0].goal, GhgGoal::Intensity(1.7));
        assert_eq!(catalog.ghg[0].compliance_fraction, 0.8);
        assert_eq!(catalog.electrify[0].coefficient_of_performance, 2.0);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = CatalogConfig::from_toml_str("[simulation]\nseed = 99\n").unwrap();
        assert_eq!(cfg.simulation.seed, 99);
        assert_eq!(cfg.simulation.end_year, 2050);
        assert_eq!(cfg.emission_factors.gas, 52.98e-3);
        assert_eq!(cfg.population.building_types.len(), 22);
        assert!(cfg.scenarios.is_empty());
    }

    #[test]
    fn unknown_field_rejected() {
        let toml = r#"
[[scenarios]]
name = "X"

[[scenarios.eui]]
years = [2025, 2026]
reference_year = 2020
avg_year = 2020
"#;
        assert!(CatalogConfig::from_toml_str(toml).is_err());
    }

    fn one_target(mechanism: Mechanism, record: TargetRecord) -> CatalogConfig {
        let mut cfg = CatalogConfig::empty();
        let mut spec = ScenarioSpec::new("S");
        match mechanism {
            Mechanism::Tuneup => spec.tuneup.push(record),
            Mechanism::Eui => spec.eui.push(record),
            Mechanism::Ghg => spec.ghg.push(record),
            Mechanism::Electrify => spec.electrify.push(record),
        }
        cfg.scenarios.push(spec);
        cfg
    }

    fn fields(cfg: &CatalogConfig) -> Vec<String> {
        cfg.validate().into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn ghg_requires_exactly_one_goal() {
        let both = TargetRecord {
            reference_year: Some(2020),
            reduction_fraction: Some(0.2),
            ..TargetRecord::spanning(2025, 2026)
        };
        assert_eq!(
            fields(&one_target(Mechanism::Ghg, both)),
            vec!["scenarios[0].ghg[0]"]
        );
        let none = TargetRecord::spanning(2025, 2026);
        assert_eq!(
            fields(&one_target(Mechanism::Ghg, none)),
            vec!["scenarios[0].ghg[0]"]
        );
    }

    #[test]
    fn reference_year_must_precede_start() {
        let record = TargetRecord {
            reference_year: Some(2025),
            ..TargetRecord::spanning(2025, 2026)
        };
        assert_eq!(
            fields(&one_target(Mechanism::Eui, record)),
            vec!["scenarios[0].eui[0].reference_year"]
        );
    }

    #[test]
    fn start_must_follow_baseline() {
        let record = TargetRecord {
            reduction_fraction: Some(0.1),
            ..TargetRecord::spanning(2020, 2021)
        };
        assert_eq!(
            fields(&one_target(Mechanism::Tuneup, record)),
            vec!["scenarios[0].tuneup[0].years"]
        );
    }

    #[test]
    fn fields_of_other_mechanisms_are_rejected() {
        let record = TargetRecord {
            reduction_fraction: Some(0.1),
            bldg_fraction: Some(1.0),
            ..TargetRecord::spanning(2021, 2021)
        };
        assert_eq!(
            fields(&one_target(Mechanism::Tuneup, record)),
            vec!["scenarios[0].tuneup[0].bldg_fraction"]
        );
    }

    #[test]
    fn electrify_validation_collects_every_error() {
        let record = TargetRecord {
            bldg_fraction: Some(1.5),
            coefficient_of_performance: Some(0.0),
            types: Some(vec!["Castle".into()]),
            ..TargetRecord::spanning(2035, 2036)
        };
        let found = fields(&one_target(Mechanism::Electrify, record));
        for expected in [
            "scenarios[0].electrify[0].types",
            "scenarios[0].electrify[0].bldg_fraction",
            "scenarios[0].electrify[0].fuel_substitution_fraction",
            "scenarios[0].electrify[0].coefficient_of_performance",
        ] {
            assert!(found.iter().any(|f| f == expected), "missing {expected} in {found:?}");
        }
    }

    #[test]
    fn bad_area_range_and_duplicate_names() {
        let mut cfg = one_target(
            Mechanism::Tuneup,
            TargetRecord {
                reduction_fraction: Some(0.1),
                ..TargetRecord::spanning(2021, 2021).with_areas(50e3, 20e3)
            },
        );
        cfg.scenarios.push(ScenarioSpec::new("S"));
        let found = fields(&cfg);
        assert!(found.contains(&"scenarios[0].tuneup[0].area_range".to_string()));
        assert!(found.contains(&"scenarios[1].name".to_string()));
    }

    #[test]
    fn horizon_and_factors_checked() {
        let mut cfg = CatalogConfig::empty();
        cfg.simulation.end_year = 2020;
        cfg.emission_factors.gas = -1.0;
        let found = fields(&cfg);
        assert_eq!(found, vec!["simulation.end_year", "emission_factors.gas"]);
    }

    #[test]
    fn unknown_scenario_lists_available() {
        let cfg = CatalogConfig::demo();
        match cfg.catalog_for("Option Z") {
            Err(SimError::UnknownScenario { name, available }) => {
                assert_eq!(name, "Option Z");
                assert!(available.contains("Basecase"));
            }
            other => panic!("expected UnknownScenario, got {other:?}"),
        }
    }
}

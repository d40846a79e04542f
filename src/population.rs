//! Building population table: one row per building with baseline-year energy.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::{Result, SimError};
use crate::sim::types::{Fuel, FuelVector};

/// Immutable baseline population shared by every scenario run.
///
/// # Examples
///
/// ```
/// use bepsim::population::Population;
/// use bepsim::sim::types::FuelVector;
///
/// let mut pop = Population::new(2020);
/// pop.push("Hotel", 25_000.0, FuelVector::new(1000.0, 2000.0, 0.0));
/// assert_eq!(pop.len(), 1);
/// assert_eq!(pop.building_type(0), "Hotel");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Population {
    baseline_year: i32,
    types: Vec<String>,
    areas: Vec<f64>,
    baseline: Vec<FuelVector>,
}

impl Population {
    /// Creates an empty population whose energy values refer to `baseline_year`.
    pub fn new(baseline_year: i32) -> Self {
        Self {
            baseline_year,
            ..Self::default()
        }
    }

    /// Appends a building.
    ///
    /// # Panics
    ///
    /// Panics if `area` is not a positive finite number.
    pub fn push(&mut self, building_type: impl Into<String>, area: f64, energy: FuelVector) {
        assert!(area.is_finite() && area > 0.0, "area must be positive and finite");
        self.types.push(building_type.into());
        self.areas.push(area);
        self.baseline.push(energy);
    }

    pub fn baseline_year(&self) -> i32 {
        self.baseline_year
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn building_type(&self, building: usize) -> &str {
        &self.types[building]
    }

    /// Floor area in square feet.
    pub fn area(&self, building: usize) -> f64 {
        self.areas[building]
    }

    /// Baseline-year energy per fuel (kBtu).
    pub fn baseline_energy(&self, building: usize) -> FuelVector {
        self.baseline[building]
    }

    pub fn baseline(&self) -> &[FuelVector] {
        &self.baseline
    }

    /// Column name for a fuel's energy in `year`, e.g. `2020_gas`.
    pub fn energy_column(year: i32, fuel: Fuel) -> String {
        format!("{year}_{}", fuel.label())
    }

    /// Loads a population from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be opened, or any error
    /// from [`Population::from_reader`].
    pub fn from_csv_path(
        path: &Path,
        baseline_year: i32,
        vocabulary: &BTreeSet<String>,
    ) -> Result<Self> {
        let file = File::open(path)?;
        let population = Self::from_reader(file, baseline_year, vocabulary)?;
        info!(
            path = %path.display(),
            buildings = population.len(),
            "loaded building population"
        );
        Ok(population)
    }

    /// Parses a population from CSV with columns `type`, `area` and
    /// `{baseline_year}_{fuel}` for every fuel. Other columns are ignored.
    ///
    /// An empty `vocabulary` accepts any building type.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Input`] naming the row and column of the first
    /// missing or malformed value.
    pub fn from_reader(
        reader: impl Read,
        baseline_year: i32,
        vocabulary: &BTreeSet<String>,
    ) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let column = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SimError::Input {
                    row: 0,
                    column: name.to_string(),
                    message: "missing column".to_string(),
                })
        };

        let type_col = column("type")?;
        let area_col = column("area")?;
        let mut fuel_cols = [0usize; 3];
        for (slot, fuel) in fuel_cols.iter_mut().zip(Fuel::ALL) {
            *slot = column(&Self::energy_column(baseline_year, fuel))?;
        }

        let mut population = Self::new(baseline_year);
        for (i, record) in rdr.records().enumerate() {
            let row = i + 1;
            let record = record?;

            let building_type = record.get(type_col).unwrap_or_default();
            if building_type.is_empty() {
                return Err(input_error(row, "type", "empty building type"));
            }
            if !vocabulary.is_empty() && !vocabulary.contains(building_type) {
                return Err(input_error(
                    row,
                    "type",
                    format!("unknown building type \"{building_type}\""),
                ));
            }

            let area = parse_number(record.get(area_col), row, "area")?;
            if !(area.is_finite() && area > 0.0) {
                return Err(input_error(row, "area", "must be positive and finite"));
            }

            let mut energy = FuelVector::ZERO;
            for (&col, fuel) in fuel_cols.iter().zip(Fuel::ALL) {
                let name = Self::energy_column(baseline_year, fuel);
                let value = parse_number(record.get(col), row, &name)?;
                if !(value.is_finite() && value >= 0.0) {
                    return Err(input_error(row, &name, "must be non-negative and finite"));
                }
                energy[fuel] = value;
            }

            population.push(building_type, area, energy);
        }

        Ok(population)
    }
}

fn input_error(row: usize, column: &str, message: impl Into<String>) -> SimError {
    SimError::Input {
        row,
        column: column.to_string(),
        message: message.into(),
    }
}

fn parse_number(value: Option<&str>, row: usize, column: &str) -> Result<f64> {
    let raw = value.unwrap_or_default();
    raw.parse::<f64>()
        .map_err(|_| input_error(row, column, format!("expected number, got \"{raw}\"")))
}

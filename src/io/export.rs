//! CSV and JSON export for scenario results.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::population::Population;
use crate::sim::engine::ScenarioResult;
use crate::sim::integrity::Diagnostics;
use crate::sim::summary::ScenarioSummary;
use crate::sim::types::{Fuel, Mechanism};

/// File stem for a scenario: spaces become `-`.
///
/// # Examples
///
/// ```
/// use bepsim::io::export::file_stem;
///
/// assert_eq!(file_stem("Phasing-Option A"), "Phasing-Option-A");
/// ```
pub fn file_stem(scenario: &str) -> String {
    scenario.replace(' ', "-")
}

/// Path of the per-building table for `scenario` under `dir`.
pub fn table_path(dir: &Path, scenario: &str) -> PathBuf {
    dir.join(format!("{}.csv", file_stem(scenario)))
}

/// Path of the per-year summary for `scenario` under `dir`.
pub fn summary_path(dir: &Path, scenario: &str) -> PathBuf {
    dir.join(format!("{}_summary.csv", file_stem(scenario)))
}

/// Column names of the per-building table, in order.
///
/// `type`, `area`, the baseline energy columns, then for every simulated year
/// the per-mechanism-per-fuel reductions, per-fuel totals, per-mechanism
/// totals and resulting energy, and finally `electrification_year`.
pub fn table_header(baseline_year: i32, end_year: i32) -> Vec<String> {
    let mut header = vec!["type".to_string(), "area".to_string()];
    header.extend(Fuel::ALL.map(|fuel| Population::energy_column(baseline_year, fuel)));
    for year in (baseline_year + 1)..=end_year {
        for mechanism in Mechanism::ALL {
            for fuel in Fuel::ALL {
                header.push(format!("{year}_{mechanism}_{fuel}_reduct"));
            }
        }
        for fuel in Fuel::ALL {
            header.push(format!("{year}_{fuel}_reduct"));
        }
        for mechanism in Mechanism::ALL {
            header.push(format!("{year}_{mechanism}_reduct"));
        }
        for fuel in Fuel::ALL {
            header.push(format!("{year}_{fuel}"));
        }
    }
    header.push("electrification_year".to_string());
    header
}

/// Writes the per-building table to a file.
///
/// # Arguments
///
/// * `population` - Population the scenario was run on
/// * `result` - Scenario result
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_csv(population: &Population, result: &ScenarioResult, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(population, result, io::BufWriter::new(file))
}

/// Writes the per-building table as CSV to any writer.
///
/// One row per building in population order. Floats use the shortest
/// representation that round-trips, so identical runs give identical bytes.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv(population: &Population, result: &ScenarioResult, writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    let config = &result.config;
    wtr.write_record(table_header(config.baseline_year, config.end_year))?;

    let mut row: Vec<String> = Vec::new();
    for b in 0..population.len() {
        row.clear();
        row.push(population.building_type(b).to_string());
        row.push(population.area(b).to_string());
        row.extend(population.baseline_energy(b).0.iter().map(f64::to_string));

        for record in &result.years {
            let reductions = &record.reductions[b];
            for mechanism in Mechanism::ALL {
                row.extend(reductions[mechanism].0.iter().map(f64::to_string));
            }
            row.extend(record.fuel_totals[b].0.iter().map(f64::to_string));
            row.extend(record.mechanism_totals[b].0.iter().map(f64::to_string));
            row.extend(
                result
                    .history
                    .energy(record.year, b)
                    .0
                    .iter()
                    .map(f64::to_string),
            );
        }

        row.push(
            result
                .electrification_years
                .get(b)
                .copied()
                .flatten()
                .map(|y| y.to_string())
                .unwrap_or_default(),
        );
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Column names of the summary table.
pub fn summary_header() -> Vec<String> {
    let mut header = vec!["year".to_string()];
    header.extend(Fuel::ALL.map(|fuel| format!("{fuel}_energy")));
    header.extend(Fuel::ALL.map(|fuel| format!("{fuel}_emissions")));
    header.extend(Mechanism::ALL.map(|m| format!("{m}_reduct")));
    header.extend(Mechanism::ALL.map(|m| format!("{m}_emissions_reduct")));
    header.push("electrified".to_string());
    header
}

/// Writes the per-year summary to a file.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_summary_csv(summary: &ScenarioSummary, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_summary_csv(summary, io::BufWriter::new(file))
}

/// Writes the per-year summary as CSV to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary_csv(summary: &ScenarioSummary, writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(summary_header())?;

    for y in &summary.years {
        let mut row = vec![y.year.to_string()];
        row.extend(y.energy.0.iter().map(f64::to_string));
        row.extend(y.emissions.0.iter().map(f64::to_string));
        row.extend(y.reductions.0.iter().map(f64::to_string));
        row.extend(y.emission_reductions.0.iter().map(f64::to_string));
        row.push(y.electrified.to_string());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes diagnostics for every scenario as pretty JSON keyed by scenario name.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report_json<'a>(
    diagnostics: impl IntoIterator<Item = (&'a str, &'a Diagnostics)>,
    writer: impl Write,
) -> Result<()> {
    let report: BTreeMap<&str, &Diagnostics> = diagnostics.into_iter().collect();
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}

/// Writes the diagnostics report to a file.
///
/// # Errors
///
/// Returns an error if file creation, serialization, or writing fails.
pub fn export_report_json<'a>(
    diagnostics: impl IntoIterator<Item = (&'a str, &'a Diagnostics)>,
    path: &Path,
) -> Result<()> {
    let file = File::create(path)?;
    let mut buf = io::BufWriter::new(file);
    write_report_json(diagnostics, &mut buf)?;
    buf.flush()?;
    Ok(())
}

//! End-of-run integrity scan over energy and reduction columns.
//!
//! Anomalies are reported, never corrected: the run still produces output so
//! the offending columns can be inspected.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use super::engine::YearRecord;
use super::history::EnergyHistory;
use super::types::{Fuel, Mechanism};

/// Values below this count as negative; smaller magnitudes are float noise.
pub const NEGATIVE_TOLERANCE: f64 = -1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// NaN in any energy or reduction column.
    Missing,
    /// Energy below zero.
    NegativeEnergy,
    /// Non-electric reduction below zero.
    NegativeReduction,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnomalyKind::Missing => "missing values",
            AnomalyKind::NegativeEnergy => "negative energy",
            AnomalyKind::NegativeReduction => "negative reduction",
        })
    }
}

/// One offending output column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Output column name, e.g. `2031_gas` or `2031_ghg_steam_reduct`.
    pub column: String,
    /// Number of buildings affected.
    pub count: usize,
}

/// All anomalies found in one scenario run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub anomalies: Vec<Anomaly>,
}

impl Diagnostics {
    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Anomalies of one kind.
    pub fn of_kind(&self, kind: AnomalyKind) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(move |a| a.kind == kind)
    }

    /// Emits one warning per anomaly.
    pub fn log(&self, scenario: &str) {
        for anomaly in &self.anomalies {
            warn!(
                scenario,
                column = %anomaly.column,
                count = anomaly.count,
                "{}",
                anomaly.kind
            );
        }
    }

    fn record(&mut self, kind: AnomalyKind, column: String, count: usize) {
        if count > 0 {
            self.anomalies.push(Anomaly {
                kind,
                column,
                count,
            });
        }
    }
}

/// Scans every materialized year and every reduction record.
pub fn check(history: &EnergyHistory, years: &[YearRecord]) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();

    for year in history.baseline_year()..=history.latest_year() {
        let Some(energy) = history.year(year) else {
            continue;
        };
        for fuel in Fuel::ALL {
            let column = format!("{year}_{fuel}");
            let nan = energy.iter().filter(|e| e[fuel].is_nan()).count();
            let negative = energy
                .iter()
                .filter(|e| e[fuel] < NEGATIVE_TOLERANCE)
                .count();
            diagnostics.record(AnomalyKind::Missing, column.clone(), nan);
            diagnostics.record(AnomalyKind::NegativeEnergy, column, negative);
        }
    }

    for record in years {
        let year = record.year;
        for mechanism in Mechanism::ALL {
            for fuel in Fuel::ALL {
                let column = format!("{year}_{mechanism}_{fuel}_reduct");
                let values = || record.reductions.iter().map(move |r| r[mechanism][fuel]);
                diagnostics.record(
                    AnomalyKind::Missing,
                    column.clone(),
                    values().filter(|v| v.is_nan()).count(),
                );
                if !fuel.is_electric() {
                    diagnostics.record(
                        AnomalyKind::NegativeReduction,
                        column,
                        values().filter(|&v| v < NEGATIVE_TOLERANCE).count(),
                    );
                }
            }
        }
        for fuel in Fuel::ALL {
            let nan = record.fuel_totals.iter().filter(|t| t[fuel].is_nan()).count();
            diagnostics.record(AnomalyKind::Missing, format!("{year}_{fuel}_reduct"), nan);
        }
        for mechanism in Mechanism::ALL {
            let nan = record
                .mechanism_totals
                .iter()
                .filter(|t| t[mechanism].is_nan())
                .count();
            diagnostics.record(
                AnomalyKind::Missing,
                format!("{year}_{mechanism}_reduct"),
                nan,
            );
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::{FuelVector, MechanismReductions};

    fn record(year: i32, reductions: Vec<MechanismReductions>) -> YearRecord {
        YearRecord {
            year,
            fuel_totals: reductions.iter().map(|r| r.fuel_totals()).collect(),
            mechanism_totals: reductions.iter().map(|r| r.mechanism_totals()).collect(),
            reductions,
        }
    }

    #[test]
    fn clean_run_has_no_anomalies() {
        let mut history = EnergyHistory::new(2020, vec![FuelVector::new(10.0, 10.0, 0.0)]);
        history.push(vec![FuelVector::new(9.0, 10.0, 0.0)]);
        let mut r = MechanismReductions::default();
        r[Mechanism::Tuneup] = FuelVector::new(1.0, 0.0, 0.0);
        let d = check(&history, &[record(2021, vec![r])]);
        assert!(d.is_empty(), "{d:?}");
    }

    #[test]
    fn negative_energy_beyond_tolerance_is_reported() {
        let mut history = EnergyHistory::new(2020, vec![FuelVector::ZERO; 2]);
        history.push(vec![
            FuelVector::new(-1e-9, 0.0, 0.0),
            FuelVector::new(0.0, -5.0, 0.0),
        ]);
        let d = check(&history, &[]);
        assert_eq!(
            d.anomalies,
            vec![Anomaly {
                kind: AnomalyKind::NegativeEnergy,
                column: "2021_gas".into(),
                count: 1,
            }]
        );
    }

    #[test]
    fn negative_electric_reduction_is_expected() {
        let history = EnergyHistory::new(2020, vec![FuelVector::ZERO]);
        let mut r = MechanismReductions::default();
        r[Mechanism::Electrify] = FuelVector::new(-50.0, 100.0, 0.0);
        r[Mechanism::Ghg] = FuelVector::new(0.0, 0.0, -2.0);
        let d = check(&history, &[record(2021, vec![r])]);

        let negatives: Vec<&Anomaly> = d.of_kind(AnomalyKind::NegativeReduction).collect();
        assert_eq!(negatives.len(), 1);
        assert_eq!(negatives[0].column, "2021_ghg_steam_reduct");
    }

    #[test]
    fn nan_propagates_to_every_derived_column() {
        let history = EnergyHistory::new(2020, vec![FuelVector::ZERO]);
        let mut r = MechanismReductions::default();
        r[Mechanism::Eui] = FuelVector::new(f64::NAN, 0.0, 0.0);
        let d = check(&history, &[record(2021, vec![r])]);

        let columns: Vec<&str> = d
            .of_kind(AnomalyKind::Missing)
            .map(|a| a.column.as_str())
            .collect();
        assert_eq!(
            columns,
            vec!["2021_eui_elec_reduct", "2021_elec_reduct", "2021_eui_reduct"]
        );
    }
}

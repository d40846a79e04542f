//! End-to-end tests of the `bepsim` binary.

mod common;

use std::fs;
use std::process::{Command, Output};

fn bepsim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bepsim"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to execute bepsim")
}

#[test]
fn sample_catalog_writes_every_output() {
    let out = common::scratch_dir("cli-sample");
    let report = out.join("report.json");
    let catalog = common::manifest_path("scenarios/sample.toml");
    let buildings = common::manifest_path("tests/fixtures/buildings.csv");

    let output = bepsim(&[
        "--catalog",
        catalog.to_str().unwrap(),
        "--buildings",
        buildings.to_str().unwrap(),
        "--out-dir",
        out.to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "bepsim failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    for stem in ["Basecase", "Phasing-Option-A", "Phasing-Option-B"] {
        let table = fs::read_to_string(out.join(format!("{stem}.csv"))).unwrap();
        let mut lines = table.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("type,area,2020_elec,2020_gas,2020_steam,"));
        assert!(header.ends_with(",2050_elec,2050_gas,2050_steam,electrification_year"));
        assert_eq!(lines.count(), 20);

        let summary = fs::read_to_string(out.join(format!("{stem}_summary.csv"))).unwrap();
        // header plus 2020..=2050
        assert_eq!(summary.lines().count(), 32);
    }

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    for name in ["Basecase", "Phasing-Option A", "Phasing-Option B"] {
        assert!(report.get(name).is_some(), "missing {name} in report");
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("--- Scenario:").count(), 3);
    assert!(stdout.contains("--- Scenario: Phasing-Option B ---"));
}

#[test]
fn scenario_flag_limits_the_run() {
    let out = common::scratch_dir("cli-single");
    let buildings = common::manifest_path("tests/fixtures/buildings.csv");

    let output = bepsim(&[
        "--preset",
        "demo",
        "--buildings",
        buildings.to_str().unwrap(),
        "--scenario",
        "Basecase",
        "--out-dir",
        out.to_str().unwrap(),
        "--jobs",
        "1",
    ]);
    assert!(output.status.success());
    assert!(out.join("Basecase.csv").exists());
    assert!(!out.join("Phasing-Option-A.csv").exists());
}

#[test]
fn unknown_scenario_exits_with_error() {
    let out = common::scratch_dir("cli-unknown");
    let buildings = common::manifest_path("tests/fixtures/buildings.csv");

    let output = bepsim(&[
        "--buildings",
        buildings.to_str().unwrap(),
        "--scenario",
        "Option Z",
        "--out-dir",
        out.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown scenario \"Option Z\""), "{stderr}");
    assert!(!out.join("Basecase.csv").exists());
}

#[test]
fn invalid_catalog_reports_every_error() {
    let dir = common::scratch_dir("cli-invalid");
    let catalog = dir.join("bad.toml");
    fs::write(
        &catalog,
        r#"
[simulation]
baseline_year = 2020
end_year = 2019

[[scenarios]]
name = "Broken"

[[scenarios.electrify]]
years = [2030, 2031]
bldg_fraction = 2.0
fuel_substitution_fraction = 1.0
coefficient_of_performance = 0.0
"#,
    )
    .unwrap();
    let buildings = common::manifest_path("tests/fixtures/buildings.csv");

    let output = bepsim(&[
        "--catalog",
        catalog.to_str().unwrap(),
        "--buildings",
        buildings.to_str().unwrap(),
        "--out-dir",
        dir.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simulation.end_year"), "{stderr}");
    assert!(stderr.contains("scenarios[0].electrify[0].bldg_fraction"), "{stderr}");
    assert!(stderr.contains("scenarios[0].electrify[0].coefficient_of_performance"), "{stderr}");
}

#[test]
fn malformed_population_exits_with_error() {
    let dir = common::scratch_dir("cli-badcsv");
    let buildings = dir.join("buildings.csv");
    fs::write(&buildings, "type,area,2020_elec,2020_gas\nHotel,1000,1,2\n").unwrap();

    let output = bepsim(&[
        "--preset",
        "empty",
        "--buildings",
        buildings.to_str().unwrap(),
        "--out-dir",
        dir.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("2020_steam"));
}

//! Building-energy policy scenario simulator.
//!
//! Advances a population of buildings year by year under tune-up, EUI, GHG,
//! and electrification targets, one scenario at a time.

/// TOML target catalog and presets.
pub mod config;
pub mod error;
pub mod io;
/// Reduction mechanisms and their targets.
pub mod policies;
pub mod population;
pub mod runner;
/// Annual engine, amortization state, sampling, and summaries.
pub mod sim;

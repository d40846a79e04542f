/// Calendar-year clock driving the annual loop.
pub mod clock;
pub mod engine;
pub mod history;
/// End-of-run NaN and sign checks.
pub mod integrity;
pub mod sampling;
/// Per-building amortization clocks and electrification state.
pub mod state;
pub mod summary;
pub mod types;

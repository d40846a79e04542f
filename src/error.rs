//! Error types shared across the crate.

use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"scenarios[2].ghg[0].compliance_fraction"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors that abort a scenario run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The catalog has no scenario with the requested name.
    #[error("unknown scenario \"{name}\", available: {available}")]
    UnknownScenario { name: String, available: String },

    /// A population row or column is missing or malformed.
    #[error("input error at row {row}, column `{column}`: {message}")]
    Input {
        /// 1-based data row (0 for header-level problems).
        row: usize,
        column: String,
        message: String,
    },

    /// A randomized selection asked for more buildings than are eligible.
    #[error("cannot sample {requested} buildings from {available} eligible ({context})")]
    SamplingInfeasible {
        requested: usize,
        available: usize,
        context: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SimError>;

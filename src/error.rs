//! Error type shared by every pipeline step.

use std::path::PathBuf;

/// Errors that can occur while loading, reshaping or testing a dataset
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("input has no header row")]
    EmptyInput,

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        column: String,
        value: String,
        line: usize,
    },

    #[error("paired test requires exactly 2 conditions, found {found}: {levels:?}")]
    ConditionCount { found: usize, levels: Vec<String> },

    #[error("subject '{subject}' has more than one observation for condition '{condition}'")]
    DuplicateObservation { subject: String, condition: String },

    #[error("subject '{subject}' has no observation for condition '{condition}'")]
    IncompletePair { subject: String, condition: String },

    #[error("signed-rank test undefined: {0}")]
    DegenerateTest(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to render plot: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

use std::path::PathBuf;

use thiserror::Error;

/// Rejected parameter or variable sets. Raised before any iteration runs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("having {0} parameters is not supported, expected 1 or 2")]
    UnsupportedArity(usize),
    #[error("at least one state variable must be declared")]
    NoVariables,
    #[error("name `{0}` is declared more than once")]
    DuplicateName(String),
    #[error("`{name}` has shape {actual:?} but the parameter grid is {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("parameter `{0}` has no values")]
    EmptyParameter(String),
    #[error("map requires parameter `{0}`")]
    MissingParameter(String),
    #[error("map expects {expected} state variables, got {actual}")]
    VariableCount { expected: usize, actual: usize },
}

/// Failure of a map's transition function. A failed run yields no history.
#[derive(Debug, Error, PartialEq)]
pub enum IterationError {
    #[error("iteration variable `{name}` can't be empty")]
    MissingVariable { name: String },
    #[error("parameter `{name}` is not configured")]
    MissingParameter { name: String },
    #[error("map returned {actual} values for {expected} state variables")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("map returned a {actual:?} array for a {expected:?} grid")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Iteration(#[from] IterationError),
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
}

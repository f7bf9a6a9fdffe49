//! Error types shared across the command layer.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the dispatcher and session layer.
pub type Result<T, E = CommandError> = std::result::Result<T, E>;

/// A host buffer did not have the element type or shape a command needs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("{what} must be of {expected} type, got {got}")]
    InvalidClass {
        what: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    #[error("{what} must have 2 or 3 dimensions, got {got}")]
    InvalidDims { what: &'static str, got: usize },

    #[error("{what} must be of size {expected}, got {got}")]
    InvalidShape {
        what: &'static str,
        expected: String,
        got: String,
    },

    #[error("buffer holds {got} elements but its dimensions need {expected}")]
    DataLength { expected: usize, got: usize },
}

/// Failure reported by the tracker engine or its preprocessing pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("exception of type {category}: {message}")]
pub struct EngineError {
    pub category: String,
    pub message: String,
}

impl EngineError {
    /// Engine failure of the given exception category.
    pub fn new<C: Into<String>, M: Into<String>>(category: C, message: M) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
        }
    }
}

/// The interactive region selector could not produce a region.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("object to be tracked could not be obtained: {0}")]
pub struct AcquisitionError(pub String);

/// Loading or validating a session configuration failed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    /// Reject `field` with `reason`.
    pub fn invalid_value<R: Into<String>>(field: &'static str, reason: R) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Everything a host call can fail with.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("tracker index {index} is invalid: {}", valid_range(.count))]
    Index { index: usize, count: usize },

    #[error("{0}")]
    Argument(String),

    #[error("invalid command provided: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("tracker must be initialized before it can be {action}")]
    NotInitialized { action: &'static str },

    #[error("a tracker must be created before it can be initialized")]
    NoSession,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CommandError {
    /// Argument count or value error with a free-form message.
    pub fn argument<S: Into<String>>(msg: S) -> Self {
        Self::Argument(msg.into())
    }
}

fn valid_range(count: &usize) -> String {
    match *count {
        0 => "no trackers have been created".to_string(),
        1 => "the only valid index is 0".to_string(),
        n => format!("valid indices are 0..={}", n - 1),
    }
}

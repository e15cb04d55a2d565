//! Error types for the ads analytics library.

use std::path::PathBuf;

use adclick_helpers::ScalerError;
use logistic_regression::LogisticError;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Everything that can stop the dashboard from loading or predicting.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset is not well-formed CSV
    #[error("malformed CSV in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// The dataset header lacks a required column
    #[error("{source_name} is missing required column `{column}`")]
    MissingColumn {
        source_name: String,
        column: &'static str,
    },

    /// A cell could not be interpreted
    #[error("{source_name}, line {line}: invalid value `{value}` in column `{column}`")]
    InvalidValue {
        source_name: String,
        line: u64,
        column: &'static str,
        value: String,
    },

    /// The dataset has a header but no rows
    #[error("{source_name} contains no data rows")]
    EmptyDataset { source_name: String },

    /// The configuration file is not valid TOML for [`crate::Config`]
    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be rendered as TOML
    #[error("failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The model artifact could not be parsed or written
    #[error("invalid model artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The model artifact parsed but does not describe a usable model
    #[error("unusable model artifact {path}: {message}")]
    InvalidArtifact { path: PathBuf, message: String },

    /// Training options are out of range
    #[error("invalid training options: {message}")]
    Training { message: String },

    /// Feature scaling failed
    #[error("feature scaling failed: {0}")]
    Scaling(#[from] ScalerError),

    /// The classifier rejected its input
    #[error("classifier error: {0}")]
    Classifier(#[from] LogisticError),
}

impl DashboardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }
}

//! Error types for sweepctl
//!
//! One error enum covering every failure mode across the pipeline.
//! Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sweepctl operations
pub type Result<T> = std::result::Result<T, SweepCtlError>;

/// Error type for sweepctl operations
#[derive(Error, Debug)]
pub enum SweepCtlError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required external tool is absent
    #[error("Required tool not found in PATH: {0}")]
    ToolMissing(String),

    /// A required input file is absent
    #[error("File not found: {}", .0.display())]
    FileMissing(PathBuf),

    /// A required field is absent from the sweep definition
    #[error("Missing required field '{field}' in {}", .path.display())]
    MissingField { field: String, path: PathBuf },

    /// kubectl invocation errors
    #[error("Cluster error: {0}")]
    Cluster(String),

    /// wandb wrapper errors (including unrecoverable sweep ids)
    #[error("W&B error: {0}")]
    Wandb(#[from] wandb::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

//! Error types for simulation runs.

use std::path::PathBuf;

use pf_core::PfError;
use pf_mesh::MeshError;
use pf_solver::SolverError;
use thiserror::Error;

/// Errors encountered while configuring or running a scenario.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid configuration: {what}")]
    Config { what: String },

    #[error("Failed to read configuration {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write output {path}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Console write failed: {0}")]
    Console(#[from] std::io::Error),

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Numeric error: {0}")]
    Core(#[from] PfError),
}

pub type SimResult<T> = Result<T, SimError>;

//! Error types for solver operations.

use std::path::PathBuf;

use pf_core::PfError;
use pf_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur while solving, convecting or shedding.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Influence matrix is singular (smallest/largest pivot = {pivot_ratio:e})")]
    Singular { pivot_ratio: f64 },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Wake error: {what}")]
    Wake { what: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Numeric error: {0}")]
    Core(#[from] PfError),
}

pub type SolverResult<T> = Result<T, SolverError>;

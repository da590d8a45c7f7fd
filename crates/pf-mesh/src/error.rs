//! Mesh-specific error types.

use std::path::PathBuf;

use pf_core::PfError;
use thiserror::Error;

/// Surface construction and mesh-file errors.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to read mesh file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("PLOT3D parse error: {what}")]
    Parse { what: String },

    #[error("Unsupported grid: {what}")]
    Unsupported { what: String },

    #[error("Panel {panel} refers to non-existent node {node}")]
    InvalidNodeRef { panel: usize, node: usize },

    #[error("Panel {panel} has {count} distinct corners (expected 3 or 4)")]
    InvalidCornerCount { panel: usize, count: usize },

    #[error("Trailing edge strip {strip} is inconsistent: {what}")]
    InvalidTrailingEdge { strip: usize, what: &'static str },

    #[error("Surface has no panels")]
    Empty,

    #[error(transparent)]
    Core(#[from] PfError),
}

pub type MeshResult<T> = Result<T, MeshError>;

//! Unsteady source/doublet panel solver for lifting surfaces.
//!
//! This crate provides the flow collaborators driven by the time-stepping
//! layer: constant-strength source and doublet influence kernels, a free
//! wake sheet shed from trailing edges, and a per-step solver that enforces
//! the Dirichlet boundary condition with a Kutta condition at every
//! trailing-edge segment, then recovers surface velocity, pressure
//! coefficients and body force coefficients.

pub mod error;
pub mod influence;
pub mod logger;
pub mod solver;
pub mod wake;

pub use error::{SolverError, SolverResult};
pub use influence::InfluenceOptions;
pub use logger::{NullLogger, SolverLogger, SurfaceFields, VtkWriter};
pub use solver::{Solver, SolverOptions};
pub use wake::{Wake, WakeOptions, WakePanel};

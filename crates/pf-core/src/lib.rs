//! pf-core: stable foundation for panelflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - geometry (Vec3 + rigid rotation helpers)
//! - error (shared error types)

pub mod error;
pub mod geometry;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PfError, PfResult};
pub use geometry::*;
pub use numeric::*;
pub use units::*;

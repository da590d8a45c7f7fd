//! pf-mesh: panel surface layer for panelflow.
//!
//! Provides:
//! - Panel surface data structures (nodes, panels, trailing-edge strips)
//! - Incremental surface builder with validation and outward orientation
//! - Rigid body motion (rotation about the origin, translation) and kinematic velocity
//! - PLOT3D structured-grid reader
//!
//! # Example
//!
//! ```
//! use pf_core::Vec3;
//! use pf_mesh::SurfaceBuilder;
//!
//! let mut builder = SurfaceBuilder::new();
//! let a = builder.add_node(Vec3::new(0.0, 0.0, 0.0));
//! let b = builder.add_node(Vec3::new(1.0, 0.0, 0.0));
//! let c = builder.add_node(Vec3::new(1.0, 1.0, 0.0));
//! let d = builder.add_node(Vec3::new(0.0, 1.0, 0.0));
//! builder.add_panel(&[a, b, c, d]);
//! let surface = builder.build().unwrap();
//!
//! assert_eq!(surface.n_panels(), 1);
//! assert!((surface.panel(0).area - 1.0).abs() < 1e-12);
//! ```

pub mod builder;
pub mod error;
pub mod panel;
pub mod plot3d;
pub mod surface;

// Re-exports for ergonomics
pub use builder::SurfaceBuilder;
pub use error::{MeshError, MeshResult};
pub use panel::PanelGeometry;
pub use plot3d::{parse_plot3d, read_plot3d};
pub use surface::{Surface, TrailingEdgeStrip};

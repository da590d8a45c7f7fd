//! Panel surface: geometry, adjacency, trailing edges and rigid-body kinematics.

use pf_core::{Real, Vec3, deg_to_rad, rotation_matrix, RPM_TO_RAD_PER_S};

use crate::panel::PanelGeometry;

/// A run of consecutive trailing-edge nodes shedding one wake strip.
///
/// Edge `k` joins `nodes[k]` and `nodes[k + 1]`; the panels on either side of
/// that edge are `upper[k]` and `lower[k]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailingEdgeStrip {
    pub nodes: Vec<usize>,
    pub upper: Vec<usize>,
    pub lower: Vec<usize>,
}

impl TrailingEdgeStrip {
    /// Number of trailing-edge segments in the strip.
    pub fn n_edges(&self) -> usize {
        self.upper.len()
    }
}

/// A validated panel surface.
///
/// The surface stores:
/// - Node positions and per-panel node lists (3 or 4 distinct nodes, outward ordering).
/// - Derived panel geometry, recomputed after every rigid motion.
/// - Compact adjacency: panels sharing at least one node.
/// - Body velocities used for the kinematic boundary condition.
#[derive(Debug, Clone)]
pub struct Surface {
    pub(crate) nodes: Vec<Vec3>,
    pub(crate) panel_nodes: Vec<Vec<usize>>,
    pub(crate) geometry: Vec<PanelGeometry>,

    /// Offsets for panel->neighbor adjacency: panel i's neighbors are in
    /// neighbors[neighbor_offsets[i]..neighbor_offsets[i+1]].
    pub(crate) neighbor_offsets: Vec<usize>,
    pub(crate) neighbors: Vec<usize>,

    pub(crate) trailing_edges: Vec<TrailingEdgeStrip>,

    /// Angular velocity about the origin (rad/s).
    pub(crate) angular_velocity: Vec3,
    /// Linear velocity (m/s).
    pub(crate) linear_velocity: Vec3,
}

impl Surface {
    pub fn n_panels(&self) -> usize {
        self.geometry.len()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Vec3] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Vec3 {
        &self.nodes[index]
    }

    pub fn panels(&self) -> &[PanelGeometry] {
        &self.geometry
    }

    pub fn panel(&self, index: usize) -> &PanelGeometry {
        &self.geometry[index]
    }

    pub fn panel_nodes(&self, index: usize) -> &[usize] {
        &self.panel_nodes[index]
    }

    /// Collocation point of a panel.
    pub fn collocation_point(&self, index: usize) -> &Vec3 {
        &self.geometry[index].center
    }

    /// Panels sharing at least one node with `index`, sorted ascending.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        let start = self.neighbor_offsets[index];
        let end = self.neighbor_offsets[index + 1];
        &self.neighbors[start..end]
    }

    pub fn trailing_edges(&self) -> &[TrailingEdgeStrip] {
        &self.trailing_edges
    }

    /// Whether any trailing edge exists, i.e. the surface sheds a wake.
    pub fn is_lifting(&self) -> bool {
        !self.trailing_edges.is_empty()
    }

    pub fn wetted_area(&self) -> Real {
        self.geometry.iter().map(|g| g.area).sum()
    }

    /// Enclosed volume by the divergence theorem; positive for outward normals.
    pub fn signed_volume(&self) -> Real {
        self.geometry
            .iter()
            .map(|g| g.area * g.center.dot(&g.normal))
            .sum::<Real>()
            / 3.0
    }

    pub fn angular_velocity(&self) -> &Vec3 {
        &self.angular_velocity
    }

    pub fn linear_velocity(&self) -> &Vec3 {
        &self.linear_velocity
    }

    /// Set the body angular velocity; `radians = false` means the input is in rpm.
    pub fn set_angular_velocity(&mut self, omega: Vec3, radians: bool) {
        self.angular_velocity = if radians {
            omega
        } else {
            omega * RPM_TO_RAD_PER_S
        };
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }

    /// Rotate every node about the origin (x, then y, then z).
    ///
    /// `radians = false` means the angles are in degrees.
    pub fn rotate(&mut self, angles: &Vec3, radians: bool) {
        let angles = if radians { *angles } else { deg_to_rad(angles) };
        if angles.iter().all(|a| *a == 0.0) {
            return;
        }
        let r = rotation_matrix(&angles);
        for node in &mut self.nodes {
            *node = r * *node;
        }
        self.refresh_geometry();
    }

    pub fn translate(&mut self, displacement: &Vec3) {
        if displacement.iter().all(|d| *d == 0.0) {
            return;
        }
        for node in &mut self.nodes {
            *node += displacement;
        }
        self.refresh_geometry();
    }

    /// Velocity of the body surface at a point.
    pub fn body_velocity(&self, point: &Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(point)
    }

    /// Free stream seen by the body at a point: `V∞ − (v + Ω × r)`.
    pub fn kinematic_velocity(&self, free_stream: &Vec3, point: &Vec3) -> Vec3 {
        free_stream - self.body_velocity(point)
    }

    pub(crate) fn refresh_geometry(&mut self) {
        for (g, nodes) in self.geometry.iter_mut().zip(&self.panel_nodes) {
            let corners: Vec<Vec3> = nodes.iter().map(|&n| self.nodes[n]).collect();
            // Rigid motion preserves area, so this cannot degenerate.
            if let Some(updated) = PanelGeometry::from_corners(&corners) {
                *g = updated;
            }
        }
    }
}

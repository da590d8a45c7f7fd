//! Incremental surface builder.

use pf_core::{Real, Vec3};
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::panel::PanelGeometry;
use crate::surface::{Surface, TrailingEdgeStrip};

/// Builder for constructing a surface incrementally.
///
/// Use `add_node`, `add_panel` and `add_trailing_edge` to build up the surface,
/// then call `build()` to validate it, orient it outward and freeze it.
#[derive(Debug, Default)]
pub struct SurfaceBuilder {
    nodes: Vec<Vec3>,
    panels: Vec<Vec<usize>>,
    trailing_edges: Vec<TrailingEdgeStrip>,
}

impl SurfaceBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, position: Vec3) -> usize {
        self.nodes.push(position);
        self.nodes.len() - 1
    }

    /// Add a panel from 3 or 4 node indices and return its index.
    ///
    /// Consecutive coincident corners are collapsed in `build()`.
    pub fn add_panel(&mut self, nodes: &[usize]) -> usize {
        self.panels.push(nodes.to_vec());
        self.panels.len() - 1
    }

    /// Register a trailing-edge strip (node run plus the panel pair on each edge).
    pub fn add_trailing_edge(&mut self, strip: TrailingEdgeStrip) {
        self.trailing_edges.push(strip);
    }

    pub fn n_panels(&self) -> usize {
        self.panels.len()
    }

    /// Validate and freeze the surface.
    pub fn build(self) -> MeshResult<Surface> {
        if self.panels.is_empty() {
            return Err(MeshError::Empty);
        }

        let scale = bounding_diagonal(&self.nodes);
        let merge_tol = 1e-10 * scale.max(Real::MIN_POSITIVE);

        let mut panel_nodes = Vec::with_capacity(self.panels.len());
        let mut geometry = Vec::with_capacity(self.panels.len());
        for (p, nodes) in self.panels.iter().enumerate() {
            if let Some(&node) = nodes.iter().find(|&&n| n >= self.nodes.len()) {
                return Err(MeshError::InvalidNodeRef { panel: p, node });
            }
            let distinct = distinct_corners(nodes, &self.nodes, merge_tol);
            if !(3..=4).contains(&distinct.len()) {
                return Err(MeshError::InvalidCornerCount {
                    panel: p,
                    count: distinct.len(),
                });
            }
            let corners: Vec<Vec3> = distinct.iter().map(|&n| self.nodes[n]).collect();
            let g = PanelGeometry::from_corners(&corners).ok_or(MeshError::InvalidCornerCount {
                panel: p,
                count: distinct.len(),
            })?;
            panel_nodes.push(distinct);
            geometry.push(g);
        }

        for (s, strip) in self.trailing_edges.iter().enumerate() {
            validate_strip(s, strip, self.nodes.len(), panel_nodes.len())?;
        }

        let (neighbor_offsets, neighbors) = build_adjacency(&panel_nodes, self.nodes.len());

        let mut surface = Surface {
            nodes: self.nodes,
            panel_nodes,
            geometry,
            neighbor_offsets,
            neighbors,
            trailing_edges: self.trailing_edges,
            angular_velocity: Vec3::zeros(),
            linear_velocity: Vec3::zeros(),
        };

        if surface.signed_volume() < 0.0 {
            debug!("reversing panel ordering to orient normals outward");
            for nodes in &mut surface.panel_nodes {
                nodes.reverse();
            }
            surface.refresh_geometry();
        }

        Ok(surface)
    }
}

/// Drop consecutive (cyclic) corners closer than `tol` to the previously kept one.
pub fn distinct_corners(nodes: &[usize], positions: &[Vec3], tol: Real) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(nodes.len());
    for &n in nodes {
        let duplicate = kept
            .iter()
            .any(|&k| (positions[k] - positions[n]).norm() <= tol);
        if !duplicate {
            kept.push(n);
        }
    }
    kept
}

pub(crate) fn bounding_diagonal(points: &[Vec3]) -> Real {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let (lo, hi) = points
        .iter()
        .fold((*first, *first), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
    (hi - lo).norm()
}

fn validate_strip(
    s: usize,
    strip: &TrailingEdgeStrip,
    n_nodes: usize,
    n_panels: usize,
) -> MeshResult<()> {
    if strip.nodes.len() < 2 {
        return Err(MeshError::InvalidTrailingEdge {
            strip: s,
            what: "fewer than two nodes",
        });
    }
    if strip.upper.len() != strip.nodes.len() - 1 || strip.lower.len() != strip.upper.len() {
        return Err(MeshError::InvalidTrailingEdge {
            strip: s,
            what: "panel pairs do not match edge count",
        });
    }
    if strip.nodes.iter().any(|&n| n >= n_nodes) {
        return Err(MeshError::InvalidTrailingEdge {
            strip: s,
            what: "node index out of range",
        });
    }
    if strip
        .upper
        .iter()
        .chain(&strip.lower)
        .any(|&p| p >= n_panels)
    {
        return Err(MeshError::InvalidTrailingEdge {
            strip: s,
            what: "panel index out of range",
        });
    }
    Ok(())
}

fn build_adjacency(panel_nodes: &[Vec<usize>], n_nodes: usize) -> (Vec<usize>, Vec<usize>) {
    let mut node_panels: Vec<Vec<usize>> = vec![Vec::new(); n_nodes];
    for (p, nodes) in panel_nodes.iter().enumerate() {
        for &n in nodes {
            node_panels[n].push(p);
        }
    }

    let mut offsets = Vec::with_capacity(panel_nodes.len() + 1);
    let mut flat = Vec::new();
    offsets.push(0);
    for (p, nodes) in panel_nodes.iter().enumerate() {
        let mut adjacent: Vec<usize> = nodes
            .iter()
            .flat_map(|&n| node_panels[n].iter().copied())
            .filter(|&q| q != p)
            .collect();
        adjacent.sort_unstable();
        adjacent.dedup();
        flat.extend(adjacent);
        offsets.push(flat.len());
    }
    (offsets, flat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> SurfaceBuilder {
        let mut b = SurfaceBuilder::new();
        let mut idx = [[[0usize; 2]; 2]; 2];
        for (i, x) in [0.0, 1.0].iter().enumerate() {
            for (j, y) in [0.0, 1.0].iter().enumerate() {
                for (k, z) in [0.0, 1.0].iter().enumerate() {
                    idx[i][j][k] = b.add_node(Vec3::new(*x, *y, *z));
                }
            }
        }
        // Deliberately inward ordering on every face.
        b.add_panel(&[idx[0][0][0], idx[1][0][0], idx[1][1][0], idx[0][1][0]]);
        b.add_panel(&[idx[0][0][1], idx[0][1][1], idx[1][1][1], idx[1][0][1]]);
        b.add_panel(&[idx[0][0][0], idx[0][0][1], idx[1][0][1], idx[1][0][0]]);
        b.add_panel(&[idx[0][1][0], idx[1][1][0], idx[1][1][1], idx[0][1][1]]);
        b.add_panel(&[idx[0][0][0], idx[0][1][0], idx[0][1][1], idx[0][0][1]]);
        b.add_panel(&[idx[1][0][0], idx[1][0][1], idx[1][1][1], idx[1][1][0]]);
        b
    }

    #[test]
    fn cube_is_oriented_outward() {
        let s = unit_cube().build().unwrap();
        assert!((s.signed_volume() - 1.0).abs() < 1e-12);
        let bottom = s.panel(0);
        assert!((bottom.normal - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
        for g in s.panels() {
            assert!(g.normal.dot(&(g.center - Vec3::new(0.5, 0.5, 0.5))) > 0.0);
        }
    }

    #[test]
    fn cube_faces_touch_four_neighbors() {
        let s = unit_cube().build().unwrap();
        for p in 0..s.n_panels() {
            assert_eq!(s.neighbors(p).len(), 4);
        }
    }

    #[test]
    fn degenerate_quad_collapses_to_triangle() {
        let mut b = SurfaceBuilder::new();
        let a = b.add_node(Vec3::new(0.0, 0.0, 0.0));
        let c = b.add_node(Vec3::new(1.0, 0.0, 0.0));
        let d = b.add_node(Vec3::new(1.0, 0.0, 0.0));
        let e = b.add_node(Vec3::new(0.0, 1.0, 0.0));
        b.add_panel(&[a, c, d, e]);
        let s = b.build().unwrap();
        assert_eq!(s.panel_nodes(0).len(), 3);
        assert!((s.panel(0).area - 0.5).abs() < 1e-12);
    }

    #[test]
    fn invalid_node_reference_fails() {
        let mut b = SurfaceBuilder::new();
        let a = b.add_node(Vec3::zeros());
        b.add_panel(&[a, 7, 8]);
        assert!(matches!(
            b.build(),
            Err(MeshError::InvalidNodeRef { panel: 0, node: 7 })
        ));
    }

    #[test]
    fn empty_surface_fails() {
        assert!(matches!(SurfaceBuilder::new().build(), Err(MeshError::Empty)));
    }

    #[test]
    fn mismatched_trailing_edge_fails() {
        let mut b = unit_cube();
        b.add_trailing_edge(TrailingEdgeStrip {
            nodes: vec![0, 1],
            upper: vec![0, 1],
            lower: vec![2],
        });
        assert!(matches!(
            b.build(),
            Err(MeshError::InvalidTrailingEdge { strip: 0, .. })
        ));
    }
}

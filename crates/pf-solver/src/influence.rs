//! Constant-strength source and doublet panel influence kernels.
//!
//! Conventions, for a panel with unit normal `n` and corners ordered
//! counter-clockwise about `n`:
//!
//! ```text
//! source  potential per unit σ:  S(P) = -1/(4π) ∫ 1/r dS
//! doublet potential per unit μ:  D(P) =  1/(4π) ∫ ∂/∂n (1/r) dS
//! ```
//!
//! so the potential jumps by `μ` from the inner to the outer side of a doublet
//! panel and the normal velocity jumps by `σ` across a source panel. A doublet
//! panel is equivalent to a vortex ring of circulation `-μ` around its corners.
//!
//! Beyond `farfield_factor` panel diameters the point source / point doublet
//! approximations are used.

use std::f64::consts::PI;

use pf_core::{Real, Vec3};
use pf_mesh::PanelGeometry;

const FOUR_PI: Real = 4.0 * PI;

/// Tuning shared by every kernel evaluation.
#[derive(Clone, Copy, Debug)]
pub struct InfluenceOptions {
    /// Distance, in panel diameters, beyond which far-field expansions are used.
    pub farfield_factor: Real,
    /// Vortex core radius for Biot–Savart segments; `None` uses a hard cutoff.
    pub core_radius: Option<Real>,
}

impl Default for InfluenceOptions {
    fn default() -> Self {
        Self {
            farfield_factor: 10.0,
            core_radius: None,
        }
    }
}

impl InfluenceOptions {
    fn is_far(&self, panel: &PanelGeometry, p: &Vec3) -> bool {
        (p - panel.center).norm() > self.farfield_factor * panel.diameter
    }
}

/// Signed solid angle of a planar polygon seen from `p` (Van Oosterom–Strackee).
///
/// Negative when `p` lies on the side the normal points to.
pub fn solid_angle(corners: &[Vec3], p: &Vec3) -> Real {
    let a = corners[0] - p;
    let na = a.norm();
    let mut omega = 0.0;
    for k in 1..corners.len() - 1 {
        let b = corners[k] - p;
        let c = corners[k + 1] - p;
        let (nb, nc) = (b.norm(), c.norm());
        let num = a.dot(&b.cross(&c));
        let den = na * nb * nc + a.dot(&b) * nc + a.dot(&c) * nb + b.dot(&c) * na;
        omega += 2.0 * num.atan2(den);
    }
    omega
}

/// Edge data shared by the source potential and velocity formulas.
struct EdgeTerms {
    /// Outward in-plane edge normal.
    outward: Vec3,
    /// Signed in-plane distance from the projected point, positive inside.
    inside_distance: Real,
    /// `ln((r1 + r2 + d) / (r1 + r2 - d))`.
    log_term: Real,
}

fn edge_terms<'a>(panel: &'a PanelGeometry, p: &Vec3) -> impl Iterator<Item = EdgeTerms> + 'a {
    let n = panel.normal;
    let projected = p - n * (p - panel.center).dot(&n);
    let corners = &panel.corners;
    let count = corners.len();
    let p = *p;
    (0..count).filter_map(move |k| {
        let a = corners[k];
        let b = corners[(k + 1) % count];
        let edge = b - a;
        let d = edge.norm();
        if d == 0.0 {
            return None;
        }
        let e = edge / d;
        let r1 = (p - a).norm();
        let r2 = (p - b).norm();
        let den = r1 + r2 - d;
        let log_term = if den > 1e-14 * (r1 + r2 + d) {
            ((r1 + r2 + d) / den).ln()
        } else {
            0.0
        };
        Some(EdgeTerms {
            outward: e.cross(&n),
            inside_distance: (projected - a).dot(&n.cross(&e)),
            log_term,
        })
    })
}

/// Source potential at `p` induced by a unit-strength source panel.
pub fn source_potential(panel: &PanelGeometry, p: &Vec3, opts: &InfluenceOptions) -> Real {
    if opts.is_far(panel, p) {
        return -panel.area / (FOUR_PI * (p - panel.center).norm());
    }
    let z = (p - panel.center).dot(&panel.normal);
    let edges: Real = edge_terms(panel, p)
        .map(|t| t.inside_distance * t.log_term)
        .sum();
    let integral = edges + z * solid_angle(&panel.corners, p);
    -integral / FOUR_PI
}

/// Doublet potential at `p` induced by a unit-strength doublet panel.
pub fn doublet_potential(panel: &PanelGeometry, p: &Vec3, opts: &InfluenceOptions) -> Real {
    let r = p - panel.center;
    if opts.is_far(panel, p) {
        let d = r.norm();
        return panel.area * r.dot(&panel.normal) / (FOUR_PI * d * d * d);
    }
    -solid_angle(&panel.corners, p) / FOUR_PI
}

/// Velocity at `p` induced by a unit-strength source panel.
pub fn source_velocity(panel: &PanelGeometry, p: &Vec3, opts: &InfluenceOptions) -> Vec3 {
    let r = p - panel.center;
    if opts.is_far(panel, p) {
        let d = r.norm();
        return r * (panel.area / (FOUR_PI * d * d * d));
    }
    let in_plane: Vec3 = edge_terms(panel, p)
        .map(|t| t.outward * t.log_term)
        .sum();
    (in_plane - panel.normal * solid_angle(&panel.corners, p)) / FOUR_PI
}

/// Velocity at `p` induced by a unit-strength doublet panel.
pub fn doublet_velocity(panel: &PanelGeometry, p: &Vec3, opts: &InfluenceOptions) -> Vec3 {
    let r = p - panel.center;
    if opts.is_far(panel, p) {
        let d = r.norm();
        let d3 = d * d * d;
        let n = panel.normal;
        return (n / d3 - r * (3.0 * r.dot(&n) / (d3 * d * d))) * (panel.area / FOUR_PI);
    }
    vortex_ring_velocity(&panel.corners, -1.0, p, opts.core_radius)
}

/// Velocity at `p` induced by a closed polygonal vortex ring of circulation `gamma`.
pub fn vortex_ring_velocity(
    corners: &[Vec3],
    gamma: Real,
    p: &Vec3,
    core_radius: Option<Real>,
) -> Vec3 {
    let count = corners.len();
    (0..count)
        .map(|k| vortex_segment_velocity(&corners[k], &corners[(k + 1) % count], gamma, p, core_radius))
        .sum()
}

/// Biot–Savart velocity of a straight vortex segment from `a` to `b`.
pub fn vortex_segment_velocity(
    a: &Vec3,
    b: &Vec3,
    gamma: Real,
    p: &Vec3,
    core_radius: Option<Real>,
) -> Vec3 {
    let r0 = b - a;
    let r1 = p - a;
    let r2 = p - b;
    let (n1, n2) = (r1.norm(), r2.norm());
    let cross = r1.cross(&r2);
    let mut denom = cross.norm_squared();
    let len2 = r0.norm_squared();
    match core_radius {
        Some(delta) => denom += delta * delta * len2,
        None => {
            if n1 < 1e-12 || n2 < 1e-12 || denom < 1e-12 * len2.max(1e-300) {
                return Vec3::zeros();
            }
        }
    }
    if denom == 0.0 || n1 == 0.0 || n2 == 0.0 {
        return Vec3::zeros();
    }
    let k = gamma / (FOUR_PI * denom) * r0.dot(&(r1 / n1 - r2 / n2));
    cross * k
}

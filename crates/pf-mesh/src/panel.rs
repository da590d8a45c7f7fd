//! Per-panel geometry derived from corner positions.

use pf_core::{Real, Vec3};

/// Geometry of one flat panel.
///
/// Corners are projected onto the mean plane through the centroid, so a
/// slightly warped quadrilateral is treated as planar by the influence kernels.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelGeometry {
    /// Collocation point (corner centroid).
    pub center: Vec3,
    /// Unit normal; outward once the surface has been oriented.
    pub normal: Vec3,
    /// First in-plane unit tangent.
    pub l: Vec3,
    /// Second in-plane unit tangent, `normal × l`.
    pub m: Vec3,
    pub area: Real,
    /// Corners projected onto the panel plane, in node order.
    pub corners: Vec<Vec3>,
    /// Largest corner-to-corner distance.
    pub diameter: Real,
}

impl PanelGeometry {
    /// Build panel geometry from 3 or 4 corners; `None` for a zero-area panel.
    pub fn from_corners(corners: &[Vec3]) -> Option<Self> {
        let raw = match corners.len() {
            3 => (corners[1] - corners[0]).cross(&(corners[2] - corners[0])),
            4 => (corners[2] - corners[0]).cross(&(corners[3] - corners[1])),
            _ => return None,
        };
        let twice_area = raw.norm();
        if twice_area <= Real::EPSILON * max_extent(corners).powi(2) {
            return None;
        }
        let normal = raw / twice_area;
        let area = 0.5 * twice_area;

        let center = corners.iter().sum::<Vec3>() / corners.len() as Real;
        let projected: Vec<Vec3> = corners
            .iter()
            .map(|p| p - normal * (p - center).dot(&normal))
            .collect();

        let l = (projected[1] - projected[0]).normalize();
        let m = normal.cross(&l);

        Some(Self {
            center,
            normal,
            l,
            m,
            area,
            diameter: max_extent(&projected),
            corners: projected,
        })
    }

    /// Express a global point in the panel frame `(l, m, n)` with origin at the centroid.
    pub fn to_local(&self, p: &Vec3) -> Vec3 {
        let d = p - self.center;
        Vec3::new(d.dot(&self.l), d.dot(&self.m), d.dot(&self.normal))
    }

    /// Express a panel-frame vector in global coordinates.
    pub fn to_global_vector(&self, v: &Vec3) -> Vec3 {
        self.l * v.x + self.m * v.y + self.normal * v.z
    }
}

fn max_extent(points: &[Vec3]) -> Real {
    let mut d: Real = 0.0;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            d = d.max((a - b).norm());
        }
    }
    d
}

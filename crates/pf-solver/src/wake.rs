//! Trailing wake sheet: initialization, convection and shedding.
//!
//! Each trailing-edge strip owns rows of wake nodes. Row 0 sits on the
//! trailing edge; panel `(r, k)` joins rows `r` and `r + 1` across edge `k`.
//! Panel row 0 carries the Kutta strength `μ_upper − μ_lower` solved at the
//! current step, older rows keep the strengths they were shed with.

use pf_core::{Real, Tolerances, Vec3, ensure_finite_vec, nearly_equal, unit_or_none};
use pf_mesh::{PanelGeometry, Surface};
use tracing::debug;

use crate::error::{SolverError, SolverResult};

/// Wake model switches resolved from the run configuration.
#[derive(Clone, Copy, Debug)]
pub struct WakeOptions {
    /// Fraction of the convected distance kept by the row right behind the trailing edge.
    pub shed_factor: Real,
    /// Freeze the wake as a single panel row of `static_length`.
    pub static_wake: bool,
    pub static_length: Real,
}

impl Default for WakeOptions {
    fn default() -> Self {
        Self {
            shed_factor: 0.25,
            static_wake: false,
            static_length: 1.0,
        }
    }
}

/// One wake panel, flattened for influence evaluation and export.
#[derive(Clone, Debug)]
pub struct WakePanel {
    pub strip: usize,
    pub row: usize,
    pub edge: usize,
    /// Corners in `normal`-consistent order.
    pub corners: [Vec3; 4],
    pub strength: Real,
    /// Body panels `(upper, lower)` whose Kutta difference sets this strength (row 0 only).
    pub kutta_pair: Option<(usize, usize)>,
}

impl WakePanel {
    pub fn geometry(&self) -> Option<PanelGeometry> {
        PanelGeometry::from_corners(&self.corners)
    }
}

#[derive(Clone, Debug)]
struct WakeStrip {
    te_nodes: Vec<usize>,
    upper: Vec<usize>,
    lower: Vec<usize>,
    rows: Vec<Vec<Vec3>>,
    strengths: Vec<Vec<Real>>,
}

impl WakeStrip {
    fn n_edges(&self) -> usize {
        self.upper.len()
    }

    fn trailing_edge(&self, surface: &Surface) -> Vec<Vec3> {
        self.te_nodes.iter().map(|&n| *surface.node(n)).collect()
    }

    fn corners(&self, row: usize, edge: usize) -> [Vec3; 4] {
        [
            self.rows[row][edge],
            self.rows[row][edge + 1],
            self.rows[row + 1][edge + 1],
            self.rows[row + 1][edge],
        ]
    }
}

/// Wake sheet attached to the trailing edges of one lifting surface.
#[derive(Clone, Debug)]
pub struct Wake {
    options: WakeOptions,
    strips: Vec<WakeStrip>,
    /// Free stream and time step fixed at initialization.
    shedding: Option<(Vec3, Real)>,
}

impl Wake {
    pub fn new(options: WakeOptions) -> Self {
        Self {
            options,
            strips: Vec::new(),
            shedding: None,
        }
    }

    pub fn options(&self) -> &WakeOptions {
        &self.options
    }

    /// Register every trailing-edge strip of `surface`.
    pub fn add_lifting_surface(&mut self, surface: &Surface) {
        for te in surface.trailing_edges() {
            self.strips.push(WakeStrip {
                te_nodes: te.nodes.clone(),
                upper: te.upper.clone(),
                lower: te.lower.clone(),
                rows: Vec::new(),
                strengths: Vec::new(),
            });
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.shedding.is_some()
    }

    pub fn is_static(&self) -> bool {
        self.options.static_wake
    }

    pub fn n_strips(&self) -> usize {
        self.strips.len()
    }

    /// Number of node rows per strip (0 before initialization).
    pub fn n_rows(&self) -> usize {
        self.strips.first().map_or(0, |s| s.rows.len())
    }

    pub fn n_panels(&self) -> usize {
        self.strips
            .iter()
            .map(|s| s.strengths.len() * s.n_edges())
            .sum()
    }

    /// Create the first panel row behind every trailing edge.
    pub fn initialize(&mut self, surface: &Surface, free_stream: &Vec3, dt: Real) -> SolverResult<()> {
        ensure_finite_vec(free_stream, "free stream velocity")?;
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SolverError::Wake {
                what: format!("time step must be positive, got {dt}"),
            });
        }

        let offset = if self.options.static_wake {
            let direction = unit_or_none(free_stream, 0.0).ok_or_else(|| SolverError::Wake {
                what: "static wake needs a non-zero free stream direction".to_string(),
            })?;
            direction * self.options.static_length
        } else {
            free_stream * (self.options.shed_factor * dt)
        };

        for strip in &mut self.strips {
            let te = strip.trailing_edge(surface);
            let behind: Vec<Vec3> = te.iter().map(|p| p + offset).collect();
            strip.rows = vec![te, behind];
            strip.strengths = vec![vec![0.0; strip.n_edges()]];
            orient_kutta_pairs(strip, surface);
        }

        self.shedding = Some((*free_stream, dt));
        debug!(strips = self.strips.len(), panels = self.n_panels(), "wake initialized");
        Ok(())
    }

    /// Every wake panel, strip by strip, row by row.
    pub fn panels(&self) -> Vec<WakePanel> {
        let mut out = Vec::with_capacity(self.n_panels());
        for (s, strip) in self.strips.iter().enumerate() {
            for (r, row) in strip.strengths.iter().enumerate() {
                for (k, &strength) in row.iter().enumerate() {
                    out.push(WakePanel {
                        strip: s,
                        row: r,
                        edge: k,
                        corners: strip.corners(r, k),
                        strength,
                        kutta_pair: (r == 0).then(|| (strip.upper[k], strip.lower[k])),
                    });
                }
            }
        }
        out
    }

    /// Set the Kutta strengths of panel row 0 from the body doublet strengths.
    pub fn apply_kutta(&mut self, doublet: &[Real]) {
        for strip in &mut self.strips {
            if let Some(first) = strip.strengths.first_mut() {
                for (k, mu) in first.iter_mut().enumerate() {
                    *mu = doublet[strip.upper[k]] - doublet[strip.lower[k]];
                }
            }
        }
    }

    /// Node positions free to move with the flow (every row behind the trailing edge).
    pub fn free_nodes(&self) -> Vec<Vec3> {
        self.strips
            .iter()
            .flat_map(|s| s.rows.iter().skip(1).flatten().copied())
            .collect()
    }

    /// Node positions of the rows anchored on the trailing edge.
    pub fn anchored_nodes(&self) -> Vec<Vec3> {
        self.strips
            .iter()
            .flat_map(|s| s.rows.first().into_iter().flatten().copied())
            .collect()
    }

    /// Move the wake with the flow for one time step.
    ///
    /// `velocities` matches `free_nodes()` order. Anchored rows move with the
    /// free stream only. A static wake does not move.
    pub fn convect(&mut self, velocities: &[Vec3], free_stream: &Vec3, dt: Real) -> SolverResult<()> {
        if self.options.static_wake {
            return Ok(());
        }
        let expected: usize = self
            .strips
            .iter()
            .map(|s| s.rows.iter().skip(1).map(Vec::len).sum::<usize>())
            .sum();
        if velocities.len() != expected {
            return Err(SolverError::Wake {
                what: format!(
                    "expected {expected} wake node velocities, got {}",
                    velocities.len()
                ),
            });
        }

        let mut v = velocities.iter();
        for strip in &mut self.strips {
            for (r, row) in strip.rows.iter_mut().enumerate() {
                for node in row.iter_mut() {
                    let u = if r == 0 { *free_stream } else { *v.next().unwrap_or(free_stream) };
                    *node += u * dt;
                }
            }
        }
        Ok(())
    }

    /// Shed a new panel row from the current trailing-edge position.
    ///
    /// Must be called with the free stream and time step used at initialization.
    pub fn shed(&mut self, surface: &Surface, free_stream: &Vec3, dt: Real) -> SolverResult<()> {
        let Some((init_stream, init_dt)) = self.shedding else {
            return Err(SolverError::Wake {
                what: "shed called before initialize".to_string(),
            });
        };
        let tol = Tolerances::default();
        let same_stream = (0..3).all(|i| nearly_equal(free_stream[i], init_stream[i], tol));
        if !same_stream || !nearly_equal(dt, init_dt, tol) {
            return Err(SolverError::Wake {
                what: "shedding parameters differ from initialization".to_string(),
            });
        }

        let factor = self.options.shed_factor;
        for strip in &mut self.strips {
            let te = strip.trailing_edge(surface);
            if self.options.static_wake {
                strip.rows[0] = te;
                continue;
            }
            let released: Vec<Vec3> = strip.rows[0]
                .iter()
                .zip(&te)
                .map(|(old, anchor)| anchor + (old - anchor) * factor)
                .collect();
            strip.rows[0] = released;
            strip.rows.insert(0, te);
            strip.strengths.insert(0, vec![0.0; strip.n_edges()]);
        }
        Ok(())
    }
}

/// Make `upper` the panel the first wake panel's normal points toward, so the
/// Kutta strength equals the potential jump across the sheet.
fn orient_kutta_pairs(strip: &mut WakeStrip, surface: &Surface) {
    for k in 0..strip.n_edges() {
        let Some(g) = PanelGeometry::from_corners(&strip.corners(0, k)) else {
            continue;
        };
        let upper = surface.panel(strip.upper[k]).normal;
        let lower = surface.panel(strip.lower[k]).normal;
        if g.normal.dot(&(upper - lower)) < 0.0 {
            std::mem::swap(&mut strip.upper[k], &mut strip.lower[k]);
        }
    }
}

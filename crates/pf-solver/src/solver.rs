//! Unsteady source/doublet solver.
//!
//! Dirichlet formulation: the perturbation potential inside the body is zero.
//! Sources carry the kinematic normal velocity, doublets are solved for, and
//! the first wake row is tied to the trailing-edge doublets by the Kutta
//! condition so it folds into the matrix columns of the upper and lower panels.

use nalgebra::{DMatrix, DVector};
use pf_core::{Real, Vec3, constants::RHO_AIR_KGPM3};
use pf_mesh::{PanelGeometry, Surface};
use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::influence::{
    InfluenceOptions, doublet_potential, doublet_velocity, source_potential, source_velocity,
    vortex_ring_velocity,
};
use crate::logger::{NullLogger, SolverLogger, SurfaceFields};
use crate::wake::{Wake, WakePanel};

/// Solver configuration.
#[derive(Clone, Copy, Debug)]
pub struct SolverOptions {
    /// Smallest accepted LU pivot relative to the largest one.
    pub inversion_tolerance: Real,
    pub farfield_factor: Real,
    /// Include the `∂μ/∂t` term in the pressure coefficient.
    pub unsteady: bool,
    /// Vortex core radius for wake velocities; `None` disables the core model.
    pub core_radius: Option<Real>,
    pub num_threads: usize,
    pub parallel: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            inversion_tolerance: 1e-12,
            farfield_factor: 10.0,
            unsteady: false,
            core_radius: None,
            num_threads: 6,
            parallel: true,
        }
    }
}

/// Per-step panel solver.
pub struct Solver {
    options: SolverOptions,
    influence: InfluenceOptions,
    pool: ThreadPool,
    logger: Box<dyn SolverLogger>,

    free_stream: Vec3,
    reference_velocity: Vec3,
    density: Real,

    source: Vec<Real>,
    doublet: Vec<Real>,
    previous_doublet: Option<Vec<Real>>,
    surface_velocity: Vec<Vec3>,
    pressure: Vec<Real>,
    force_coefficients: Vec3,
    force_history: Vec<Vec3>,
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("options", &self.options)
            .field("free_stream", &self.free_stream)
            .field("panels", &self.doublet.len())
            .finish_non_exhaustive()
    }
}

impl Solver {
    pub fn new(options: SolverOptions) -> SolverResult<Self> {
        let threads = if options.parallel {
            options.num_threads.max(1)
        } else {
            1
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| SolverError::ThreadPool(e.to_string()))?;

        Ok(Self {
            options,
            influence: InfluenceOptions {
                farfield_factor: options.farfield_factor,
                core_radius: options.core_radius,
            },
            pool,
            logger: Box::new(NullLogger),
            free_stream: Vec3::zeros(),
            reference_velocity: Vec3::zeros(),
            density: RHO_AIR_KGPM3,
            source: Vec::new(),
            doublet: Vec::new(),
            previous_doublet: None,
            surface_velocity: Vec::new(),
            pressure: Vec::new(),
            force_coefficients: Vec3::zeros(),
            force_history: Vec::new(),
        })
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn set_free_stream_velocity(&mut self, velocity: Vec3) {
        self.free_stream = velocity;
    }

    pub fn free_stream_velocity(&self) -> &Vec3 {
        &self.free_stream
    }

    /// Velocity used to non-dimensionalize pressure and forces.
    pub fn set_reference_velocity(&mut self, velocity: Vec3) {
        self.reference_velocity = velocity;
    }

    pub fn set_fluid_density(&mut self, density: Real) {
        self.density = density;
    }

    pub fn set_logger(&mut self, logger: Box<dyn SolverLogger>) {
        self.logger = logger;
    }

    /// Solve for the doublet strengths and surface pressure of the current geometry.
    ///
    /// Sets the Kutta strength of the first wake row.
    pub fn solve(
        &mut self,
        surface: &Surface,
        wake: &mut Wake,
        time_step: Real,
        iteration: usize,
    ) -> SolverResult<()> {
        let n = surface.n_panels();
        if n == 0 {
            return Err(SolverError::ProblemSetup {
                what: "surface has no panels".to_string(),
            });
        }
        let vref2 = self.reference_velocity.norm_squared();
        if vref2 == 0.0 {
            return Err(SolverError::ProblemSetup {
                what: "reference velocity is zero".to_string(),
            });
        }
        if !(time_step > 0.0) {
            return Err(SolverError::ProblemSetup {
                what: format!("time step must be positive, got {time_step}"),
            });
        }

        let kinematic: Vec<Vec3> = surface
            .panels()
            .iter()
            .map(|g| surface.kinematic_velocity(&self.free_stream, &g.center))
            .collect();
        let source: Vec<Real> = surface
            .panels()
            .iter()
            .zip(&kinematic)
            .map(|(g, v)| -g.normal.dot(v))
            .collect();

        let wake_panels = with_geometry(wake.panels());
        let influence = self.influence;
        let (rows, rhs): (Vec<Vec<Real>>, Vec<Real>) = self.pool.install(|| {
            (0..n)
                .into_par_iter()
                .map(|i| assemble_row(surface, &source, &wake_panels, &influence, i))
                .unzip()
        });
        debug!(iteration, panels = n, wake_panels = wake_panels.len(), "assembled influence system");

        let matrix = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
        let doublet = self.factor_and_solve(matrix, DVector::from_vec(rhs))?;
        wake.apply_kutta(&doublet);

        let dt_inv = 1.0 / time_step;
        let previous = if self.options.unsteady {
            self.previous_doublet.as_ref().filter(|p| p.len() == n)
        } else {
            None
        };
        let mut surface_velocity = Vec::with_capacity(n);
        let mut pressure = Vec::with_capacity(n);
        for (i, g) in surface.panels().iter().enumerate() {
            let v = kinematic[i];
            let tangential = v - g.normal * g.normal.dot(&v);
            let q = tangential + tangential_gradient(surface, &doublet, i);
            let dmu_dt = previous.map_or(0.0, |p| (doublet[i] - p[i]) * dt_inv);
            let cp = (v.norm_squared() - q.norm_squared() - 2.0 * dmu_dt) / vref2;
            if !cp.is_finite() {
                return Err(SolverError::Numeric {
                    what: format!("non-finite pressure coefficient on panel {i}"),
                });
            }
            surface_velocity.push(q);
            pressure.push(cp);
        }

        let s_ref = 0.5 * surface.wetted_area();
        let force: Vec3 = surface
            .panels()
            .iter()
            .zip(&pressure)
            .map(|(g, cp)| g.normal * (-cp * g.area))
            .sum::<Vec3>()
            / s_ref;

        self.source = source;
        self.doublet = doublet;
        self.surface_velocity = surface_velocity;
        self.pressure = pressure;
        self.force_coefficients = force;
        debug!(iteration, cf = ?force, "solved");
        Ok(())
    }

    fn factor_and_solve(&self, matrix: DMatrix<Real>, rhs: DVector<Real>) -> SolverResult<Vec<Real>> {
        let lu = matrix.lu();
        let u = lu.u();
        let (min, max) = u
            .diagonal()
            .iter()
            .fold((Real::INFINITY, 0.0 as Real), |(lo, hi), d| {
                (lo.min(d.abs()), hi.max(d.abs()))
            });
        let ratio = if max > 0.0 { min / max } else { 0.0 };
        if !(ratio >= self.options.inversion_tolerance) {
            return Err(SolverError::Singular { pivot_ratio: ratio });
        }
        let x = lu
            .solve(&rhs)
            .ok_or(SolverError::Singular { pivot_ratio: ratio })?;
        if x.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Numeric {
                what: "non-finite doublet strength".to_string(),
            });
        }
        Ok(x.iter().copied().collect())
    }

    /// Move the wake with the free stream plus the velocity induced by body and wake.
    pub fn convect_wake(&self, surface: &Surface, wake: &mut Wake, time_step: Real) -> SolverResult<()> {
        if wake.is_static() || wake.n_panels() == 0 {
            return Ok(());
        }
        let nodes = wake.free_nodes();
        let wake_panels = wake.panels();
        let influence = self.influence;
        let free_stream = self.free_stream;
        let (source, doublet) = (&self.source, &self.doublet);
        let velocities: Vec<Vec3> = self.pool.install(|| {
            nodes
                .par_iter()
                .map(|p| {
                    free_stream
                        + induced_velocity(surface, source, doublet, &wake_panels, &influence, p)
                })
                .collect()
        });
        if let Some(bad) = velocities.iter().position(|v| !v.iter().all(|c| c.is_finite())) {
            return Err(SolverError::Numeric {
                what: format!("non-finite wake velocity at node {bad}"),
            });
        }
        wake.convect(&velocities, &free_stream, time_step)
    }

    /// Commit the step: keep the doublet history and force history, notify the logger.
    pub fn finalize_iteration(
        &mut self,
        surface: &Surface,
        wake: &Wake,
        iteration: usize,
    ) -> SolverResult<()> {
        self.previous_doublet = Some(self.doublet.clone());
        self.force_history.push(self.force_coefficients);
        let fields = SurfaceFields {
            surface,
            doublet: &self.doublet,
            source: &self.source,
            pressure: &self.pressure,
            velocity: &self.surface_velocity,
        };
        self.logger.log_iteration(iteration, &fields, wake)
    }

    pub fn doublet_strengths(&self) -> &[Real] {
        &self.doublet
    }

    pub fn source_strengths(&self) -> &[Real] {
        &self.source
    }

    pub fn surface_velocities(&self) -> &[Vec3] {
        &self.surface_velocity
    }

    pub fn pressure_coefficients(&self) -> &[Real] {
        &self.pressure
    }

    /// Body force coefficients of the last solve.
    pub fn body_force_coefficients(&self) -> &Vec3 {
        &self.force_coefficients
    }

    /// Dimensional body force `C_F · ½ρ|V_ref|² · S_ref` of the last solve.
    pub fn body_forces(&self, surface: &Surface) -> Vec3 {
        let dynamic_pressure = 0.5 * self.density * self.reference_velocity.norm_squared();
        self.force_coefficients * (dynamic_pressure * 0.5 * surface.wetted_area())
    }

    pub fn force_history(&self) -> &[Vec3] {
        &self.force_history
    }
}

fn with_geometry(panels: Vec<WakePanel>) -> Vec<(WakePanel, PanelGeometry)> {
    panels
        .into_iter()
        .filter_map(|p| p.geometry().map(|g| (p, g)))
        .collect()
}

fn assemble_row(
    surface: &Surface,
    source: &[Real],
    wake_panels: &[(WakePanel, PanelGeometry)],
    opts: &InfluenceOptions,
    i: usize,
) -> (Vec<Real>, Real) {
    let p = surface.collocation_point(i);
    let mut row: Vec<Real> = surface
        .panels()
        .iter()
        .enumerate()
        .map(|(j, g)| if i == j { -0.5 } else { doublet_potential(g, p, opts) })
        .collect();
    let mut rhs: Real = -surface
        .panels()
        .iter()
        .zip(source)
        .map(|(g, s)| s * source_potential(g, p, opts))
        .sum::<Real>();

    for (panel, g) in wake_panels {
        let coefficient = doublet_potential(g, p, opts);
        match panel.kutta_pair {
            Some((upper, lower)) => {
                row[upper] += coefficient;
                row[lower] -= coefficient;
            }
            None => rhs -= panel.strength * coefficient,
        }
    }
    (row, rhs)
}

fn induced_velocity(
    surface: &Surface,
    source: &[Real],
    doublet: &[Real],
    wake_panels: &[WakePanel],
    opts: &InfluenceOptions,
    p: &Vec3,
) -> Vec3 {
    let body: Vec3 = surface
        .panels()
        .iter()
        .zip(source.iter().zip(doublet))
        .map(|(g, (s, mu))| source_velocity(g, p, opts) * *s + doublet_velocity(g, p, opts) * *mu)
        .sum();
    let sheet: Vec3 = wake_panels
        .iter()
        .map(|w| vortex_ring_velocity(&w.corners, -w.strength, p, opts.core_radius))
        .sum();
    body + sheet
}

/// Least-squares gradient of `mu` in the tangent plane of panel `i`.
///
/// Neighbours facing away (across a sharp edge) are ignored.
fn tangential_gradient(surface: &Surface, mu: &[Real], i: usize) -> Vec3 {
    let g = surface.panel(i);
    let (mut a11, mut a12, mut a22, mut b1, mut b2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &j in surface.neighbors(i) {
        let other = surface.panel(j);
        if other.normal.dot(&g.normal) <= 0.0 {
            continue;
        }
        let d = other.center - g.center;
        let (dx, dy) = (d.dot(&g.l), d.dot(&g.m));
        let dmu = mu[j] - mu[i];
        a11 += dx * dx;
        a12 += dx * dy;
        a22 += dy * dy;
        b1 += dx * dmu;
        b2 += dy * dmu;
    }
    let det = a11 * a22 - a12 * a12;
    if det.abs() <= 1e-12 * (a11 + a22) * (a11 + a22) {
        return Vec3::zeros();
    }
    let gx = (a22 * b1 - a12 * b2) / det;
    let gy = (a11 * b2 - a12 * b1) / det;
    g.l * gx + g.m * gy
}

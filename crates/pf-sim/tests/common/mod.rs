//! Mesh fixtures and a recording flow body shared by the integration tests.
#![allow(dead_code)]

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::path::Path;

use pf_core::{Real, Vec3};
use pf_sim::{FlowBody, SimError, SimResult};
use pf_solver::SolverError;

fn naca0012_half_thickness(x: f64) -> f64 {
    0.6 * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x * x + 0.2843 * x.powi(3)
        - 0.1036 * x.powi(4))
}

/// Closed NACA 0012 section from the trailing edge round the lower surface and back.
fn naca0012_section(n_chord: usize) -> Vec<(f64, f64)> {
    let stations: Vec<f64> = (0..=n_chord)
        .map(|k| 0.5 * (1.0 - (PI * k as f64 / n_chord as f64).cos()))
        .collect();
    let mut section = Vec::with_capacity(2 * n_chord + 1);
    for k in (0..=n_chord).rev() {
        section.push((stations[k], -naca0012_half_thickness(stations[k])));
    }
    for &x in &stations[1..] {
        section.push((x, naca0012_half_thickness(x)));
    }
    section
}

fn write_single_block(ni: usize, nj: usize, points: &[Vec3]) -> String {
    let mut out = String::new();
    writeln!(out, "1").unwrap();
    writeln!(out, "{ni} {nj} 1").unwrap();
    for axis in 0..3 {
        for p in points {
            writeln!(out, "{:.9}", p[axis]).unwrap();
        }
    }
    out
}

/// Rectangular NACA 0012 wing, unit chord along x, span along y.
pub fn rectangular_wing(n_chord: usize, n_span: usize, span: f64) -> String {
    let section = naca0012_section(n_chord);
    let mut points = Vec::new();
    for j in 0..=n_span {
        let y = span * j as f64 / n_span as f64;
        points.extend(section.iter().map(|&(x, z)| Vec3::new(x, y, z)));
    }
    write_single_block(section.len(), n_span + 1, &points)
}

/// Circular cylinder of radius 0.5 with its axis along y; sections close on themselves.
pub fn cylinder(n_around: usize, n_span: usize, length: f64) -> String {
    let mut points = Vec::new();
    for j in 0..=n_span {
        let y = length * j as f64 / n_span as f64;
        for i in 0..=n_around {
            let theta = 2.0 * PI * (i % n_around) as f64 / n_around as f64;
            points.push(Vec3::new(0.5 * theta.cos(), y, 0.5 * theta.sin()));
        }
    }
    write_single_block(n_around + 1, n_span + 1, &points)
}

/// Single propeller blade: NACA 0012 sections with chord along y, stacked radially along x.
pub fn blade(n_chord: usize, n_span: usize) -> String {
    let section = naca0012_section(n_chord);
    let mut points = Vec::new();
    for j in 0..=n_span {
        let r = 0.2 + j as f64 / n_span as f64;
        points.extend(section.iter().map(|&(x, z)| Vec3::new(r, x - 0.25, z)));
    }
    write_single_block(section.len(), n_span + 1, &points)
}

/// Write every built-in scenario mesh into `dir`.
pub fn write_scenario_meshes(dir: &Path) {
    std::fs::write(dir.join("cylinder.x"), cylinder(12, 3, 2.0)).unwrap();
    std::fs::write(dir.join("flying_wing.x"), rectangular_wing(6, 3, 3.0)).unwrap();
    std::fs::write(dir.join("prop.x"), blade(6, 2)).unwrap();
    std::fs::write(dir.join("NACA0012_1.x"), rectangular_wing(6, 2, 2.0)).unwrap();
}

/// One call issued against a [`RecordingBody`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Solve { iteration: usize, time_step: Real },
    Convect,
    SetLinearVelocity(Vec3),
    Rotate(Vec3),
    Translate(Vec3),
    Shed { free_stream: Vec3 },
    Finalize(usize),
}

/// Flow body double that records calls and moves its collocation points rigidly.
#[derive(Debug, Default)]
pub struct RecordingBody {
    pub calls: Vec<Call>,
    pub points: Vec<Vec3>,
    pub cp: Vec<Real>,
    pub fail_shed_at: Option<usize>,
    solved: usize,
}

impl RecordingBody {
    pub fn with_panels(n: usize) -> Self {
        Self {
            points: (0..n).map(|i| Vec3::new(i as f64, 0.5, -1.0)).collect(),
            cp: vec![0.0; n],
            ..Self::default()
        }
    }

    /// Calls of one iteration, split on `Solve`.
    pub fn iterations(&self) -> Vec<Vec<Call>> {
        let mut out: Vec<Vec<Call>> = Vec::new();
        for call in &self.calls {
            if matches!(call, Call::Solve { .. }) {
                out.push(Vec::new());
            }
            if let Some(last) = out.last_mut() {
                last.push(call.clone());
            }
        }
        out
    }
}

impl FlowBody for RecordingBody {
    fn solve(&mut self, time_step: Real, iteration: usize) -> SimResult<()> {
        self.calls.push(Call::Solve {
            iteration,
            time_step,
        });
        self.solved = iteration + 1;
        for (k, cp) in self.cp.iter_mut().enumerate() {
            *cp = -(k as f64) - 0.25 * iteration as f64;
        }
        Ok(())
    }

    fn convect_wake(&mut self, _time_step: Real) -> SimResult<()> {
        self.calls.push(Call::Convect);
        Ok(())
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.calls.push(Call::SetLinearVelocity(velocity));
    }

    fn rotate(&mut self, angles: &Vec3) {
        self.calls.push(Call::Rotate(*angles));
    }

    fn translate(&mut self, displacement: &Vec3) {
        self.calls.push(Call::Translate(*displacement));
        for p in &mut self.points {
            *p += displacement;
        }
    }

    fn shed_wake(&mut self, free_stream: &Vec3, _time_step: Real) -> SimResult<()> {
        self.calls.push(Call::Shed {
            free_stream: *free_stream,
        });
        if self.fail_shed_at == Some(self.solved - 1) {
            return Err(SimError::Solver(SolverError::Wake {
                what: "intentional shedding failure".to_string(),
            }));
        }
        Ok(())
    }

    fn finalize_iteration(&mut self, iteration: usize) -> SimResult<()> {
        self.calls.push(Call::Finalize(iteration));
        Ok(())
    }

    fn body_force_coefficients(&self) -> Vec3 {
        Vec3::new(0.5 * self.solved as f64, 0.0, -0.125)
    }

    fn body_forces(&self) -> Vec3 {
        self.body_force_coefficients() * 2.0
    }

    fn pressure_coefficients(&self) -> &[Real] {
        &self.cp
    }

    fn collocation_points(&self) -> Vec<Vec3> {
        self.points.clone()
    }

    fn panel_count(&self) -> usize {
        self.points.len()
    }
}

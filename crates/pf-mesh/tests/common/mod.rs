//! PLOT3D fixtures shared by the integration tests.

use std::fmt::Write;

/// NACA 0012 thickness with the closed trailing-edge coefficient.
fn naca0012_half_thickness(x: f64) -> f64 {
    0.6 * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x * x + 0.2843 * x.powi(3)
        - 0.1036 * x.powi(4))
}

/// Rectangular NACA 0012 wing, unit chord, sections in the x–z plane stacked along y.
///
/// Each section runs trailing edge → lower surface → leading edge → upper surface →
/// trailing edge, so the first and last i-stations coincide.
pub fn rectangular_wing(n_chord: usize, n_span: usize, span: f64) -> String {
    let stations: Vec<f64> = (0..=n_chord)
        .map(|k| 0.5 * (1.0 - (std::f64::consts::PI * k as f64 / n_chord as f64).cos()))
        .collect();

    let mut section = Vec::with_capacity(2 * n_chord + 1);
    for k in (0..=n_chord).rev() {
        let x = stations[k];
        section.push((x, -naca0012_half_thickness(x)));
    }
    for &x in &stations[1..] {
        section.push((x, naca0012_half_thickness(x)));
    }

    let ni = section.len();
    let nj = n_span + 1;
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut zs = Vec::new();
    for j in 0..nj {
        let y = span * j as f64 / n_span as f64;
        for &(x, z) in &section {
            xs.push(x);
            ys.push(y);
            zs.push(z);
        }
    }
    write_single_block(ni, nj, &xs, &ys, &zs)
}

pub fn write_single_block(ni: usize, nj: usize, xs: &[f64], ys: &[f64], zs: &[f64]) -> String {
    let mut out = String::new();
    writeln!(out, "1").unwrap();
    writeln!(out, "{ni}\t{nj}\t1").unwrap();
    for v in xs.iter().chain(ys).chain(zs) {
        writeln!(out, "{v:.9}").unwrap();
    }
    out
}

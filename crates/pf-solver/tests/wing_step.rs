//! Solver and wake on a rectangular wing.

mod common;

use pf_core::Vec3;
use pf_mesh::{Surface, parse_plot3d};
use pf_solver::{Solver, SolverOptions, Wake, WakeOptions};

const DT: f64 = 1.5;

fn wing(pitch_deg: f64) -> Surface {
    let mut surface = parse_plot3d(&common::rectangular_wing(8, 4, 4.0)).unwrap();
    surface.rotate(&Vec3::new(0.0, pitch_deg, 0.0), false);
    surface
}

fn setup(surface: &Surface, options: SolverOptions) -> (Wake, Solver) {
    let free_stream = Vec3::new(1.0, 0.0, 0.0);
    let mut wake = Wake::new(WakeOptions::default());
    wake.add_lifting_surface(surface);
    wake.initialize(surface, &free_stream, DT).unwrap();

    let mut solver = Solver::new(options).unwrap();
    solver.set_free_stream_velocity(free_stream);
    solver.set_reference_velocity(free_stream);
    (wake, solver)
}

#[test]
fn symmetric_wing_at_zero_incidence_carries_no_lift() {
    let surface = wing(0.0);
    let (mut wake, mut solver) = setup(&surface, SolverOptions::default());
    solver.solve(&surface, &mut wake, DT, 0).unwrap();

    assert!(solver.body_force_coefficients().z.abs() < 1e-8);
    for panel in wake.panels() {
        assert!(panel.strength.abs() < 1e-8);
    }
}

#[test]
fn positive_incidence_produces_lift() {
    let surface = wing(5.0);
    let (mut wake, mut solver) = setup(&surface, SolverOptions::default());
    solver.solve(&surface, &mut wake, DT, 0).unwrap();

    let cz = solver.body_force_coefficients().z;
    assert!(cz > 0.1 && cz < 0.5, "cz = {cz}");
    assert!(wake.panels().iter().all(|p| p.strength.abs() > 1e-3));
    assert_eq!(solver.pressure_coefficients().len(), surface.n_panels());
}

#[test]
fn dimensional_forces_scale_with_density() {
    let surface = wing(5.0);
    let (mut wake, mut air) = setup(&surface, SolverOptions::default());
    air.solve(&surface, &mut wake, DT, 0).unwrap();

    let (mut wake, mut water) = setup(&surface, SolverOptions::default());
    water.set_fluid_density(1000.0);
    water.solve(&surface, &mut wake, DT, 0).unwrap();

    let cf = *air.body_force_coefficients();
    assert!((water.body_force_coefficients() - cf).norm() < 1e-12);

    let s_ref = 0.5 * surface.wetted_area();
    let lift_air = air.body_forces(&surface).z;
    assert!((lift_air - cf.z * 0.5 * 1.225 * s_ref).abs() < 1e-9);
    let ratio = water.body_forces(&surface).z / lift_air;
    assert!((ratio - 1000.0 / 1.225).abs() < 1e-6);
}

#[test]
fn unsteady_steps_grow_the_wake() {
    let surface = wing(5.0);
    let options = SolverOptions {
        unsteady: true,
        num_threads: 2,
        ..SolverOptions::default()
    };
    let (mut wake, mut solver) = setup(&surface, options);
    let free_stream = *solver.free_stream_velocity();

    for it in 0..3 {
        solver.solve(&surface, &mut wake, DT, it).unwrap();
        solver.convect_wake(&surface, &mut wake, DT).unwrap();
        wake.shed(&surface, &free_stream, DT).unwrap();
        solver.finalize_iteration(&surface, &wake, it).unwrap();
        assert_eq!(wake.n_rows(), it + 3);
    }

    assert_eq!(wake.n_panels(), 4 * 4);
    assert!(solver.pressure_coefficients().iter().all(|cp| cp.is_finite()));
    assert!(solver.body_force_coefficients().iter().all(|c| c.is_finite()));
    assert_eq!(solver.force_history().len(), 3);
    // Released rows keep the strength they were shed with.
    assert!(wake.panels().iter().filter(|p| p.row > 0).all(|p| p.strength != 0.0));
}

#[test]
fn vortex_core_model_keeps_wake_finite() {
    let surface = wing(5.0);
    let options = SolverOptions {
        core_radius: Some(1e-3),
        ..SolverOptions::default()
    };
    let (mut wake, mut solver) = setup(&surface, options);
    let free_stream = *solver.free_stream_velocity();
    for it in 0..2 {
        solver.solve(&surface, &mut wake, DT, it).unwrap();
        solver.convect_wake(&surface, &mut wake, DT).unwrap();
        wake.shed(&surface, &free_stream, DT).unwrap();
        solver.finalize_iteration(&surface, &wake, it).unwrap();
    }
    assert!(wake.free_nodes().iter().all(|p| p.iter().all(|c| c.is_finite())));
}

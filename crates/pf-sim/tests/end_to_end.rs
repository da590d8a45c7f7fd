//! Built-in scenarios run against small fixture meshes.

mod common;

use std::path::Path;

use pf_mesh::parse_plot3d;
use pf_sim::{Configuration, FlowBodyContext, PRESSURE_FILE, Scenario, SimError, run_scenario};

fn config(test_case: i64, root: &Path) -> Configuration {
    let mesh_dir = root.join("mesh_files");
    std::fs::create_dir_all(&mesh_dir).unwrap();
    common::write_scenario_meshes(&mesh_dir);
    Configuration {
        test_case,
        num_threads: 2,
        mesh_dir,
        output_dir: root.join("Output"),
        ..Configuration::default()
    }
}

fn run(config: &Configuration) -> String {
    run_with_summary(config).0
}

fn run_with_summary(config: &Configuration) -> (String, pf_sim::RunSummary) {
    let mut out = Vec::new();
    let summary = run_scenario(config, &mut out)
        .expect("scenario should run")
        .expect("scenario id should be known");
    assert!(summary.final_force_coefficients.iter().all(|c| c.is_finite()));
    (String::from_utf8(out).unwrap(), summary)
}

fn assert_force_lines(text: &str, count: usize) {
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), count);
    for line in lines {
        let inner = line
            .strip_prefix("Body Force Coefficients = (")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or_else(|| panic!("unexpected line {line:?}"));
        let values: Vec<f64> = inner.split(", ").map(|v| v.parse().unwrap()).collect();
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn cylinder_streams_ten_lines_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(0, dir.path());
    let text = run(&config);
    assert_force_lines(&text, 10);
    assert!(!config.output_dir.exists());
}

#[test]
fn wing_streams_ten_lines() {
    let dir = tempfile::tempdir().unwrap();
    let (text, summary) = run_with_summary(&config(1, dir.path()));
    assert_force_lines(&text, 10);

    // Unit free stream: F = C_F · ½ρ · S_ref, with S_ref half the wetted area.
    let mesh = parse_plot3d(&common::rectangular_wing(6, 3, 3.0)).unwrap();
    let scale = 0.5 * 1.225 * 0.5 * mesh.wetted_area();
    let expected = summary.final_force_coefficients * scale;
    assert!((summary.final_forces - expected).norm() <= 1e-9 * (1.0 + expected.norm()));
}

#[test]
fn context_applies_offset_and_initializes_wake() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(1, dir.path());
    let case = Scenario::Wing.case();
    let ctx = FlowBodyContext::prepare(&case, &config).unwrap();

    let raw = parse_plot3d(&common::rectangular_wing(6, 3, 3.0)).unwrap();
    assert_eq!(ctx.surface().n_panels(), raw.n_panels());
    let (moved, original) = (ctx.surface().node(0), raw.node(0));
    assert!((moved - original).norm() > 1e-6, "pitch offset should move the mesh");
    assert!((moved.norm() - original.norm()).abs() < 1e-12);

    assert!(ctx.wake().is_initialized());
    assert_eq!(ctx.wake().n_rows(), 2);
    assert_eq!(ctx.wake().n_strips(), 1);
    assert!(ctx.solver().options().unsteady);
    assert_eq!(ctx.solver().free_stream_velocity(), &case.free_stream);
}

#[test]
fn rotating_blade_writes_pressure_table() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(2, dir.path());
    let text = run(&config);
    assert_eq!(text, "Exiting program.\n");

    let files: Vec<_> = std::fs::read_dir(&config.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(files, vec![std::ffi::OsString::from(PRESSURE_FILE)]);

    let table = std::fs::read_to_string(config.output_dir.join(PRESSURE_FILE)).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "x,y,z,cp");
    // blade(6, 2): 12 panels around each of 2 span strips
    assert_eq!(lines.len() - 1, 24);
    for line in &lines[1..] {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 4);
        for field in fields {
            let (mantissa, exponent) = field.split_once('e').expect("scientific notation");
            assert_eq!(mantissa.trim_start_matches('-').len(), 8, "{field}");
            assert!(exponent.starts_with('+') || exponent.starts_with('-'));
            assert!(field.parse::<f64>().unwrap().is_finite());
        }
    }
}

#[test]
fn flapping_wing_prints_only_the_completion_line() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(3, dir.path());
    assert_eq!(run(&config), "Exiting program.\n");
    assert!(!config.output_dir.exists());
}

#[test]
fn missing_mesh_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = Configuration {
        test_case: 0,
        mesh_dir: dir.path().join("nowhere"),
        output_dir: dir.path().join("Output"),
        ..Configuration::default()
    };
    let mut out = Vec::new();
    let err = run_scenario(&config, &mut out).unwrap_err();
    assert!(matches!(err, SimError::Mesh(_)));
    assert!(out.is_empty());
}

#[test]
fn vtk_snapshots_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = Configuration {
        write_vtk: true,
        ..config(0, dir.path())
    };
    run(&config);
    assert!(config.output_dir.join("cylinder_0000.vtk").exists());
    assert!(config.output_dir.join("wake_0009.vtk").exists());
}

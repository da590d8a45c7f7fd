//! Built-in scenarios and the per-run case description.

use pf_core::{Density, Length, Real, Time, Vec3, Velocity, constants::rho_air, m, s};
use uom::si::length::meter;
use uom::si::mass_density::kilogram_per_cubic_meter;
use uom::si::time::second;
use uom::si::velocity::meter_per_second;

/// Rigid-body motion applied once per iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KinematicsLaw {
    NoMotion,
    /// Constant rotation about the origin, per-axis rates in revolutions per minute.
    RigidRotation { angular_velocity: Vec3 },
    /// Heave `z(t)` with velocity `amplitude · cos(angular_frequency · t)`.
    OscillatingTranslation {
        amplitude: Real,
        angular_frequency: Real,
    },
}

/// What a run reports on the console and on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One force-coefficient line per iteration.
    Streaming,
    /// Pressure table written after the last iteration.
    Batch,
    /// A single completion line.
    Completion,
}

/// Everything the time-stepping loop needs to know about one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationCase {
    pub name: &'static str,
    /// File name looked up in the configured mesh directory.
    pub mesh_file: &'static str,
    pub free_stream: Vec3,
    pub fluid_density: Density,
    pub time_step: Time,
    pub iteration_count: usize,
    /// Per-axis rotation in degrees applied once before the loop.
    pub initial_orientation_offset: Option<Vec3>,
    pub kinematics: KinematicsLaw,
    pub output_mode: OutputMode,
    pub unsteady: bool,
}

impl SimulationCase {
    /// Time step in seconds.
    pub fn dt(&self) -> Real {
        self.time_step.get::<second>()
    }

    /// Density in kg/m³.
    pub fn density(&self) -> Real {
        self.fluid_density.get::<kilogram_per_cubic_meter>()
    }
}

/// The built-in scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Cylinder,
    Wing,
    RotatingBlade,
    FlappingWing,
}

/// Map a selector id to its scenario; unknown ids select nothing.
pub fn select(id: i64) -> Option<Scenario> {
    match id {
        0 => Some(Scenario::Cylinder),
        1 => Some(Scenario::Wing),
        2 => Some(Scenario::RotatingBlade),
        3 => Some(Scenario::FlappingWing),
        _ => None,
    }
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Cylinder,
        Scenario::Wing,
        Scenario::RotatingBlade,
        Scenario::FlappingWing,
    ];

    pub fn id(self) -> i64 {
        match self {
            Scenario::Cylinder => 0,
            Scenario::Wing => 1,
            Scenario::RotatingBlade => 2,
            Scenario::FlappingWing => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Cylinder => "cylinder",
            Scenario::Wing => "wing",
            Scenario::RotatingBlade => "rotating_blade",
            Scenario::FlappingWing => "flapping_wing",
        }
    }

    pub fn case(self) -> SimulationCase {
        match self {
            Scenario::Cylinder => SimulationCase {
                name: self.name(),
                mesh_file: "cylinder.x",
                free_stream: Vec3::new(1.0, 0.0, 0.0),
                fluid_density: rho_air(),
                time_step: s(1.5),
                iteration_count: 10,
                initial_orientation_offset: None,
                kinematics: KinematicsLaw::NoMotion,
                output_mode: OutputMode::Streaming,
                unsteady: true,
            },
            Scenario::Wing => SimulationCase {
                name: self.name(),
                mesh_file: "flying_wing.x",
                free_stream: Vec3::new(1.0, 0.0, 0.0),
                fluid_density: rho_air(),
                time_step: s(1.5),
                iteration_count: 10,
                initial_orientation_offset: Some(Vec3::new(0.0, -5.0, 0.0)),
                kinematics: KinematicsLaw::NoMotion,
                output_mode: OutputMode::Streaming,
                unsteady: true,
            },
            Scenario::RotatingBlade => SimulationCase {
                name: self.name(),
                mesh_file: "prop.x",
                free_stream: Vec3::new(0.0, 7.0, 0.0),
                fluid_density: rho_air(),
                time_step: s(0.015),
                iteration_count: 90,
                initial_orientation_offset: None,
                kinematics: KinematicsLaw::RigidRotation {
                    angular_velocity: Vec3::new(0.0, 71.63, 0.0),
                },
                output_mode: OutputMode::Batch,
                unsteady: true,
            },
            Scenario::FlappingWing => flapping_wing(m(1.0), s(0.025)),
        }
    }
}

/// Heaving NACA 0012 at reduced frequency 8.57 (Katz & Plotkin, 2nd ed., pp. 417-418).
fn flapping_wing(chord: Length, time_step: Time) -> SimulationCase {
    let speed: Velocity = chord * 0.009 / time_step;
    let speed = speed.get::<meter_per_second>();
    let c = chord.get::<meter>();
    let reduced_frequency = 8.57;
    SimulationCase {
        name: Scenario::FlappingWing.name(),
        mesh_file: "NACA0012_1.x",
        free_stream: Vec3::new(speed, 0.0, 0.0),
        fluid_density: rho_air(),
        time_step,
        iteration_count: 60,
        initial_orientation_offset: None,
        kinematics: KinematicsLaw::OscillatingTranslation {
            amplitude: 0.019 * c,
            angular_frequency: reduced_frequency * 2.0 * speed / c,
        },
        output_mode: OutputMode::Completion,
        unsteady: true,
    }
}

//! Per-iteration rigid-body motion increments.

use pf_core::{RPM_TO_RAD_PER_S, Real, Vec3};

use crate::scenario::KinematicsLaw;

/// Motion to apply to the body between wake convection and wake shedding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseDelta {
    None,
    /// Rotation about the origin, per-axis angles in radians.
    Rotation { angles: Vec3 },
    /// Translation by `displacement`; `velocity` becomes the body's linear velocity.
    Translation { velocity: Vec3, displacement: Vec3 },
}

/// Evaluate the motion increment of `law` for the iteration starting at `elapsed_time`.
///
/// Pure: the result depends only on the arguments.
pub fn evaluate(
    law: &KinematicsLaw,
    _iteration: usize,
    elapsed_time: Real,
    time_step: Real,
) -> PoseDelta {
    match *law {
        KinematicsLaw::NoMotion => PoseDelta::None,
        KinematicsLaw::RigidRotation { angular_velocity } => PoseDelta::Rotation {
            angles: angular_velocity * (RPM_TO_RAD_PER_S * time_step),
        },
        KinematicsLaw::OscillatingTranslation {
            amplitude,
            angular_frequency,
        } => {
            let velocity = Vec3::new(0.0, 0.0, amplitude * (angular_frequency * elapsed_time).cos());
            PoseDelta::Translation {
                velocity,
                displacement: velocity * time_step,
            }
        }
    }
}

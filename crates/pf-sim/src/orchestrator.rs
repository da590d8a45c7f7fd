//! Fixed-count time-stepping loop.

use std::iter::FusedIterator;

use pf_core::{Real, Vec3};
use tracing::debug;

use crate::body::FlowBody;
use crate::error::SimResult;
use crate::kinematics::{PoseDelta, evaluate};
use crate::scenario::SimulationCase;

/// Outcome of one completed iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub index: usize,
    /// Simulated time at the end of the iteration, `(index + 1) · dt`.
    pub elapsed_time: Real,
    pub body_force_coefficients: Vec3,
    pub pose_delta: PoseDelta,
    /// Per-panel pressure coefficients, present when the stepper captures panel fields.
    pub pressure_coefficients: Option<Vec<Real>>,
    /// Per-panel collocation points after this iteration's motion.
    pub collocation_points: Option<Vec<Vec3>>,
}

/// Iterator over the iterations of one run.
///
/// Each `next()` performs solve, wake convection, body motion, wake shedding
/// and finalization, in that order. After an error the stepper yields nothing more.
pub struct TimeStepper<'a, B: FlowBody + ?Sized> {
    case: &'a SimulationCase,
    body: &'a mut B,
    next_index: usize,
    failed: bool,
    panel_fields: bool,
}

/// Start stepping `case` on `body`.
pub fn run<'a, B: FlowBody + ?Sized>(case: &'a SimulationCase, body: &'a mut B) -> TimeStepper<'a, B> {
    TimeStepper {
        case,
        body,
        next_index: 0,
        failed: false,
        panel_fields: false,
    }
}

impl<B: FlowBody + ?Sized> TimeStepper<'_, B> {
    /// Attach pressure coefficients and collocation points to every record.
    pub fn with_panel_fields(mut self, enabled: bool) -> Self {
        self.panel_fields = enabled;
        self
    }

    fn step(&mut self, index: usize) -> SimResult<IterationRecord> {
        let dt = self.case.dt();
        let elapsed_before = index as Real * dt;

        self.body.solve(dt, index)?;
        self.body.convect_wake(dt)?;

        let delta = evaluate(&self.case.kinematics, index, elapsed_before, dt);
        match delta {
            PoseDelta::None => {}
            PoseDelta::Rotation { angles } => self.body.rotate(&angles),
            PoseDelta::Translation {
                velocity,
                displacement,
            } => {
                self.body.set_linear_velocity(velocity);
                self.body.translate(&displacement);
            }
        }

        self.body.shed_wake(&self.case.free_stream, dt)?;
        self.body.finalize_iteration(index)?;

        let (pressure_coefficients, collocation_points) = if self.panel_fields {
            (
                Some(self.body.pressure_coefficients().to_vec()),
                Some(self.body.collocation_points()),
            )
        } else {
            (None, None)
        };
        let record = IterationRecord {
            index,
            elapsed_time: (index + 1) as Real * dt,
            body_force_coefficients: self.body.body_force_coefficients(),
            pose_delta: delta,
            pressure_coefficients,
            collocation_points,
        };
        debug!(
            case = self.case.name,
            iteration = index,
            t = record.elapsed_time,
            cf = ?record.body_force_coefficients,
            "iteration complete"
        );
        Ok(record)
    }
}

impl<B: FlowBody + ?Sized> Iterator for TimeStepper<'_, B> {
    type Item = SimResult<IterationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_index >= self.case.iteration_count {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        let result = self.step(index);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.failed {
            0
        } else {
            self.case.iteration_count - self.next_index
        };
        (0, Some(remaining))
    }
}

impl<B: FlowBody + ?Sized> FusedIterator for TimeStepper<'_, B> {}

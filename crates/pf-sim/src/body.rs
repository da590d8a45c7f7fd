//! The flow body driven by the time-stepping loop.

use pf_core::{Real, Vec3};
use pf_mesh::{Surface, read_plot3d};
use pf_solver::{Solver, VtkWriter, Wake};
use tracing::{debug, info};

use crate::config::Configuration;
use crate::error::SimResult;
use crate::scenario::{KinematicsLaw, SimulationCase};

/// Operations the orchestrator issues against the body, its wake and its solver.
pub trait FlowBody {
    fn solve(&mut self, time_step: Real, iteration: usize) -> SimResult<()>;

    fn convect_wake(&mut self, time_step: Real) -> SimResult<()>;

    fn set_linear_velocity(&mut self, velocity: Vec3);

    /// Rotate about the origin by per-axis angles in radians.
    fn rotate(&mut self, angles: &Vec3);

    fn translate(&mut self, displacement: &Vec3);

    fn shed_wake(&mut self, free_stream: &Vec3, time_step: Real) -> SimResult<()>;

    fn finalize_iteration(&mut self, iteration: usize) -> SimResult<()>;

    fn body_force_coefficients(&self) -> Vec3;

    /// Dimensional body force in newtons.
    fn body_forces(&self) -> Vec3;

    fn pressure_coefficients(&self) -> &[Real];

    fn collocation_points(&self) -> Vec<Vec3>;

    fn panel_count(&self) -> usize;
}

/// Surface, wake and solver for one run.
#[derive(Debug)]
pub struct FlowBodyContext {
    surface: Surface,
    wake: Wake,
    solver: Solver,
}

impl FlowBodyContext {
    /// Load the case mesh and wire up wake and solver.
    pub fn prepare(case: &SimulationCase, config: &Configuration) -> SimResult<Self> {
        let mesh_path = config.mesh_dir.join(case.mesh_file);
        let surface = read_plot3d(&mesh_path)?;
        Self::from_surface(surface, case, config)
    }

    /// Wire up wake and solver around an already built surface.
    pub fn from_surface(
        mut surface: Surface,
        case: &SimulationCase,
        config: &Configuration,
    ) -> SimResult<Self> {
        if let Some(offset) = case.initial_orientation_offset {
            surface.rotate(&offset, false);
            debug!(?offset, "applied initial orientation offset (degrees)");
        }
        if let KinematicsLaw::RigidRotation { angular_velocity } = case.kinematics {
            surface.set_angular_velocity(angular_velocity, false);
        }

        let dt = case.dt();
        let mut wake = Wake::new(config.wake_options());
        wake.add_lifting_surface(&surface);
        wake.initialize(&surface, &case.free_stream, dt)?;

        let mut solver = Solver::new(config.solver_options(case.unsteady))?;
        solver.set_free_stream_velocity(case.free_stream);
        solver.set_reference_velocity(case.free_stream);
        solver.set_fluid_density(case.density());
        if config.write_vtk {
            solver.set_logger(Box::new(VtkWriter::new(&config.output_dir, case.name)));
        }

        info!(
            case = case.name,
            panels = surface.n_panels(),
            wake_strips = wake.n_strips(),
            threads = config.effective_threads(),
            "flow body ready"
        );
        Ok(Self {
            surface,
            wake,
            solver,
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn wake(&self) -> &Wake {
        &self.wake
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }
}

impl FlowBody for FlowBodyContext {
    fn solve(&mut self, time_step: Real, iteration: usize) -> SimResult<()> {
        self.solver
            .solve(&self.surface, &mut self.wake, time_step, iteration)?;
        Ok(())
    }

    fn convect_wake(&mut self, time_step: Real) -> SimResult<()> {
        self.solver
            .convect_wake(&self.surface, &mut self.wake, time_step)?;
        Ok(())
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.surface.set_linear_velocity(velocity);
    }

    fn rotate(&mut self, angles: &Vec3) {
        self.surface.rotate(angles, true);
    }

    fn translate(&mut self, displacement: &Vec3) {
        self.surface.translate(displacement);
    }

    fn shed_wake(&mut self, free_stream: &Vec3, time_step: Real) -> SimResult<()> {
        self.wake.shed(&self.surface, free_stream, time_step)?;
        Ok(())
    }

    fn finalize_iteration(&mut self, iteration: usize) -> SimResult<()> {
        self.solver
            .finalize_iteration(&self.surface, &self.wake, iteration)?;
        Ok(())
    }

    fn body_force_coefficients(&self) -> Vec3 {
        *self.solver.body_force_coefficients()
    }

    fn body_forces(&self) -> Vec3 {
        self.solver.body_forces(&self.surface)
    }

    fn pressure_coefficients(&self) -> &[Real] {
        self.solver.pressure_coefficients()
    }

    fn collocation_points(&self) -> Vec<Vec3> {
        self.surface.panels().iter().map(|g| g.center).collect()
    }

    fn panel_count(&self) -> usize {
        self.surface.n_panels()
    }
}

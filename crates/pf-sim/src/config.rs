//! Startup configuration, resolved once per process.

use std::path::{Path, PathBuf};

use pf_core::Real;
use pf_solver::{SolverOptions, WakeOptions};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Process-wide run configuration.
///
/// Every field has a default, so a YAML file only needs the values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    pub num_threads: usize,
    pub parallel_computation: bool,
    /// Scenario selector; ids 0 to 3 are recognized.
    pub test_case: i64,
    pub inversion_tolerance: Real,
    pub farfield_factor: Real,
    pub trailing_edge_wake_shed_factor: Real,
    pub unsteady_problem: bool,
    pub static_wake_length: Real,
    pub static_wake: bool,
    pub use_vortex_core_model: bool,
    pub vortex_core_radius: Real,
    pub mesh_dir: PathBuf,
    pub output_dir: PathBuf,
    pub write_vtk: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            num_threads: 6,
            parallel_computation: true,
            test_case: 1,
            inversion_tolerance: 1e-12,
            farfield_factor: 10.0,
            trailing_edge_wake_shed_factor: 0.25,
            unsteady_problem: false,
            static_wake_length: 1.0,
            static_wake: false,
            use_vortex_core_model: false,
            vortex_core_radius: 1e-3,
            mesh_dir: PathBuf::from("./mesh_files/"),
            output_dir: PathBuf::from("Output"),
            write_vtk: false,
        }
    }
}

impl Configuration {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> SimResult<Self> {
        let config: Configuration = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn load(path: &Path) -> SimResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.num_threads == 0 {
            return Err(SimError::Config {
                what: "num_threads must be at least 1".to_string(),
            });
        }
        let positive = [
            ("inversion_tolerance", self.inversion_tolerance),
            ("farfield_factor", self.farfield_factor),
            ("static_wake_length", self.static_wake_length),
            ("vortex_core_radius", self.vortex_core_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimError::Config {
                    what: format!("{name} must be positive and finite, got {value}"),
                });
            }
        }
        let factor = self.trailing_edge_wake_shed_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(SimError::Config {
                what: format!("trailing_edge_wake_shed_factor must be in (0, 1], got {factor}"),
            });
        }
        Ok(())
    }

    /// Worker threads the solver pool should use.
    pub fn effective_threads(&self) -> usize {
        if self.parallel_computation {
            self.num_threads
        } else {
            1
        }
    }

    /// Solver options for one run; `unsteady` comes from the scenario.
    pub fn solver_options(&self, unsteady: bool) -> SolverOptions {
        SolverOptions {
            inversion_tolerance: self.inversion_tolerance,
            farfield_factor: self.farfield_factor,
            unsteady,
            core_radius: self
                .use_vortex_core_model
                .then_some(self.vortex_core_radius),
            num_threads: self.num_threads,
            parallel: self.parallel_computation,
        }
    }

    pub fn wake_options(&self) -> WakeOptions {
        WakeOptions {
            shed_factor: self.trailing_edge_wake_shed_factor,
            static_wake: self.static_wake,
            static_length: self.static_wake_length,
        }
    }
}

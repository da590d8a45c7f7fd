//! Time-stepping orchestration for unsteady panel-method runs.
//!
//! Provides:
//! - Startup `Configuration` loaded from optional YAML
//! - Built-in scenarios and their `SimulationCase` parameters
//! - Pure per-iteration kinematics (`PoseDelta`)
//! - `FlowBody` seam and the `FlowBodyContext` that owns surface, wake and solver
//! - `TimeStepper`: solve, convect, move, shed, finalize, once per iteration
//! - Output sinks: streaming force lines, batch pressure table, completion line

pub mod body;
pub mod config;
pub mod error;
pub mod kinematics;
pub mod orchestrator;
pub mod output;
pub mod runner;
pub mod scenario;

// Re-exports for public API
pub use body::{FlowBody, FlowBodyContext};
pub use config::Configuration;
pub use error::{SimError, SimResult};
pub use kinematics::{PoseDelta, evaluate};
pub use orchestrator::{IterationRecord, TimeStepper, run};
pub use output::{
    BatchSink, CompletionSink, OutputSink, PRESSURE_FILE, StreamingSink, format_general,
    format_scientific, make_sink,
};
pub use runner::{RunSummary, drive, run_case, run_scenario};
pub use scenario::{KinematicsLaw, OutputMode, Scenario, SimulationCase, select};

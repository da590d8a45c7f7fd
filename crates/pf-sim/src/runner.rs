//! Scenario driver: build the flow body, step it, hand records to the sink.

use std::io::Write;

use pf_core::Vec3;
use tracing::info;

use crate::body::{FlowBody, FlowBodyContext};
use crate::config::Configuration;
use crate::error::SimResult;
use crate::orchestrator::run;
use crate::output::{OutputSink, make_sink};
use crate::scenario::{SimulationCase, select};

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub case: &'static str,
    pub iterations: usize,
    pub final_force_coefficients: Vec3,
    /// Dimensional force of the last iteration, scaled by the case's fluid density.
    pub final_forces: Vec3,
}

/// Run the scenario selected by `config.test_case`.
///
/// An unrecognized id does nothing and returns `Ok(None)`.
pub fn run_scenario(config: &Configuration, out: &mut dyn Write) -> SimResult<Option<RunSummary>> {
    let Some(scenario) = select(config.test_case) else {
        return Ok(None);
    };
    info!(id = config.test_case, scenario = scenario.name(), "scenario selected");
    run_case(&scenario.case(), config, out).map(Some)
}

/// Run one case end to end with the sink its output mode calls for.
pub fn run_case(
    case: &SimulationCase,
    config: &Configuration,
    out: &mut dyn Write,
) -> SimResult<RunSummary> {
    let mut body = FlowBodyContext::prepare(case, config)?;
    let mut sink = make_sink(case.output_mode, &config.output_dir, out);
    drive(case, &mut body, sink.as_mut())
}

/// Step `body` through every iteration of `case`, forwarding to `sink`.
///
/// The first failing iteration aborts the run.
pub fn drive<B, S>(case: &SimulationCase, body: &mut B, sink: &mut S) -> SimResult<RunSummary>
where
    B: FlowBody,
    S: OutputSink + ?Sized,
{
    info!(
        case = case.name,
        iterations = case.iteration_count,
        dt = case.dt(),
        "run started"
    );
    sink.begin(&*body)?;

    let mut iterations = 0;
    for record in run(case, body).with_panel_fields(sink.wants_panel_fields()) {
        let record = record?;
        sink.record(&record)?;
        iterations += 1;
    }

    sink.finish(&*body)?;
    let summary = RunSummary {
        case: case.name,
        iterations,
        final_force_coefficients: body.body_force_coefficients(),
        final_forces: body.body_forces(),
    };
    info!(
        case = case.name,
        iterations,
        cf = ?summary.final_force_coefficients,
        force_n = ?summary.final_forces,
        "run finished"
    );
    Ok(summary)
}

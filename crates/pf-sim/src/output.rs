//! Console and file output of a run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pf_core::{Real, Vec3};
use tracing::info;

use crate::body::FlowBody;
use crate::error::{SimError, SimResult};
use crate::orchestrator::IterationRecord;
use crate::scenario::OutputMode;

/// File name of the batch pressure table inside the output directory.
pub const PRESSURE_FILE: &str = "pressure_data.csv";

const COMPLETION_LINE: &str = "Exiting program.";

/// Receives a run's lifecycle: before the first iteration, per iteration, after the last.
pub trait OutputSink {
    /// Whether records should carry per-panel pressure and coordinates.
    fn wants_panel_fields(&self) -> bool {
        false
    }

    fn begin(&mut self, _body: &dyn FlowBody) -> SimResult<()> {
        Ok(())
    }

    fn record(&mut self, _record: &IterationRecord) -> SimResult<()> {
        Ok(())
    }

    fn finish(&mut self, _body: &dyn FlowBody) -> SimResult<()> {
        Ok(())
    }
}

/// Build the sink for `mode`, writing console lines to `out`.
pub fn make_sink<'a, W: Write + 'a>(
    mode: OutputMode,
    output_dir: &Path,
    out: W,
) -> Box<dyn OutputSink + 'a> {
    match mode {
        OutputMode::Streaming => Box::new(StreamingSink::new(out)),
        OutputMode::Batch => Box::new(BatchSink::new(output_dir, out)),
        OutputMode::Completion => Box::new(CompletionSink::new(out)),
    }
}

/// Prints the body force coefficients after every iteration.
#[derive(Debug)]
pub struct StreamingSink<W> {
    out: W,
}

impl<W: Write> StreamingSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> OutputSink for StreamingSink<W> {
    fn record(&mut self, record: &IterationRecord) -> SimResult<()> {
        writeln!(
            self.out,
            "Body Force Coefficients = {}",
            format_vector(&record.body_force_coefficients)
        )?;
        Ok(())
    }
}

/// Writes collocation points (taken before any motion) with the final pressure coefficients.
#[derive(Debug)]
pub struct BatchSink<W> {
    path: PathBuf,
    out: W,
    points: Vec<Vec3>,
    pressure: Option<Vec<Real>>,
}

impl<W: Write> BatchSink<W> {
    pub fn new(output_dir: &Path, out: W) -> Self {
        Self {
            path: output_dir.join(PRESSURE_FILE),
            out,
            points: Vec::new(),
            pressure: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<W: Write> OutputSink for BatchSink<W> {
    fn wants_panel_fields(&self) -> bool {
        true
    }

    fn begin(&mut self, body: &dyn FlowBody) -> SimResult<()> {
        self.points = body.collocation_points();
        Ok(())
    }

    fn record(&mut self, record: &IterationRecord) -> SimResult<()> {
        if let Some(cp) = &record.pressure_coefficients {
            self.pressure = Some(cp.clone());
        }
        Ok(())
    }

    fn finish(&mut self, body: &dyn FlowBody) -> SimResult<()> {
        let cp = self
            .pressure
            .as_deref()
            .unwrap_or_else(|| body.pressure_coefficients());
        let panels = body.panel_count();
        if cp.len() != panels || self.points.len() != panels {
            return Err(SimError::InvalidArg {
                what: "pressure coefficient count differs from collocation point snapshot",
            });
        }
        write_pressure_table(&self.path, &self.points, cp)?;
        info!(path = %self.path.display(), rows = cp.len(), "wrote pressure table");
        writeln!(self.out, "{COMPLETION_LINE}")?;
        Ok(())
    }
}

/// Prints only the completion line.
#[derive(Debug)]
pub struct CompletionSink<W> {
    out: W,
}

impl<W: Write> CompletionSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> OutputSink for CompletionSink<W> {
    fn finish(&mut self, _body: &dyn FlowBody) -> SimResult<()> {
        writeln!(self.out, "{COMPLETION_LINE}")?;
        Ok(())
    }
}

/// Write the `x,y,z,cp` table; the file is closed on every return path.
fn write_pressure_table(path: &Path, points: &[Vec3], cp: &[Real]) -> SimResult<()> {
    let output_err = |source: std::io::Error| SimError::Output {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(output_err)?;
    }
    let file = File::create(path).map_err(output_err)?;
    let mut w = BufWriter::new(file);

    writeln!(w, "x,y,z,cp").map_err(output_err)?;
    for (p, c) in points.iter().zip(cp) {
        writeln!(
            w,
            "{},{},{},{}",
            format_scientific(p.x),
            format_scientific(p.y),
            format_scientific(p.z),
            format_scientific(*c)
        )
        .map_err(output_err)?;
    }
    w.flush().map_err(output_err)
}

/// Six-digit scientific notation with a signed, two-digit exponent: `1.234560e+00`.
pub fn format_scientific(v: Real) -> String {
    if !v.is_finite() {
        return non_finite(v);
    }
    let s = format!("{v:.6e}");
    let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!("{mantissa}e{}", signed_exponent(exponent))
}

/// Shortest form with six significant digits, as a default-formatted C++ stream prints.
pub fn format_general(v: Real) -> String {
    if !v.is_finite() {
        return non_finite(v);
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let s = format!("{v:.5e}");
    let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if !(-4..6).contains(&exponent) {
        format!("{}e{}", trim_fraction(mantissa), signed_exponent(exponent))
    } else {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{v:.decimals$}")).to_string()
    }
}

fn format_vector(v: &Vec3) -> String {
    format!(
        "({}, {}, {})",
        format_general(v.x),
        format_general(v.y),
        format_general(v.z)
    )
}

fn signed_exponent(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{:02}", exponent.abs())
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn non_finite(v: Real) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}

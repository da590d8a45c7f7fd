//! Per-iteration visualization hook.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pf_core::{Real, Vec3};
use pf_mesh::Surface;
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::wake::Wake;

/// Surface fields committed at the end of an iteration.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceFields<'a> {
    pub surface: &'a Surface,
    pub doublet: &'a [Real],
    pub source: &'a [Real],
    pub pressure: &'a [Real],
    /// Surface velocity at each collocation point.
    pub velocity: &'a [Vec3],
}

/// Receives the solved state once per iteration.
pub trait SolverLogger: Send {
    fn log_iteration(
        &mut self,
        iteration: usize,
        fields: &SurfaceFields<'_>,
        wake: &Wake,
    ) -> SolverResult<()>;
}

/// Logger that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl SolverLogger for NullLogger {
    fn log_iteration(&mut self, _: usize, _: &SurfaceFields<'_>, _: &Wake) -> SolverResult<()> {
        Ok(())
    }
}

/// Legacy ASCII VTK writer: `<dir>/<name>_<iter>.vtk` and `<dir>/wake_<iter>.vtk`.
#[derive(Debug, Clone)]
pub struct VtkWriter {
    dir: PathBuf,
    name: String,
}

impl VtkWriter {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn surface_path(&self, iteration: usize) -> PathBuf {
        self.dir.join(format!("{}_{iteration:04}.vtk", self.name))
    }

    pub fn wake_path(&self, iteration: usize) -> PathBuf {
        self.dir.join(format!("wake_{iteration:04}.vtk"))
    }
}

impl SolverLogger for VtkWriter {
    fn log_iteration(
        &mut self,
        iteration: usize,
        fields: &SurfaceFields<'_>,
        wake: &Wake,
    ) -> SolverResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SolverError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let surface = fields.surface;
        let polygons: Vec<Vec<usize>> = (0..surface.n_panels())
            .map(|p| surface.panel_nodes(p).to_vec())
            .collect();
        let path = self.surface_path(iteration);
        write_polydata(
            &path,
            &self.name,
            surface.nodes(),
            &polygons,
            &[
                ("doublet", fields.doublet),
                ("source", fields.source),
                ("cp", fields.pressure),
            ],
            &[("velocity", fields.velocity)],
        )?;

        let panels = wake.panels();
        let mut points = Vec::with_capacity(4 * panels.len());
        let mut quads: Vec<Vec<usize>> = Vec::with_capacity(panels.len());
        for panel in &panels {
            let start = points.len();
            points.extend_from_slice(&panel.corners);
            quads.push((start..start + 4).collect());
        }
        let strengths: Vec<Real> = panels.iter().map(|p| p.strength).collect();
        write_polydata(
            &self.wake_path(iteration),
            "wake",
            &points,
            &quads,
            &[("doublet", strengths.as_slice())],
            &[],
        )?;

        debug!(iteration, path = %path.display(), "wrote VTK snapshot");
        Ok(())
    }
}

fn write_polydata(
    path: &Path,
    title: &str,
    points: &[Vec3],
    polygons: &[Vec<usize>],
    cell_scalars: &[(&str, &[Real])],
    cell_vectors: &[(&str, &[Vec3])],
) -> SolverResult<()> {
    let io_err = |source: std::io::Error| SolverError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);

    let size: usize = polygons.iter().map(|p| p.len() + 1).sum();
    let mut body = format!("# vtk DataFile Version 3.0\n{title}\nASCII\nDATASET POLYDATA\n");
    body.push_str(&format!("POINTS {} double\n", points.len()));
    for p in points {
        body.push_str(&format!("{} {} {}\n", p.x, p.y, p.z));
    }
    body.push_str(&format!("POLYGONS {} {size}\n", polygons.len()));
    for poly in polygons {
        let ids: Vec<String> = poly.iter().map(usize::to_string).collect();
        body.push_str(&format!("{} {}\n", poly.len(), ids.join(" ")));
    }
    if !polygons.is_empty() {
        body.push_str(&format!("CELL_DATA {}\n", polygons.len()));
        for (name, values) in cell_scalars {
            body.push_str(&format!("SCALARS {name} double 1\nLOOKUP_TABLE default\n"));
            for v in values.iter() {
                body.push_str(&format!("{v}\n"));
            }
        }
        for (name, values) in cell_vectors {
            body.push_str(&format!("VECTORS {name} double\n"));
            for v in values.iter() {
                body.push_str(&format!("{} {} {}\n", v.x, v.y, v.z));
            }
        }
    }

    out.write_all(body.as_bytes()).map_err(io_err)?;
    out.flush().map_err(io_err)
}

//! PLOT3D structured-grid reader.
//!
//! Accepts the ASCII multi-block surface format: block count, `ni nj nk` per
//! block, then for each block every x, every y and every z with `i` varying
//! fastest. Only surface blocks (`nk = 1`) are supported.

use std::path::Path;
use std::str::SplitWhitespace;

use pf_core::{Real, Vec3};
use tracing::{debug, info, warn};

use crate::builder::{SurfaceBuilder, bounding_diagonal, distinct_corners};
use crate::error::{MeshError, MeshResult};
use crate::panel::PanelGeometry;
use crate::surface::{Surface, TrailingEdgeStrip};

/// Read a PLOT3D surface grid from disk.
pub fn read_plot3d(path: &Path) -> MeshResult<Surface> {
    let text = std::fs::read_to_string(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let surface = parse_plot3d(&text)?;
    info!(
        path = %path.display(),
        panels = surface.n_panels(),
        trailing_edges = surface.trailing_edges().len(),
        "mesh loaded"
    );
    Ok(surface)
}

/// Parse PLOT3D text into a surface.
pub fn parse_plot3d(text: &str) -> MeshResult<Surface> {
    let mut tokens = Tokens(text.split_whitespace());

    let n_blocks = tokens.next_usize("block count")?;
    if n_blocks == 0 {
        return Err(MeshError::Parse {
            what: "block count is zero".to_string(),
        });
    }

    let mut dims = Vec::new();
    for b in 0..n_blocks {
        let ni = tokens.next_usize("ni")?;
        let nj = tokens.next_usize("nj")?;
        let nk = tokens.next_usize("nk")?;
        if nk != 1 {
            return Err(MeshError::Unsupported {
                what: format!("block {b} has nk = {nk}; only surface grids are supported"),
            });
        }
        if ni < 2 || nj < 2 {
            return Err(MeshError::Unsupported {
                what: format!("block {b} is {ni} x {nj}; need at least 2 x 2 nodes"),
            });
        }
        let node_count = ni.checked_mul(nj).ok_or_else(|| MeshError::Parse {
            what: format!("block {b} dimensions {ni} x {nj} overflow"),
        })?;
        dims.push((ni, nj, node_count));
    }

    let mut builder = SurfaceBuilder::new();
    let mut dropped = 0usize;
    for (b, &(ni, nj, n)) in dims.iter().enumerate() {
        // Sized by the tokens actually present, not by the header.
        let mut xs = Vec::new();
        for _ in 0..n {
            xs.push(tokens.next_real("x coordinate")?);
        }
        let mut coords = Vec::new();
        for &x in &xs {
            coords.push(Vec3::new(x, tokens.next_real("y coordinate")?, 0.0));
        }
        for c in coords.iter_mut() {
            c.z = tokens.next_real("z coordinate")?;
        }
        dropped += add_block(&mut builder, b, ni, nj, &coords);
    }

    if dropped > 0 {
        warn!(dropped, "dropped degenerate panels from PLOT3D grid");
    }
    builder.build()
}

/// Append one block's nodes, panels and trailing edge; returns the number of dropped panels.
fn add_block(
    builder: &mut SurfaceBuilder,
    block: usize,
    ni: usize,
    nj: usize,
    coords: &[Vec3],
) -> usize {
    let base: Vec<usize> = coords.iter().map(|p| builder.add_node(*p)).collect();
    let local = |i: usize, j: usize| i + j * ni;
    let pos = |i: usize, j: usize| coords[local(i, j)];

    let tol = 1e-8 * bounding_diagonal(coords).max(Real::MIN_POSITIVE);

    let mut panel_at: Vec<Option<usize>> = vec![None; (ni - 1) * (nj - 1)];
    let mut dropped = 0;
    for j in 0..nj - 1 {
        for i in 0..ni - 1 {
            let quad = [local(i, j), local(i + 1, j), local(i + 1, j + 1), local(i, j + 1)];
            let distinct = distinct_corners(&quad, coords, tol);
            let corners: Vec<Vec3> = distinct.iter().map(|&n| coords[n]).collect();
            if distinct.len() < 3 || PanelGeometry::from_corners(&corners).is_none() {
                dropped += 1;
                continue;
            }
            let global: Vec<usize> = distinct.iter().map(|&n| base[n]).collect();
            panel_at[i + j * (ni - 1)] = Some(builder.add_panel(&global));
        }
    }

    let closed = ni >= 3 && (0..nj).all(|j| (pos(0, j) - pos(ni - 1, j)).norm() <= tol);
    if !closed {
        debug!(block, "block sections are open; no trailing edge");
        return dropped;
    }

    let mut strip: Option<TrailingEdgeStrip> = None;
    for j in 0..nj - 1 {
        let lower = panel_at[j * (ni - 1)];
        let upper = panel_at[(ni - 2) + j * (ni - 1)];
        let edge_ok = (pos(0, j) - pos(0, j + 1)).norm() > tol;
        match (lower, upper, edge_ok) {
            (Some(lower), Some(upper), true) => {
                let s = strip.get_or_insert_with(|| TrailingEdgeStrip {
                    nodes: vec![base[local(0, j)]],
                    upper: Vec::new(),
                    lower: Vec::new(),
                });
                s.nodes.push(base[local(0, j + 1)]);
                s.upper.push(upper);
                s.lower.push(lower);
            }
            _ => {
                if let Some(s) = strip.take() {
                    builder.add_trailing_edge(s);
                }
            }
        }
    }
    if let Some(s) = strip.take() {
        builder.add_trailing_edge(s);
    }
    dropped
}

struct Tokens<'a>(SplitWhitespace<'a>);

impl Tokens<'_> {
    fn next_token(&mut self, what: &str) -> MeshResult<&str> {
        self.0.next().ok_or_else(|| MeshError::Parse {
            what: format!("unexpected end of file while reading {what}"),
        })
    }

    fn next_usize(&mut self, what: &str) -> MeshResult<usize> {
        let tok = self.next_token(what)?;
        tok.parse().map_err(|_| MeshError::Parse {
            what: format!("invalid {what}: {tok:?}"),
        })
    }

    fn next_real(&mut self, what: &str) -> MeshResult<Real> {
        let tok = self.next_token(what)?;
        let v: Real = tok.parse().map_err(|_| MeshError::Parse {
            what: format!("invalid {what}: {tok:?}"),
        })?;
        pf_core::ensure_finite(v, "PLOT3D coordinate")?;
        Ok(v)
    }
}

//! Boundary-hole repair.
//!
//! [`fill_holes`] closes every hole of a mesh in place:
//!
//! 1. [`find_boundary_loops`] groups the boundary half-edges into loops
//! 2. each loop is checked ([`BoundaryLoop::check_manifold`]) and, if a size
//!    limit is set, measured against it
//! 3. [`sample_loop`] snapshots the corner positions and rim normals
//! 4. [`are_coplanar`] classifies the outline (reported, never acted on)
//! 5. [`close_loop`] inserts the faces
//! 6. deleted elements are garbage collected
//!
//! A failure in one loop is recorded in that loop's [`HoleReport`] and does
//! not stop the others.
//!
//! # Example
//!
//! ```
//! use caulk::prelude::*;
//! use caulk::algo::repair::{fill_holes, FillOptions};
//! use nalgebra::Point3;
//!
//! // Tetrahedron with its bottom face missing.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let faces = vec![[0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let report = fill_holes(&mut mesh, &FillOptions::default()).unwrap();
//! assert_eq!(report.holes_filled(), 1);
//! assert!(mesh.is_closed());
//! ```

mod boundary;
mod ear_clip;
mod planar;
mod sample;

pub use boundary::{find_boundary_loops, BoundaryLoop};
pub use ear_clip::{close_loop, ClosedLoop, Closure};
pub use planar::{are_coplanar, DEFAULT_PLANAR_TOLERANCE};
pub use sample::{sample_loop, LoopPoint};

use crate::algo::diagnostics::{Diagnostics, NoDiagnostics};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Options for hole filling.
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Distance tolerance for the coplanarity classification.
    pub planar_tolerance: f64,

    /// Skip holes with more boundary edges than this.
    pub max_hole_size: Option<usize>,

    /// Compact the mesh storage once all holes are processed.
    pub collect_garbage: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            planar_tolerance: DEFAULT_PLANAR_TOLERANCE,
            max_hole_size: None,
            collect_garbage: true,
        }
    }
}

impl FillOptions {
    /// Set the coplanarity tolerance.
    pub fn with_planar_tolerance(mut self, tolerance: f64) -> Self {
        self.planar_tolerance = tolerance;
        self
    }

    /// Limit the size of holes that get filled.
    pub fn with_max_hole_size(mut self, max: usize) -> Self {
        self.max_hole_size = Some(max);
        self
    }

    /// Enable or disable the final garbage collection.
    pub fn with_collect_garbage(mut self, collect: bool) -> Self {
        self.collect_garbage = collect;
        self
    }

    /// Check that the option values make sense.
    pub fn validate(&self) -> Result<()> {
        if !self.planar_tolerance.is_finite() || self.planar_tolerance < 0.0 {
            return Err(MeshError::invalid_param(
                "planar_tolerance",
                self.planar_tolerance,
                "must be finite and non-negative",
            ));
        }
        if let Some(max) = self.max_hole_size {
            if max < 3 {
                return Err(MeshError::invalid_param(
                    "max_hole_size",
                    max,
                    "must be at least 3",
                ));
            }
        }
        Ok(())
    }
}

/// What happened to one hole.
#[derive(Debug)]
pub struct HoleReport {
    /// Number of boundary edges around the hole.
    pub boundary_len: usize,

    /// Coplanarity of the outline; `None` when the hole was rejected before
    /// its geometry was sampled.
    pub coplanar: Option<bool>,

    /// How the hole was closed, or why it was not.
    pub outcome: std::result::Result<Closure, MeshError>,

    /// Faces inserted for this hole, including any left by a failed attempt.
    pub faces_added: usize,
}

impl HoleReport {
    /// Whether the hole was closed.
    pub fn is_filled(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Summary of a [`fill_holes`] run.
#[derive(Debug, Default)]
pub struct FillReport {
    /// One entry per boundary loop, in discovery order.
    pub holes: Vec<HoleReport>,
}

impl FillReport {
    /// Number of boundary loops found.
    pub fn holes_found(&self) -> usize {
        self.holes.len()
    }

    /// Number of loops that were closed.
    pub fn holes_filled(&self) -> usize {
        self.holes.iter().filter(|h| h.is_filled()).count()
    }

    /// Number of loops closed by the fan fallback.
    pub fn fallback_count(&self) -> usize {
        self.holes
            .iter()
            .filter(|h| matches!(h.outcome, Ok(c) if c.is_fallback()))
            .count()
    }

    /// Total number of faces inserted.
    pub fn faces_added(&self) -> usize {
        self.holes.iter().map(|h| h.faces_added).sum()
    }
}

/// Fill all holes of a mesh in place.
pub fn fill_holes<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, options: &FillOptions) -> Result<FillReport> {
    fill_holes_with_diagnostics(mesh, options, &mut NoDiagnostics)
}

/// Fill all holes, reporting skipped holes and fallback fans to `diagnostics`.
pub fn fill_holes_with_diagnostics<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &FillOptions,
    diagnostics: &mut dyn Diagnostics,
) -> Result<FillReport> {
    options.validate()?;
    Ok(run(mesh, options, diagnostics))
}

/// The pipeline proper; `options` must already be validated.
pub(crate) fn run<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &FillOptions,
    diagnostics: &mut dyn Diagnostics,
) -> FillReport {
    let loops = find_boundary_loops(mesh);
    diagnostics.add(&format!("found {} hole(s)", loops.len()));

    let mut report = FillReport {
        holes: Vec::with_capacity(loops.len()),
    };

    for (index, hole) in loops.iter().enumerate() {
        let faces_before = mesh.num_faces();
        let (coplanar, outcome) = repair_loop(mesh, hole, options);

        match &outcome {
            Ok(Closure::FallbackFan { ears, residual }) => {
                log::warn!(
                    "hole {}: no ear among {} remaining corners, closed with a fan",
                    index,
                    residual
                );
                diagnostics.add(&format!(
                    "hole {}: closed by fallback fan after {} ear(s), {} corners fanned; \
                     triangulation may be invalid",
                    index, ears, residual
                ));
            }
            Ok(closure) => {
                log::debug!("hole {}: {:?}", index, closure);
            }
            Err(err) => {
                log::warn!("hole {} skipped: {}", index, err);
                diagnostics.add(&format!("hole {} skipped: {}", index, err));
            }
        }

        report.holes.push(HoleReport {
            boundary_len: hole.len(),
            coplanar,
            outcome,
            faces_added: mesh.num_faces() - faces_before,
        });
    }

    if options.collect_garbage {
        mesh.garbage_collection();
    }

    diagnostics.add(&format!(
        "filled {} of {} hole(s) with {} face(s)",
        report.holes_filled(),
        report.holes_found(),
        report.faces_added()
    ));
    report
}

fn repair_loop<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    hole: &BoundaryLoop<I>,
    options: &FillOptions,
) -> (Option<bool>, Result<Closure>) {
    if let Err(err) = hole.check_manifold(mesh) {
        return (None, Err(err));
    }

    if let Some(max) = options.max_hole_size {
        if hole.len() > max {
            return (
                None,
                Err(MeshError::HoleTooLarge {
                    size: hole.len(),
                    max,
                }),
            );
        }
    }

    let points = sample_loop(mesh, hole);
    let positions: Vec<_> = points.iter().map(|p| p.position).collect();
    let coplanar = are_coplanar(&positions, options.planar_tolerance);

    let outcome = close_loop(mesh, &points).map(|closed| closed.closure);
    (Some(coplanar), outcome)
}

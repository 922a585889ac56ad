//! Hole triangulation by ear clipping with a fan fallback.
//!
//! The working list is scanned from its start for three consecutive corners
//! `(p[i], p[i+1], p[i+2])` whose turn runs against the normal of the
//! surface next to `p[i]`. Clipping such an ear at center `c = p[i+1]` adds
//! two faces, `(pred(p[i]), p[i], c)` and `(c, p[i+2], succ(p[i+2]))`, and
//! removes `p[i]` and `p[i+2]` from the list; the scan then restarts. Every
//! clip shrinks the list by two, so the scan runs at most `len / 2` times.
//!
//! Whatever is left when no ear is found is closed with a fan from the first
//! remaining corner. A residue of more than three corners is reported as
//! [`Closure::FallbackFan`]: the fan always closes the hole topologically but
//! may fold over itself when the residue is not convex.

use super::sample::LoopPoint;
use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex};

/// How a hole was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closure {
    /// Three corners, closed by a single face.
    Triangle,

    /// Ear clipping reduced the hole to at most one triangle.
    EarClipped {
        /// Number of ears clipped.
        ears: usize,
    },

    /// Ear clipping stopped early and the remaining corners were fanned.
    FallbackFan {
        /// Number of ears clipped before giving up.
        ears: usize,
        /// Corners left for the fan.
        residual: usize,
    },
}

impl Closure {
    /// Whether the fan fallback was needed.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Closure::FallbackFan { .. })
    }
}

/// Result of closing one loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedLoop<I: MeshIndex = u32> {
    /// How the loop was closed.
    pub closure: Closure,

    /// Faces added, in insertion order.
    pub faces: Vec<FaceId<I>>,
}

/// Close a hole given its corners in loop order.
///
/// A trailing point repeating the first vertex is dropped. Faces inserted
/// before a failing insertion stay in the mesh.
///
/// # Errors
/// [`MeshError::InsufficientPoints`] for fewer than three distinct corners;
/// any error from [`HalfEdgeMesh::add_face`].
pub fn close_loop<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    points: &[LoopPoint<I>],
) -> Result<ClosedLoop<I>> {
    let mut points = points.to_vec();
    if points.len() > 1 && points.first().map(|p| p.vertex) == points.last().map(|p| p.vertex) {
        points.pop();
    }

    if points.len() < 3 {
        return Err(MeshError::InsufficientPoints {
            required: 3,
            actual: points.len(),
        });
    }

    let mut faces = Vec::with_capacity(points.len() - 2);

    if points.len() == 3 {
        faces.push(mesh.add_triangle(points[0].vertex, points[1].vertex, points[2].vertex)?);
        return Ok(ClosedLoop {
            closure: Closure::Triangle,
            faces,
        });
    }

    let mut ears = 0;
    while let Some(i) = find_ear(&points) {
        clip_ear(mesh, &mut points, i, &mut faces)?;
        ears += 1;
        if i + 3 >= points.len() {
            break;
        }
    }

    let residual = points.len();
    for j in 1..residual.saturating_sub(1) {
        faces.push(mesh.add_triangle(points[0].vertex, points[j].vertex, points[j + 1].vertex)?);
    }

    let closure = if residual > 3 {
        Closure::FallbackFan { ears, residual }
    } else {
        Closure::EarClipped { ears }
    };
    log::debug!("closed loop: {:?}, {} face(s)", closure, faces.len());

    Ok(ClosedLoop { closure, faces })
}

/// First `i` whose triple turns against the surface normal at `p[i]`.
fn find_ear<I: MeshIndex>(points: &[LoopPoint<I>]) -> Option<usize> {
    (0..points.len().saturating_sub(2)).find(|&i| {
        let [p1, p2, p3] = [&points[i], &points[i + 1], &points[i + 2]];
        let turn = (p2.position - p1.position)
            .cross(&(p3.position - p2.position))
            .dot(&p1.normal);
        log::trace!("corner {:?}: turn {}", p2.vertex, turn);
        turn < 0.0
    })
}

fn clip_ear<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    points: &mut Vec<LoopPoint<I>>,
    i: usize,
    faces: &mut Vec<FaceId<I>>,
) -> Result<()> {
    let len = points.len();
    let center = i + 1;

    let prev2 = if i == 0 { points[len - 1].vertex } else { points[i - 1].vertex };
    let next2 = if i + 3 >= len { points[0].vertex } else { points[i + 3].vertex };

    faces.push(mesh.add_triangle(prev2, points[i].vertex, points[center].vertex)?);
    faces.push(mesh.add_triangle(points[center].vertex, points[center + 1].vertex, next2)?);

    points.remove(center + 1);
    points.remove(center - 1);
    Ok(())
}

//! Boundary loop extraction.
//!
//! Groups every boundary half-edge of a mesh into ordered loops, one per
//! hole. Each loop runs in the direction a face closing the hole would use.

use std::collections::HashSet;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// An ordered cycle of boundary half-edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop<I: MeshIndex = u32> {
    /// Half-edges in walk order; each one starts where the previous ends.
    pub halfedges: Vec<HalfEdgeId<I>>,

    /// Whether the walk came back to its first half-edge.
    pub closed: bool,
}

impl<I: MeshIndex> BoundaryLoop<I> {
    /// Number of boundary edges in the loop.
    pub fn len(&self) -> usize {
        self.halfedges.len()
    }

    /// Whether the loop has no half-edges.
    pub fn is_empty(&self) -> bool {
        self.halfedges.is_empty()
    }

    /// Destination vertices of the loop's half-edges, in order.
    pub fn vertices<'a>(&'a self, mesh: &'a HalfEdgeMesh<I>) -> impl Iterator<Item = VertexId<I>> + 'a {
        self.halfedges.iter().map(move |&he| mesh.dest(he))
    }

    /// Check that the loop can be closed with faces.
    ///
    /// Rejects open walks, loops of fewer than three edges, and loops that
    /// pass through a vertex twice or through a vertex with more than one
    /// outgoing boundary half-edge.
    pub fn check_manifold(&self, mesh: &HalfEdgeMesh<I>) -> Result<()> {
        if !self.closed {
            return Err(MeshError::OpenBoundary {
                halfedge: self.halfedges.first().map_or(usize::MAX, |he| he.index()),
            });
        }

        if self.len() < 3 {
            return Err(MeshError::InsufficientPoints {
                required: 3,
                actual: self.len(),
            });
        }

        let mut visited = HashSet::with_capacity(self.len());
        for v in self.vertices(mesh) {
            if !visited.insert(v) {
                return Err(MeshError::NonManifoldBoundary { vertex: v.index() });
            }

            let boundary_out = mesh
                .vertex_halfedges(v)
                .filter(|&he| mesh.is_boundary_halfedge(he))
                .count();
            if boundary_out > 1 {
                return Err(MeshError::NonManifoldBoundary { vertex: v.index() });
            }
        }

        Ok(())
    }
}

/// Find all boundary loops of a mesh.
///
/// Every live boundary half-edge ends up in exactly one loop. A closed mesh
/// yields an empty vector.
pub fn find_boundary_loops<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<BoundaryLoop<I>> {
    let mut seen: HashSet<HalfEdgeId<I>> = HashSet::new();
    let mut loops = Vec::new();

    for seed in mesh.halfedge_ids() {
        if !mesh.is_boundary_halfedge(seed) || seen.contains(&seed) {
            continue;
        }
        loops.push(walk_loop(mesh, seed, &mut seen));
    }

    log::debug!("found {} boundary loop(s)", loops.len());
    loops
}

fn walk_loop<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    seed: HalfEdgeId<I>,
    seen: &mut HashSet<HalfEdgeId<I>>,
) -> BoundaryLoop<I> {
    let mut halfedges = vec![seed];
    seen.insert(seed);

    let mut he = seed;
    loop {
        let Some(next) = next_boundary(mesh, he) else {
            break;
        };
        if next == seed {
            return BoundaryLoop {
                halfedges,
                closed: true,
            };
        }
        if !seen.insert(next) {
            break;
        }
        halfedges.push(next);
        he = next;
    }

    log::warn!(
        "boundary walk from {:?} did not return to its start after {} edge(s)",
        seed,
        halfedges.len()
    );
    BoundaryLoop {
        halfedges,
        closed: false,
    }
}

/// The boundary half-edge following `he` around its hole.
///
/// Rotates around the destination vertex until a boundary half-edge is
/// found; `None` if the rotation comes back without finding one.
fn next_boundary<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, he: HalfEdgeId<I>) -> Option<HalfEdgeId<I>> {
    let start = mesh.next(he);
    if !start.is_valid() {
        return None;
    }

    let mut candidate = start;
    let mut steps = 0;
    while !mesh.is_boundary_halfedge(candidate) {
        candidate = mesh.next(candidate.opposite());
        steps += 1;
        if candidate == start || steps > mesh.halfedges.len() {
            return None;
        }
    }
    Some(candidate)
}

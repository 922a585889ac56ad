//! Geometry snapshots of boundary loops.

use nalgebra::{Point3, Vector3};

use super::boundary::BoundaryLoop;
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// One corner of a hole, captured before any faces are added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopPoint<I: MeshIndex = u32> {
    /// Position of the corner vertex.
    pub position: Point3<f64>,

    /// Normal of the existing face along the incoming boundary edge, or the
    /// zero vector when there is none.
    pub normal: Vector3<f64>,

    /// The corner vertex.
    pub vertex: VertexId<I>,
}

/// Snapshot the destination vertex of every half-edge in a loop.
///
/// The result has the same length and order as the loop.
pub fn sample_loop<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, hole: &BoundaryLoop<I>) -> Vec<LoopPoint<I>> {
    hole.halfedges
        .iter()
        .map(|&he| {
            let vertex = mesh.dest(he);
            let face = mesh.face_of(he.opposite());
            let normal = if face.is_valid() {
                mesh.face_normal(face)
            } else {
                Vector3::zeros()
            };

            LoopPoint {
                position: *mesh.position(vertex),
                normal,
                vertex,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::repair::boundary::find_boundary_loops;
    use crate::algo::repair::tests::closed_bowl;

    #[test]
    fn test_samples_follow_loop() {
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let mesh = closed_bowl(&square);
        let hole = &find_boundary_loops(&mesh)[0];

        let points = sample_loop(&mesh, hole);

        assert_eq!(points.len(), hole.len());
        for (p, &he) in points.iter().zip(&hole.halfedges) {
            assert_eq!(p.vertex, mesh.dest(he));
            assert_eq!(p.position, *mesh.position(p.vertex));
            // The rim of the bowl faces up.
            assert!((p.normal - Vector3::z()).norm() < 1e-12);
        }
    }

    #[test]
    fn test_missing_face_gives_zero_normal() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(a, b, c).unwrap();

        // A loop made of the face's own half-edges has no face across.
        let inner = BoundaryLoop {
            halfedges: vec![
                mesh.find_halfedge(b, a).unwrap().opposite(),
                mesh.find_halfedge(c, b).unwrap().opposite(),
            ],
            closed: true,
        };
        let points = sample_loop(&mesh, &inner);
        assert_eq!(points[0].vertex, b);
        assert_eq!(points[0].normal, Vector3::zeros());
    }
}

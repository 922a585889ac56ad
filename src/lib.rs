//! # Caulk
//!
//! Boundary-hole repair for triangle meshes.
//!
//! Caulk stores meshes in a half-edge structure, finds every hole (a closed
//! loop of boundary half-edges), and closes each one with new triangles by
//! ear clipping the hole outline.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Multiple file formats**: OBJ, STL, PLY
//! - **Hole filling**: boundary loop extraction and ear-clip triangulation
//! - **Render export**: interleaved position/normal/texture buffers, with or
//!   without an index buffer
//!
//! ## Quick Start
//!
//! ```no_run
//! use caulk::prelude::*;
//!
//! let mut session = RepairSession::new();
//! session.read("scan.obj").unwrap();
//!
//! let report = session.fill_hole();
//! println!("{} hole(s) filled", report.holes_filled());
//!
//! session.export_to_obj("repaired.obj").unwrap();
//! ```
//!
//! ## Working on a Mesh Directly
//!
//! ```
//! use caulk::prelude::*;
//! use nalgebra::Point3;
//!
//! // A tetrahedron with its bottom face missing.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![
//!     [0, 1, 3], // front
//!     [1, 2, 3], // right
//!     [2, 0, 3], // left
//! ];
//!
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(find_boundary_loops(&mesh).len(), 1);
//!
//! let report = fill_holes(&mut mesh, &FillOptions::default()).unwrap();
//! assert_eq!(report.faces_added(), 1);
//! assert!(mesh.is_closed());
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use caulk::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.5, 1.0, 0.0),
//! # ];
//! # let faces = vec![[0, 1, 2]];
//! # let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! let v = VertexId::new(0);
//! for neighbor in mesh.vertex_neighbors(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! let f = FaceId::new(0);
//! let [v0, v1, v2] = mesh.face_triangle(f);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;
pub mod session;

/// Prelude module for convenient imports.
///
/// ```
/// use caulk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::diagnostics::{Diagnostics, LogDiagnostics, NoDiagnostics};
    pub use crate::algo::repair::{
        fill_holes, fill_holes_with_diagnostics, find_boundary_loops, Closure, FillOptions,
        FillReport,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, export_data, export_data_vi, to_face_vertex, ExportVertex, Face,
        FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
    pub use crate::session::{MeshCheck, RepairSession};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            [0, 2, 1], // bottom
            [0, 1, 3], // front
            [1, 2, 3], // right
            [2, 0, 3], // left
        ];

        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());
        assert!(find_boundary_loops(&mesh).is_empty());

        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v), "vertex {:?} should not be on boundary", v);
        }
    }
}

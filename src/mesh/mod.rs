//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation that the repair
//! pipeline operates on, plus conversions to and from flat buffers.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], a triangle mesh stored as a
//! half-edge (doubly-connected edge list) structure. Boundary half-edges are
//! explicit and linked into cycles, so every hole can be walked directly.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe handles:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! These handles are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use caulk::mesh::{HalfEdgeMesh, build_from_triangles};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_boundary_halfedges(), 3);
//! ```

mod builder;
mod export;
mod halfedge;
mod index;

pub use builder::{
    build_from_polygons, build_from_polygons_lenient, build_from_triangles,
    build_from_triangles_with_tex_coords, to_face_vertex,
};
pub use export::{
    as_bytes, build_from_buffers, export_data, export_data_into, export_data_vi, ExportVertex,
};
pub use halfedge::{
    Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter,
};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};

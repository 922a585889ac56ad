//! Flat vertex/index buffers.
//!
//! [`export_data_vi`] walks the live faces and produces a deduplicated vertex
//! buffer plus a triangle index buffer, ready to upload or serialize.
//! [`build_from_buffers`] turns such buffers back into a connected mesh.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector2, Vector3};

use super::builder::{build_from_triangles, build_from_triangles_with_tex_coords};
use super::halfedge::HalfEdgeMesh;
use super::index::MeshIndex;
use crate::error::{MeshError, Result};

/// One corner of an exported triangle.
///
/// The layout is fixed so the buffer can be handed to a GPU or written out
/// as raw bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ExportVertex {
    /// Vertex position.
    pub position: [f32; 3],
    /// Normal of the face this corner was emitted for.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub tex_coord: [f32; 2],
}

impl ExportVertex {
    /// Position as a point.
    pub fn point(&self) -> Point3<f64> {
        Point3::new(
            self.position[0] as f64,
            self.position[1] as f64,
            self.position[2] as f64,
        )
    }
}

/// View an exported buffer as bytes.
pub fn as_bytes(vertices: &[ExportVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Normal used for exported corners: `normalize((p2 - p1) x (p3 - p2))`.
fn corner_normal(p: &[Point3<f64>; 3]) -> Vector3<f64> {
    (p[1] - p[0])
        .cross(&(p[2] - p[1]))
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// Emit three vertices per live face, in storage order.
///
/// Corners are listed counter-clockwise. All three carry the face normal,
/// replacing whatever per-vertex normal the mesh could provide.
pub fn export_data<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<ExportVertex> {
    let mut out = Vec::with_capacity(mesh.num_faces() * 3);

    for f in mesh.face_ids() {
        let corners = mesh.face_triangle(f);
        let positions = mesh.face_positions(f);
        let n = corner_normal(&positions);
        let normal = [n.x as f32, n.y as f32, n.z as f32];

        for (v, p) in corners.iter().zip(&positions) {
            let uv = mesh.tex_coord(*v);
            out.push(ExportVertex {
                position: [p.x as f32, p.y as f32, p.z as f32],
                normal,
                tex_coord: [uv.x as f32, uv.y as f32],
            });
        }
    }

    out
}

/// Export into caller-provided buffers, sharing identical vertices.
///
/// Vertices are compared by exact value with a linear search, so this is
/// quadratic in the number of unique vertices.
///
/// # Panics
/// Panics if either buffer is non-empty.
pub fn export_data_into<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    points: &mut Vec<ExportVertex>,
    indices: &mut Vec<u32>,
) {
    assert!(points.is_empty(), "vertex buffer must be empty");
    assert!(indices.is_empty(), "index buffer must be empty");

    let corners = export_data(mesh);
    indices.reserve(corners.len());

    for corner in corners {
        let slot = match points.iter().position(|p| *p == corner) {
            Some(slot) => slot,
            None => {
                points.push(corner);
                points.len() - 1
            }
        };
        indices.push(slot as u32);
    }
}

/// Export a deduplicated vertex buffer and its index buffer.
pub fn export_data_vi<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<ExportVertex>, Vec<u32>) {
    let mut points = Vec::new();
    let mut indices = Vec::new();
    export_data_into(mesh, &mut points, &mut indices);
    (points, indices)
}

/// Build a mesh from a vertex buffer and a triangle index buffer.
///
/// Buffer entries with bit-identical positions become one mesh vertex, so
/// corners split by differing normals are stitched back together. The
/// texture coordinate of the first such entry wins.
pub fn build_from_buffers<I: MeshIndex>(
    vertices: &[ExportVertex],
    indices: &[u32],
) -> Result<HalfEdgeMesh<I>> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::invalid_param(
            "indices",
            indices.len(),
            "length must be a multiple of 3",
        ));
    }

    let mut welded: HashMap<[u32; 3], usize> = HashMap::with_capacity(vertices.len());
    let mut slot_to_vertex = Vec::with_capacity(vertices.len());
    let mut positions = Vec::new();
    let mut tex_coords = Vec::new();

    for v in vertices {
        let key = v.position.map(f32::to_bits);
        let id = *welded.entry(key).or_insert_with(|| {
            positions.push(v.point());
            tex_coords.push(Vector2::new(v.tex_coord[0] as f64, v.tex_coord[1] as f64));
            positions.len() - 1
        });
        slot_to_vertex.push(id);
    }

    let mut faces = Vec::with_capacity(indices.len() / 3);
    for (fi, tri) in indices.chunks_exact(3).enumerate() {
        let mut face = [0usize; 3];
        for (corner, &slot) in face.iter_mut().zip(tri) {
            *corner = *slot_to_vertex
                .get(slot as usize)
                .ok_or(MeshError::InvalidVertexIndex {
                    face: fi,
                    vertex: slot as usize,
                })?;
        }
        faces.push(face);
    }

    if tex_coords.iter().any(|uv| *uv != Vector2::zeros()) {
        build_from_triangles_with_tex_coords(&positions, &tex_coords, &faces)
    } else {
        build_from_triangles(&positions, &faces)
    }
}

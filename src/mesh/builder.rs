//! Mesh construction utilities.
//!
//! This module builds half-edge meshes from face-vertex lists as found in
//! mesh file formats, and flattens them back. Faces are inserted one at a
//! time through [`HalfEdgeMesh::add_face`], so any input that would make the
//! mesh non-manifold is rejected. File readers use
//! [`build_from_polygons_lenient`], which drops the offending faces instead.

use nalgebra::{Point3, Vector2};

use super::halfedge::HalfEdgeMesh;
use super::index::{MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Returns
/// A half-edge mesh, or an error if the input is invalid or non-manifold.
///
/// # Example
/// ```
/// use caulk::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_with(vertices, None, faces.iter().map(|f| &f[..]))
}

/// Build a half-edge mesh whose vertices carry texture coordinates.
///
/// `tex_coords` must have one entry per vertex.
pub fn build_from_triangles_with_tex_coords<I: MeshIndex>(
    vertices: &[Point3<f64>],
    tex_coords: &[Vector2<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    if tex_coords.len() != vertices.len() {
        return Err(MeshError::invalid_param(
            "tex_coords",
            tex_coords.len(),
            "must have one entry per vertex",
        ));
    }
    build_with(vertices, Some(tex_coords), faces.iter().map(|f| &f[..]))
}

/// Build a triangle mesh from arbitrary polygons.
///
/// Polygons with more than three corners are split into a fan around their
/// first corner.
pub fn build_from_polygons<I: MeshIndex>(
    vertices: &[Point3<f64>],
    tex_coords: Option<&[Vector2<f64>]>,
    polygons: &[Vec<usize>],
) -> Result<HalfEdgeMesh<I>> {
    let mut triangles = Vec::with_capacity(polygons.len());
    for (pi, polygon) in polygons.iter().enumerate() {
        if polygon.len() < 3 {
            return Err(MeshError::DegenerateFace { face: pi });
        }
        for j in 1..polygon.len() - 1 {
            triangles.push([polygon[0], polygon[j], polygon[j + 1]]);
        }
    }

    match tex_coords {
        Some(uv) => build_from_triangles_with_tex_coords(vertices, uv, &triangles),
        None => build_from_triangles(vertices, &triangles),
    }
}

/// Build a triangle mesh from polygons, dropping faces that cannot be
/// inserted without breaking manifoldness.
///
/// Scanned meshes often carry a few fins (three faces on one edge) or
/// pinched vertices. Each such face, and each polygon with fewer than three
/// distinct corners, is skipped with a warning instead of failing the whole
/// mesh. Returns the mesh together with the number of skipped triangles.
///
/// Out-of-range vertex indices are still an error, as is a result with no
/// faces at all.
///
/// # Example
/// ```
/// use caulk::mesh::{build_from_polygons_lenient, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
///     Point3::new(0.5, -1.0, 0.0),
/// ];
/// // The second face repeats the directed edge 0 -> 1.
/// let faces = vec![[0, 1, 2], [0, 1, 3]];
///
/// let (mesh, skipped): (HalfEdgeMesh, _) =
///     build_from_polygons_lenient(&vertices, None, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(skipped, 1);
/// ```
pub fn build_from_polygons_lenient<I: MeshIndex, P: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    tex_coords: Option<&[Vector2<f64>]>,
    polygons: &[P],
) -> Result<(HalfEdgeMesh<I>, usize)> {
    if let Some(uv) = tex_coords {
        if uv.len() != vertices.len() {
            return Err(MeshError::invalid_param(
                "tex_coords",
                uv.len(),
                "must have one entry per vertex",
            ));
        }
    }

    let mut triangles = Vec::with_capacity(polygons.len());
    let mut skipped = 0;
    for polygon in polygons {
        let polygon = polygon.as_ref();
        if polygon.len() < 3 {
            skipped += 1;
            continue;
        }
        for j in 1..polygon.len() - 1 {
            triangles.push([polygon[0], polygon[j], polygon[j + 1]]);
        }
    }

    let (mesh, rejected) = insert_faces(
        vertices,
        tex_coords,
        triangles.iter().map(|f| &f[..]),
        OnReject::Skip,
    )?;
    skipped += rejected;

    if mesh.num_faces() == 0 {
        return Err(MeshError::EmptyMesh);
    }
    Ok((mesh, skipped))
}

/// What to do with a face [`HalfEdgeMesh::add_face`] refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnReject {
    Fail,
    Skip,
}

fn build_with<'a, I: MeshIndex>(
    vertices: &[Point3<f64>],
    tex_coords: Option<&[Vector2<f64>]>,
    faces: impl ExactSizeIterator<Item = &'a [usize]>,
) -> Result<HalfEdgeMesh<I>> {
    insert_faces(vertices, tex_coords, faces, OnReject::Fail).map(|(mesh, _)| mesh)
}

fn insert_faces<'a, I: MeshIndex>(
    vertices: &[Point3<f64>],
    tex_coords: Option<&[Vector2<f64>]>,
    faces: impl ExactSizeIterator<Item = &'a [usize]>,
    on_reject: OnReject,
) -> Result<(HalfEdgeMesh<I>, usize)> {
    if faces.len() == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());

    let vertex_ids: Vec<VertexId<I>> = match tex_coords {
        Some(uv) => vertices
            .iter()
            .zip(uv)
            .map(|(&pos, &uv)| mesh.add_vertex_with_tex_coord(pos, uv))
            .collect(),
        None => vertices.iter().map(|&pos| mesh.add_vertex(pos)).collect(),
    };

    let mut skipped = 0;
    let mut corners = Vec::with_capacity(3);
    for (fi, face) in faces.enumerate() {
        corners.clear();
        for &vi in face {
            let id = vertex_ids
                .get(vi)
                .copied()
                .ok_or(MeshError::InvalidVertexIndex { face: fi, vertex: vi })?;
            corners.push(id);
        }

        let err = match mesh.add_face(&corners) {
            Ok(_) => continue,
            Err(err) => err,
        };

        let err = match err {
            MeshError::DegenerateFace { .. } => MeshError::DegenerateFace { face: fi },
            MeshError::ComplexVertex { .. }
            | MeshError::ComplexEdge { .. }
            | MeshError::PatchRelinkFailed { .. } => MeshError::NonManifold {
                details: format!("face {}: {}", fi, err),
            },
            other => return Err(other),
        };

        match on_reject {
            OnReject::Fail => return Err(err),
            OnReject::Skip => {
                log::warn!("skipping face {:?}: {}", face, err);
                skipped += 1;
            }
        }
    }

    Ok((mesh, skipped))
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Deleted elements are skipped and the remaining vertices renumbered
/// densely. Returns (vertices, faces) tuple.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut remap = vec![usize::MAX; mesh.vertices.len()];
    let mut vertices = Vec::with_capacity(mesh.num_vertices());
    for v in mesh.vertex_ids() {
        remap[v.index()] = vertices.len();
        vertices.push(*mesh.position(v));
    }

    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [remap[v0.index()], remap[v1.index()], remap[v2.index()]]
        })
        .collect();

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        // Two triangles sharing an edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 6 interior half-edges + 4 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 10);
        assert_eq!(mesh.num_boundary_halfedges(), 4);
        assert!(mesh.is_valid());
        assert!(!mesh.has_tex_coords());
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);

        assert_eq!(out_verts, vertices);
        assert_eq!(out_faces, faces);
    }

    #[test]
    fn test_flatten_skips_deleted() {
        let (vertices, faces) = two_triangles();
        let mut mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        let first = mesh.face_ids().next().unwrap();
        mesh.delete_face(first, true);

        // Vertex 2 is gone, vertex 3 moves into its slot.
        let (out_verts, out_faces) = to_face_vertex(&mesh);
        assert_eq!(out_verts.len(), 3);
        assert_eq!(out_faces, vec![[1, 0, 2]]);
    }

    #[test]
    fn test_tex_coords_are_stored() {
        let (vertices, faces) = two_triangles();
        let uv: Vec<Vector2<f64>> = (0..4).map(|i| Vector2::new(i as f64, 0.5)).collect();
        let mesh: HalfEdgeMesh<u32> =
            build_from_triangles_with_tex_coords(&vertices, &uv, &faces).unwrap();

        assert!(mesh.has_tex_coords());
        assert_eq!(*mesh.tex_coord(VertexId::new(3)), Vector2::new(3.0, 0.5));

        let short = &uv[..2];
        assert!(build_from_triangles_with_tex_coords::<u32>(&vertices, short, &faces).is_err());
    }

    #[test]
    fn test_polygons_are_fanned() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let polygons = vec![vec![0, 1, 2, 3, 4]];
        let mesh: HalfEdgeMesh<u32> = build_from_polygons(&vertices, None, &polygons).unwrap();

        assert_eq!(mesh.num_faces(), 3);
        assert_eq!(mesh.num_boundary_halfedges(), 5);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces = vec![[0, 1, 2]]; // Indices 1 and 2 are invalid

        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &faces);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let (vertices, _) = two_triangles();
        let faces = vec![[0, 1, 2], [0, 0, 2]];

        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 1 })));
    }

    #[test]
    fn test_non_manifold_edge() {
        // Two triangles on the directed edge 0 -> 1.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [0, 1, 3]];

        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::NonManifold { .. })));
    }

    #[test]
    fn test_empty_input() {
        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&[], &[]);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    /// Five faces around the edge 1-2 of which the last two form a fin.
    fn fin() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.5, 0.0),
            Point3::new(1.0, 0.5, 1.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3], [1, 4, 2], [2, 1, 5], [1, 2, 5]];
        (vertices, faces)
    }

    #[test]
    fn test_lenient_skips_fin_faces() {
        let (vertices, faces) = fin();
        assert!(build_from_triangles::<u32>(&vertices, &faces).is_err());

        let (mesh, skipped): (HalfEdgeMesh<u32>, usize) =
            build_from_polygons_lenient(&vertices, None, &faces).unwrap();

        assert_eq!(skipped, 2);
        assert_eq!(mesh.num_faces(), 3);
        assert_eq!(mesh.num_boundary_halfedges(), 5);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_lenient_skips_short_polygons() {
        let (vertices, _) = two_triangles();
        let polygons = vec![vec![0, 1, 2], vec![0, 1], vec![1, 1, 3]];

        let (mesh, skipped): (HalfEdgeMesh<u32>, usize) =
            build_from_polygons_lenient(&vertices, None, &polygons).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_lenient_still_rejects_bad_indices() {
        let (vertices, _) = two_triangles();
        let faces = vec![[0, 1, 2], [0, 1, 9]];

        let result: Result<(HalfEdgeMesh<u32>, usize)> =
            build_from_polygons_lenient(&vertices, None, &faces);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 1, vertex: 9 })
        ));
    }
}

//! STL (stereolithography) format support.
//!
//! STL stores every triangle with its own corners, so corners with
//! bit-identical coordinates are welded into shared vertices on load. Texture
//! coordinates cannot be represented and are dropped on save.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format.
///
/// # Example
///
/// ```no_run
/// use caulk::io::stl;
/// use caulk::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut welded: HashMap<[u32; 3], usize> = HashMap::with_capacity(stl.vertices.len());
    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(stl.vertices.len());
    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(stl.faces.len());

    let mut weld = |corner: &stl_io::Vertex| {
        let key = [corner[0].to_bits(), corner[1].to_bits(), corner[2].to_bits()];
        *welded.entry(key).or_insert_with(|| {
            vertices.push(Point3::new(corner[0] as f64, corner[1] as f64, corner[2] as f64));
            vertices.len() - 1
        })
    };

    let mut skipped = 0;
    for tri in &stl.faces {
        let face = tri.vertices.map(|i| weld(&stl.vertices[i]));
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            skipped += 1;
            continue;
        }
        faces.push(face);
    }

    if skipped > 0 {
        log::warn!("{}: skipped {} degenerate triangle(s)", path.display(), skipped);
    }

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    super::assemble(path, &vertices, None, &faces)
}

/// Save a mesh to a binary STL file.
///
/// # Example
///
/// ```no_run
/// use caulk::io::stl;
/// use caulk::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// stl::save(&mesh, "output.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(mesh);

    let to_stl = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let triangles: Vec<stl_io::Triangle> = faces
        .iter()
        .map(|f| {
            let [p0, p1, p2] = f.map(|i| vertices[i]);
            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [to_stl(&p0), to_stl(&p1), to_stl(&p2)],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;

    #[test]
    fn test_save_then_load_welds_corners() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let faces = vec![[0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open.stl");
        save(&mesh, &path).unwrap();

        let loaded: HalfEdgeMesh = load(&path).unwrap();
        assert_eq!(loaded.num_vertices(), 4);
        assert_eq!(loaded.num_faces(), 3);
        assert_eq!(loaded.num_boundary_halfedges(), 3);
        assert!(loaded.is_valid());
    }
}

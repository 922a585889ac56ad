//! Wavefront OBJ format support.
//!
//! Loading goes through `tobj`: every model in the file is merged into one
//! mesh, polygons are fan-triangulated, and texture coordinates are kept per
//! vertex (the first one seen for a vertex wins). Faces that would make the
//! mesh non-manifold are dropped with a warning. Saving writes positions,
//! texture coordinates when the mesh has them, and area-weighted vertex
//! normals.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector2};

use crate::error::{MeshError, Result};
use crate::mesh::{to_face_vertex, HalfEdgeMesh, MeshIndex};

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use caulk::io::obj;
/// use caulk::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();

    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj(path, &options).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut tex_coords: Vec<Option<Vector2<f64>>> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::new();

    for model in &models {
        let mesh = &model.mesh;
        let offset = vertices.len();

        vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
        );
        tex_coords.resize(vertices.len(), None);

        let has_uv = !mesh.texcoords.is_empty() && mesh.texcoord_indices.len() == mesh.indices.len();

        if has_uv {
            for (&index, &t) in mesh.indices.iter().zip(&mesh.texcoord_indices) {
                let slot = offset + index as usize;
                let t = t as usize * 2;
                if let (Some(uv), Some(&[u, v])) = (tex_coords.get_mut(slot), mesh.texcoords.get(t..t + 2)) {
                    uv.get_or_insert(Vector2::new(u as f64, v as f64));
                }
            }
        }

        for tri in mesh.indices.chunks_exact(3) {
            let face = [
                offset + tri[0] as usize,
                offset + tri[1] as usize,
                offset + tri[2] as usize,
            ];
            if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
                log::warn!("{}: skipping degenerate face {:?}", model.name, face);
                continue;
            }
            faces.push(face);
        }
    }

    log::debug!(
        "read {} model(s), {} vertices, {} triangles from {}",
        models.len(),
        vertices.len(),
        faces.len(),
        path.display()
    );

    if faces.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "OBJ file contains no faces".to_string(),
        });
    }

    if tex_coords.iter().any(Option::is_some) {
        let uv: Vec<Vector2<f64>> = tex_coords
            .into_iter()
            .map(|uv| uv.unwrap_or_else(Vector2::zeros))
            .collect();
        super::assemble(path, &vertices, Some(uv.as_slice()), &faces)
    } else {
        super::assemble(path, &vertices, None, &faces)
    }
}

/// Save a mesh to an OBJ file.
///
/// Face corners reference the position, texture coordinate and normal of
/// the same one-based index.
///
/// # Example
///
/// ```no_run
/// use caulk::io::obj;
/// use caulk::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(mesh);
    let with_uv = mesh.has_tex_coords();

    writeln!(writer, "# caulk")?;
    writeln!(writer, "# {} vertices, {} faces", vertices.len(), faces.len())?;

    for v in &vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }

    if with_uv {
        for v in mesh.vertex_ids() {
            let uv = mesh.tex_coord(v);
            writeln!(writer, "vt {} {}", uv.x, uv.y)?;
        }
    }

    for v in mesh.vertex_ids() {
        let n = mesh.vertex_normal(v);
        writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
    }

    for f in &faces {
        let [a, b, c] = f.map(|i| i + 1);
        if with_uv {
            writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        } else {
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        }
    }

    writer.flush()?;
    Ok(())
}

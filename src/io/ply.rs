//! PLY (Stanford polygon) format support.
//!
//! Vertex texture coordinates are read from `u`/`v` (or `s`/`t`,
//! `texture_u`/`texture_v`) properties and written as `u`/`v`. Polygons are
//! fan-triangulated on load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector2};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::mesh::{to_face_vertex, HalfEdgeMesh, MeshIndex};

const TEX_COORD_NAMES: [(&str, &str); 3] = [("u", "v"), ("s", "t"), ("texture_u", "texture_v")];

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use caulk::io::ply;
/// use caulk::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let load_error = |message: &str| MeshError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(&e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    let mut tex_coords: Vec<Vector2<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| load_error(&format!("vertex missing {} coordinate", name)))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));

        let uv = TEX_COORD_NAMES.iter().find_map(|&(u, v)| {
            Some(Vector2::new(
                get_float_property(vertex, u)?,
                get_float_property(vertex, v)?,
            ))
        });
        if let Some(uv) = uv {
            tex_coords.push(uv);
        }
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;

    let mut polygons: Vec<Vec<usize>> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?;

        if indices.len() >= 3 {
            polygons.push(indices);
        } else {
            log::warn!("{}: skipping face with {} corner(s)", path.display(), indices.len());
        }
    }

    if polygons.is_empty() {
        return Err(load_error("PLY file contains no faces"));
    }

    // Only trust texture coordinates when every vertex has one.
    let uv = (tex_coords.len() == vertices.len()).then_some(tex_coords.as_slice());
    super::assemble(path, &vertices, uv, &polygons)
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh to a PLY file (ASCII format).
///
/// # Example
///
/// ```no_run
/// use caulk::io::ply;
/// use caulk::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// ply::save(&mesh, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(mesh);
    let with_uv = mesh.has_tex_coords();

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by caulk")?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    if with_uv {
        writeln!(writer, "property float u")?;
        writeln!(writer, "property float v")?;
    }
    writeln!(writer, "element face {}", faces.len())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for (p, v) in vertices.iter().zip(mesh.vertex_ids()) {
        if with_uv {
            let uv = mesh.tex_coord(v);
            writeln!(writer, "{} {} {} {} {}", p.x, p.y, p.z, uv.x, uv.y)?;
        } else {
            writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
        }
    }

    for f in &faces {
        writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_PLY: &str = "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property float s
property float t
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0 0
1 0 0 1 0
1 1 0 1 1
0 1 0 0 1
4 0 1 2 3
";

    #[test]
    fn test_load_polygon_with_tex_coords() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.ply");
        std::fs::write(&path, QUAD_PLY).unwrap();

        let mesh: HalfEdgeMesh = load(&path).unwrap();

        assert_eq!(mesh.num_faces(), 2);
        assert!(mesh.has_tex_coords());
        let uv: Vec<_> = mesh.vertex_ids().map(|v| *mesh.tex_coord(v)).collect();
        assert_eq!(uv[2], Vector2::new(1.0, 1.0));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("quad.ply");
        std::fs::write(&src, QUAD_PLY).unwrap();
        let mesh: HalfEdgeMesh = load(&src).unwrap();

        let out = dir.path().join("out.ply");
        save(&mesh, &out).unwrap();
        let loaded: HalfEdgeMesh = load(&out).unwrap();

        assert_eq!(loaded.num_vertices(), 4);
        assert_eq!(loaded.num_faces(), 2);
        assert!(loaded.has_tex_coords());
        for (a, b) in mesh.vertex_ids().zip(loaded.vertex_ids()) {
            assert_eq!(mesh.position(a), loaded.position(b));
            assert_eq!(mesh.tex_coord(a), loaded.tex_coord(b));
        }
    }
}

//! Mesh file I/O.
//!
//! This module provides functions for loading and saving meshes in various formats.
//! Every loader welds shared corners so holes show up as boundary loops
//! rather than as a soup of disconnected triangles.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | Positions, texture coordinates, normals |
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII; positions only |
//! | PLY | `.ply` | ✓ | ✓ | Positions and texture coordinates |
//!
//! # Usage
//!
//! The easiest way to load and save meshes is using the automatic format detection:
//!
//! ```no_run
//! use caulk::io::{load, save};
//! use caulk::mesh::HalfEdgeMesh;
//!
//! // Load with automatic format detection
//! let mesh: HalfEdgeMesh = load("model.obj").unwrap();
//!
//! // Save with automatic format detection
//! save(&mesh, "output.stl").unwrap();
//! ```
//!
//! You can also use format-specific functions:
//!
//! ```no_run
//! use caulk::io::obj;
//! use caulk::mesh::HalfEdgeMesh;
//!
//! let mesh: HalfEdgeMesh = obj::load("model.obj").unwrap();
//! obj::save(&mesh, "output.obj").unwrap();
//! ```

pub mod obj;
pub mod ply;
pub mod stl;

use std::path::Path;

use nalgebra::{Point3, Vector2};

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons_lenient, HalfEdgeMesh, MeshIndex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Assemble a loaded face list, dropping faces the mesh cannot take.
pub(crate) fn assemble<I: MeshIndex, F: AsRef<[usize]>>(
    path: &Path,
    vertices: &[Point3<f64>],
    tex_coords: Option<&[Vector2<f64>]>,
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    let (mesh, skipped) = build_from_polygons_lenient(vertices, tex_coords, faces)?;
    if skipped > 0 {
        log::warn!(
            "{}: dropped {} of {} face(s) that would make the mesh non-manifold",
            path.display(),
            skipped,
            faces.len()
        );
    }
    Ok(mesh)
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
///
/// # Example
///
/// ```no_run
/// use caulk::io::load;
/// use caulk::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let format = detect(path)?;

    match format {
        Format::Obj => obj::load(path),
        Format::Stl => stl::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension.
///
/// # Example
///
/// ```no_run
/// use caulk::io::save;
/// use caulk::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = detect(path)?;

    match format {
        Format::Obj => obj::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/model.OBJ"), Some(Format::Obj));
        assert_eq!(Format::from_path("scan.stl"), Some(Format::Stl));
        assert_eq!(Format::from_path("bunny.ply"), Some(Format::Ply));
        assert_eq!(Format::from_path("scene.gltf"), None);
        assert_eq!(Format::from_path("no_extension"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let result: Result<HalfEdgeMesh> = load("scene.glb");
        assert!(matches!(
            result,
            Err(MeshError::UnsupportedFormat { extension }) if extension == "glb"
        ));
    }
}

//! A mesh repair session.
//!
//! [`RepairSession`] owns one mesh and exposes the read → repair → export
//! workflow as single calls. Progress and timings go to the session's
//! [`Diagnostics`] collector.
//!
//! # Example
//!
//! ```no_run
//! use caulk::session::RepairSession;
//!
//! let mut session = RepairSession::new();
//! session.read("scan.obj")?;
//! let report = session.fill_hole();
//! println!("filled {} of {} holes", report.holes_filled(), report.holes_found());
//!
//! let (vertices, indices) = session.export_data_vi();
//! session.export_to_obj("repaired.obj")?;
//! # Ok::<(), caulk::error::MeshError>(())
//! ```

use std::path::Path;
use std::time::Instant;

use crate::algo::diagnostics::{Diagnostics, LogDiagnostics};
use crate::algo::repair::{self, find_boundary_loops, FillOptions, FillReport};
use crate::error::Result;
use crate::io;
use crate::mesh::{
    build_from_buffers, export_data, export_data_into, export_data_vi, ExportVertex, HalfEdgeMesh,
};

/// Counts describing the current mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshCheck {
    /// Live vertices.
    pub vertices: usize,
    /// Live faces.
    pub faces: usize,
    /// Boundary half-edges.
    pub boundary_halfedges: usize,
    /// Boundary loops, i.e. holes.
    pub holes: usize,
}

impl MeshCheck {
    /// True when the mesh has no boundary.
    pub fn is_watertight(&self) -> bool {
        self.boundary_halfedges == 0
    }
}

/// Owns a mesh and runs the repair workflow on it.
pub struct RepairSession {
    mesh: HalfEdgeMesh,
    options: FillOptions,
    diagnostics: Box<dyn Diagnostics>,
}

impl Default for RepairSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RepairSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepairSession")
            .field("vertices", &self.mesh.num_vertices())
            .field("faces", &self.mesh.num_faces())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RepairSession {
    /// Create an empty session that sends diagnostics to the `log` facade.
    pub fn new() -> Self {
        Self::with_diagnostics(LogDiagnostics)
    }

    /// Create an empty session reporting to the given collector.
    pub fn with_diagnostics<D: Diagnostics + 'static>(diagnostics: D) -> Self {
        Self {
            mesh: HalfEdgeMesh::new(),
            options: FillOptions::default(),
            diagnostics: Box::new(diagnostics),
        }
    }

    /// Replace the hole filling options.
    pub fn set_fill_options(&mut self, options: FillOptions) -> Result<()> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Current hole filling options.
    pub fn fill_options(&self) -> &FillOptions {
        &self.options
    }

    /// Replace the mesh with the contents of a file.
    ///
    /// The session is left empty if reading fails.
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.reset();

        let start = Instant::now();
        self.diagnostics
            .add(&format!("start read: {}", path.display()));

        match io::load(path) {
            Ok(mesh) => {
                self.mesh = mesh;
                self.diagnostics
                    .add(&format!("read finished, {:.2?}", start.elapsed()));
                Ok(())
            }
            Err(err) => {
                self.diagnostics
                    .add(&format!("read of {} failed: {}", path.display(), err));
                Err(err)
            }
        }
    }

    /// Close every hole of the mesh and compact it.
    pub fn fill_hole(&mut self) -> FillReport {
        let start = Instant::now();
        let report = repair::run(&mut self.mesh, &self.options, self.diagnostics.as_mut());
        self.diagnostics
            .add(&format!("fill hole finished, {:.2?}", start.elapsed()));
        report
    }

    /// Three vertices per face; see [`export_data`].
    pub fn export_data(&self) -> Vec<ExportVertex> {
        export_data(&self.mesh)
    }

    /// Deduplicated export into caller buffers; see [`export_data_into`].
    ///
    /// # Panics
    /// Panics if either buffer is non-empty.
    pub fn export_data_into(&self, points: &mut Vec<ExportVertex>, indices: &mut Vec<u32>) {
        export_data_into(&self.mesh, points, indices);
    }

    /// Deduplicated vertex buffer and index buffer.
    pub fn export_data_vi(&self) -> (Vec<ExportVertex>, Vec<u32>) {
        export_data_vi(&self.mesh)
    }

    /// Write the mesh as Wavefront OBJ.
    pub fn export_to_obj<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        io::obj::save(&self.mesh, path)
    }

    /// Replace the mesh with one built from exported buffers.
    ///
    /// The session is left empty if the buffers are rejected.
    pub fn load(&mut self, vertices: &[ExportVertex], indices: &[u32]) -> Result<()> {
        self.reset();
        self.mesh = build_from_buffers(vertices, indices)?;
        Ok(())
    }

    /// Drop the current mesh.
    pub fn reset(&mut self) {
        self.mesh = HalfEdgeMesh::new();
    }

    /// Summarize the current mesh.
    pub fn check(&self) -> MeshCheck {
        MeshCheck {
            vertices: self.mesh.num_vertices(),
            faces: self.mesh.num_faces(),
            boundary_halfedges: self.mesh.num_boundary_halfedges(),
            holes: find_boundary_loops(&self.mesh).len(),
        }
    }

    /// The current mesh.
    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// Mutable access to the current mesh.
    pub fn mesh_mut(&mut self) -> &mut HalfEdgeMesh {
        &mut self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::diagnostics::FnDiagnostics;
    use std::sync::{Arc, Mutex};

    fn recording_session() -> (RepairSession, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let session = RepairSession::with_diagnostics(FnDiagnostics::new(move |msg: &str| {
            sink.lock().unwrap().push(msg.to_owned());
        }));
        (session, log)
    }

    /// Tetrahedron without its bottom face, as exported buffers.
    fn open_tetrahedron() -> (Vec<ExportVertex>, Vec<u32>) {
        let corner = |x: f32, y: f32, z: f32| ExportVertex {
            position: [x, y, z],
            normal: [0.0, 0.0, 1.0],
            tex_coord: [x, y],
        };
        let vertices = vec![
            corner(0.0, 0.0, 0.0),
            corner(1.0, 0.0, 0.0),
            corner(0.0, 1.0, 0.0),
            corner(0.0, 0.0, 1.0),
        ];
        let indices = vec![0, 1, 3, 1, 2, 3, 2, 0, 3];
        (vertices, indices)
    }

    #[test]
    fn test_load_fill_export() {
        let (mut session, log) = recording_session();
        let (vertices, indices) = open_tetrahedron();

        session.load(&vertices, &indices).unwrap();
        assert_eq!(
            session.check(),
            MeshCheck {
                vertices: 4,
                faces: 3,
                boundary_halfedges: 3,
                holes: 1,
            }
        );

        let report = session.fill_hole();
        assert_eq!(report.holes_filled(), 1);
        assert_eq!(report.faces_added(), 1);
        assert!(session.check().is_watertight());

        let (points, idx) = session.export_data_vi();
        assert_eq!(idx.len(), 12);
        assert_eq!(points.len(), 12);

        let log = log.lock().unwrap();
        assert!(log.iter().any(|m| m.starts_with("fill hole finished")));
    }

    #[test]
    fn test_read_failure_leaves_session_empty() {
        let (mut session, log) = recording_session();
        let (vertices, indices) = open_tetrahedron();
        session.load(&vertices, &indices).unwrap();

        assert!(session.read("/nonexistent/caulk/input.obj").is_err());
        assert_eq!(session.check(), MeshCheck::default());
        assert!(log.lock().unwrap().iter().any(|m| m.contains("failed")));
    }

    #[test]
    fn test_read_keeps_mesh_around_fin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fin.obj");
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 2 0.5 0\nv 1 0.5 1\n\
             f 1 2 3\nf 1 3 4\nf 2 5 3\nf 3 2 6\nf 2 3 6\n",
        )
        .unwrap();

        let mut session = RepairSession::with_diagnostics(Vec::<String>::new());
        session.read(&path).unwrap();

        let check = session.check();
        assert_eq!(check.vertices, 6);
        assert_eq!(check.faces, 3);
        assert_eq!(check.boundary_halfedges, 5);
        assert_eq!(check.holes, 1);
    }

    #[test]
    fn test_obj_roundtrip_through_session() {
        let (mut session, _) = recording_session();
        let (vertices, indices) = open_tetrahedron();
        session.load(&vertices, &indices).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open.obj");
        session.export_to_obj(&path).unwrap();

        let mut reread = RepairSession::with_diagnostics(Vec::<String>::new());
        reread.read(&path).unwrap();
        assert_eq!(reread.check(), session.check());
        assert!(reread.mesh().has_tex_coords());
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let mut session = RepairSession::new();
        let bad = FillOptions::default().with_planar_tolerance(-1.0);
        assert!(session.set_fill_options(bad).is_err());
        assert_eq!(
            session.fill_options().planar_tolerance,
            repair::DEFAULT_PLANAR_TOLERANCE
        );
    }

    #[test]
    fn test_reset() {
        let mut session = RepairSession::new();
        let (vertices, indices) = open_tetrahedron();
        session.load(&vertices, &indices).unwrap();
        session.reset();
        assert!(session.export_data().is_empty());
    }
}

//! Error types for caulk.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The mesh has non-manifold topology.
    #[error("mesh has non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// A face would attach to a vertex that is already surrounded by faces.
    #[error("vertex {vertex} is not on the boundary")]
    ComplexVertex {
        /// The interior vertex.
        vertex: usize,
    },

    /// A face would reuse a half-edge that already has a face.
    #[error("half-edge ({from} -> {to}) already has a face")]
    ComplexEdge {
        /// Origin of the half-edge.
        from: usize,
        /// Destination of the half-edge.
        to: usize,
    },

    /// The boundary around a vertex could not be re-linked for a new face.
    #[error("cannot re-link boundary around vertex {vertex}")]
    PatchRelinkFailed {
        /// The vertex where re-linking failed.
        vertex: usize,
    },

    /// Too few points to form a polygon.
    #[error("need at least {required} points, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// A boundary loop passes through a non-manifold vertex.
    #[error("boundary loop touches non-manifold vertex {vertex}")]
    NonManifoldBoundary {
        /// The offending vertex.
        vertex: usize,
    },

    /// A boundary walk did not return to its starting half-edge.
    #[error("boundary loop starting at half-edge {halfedge} is not closed")]
    OpenBoundary {
        /// The seed half-edge of the walk.
        halfedge: usize,
    },

    /// A hole has more boundary edges than allowed.
    #[error("hole with {size} boundary edges exceeds the limit of {max}")]
    HoleTooLarge {
        /// Number of boundary edges.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = MeshError::ComplexEdge { from: 3, to: 7 };
        assert_eq!(err.to_string(), "half-edge (3 -> 7) already has a face");

        let err = MeshError::invalid_param("planar_tolerance", -1.0, "must be non-negative");
        assert_eq!(
            err.to_string(),
            "invalid parameter: planar_tolerance = -1 (must be non-negative)"
        );
    }
}

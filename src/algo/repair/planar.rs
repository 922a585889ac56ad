//! Coplanarity test for hole outlines.

use nalgebra::{Point3, Vector3};

/// Absolute distance tolerance used by [`are_coplanar`] unless overridden.
pub const DEFAULT_PLANAR_TOLERANCE: f64 = 1e-6;

/// Check whether all points lie on one plane, within `tolerance`.
///
/// The plane is spanned by the first point, the first later point farther
/// than `tolerance` from it, and the first point after that which is away
/// from both and not collinear with them. Fewer than four points, or input
/// with no such triple, counts as coplanar.
pub fn are_coplanar(points: &[Point3<f64>], tolerance: f64) -> bool {
    if points.len() < 4 {
        return true;
    }

    let Some(normal) = plane_normal(points, tolerance) else {
        return true;
    };

    let origin = points[0];
    points
        .iter()
        .all(|&p| (p - origin).dot(&normal).abs() <= tolerance)
}

fn plane_normal(points: &[Point3<f64>], tolerance: f64) -> Option<Vector3<f64>> {
    let origin = points[0];

    let second_index = (1..points.len()).find(|&i| (points[i] - origin).norm() > tolerance)?;
    let second = points[second_index];
    let axis = second - origin;

    points[second_index + 1..]
        .iter()
        .filter(|&&p| (p - origin).norm() > tolerance && (p - second).norm() > tolerance)
        .find_map(|&p| axis.cross(&(p - origin)).try_normalize(tolerance * tolerance))
}

//! Oriented bounding boxes from principal component analysis.

use nalgebra::{Matrix3, Point3, Rotation3, SymmetricEigen, Vector3};
use scan_types::OrientedBox;
use tracing::warn;

/// Principal axes of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalAxes {
    /// Mean position.
    pub centroid: Point3<f64>,
    /// Right-handed frame whose columns are the axes, by descending variance.
    pub rotation: Rotation3<f64>,
    /// Variance along each axis, descending.
    pub eigenvalues: Vector3<f64>,
}

impl PrincipalAxes {
    /// Axis `i` (0 = largest variance) as a unit vector.
    #[must_use]
    pub fn axis(&self, i: usize) -> Vector3<f64> {
        self.rotation.matrix().column(i).into_owned()
    }
}

/// Mean position of `points`; the origin for an empty slice.
#[must_use]
pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    Point3::from(sum / count)
}

/// Eigen-decomposes the covariance of `points`.
///
/// Returns `None` for fewer than 3 points or a non-finite spread.
/// Eigenvectors are sorted by descending eigenvalue and the third is negated
/// when needed so the frame is a proper rotation. The frame stays accurate
/// for arbitrarily large finite spreads, though the eigenvalues themselves
/// saturate to infinity once the variance exceeds `f64::MAX`.
///
/// # Example
///
/// ```
/// use scan_core::fit::principal_axes;
/// use nalgebra::Point3;
///
/// let points: Vec<_> = (0..10).map(|i| Point3::new(f64::from(i), 0.1 * f64::from(i % 2), 0.0)).collect();
/// let pca = principal_axes(&points).unwrap();
/// assert!(pca.axis(0).x.abs() > 0.99);
/// assert!(pca.eigenvalues[2].abs() < 1e-12);
/// ```
#[must_use]
pub fn principal_axes(points: &[Point3<f64>]) -> Option<PrincipalAxes> {
    if points.len() < 3 {
        return None;
    }

    let centroid = centroid(points);
    // Offsets are normalized by the largest spread so the covariance stays
    // finite for very large clouds.
    let scale = points
        .iter()
        .fold(0.0_f64, |acc, p| acc.max((p - centroid).amax()));
    if !scale.is_finite() {
        return None;
    }
    let inv_scale = if scale > 0.0 { scale.recip() } else { 1.0 };

    let mut covariance = Matrix3::zeros();
    for p in points {
        let d = (p - centroid) * inv_scale;
        covariance += d * d.transpose();
    }
    #[allow(clippy::cast_precision_loss)]
    {
        covariance /= points.len() as f64;
    }

    let eigen = SymmetricEigen::new(covariance);
    let eigenvalues = eigen.eigenvalues;
    if !eigenvalues.iter().all(|v| v.is_finite()) {
        return None;
    }
    let eigenvectors = eigen.eigenvectors;

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

    let mut frame = Matrix3::from_columns(&[
        eigenvectors.column(order[0]).into_owned(),
        eigenvectors.column(order[1]).into_owned(),
        eigenvectors.column(order[2]).into_owned(),
    ]);
    if frame.determinant() < 0.0 {
        let flipped = -frame.column(2).into_owned();
        frame.set_column(2, &flipped);
    }

    Some(PrincipalAxes {
        centroid,
        rotation: Rotation3::from_matrix_unchecked(frame),
        eigenvalues: Vector3::new(
            eigenvalues[order[0]],
            eigenvalues[order[1]],
            eigenvalues[order[2]],
        ) * (scale * scale),
    })
}

/// Fits an oriented box to `points`, centered on their centroid.
///
/// Extents are measured from the centroid (`max(|min|, |max|)` per local
/// axis), so every point lies inside the box. With fewer than 3 points the
/// box is axis-aligned; with no spread at all it collapses to the centroid.
/// Returns `None` for an empty slice.
///
/// # Example
///
/// ```
/// use scan_core::fit::fit_oriented_box;
/// use nalgebra::Point3;
///
/// let points = [
///     Point3::new(-1.0, -0.1, 0.0),
///     Point3::new(1.0, 0.1, 0.0),
///     Point3::new(-1.0, 0.1, 0.0),
///     Point3::new(1.0, -0.1, 0.0),
/// ];
/// let obb = fit_oriented_box(&points).unwrap();
/// assert!((obb.extents.x - 1.0).abs() < 1e-9);
/// assert!(points.iter().all(|p| obb.contains(p, 1e-9)));
/// ```
#[must_use]
pub fn fit_oriented_box(points: &[Point3<f64>]) -> Option<OrientedBox> {
    let center = centroid(points);
    let spread = points
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f64>, p| acc.sup(&(p - center).abs()));

    match points.len() {
        0 => None,
        1 | 2 => Some(OrientedBox::axis_aligned(center, spread)),
        _ if spread == Vector3::zeros() => {
            warn!(points = points.len(), "Cluster has zero variance, fitting a point box");
            Some(OrientedBox::point(center))
        }
        _ => {
            let Some(pca) = principal_axes(points) else {
                warn!(points = points.len(), "Cluster spread is not finite, fitting an axis-aligned box");
                return Some(OrientedBox::axis_aligned(center, spread));
            };
            let extents = points.iter().fold(Vector3::zeros(), |acc: Vector3<f64>, p| {
                acc.sup(&pca.rotation.inverse_transform_vector(&(p - center)).abs())
            });
            Some(OrientedBox::new(center, pca.rotation, extents))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rotated_slab() -> (Vec<Point3<f64>>, Rotation3<f64>) {
        let rotation = Rotation3::from_euler_angles(0.3, -0.5, 1.1);
        let mut points = Vec::new();
        for i in -10..=10 {
            for j in -3..=3 {
                for k in -1..=1 {
                    let local = Vector3::new(f64::from(i) * 0.1, f64::from(j) * 0.05, f64::from(k) * 0.01);
                    points.push(Point3::new(2.0, -1.0, 0.5) + rotation * local);
                }
            }
        }
        (points, rotation)
    }

    // ==================== principal_axes ====================

    #[test]
    fn eigenvalues_descend_and_frame_is_proper() {
        let (points, _) = rotated_slab();
        let pca = principal_axes(&points).unwrap();
        assert!(pca.eigenvalues[0] >= pca.eigenvalues[1]);
        assert!(pca.eigenvalues[1] >= pca.eigenvalues[2]);
        assert_relative_eq!(pca.rotation.matrix().determinant(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn recovers_rotated_axes() {
        let (points, rotation) = rotated_slab();
        let pca = principal_axes(&points).unwrap();
        for i in 0..3 {
            let expected = rotation.matrix().column(i).into_owned();
            assert_relative_eq!(pca.axis(i).dot(&expected).abs(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn too_few_points_for_pca() {
        assert!(principal_axes(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]).is_none());
    }

    #[test]
    fn planar_points_have_flat_third_axis() {
        let points: Vec<_> = (0..6)
            .flat_map(|i| (0..4).map(move |j| Point3::new(f64::from(i) * 0.1, f64::from(j) * 0.1, 0.0)))
            .collect();
        let pca = principal_axes(&points).unwrap();
        assert_relative_eq!(pca.eigenvalues[2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(pca.axis(2).z.abs(), 1.0, epsilon = 1e-9);
    }

    // ==================== fit_oriented_box ====================

    #[test]
    fn box_contains_every_point() {
        let (points, _) = rotated_slab();
        let obb = fit_oriented_box(&points).unwrap();
        assert!(obb.is_orthonormal(1e-9));
        for p in &points {
            assert!(obb.contains(p, 1e-9));
        }
        assert_relative_eq!(obb.extents.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(obb.extents.y, 0.15, epsilon = 1e-6);
        assert_relative_eq!(obb.extents.z, 0.01, epsilon = 1e-6);
    }

    #[test]
    fn center_is_centroid_for_skewed_cloud() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.1, 0.0, 0.0),
            Point3::new(0.2, 0.01, 0.0),
            Point3::new(3.0, 0.0, 0.01),
        ];
        let obb = fit_oriented_box(&points).unwrap();
        assert_relative_eq!(obb.center, centroid(&points), epsilon = 1e-12);
        assert!(points.iter().all(|p| obb.contains(p, 1e-9)));
    }

    #[test]
    fn empty_and_small_inputs() {
        assert!(fit_oriented_box(&[]).is_none());

        let single = fit_oriented_box(&[Point3::new(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(single.center, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(single.extents, Vector3::zeros());
        assert_eq!(single.rotation, Rotation3::identity());

        let pair = fit_oriented_box(&[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.5, 0.0)]).unwrap();
        assert_eq!(pair.rotation, Rotation3::identity());
        assert_relative_eq!(pair.extents, Vector3::new(0.5, 0.25, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn huge_spread_keeps_a_proper_frame() {
        let (points, _) = rotated_slab();
        let points: Vec<_> = points.iter().map(|p| Point3::from(p.coords * 3e155)).collect();

        let pca = principal_axes(&points).unwrap();
        assert_relative_eq!(pca.rotation.matrix().determinant(), 1.0, epsilon = 1e-9);

        let obb = fit_oriented_box(&points).unwrap();
        assert!(obb.is_orthonormal(1e-9));
        assert!(obb.extents.iter().all(|e| e.is_finite()));
        assert_relative_eq!(obb.extents.x, 3e155, max_relative = 1e-6);
        for p in &points {
            assert!(obb.contains(p, 1e147));
        }
    }

    #[test]
    fn non_finite_points_fall_back_to_axis_aligned() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(f64::INFINITY, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert!(principal_axes(&points).is_none());
        let obb = fit_oriented_box(&points).unwrap();
        assert_eq!(obb.rotation, Rotation3::identity());
    }

    #[test]
    fn coincident_points_collapse() {
        let p = Point3::new(0.4, 0.4, 0.4);
        let obb = fit_oriented_box(&[p, p, p, p]).unwrap();
        assert_eq!(obb.center, p);
        assert_eq!(obb.extents, Vector3::zeros());
        assert_eq!(obb.rotation, Rotation3::identity());
    }
}

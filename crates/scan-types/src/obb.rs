//! Oriented bounding boxes.

use nalgebra::{Point3, Rotation3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;

/// A box aligned to a cluster's principal axes.
///
/// `rotation` maps local box coordinates to world coordinates; its columns are
/// the box axes in world space, ordered by decreasing variance of the points
/// the box was fitted to. `extents` are half-sizes along those axes, measured
/// from `center`.
///
/// # Example
///
/// ```
/// use scan_types::OrientedBox;
/// use nalgebra::{Point3, Vector3};
///
/// let obb = OrientedBox::axis_aligned(Point3::origin(), Vector3::new(2.0, 1.0, 0.5));
/// assert!(obb.contains_strict(&Point3::new(1.5, 0.0, 0.0)));
/// assert!(!obb.contains_strict(&Point3::new(2.0, 0.0, 0.0)));
/// assert_eq!(obb.volume(), 8.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrientedBox {
    /// Box center in world space.
    pub center: Point3<f64>,
    /// Local-to-world rotation; columns are the box axes.
    pub rotation: Rotation3<f64>,
    /// Non-negative half-sizes along each local axis.
    pub extents: Vector3<f64>,
}

impl OrientedBox {
    /// Creates a box. Negative extents are made positive.
    #[must_use]
    pub fn new(center: Point3<f64>, rotation: Rotation3<f64>, extents: Vector3<f64>) -> Self {
        Self {
            center,
            rotation,
            extents: extents.abs(),
        }
    }

    /// Creates a box whose axes coincide with the world axes.
    #[must_use]
    pub fn axis_aligned(center: Point3<f64>, extents: Vector3<f64>) -> Self {
        Self::new(center, Rotation3::identity(), extents)
    }

    /// Zero-size box at a point.
    #[must_use]
    pub fn point(center: Point3<f64>) -> Self {
        Self::axis_aligned(center, Vector3::zeros())
    }

    /// Local axis `i` (0, 1 or 2) in world space.
    ///
    /// # Panics
    ///
    /// Panics if `i > 2`.
    #[must_use]
    pub fn axis(&self, i: usize) -> Vector3<f64> {
        self.rotation.matrix().column(i).into_owned()
    }

    /// Expresses a world-space point in the box's local frame.
    #[must_use]
    pub fn to_local(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.rotation.inverse_transform_vector(&(point - self.center))
    }

    /// Returns `true` if the point lies strictly inside the box on every axis.
    #[must_use]
    pub fn contains_strict(&self, point: &Point3<f64>) -> bool {
        let local = self.to_local(point);
        local.x.abs() < self.extents.x
            && local.y.abs() < self.extents.y
            && local.z.abs() < self.extents.z
    }

    /// Returns `true` if the point lies inside or on the box, within `tolerance`.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        let local = self.to_local(point);
        local.x.abs() <= self.extents.x + tolerance
            && local.y.abs() <= self.extents.y + tolerance
            && local.z.abs() <= self.extents.z + tolerance
    }

    /// Box volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        8.0 * self.extents.x * self.extents.y * self.extents.z
    }

    /// The eight corners in world space.
    #[must_use]
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let e = self.extents;
        let signs = [
            (-1.0, -1.0, -1.0),
            (1.0, -1.0, -1.0),
            (1.0, 1.0, -1.0),
            (-1.0, 1.0, -1.0),
            (-1.0, -1.0, 1.0),
            (1.0, -1.0, 1.0),
            (1.0, 1.0, 1.0),
            (-1.0, 1.0, 1.0),
        ];
        signs.map(|(sx, sy, sz)| {
            self.center + self.rotation * Vector3::new(sx * e.x, sy * e.y, sz * e.z)
        })
    }

    /// Tight world-space axis-aligned box around the oriented box.
    #[must_use]
    pub fn world_aabb(&self) -> Aabb {
        // |R| * e gives the half-size of the rotated box along each world axis.
        let half = self.rotation.matrix().abs() * self.extents;
        Aabb::new(self.center - half, self.center + half)
    }

    /// Returns `true` if the rotation columns are unit length and mutually
    /// orthogonal within `tolerance`.
    #[must_use]
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let m = self.rotation.matrix();
        let gram = m.transpose() * m;
        (gram - nalgebra::Matrix3::identity()).amax() <= tolerance
    }
}

impl Default for OrientedBox {
    fn default() -> Self {
        Self::point(Point3::origin())
    }
}

//! Axis-aligned bounds used for raw clusters and scene extents.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in world space.
///
/// Raw clusters carry one of these as their coarse bounding volume, and a
/// [`ScanPackage`](crate::ScanPackage) reports the union of every entity's
/// world-space box as its global bounds.
///
/// # Example
///
/// ```
/// use scan_types::Aabb;
/// use nalgebra::Point3;
///
/// let points = [Point3::new(0.0, 1.0, 2.0), Point3::new(-1.0, 3.0, 0.5)];
/// let aabb = Aabb::from_points(points.iter());
///
/// assert_eq!(aabb.min, Point3::new(-1.0, 1.0, 0.5));
/// assert_eq!(aabb.max, Point3::new(0.0, 3.0, 2.0));
/// assert!(aabb.contains(&Point3::new(-0.5, 2.0, 1.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates bounds from two corners, reordering components so `min <= max`.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates zero-volume bounds at a single point.
    #[inline]
    #[must_use]
    pub const fn from_point(point: Point3<f64>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Creates inverted bounds that contain nothing.
    ///
    /// Expanding an empty box by a point yields that point's zero-volume box.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Computes the tight bounds of a set of points.
    ///
    /// Returns [`Aabb::empty`] when the iterator yields nothing.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Returns `true` if `min > max` on any axis.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Edge lengths along x, y and z. Zero for empty bounds.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Center point. The origin for empty bounds.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Enclosed volume. Zero for empty or flat bounds.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Returns `true` if the point lies inside or on the boundary.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Grows the bounds in place to include `point`.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Smallest box enclosing both operands. Empty operands are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use scan_types::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let b = Aabb::new(Point3::new(2.0, -1.0, 0.0), Point3::new(3.0, 0.5, 4.0));
    /// let u = a.union(&b);
    ///
    /// assert_eq!(u.min, Point3::new(0.0, -1.0, 0.0));
    /// assert_eq!(u.max, Point3::new(3.0, 1.0, 4.0));
    /// assert_eq!(Aabb::empty().union(&a), a);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// The eight corners, minimum corner first.
    #[must_use]
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
        ]
    }
}

impl Default for Aabb {
    /// Zero-volume bounds at the origin, the global bounds of an empty scan.
    fn default() -> Self {
        Self::from_point(Point3::origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_points_is_tight() {
        let points = vec![
            Point3::new(1.0, -2.0, 0.0),
            Point3::new(-3.0, 4.0, 2.5),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let aabb = Aabb::from_points(points.iter());
        assert_eq!(aabb.min, Point3::new(-3.0, -2.0, -1.0));
        assert_eq!(aabb.max, Point3::new(1.0, 4.0, 2.5));
    }

    #[test]
    fn empty_bounds_report_zero_geometry() {
        let aabb = Aabb::from_points(std::iter::empty());
        assert!(aabb.is_empty());
        assert_eq!(aabb.size(), Vector3::zeros());
        assert_eq!(aabb.center(), Point3::origin());
        assert_relative_eq!(aabb.volume(), 0.0);
    }

    #[test]
    fn new_reorders_corners() {
        let aabb = Aabb::new(Point3::new(2.0, 0.0, 5.0), Point3::new(0.0, 3.0, 1.0));
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.max, Point3::new(2.0, 3.0, 5.0));
        assert_relative_eq!(aabb.volume(), 24.0);
    }

    #[test]
    fn contains_includes_boundary() {
        let aabb = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(aabb.contains(&Point3::new(1.0, 0.0, 0.5)));
        assert!(!aabb.contains(&Point3::new(1.0001, 0.0, 0.5)));
    }

    #[test]
    fn union_skips_empty_operands() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(a.union(&Aabb::empty()), a);
        assert_eq!(Aabb::empty().union(&a), a);
    }

    #[test]
    fn default_is_degenerate_at_origin() {
        let aabb = Aabb::default();
        assert!(!aabb.is_empty());
        assert_relative_eq!(aabb.volume(), 0.0);
        assert_eq!(aabb.center(), Point3::origin());
    }

    #[test]
    fn corners_span_bounds() {
        let aabb = Aabb::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
        let corners = aabb.corners();
        assert_eq!(corners[0], aabb.min);
        assert_eq!(corners[6], aabb.max);
        assert!(corners.iter().all(|c| aabb.contains(c)));
    }
}

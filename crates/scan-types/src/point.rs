//! Opacity-weighted points and point sets.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::error::TypesError;

/// A single point of the input cloud: a position and an opacity in `[0, 1]`.
///
/// # Example
///
/// ```
/// use scan_types::ScanPoint;
///
/// let p = ScanPoint::from_coords(1.0, 2.0, 3.0, 1.7);
/// assert_eq!(p.opacity, 1.0); // clamped
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanPoint {
    /// World-space position.
    pub position: Point3<f64>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl ScanPoint {
    /// Creates a point, clamping opacity into `[0, 1]`.
    ///
    /// Non-finite opacity is treated as fully transparent.
    #[must_use]
    pub fn new(position: Point3<f64>, opacity: f64) -> Self {
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { position, opacity }
    }

    /// Creates a point from raw coordinates.
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64, opacity: f64) -> Self {
        Self::new(Point3::new(x, y, z), opacity)
    }
}

/// An immutable collection of [`ScanPoint`]s, the input of a scan.
///
/// Collaborators that decode point-cloud files usually hand over
/// structure-of-arrays data; [`PointSet::from_arrays`] checks those arrays
/// agree in length before anything is indexed.
///
/// # Example
///
/// ```
/// use scan_types::PointSet;
///
/// let set = PointSet::from_arrays(&[0.0, 1.0], &[0.0, 0.0], &[0.0, 0.0], &[0.5, 0.9]).unwrap();
/// assert_eq!(set.len(), 2);
///
/// let bad = PointSet::from_arrays(&[0.0, 1.0], &[0.0], &[0.0, 0.0], &[0.5, 0.9]);
/// assert!(bad.is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointSet {
    points: Vec<ScanPoint>,
}

impl PointSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Builds a set from parallel coordinate and opacity arrays.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::LengthMismatch`] if the four arrays do not all
    /// have the same length.
    pub fn from_arrays(
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
        opacities: &[f64],
    ) -> Result<Self, TypesError> {
        let n = xs.len();
        if ys.len() != n || zs.len() != n || opacities.len() != n {
            return Err(TypesError::LengthMismatch {
                x: n,
                y: ys.len(),
                z: zs.len(),
                opacity: opacities.len(),
            });
        }

        let points = xs
            .iter()
            .zip(ys)
            .zip(zs)
            .zip(opacities)
            .map(|(((&x, &y), &z), &o)| ScanPoint::from_coords(x, y, z, o))
            .collect();
        Ok(Self { points })
    }

    /// Builds a set where every point has the same opacity.
    #[must_use]
    pub fn from_positions(positions: &[Point3<f64>], opacity: f64) -> Self {
        positions
            .iter()
            .map(|&p| ScanPoint::new(p, opacity))
            .collect()
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The points, in input order.
    #[must_use]
    pub fn as_slice(&self) -> &[ScanPoint] {
        &self.points
    }

    /// Point at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ScanPoint> {
        self.points.get(index)
    }

    /// Iterates the points in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScanPoint> {
        self.points.iter()
    }

    /// Tight bounds of all positions; empty bounds for an empty set.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.points.iter().map(|p| &p.position))
    }

    /// Consumes the set, returning the points.
    #[must_use]
    pub fn into_inner(self) -> Vec<ScanPoint> {
        self.points
    }
}

impl FromIterator<ScanPoint> for PointSet {
    fn from_iter<I: IntoIterator<Item = ScanPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<ScanPoint>> for PointSet {
    fn from(points: Vec<ScanPoint>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a ScanPoint;
    type IntoIter = std::slice::Iter<'a, ScanPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

//! Radius outlier removal inside a single cluster.
//!
//! A member is kept when at least `min_neighbors` other members lie within
//! `radius` of it. Neighbors are counted through a [`FieldIndex`] built over
//! the cluster alone, so points outside the cluster never vouch for a member.

use std::fmt;

use nalgebra::Point3;
use scan_spatial::FieldIndex;
use scan_types::PointSet;

use crate::config::OutlierParams;
use crate::error::ScanResult;

/// Result of outlier removal on one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierRemovalResult {
    /// Retained positions, in input order.
    pub kept: Vec<Point3<f64>>,

    /// Input indices of the retained points.
    pub kept_indices: Vec<usize>,

    /// Number of input points.
    pub original_count: usize,

    /// Number of points dropped.
    pub outliers_removed: usize,
}

impl OutlierRemovalResult {
    /// Returns the percentage of points that were outliers.
    #[must_use]
    pub fn outlier_percentage(&self) -> f64 {
        if self.original_count == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            100.0 * self.outliers_removed as f64 / self.original_count as f64
        }
    }

    fn keep_all(points: &[Point3<f64>]) -> Self {
        Self {
            kept: points.to_vec(),
            kept_indices: (0..points.len()).collect(),
            original_count: points.len(),
            outliers_removed: 0,
        }
    }
}

impl fmt::Display for OutlierRemovalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Outlier removal: {} → {} points ({} removed, {:.1}%)",
            self.original_count,
            self.kept.len(),
            self.outliers_removed,
            self.outlier_percentage()
        )
    }
}

/// Drops members of a cluster with too few other members nearby.
///
/// `min_neighbors == 0` keeps every point.
///
/// # Errors
///
/// Returns an error if `params` fails validation.
///
/// # Example
///
/// ```
/// use scan_core::OutlierParams;
/// use scan_core::fit::remove_outliers;
/// use nalgebra::Point3;
///
/// let mut points: Vec<_> = (0..10).map(|i| Point3::new(f64::from(i) * 0.01, 0.0, 0.0)).collect();
/// points.push(Point3::new(3.0, 0.0, 0.0));
///
/// let params = OutlierParams { radius: 0.05, min_neighbors: 2 };
/// let result = remove_outliers(&points, &params).unwrap();
/// assert_eq!(result.outliers_removed, 1);
/// assert_eq!(result.kept.len(), 10);
/// ```
pub fn remove_outliers(
    points: &[Point3<f64>],
    params: &OutlierParams,
) -> ScanResult<OutlierRemovalResult> {
    params.validate()?;
    if params.min_neighbors == 0 || points.is_empty() {
        return Ok(OutlierRemovalResult::keep_all(points));
    }

    // A zero radius only matches coincident points, which share a cell of any size.
    let voxel_size = if params.radius > 0.0 { params.radius } else { 1.0 };
    let index = FieldIndex::build(PointSet::from_positions(points, 1.0), voxel_size)?;

    let mut kept = Vec::with_capacity(points.len());
    let mut kept_indices = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        // The count includes the point itself.
        let others = index
            .count_neighbors_in_radius(*point, params.radius)
            .saturating_sub(1);
        if others >= params.min_neighbors {
            kept.push(*point);
            kept_indices.push(i);
        }
    }

    Ok(OutlierRemovalResult {
        outliers_removed: points.len() - kept.len(),
        original_count: points.len(),
        kept,
        kept_indices,
    })
}

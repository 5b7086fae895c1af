//! Per-cluster denoising and oriented bounds fitting.
//!
//! [`ShapeFitter`] turns a [`RawCluster`] into a [`FittedShape`]:
//!
//! 1. [`remove_outliers`] drops members with too few nearby members
//! 2. [`fit_oriented_box`] fits a PCA-aligned box around the survivors
//!
//! The building blocks are public for callers that need them separately.

mod obb;
mod outlier;

pub use obb::{PrincipalAxes, centroid, fit_oriented_box, principal_axes};
pub use outlier::{OutlierRemovalResult, remove_outliers};

use nalgebra::Point3;
use scan_types::OrientedBox;
use tracing::{debug, warn};

use crate::cluster::RawCluster;
use crate::config::OutlierParams;
use crate::error::ScanResult;

/// Geometry fitted to one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedShape {
    /// Oriented bounds of the retained points.
    pub bounds: OrientedBox,
    /// Mean of the retained points.
    pub centroid: Point3<f64>,
    /// Mean opacity of the cluster's members before denoising.
    pub average_density: f64,
    /// Retained points.
    pub points: Vec<Point3<f64>>,
    /// Members dropped as outliers.
    pub outliers_removed: usize,
}

/// Denoises clusters and fits oriented bounds to them.
///
/// # Example
///
/// ```
/// use scan_core::{ClusterExtractor, ClusterParams, OutlierParams, ShapeFitter};
/// use scan_spatial::FieldIndex;
/// use scan_types::{PointSet, Point3};
///
/// let positions: Vec<_> = (0..20).map(|i| Point3::new(f64::from(i) * 0.02, 0.0, 0.0)).collect();
/// let index = FieldIndex::build(PointSet::from_positions(&positions, 1.0), 0.1).unwrap();
/// let clusters = ClusterExtractor::new(ClusterParams::new(0.05, 2))
///     .unwrap()
///     .extract(&index)
///     .raw_clusters(&index);
///
/// let fitter = ShapeFitter::new(OutlierParams::default()).unwrap();
/// let shape = fitter.fit(&clusters[0]).unwrap();
/// assert!(shape.bounds.extents.x > shape.bounds.extents.y);
/// ```
#[derive(Debug, Clone)]
pub struct ShapeFitter {
    outlier: OutlierParams,
}

impl ShapeFitter {
    /// Creates a fitter after validating `outlier`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`](crate::ScanError::InvalidParameter)
    /// for a negative or non-finite radius.
    pub fn new(outlier: OutlierParams) -> ScanResult<Self> {
        outlier.validate()?;
        Ok(Self { outlier })
    }

    /// The outlier removal parameters.
    #[must_use]
    pub const fn outlier_params(&self) -> &OutlierParams {
        &self.outlier
    }

    /// Denoises `cluster` and fits its bounds.
    ///
    /// When every member is removed the shape collapses to the center of the
    /// cluster's axis-aligned bounds.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`remove_outliers`].
    pub fn fit(&self, cluster: &RawCluster) -> ScanResult<FittedShape> {
        let denoised = remove_outliers(&cluster.points, &self.outlier)?;
        let outliers_removed = denoised.outliers_removed;
        let points = denoised.kept;

        let (bounds, centroid) = match fit_oriented_box(&points) {
            Some(bounds) => (bounds, bounds.center),
            None => {
                let center = cluster.bounds.center();
                warn!(
                    cluster = cluster.id,
                    members = cluster.len(),
                    "Every member removed as outlier, keeping cluster center"
                );
                (OrientedBox::point(center), center)
            }
        };

        debug!(
            cluster = cluster.id,
            kept = points.len(),
            outliers_removed,
            extents = ?bounds.extents,
            "Fitted cluster"
        );

        Ok(FittedShape {
            bounds,
            centroid,
            average_density: cluster.average_density,
            points,
            outliers_removed,
        })
    }
}

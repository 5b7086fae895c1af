//! Local surface analysis over a [`FieldIndex`].
//!
//! # Algorithm
//!
//! For every point, the other points within `normal_radius` are decomposed
//! with [`principal_axes`]. The axis of least variance is the normal and the
//! ratio of the smallest to the largest eigenvalue is the curvature: 0 on a
//! plane, 1 for isotropic scatter. Points with fewer than `min_neighbors`
//! neighbors get no normal and curvature 1.
//!
//! Points with curvature below `curvature_threshold` are surface candidates.
//! Candidates within `region_radius` of a region member join it, breadth-first
//! from the lowest unvisited index. Regions smaller than `min_region_size`
//! are discarded.

use std::collections::VecDeque;
use std::fmt;

use nalgebra::{Point3, Vector3};
use scan_spatial::FieldIndex;
use tracing::{debug, info};

use crate::config::SurfaceParams;
use crate::error::ScanResult;
use crate::fit::principal_axes;

/// Local surface estimate at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSurface {
    /// Unit normal; its sign is arbitrary. `None` when the neighborhood is
    /// too sparse.
    pub normal: Option<Vector3<f64>>,
    /// Smallest over largest local variance, in `[0, 1]`.
    pub curvature: f64,
}

impl PointSurface {
    /// Estimate for a point whose neighborhood is too sparse.
    pub const UNDETERMINED: Self = Self {
        normal: None,
        curvature: 1.0,
    };
}

/// Per-point surface estimates and the smooth regions grown from them.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceAnalysis {
    points: Vec<PointSurface>,
    candidates: usize,
    regions: Vec<Vec<usize>>,
}

impl SurfaceAnalysis {
    /// Estimates indexed like the points of the analyzed index.
    #[must_use]
    pub fn points(&self) -> &[PointSurface] {
        &self.points
    }

    /// Normal of point `i`, if one could be estimated.
    #[must_use]
    pub fn normal(&self, i: usize) -> Option<Vector3<f64>> {
        self.points.get(i).and_then(|p| p.normal)
    }

    /// Curvature of point `i`.
    #[must_use]
    pub fn curvature(&self, i: usize) -> Option<f64> {
        self.points.get(i).map(|p| p.curvature)
    }

    /// Number of points below the curvature threshold.
    #[must_use]
    pub const fn candidate_count(&self) -> usize {
        self.candidates
    }

    /// Connected smooth regions, member indices ascending.
    #[must_use]
    pub fn regions(&self) -> &[Vec<usize>] {
        &self.regions
    }

    /// Number of regions kept.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

impl fmt::Display for SurfaceAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points, {} surface candidates in {} regions",
            self.points.len(),
            self.candidates,
            self.regions.len()
        )
    }
}

/// Estimates normals and curvature and groups smooth points into regions.
///
/// # Example
///
/// ```
/// use scan_core::{SurfaceExtractor, SurfaceParams};
/// use scan_spatial::FieldIndex;
/// use scan_types::{PointSet, Point3};
///
/// let positions: Vec<_> = (0..36)
///     .map(|i| Point3::new(f64::from(i % 6) * 0.05, f64::from(i / 6) * 0.05, 0.0))
///     .collect();
/// let index = FieldIndex::build(PointSet::from_positions(&positions, 1.0), 0.1).unwrap();
///
/// let analysis = SurfaceExtractor::new(SurfaceParams::default()).unwrap().analyze(&index);
/// assert_eq!(analysis.region_count(), 1);
/// assert!(analysis.normal(0).unwrap().z.abs() > 0.99);
/// ```
#[derive(Debug, Clone)]
pub struct SurfaceExtractor {
    params: SurfaceParams,
    parallel: bool,
}

impl SurfaceExtractor {
    /// Creates an extractor after validating `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`](crate::ScanError::InvalidParameter)
    /// for non-positive radii, a threshold outside `[0, 1]` or too small counts.
    pub fn new(params: SurfaceParams) -> ScanResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            parallel: false,
        })
    }

    /// Estimates points on the rayon pool when the `parallel` feature is
    /// enabled. The result is unchanged.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The analysis parameters.
    #[must_use]
    pub const fn params(&self) -> &SurfaceParams {
        &self.params
    }

    /// Normal and curvature of point `i` from its neighbors, itself excluded.
    #[must_use]
    pub fn estimate(&self, index: &FieldIndex, i: usize) -> PointSurface {
        let Some(point) = index.point(i) else {
            return PointSurface::UNDETERMINED;
        };
        let neighbors: Vec<Point3<f64>> = index
            .neighbors_in_radius(point.position, self.params.normal_radius)
            .into_iter()
            .filter(|&k| k != i)
            .filter_map(|k| index.point(k).map(|p| p.position))
            .collect();
        if neighbors.len() < self.params.min_neighbors {
            return PointSurface::UNDETERMINED;
        }
        let Some(pca) = principal_axes(&neighbors) else {
            return PointSurface::UNDETERMINED;
        };

        let largest = pca.eigenvalues[0];
        let curvature = if largest.is_finite() && largest > 0.0 {
            (pca.eigenvalues[2] / largest).clamp(0.0, 1.0)
        } else {
            0.0
        };
        PointSurface {
            normal: Some(pca.axis(2)),
            curvature,
        }
    }

    /// Analyzes every point of `index`.
    #[must_use]
    pub fn analyze(&self, index: &FieldIndex) -> SurfaceAnalysis {
        let points = self.estimate_all(index);
        let candidate: Vec<bool> = points
            .iter()
            .map(|p| p.curvature < self.params.curvature_threshold)
            .collect();
        let candidates = candidate.iter().filter(|c| **c).count();

        let mut visited = vec![false; points.len()];
        let mut regions = Vec::new();
        let mut queue = VecDeque::new();

        for (seed, &is_candidate) in candidate.iter().enumerate() {
            if !is_candidate || visited[seed] {
                continue;
            }
            visited[seed] = true;
            queue.push_back(seed);

            let mut region = Vec::new();
            while let Some(j) = queue.pop_front() {
                region.push(j);
                let Some(point) = index.point(j) else {
                    continue;
                };
                for k in index.neighbors_in_radius(point.position, self.params.region_radius) {
                    if candidate[k] && !visited[k] {
                        visited[k] = true;
                        queue.push_back(k);
                    }
                }
            }

            if region.len() >= self.params.min_region_size {
                region.sort_unstable();
                debug!(region = regions.len(), members = region.len(), "Surface region closed");
                regions.push(region);
            }
        }

        info!(
            points = points.len(),
            candidates,
            regions = regions.len(),
            "Surface analysis complete"
        );
        SurfaceAnalysis {
            points,
            candidates,
            regions,
        }
    }

    #[cfg(feature = "parallel")]
    fn estimate_all(&self, index: &FieldIndex) -> Vec<PointSurface> {
        use rayon::prelude::*;

        if self.parallel {
            return (0..index.len())
                .into_par_iter()
                .map(|i| self.estimate(index, i))
                .collect();
        }
        (0..index.len()).map(|i| self.estimate(index, i)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn estimate_all(&self, index: &FieldIndex) -> Vec<PointSurface> {
        (0..index.len()).map(|i| self.estimate(index, i)).collect()
    }
}

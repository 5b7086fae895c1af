//! Continuous density estimation over a [`FieldIndex`].

use std::fmt;

use nalgebra::{Point3, Vector3};
use scan_types::Aabb;
use tracing::debug;

use crate::error::SpatialError;
use crate::index::FieldIndex;

/// Gradient finite-difference step, as a fraction of the voxel size.
const GRADIENT_STEP_FRACTION: f64 = 0.1;

/// Maximum gradient-ascent iterations in [`DensityField::find_local_maximum`].
const MAX_ASCENT_STEPS: usize = 64;

/// Largest lattice [`DensityField::sample_above`] will evaluate.
pub const MAX_SAMPLES: usize = 1 << 24;

/// A position and the density found there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityPeak {
    /// Where the density was evaluated.
    pub position: Point3<f64>,
    /// Density at `position`, in `[0, 1]`.
    pub density: f64,
}

/// Summary of the density evaluated at every occupied voxel center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DensityStatistics {
    /// Number of voxel centers sampled.
    pub sample_count: usize,
    /// Lowest sampled density.
    pub min: f64,
    /// Highest sampled density.
    pub max: f64,
    /// Mean sampled density.
    pub mean: f64,
    /// Median sampled density.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl fmt::Display for DensityStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Density over {} voxels: min {:.3}, max {:.3}, mean {:.3}, median {:.3}, std dev {:.3}",
            self.sample_count, self.min, self.max, self.mean, self.median, self.std_dev
        )
    }
}

/// Continuous scalar density derived from the opacity-weighted points of an index.
///
/// The density at a position is the mean of `opacity × max(0, 1 − d / support)`
/// over every point gathered from the 3×3×3 cell block, clamped to `[0, 1]`.
/// Gathered points beyond the support weigh zero but still count toward the
/// mean. It is exactly zero where no point is in range.
///
/// # Example
///
/// ```
/// use scan_spatial::{DensityField, FieldIndex};
/// use scan_types::{PointSet, Point3};
///
/// let index = FieldIndex::build(PointSet::from_positions(&[Point3::origin()], 0.5), 0.1).unwrap();
/// let field = DensityField::new(&index);
///
/// assert!((field.density_at(Point3::origin()) - 0.5).abs() < 1e-12);
/// assert_eq!(field.density_at(Point3::new(5.0, 0.0, 0.0)), 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DensityField<'a> {
    index: &'a FieldIndex,
    support_radius: f64,
}

impl<'a> DensityField<'a> {
    /// Creates a field with a support radius of twice the voxel size.
    #[must_use]
    pub fn new(index: &'a FieldIndex) -> Self {
        Self {
            index,
            support_radius: index.voxel_size() * 2.0,
        }
    }

    /// Replaces the support radius used by [`density_at`](Self::density_at).
    ///
    /// Candidates are still gathered from the 3×3×3 cell block, so radii
    /// beyond 1.5 voxels only soften the falloff.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidRadius`] if `radius` is not finite and
    /// strictly positive.
    pub fn with_support_radius(mut self, radius: f64) -> Result<Self, SpatialError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SpatialError::InvalidRadius(radius));
        }
        self.support_radius = radius;
        Ok(self)
    }

    /// The underlying index.
    #[must_use]
    pub const fn index(&self) -> &'a FieldIndex {
        self.index
    }

    /// Support radius of [`density_at`](Self::density_at).
    #[must_use]
    pub const fn support_radius(&self) -> f64 {
        self.support_radius
    }

    /// Density at `position`, gathering candidates from the 3×3×3 cell
    /// block around the position's cell.
    #[must_use]
    pub fn density_at(&self, position: Point3<f64>) -> f64 {
        let mut acc = Accumulator::default();
        for coord in self.index.world_to_grid(position).block() {
            let Some(voxel) = self.index.voxel(coord) else {
                continue;
            };
            for &i in voxel.point_indices() {
                if let Some(point) = self.index.point(i) {
                    let distance = (point.position - position).norm();
                    acc.add(point.opacity, distance, self.support_radius);
                }
            }
        }
        acc.density()
    }

    /// Density at `position` over every point within `radius` (inclusive),
    /// with weight `1 − d / radius`. Zero for a non-positive or NaN radius.
    #[must_use]
    pub fn density_at_radius(&self, position: Point3<f64>, radius: f64) -> f64 {
        if radius.is_nan() || radius <= 0.0 {
            return 0.0;
        }
        let mut acc = Accumulator::default();
        self.index.for_each_in_radius(position, radius, |i, distance| {
            if let Some(point) = self.index.point(i) {
                acc.add(point.opacity, distance, radius);
            }
        });
        acc.density()
    }

    /// Central-difference gradient of [`density_at`](Self::density_at).
    ///
    /// Points toward increasing density; zero on flat or empty regions.
    #[must_use]
    pub fn gradient_at(&self, position: Point3<f64>) -> Vector3<f64> {
        let h = self.index.voxel_size() * GRADIENT_STEP_FRACTION;
        let mut gradient = Vector3::zeros();
        for axis in 0..3 {
            let mut offset = Vector3::zeros();
            offset[axis] = h;
            let ahead = self.density_at(position + offset);
            let behind = self.density_at(position - offset);
            gradient[axis] = (ahead - behind) / (2.0 * h);
        }
        gradient
    }

    /// Climbs the density gradient from `start`, never leaving the sphere of
    /// `search_radius` around it, and returns the densest position visited.
    ///
    /// A non-positive radius returns `start` itself.
    #[must_use]
    pub fn find_local_maximum(&self, start: Point3<f64>, search_radius: f64) -> DensityPeak {
        let mut best = DensityPeak {
            position: start,
            density: self.density_at(start),
        };
        if search_radius.is_nan() || search_radius <= 0.0 {
            return best;
        }

        let min_step = self.index.voxel_size() * 1e-3;
        let mut step = (self.index.voxel_size() * 0.5).min(search_radius);

        for _ in 0..MAX_ASCENT_STEPS {
            let gradient = self.gradient_at(best.position);
            let Some(direction) = gradient.try_normalize(f64::EPSILON) else {
                break;
            };

            let mut candidate = best.position + direction * step;
            let offset = candidate - start;
            if offset.norm() > search_radius {
                candidate = start + offset.normalize() * search_radius;
            }

            let density = self.density_at(candidate);
            if density > best.density {
                best = DensityPeak {
                    position: candidate,
                    density,
                };
            } else {
                step *= 0.5;
                if step < min_step {
                    break;
                }
            }
        }

        best
    }

    /// Samples `bounds` on a regular lattice of spacing `step`, starting at
    /// `bounds.min`, and returns the positions whose density exceeds
    /// `threshold`. Empty bounds yield no samples.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidStep`] if `step` is not finite and
    /// strictly positive, and [`SpatialError::TooManySamples`] if the lattice
    /// would hold more than [`MAX_SAMPLES`] positions.
    pub fn sample_above(
        &self,
        bounds: &Aabb,
        threshold: f64,
        step: f64,
    ) -> Result<Vec<Point3<f64>>, SpatialError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(SpatialError::InvalidStep(step));
        }
        if bounds.is_empty() {
            return Ok(Vec::new());
        }

        let [nx, ny, nz] = lattice_counts(&bounds.size(), step)?;

        let mut samples = Vec::new();
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    #[allow(clippy::cast_precision_loss)]
                    let position = bounds.min + Vector3::new(i as f64, j as f64, k as f64) * step;
                    if self.density_at(position) > threshold {
                        samples.push(position);
                    }
                }
            }
        }
        Ok(samples)
    }

    /// Density statistics over the centers of all occupied voxels.
    #[must_use]
    pub fn statistics(&self) -> DensityStatistics {
        let mut coords: Vec<_> = self.index.voxels().map(|(coord, _)| *coord).collect();
        if coords.is_empty() {
            return DensityStatistics::default();
        }
        coords.sort_unstable();

        let mut values: Vec<f64> = coords
            .iter()
            .map(|&c| self.density_at(self.index.grid_to_world_center(c)))
            .collect();
        values.sort_unstable_by(f64::total_cmp);

        let n = values.len();
        #[allow(clippy::cast_precision_loss)]
        let count = n as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
        let median = if n % 2 == 0 {
            (values[n / 2 - 1] + values[n / 2]) * 0.5
        } else {
            values[n / 2]
        };

        let stats = DensityStatistics {
            sample_count: n,
            min: values[0],
            max: values[n - 1],
            mean,
            median,
            std_dev: variance.sqrt(),
        };
        debug!(
            voxels = n,
            mean = stats.mean,
            max = stats.max,
            "Computed density statistics"
        );
        stats
    }
}

/// Samples per axis of a lattice of spacing `step` over `size`, bounded by
/// [`MAX_SAMPLES`] in total.
fn lattice_counts(size: &Vector3<f64>, step: f64) -> Result<[usize; 3], SpatialError> {
    let too_many = SpatialError::TooManySamples { limit: MAX_SAMPLES };
    #[allow(clippy::cast_precision_loss)]
    let limit = MAX_SAMPLES as f64;

    let mut counts = [0usize; 3];
    for (count, extent) in counts.iter_mut().zip(size.iter()) {
        let intervals = (extent / step).floor();
        if intervals.is_nan() || intervals >= limit {
            return Err(too_many);
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let intervals = intervals as usize;
        *count = intervals.checked_add(1).ok_or_else(|| too_many.clone())?;
    }

    let total = counts
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .filter(|&total| total <= MAX_SAMPLES);
    match total {
        Some(_) => Ok(counts),
        None => Err(too_many),
    }
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, opacity: f64, distance: f64, radius: f64) {
        self.sum += opacity * (1.0 - distance / radius).max(0.0);
        self.count += 1;
    }

    fn density(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.sum / self.count as f64;
        mean.clamp(0.0, 1.0)
    }
}

//! Sparse voxel hash index over a point set.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use scan_types::{Aabb, PointSet, ScanPoint};
use tracing::debug;

use crate::error::SpatialError;
use crate::voxel::{CellRange, VoxelCoord};

/// One occupied cell: the indices of the points inside it and their mean opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Voxel {
    point_indices: Vec<usize>,
    average_opacity: f64,
}

impl Voxel {
    /// Indices into the indexed [`PointSet`], in ascending order.
    #[must_use]
    pub fn point_indices(&self) -> &[usize] {
        &self.point_indices
    }

    /// Mean opacity of the points in this cell.
    #[must_use]
    pub const fn average_opacity(&self) -> f64 {
        self.average_opacity
    }

    /// Number of points in this cell.
    #[must_use]
    pub fn len(&self) -> usize {
        self.point_indices.len()
    }

    /// Always `false` for cells stored in an index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.point_indices.is_empty()
    }
}

/// Spatial hash grid over an owned, immutable point set.
///
/// Each point is bucketed into the cell `floor(position / voxel_size)`. The
/// map is keyed by the full [`VoxelCoord`], so distinct cells never alias.
/// The index is built once and never patched; rebuild it for new points.
///
/// # Example
///
/// ```
/// use scan_spatial::FieldIndex;
/// use scan_types::{PointSet, Point3};
///
/// let points = PointSet::from_positions(
///     &[Point3::new(0.0, 0.0, 0.0), Point3::new(0.05, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)],
///     1.0,
/// );
/// let index = FieldIndex::build(points, 0.1).unwrap();
///
/// assert_eq!(index.voxel_count(), 2);
/// assert_eq!(index.neighbors_in_radius(Point3::origin(), 0.1), vec![0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct FieldIndex {
    voxel_size: f64,
    points: PointSet,
    voxels: HashMap<VoxelCoord, Voxel>,
    bounds: Aabb,
}

impl FieldIndex {
    /// Buckets every point of `points` into cells of edge `voxel_size`.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidVoxelSize`] if `voxel_size` is not
    /// finite and strictly positive.
    pub fn build(points: PointSet, voxel_size: f64) -> Result<Self, SpatialError> {
        if !voxel_size.is_finite() || voxel_size <= 0.0 {
            return Err(SpatialError::InvalidVoxelSize(voxel_size));
        }

        let mut buckets: HashMap<VoxelCoord, Vec<usize>> = HashMap::new();
        for (i, point) in points.iter().enumerate() {
            buckets
                .entry(cell_of(point.position, voxel_size))
                .or_default()
                .push(i);
        }

        let voxels: HashMap<VoxelCoord, Voxel> = buckets
            .into_iter()
            .map(|(coord, point_indices)| {
                let sum: f64 = point_indices
                    .iter()
                    .filter_map(|&i| points.get(i))
                    .map(|p| p.opacity)
                    .sum();
                #[allow(clippy::cast_precision_loss)]
                let average_opacity = sum / point_indices.len() as f64;
                (
                    coord,
                    Voxel {
                        point_indices,
                        average_opacity,
                    },
                )
            })
            .collect();

        let bounds = points.bounds();

        debug!(
            points = points.len(),
            voxels = voxels.len(),
            voxel_size,
            "Built field index"
        );

        Ok(Self {
            voxel_size,
            points,
            voxels,
            bounds,
        })
    }

    /// Edge length of a cell.
    #[must_use]
    pub const fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// The indexed points.
    #[must_use]
    pub const fn points(&self) -> &PointSet {
        &self.points
    }

    /// Point at `index`, if present.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<&ScanPoint> {
        self.points.get(index)
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no points are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.voxels.len()
    }

    /// Tight bounds of the indexed positions; empty for an empty index.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// The cell at `coord`, if occupied.
    #[must_use]
    pub fn voxel(&self, coord: VoxelCoord) -> Option<&Voxel> {
        self.voxels.get(&coord)
    }

    /// Iterates the occupied cells in arbitrary order.
    pub fn voxels(&self) -> impl Iterator<Item = (&VoxelCoord, &Voxel)> {
        self.voxels.iter()
    }

    /// Cell containing a world-space position.
    ///
    /// Non-finite coordinates saturate to the `i32` range.
    #[must_use]
    pub fn world_to_grid(&self, position: Point3<f64>) -> VoxelCoord {
        cell_of(position, self.voxel_size)
    }

    /// World-space center of a cell.
    #[must_use]
    pub fn grid_to_world_center(&self, coord: VoxelCoord) -> Point3<f64> {
        let half = self.voxel_size * 0.5;
        Point3::new(
            f64::from(coord.x).mul_add(self.voxel_size, half),
            f64::from(coord.y).mul_add(self.voxel_size, half),
            f64::from(coord.z).mul_add(self.voxel_size, half),
        )
    }

    /// Indices of the points sharing the cell of `position`, ascending.
    #[must_use]
    pub fn points_in_cell(&self, position: Point3<f64>) -> &[usize] {
        self.voxels
            .get(&self.world_to_grid(position))
            .map(|v| v.point_indices.as_slice())
            .unwrap_or(&[])
    }

    /// Indices of all points within Euclidean distance `radius` of
    /// `position` (inclusive), in ascending index order.
    ///
    /// A negative or NaN radius yields no neighbors.
    #[must_use]
    pub fn neighbors_in_radius(&self, position: Point3<f64>, radius: f64) -> Vec<usize> {
        let mut found = Vec::new();
        self.for_each_in_radius(position, radius, |i, _| found.push(i));
        found.sort_unstable();
        found
    }

    /// Number of points within `radius` of `position`, without allocating.
    #[must_use]
    pub fn count_neighbors_in_radius(&self, position: Point3<f64>, radius: f64) -> usize {
        let mut count = 0;
        self.for_each_in_radius(position, radius, |_, _| count += 1);
        count
    }

    /// Calls `visit(index, distance)` for every point within `radius` of
    /// `position`, in unspecified order.
    pub fn for_each_in_radius<F>(&self, position: Point3<f64>, radius: f64, mut visit: F)
    where
        F: FnMut(usize, f64),
    {
        if radius.is_nan() || radius < 0.0 || self.voxels.is_empty() {
            return;
        }

        let reach = Vector3::repeat(radius);
        let range = CellRange::new(
            self.world_to_grid(position - reach),
            self.world_to_grid(position + reach),
        );
        let radius_sq = radius * radius;

        let mut scan = |voxel: &Voxel| {
            for &i in &voxel.point_indices {
                if let Some(point) = self.points.get(i) {
                    let dist_sq = (point.position - position).norm_squared();
                    if dist_sq <= radius_sq {
                        visit(i, dist_sq.sqrt());
                    }
                }
            }
        };

        // Sweep whichever is smaller: the covered cells or the occupied ones.
        if range.cell_count() > self.voxels.len() as u64 {
            for (coord, voxel) in &self.voxels {
                if range.contains(*coord) {
                    scan(voxel);
                }
            }
        } else {
            for coord in range {
                if let Some(voxel) = self.voxels.get(&coord) {
                    scan(voxel);
                }
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(position: Point3<f64>, voxel_size: f64) -> VoxelCoord {
    VoxelCoord::new(
        (position.x / voxel_size).floor() as i32,
        (position.y / voxel_size).floor() as i32,
        (position.z / voxel_size).floor() as i32,
    )
}

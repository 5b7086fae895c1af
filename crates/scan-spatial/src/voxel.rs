//! Voxel cell coordinates and cell ranges.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer coordinate of one cubic cell of a [`FieldIndex`](crate::FieldIndex).
///
/// The index keys its hash map by the full coordinate triple, so two distinct
/// cells never share a bucket even when their hashes collide.
///
/// # Example
///
/// ```
/// use scan_spatial::VoxelCoord;
///
/// let coord = VoxelCoord::new(-1, 0, 4);
/// assert_eq!(coord.as_array(), [-1, 0, 4]);
/// assert_eq!(coord.block().iter().count(), 27);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoxelCoord {
    /// X cell index.
    pub x: i32,
    /// Y cell index.
    pub y: i32,
    /// Z cell index.
    pub z: i32,
}

impl VoxelCoord {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The coordinate as `[x, y, z]`.
    #[must_use]
    pub const fn as_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Offsets the coordinate, saturating at the `i32` range.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// The 3×3×3 block of cells centered on this one, itself included.
    #[must_use]
    pub const fn block(self) -> CellRange {
        CellRange::new(self.offset(-1, -1, -1), self.offset(1, 1, 1))
    }
}

/// An inclusive box of cells, iterated in Z-Y-X order (X varies fastest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Minimum corner (inclusive).
    pub min: VoxelCoord,
    /// Maximum corner (inclusive).
    pub max: VoxelCoord,
}

impl CellRange {
    /// Creates a range; the caller guarantees `min <= max` per axis.
    #[must_use]
    pub const fn new(min: VoxelCoord, max: VoxelCoord) -> Self {
        Self { min, max }
    }

    /// Number of cells in the range.
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        let w = u64::from(self.max.x.abs_diff(self.min.x)) + 1;
        let h = u64::from(self.max.y.abs_diff(self.min.y)) + 1;
        let d = u64::from(self.max.z.abs_diff(self.min.z)) + 1;
        w.saturating_mul(h).saturating_mul(d)
    }

    /// Returns `true` if the range contains `coord`.
    #[must_use]
    pub const fn contains(&self, coord: VoxelCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
            && coord.z >= self.min.z
            && coord.z <= self.max.z
    }

    /// Iterates every cell of the range.
    #[must_use]
    pub const fn iter(&self) -> CellRangeIter {
        CellRangeIter {
            range: *self,
            current: Some(self.min),
        }
    }
}

impl IntoIterator for CellRange {
    type Item = VoxelCoord;
    type IntoIter = CellRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the cells of a [`CellRange`].
#[derive(Debug, Clone)]
pub struct CellRangeIter {
    range: CellRange,
    current: Option<VoxelCoord>,
}

impl Iterator for CellRangeIter {
    type Item = VoxelCoord;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        let mut next = current;
        if next.x < self.range.max.x {
            next.x += 1;
        } else if next.y < self.range.max.y {
            next.x = self.range.min.x;
            next.y += 1;
        } else if next.z < self.range.max.z {
            next.x = self.range.min.x;
            next.y = self.range.min.y;
            next.z += 1;
        } else {
            self.current = None;
            return Some(current);
        }
        self.current = Some(next);

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_centered() {
        let block = VoxelCoord::new(5, -5, 0).block();
        assert_eq!(block.min, VoxelCoord::new(4, -6, -1));
        assert_eq!(block.max, VoxelCoord::new(6, -4, 1));
        assert_eq!(block.cell_count(), 27);
        assert!(block.contains(VoxelCoord::new(5, -5, 0)));
    }

    #[test]
    fn iteration_is_x_fastest() {
        let range = CellRange::new(VoxelCoord::new(0, 0, 0), VoxelCoord::new(1, 1, 0));
        let cells: Vec<_> = range.iter().collect();
        assert_eq!(
            cells,
            vec![
                VoxelCoord::new(0, 0, 0),
                VoxelCoord::new(1, 0, 0),
                VoxelCoord::new(0, 1, 0),
                VoxelCoord::new(1, 1, 0),
            ]
        );
    }

    #[test]
    fn single_cell_range() {
        let c = VoxelCoord::new(3, 3, 3);
        let range = CellRange::new(c, c);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![c]);
        assert_eq!(range.cell_count(), 1);
    }

    #[test]
    fn iteration_visits_every_cell_once() {
        let range = CellRange::new(VoxelCoord::new(-2, -1, 0), VoxelCoord::new(1, 1, 2));
        let mut cells: Vec<_> = range.iter().collect();
        let count = cells.len();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(count, 36);
        assert_eq!(cells.len(), 36);
        assert!(cells.iter().all(|&c| range.contains(c)));
    }

    #[test]
    fn offset_saturates() {
        let c = VoxelCoord::new(i32::MAX, i32::MIN, 0).offset(1, -1, 2);
        assert_eq!(c, VoxelCoord::new(i32::MAX, i32::MIN, 2));
    }
}

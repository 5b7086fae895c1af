//! Spatial indexing and density estimation for opacity-weighted point clouds.
//!
//! - [`FieldIndex`] - sparse voxel hash grid that owns the points and answers
//!   cell and radius queries
//! - [`VoxelCoord`] and [`CellRange`] - integer cell coordinates and boxes of cells
//! - [`DensityField`] - continuous density, gradients, peak search and
//!   sampling on top of an index
//!
//! Every neighborhood query in the scan pipeline goes through a
//! [`FieldIndex`]; nothing downstream scans the raw point list.
//!
//! # Coordinate Systems
//!
//! World positions are continuous `f64` values. A point at `p` lives in the
//! cell `floor(p / voxel_size)` per axis, so cell `(0, 0, 0)` spans
//! `[0, voxel_size)` on every axis and negative coordinates map to negative
//! cells.
//!
//! # Example
//!
//! ```
//! use scan_spatial::{DensityField, FieldIndex, VoxelCoord};
//! use scan_types::{PointSet, Point3};
//!
//! let points = PointSet::from_arrays(
//!     &[0.01, 0.02, 0.55],
//!     &[0.01, 0.03, 0.55],
//!     &[0.01, 0.01, 0.55],
//!     &[1.0, 0.8, 0.3],
//! )
//! .unwrap();
//! let index = FieldIndex::build(points, 0.1).unwrap();
//!
//! assert_eq!(index.world_to_grid(Point3::new(0.55, 0.55, 0.55)), VoxelCoord::new(5, 5, 5));
//! assert_eq!(index.points_in_cell(Point3::new(0.05, 0.05, 0.05)), &[0, 1]);
//!
//! let field = DensityField::new(&index);
//! assert!(field.density_at(Point3::new(0.015, 0.02, 0.01)) > 0.5);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod density;
mod error;
mod index;
mod voxel;

pub use density::{DensityField, DensityPeak, DensityStatistics, MAX_SAMPLES};
pub use error::SpatialError;
pub use index::{FieldIndex, Voxel};
pub use voxel::{CellRange, CellRangeIter, VoxelCoord};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

//! Point-cloud scene structuring.
//!
//! Turns an opacity-weighted point cloud into discrete entities with oriented
//! bounds and pairwise spatial relations:
//!
//! 1. [`FieldIndex`](scan_spatial::FieldIndex) voxelizes the points
//! 2. [`ClusterExtractor`] groups them with DBSCAN
//! 3. [`ShapeFitter`] drops outliers and fits a PCA-aligned box per cluster
//! 4. [`RelationshipGraph`] labels every ordered pair of entities
//! 5. [`ScanPipeline`] runs the stages and assembles a
//!    [`ScanPackage`](scan_types::ScanPackage)
//!
//! [`SurfaceExtractor`] is a separate pass over the same index that estimates
//! per-point normals and curvature and grows smooth surface regions.
//!
//! # Determinism
//!
//! Cluster ids, entity ids and relation order depend only on the input order
//! of the points. Enabling the `parallel` feature changes how work is
//! scheduled, never the result.
//!
//! # Example
//!
//! ```
//! use scan_core::{ScanConfig, ScanPipeline};
//! use scan_types::{PointSet, Point3, RelationKind};
//!
//! let mut positions = Vec::new();
//! for i in 0..5 {
//!     for j in 0..4 {
//!         let (x, y) = (f64::from(i) * 0.05, f64::from(j) * 0.05);
//!         positions.push(Point3::new(x, y, 0.0));
//!         positions.push(Point3::new(x, y + 1.0, 0.0));
//!     }
//! }
//!
//! let pipeline = ScanPipeline::new(ScanConfig::default()).unwrap();
//! let package = pipeline.run(PointSet::from_positions(&positions, 1.0)).unwrap();
//!
//! assert_eq!(package.entities.len(), 2);
//! let relation = package.relationship_between(1, 0).unwrap();
//! assert_eq!(relation.kind, RelationKind::Above);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod cluster;
mod config;
mod error;
pub mod fit;
mod graph;
mod identity;
mod pipeline;
mod surface;

pub use cluster::{ClusterExtractor, ClusterLabel, Clustering, RawCluster};
pub use config::{
    Axis, AxisConvention, ClusterParams, OutlierParams, RelationConfidences, RelationParams,
    ScanConfig, SurfaceParams,
};
pub use error::{ScanError, ScanResult};
pub use fit::{FittedShape, ShapeFitter};
pub use graph::RelationshipGraph;
pub use identity::{EntityIdentity, IdentityIssuer, PlaceholderIssuer};
pub use pipeline::ScanPipeline;
pub use surface::{PointSurface, SurfaceAnalysis, SurfaceExtractor};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

//! Data model for structured point-cloud scans.
//!
//! A scan turns an opacity-weighted point cloud into discrete scene entities.
//! This crate holds the plain data that flows through and out of that
//! pipeline:
//!
//! - [`ScanPoint`] and [`PointSet`] - the input cloud
//! - [`Aabb`] - axis-aligned bounds for raw clusters and the whole scene
//! - [`OrientedBox`] - principal-axis bounds fitted to an entity
//! - [`Entity`] - a fitted cluster with its opaque external identifiers
//! - [`SpatialRelationship`] and [`RelationKind`] - directed pairwise relations
//! - [`ScanPackage`] and [`ScanMetadata`] - everything handed to a serializer
//!
//! # Layer 0 Crate
//!
//! No algorithms live here and nothing depends on a rendering or physics
//! engine. Enable the `serde` feature to derive `Serialize`/`Deserialize` for
//! every type.
//!
//! # Coordinate System
//!
//! Positions are continuous `f64` world coordinates. Which axis counts as
//! "up" is decided by the relationship stage, not by these types.
//!
//! # Example
//!
//! ```
//! use scan_types::{PointSet, OrientedBox};
//! use nalgebra::{Point3, Vector3};
//!
//! let cloud = PointSet::from_arrays(
//!     &[0.0, 0.1, 0.2],
//!     &[0.0, 0.0, 0.0],
//!     &[0.0, 0.0, 0.0],
//!     &[1.0, 0.8, 0.9],
//! )
//! .unwrap();
//! assert_eq!(cloud.len(), 3);
//!
//! let obb = OrientedBox::axis_aligned(Point3::new(0.1, 0.0, 0.0), Vector3::new(0.1, 0.0, 0.0));
//! assert!(obb.is_orthonormal(1e-12));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod bounds;
mod entity;
mod error;
mod obb;
mod package;
mod point;
mod relation;

pub use bounds::Aabb;
pub use entity::{Entity, EntityId};
pub use error::TypesError;
pub use obb::OrientedBox;
pub use package::{ScanMetadata, ScanPackage};
pub use point::{PointSet, ScanPoint};
pub use relation::{RelationKind, SpatialRelationship};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Rotation3, Vector3};

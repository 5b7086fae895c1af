//! Scene entities produced by a scan.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::obb::OrientedBox;

/// Identifier of an entity, unique within one [`ScanPackage`](crate::ScanPackage).
pub type EntityId = u32;

/// A clustered group of points enriched with an oriented bounding volume.
///
/// `physics_handle` and `feature_hash` are opaque strings owned by external
/// systems; a scan fills them through an identity issuer and only guarantees
/// they differ between entities of the same package.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entity {
    /// Sequential id, starting at 0 within a package.
    pub id: EntityId,
    /// Oriented bounds fitted to the retained points.
    pub bounds: OrientedBox,
    /// Mean position of the retained points.
    pub centroid: Point3<f64>,
    /// Mean opacity of the cluster's members.
    pub average_density: f64,
    /// Denoised member positions, for external mesh reconstruction.
    pub points: Vec<Point3<f64>>,
    /// Opaque handle issued for a physics engine.
    pub physics_handle: String,
    /// Opaque feature hash issued for recognition systems.
    pub feature_hash: String,
}

impl Entity {
    /// Number of retained points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }
}

//! The structured output of a scan.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::entity::{Entity, EntityId};
use crate::relation::{RelationKind, SpatialRelationship};

/// Bookkeeping attached to a [`ScanPackage`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanMetadata {
    /// Package format version tag.
    pub version: String,
    /// RFC 3339 time the package was assembled.
    pub timestamp: String,
    /// Number of entities.
    pub entity_count: usize,
    /// Number of relationships.
    pub relationship_count: usize,
    /// Number of input points.
    pub point_count: usize,
    /// Input points labeled as noise by clustering.
    pub noise_count: usize,
    /// Cluster members dropped by outlier removal.
    pub outliers_removed: usize,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: f64,
}

impl ScanMetadata {
    /// Version tag written by this crate.
    pub const FORMAT_VERSION: &'static str = "1.0";
}

impl Default for ScanMetadata {
    fn default() -> Self {
        Self {
            version: Self::FORMAT_VERSION.to_string(),
            timestamp: String::new(),
            entity_count: 0,
            relationship_count: 0,
            point_count: 0,
            noise_count: 0,
            outliers_removed: 0,
            processing_time_ms: 0.0,
        }
    }
}

/// Entities, their relationships and scene-level bounds, handed whole to an
/// external serializer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanPackage {
    /// Entities, ordered by id.
    pub entities: Vec<Entity>,
    /// Directed relationships, ordered by source then target.
    pub relationships: Vec<SpatialRelationship>,
    /// Union of every entity's world-space bounds.
    pub global_bounds: Aabb,
    /// Counts and timing.
    pub metadata: ScanMetadata,
}

impl ScanPackage {
    /// Returns `true` if the scan found no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        // Ids are assigned sequentially, so the index is the fast path.
        usize::try_from(id)
            .ok()
            .and_then(|i| self.entities.get(i))
            .filter(|e| e.id == id)
            .or_else(|| self.entities.iter().find(|e| e.id == id))
    }

    /// Relations whose source is `id`.
    pub fn relationships_from(&self, id: EntityId) -> impl Iterator<Item = &SpatialRelationship> {
        self.relationships.iter().filter(move |r| r.source == id)
    }

    /// The relation recorded for the ordered pair, if any.
    #[must_use]
    pub fn relationship_between(
        &self,
        source: EntityId,
        target: EntityId,
    ) -> Option<&SpatialRelationship> {
        self.relationships
            .iter()
            .find(|r| r.source == source && r.target == target)
    }

    /// Relations of a given kind.
    pub fn relationships_of_kind(
        &self,
        kind: RelationKind,
    ) -> impl Iterator<Item = &SpatialRelationship> {
        self.relationships.iter().filter(move |r| r.kind == kind)
    }
}

impl fmt::Display for ScanPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scan package v{}: {} entities, {} relationships from {} points ({} noise, {} outliers) in {:.1} ms",
            self.metadata.version,
            self.entities.len(),
            self.relationships.len(),
            self.metadata.point_count,
            self.metadata.noise_count,
            self.metadata.outliers_removed,
            self.metadata.processing_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obb::OrientedBox;
    use nalgebra::Point3;

    fn entity(id: EntityId) -> Entity {
        Entity {
            id,
            bounds: OrientedBox::default(),
            centroid: Point3::origin(),
            average_density: 0.5,
            points: vec![Point3::origin()],
            physics_handle: format!("p{id}"),
            feature_hash: format!("f{id}"),
        }
    }

    fn package() -> ScanPackage {
        ScanPackage {
            entities: vec![entity(0), entity(1), entity(2)],
            relationships: vec![
                SpatialRelationship::new(0, 1, RelationKind::Above, 0.7),
                SpatialRelationship::new(1, 0, RelationKind::Below, 0.7),
                SpatialRelationship::new(0, 2, RelationKind::LeftOf, 0.6),
            ],
            ..ScanPackage::default()
        }
    }

    #[test]
    fn entity_lookup_by_id() {
        let pkg = package();
        assert_eq!(pkg.entity(2).map(|e| e.id), Some(2));
        assert!(pkg.entity(9).is_none());
    }

    #[test]
    fn relationship_queries() {
        let pkg = package();
        assert_eq!(pkg.relationships_from(0).count(), 2);
        assert_eq!(
            pkg.relationship_between(1, 0).map(|r| r.kind),
            Some(RelationKind::Below)
        );
        assert!(pkg.relationship_between(2, 1).is_none());
        assert_eq!(pkg.relationships_of_kind(RelationKind::LeftOf).count(), 1);
    }

    #[test]
    fn default_package_is_empty_and_versioned() {
        let pkg = ScanPackage::default();
        assert!(pkg.is_empty());
        assert_eq!(pkg.metadata.version, ScanMetadata::FORMAT_VERSION);
        assert_eq!(pkg.global_bounds.volume(), 0.0);
    }
}

//! Pairwise spatial relationship inference between entities.
//!
//! Every ordered pair `(a, b)` with `a != b` is classified by the first
//! matching rule, so a pair carries at most one relation:
//!
//! | Rule | Kind | Test |
//! |------|------|------|
//! | 1 | `Contains` | `b`'s center strictly inside `a`'s box |
//! | 2 | `ContainedBy` | `a`'s center strictly inside `b`'s box |
//! | 3 | `AdjacentTo` | centers closer than the adjacency threshold |
//! | 4 | `Above` / `Below` | vertical separation beyond the margin |
//! | 5 | `LeftOf` / `RightOf` | lateral separation beyond the margin |
//! | 6 | `FrontOf` / `Behind` | depth separation beyond the margin |
//!
//! Pairs matching no rule get no relation. Inference is quadratic in the
//! number of entities.

use scan_types::{Entity, RelationKind, SpatialRelationship};
use tracing::info;

use crate::config::RelationParams;
use crate::error::ScanResult;

/// Rule-based relationship classifier.
///
/// # Example
///
/// ```
/// use scan_core::{RelationParams, RelationshipGraph};
/// use scan_types::{Entity, OrientedBox, Point3, RelationKind, Vector3};
///
/// let entity = |id, x: f64, y: f64| Entity {
///     id,
///     bounds: OrientedBox::axis_aligned(Point3::new(x, y, 0.0), Vector3::new(0.05, 0.05, 0.05)),
///     centroid: Point3::new(x, y, 0.0),
///     average_density: 1.0,
///     points: Vec::new(),
///     physics_handle: String::new(),
///     feature_hash: String::new(),
/// };
///
/// let graph = RelationshipGraph::new(RelationParams::default()).unwrap();
/// let relations = graph.infer(&[entity(0, 0.0, 1.0), entity(1, 0.0, 0.0)]);
/// assert_eq!(relations.len(), 2);
/// assert_eq!(relations[0].kind, RelationKind::Above);
/// assert_eq!(relations[1].kind, RelationKind::Below);
/// ```
#[derive(Debug, Clone)]
pub struct RelationshipGraph {
    params: RelationParams,
    parallel: bool,
}

impl RelationshipGraph {
    /// Creates a classifier after validating `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`](crate::ScanError::InvalidParameter)
    /// for negative thresholds, confidences outside `[0, 1]` or a repeated axis.
    pub fn new(params: RelationParams) -> ScanResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            parallel: false,
        })
    }

    /// Classifies source entities on the rayon pool when the `parallel`
    /// feature is enabled. The output order is unchanged.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The rule parameters.
    #[must_use]
    pub const fn params(&self) -> &RelationParams {
        &self.params
    }

    /// Relation of the ordered pair `(a, b)`, if any rule matches.
    #[must_use]
    pub fn classify(&self, a: &Entity, b: &Entity) -> Option<SpatialRelationship> {
        let p = &self.params;
        let conf = &p.confidences;
        let ca = a.bounds.center;
        let cb = b.bounds.center;
        let relation = |kind, confidence| Some(SpatialRelationship::new(a.id, b.id, kind, confidence));

        if a.bounds.contains_strict(&cb) {
            return relation(RelationKind::Contains, conf.containment);
        }
        if b.bounds.contains_strict(&ca) {
            return relation(RelationKind::ContainedBy, conf.containment);
        }
        if (ca - cb).norm() < p.adjacency_threshold {
            return relation(RelationKind::AdjacentTo, conf.adjacency);
        }

        let delta = ca - cb;
        let directional = [
            (
                delta[p.axes.vertical.index()],
                p.vertical_margin,
                RelationKind::Above,
                RelationKind::Below,
                conf.vertical,
            ),
            (
                delta[p.axes.lateral.index()],
                p.lateral_margin,
                RelationKind::RightOf,
                RelationKind::LeftOf,
                conf.lateral,
            ),
            (
                delta[p.axes.depth.index()],
                p.depth_margin,
                RelationKind::FrontOf,
                RelationKind::Behind,
                conf.depth,
            ),
        ];
        for (separation, margin, positive, negative, confidence) in directional {
            if separation > margin {
                return relation(positive, confidence);
            }
            if separation < -margin {
                return relation(negative, confidence);
            }
        }

        None
    }

    /// Relations of every ordered pair, sorted by source then target.
    #[must_use]
    pub fn infer(&self, entities: &[Entity]) -> Vec<SpatialRelationship> {
        let relations = self.classify_all(entities);
        info!(
            entities = entities.len(),
            relationships = relations.len(),
            "Inferred spatial relationships"
        );
        relations
    }

    /// Relations from `entities[source]` to every other slot of `entities`.
    fn relations_from(&self, source: usize, entities: &[Entity]) -> Vec<SpatialRelationship> {
        let a = &entities[source];
        entities
            .iter()
            .enumerate()
            .filter(|&(target, _)| target != source)
            .filter_map(|(_, b)| self.classify(a, b))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn classify_all(&self, entities: &[Entity]) -> Vec<SpatialRelationship> {
        use rayon::prelude::*;

        if self.parallel {
            let per_source: Vec<_> = (0..entities.len())
                .into_par_iter()
                .map(|source| self.relations_from(source, entities))
                .collect();
            return per_source.into_iter().flatten().collect();
        }
        self.classify_sequential(entities)
    }

    #[cfg(not(feature = "parallel"))]
    fn classify_all(&self, entities: &[Entity]) -> Vec<SpatialRelationship> {
        self.classify_sequential(entities)
    }

    fn classify_sequential(&self, entities: &[Entity]) -> Vec<SpatialRelationship> {
        (0..entities.len())
            .flat_map(|source| self.relations_from(source, entities))
            .collect()
    }
}

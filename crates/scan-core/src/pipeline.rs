//! End-to-end scan: points in, [`ScanPackage`] out.

use std::fmt;
use std::time::Instant;

use chrono::Utc;
use scan_spatial::FieldIndex;
use scan_types::{Aabb, Entity, EntityId, PointSet, ScanMetadata, ScanPackage};
use tracing::{debug, info};

use crate::cluster::{ClusterExtractor, RawCluster};
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::fit::{FittedShape, ShapeFitter};
use crate::graph::RelationshipGraph;
use crate::identity::{IdentityIssuer, PlaceholderIssuer};
use crate::surface::{SurfaceAnalysis, SurfaceExtractor};

/// Orchestrates indexing, clustering, fitting and relationship inference.
///
/// A pipeline holds only its validated configuration and identity issuer;
/// each [`run`](Self::run) builds and drops its own index, so runs share no
/// state.
///
/// # Example
///
/// ```
/// use scan_core::{ScanConfig, ScanPipeline};
///
/// let mut xs = Vec::new();
/// let mut ys = Vec::new();
/// for i in 0..5 {
///     for j in 0..4 {
///         xs.push(f64::from(i) * 0.05);
///         ys.push(f64::from(j) * 0.05);
///     }
/// }
/// let zs = vec![0.0; xs.len()];
/// let opacity = vec![0.9; xs.len()];
///
/// let pipeline = ScanPipeline::new(ScanConfig::default()).unwrap();
/// let package = pipeline.run_arrays(&xs, &ys, &zs, &opacity).unwrap();
///
/// assert_eq!(package.entities.len(), 1);
/// assert_eq!(package.entities[0].physics_handle, "physics_0");
/// assert_eq!(package.metadata.point_count, 20);
/// ```
pub struct ScanPipeline {
    config: ScanConfig,
    extractor: ClusterExtractor,
    fitter: ShapeFitter,
    graph: RelationshipGraph,
    surfaces: SurfaceExtractor,
    issuer: Box<dyn IdentityIssuer + Send + Sync>,
}

impl fmt::Debug for ScanPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScanPipeline {
    /// Creates a pipeline with the placeholder identity issuer.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`] if `config` fails validation.
    pub fn new(config: ScanConfig) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self {
            extractor: ClusterExtractor::new(config.cluster)?.with_parallel(config.parallel),
            fitter: ShapeFitter::new(config.outlier)?,
            graph: RelationshipGraph::new(config.relations)?.with_parallel(config.parallel),
            surfaces: SurfaceExtractor::new(config.surface)?.with_parallel(config.parallel),
            issuer: Box::new(PlaceholderIssuer),
            config,
        })
    }

    /// Replaces the identity issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl IdentityIssuer + Send + Sync + 'static) -> Self {
        self.issuer = Box::new(issuer);
        self
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Builds the spatial index a run would use, for density queries outside
    /// the pipeline.
    ///
    /// # Errors
    ///
    /// Propagates [`SpatialError`](scan_spatial::SpatialError) from the index.
    pub fn build_index(&self, points: PointSet) -> ScanResult<FieldIndex> {
        Ok(FieldIndex::build(points, self.config.voxel_size)?)
    }

    /// Estimates normals and curvature over `index` and grows smooth regions.
    ///
    /// Independent of [`run`](Self::run); pair it with
    /// [`build_index`](Self::build_index).
    #[must_use]
    pub fn analyze_surfaces(&self, index: &FieldIndex) -> SurfaceAnalysis {
        self.surfaces.analyze(index)
    }

    /// Scans parallel coordinate and opacity arrays.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Input`] if the arrays differ in length.
    pub fn run_arrays(
        &self,
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
        opacities: &[f64],
    ) -> ScanResult<ScanPackage> {
        let points = PointSet::from_arrays(xs, ys, zs, opacities)?;
        self.run(points)
    }

    /// Scans a point set.
    ///
    /// An empty set yields an empty package with zero-volume bounds at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::TooManyEntities`] if the cluster count overflows
    /// [`EntityId`].
    pub fn run(&self, points: PointSet) -> ScanResult<ScanPackage> {
        let start = Instant::now();
        let point_count = points.len();
        info!(
            points = point_count,
            voxel_size = self.config.voxel_size,
            "Starting scan"
        );

        let index = self.build_index(points)?;
        let clustering = self.extractor.extract(&index);
        let clusters = clustering.raw_clusters(&index);
        drop(index);

        let shapes = self.fit_all(&clusters)?;
        let outliers_removed: usize = shapes.iter().map(|s| s.outliers_removed).sum();

        let cluster_count = shapes.len();
        let entities = shapes
            .into_iter()
            .enumerate()
            .map(|(i, shape)| {
                let id = EntityId::try_from(i).map_err(|_| ScanError::TooManyEntities(cluster_count))?;
                Ok(self.make_entity(id, shape))
            })
            .collect::<ScanResult<Vec<_>>>()?;

        let relationships = self.graph.infer(&entities);
        let global_bounds = global_bounds(&entities);

        let metadata = ScanMetadata {
            version: ScanMetadata::FORMAT_VERSION.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            entity_count: entities.len(),
            relationship_count: relationships.len(),
            point_count,
            noise_count: clustering.noise_count(),
            outliers_removed,
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        info!(
            entities = metadata.entity_count,
            relationships = metadata.relationship_count,
            noise = metadata.noise_count,
            outliers_removed,
            elapsed_ms = metadata.processing_time_ms,
            "Scan complete"
        );

        Ok(ScanPackage {
            entities,
            relationships,
            global_bounds,
            metadata,
        })
    }

    fn make_entity(&self, id: EntityId, shape: FittedShape) -> Entity {
        let identity = self.issuer.issue(id, &shape);
        debug!(entity = id, points = shape.points.len(), "Entity assembled");
        Entity {
            id,
            bounds: shape.bounds,
            centroid: shape.centroid,
            average_density: shape.average_density,
            points: shape.points,
            physics_handle: identity.physics_handle,
            feature_hash: identity.feature_hash,
        }
    }

    #[cfg(feature = "parallel")]
    fn fit_all(&self, clusters: &[RawCluster]) -> ScanResult<Vec<FittedShape>> {
        use rayon::prelude::*;

        if self.config.parallel {
            return clusters.par_iter().map(|c| self.fitter.fit(c)).collect();
        }
        clusters.iter().map(|c| self.fitter.fit(c)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn fit_all(&self, clusters: &[RawCluster]) -> ScanResult<Vec<FittedShape>> {
        clusters.iter().map(|c| self.fitter.fit(c)).collect()
    }
}

/// Union of the world-space bounds of every entity box.
///
/// Zero-volume bounds at the origin when there are no entities.
fn global_bounds(entities: &[Entity]) -> Aabb {
    let bounds = entities
        .iter()
        .fold(Aabb::empty(), |acc, e| acc.union(&e.bounds.world_aabb()));
    if bounds.is_empty() {
        Aabb::default()
    } else {
        bounds
    }
}

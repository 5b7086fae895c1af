//! End-to-end scenarios for the scan pipeline.
//!
//! Each test drives the public API from raw points through to a package or a
//! single stage output, the way a caller would.
//!
//! Run with: cargo test -p scan-core --test scenarios

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::float_cmp)]

use approx::assert_relative_eq;
use scan_core::fit::{fit_oriented_box, principal_axes};
use scan_core::{
    ClusterExtractor, ClusterParams, OutlierParams, RelationshipGraph, RelationParams, ScanConfig,
    ScanError, ScanPipeline, SurfaceExtractor, SurfaceParams,
};
use scan_spatial::{DensityField, FieldIndex};
use scan_types::{
    Aabb, Entity, OrientedBox, Point3, PointSet, RelationKind, ScanPoint, TypesError, Vector3,
};

// =============================================================================
// Fixtures
// =============================================================================

/// A 5 x 4 grid of points spaced 0.1 apart in the XY plane.
fn grid(origin: Point3<f64>, opacity: f64) -> Vec<ScanPoint> {
    let mut points = Vec::with_capacity(20);
    for i in 0..5 {
        for j in 0..4 {
            let offset = Vector3::new(f64::from(i) * 0.1, f64::from(j) * 0.1, 0.0);
            points.push(ScanPoint::new(origin + offset, opacity));
        }
    }
    points
}

/// Three grids separated by gaps well over 0.2.
fn three_groups() -> PointSet {
    let mut points = grid(Point3::new(0.0, 0.0, 0.0), 1.0);
    points.extend(grid(Point3::new(2.0, 0.0, 0.0), 0.7));
    points.extend(grid(Point3::new(0.0, 0.0, 2.0), 0.4));
    PointSet::from(points)
}

fn entity(id: u32, bounds: OrientedBox) -> Entity {
    Entity {
        id,
        bounds,
        centroid: bounds.center,
        average_density: 1.0,
        points: vec![bounds.center],
        physics_handle: format!("physics_{id}"),
        feature_hash: format!("feature_{id}"),
    }
}

fn grid_config() -> ScanConfig {
    ScanConfig::default()
        .with_eps(0.15)
        .with_min_points(5)
        .with_outlier(OutlierParams::disabled())
}

// =============================================================================
// Clustering
// =============================================================================

mod clustering {
    use super::*;

    #[test]
    fn three_separated_groups_give_three_clusters() {
        let index = FieldIndex::build(three_groups(), 0.1).unwrap();
        let clustering = ClusterExtractor::new(ClusterParams::new(0.15, 5))
            .unwrap()
            .extract(&index);

        assert_eq!(clustering.cluster_count(), 3);
        assert_eq!(clustering.noise_count(), 0);
        for (id, members) in clustering.clusters().iter().enumerate() {
            assert_eq!(members.len(), 20);
            assert!(members.iter().all(|&i| i / 20 == id));
        }
    }

    #[test]
    fn raw_cluster_density_is_mean_opacity() {
        let index = FieldIndex::build(three_groups(), 0.1).unwrap();
        let clusters = ClusterExtractor::new(ClusterParams::new(0.15, 5))
            .unwrap()
            .extract(&index)
            .raw_clusters(&index);

        let densities: Vec<_> = clusters.iter().map(|c| c.average_density).collect();
        assert_relative_eq!(densities[0], 1.0);
        assert_relative_eq!(densities[1], 0.7, epsilon = 1e-12);
        assert_relative_eq!(densities[2], 0.4, epsilon = 1e-12);
    }
}

// =============================================================================
// Density
// =============================================================================

mod density {
    use super::*;

    #[test]
    fn single_point_density_is_bounded_by_its_opacity() {
        let points = PointSet::from(vec![ScanPoint::from_coords(0.0, 0.0, 0.0, 0.5)]);
        let index = FieldIndex::build(points, 0.1).unwrap();
        let density = DensityField::new(&index).density_at(Point3::origin());

        assert!(density > 0.0);
        assert!(density <= 0.5);
    }

    #[test]
    fn density_vanishes_far_from_points() {
        let index = FieldIndex::build(three_groups(), 0.1).unwrap();
        let field = DensityField::new(&index);
        assert_eq!(field.density_at(Point3::new(10.0, 10.0, 10.0)), 0.0);
        assert!(field.density_at(Point3::new(0.2, 0.15, 0.0)) > 0.0);
    }
}

// =============================================================================
// Shape Fitting
// =============================================================================

mod fitting {
    use super::*;

    #[test]
    fn planar_cluster_has_flat_normal_axis() {
        let points: Vec<_> = grid(Point3::new(1.0, -1.0, 0.0), 1.0)
            .iter()
            .map(|p| p.position)
            .collect();

        let pca = principal_axes(&points).unwrap();
        assert_relative_eq!(pca.eigenvalues.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(pca.axis(2).z.abs(), 1.0, epsilon = 1e-9);

        let obb = fit_oriented_box(&points).unwrap();
        assert_relative_eq!(obb.extents.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(obb.axis(2).z.abs(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(obb.extents.x, 0.2, epsilon = 1e-9);
        assert_relative_eq!(obb.extents.y, 0.15, epsilon = 1e-9);
    }
}

// =============================================================================
// Surfaces
// =============================================================================

mod surfaces {
    use super::*;

    #[test]
    fn each_flat_group_is_one_surface_region() {
        let index = FieldIndex::build(three_groups(), 0.1).unwrap();
        let params = SurfaceParams::default().with_radii(0.15, 0.2);
        let analysis = SurfaceExtractor::new(params).unwrap().analyze(&index);

        assert_eq!(analysis.candidate_count(), 60);
        assert_eq!(analysis.region_count(), 3);
        for (k, region) in analysis.regions().iter().enumerate() {
            assert_eq!(region, &(k * 20..(k + 1) * 20).collect::<Vec<_>>());
        }
        for surface in analysis.points() {
            assert_relative_eq!(surface.normal.unwrap().z.abs(), 1.0, epsilon = 1e-9);
        }
    }
}

// =============================================================================
// Relationships
// =============================================================================

mod relationships {
    use super::*;

    #[test]
    fn enclosing_box_contains_with_one_relation() {
        let outer = entity(0, OrientedBox::axis_aligned(Point3::origin(), Vector3::repeat(1.0)));
        let inner = entity(1, OrientedBox::axis_aligned(Point3::new(0.5, 0.5, 0.5), Vector3::repeat(0.1)));
        let graph = RelationshipGraph::new(RelationParams::default()).unwrap();

        let relations = graph.infer(&[outer, inner]);
        let forward: Vec<_> = relations
            .iter()
            .filter(|r| r.source == 0 && r.target == 1)
            .collect();

        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].kind, RelationKind::Contains);
        assert_eq!(forward[0].confidence, 0.9);

        let backward: Vec<_> = relations
            .iter()
            .filter(|r| r.source == 1 && r.target == 0)
            .collect();
        assert_eq!(backward.len(), 1);
        assert_eq!(backward[0].kind, RelationKind::ContainedBy);
    }
}

// =============================================================================
// Pipeline
// =============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn three_groups_become_three_entities() {
        let package = ScanPipeline::new(grid_config())
            .unwrap()
            .run(three_groups())
            .unwrap();

        assert_eq!(package.entities.len(), 3);
        let ids: Vec<_> = package.entities.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(package.entities.iter().all(|e| e.point_count() == 20));

        // Every ordered pair is separated along some axis.
        assert_eq!(package.relationships.len(), 6);
        assert_eq!(
            package.relationship_between(1, 0).map(|r| r.kind),
            Some(RelationKind::RightOf)
        );
        assert_eq!(
            package.relationship_between(2, 0).map(|r| r.kind),
            Some(RelationKind::FrontOf)
        );
    }

    #[test]
    fn global_bounds_cover_every_entity() {
        let package = ScanPipeline::new(grid_config())
            .unwrap()
            .run(three_groups())
            .unwrap();

        let expected = package
            .entities
            .iter()
            .fold(Aabb::empty(), |acc, e| acc.union(&e.bounds.world_aabb()));
        assert_relative_eq!(package.global_bounds.min, expected.min, epsilon = 1e-12);
        assert_relative_eq!(package.global_bounds.max, expected.max, epsilon = 1e-12);
        assert!(package.global_bounds.contains(&Point3::new(0.2, 0.15, 0.0)));
        assert!(package.global_bounds.contains(&Point3::new(2.2, 0.15, 0.0)));
    }

    #[test]
    fn metadata_matches_package() {
        let mut points = three_groups().into_inner();
        points.push(ScanPoint::from_coords(-5.0, -5.0, -5.0, 1.0));
        let package = ScanPipeline::new(grid_config())
            .unwrap()
            .run(PointSet::from(points))
            .unwrap();

        let meta = &package.metadata;
        assert_eq!(meta.version, "1.0");
        assert_eq!(meta.entity_count, package.entities.len());
        assert_eq!(meta.relationship_count, package.relationships.len());
        assert_eq!(meta.point_count, 61);
        assert_eq!(meta.noise_count, 1);
        assert_eq!(meta.outliers_removed, 0);
        assert!(meta.processing_time_ms >= 0.0);
        assert!(chrono::DateTime::parse_from_rfc3339(&meta.timestamp).is_ok());
    }

    #[test]
    fn empty_input_gives_empty_package() {
        let package = ScanPipeline::new(ScanConfig::default())
            .unwrap()
            .run_arrays(&[], &[], &[], &[])
            .unwrap();

        assert!(package.entities.is_empty());
        assert!(package.relationships.is_empty());
        assert_eq!(package.global_bounds, Aabb::from_point(Point3::origin()));
        assert_eq!(package.metadata.point_count, 0);
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let err = ScanPipeline::new(ScanConfig::default())
            .unwrap()
            .run_arrays(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], &[0.0, 1.0], &[1.0, 1.0, 1.0])
            .unwrap_err();

        assert_eq!(
            err,
            ScanError::Input(TypesError::LengthMismatch {
                x: 3,
                y: 3,
                z: 2,
                opacity: 3,
            })
        );
    }

    #[test]
    fn room_preset_uses_z_up() {
        let mut points = grid(Point3::new(0.0, 0.0, 0.0), 1.0);
        points.extend(grid(Point3::new(0.0, 0.0, 3.0), 1.0));
        let config = ScanConfig::for_room_scan()
            .with_eps(0.15)
            .with_min_points(5)
            .with_outlier(OutlierParams::disabled());
        let package = ScanPipeline::new(config).unwrap().run(PointSet::from(points)).unwrap();

        assert_eq!(package.entities.len(), 2);
        assert_eq!(
            package.relationship_between(1, 0).map(|r| r.kind),
            Some(RelationKind::Above)
        );
    }
}

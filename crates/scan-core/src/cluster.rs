//! Density-based clustering (DBSCAN) over a [`FieldIndex`].
//!
//! # Algorithm
//!
//! Points are visited in ascending index order. A point with at least
//! `min_points` other points within `eps` is a core point and opens a
//! cluster, which grows breadth-first through a FIFO queue:
//!
//! 1. A popped point previously marked noise joins as a border point
//! 2. A popped unvisited point joins, and if it is itself a core point its
//!    unassigned neighbors are queued
//!
//! Points reachable from no core point stay noise. A border point reachable
//! from several clusters belongs to the one discovered first, so the
//! partition depends only on the input order.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

use nalgebra::Point3;
use scan_spatial::FieldIndex;
use scan_types::Aabb;
use tracing::{debug, info};

use crate::config::ClusterParams;
use crate::error::ScanResult;

/// Classification of one point after clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterLabel {
    /// Not yet reached. Never present in a finished [`Clustering`].
    Unvisited,
    /// Not density-reachable from any core point.
    Noise,
    /// Member of the cluster with this id.
    Cluster(usize),
}

impl ClusterLabel {
    /// The cluster id, if the point belongs to one.
    #[must_use]
    pub const fn cluster_id(self) -> Option<usize> {
        match self {
            Self::Cluster(id) => Some(id),
            Self::Unvisited | Self::Noise => None,
        }
    }
}

/// A cluster between extraction and fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCluster {
    /// Cluster id, in discovery order.
    pub id: usize,
    /// Axis-aligned bounds of the members.
    pub bounds: Aabb,
    /// Mean opacity of the members.
    pub average_density: f64,
    /// Member indices into the indexed point set, ascending.
    pub member_indices: Vec<usize>,
    /// Member positions, in the order of `member_indices`.
    pub points: Vec<Point3<f64>>,
}

impl RawCluster {
    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.member_indices.len()
    }

    /// Returns `true` if the cluster has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.member_indices.is_empty()
    }
}

/// Partition of an indexed point set into clusters and noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    labels: Vec<ClusterLabel>,
    clusters: Vec<Vec<usize>>,
}

impl Clustering {
    /// Per-point labels, indexed like the point set.
    #[must_use]
    pub fn labels(&self) -> &[ClusterLabel] {
        &self.labels
    }

    /// Label of point `index`.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<ClusterLabel> {
        self.labels.get(index).copied()
    }

    /// Member indices of each cluster, ascending, by cluster id.
    #[must_use]
    pub fn clusters(&self) -> &[Vec<usize>] {
        &self.clusters
    }

    /// Number of clusters.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Number of points labeled noise.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|l| matches!(l, ClusterLabel::Noise))
            .count()
    }

    /// Indices of the noise points, ascending.
    pub fn noise(&self) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| matches!(l, ClusterLabel::Noise))
            .map(|(i, _)| i)
    }

    /// Materializes every cluster with its positions, bounds and mean opacity.
    ///
    /// `index` must be the index the clustering was computed on.
    #[must_use]
    pub fn raw_clusters(&self, index: &FieldIndex) -> Vec<RawCluster> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(id, members)| {
                let mut points = Vec::with_capacity(members.len());
                let mut opacity_sum = 0.0;
                for point in members.iter().filter_map(|&i| index.point(i)) {
                    points.push(point.position);
                    opacity_sum += point.opacity;
                }
                #[allow(clippy::cast_precision_loss)]
                let average_density = if points.is_empty() {
                    0.0
                } else {
                    opacity_sum / points.len() as f64
                };
                RawCluster {
                    id,
                    bounds: Aabb::from_points(points.iter()),
                    average_density,
                    member_indices: members.clone(),
                    points,
                }
            })
            .collect()
    }
}

impl fmt::Display for Clustering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clustering: {} points → {} clusters, {} noise",
            self.labels.len(),
            self.cluster_count(),
            self.noise_count()
        )
    }
}

/// DBSCAN cluster extractor.
///
/// # Example
///
/// ```
/// use scan_core::{ClusterExtractor, ClusterParams};
/// use scan_spatial::FieldIndex;
/// use scan_types::{PointSet, Point3};
///
/// let positions: Vec<_> = (0..6).map(|i| Point3::new(f64::from(i) * 0.05, 0.0, 0.0)).collect();
/// let index = FieldIndex::build(PointSet::from_positions(&positions, 1.0), 0.1).unwrap();
///
/// let extractor = ClusterExtractor::new(ClusterParams::new(0.1, 2)).unwrap();
/// let clustering = extractor.extract(&index);
/// assert_eq!(clustering.cluster_count(), 1);
/// assert_eq!(clustering.noise_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ClusterExtractor {
    params: ClusterParams,
    parallel: bool,
}

impl ClusterExtractor {
    /// Creates an extractor after validating `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`](crate::ScanError::InvalidParameter)
    /// if `eps` is not positive or `min_points` is zero.
    pub fn new(params: ClusterParams) -> ScanResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            parallel: false,
        })
    }

    /// Precomputes neighborhoods on the rayon pool when the `parallel`
    /// feature is enabled. The partition is unchanged.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The clustering parameters.
    #[must_use]
    pub const fn params(&self) -> &ClusterParams {
        &self.params
    }

    /// Partitions the points of `index`.
    #[must_use]
    pub fn extract(&self, index: &FieldIndex) -> Clustering {
        let n = index.len();
        let precomputed = self.precompute(index);
        let precomputed = precomputed.as_deref();

        let mut labels = vec![ClusterLabel::Unvisited; n];
        let mut clusters: Vec<Vec<usize>> = Vec::new();
        let mut queue = VecDeque::new();

        for i in 0..n {
            if labels[i] != ClusterLabel::Unvisited {
                continue;
            }

            let neighbors = self.neighbors_of(index, precomputed, i);
            if neighbors.len() < self.params.min_points {
                labels[i] = ClusterLabel::Noise;
                continue;
            }

            let id = clusters.len();
            labels[i] = ClusterLabel::Cluster(id);
            let mut members = vec![i];
            queue.extend(neighbors.iter().copied());

            while let Some(j) = queue.pop_front() {
                match labels[j] {
                    ClusterLabel::Cluster(_) => {}
                    ClusterLabel::Noise => {
                        labels[j] = ClusterLabel::Cluster(id);
                        members.push(j);
                    }
                    ClusterLabel::Unvisited => {
                        labels[j] = ClusterLabel::Cluster(id);
                        members.push(j);

                        let reach = self.neighbors_of(index, precomputed, j);
                        if reach.len() >= self.params.min_points {
                            queue.extend(
                                reach
                                    .iter()
                                    .copied()
                                    .filter(|&k| labels[k].cluster_id().is_none()),
                            );
                        }
                    }
                }
            }

            members.sort_unstable();
            debug!(cluster = id, members = members.len(), "Cluster closed");
            clusters.push(members);
        }

        let clustering = Clustering { labels, clusters };
        info!(
            points = n,
            clusters = clustering.cluster_count(),
            noise = clustering.noise_count(),
            eps = self.params.eps,
            min_points = self.params.min_points,
            "Clustering complete"
        );
        clustering
    }

    fn neighbors_of<'a>(
        &self,
        index: &FieldIndex,
        precomputed: Option<&'a [Vec<usize>]>,
        i: usize,
    ) -> Cow<'a, [usize]> {
        match precomputed.and_then(|all| all.get(i)) {
            Some(neighbors) => Cow::Borrowed(neighbors.as_slice()),
            None => Cow::Owned(self.neighborhood(index, i)),
        }
    }

    /// Indices within `eps` of point `i`, itself excluded, ascending.
    fn neighborhood(&self, index: &FieldIndex, i: usize) -> Vec<usize> {
        let Some(point) = index.point(i) else {
            return Vec::new();
        };
        let mut neighbors = index.neighbors_in_radius(point.position, self.params.eps);
        neighbors.retain(|&k| k != i);
        neighbors
    }

    #[cfg(feature = "parallel")]
    fn precompute(&self, index: &FieldIndex) -> Option<Vec<Vec<usize>>> {
        use rayon::prelude::*;

        if !self.parallel {
            return None;
        }
        Some(
            (0..index.len())
                .into_par_iter()
                .map(|i| self.neighborhood(index, i))
                .collect(),
        )
    }

    #[cfg(not(feature = "parallel"))]
    #[allow(clippy::unused_self)]
    const fn precompute(&self, _index: &FieldIndex) -> Option<Vec<Vec<usize>>> {
        None
    }
}

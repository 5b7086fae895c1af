//! Configuration and presets for scan processing.
//!
//! [`ScanConfig`] gathers every tunable of a scan: the voxel size of the
//! spatial index, the clustering parameters, outlier removal, local surface
//! analysis and the rules of the relationship graph.
//!
//! # Presets
//!
//! - [`ScanConfig::default()`] - decimeter voxels, suited to mid-sized scenes
//! - [`ScanConfig::for_object_scan()`] - fine voxels for a single tabletop object
//! - [`ScanConfig::for_room_scan()`] - coarse voxels and Z-up axes for rooms
//!
//! # Example
//!
//! ```
//! use scan_core::{AxisConvention, ScanConfig};
//!
//! let config = ScanConfig::for_object_scan()
//!     .with_min_points(8)
//!     .with_axes(AxisConvention::z_up());
//! assert!(config.validate().is_ok());
//!
//! let bad = ScanConfig::default().with_eps(0.0);
//! assert!(bad.validate().is_err());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};

/// Parameters of density-based clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterParams {
    /// Neighborhood radius ε. Default: 0.1.
    pub eps: f64,

    /// Minimum neighbors, excluding the point itself, for a core point. Default: 5.
    pub min_points: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            eps: 0.1,
            min_points: 5,
        }
    }
}

impl ClusterParams {
    /// Creates parameters from ε and the core-point threshold.
    #[must_use]
    pub const fn new(eps: f64, min_points: usize) -> Self {
        Self { eps, min_points }
    }

    /// Checks `eps > 0` and `min_points >= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`] naming the offending value.
    pub fn validate(&self) -> ScanResult<()> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(ScanError::invalid_parameter(format!(
                "eps must be finite and positive, got {}",
                self.eps
            )));
        }
        if self.min_points == 0 {
            return Err(ScanError::invalid_parameter("min_points must be at least 1"));
        }
        Ok(())
    }
}

/// Parameters of radius-based outlier removal inside a cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutlierParams {
    /// Search radius around each member. Default: 0.1.
    pub radius: f64,

    /// Members with fewer other members in range are dropped. Default: 5.
    /// Zero keeps every member.
    pub min_neighbors: usize,
}

impl Default for OutlierParams {
    fn default() -> Self {
        Self {
            radius: 0.1,
            min_neighbors: 5,
        }
    }
}

impl OutlierParams {
    /// Parameters that keep every member.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            radius: 0.0,
            min_neighbors: 0,
        }
    }

    /// Checks that the radius is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`] naming the offending value.
    pub fn validate(&self) -> ScanResult<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ScanError::invalid_parameter(format!(
                "outlier radius must be finite and non-negative, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

/// Parameters of local surface analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceParams {
    /// Neighborhood radius for normal and curvature estimation. Default: 0.1.
    pub normal_radius: f64,

    /// Candidates this close to a region member join the region. Default: 0.2.
    pub region_radius: f64,

    /// Points with curvature below this are surface candidates. Default: 0.5.
    pub curvature_threshold: f64,

    /// Fewest neighbors that yield a normal; at least 3. Default: 3.
    pub min_neighbors: usize,

    /// Smaller regions are discarded. Default: 5.
    pub min_region_size: usize,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            normal_radius: 0.1,
            region_radius: 0.2,
            curvature_threshold: 0.5,
            min_neighbors: 3,
            min_region_size: 5,
        }
    }
}

impl SurfaceParams {
    /// Sets both radii, keeping the thresholds.
    #[must_use]
    pub const fn with_radii(mut self, normal_radius: f64, region_radius: f64) -> Self {
        self.normal_radius = normal_radius;
        self.region_radius = region_radius;
        self
    }

    /// Checks radii, threshold and counts.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`] naming the offending value.
    pub fn validate(&self) -> ScanResult<()> {
        for (name, value) in [
            ("normal radius", self.normal_radius),
            ("region radius", self.region_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScanError::invalid_parameter(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.curvature_threshold) {
            return Err(ScanError::invalid_parameter(format!(
                "curvature threshold must be in [0, 1], got {}",
                self.curvature_threshold
            )));
        }
        if self.min_neighbors < 3 {
            return Err(ScanError::invalid_parameter(format!(
                "surface min_neighbors must be at least 3, got {}",
                self.min_neighbors
            )));
        }
        if self.min_region_size == 0 {
            return Err(ScanError::invalid_parameter(
                "surface min_region_size must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A world axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Component index of the axis in a vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Which world axes the directional relations are measured along.
///
/// `Above` means larger along `vertical`, `RightOf` larger along `lateral`
/// and `FrontOf` larger along `depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisConvention {
    /// Up axis.
    pub vertical: Axis,
    /// Left-to-right axis.
    pub lateral: Axis,
    /// Back-to-front axis.
    pub depth: Axis,
}

impl Default for AxisConvention {
    fn default() -> Self {
        Self::y_up()
    }
}

impl AxisConvention {
    /// Y up, X lateral, Z depth.
    #[must_use]
    pub const fn y_up() -> Self {
        Self {
            vertical: Axis::Y,
            lateral: Axis::X,
            depth: Axis::Z,
        }
    }

    /// Z up, X lateral, Y depth.
    #[must_use]
    pub const fn z_up() -> Self {
        Self {
            vertical: Axis::Z,
            lateral: Axis::X,
            depth: Axis::Y,
        }
    }

    /// Returns `true` if the three roles use three distinct axes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.vertical != self.lateral && self.vertical != self.depth && self.lateral != self.depth
    }
}

/// Confidence attached to each rule of the relationship graph.
///
/// The values only rank the rules; they are not calibrated probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelationConfidences {
    /// `Contains` and `ContainedBy`. Default: 0.9.
    pub containment: f64,
    /// `AdjacentTo`. Default: 0.8.
    pub adjacency: f64,
    /// `Above` and `Below`. Default: 0.7.
    pub vertical: f64,
    /// `LeftOf` and `RightOf`. Default: 0.6.
    pub lateral: f64,
    /// `FrontOf` and `Behind`. Default: 0.6.
    pub depth: f64,
}

impl Default for RelationConfidences {
    fn default() -> Self {
        Self {
            containment: 0.9,
            adjacency: 0.8,
            vertical: 0.7,
            lateral: 0.6,
            depth: 0.6,
        }
    }
}

impl RelationConfidences {
    fn validate(&self) -> ScanResult<()> {
        for (name, value) in [
            ("containment", self.containment),
            ("adjacency", self.adjacency),
            ("vertical", self.vertical),
            ("lateral", self.lateral),
            ("depth", self.depth),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScanError::invalid_parameter(format!(
                    "{name} confidence must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds and conventions of the relationship graph.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelationParams {
    /// Centers closer than this are adjacent. Default: 0.1.
    pub adjacency_threshold: f64,
    /// Minimum vertical separation for `Above`/`Below`. Default: 0.1.
    pub vertical_margin: f64,
    /// Minimum lateral separation for `LeftOf`/`RightOf`. Default: 0.1.
    pub lateral_margin: f64,
    /// Minimum depth separation for `FrontOf`/`Behind`. Default: 0.1.
    pub depth_margin: f64,
    /// Per-rule confidences.
    pub confidences: RelationConfidences,
    /// Axis roles.
    pub axes: AxisConvention,
}

impl Default for RelationParams {
    fn default() -> Self {
        Self {
            adjacency_threshold: 0.1,
            vertical_margin: 0.1,
            lateral_margin: 0.1,
            depth_margin: 0.1,
            confidences: RelationConfidences::default(),
            axes: AxisConvention::default(),
        }
    }
}

impl RelationParams {
    /// Sets every directional margin to `margin`.
    #[must_use]
    pub const fn with_margins(mut self, margin: f64) -> Self {
        self.vertical_margin = margin;
        self.lateral_margin = margin;
        self.depth_margin = margin;
        self
    }

    /// Sets the adjacency threshold.
    #[must_use]
    pub const fn with_adjacency_threshold(mut self, threshold: f64) -> Self {
        self.adjacency_threshold = threshold;
        self
    }

    /// Checks thresholds, confidences and the axis convention.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`] naming the offending value.
    pub fn validate(&self) -> ScanResult<()> {
        for (name, value) in [
            ("adjacency threshold", self.adjacency_threshold),
            ("vertical margin", self.vertical_margin),
            ("lateral margin", self.lateral_margin),
            ("depth margin", self.depth_margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScanError::invalid_parameter(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !self.axes.is_valid() {
            return Err(ScanError::invalid_parameter(format!(
                "axis convention must use three distinct axes, got {:?}",
                self.axes
            )));
        }
        self.confidences.validate()
    }
}

/// Configuration of a complete scan.
///
/// Use presets for common scenarios or customize individual settings with
/// the `with_*` builders. [`ScanPipeline::new`](crate::ScanPipeline::new)
/// validates the configuration before any work is done.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanConfig {
    /// Edge length of a spatial index cell. Default: 0.1.
    pub voxel_size: f64,

    /// Clustering parameters.
    pub cluster: ClusterParams,

    /// Per-cluster outlier removal.
    pub outlier: OutlierParams,

    /// Relationship graph rules.
    pub relations: RelationParams,

    /// Local surface analysis.
    pub surface: SurfaceParams,

    /// Whether to use parallel processing (via rayon) when the `parallel`
    /// feature is enabled. Results are identical either way.
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.1,
            cluster: ClusterParams::default(),
            outlier: OutlierParams::default(),
            relations: RelationParams::default(),
            surface: SurfaceParams::default(),
            parallel: true,
        }
    }
}

impl ScanConfig {
    /// Creates configuration for scans of a single small object.
    ///
    /// # Example
    ///
    /// ```
    /// use scan_core::ScanConfig;
    ///
    /// let config = ScanConfig::for_object_scan();
    /// assert!(config.voxel_size < ScanConfig::default().voxel_size);
    /// ```
    #[must_use]
    pub fn for_object_scan() -> Self {
        Self {
            voxel_size: 0.02,
            cluster: ClusterParams::new(0.03, 5),
            outlier: OutlierParams {
                radius: 0.03,
                min_neighbors: 3,
            },
            relations: RelationParams::default()
                .with_adjacency_threshold(0.02)
                .with_margins(0.02),
            surface: SurfaceParams::default().with_radii(0.03, 0.05),
            parallel: true,
        }
    }

    /// Creates configuration for room-sized scans with Z up.
    ///
    /// # Example
    ///
    /// ```
    /// use scan_core::{Axis, ScanConfig};
    ///
    /// let config = ScanConfig::for_room_scan();
    /// assert_eq!(config.relations.axes.vertical, Axis::Z);
    /// ```
    #[must_use]
    pub fn for_room_scan() -> Self {
        Self {
            voxel_size: 0.2,
            cluster: ClusterParams::new(0.25, 8),
            outlier: OutlierParams {
                radius: 0.25,
                min_neighbors: 3,
            },
            relations: RelationParams {
                axes: AxisConvention::z_up(),
                ..RelationParams::default()
            }
            .with_adjacency_threshold(0.3)
            .with_margins(0.2),
            surface: SurfaceParams::default().with_radii(0.3, 0.5),
            parallel: true,
        }
    }

    /// Sets the voxel size of the spatial index.
    #[must_use]
    pub const fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    /// Sets the clustering radius ε.
    #[must_use]
    pub const fn with_eps(mut self, eps: f64) -> Self {
        self.cluster.eps = eps;
        self
    }

    /// Sets the core-point neighbor threshold.
    #[must_use]
    pub const fn with_min_points(mut self, min_points: usize) -> Self {
        self.cluster.min_points = min_points;
        self
    }

    /// Sets the outlier removal parameters.
    #[must_use]
    pub const fn with_outlier(mut self, outlier: OutlierParams) -> Self {
        self.outlier = outlier;
        self
    }

    /// Sets the surface analysis parameters.
    #[must_use]
    pub const fn with_surface(mut self, surface: SurfaceParams) -> Self {
        self.surface = surface;
        self
    }

    /// Sets the relationship graph parameters.
    #[must_use]
    pub const fn with_relations(mut self, relations: RelationParams) -> Self {
        self.relations = relations;
        self
    }

    /// Sets the axis convention of the relationship graph.
    #[must_use]
    pub const fn with_axes(mut self, axes: AxisConvention) -> Self {
        self.relations.axes = axes;
        self
    }

    /// Enables or disables parallel processing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidParameter`] for the first value out of range.
    pub fn validate(&self) -> ScanResult<()> {
        if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
            return Err(ScanError::invalid_parameter(format!(
                "voxel size must be finite and positive, got {}",
                self.voxel_size
            )));
        }
        self.cluster.validate()?;
        self.outlier.validate()?;
        self.surface.validate()?;
        self.relations.validate()
    }
}

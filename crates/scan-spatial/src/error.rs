//! Error types for spatial indexing.

/// Errors raised while building or querying a [`FieldIndex`](crate::FieldIndex).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SpatialError {
    /// The voxel size must be finite and strictly positive.
    #[error("voxel size must be finite and positive, got {0}")]
    InvalidVoxelSize(f64),

    /// A search or support radius must be finite and strictly positive.
    #[error("radius must be finite and positive, got {0}")]
    InvalidRadius(f64),

    /// A sampling step must be finite and strictly positive.
    #[error("sampling step must be finite and positive, got {0}")]
    InvalidStep(f64),

    /// A sampling lattice would hold more samples than the limit allows.
    #[error("sampling lattice exceeds {limit} samples")]
    TooManySamples {
        /// Largest number of samples accepted.
        limit: usize,
    },
}

//! Error types for scan processing.

use scan_spatial::SpatialError;
use scan_types::TypesError;

/// Result type for scan processing operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur during scan processing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ScanError {
    /// A configuration value is out of range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// The input arrays could not be assembled into points.
    #[error(transparent)]
    Input(#[from] TypesError),

    /// The spatial index rejected its parameters.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// More clusters were found than entity ids can number.
    #[error("{0} clusters exceed the entity id range")]
    TooManyEntities(usize),
}

impl ScanError {
    /// Creates a [`ScanError::InvalidParameter`] error.
    #[must_use]
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}

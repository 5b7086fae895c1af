//! Error types for building scan data.

/// Errors raised while assembling scan input data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TypesError {
    /// The parallel coordinate and opacity arrays differ in length.
    #[error("point arrays differ in length: x={x}, y={y}, z={z}, opacity={opacity}")]
    LengthMismatch {
        /// Length of the x array.
        x: usize,
        /// Length of the y array.
        y: usize,
        /// Length of the z array.
        z: usize,
        /// Length of the opacity array.
        opacity: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_lists_every_array() {
        let err = TypesError::LengthMismatch {
            x: 3,
            y: 3,
            z: 2,
            opacity: 3,
        };
        assert_eq!(
            err.to_string(),
            "point arrays differ in length: x=3, y=3, z=2, opacity=3"
        );
    }
}

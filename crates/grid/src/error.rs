//! Error types for the diagon-grid crate.

/// Error type for all fallible operations in the diagon-grid crate.
///
/// Apart from [`GridError::InvalidRegion`], which comes from configuration,
/// every variant describes a data problem: a missing axis, inconsistent
/// shapes, unordered timestamps or a selection that matched nothing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Returned when an operation needs a time axis the field does not have.
    #[error("field '{name}' has no time dimension")]
    MissingTimeDimension {
        /// Name of the field.
        name: String,
    },

    /// Returned when a region selects no grid cells.
    #[error("region {region} selects no grid points")]
    EmptyRegion {
        /// Description of the region.
        region: String,
    },

    /// Returned when an array has an unexpected length.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when timestamps are not strictly increasing.
    #[error("timestamps not strictly increasing at index {index}")]
    NonMonotonicTime {
        /// Index of the first offending timestamp.
        index: usize,
    },

    /// Returned when a region or grid coordinate is out of range.
    #[error("invalid region: {reason}")]
    InvalidRegion {
        /// Description of the problem.
        reason: String,
    },
}

impl GridError {
    /// Whether this error stems from invalid configuration rather than data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidRegion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_time() {
        let err = GridError::MissingTimeDimension {
            name: "tos".to_string(),
        };
        assert_eq!(err.to_string(), "field 'tos' has no time dimension");
        assert!(!err.is_configuration());
    }

    #[test]
    fn display_empty_region() {
        let err = GridError::EmptyRegion {
            region: "[0, 10] x [20, 30]".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "region [0, 10] x [20, 30] selects no grid points"
        );
    }

    #[test]
    fn display_dimension_mismatch() {
        let err = GridError::DimensionMismatch {
            name: "time".to_string(),
            expected: 12,
            got: 11,
        };
        assert_eq!(
            err.to_string(),
            "dimension 'time' mismatch: expected 12, got 11"
        );
    }

    #[test]
    fn invalid_region_is_configuration() {
        let err = GridError::InvalidRegion {
            reason: "lat_min out of range".to_string(),
        };
        assert!(err.is_configuration());
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<GridError>();
    }
}

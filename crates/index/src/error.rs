//! Error types for the diagon-index crate.

use diagon_calendar::CalendarError;
use diagon_grid::GridError;

/// Error type for index computation, smoothing and regression maps.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndexError {
    /// Returned when a smoothing window of zero years is requested.
    #[error("smoothing window must be at least one year, got {window_years}")]
    InvalidWindow {
        /// The window length that was provided.
        window_years: usize,
    },

    /// Returned when detrending is requested without a reference field.
    #[error("detrending requested but no reference field was given")]
    MissingDetrendReference,

    /// Returned when an [`IndexConfig`](crate::IndexConfig) is inconsistent.
    #[error("invalid index configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Calendar parsing failed.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// A grid operation failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl IndexError {
    /// Whether this error stems from invalid configuration rather than data.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::InvalidWindow { .. } | Self::MissingDetrendReference | Self::InvalidConfig { .. } => {
                true
            }
            Self::Calendar(e) => e.is_configuration(),
            Self::Grid(e) => e.is_configuration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_window() {
        let err = IndexError::InvalidWindow { window_years: 0 };
        assert_eq!(
            err.to_string(),
            "smoothing window must be at least one year, got 0"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn empty_region_is_data_error() {
        let err: IndexError = GridError::EmptyRegion {
            region: "[lat 0..1, lon 0..1]".into(),
        }
        .into();
        assert!(!err.is_configuration());
        assert_eq!(
            err.to_string(),
            "region [lat 0..1, lon 0..1] selects no grid points"
        );
    }

    #[test]
    fn unsupported_season_is_configuration() {
        let err: IndexError = CalendarError::UnsupportedSeason { value: "XYZ".into() }.into();
        assert!(err.is_configuration());
    }
}

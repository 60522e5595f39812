//! Error types for the diagon-seasonal crate.

use diagon_calendar::{CalendarError, Frequency};
use diagon_grid::GridError;

/// Error type for building and projecting climatological cycles.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeasonalError {
    /// Returned when no cycle was supplied to project.
    #[error("no climatological cycle to project")]
    MissingCycle,

    /// Returned when a projection bound is not configured.
    #[error("missing required date '{which}'")]
    MissingDate {
        /// Configuration key of the missing date.
        which: String,
    },

    /// Returned when the projection frequency is not configured.
    #[error("missing required frequency")]
    MissingFrequency,

    /// Returned when a cycle is projected with a different frequency than
    /// the one it was built for.
    #[error("cannot project a {cycle} cycle at {projector} frequency")]
    FrequencyMismatch {
        /// Frequency of the cycle.
        cycle: Frequency,
        /// Frequency requested for the projection.
        projector: Frequency,
    },

    /// Returned when a monthly cycle has no value for a requested month.
    #[error("cycle has no value for month {month}")]
    IncompleteCycle {
        /// Missing calendar month.
        month: u32,
    },

    /// Returned when a cycle has no entries at all.
    #[error("cycle has no entries")]
    EmptyCycle,

    /// Returned when cycle entries do not share one shape, or a projection
    /// cannot be reshaped into the requested output.
    #[error("shape mismatch for {what}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// What was being shaped.
        what: String,
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Returned when a gridded projection is requested from a cycle
    /// without a grid.
    #[error("cycle carries no grid")]
    MissingGrid,

    /// Calendar parsing or arithmetic failed.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Building the cycle from data failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl SeasonalError {
    /// Whether this error stems from invalid configuration rather than data.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::MissingCycle
            | Self::MissingDate { .. }
            | Self::MissingFrequency
            | Self::FrequencyMismatch { .. } => true,
            Self::Calendar(e) => e.is_configuration(),
            Self::Grid(e) => e.is_configuration(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_inputs_are_configuration() {
        assert!(SeasonalError::MissingCycle.is_configuration());
        assert!(SeasonalError::MissingFrequency.is_configuration());
        let err = SeasonalError::MissingDate {
            which: "start_date".into(),
        };
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "missing required date 'start_date'");
    }

    #[test]
    fn unsupported_frequency_is_configuration() {
        let err: SeasonalError = CalendarError::UnsupportedFrequency {
            value: "daily".into(),
        }
        .into();
        assert!(err.is_configuration());
    }

    #[test]
    fn data_errors_are_not_configuration() {
        assert!(!SeasonalError::IncompleteCycle { month: 3 }.is_configuration());
        let err: SeasonalError = GridError::MissingTimeDimension {
            name: "tos".into(),
        }
        .into();
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "field 'tos' has no time dimension");
    }

    #[test]
    fn display_frequency_mismatch() {
        let err = SeasonalError::FrequencyMismatch {
            cycle: Frequency::Monthly,
            projector: Frequency::Annual,
        };
        assert_eq!(
            err.to_string(),
            "cannot project a monthly cycle at annual frequency"
        );
    }
}

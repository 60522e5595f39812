//! Error types for diagon-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the diagon-io crate.
///
/// This enum covers filesystem and NetCDF failures, CF time decoding,
/// configuration validation, and data-model mismatches encountered when
/// reading or writing climate files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the NetCDF library.
    #[error("netcdf error: {reason}")]
    Netcdf {
        /// Description of the underlying NetCDF failure.
        reason: String,
    },

    /// Wraps a filesystem error.
    #[error("i/o error: {reason}")]
    Filesystem {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Wraps an error originating from the diagon-calendar crate.
    #[error("calendar error: {reason}")]
    Calendar {
        /// Description of the underlying calendar failure.
        reason: String,
    },

    /// Wraps an error building the in-memory data model.
    #[error("grid error: {reason}")]
    Grid {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a required variable is not present in a file.
    #[error("variable '{name}' not found in {}", path.display())]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },

    /// Returned when a time value cannot be parsed or is out of range.
    #[error("invalid time: {reason}")]
    InvalidTime {
        /// Description of the time parsing issue.
        reason: String,
    },
}

impl IoError {
    /// Whether this error stems from invalid configuration rather than data
    /// or the filesystem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

impl From<netcdf::Error> for IoError {
    fn from(e: netcdf::Error) -> Self {
        IoError::Netcdf {
            reason: e.to_string(),
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Filesystem {
            reason: e.to_string(),
        }
    }
}

impl From<diagon_calendar::CalendarError> for IoError {
    fn from(e: diagon_calendar::CalendarError) -> Self {
        IoError::Calendar {
            reason: e.to_string(),
        }
    }
}

impl From<diagon_grid::GridError> for IoError {
    fn from(e: diagon_grid::GridError) -> Self {
        IoError::Grid {
            reason: e.to_string(),
        }
    }
}

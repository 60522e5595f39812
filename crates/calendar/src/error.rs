//! Error types for the diagon-calendar crate.

/// Error type for all fallible operations in the diagon-calendar crate.
///
/// Most variants describe configuration problems (an unknown frequency or
/// season code, an unparseable date string). Those are reported through
/// [`CalendarError::is_configuration`] so callers can fail fast on them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a frequency string is not one of the supported values.
    #[error("unsupported frequency: '{value}' (expected 'monthly' or 'annual')")]
    UnsupportedFrequency {
        /// The frequency string that was provided.
        value: String,
    },

    /// Returned when a season code is not recognised.
    #[error("unsupported season: '{value}' (expected annual, DJF, MAM, JJA, SON or a month)")]
    UnsupportedSeason {
        /// The season code that was provided.
        value: String,
    },

    /// Returned when a date string cannot be parsed.
    #[error("invalid date: '{value}'")]
    InvalidDate {
        /// The date string that was provided.
        value: String,
    },

    /// Returned when a month number is outside the valid range 1..=12.
    #[error("invalid month: {month} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month number that was provided.
        month: u32,
    },

    /// Returned when date arithmetic leaves the representable range.
    #[error("date overflow shifting {date}")]
    DateOverflow {
        /// The date that could not be shifted.
        date: chrono::NaiveDate,
    },
}

impl CalendarError {
    /// Whether this error stems from invalid configuration rather than data.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::DateOverflow { .. })
    }
}

//! Aggregation frequency and timestamp centering.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};

use crate::error::CalendarError;

/// Aggregation period of a climatological cycle or a period grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    /// One value per calendar month.
    Monthly,
    /// One value per calendar year.
    Annual,
}

impl Frequency {
    /// Canonical lowercase name, as written in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" | "mon" => Ok(Self::Monthly),
            "annual" | "yearly" | "year" => Ok(Self::Annual),
            _ => Err(CalendarError::UnsupportedFrequency {
                value: s.to_string(),
            }),
        }
    }
}

/// Shift a timestamp to the approximate centre of its aggregation period.
///
/// Monthly periods are shifted by 15 days, annual periods by 6 calendar
/// months (clamped to the end of the target month).
///
/// # Errors
///
/// Returns [`CalendarError::DateOverflow`] if the shifted date is not
/// representable.
pub fn center_timestamp(t: NaiveDate, frequency: Frequency) -> Result<NaiveDate, CalendarError> {
    let shifted = match frequency {
        Frequency::Monthly => t.checked_add_days(Days::new(15)),
        Frequency::Annual => t.checked_add_months(Months::new(6)),
    };
    shifted.ok_or(CalendarError::DateOverflow { date: t })
}

/// String-frequency variant of [`center_timestamp`].
///
/// # Errors
///
/// Returns [`CalendarError::UnsupportedFrequency`] if `frequency` is neither
/// monthly nor annual.
pub fn center_timestamp_str(t: NaiveDate, frequency: &str) -> Result<NaiveDate, CalendarError> {
    center_timestamp(t, frequency.parse()?)
}

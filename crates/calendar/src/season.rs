//! Season codes used to sub-select months before computing statistics.

use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// A subset of calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    /// All twelve months (no sub-selection).
    Annual,
    /// December, January, February.
    Djf,
    /// March, April, May.
    Mam,
    /// June, July, August.
    Jja,
    /// September, October, November.
    Son,
    /// A single calendar month (1..=12).
    Month(u32),
}

impl Season {
    /// The standard four meteorological seasons plus the annual cycle.
    pub const STANDARD: [Season; 5] = [
        Season::Annual,
        Season::Djf,
        Season::Mam,
        Season::Jja,
        Season::Son,
    ];

    /// Build a single-month season.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is outside 1..=12.
    pub fn month(month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        Ok(Self::Month(month))
    }

    /// Calendar months (1..=12) belonging to this season.
    pub fn months(self) -> Vec<u32> {
        match self {
            Self::Annual => (1..=12).collect(),
            Self::Djf => vec![12, 1, 2],
            Self::Mam => vec![3, 4, 5],
            Self::Jja => vec![6, 7, 8],
            Self::Son => vec![9, 10, 11],
            Self::Month(m) => vec![m],
        }
    }

    /// Whether `month` (1..=12) belongs to this season.
    pub fn contains(self, month: u32) -> bool {
        match self {
            Self::Annual => true,
            Self::Djf => matches!(month, 12 | 1 | 2),
            Self::Mam => (3..=5).contains(&month),
            Self::Jja => (6..=8).contains(&month),
            Self::Son => (9..=11).contains(&month),
            Self::Month(m) => m == month,
        }
    }

    /// Whether this season selects every month.
    pub fn is_annual(self) -> bool {
        matches!(self, Self::Annual)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annual => f.write_str("annual"),
            Self::Djf => f.write_str("DJF"),
            Self::Mam => f.write_str("MAM"),
            Self::Jja => f.write_str("JJA"),
            Self::Son => f.write_str("SON"),
            Self::Month(m) => {
                let idx = (*m as usize).saturating_sub(1).min(11);
                f.write_str(MONTH_ABBREVIATIONS[idx])
            }
        }
    }
}

impl FromStr for Season {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        match key.as_str() {
            "annual" | "ann" | "year" => return Ok(Self::Annual),
            "djf" => return Ok(Self::Djf),
            "mam" => return Ok(Self::Mam),
            "jja" => return Ok(Self::Jja),
            "son" => return Ok(Self::Son),
            _ => {}
        }
        MONTH_ABBREVIATIONS
            .iter()
            .position(|&abbr| abbr == key)
            .map(|idx| Self::Month(idx as u32 + 1))
            .ok_or_else(|| CalendarError::UnsupportedSeason {
                value: s.to_string(),
            })
    }
}

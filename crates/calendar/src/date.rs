//! Date parsing, date ranges and retrieval windows.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::CalendarError;

/// Parse a calendar date from a configuration string.
///
/// Accepted forms: `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM:SS`, `YYYYMMDD` and `YYYY-MM` (first of the month).
/// The time of day, when present, is discarded.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDate`] if none of the forms match.
pub fn parse_date(s: &str) -> Result<NaiveDate, CalendarError> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if s.len() == 8
        && let Ok(d) = NaiveDate::parse_from_str(s, "%Y%m%d")
    {
        return Ok(d);
    }
    if s.len() == 7
        && let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
    {
        return Ok(d);
    }
    Err(CalendarError::InvalidDate {
        value: s.to_string(),
    })
}

/// An inclusive `[start, end]` pair of calendar dates.
///
/// A range with `start > end` is valid and empty; downstream operations
/// return empty results for it instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a new range. No ordering is enforced.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parses both bounds with [`parse_date`].
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDate`] if either bound is invalid.
    pub fn parse(start: &str, end: &str) -> Result<Self, CalendarError> {
        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }

    /// First date of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether the range contains no dates (`start > end`).
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Whether `date` lies inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Combine an analysis period with a reference (standard) period into the
/// window that has to be retrieved to cover both.
///
/// The start is `min(startdate, start_std)` and the end is
/// `max(enddate, end_std)`, but each bound is only computed when the primary
/// date is present: a lone `start_std` or `end_std` is ignored and yields
/// `None`. This asymmetry looks unintentional but is kept deliberately, so
/// that callers relying on it are not silently changed.
pub fn retrieval_window(
    startdate: Option<NaiveDate>,
    enddate: Option<NaiveDate>,
    start_std: Option<NaiveDate>,
    end_std: Option<NaiveDate>,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let start = startdate.map(|s| match start_std {
        Some(std) => s.min(std),
        None => s,
    });
    let end = enddate.map(|e| match end_std {
        Some(std) => e.max(std),
        None => e,
    });
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_iso() {
        assert_eq!(parse_date("2020-01-01").unwrap(), date(2020, 1, 1));
        assert_eq!(parse_date(" 1990-12-31 ").unwrap(), date(1990, 12, 31));
    }

    #[test]
    fn parse_datetime_drops_time() {
        assert_eq!(parse_date("2020-03-01T12:00:00").unwrap(), date(2020, 3, 1));
        assert_eq!(parse_date("2020-03-01 06:30:00").unwrap(), date(2020, 3, 1));
    }

    #[test]
    fn parse_compact_and_month() {
        assert_eq!(parse_date("20200215").unwrap(), date(2020, 2, 15));
        assert_eq!(parse_date("2020-07").unwrap(), date(2020, 7, 1));
    }

    #[test]
    fn parse_invalid() {
        for s in ["", "2020-13-01", "2021-02-29", "yesterday"] {
            let err = parse_date(s).unwrap_err();
            assert!(matches!(err, CalendarError::InvalidDate { .. }), "{s}");
        }
    }

    #[test]
    fn range_empty_and_contains() {
        let r = DateRange::new(date(2020, 5, 1), date(2020, 1, 1));
        assert!(r.is_empty());
        assert!(!r.contains(date(2020, 3, 1)));

        let r = DateRange::parse("2020-01-01", "2020-12-31").unwrap();
        assert!(!r.is_empty());
        assert!(r.contains(date(2020, 1, 1)));
        assert!(r.contains(date(2020, 12, 31)));
        assert!(!r.contains(date(2021, 1, 1)));
    }

    #[test]
    fn window_takes_outer_bounds() {
        let (s, e) = retrieval_window(
            Some(date(2000, 1, 1)),
            Some(date(2010, 12, 1)),
            Some(date(1990, 1, 1)),
            Some(date(2005, 12, 1)),
        );
        assert_eq!(s, Some(date(1990, 1, 1)));
        assert_eq!(e, Some(date(2010, 12, 1)));
    }

    #[test]
    fn window_without_reference_period() {
        let (s, e) = retrieval_window(Some(date(2000, 1, 1)), Some(date(2001, 1, 1)), None, None);
        assert_eq!(s, Some(date(2000, 1, 1)));
        assert_eq!(e, Some(date(2001, 1, 1)));
    }

    #[test]
    fn window_ignores_lone_reference_bounds() {
        let (s, e) = retrieval_window(None, None, Some(date(1990, 1, 1)), Some(date(2020, 1, 1)));
        assert_eq!(s, None);
        assert_eq!(e, None);

        let (s, e) = retrieval_window(Some(date(2000, 1, 1)), None, None, Some(date(2020, 1, 1)));
        assert_eq!(s, Some(date(2000, 1, 1)));
        assert_eq!(e, None);
    }
}

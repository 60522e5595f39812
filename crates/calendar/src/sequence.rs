//! Period-start grid generation.

use chrono::{Datelike, Months, NaiveDate};

use crate::frequency::Frequency;

/// Generates the start date of every period of `frequency` inside
/// `[start, end]` (both inclusive).
///
/// Monthly periods start on the first of each month, annual periods on
/// January 1st. A range with `start > end` yields an empty grid.
///
/// # Example
///
/// ```ignore
/// let start = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
/// let end = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
/// let grid = period_starts(start, end, Frequency::Monthly);
/// // Feb 1, Mar 1, Apr 1
/// ```
pub fn period_starts(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if start > end {
        return dates;
    }

    let (step, first) = match frequency {
        Frequency::Monthly => (Months::new(1), first_month_start_on_or_after(start)),
        Frequency::Annual => (Months::new(12), first_year_start_on_or_after(start)),
    };

    let mut current = first;
    while let Some(d) = current {
        if d > end {
            break;
        }
        dates.push(d);
        current = d.checked_add_months(step);
    }
    dates
}

fn first_month_start_on_or_after(d: NaiveDate) -> Option<NaiveDate> {
    let month_start = d.with_day(1)?;
    if month_start == d {
        Some(d)
    } else {
        month_start.checked_add_months(Months::new(1))
    }
}

fn first_year_start_on_or_after(d: NaiveDate) -> Option<NaiveDate> {
    let year_start = NaiveDate::from_ymd_opt(d.year(), 1, 1)?;
    if year_start == d {
        Some(d)
    } else {
        NaiveDate::from_ymd_opt(d.year() + 1, 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monthly_inclusive_bounds() {
        let grid = period_starts(date(2020, 1, 1), date(2020, 3, 1), Frequency::Monthly);
        assert_eq!(grid, vec![date(2020, 1, 1), date(2020, 2, 1), date(2020, 3, 1)]);
    }

    #[test]
    fn monthly_mid_month_start_skips_partial() {
        let grid = period_starts(date(2020, 1, 15), date(2020, 4, 1), Frequency::Monthly);
        assert_eq!(grid, vec![date(2020, 2, 1), date(2020, 3, 1), date(2020, 4, 1)]);
    }

    #[test]
    fn monthly_year_transition() {
        let grid = period_starts(date(2019, 11, 1), date(2020, 2, 28), Frequency::Monthly);
        assert_eq!(
            grid,
            vec![date(2019, 11, 1), date(2019, 12, 1), date(2020, 1, 1), date(2020, 2, 1)]
        );
    }

    #[test]
    fn annual_grid() {
        let grid = period_starts(date(2000, 1, 1), date(2003, 6, 1), Frequency::Annual);
        assert_eq!(
            grid,
            vec![date(2000, 1, 1), date(2001, 1, 1), date(2002, 1, 1), date(2003, 1, 1)]
        );
    }

    #[test]
    fn annual_mid_year_start() {
        let grid = period_starts(date(2000, 3, 1), date(2002, 1, 1), Frequency::Annual);
        assert_eq!(grid, vec![date(2001, 1, 1), date(2002, 1, 1)]);
    }

    #[test]
    fn reversed_range_is_empty() {
        assert!(period_starts(date(2020, 5, 1), date(2020, 1, 1), Frequency::Monthly).is_empty());
        assert!(period_starts(date(2021, 1, 1), date(2020, 1, 1), Frequency::Annual).is_empty());
    }

    #[test]
    fn single_day_range() {
        let d = date(2020, 6, 1);
        assert_eq!(period_starts(d, d, Frequency::Monthly), vec![d]);
        assert!(period_starts(d, d, Frequency::Annual).is_empty());
    }
}

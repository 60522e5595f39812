use chrono::{Datelike, NaiveDate};
use diagon_calendar::{Frequency, center_timestamp, parse_date, period_starts};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn thirty_years_of_months() {
    let grid = period_starts(date(1981, 1, 1), date(2010, 12, 31), Frequency::Monthly);
    assert_eq!(grid.len(), 360);
    assert!(grid.iter().all(|d| d.day() == 1));
    assert!(grid.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(grid.first().copied(), Some(date(1981, 1, 1)));
    assert_eq!(grid.last().copied(), Some(date(2010, 12, 1)));
}

#[test]
fn centered_grid_keeps_month_membership() {
    let grid = period_starts(date(2020, 1, 1), date(2020, 12, 1), Frequency::Monthly);
    for d in grid {
        let c = center_timestamp(d, Frequency::Monthly).unwrap();
        assert_eq!(c.month(), d.month());
        assert_eq!(c.day(), 16);
    }
}

#[test]
fn centered_annual_grid_is_mid_year() {
    let grid = period_starts(date(2000, 1, 1), date(2004, 1, 1), Frequency::Annual);
    let centered: Vec<_> = grid
        .iter()
        .map(|&d| center_timestamp(d, Frequency::Annual).unwrap())
        .collect();
    assert_eq!(centered.len(), 5);
    assert!(centered.iter().all(|d| d.month() == 7 && d.day() == 1));
}

#[test]
fn grid_length_matches_for_config_strings() {
    for (start, end, n) in [
        ("2020-01-01", "2020-03-01", 3),
        ("2020-05-01", "2020-01-01", 0),
        ("2019-12-15", "2020-01-14", 1),
    ] {
        let grid = period_starts(
            parse_date(start).unwrap(),
            parse_date(end).unwrap(),
            Frequency::Monthly,
        );
        assert_eq!(grid.len(), n, "{start}..{end}");
    }
}

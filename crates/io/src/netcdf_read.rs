//! Low-level NetCDF extraction helpers.

use std::path::Path;

use chrono::{Datelike, NaiveDate, TimeDelta};
use netcdf::AttributeValue;

use crate::error::IoError;

/// Cumulative day count at the start of each month in a 365-day year.
const NOLEAP_MONTH_START: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(netcdf::open(path)?)
}

/// First variable of `file` matching one of `aliases`.
pub(crate) fn find_variable<'f>(
    file: &'f netcdf::File,
    aliases: &[&str],
) -> Option<netcdf::Variable<'f>> {
    aliases.iter().find_map(|&alias| file.variable(alias))
}

/// Read a 1-D `f64` variable, trying each alias in order.
///
/// Returns the data from the first alias that matches. If none match,
/// returns [`IoError::MissingVariable`] with the first alias as the name.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    for &alias in aliases {
        if let Some(var) = file.variable(alias) {
            return Ok(var.get_values::<f64, _>(..)?);
        }
    }

    let name = aliases.first().copied().unwrap_or("unknown");
    Err(IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })
}

/// A data variable decoded to physical values.
#[derive(Debug, Clone)]
pub(crate) struct RawVariable {
    /// Flattened values in dimension order, missing entries as `NaN`.
    pub values: Vec<f64>,
    /// `(name, length)` of every dimension, slowest first.
    pub dims: Vec<(String, usize)>,
    /// The `units` attribute, if present.
    pub units: Option<String>,
}

/// Read a data variable, masking `_FillValue`/`missing_value` entries as
/// `NaN` and applying `scale_factor`/`add_offset` when present.
pub(crate) fn read_variable(
    file: &netcdf::File,
    aliases: &[&str],
    path: &Path,
) -> Result<RawVariable, IoError> {
    let var = find_variable(file, aliases).ok_or_else(|| IoError::MissingVariable {
        name: aliases.first().copied().unwrap_or("unknown").to_string(),
        path: path.to_path_buf(),
    })?;

    let dims: Vec<(String, usize)> = var
        .dimensions()
        .iter()
        .map(|d| (d.name(), d.len()))
        .collect();

    let fill_values: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| attr_f64(&var, name))
        .collect();
    let scale = attr_f64(&var, "scale_factor").unwrap_or(1.0);
    let offset = attr_f64(&var, "add_offset").unwrap_or(0.0);

    let values = var
        .get_values::<f64, _>(..)?
        .into_iter()
        .map(|v| {
            if fill_values.iter().any(|&fv| v == fv) {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect();

    Ok(RawVariable {
        values,
        dims,
        units: attr_string(&var, "units"),
    })
}

/// Numeric attribute as `f64`.
pub(crate) fn attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            AttributeValue::Double(d) => Some(d),
            AttributeValue::Float(f) => Some(f as f64),
            AttributeValue::Int(i) => Some(i as f64),
            AttributeValue::Short(s) => Some(s as f64),
            _ => None,
        })
}

/// String attribute.
pub(crate) fn attr_string(var: &netcdf::Variable, name: &str) -> Option<String> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        })
}

/// Unit of CF time offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn in_days(self) -> f64 {
        match self {
            Self::Days => 1.0,
            Self::Hours => 1.0 / 24.0,
            Self::Minutes => 1.0 / 1440.0,
            Self::Seconds => 1.0 / 86_400.0,
        }
    }
}

/// CF calendars the reader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CfCalendar {
    /// Proleptic Gregorian (also `standard` and `gregorian`).
    Standard,
    /// 365 days every year.
    NoLeap,
}

/// Decoded `units`/`calendar` attributes of a CF time variable.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TimeEncoding {
    pub unit: TimeUnit,
    pub base: NaiveDate,
    pub calendar: CfCalendar,
}

/// Parse `"<unit> since <date>[ time]"` and a calendar name.
///
/// A missing calendar defaults to `standard`.
pub(crate) fn parse_time_units(units: &str, calendar: Option<&str>) -> Result<TimeEncoding, IoError> {
    let parts: Vec<&str> = units.split_whitespace().collect();
    if parts.len() < 3 || !parts[1].eq_ignore_ascii_case("since") {
        return Err(IoError::InvalidTime {
            reason: format!("unexpected time units format: '{units}'"),
        });
    }

    let unit = match parts[0].to_lowercase().as_str() {
        "days" | "day" | "d" => TimeUnit::Days,
        "hours" | "hour" | "h" => TimeUnit::Hours,
        "minutes" | "minute" | "min" => TimeUnit::Minutes,
        "seconds" | "second" | "s" => TimeUnit::Seconds,
        other => {
            return Err(IoError::InvalidTime {
                reason: format!("unsupported time unit '{other}'"),
            });
        }
    };

    let date_str = parts[2].split('T').next().unwrap_or(parts[2]);
    let base =
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| IoError::InvalidTime {
            reason: format!("failed to parse base date '{date_str}': {e}"),
        })?;

    let calendar = match calendar.map(|c| c.trim().to_lowercase()).as_deref() {
        None | Some("standard" | "gregorian" | "proleptic_gregorian") => CfCalendar::Standard,
        Some("noleap" | "365_day") => CfCalendar::NoLeap,
        Some(other) => {
            return Err(IoError::InvalidTime {
                reason: format!("unsupported calendar '{other}'"),
            });
        }
    };

    Ok(TimeEncoding {
        unit,
        base,
        calendar,
    })
}

/// Read the `units` and optional `calendar` attributes of a time variable.
pub(crate) fn read_time_encoding(
    file: &netcdf::File,
    time_var: &str,
    path: &Path,
) -> Result<TimeEncoding, IoError> {
    let var = file
        .variable(time_var)
        .ok_or_else(|| IoError::MissingVariable {
            name: time_var.to_string(),
            path: path.to_path_buf(),
        })?;

    let units = attr_string(&var, "units").ok_or_else(|| IoError::InvalidTime {
        reason: format!("time variable '{time_var}' has no string 'units' attribute"),
    })?;
    let calendar = attr_string(&var, "calendar");
    parse_time_units(&units, calendar.as_deref())
}

impl TimeEncoding {
    /// Convert time offsets to calendar dates.
    ///
    /// Offsets are converted to whole days (rounded down), so sub-daily
    /// stamps map to the day they fall in.
    pub(crate) fn decode(&self, offsets: &[f64]) -> Result<Vec<NaiveDate>, IoError> {
        offsets
            .iter()
            .map(|&offset| {
                if !offset.is_finite() {
                    return Err(IoError::InvalidTime {
                        reason: format!("non-finite time offset {offset}"),
                    });
                }
                let days = (offset * self.unit.in_days()).floor() as i64;
                match self.calendar {
                    CfCalendar::Standard => self
                        .base
                        .checked_add_signed(TimeDelta::days(days))
                        .ok_or_else(|| IoError::InvalidTime {
                            reason: format!("date overflow adding {days} days to {}", self.base),
                        }),
                    CfCalendar::NoLeap => noleap_add_days(self.base, days),
                }
            })
            .collect()
    }
}

/// Add `days` to `base` counting every year as 365 days.
fn noleap_add_days(base: NaiveDate, days: i64) -> Result<NaiveDate, IoError> {
    if base.month() == 2 && base.day() == 29 {
        return Err(IoError::InvalidTime {
            reason: format!("base date {base} does not exist in a 365-day calendar"),
        });
    }
    let doy0 = NOLEAP_MONTH_START[base.month0() as usize] + i64::from(base.day0());
    let total = doy0 + days;
    let year = i64::from(base.year()) + total.div_euclid(365);
    let doy = total.rem_euclid(365);
    let month0 = NOLEAP_MONTH_START
        .iter()
        .rposition(|&start| start <= doy)
        .unwrap_or(0);
    let day = doy - NOLEAP_MONTH_START[month0] + 1;

    i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month0 as u32 + 1, day as u32))
        .ok_or_else(|| IoError::InvalidTime {
            reason: format!("date overflow adding {days} days to {base}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_units_variants() {
        let enc = parse_time_units("days since 1850-01-01", None).unwrap();
        assert_eq!(enc.unit, TimeUnit::Days);
        assert_eq!(enc.base, date(1850, 1, 1));
        assert_eq!(enc.calendar, CfCalendar::Standard);

        let enc = parse_time_units("hours since 1900-1-1 00:00:00", Some("noleap")).unwrap();
        assert_eq!(enc.unit, TimeUnit::Hours);
        assert_eq!(enc.base, date(1900, 1, 1));
        assert_eq!(enc.calendar, CfCalendar::NoLeap);

        let enc = parse_time_units("seconds since 1970-01-01T00:00:00Z", Some("gregorian")).unwrap();
        assert_eq!(enc.unit, TimeUnit::Seconds);
        assert_eq!(enc.base, date(1970, 1, 1));
    }

    #[test]
    fn parse_units_rejects_bad_input() {
        assert!(parse_time_units("days after 1850-01-01", None).is_err());
        assert!(parse_time_units("fortnights since 1850-01-01", None).is_err());
        assert!(parse_time_units("days since yesterday", None).is_err());
        let err = parse_time_units("days since 1850-01-01", Some("360_day")).unwrap_err();
        assert!(err.to_string().contains("360_day"));
    }

    #[test]
    fn decode_standard() {
        let enc = parse_time_units("days since 2000-01-01", None).unwrap();
        let dates = enc.decode(&[0.0, 31.0, 59.0, 60.0, 365.5]).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2000, 1, 1),
                date(2000, 2, 1),
                date(2000, 2, 29),
                date(2000, 3, 1),
                date(2000, 12, 31)
            ]
        );
    }

    #[test]
    fn decode_hours() {
        let enc = parse_time_units("hours since 2000-01-01", None).unwrap();
        let dates = enc.decode(&[0.0, 23.0, 24.0, 744.0]).unwrap();
        assert_eq!(
            dates,
            vec![date(2000, 1, 1), date(2000, 1, 1), date(2000, 1, 2), date(2000, 2, 1)]
        );
    }

    #[test]
    fn decode_noleap_skips_feb_29() {
        let enc = parse_time_units("days since 2000-01-01", Some("365_day")).unwrap();
        let dates = enc.decode(&[58.0, 59.0, 364.0, 365.0, 730.0]).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2000, 2, 28),
                date(2000, 3, 1),
                date(2000, 12, 31),
                date(2001, 1, 1),
                date(2002, 1, 1)
            ]
        );
    }

    #[test]
    fn decode_noleap_negative_offsets() {
        let enc = parse_time_units("days since 2000-03-01", Some("noleap")).unwrap();
        let dates = enc.decode(&[-1.0, -365.0]).unwrap();
        assert_eq!(dates, vec![date(2000, 2, 28), date(1999, 3, 1)]);
    }

    #[test]
    fn decode_rejects_nan() {
        let enc = parse_time_units("days since 2000-01-01", None).unwrap();
        assert!(matches!(
            enc.decode(&[f64::NAN]),
            Err(IoError::InvalidTime { .. })
        ));
    }

    #[test]
    fn decode_empty() {
        let enc = parse_time_units("days since 2000-01-01", None).unwrap();
        assert!(enc.decode(&[]).unwrap().is_empty());
    }
}

//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::config::*;

use diagon_calendar::{DateRange, Season, parse_date};
use diagon_grid::RegionSpec;
use diagon_index::IndexConfig;
use diagon_io::{ReaderConfig, WriterConfig};
use diagon_seasonal::ProjectionConfig;

/// Parses an optional date string.
pub fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| parse_date(s).with_context(|| format!("invalid date {s:?}")))
        .transpose()
}

/// Parses season codes (`annual`, `DJF`, ..., `jan`..`dec`).
pub fn parse_seasons(codes: &[String]) -> Result<Vec<Season>> {
    codes
        .iter()
        .map(|code| {
            code.parse::<Season>()
                .with_context(|| format!("invalid season {code:?}"))
        })
        .collect()
}

/// Converts a TOML region into a [`RegionSpec`].
pub fn build_region(region: &RegionToml) -> Result<RegionSpec> {
    let spec = RegionSpec::new(region.lat[0], region.lat[1], region.lon[0], region.lon[1])
        .with_context(|| format!("invalid region lat={:?} lon={:?}", region.lat, region.lon))?;
    Ok(match &region.name {
        Some(name) => spec.with_name(name),
        None => spec,
    })
}

/// Builds a [`ReaderConfig`] for one dataset.
///
/// Aliases left unset in `[reader]` keep the reader defaults.
pub fn build_reader_config(
    reader: &ReaderToml,
    data: &DataToml,
    range: Option<DateRange>,
) -> Result<ReaderConfig> {
    let mut cfg = ReaderConfig::default();
    if let Some(aliases) = &reader.lon_aliases {
        cfg = cfg.with_lon_aliases(aliases.clone());
    }
    if let Some(aliases) = &reader.lat_aliases {
        cfg = cfg.with_lat_aliases(aliases.clone());
    }
    if let Some(aliases) = &reader.time_aliases {
        cfg = cfg.with_time_aliases(aliases.clone());
    }
    for (variable, file_name) in &data.renames {
        cfg = cfg.with_rename(variable, file_name);
    }
    if let Some(range) = range {
        cfg = cfg.with_range(range);
    }
    cfg.validate().context("invalid [reader] configuration")?;
    Ok(cfg)
}

/// Builds and validates an [`IndexConfig`] from the `[amo]` block.
pub fn build_index_config(amo: &AmoToml) -> Result<IndexConfig> {
    let mut cfg = IndexConfig::new(build_region(&amo.region)?)
        .with_detrend(amo.detrend)
        .with_detrend_region(build_region(&amo.detrend_region)?)
        .with_seasons(parse_seasons(&amo.seasons)?);
    if amo.smooth {
        cfg = cfg.with_smoothing(amo.window_years);
    }
    cfg.validate().context("invalid [amo] configuration")?;
    Ok(cfg)
}

/// Builds a [`ProjectionConfig`] from `[dates]` and `[cycle]`.
///
/// Missing dates are passed through so the projector reports them.
pub fn build_projection_config(dates: &DatesToml, cycle: &CycleToml) -> ProjectionConfig {
    let mut cfg = ProjectionConfig::new()
        .with_frequency(&cycle.frequency)
        .with_center_time(cycle.center_time);
    if let Some(start) = &dates.startdate {
        cfg = cfg.with_start_date(start);
    }
    if let Some(end) = &dates.enddate {
        cfg = cfg.with_end_date(end);
    }
    cfg
}

/// Builds a [`WriterConfig`]; `--rebuild` forces overwriting.
pub fn build_writer_config(output: &OutputToml, rebuild: bool) -> WriterConfig {
    WriterConfig::default().with_rebuild(output.rebuild || rebuild)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(lat: [f64; 2], lon: [f64; 2]) -> RegionToml {
        RegionToml {
            name: None,
            lat,
            lon,
        }
    }

    #[test]
    fn seasons_parse_and_reject() {
        let seasons = parse_seasons(&["annual".into(), "DJF".into(), "jul".into()]).unwrap();
        assert_eq!(seasons, vec![Season::Annual, Season::Djf, Season::Month(7)]);
        let err = parse_seasons(&["winter".into()]).unwrap_err();
        assert!(format!("{err:#}").contains("winter"));
    }

    #[test]
    fn region_bounds() {
        let spec = build_region(&region([60.0, 0.0], [-80.0, 0.0])).unwrap();
        assert_eq!(spec.lat_min(), 0.0);
        assert_eq!(spec.lat_max(), 60.0);
        assert!(spec.name().is_none());
        assert!(build_region(&region([0.0, 95.0], [0.0, 10.0])).is_err());
    }

    #[test]
    fn index_config_from_defaults() {
        let cfg = build_index_config(&AmoToml::default()).unwrap();
        assert_eq!(cfg, IndexConfig::default());
    }

    #[test]
    fn zero_window_fails_fast() {
        let amo = AmoToml {
            smooth: true,
            window_years: 0,
            ..AmoToml::default()
        };
        assert!(build_index_config(&amo).is_err());
    }

    #[test]
    fn projection_config_passes_dates_through() {
        let dates = DatesToml {
            startdate: Some("2020-01-01".into()),
            enddate: None,
        };
        let cfg = build_projection_config(&dates, &CycleToml::default());
        assert_eq!(cfg.start_date(), Some("2020-01-01"));
        assert_eq!(cfg.end_date(), None);
        assert_eq!(cfg.frequency(), Some("monthly"));
        assert!(cfg.center_time());
    }

    #[test]
    fn optional_dates() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("1990-01-01")).unwrap(),
            NaiveDate::from_ymd_opt(1990, 1, 1)
        );
        assert!(parse_optional_date(Some("01/01/1990")).is_err());
    }

    #[test]
    fn writer_rebuild_flag_wins() {
        let output = OutputToml::default();
        assert!(!build_writer_config(&output, false).rebuild());
        assert!(build_writer_config(&output, true).rebuild());
    }
}

//! NetCDF output for index series, fields and regression maps.

use std::path::Path;

use chrono::NaiveDate;
use diagon_grid::{GriddedField, LatLonGrid, TimeSeries};
use diagon_index::RegressionMaps;
use tracing::info;

use crate::error::IoError;

/// Units attribute written on every time axis.
pub const TIME_UNITS: &str = "days since 1850-01-01";

/// Calendar attribute written on every time axis.
pub const TIME_CALENDAR: &str = "standard";

/// Configuration for writing NetCDF output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterConfig {
    /// Overwrite existing files.
    rebuild: bool,
}

impl WriterConfig {
    /// Allow or forbid overwriting existing files.
    pub fn with_rebuild(mut self, rebuild: bool) -> Self {
        self.rebuild = rebuild;
        self
    }

    /// Whether existing files are overwritten.
    pub fn rebuild(&self) -> bool {
        self.rebuild
    }

    /// Checks that `path` may be written, creating its parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if the file exists and `rebuild` is
    /// off, or a filesystem error if the directory cannot be created.
    fn prepare(&self, path: &Path) -> Result<(), IoError> {
        if path.exists() && !self.rebuild {
            return Err(IoError::Validation {
                count: 1,
                details: format!("{} exists and rebuild is off", path.display()),
            });
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// Encode dates as days since 1850-01-01 (standard calendar).
fn encode_times(times: &[NaiveDate]) -> Vec<f64> {
    let base = NaiveDate::from_ymd_opt(1850, 1, 1).unwrap_or(NaiveDate::MIN);
    times
        .iter()
        .map(|t| t.signed_duration_since(base).num_days() as f64)
        .collect()
}

fn add_time_axis(file: &mut netcdf::FileMut, times: &[NaiveDate]) -> Result<(), IoError> {
    file.add_dimension("time", times.len())?;
    let mut var = file.add_variable::<f64>("time", &["time"])?;
    var.put_values(&encode_times(times), ..)?;
    var.put_attribute("units", TIME_UNITS)?;
    var.put_attribute("calendar", TIME_CALENDAR)?;
    var.put_attribute("standard_name", "time")?;
    Ok(())
}

fn add_grid_axes(file: &mut netcdf::FileMut, grid: &LatLonGrid) -> Result<(), IoError> {
    file.add_dimension("lat", grid.ny())?;
    file.add_dimension("lon", grid.nx())?;
    {
        let mut var = file.add_variable::<f64>("lat", &["lat"])?;
        var.put_values(grid.lats(), ..)?;
        var.put_attribute("units", "degrees_north")?;
        var.put_attribute("standard_name", "latitude")?;
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["lon"])?;
        var.put_values(grid.lons(), ..)?;
        var.put_attribute("units", "degrees_east")?;
        var.put_attribute("standard_name", "longitude")?;
    }
    Ok(())
}

/// Write a scalar time series as a 1-D variable on a `time` axis.
///
/// The variable is named after the series (`"index"` when unnamed).
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the file exists and `rebuild` is off,
/// or [`IoError::Netcdf`] on write failures.
pub fn write_series(path: &Path, series: &TimeSeries, config: &WriterConfig) -> Result<(), IoError> {
    config.prepare(path)?;
    let name = series.name().unwrap_or("index");

    let mut file = netcdf::create(path)?;
    add_time_axis(&mut file, series.times())?;
    {
        let mut var = file.add_variable::<f64>(name, &["time"])?;
        var.put_values(series.values(), ..)?;
        if let Some(units) = series.units() {
            var.put_attribute("units", units)?;
        }
    }

    info!(path = %path.display(), variable = name, n_times = series.len(), "wrote series");
    Ok(())
}

/// Write a gridded field as `(time, lat, lon)`, or `(lat, lon)` when static.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the file exists and `rebuild` is off,
/// or [`IoError::Netcdf`] on write failures.
pub fn write_field(path: &Path, field: &GriddedField, config: &WriterConfig) -> Result<(), IoError> {
    config.prepare(path)?;

    let mut file = netcdf::create(path)?;
    add_grid_axes(&mut file, field.grid())?;
    let dims: &[&str] = match field.times() {
        Some(times) => {
            add_time_axis(&mut file, times)?;
            &["time", "lat", "lon"]
        }
        None => &["lat", "lon"],
    };
    {
        let mut var = file.add_variable::<f64>(field.name(), dims)?;
        let values: Vec<f64> = field.data().iter().copied().collect();
        var.put_values(&values, ..)?;
        if let Some(units) = field.units() {
            var.put_attribute("units", units)?;
        }
    }

    info!(
        path = %path.display(),
        variable = field.name(),
        n_times = field.n_times(),
        "wrote field"
    );
    Ok(())
}

/// Write regression and correlation maps as `regression` and `correlation`
/// variables on a `(lat, lon)` grid.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the file exists and `rebuild` is off,
/// or [`IoError::Netcdf`] on write failures.
pub fn write_maps(path: &Path, maps: &RegressionMaps, config: &WriterConfig) -> Result<(), IoError> {
    config.prepare(path)?;

    let mut file = netcdf::create(path)?;
    add_grid_axes(&mut file, maps.grid())?;
    let n_times = i32::try_from(maps.n_times()).unwrap_or(i32::MAX);
    let season = maps.season().to_string();

    let layers = [
        ("regression", maps.regression(), "regression coefficient"),
        ("correlation", maps.correlation(), "Pearson correlation"),
    ];
    for (name, data, long_name) in layers {
        let mut var = file.add_variable::<f64>(name, &["lat", "lon"])?;
        let values: Vec<f64> = data.iter().copied().collect();
        var.put_values(&values, ..)?;
        var.put_attribute("long_name", format!("{long_name} of {}", maps.field_name()))?;
        var.put_attribute("season", season.as_str())?;
        var.put_attribute("n_times", n_times)?;
    }
    if let Some(units) = maps.units() {
        let mut var = file
            .variable_mut("regression")
            .ok_or_else(|| IoError::Netcdf {
                reason: "regression variable vanished after creation".into(),
            })?;
        var.put_attribute("units", units)?;
    }

    info!(
        path = %path.display(),
        field = maps.field_name(),
        season = %maps.season(),
        "wrote regression maps"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_times_from_1850() {
        let times = [
            NaiveDate::from_ymd_opt(1850, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(1850, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(1849, 12, 31).unwrap(),
        ];
        assert_eq!(encode_times(&times), vec![0.0, 31.0, -1.0]);
    }

    #[test]
    fn prepare_refuses_existing_without_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nc");
        std::fs::write(&path, b"x").unwrap();

        let err = WriterConfig::default().prepare(&path).unwrap_err();
        assert!(matches!(err, IoError::Validation { .. }));
        assert!(WriterConfig::default().with_rebuild(true).prepare(&path).is_ok());
    }

    #[test]
    fn prepare_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.nc");
        WriterConfig::default().prepare(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }
}

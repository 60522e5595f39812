//! Data retrieval: the [`DataReader`] trait and its NetCDF implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use diagon_calendar::DateRange;
use diagon_grid::{GriddedField, LatLonGrid};
use ndarray::{Array2, Array3};
use tracing::{debug, info};

use crate::error::IoError;
use crate::netcdf_read;

// ---------------------------------------------------------------------------
// DataReader
// ---------------------------------------------------------------------------

/// Source of gridded fields, looked up by variable name.
pub trait DataReader {
    /// Load `variable` as a gridded field.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`] if the variable cannot be found or decoded.
    fn retrieve(&self, variable: &str) -> Result<GriddedField, IoError>;
}

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Configuration for reading gridded fields from NetCDF files.
///
/// Use the builder methods (`with_*`) to customise coordinate aliases,
/// variable renames and the time window. The [`Default`] implementation
/// supplies CF-convention names suitable for CMIP-style climate data.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    /// Aliases to try when looking up longitude coordinates.
    lon_aliases: Vec<String>,
    /// Aliases to try when looking up latitude coordinates.
    lat_aliases: Vec<String>,
    /// Aliases to try when looking up the time coordinate.
    time_aliases: Vec<String>,
    /// Requested variable name -> name in the file.
    renames: BTreeMap<String, String>,
    /// Keep only time steps inside this window.
    range: Option<DateRange>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            lon_aliases: vec!["lon".into(), "longitude".into(), "x".into()],
            lat_aliases: vec!["lat".into(), "latitude".into(), "y".into()],
            time_aliases: vec!["time".into(), "t".into()],
            renames: BTreeMap::new(),
            range: None,
        }
    }
}

impl ReaderConfig {
    /// Set the longitude aliases, tried in order.
    pub fn with_lon_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lon_aliases = aliases;
        self
    }

    /// Set the latitude aliases, tried in order.
    pub fn with_lat_aliases(mut self, aliases: Vec<String>) -> Self {
        self.lat_aliases = aliases;
        self
    }

    /// Set the time aliases, tried in order.
    pub fn with_time_aliases(mut self, aliases: Vec<String>) -> Self {
        self.time_aliases = aliases;
        self
    }

    /// Read `variable` from the file variable `file_name`.
    pub fn with_rename(mut self, variable: impl Into<String>, file_name: impl Into<String>) -> Self {
        self.renames.insert(variable.into(), file_name.into());
        self
    }

    /// Keep only time steps inside `range`.
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Time window, if any.
    pub fn range(&self) -> Option<&DateRange> {
        self.range.as_ref()
    }

    /// Name of `variable` inside the file.
    pub fn file_name<'a>(&'a self, variable: &'a str) -> &'a str {
        self.renames.get(variable).map_or(variable, String::as_str)
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every empty alias list.
    pub fn validate(&self) -> Result<(), IoError> {
        let problems: Vec<&str> = [
            ("lon_aliases", &self.lon_aliases),
            ("lat_aliases", &self.lat_aliases),
            ("time_aliases", &self.time_aliases),
        ]
        .into_iter()
        .filter(|(_, aliases)| aliases.is_empty())
        .map(|(name, _)| name)
        .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: problems.len(),
                details: format!("empty alias list(s): {}", problems.join(", ")),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// NetcdfReader
// ---------------------------------------------------------------------------

/// Reads fields from one NetCDF file.
///
/// Supports `(time, lat, lon)` variables and static `(lat, lon)` maps.
#[derive(Debug, Clone)]
pub struct NetcdfReader {
    path: PathBuf,
    config: ReaderConfig,
}

impl NetcdfReader {
    /// Creates a reader for `path`. Nothing is opened until
    /// [`DataReader::retrieve`] is called.
    pub fn new(path: impl Into<PathBuf>, config: ReaderConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// File this reader reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl DataReader for NetcdfReader {
    fn retrieve(&self, variable: &str) -> Result<GriddedField, IoError> {
        self.config.validate()?;
        let path = self.path.as_path();
        let file = netcdf_read::open_file(path)?;

        // -- Coordinates ----------------------------------------------------

        let lon_refs: Vec<&str> = self.config.lon_aliases.iter().map(String::as_str).collect();
        let lat_refs: Vec<&str> = self.config.lat_aliases.iter().map(String::as_str).collect();
        let lons = netcdf_read::read_1d_f64(&file, &lon_refs, path)?;
        let lats = netcdf_read::read_1d_f64(&file, &lat_refs, path)?;
        let grid = LatLonGrid::new(lats, lons)?;
        let (ny, nx) = (grid.ny(), grid.nx());

        // -- Data variable --------------------------------------------------

        let file_name = self.config.file_name(variable);
        let raw = netcdf_read::read_variable(&file, &[file_name], path)?;
        let dim_lens: Vec<usize> = raw.dims.iter().map(|(_, len)| *len).collect();
        let n_values = raw.values.len();

        let field = match dim_lens.as_slice() {
            [nt, y, x] => {
                check_dim(&raw.dims[1].0, ny, *y)?;
                check_dim(&raw.dims[2].0, nx, *x)?;

                let time_refs: Vec<&str> =
                    self.config.time_aliases.iter().map(String::as_str).collect();
                let time_name = time_refs
                    .iter()
                    .copied()
                    .find(|name| file.variable(name).is_some())
                    .ok_or_else(|| IoError::MissingVariable {
                        name: time_refs.first().copied().unwrap_or("time").to_string(),
                        path: path.to_path_buf(),
                    })?;
                let offsets = netcdf_read::read_1d_f64(&file, &[time_name], path)?;
                check_dim(time_name, *nt, offsets.len())?;
                let encoding = netcdf_read::read_time_encoding(&file, time_name, path)?;
                let times = encoding.decode(&offsets)?;

                let data = Array3::from_shape_vec((*nt, ny, nx), raw.values).map_err(|_| {
                    IoError::DimensionMismatch {
                        name: variable.to_string(),
                        expected: nt * ny * nx,
                        got: n_values,
                    }
                })?;
                GriddedField::new(variable, times, grid, data)?
            }
            [y, x] => {
                check_dim(&raw.dims[0].0, ny, *y)?;
                check_dim(&raw.dims[1].0, nx, *x)?;
                let data = Array2::from_shape_vec((ny, nx), raw.values).map_err(|_| {
                    IoError::DimensionMismatch {
                        name: variable.to_string(),
                        expected: ny * nx,
                        got: n_values,
                    }
                })?;
                GriddedField::new_static(variable, grid, data)?
            }
            other => {
                return Err(IoError::DimensionMismatch {
                    name: format!("{variable} dimensions"),
                    expected: 3,
                    got: other.len(),
                });
            }
        };

        let field = match raw.units {
            Some(units) => field.with_units(units),
            None => field,
        };

        // -- Time window ----------------------------------------------------

        let field = match (&self.config.range, field.times()) {
            (Some(range), Some(_)) => {
                let n_before = field.n_times();
                let selected = field.select_range(range)?;
                debug!(
                    variable,
                    start = %range.start(),
                    end = %range.end(),
                    n_before,
                    n_after = selected.n_times(),
                    "applied time window"
                );
                selected
            }
            _ => field,
        };

        info!(
            path = %path.display(),
            variable,
            n_times = field.n_times(),
            ny,
            nx,
            "retrieved field"
        );
        Ok(field)
    }
}

fn check_dim(name: &str, expected: usize, got: usize) -> Result<(), IoError> {
    if expected == got {
        Ok(())
    } else {
        Err(IoError::DimensionMismatch {
            name: name.to_string(),
            expected,
            got,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

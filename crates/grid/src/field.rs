//! Gridded `(time, lat, lon)` fields.

use chrono::{Datelike, NaiveDate};
use diagon_calendar::{DateRange, Frequency, Season};
use ndarray::{Array2, Array3, ArrayView2, Axis, s, stack};
use tracing::debug;

use crate::anomaly::monthly_anomalies;
use crate::error::GridError;
use crate::grid::LatLonGrid;
use crate::region::RegionSpec;
use crate::series::{TimeSeries, check_times};

/// A named variable on a [`LatLonGrid`], optionally with a time axis.
///
/// Data is stored as `(time, lat, lon)`. A field without a time axis (a
/// static map such as a land fraction) keeps a leading axis of length 1;
/// operations that need time fail on it with
/// [`GridError::MissingTimeDimension`].
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedField {
    name: String,
    units: Option<String>,
    times: Option<Vec<NaiveDate>>,
    grid: LatLonGrid,
    data: Array3<f64>,
}

impl GriddedField {
    /// Creates a time-dependent field.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `data` is not shaped
    /// `(times.len(), grid.ny(), grid.nx())`, or
    /// [`GridError::NonMonotonicTime`] if timestamps are not strictly
    /// increasing.
    pub fn new(
        name: impl Into<String>,
        times: Vec<NaiveDate>,
        grid: LatLonGrid,
        data: Array3<f64>,
    ) -> Result<Self, GridError> {
        check_shape(data.dim(), (times.len(), grid.ny(), grid.nx()))?;
        check_times(&times)?;
        Ok(Self {
            name: name.into(),
            units: None,
            times: Some(times),
            grid,
            data,
        })
    }

    /// Creates a field without a time axis.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `data` is not shaped
    /// `(grid.ny(), grid.nx())`.
    pub fn new_static(
        name: impl Into<String>,
        grid: LatLonGrid,
        data: Array2<f64>,
    ) -> Result<Self, GridError> {
        let (ny, nx) = data.dim();
        check_shape((1, ny, nx), (1, grid.ny(), grid.nx()))?;
        Ok(Self {
            name: name.into(),
            units: None,
            times: None,
            grid,
            data: data.insert_axis(Axis(0)),
        })
    }

    /// Sets the physical unit.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical unit, if any.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Spatial grid.
    pub fn grid(&self) -> &LatLonGrid {
        &self.grid
    }

    /// Raw data, shape `(time, lat, lon)`.
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Timestamps, or `None` for a static field.
    pub fn times(&self) -> Option<&[NaiveDate]> {
        self.times.as_deref()
    }

    /// Timestamps of a time-dependent field.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingTimeDimension`] for a static field.
    pub fn time_axis(&self) -> Result<&[NaiveDate], GridError> {
        self.times
            .as_deref()
            .ok_or_else(|| GridError::MissingTimeDimension {
                name: self.name.clone(),
            })
    }

    /// Number of time steps (0 for a static field).
    pub fn n_times(&self) -> usize {
        self.times.as_ref().map_or(0, Vec::len)
    }

    /// Map at time step `t`.
    pub fn step(&self, t: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), t)
    }

    /// Time series of the cell at `(lat index, lon index)`.
    pub fn cell_series(&self, j: usize, i: usize) -> Vec<f64> {
        self.data.slice(s![.., j, i]).to_vec()
    }

    /// Calendar month of each time step.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingTimeDimension`] for a static field.
    pub fn months(&self) -> Result<Vec<u32>, GridError> {
        Ok(self.time_axis()?.iter().map(|t| t.month()).collect())
    }

    /// Cells inside `region`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyRegion`] if no latitude or no longitude of
    /// the grid falls inside the region.
    pub fn select_region(&self, region: &RegionSpec) -> Result<Self, GridError> {
        let lat_idx = region.lat_indices(self.grid.lats());
        let lon_idx = region.lon_indices(self.grid.lons());
        if lat_idx.is_empty() || lon_idx.is_empty() {
            return Err(GridError::EmptyRegion {
                region: region.to_string(),
            });
        }
        debug!(
            field = %self.name,
            n_lat = lat_idx.len(),
            n_lon = lon_idx.len(),
            "selected region"
        );

        let data = self
            .data
            .select(Axis(1), &lat_idx)
            .select(Axis(2), &lon_idx);
        Ok(Self {
            name: self.name.clone(),
            units: self.units.clone(),
            times: self.times.clone(),
            grid: self.grid.subset(&lat_idx, &lon_idx),
            data,
        })
    }

    /// Area-weighted spatial mean at every time step.
    ///
    /// Each cell is weighted by its true surface area
    /// ([`LatLonGrid::cell_areas`]); non-finite cells are left out of the
    /// numerator and the denominator of their time step.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingTimeDimension`] for a static field.
    pub fn fldmean(&self) -> Result<TimeSeries, GridError> {
        let times = self.time_axis()?.to_vec();
        let weights: Vec<f64> = self.grid.cell_areas().iter().copied().collect();

        let values: Vec<f64> = (0..times.len())
            .map(|t| {
                let step: Vec<f64> = self.step(t).iter().copied().collect();
                diagon_stats::weighted_mean(&step, &weights)
            })
            .collect();

        let series = TimeSeries::new(times, values)?.with_name(self.name.clone());
        Ok(match &self.units {
            Some(u) => series.with_units(u.clone()),
            None => series,
        })
    }

    /// Subtract, at every grid point, the mean of the same calendar month
    /// over the whole record.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingTimeDimension`] for a static field.
    pub fn monthly_anomalies(&self) -> Result<Self, GridError> {
        let months = self.months()?;
        let mut data = self.data.clone();
        for mut lane in data.lanes_mut(Axis(0)) {
            let series = lane.to_vec();
            let anomalies = monthly_anomalies(&series, &months);
            for (dst, v) in lane.iter_mut().zip(anomalies) {
                *dst = v;
            }
        }
        Ok(self.with_data(self.times.clone(), data))
    }

    /// Keep the time steps whose month belongs to `season`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingTimeDimension`] for a static field.
    pub fn select_months(&self, season: Season) -> Result<Self, GridError> {
        let idx = self.time_indices(|t| season.contains(t.month()))?;
        Ok(self.select_steps(&idx))
    }

    /// Keep the time steps inside `range`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingTimeDimension`] for a static field.
    pub fn select_range(&self, range: &DateRange) -> Result<Self, GridError> {
        let idx = self.time_indices(|t| range.contains(t))?;
        Ok(self.select_steps(&idx))
    }

    /// Keep the given time steps, in the given order.
    ///
    /// Indices must be in bounds and strictly increasing; callers derive
    /// them from this field's own time axis.
    pub fn select_steps(&self, idx: &[usize]) -> Self {
        let times = self
            .times
            .as_ref()
            .map(|ts| idx.iter().map(|&t| ts[t]).collect());
        self.with_data(times, self.data.select(Axis(0), idx))
    }

    /// Per-cell mean over the given time steps, ignoring non-finite values.
    pub fn mean_over_steps(&self, idx: &[usize]) -> Array2<f64> {
        let (_, ny, nx) = self.data.dim();
        Array2::from_shape_fn((ny, nx), |(j, i)| {
            let values: Vec<f64> = idx.iter().map(|&t| self.data[[t, j, i]]).collect();
            diagon_stats::mean(&values)
        })
    }

    /// Resample to monthly or annual means (timmean).
    ///
    /// Each output step is stamped with the start of its period (first of
    /// the month or January 1st) and holds the per-cell mean of the input
    /// steps falling in that period.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingTimeDimension`] for a static field.
    pub fn resample_mean(&self, frequency: Frequency) -> Result<Self, GridError> {
        let times = self.time_axis()?;

        let mut stamps: Vec<NaiveDate> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (t, &time) in times.iter().enumerate() {
            let stamp = period_start(time, frequency);
            match stamps.last() {
                Some(&last) if last == stamp => {
                    if let Some(g) = groups.last_mut() {
                        g.push(t);
                    }
                }
                _ => {
                    stamps.push(stamp);
                    groups.push(vec![t]);
                }
            }
        }

        let (_, ny, nx) = self.data.dim();
        let means: Vec<Array2<f64>> = groups.iter().map(|g| self.mean_over_steps(g)).collect();
        let data = if means.is_empty() {
            Array3::zeros((0, ny, nx))
        } else {
            let views: Vec<ArrayView2<'_, f64>> = means.iter().map(|m| m.view()).collect();
            stack(Axis(0), &views).map_err(|_| GridError::DimensionMismatch {
                name: "time".into(),
                expected: stamps.len(),
                got: views.len(),
            })?
        };

        debug!(
            field = %self.name,
            %frequency,
            n_in = times.len(),
            n_out = stamps.len(),
            "resampled field"
        );
        Ok(self.with_data(Some(stamps), data))
    }

    fn time_indices(&self, keep: impl Fn(NaiveDate) -> bool) -> Result<Vec<usize>, GridError> {
        Ok(self
            .time_axis()?
            .iter()
            .enumerate()
            .filter(|(_, t)| keep(**t))
            .map(|(i, _)| i)
            .collect())
    }

    fn with_data(&self, times: Option<Vec<NaiveDate>>, data: Array3<f64>) -> Self {
        Self {
            name: self.name.clone(),
            units: self.units.clone(),
            times,
            grid: self.grid.clone(),
            data,
        }
    }
}

fn period_start(t: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Monthly => t.with_day(1).unwrap_or(t),
        Frequency::Annual => NaiveDate::from_ymd_opt(t.year(), 1, 1).unwrap_or(t),
    }
}

fn check_shape(got: (usize, usize, usize), expected: (usize, usize, usize)) -> Result<(), GridError> {
    let names = ["time", "lat", "lon"];
    let got = [got.0, got.1, got.2];
    let expected = [expected.0, expected.1, expected.2];
    for k in 0..3 {
        if got[k] != expected[k] {
            return Err(GridError::DimensionMismatch {
                name: names[k].into(),
                expected: expected[k],
                got: got[k],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| date(2000 + (i / 12) as i32, (i % 12) as u32 + 1, 1))
            .collect()
    }

    fn grid_2x3() -> LatLonGrid {
        LatLonGrid::new(vec![0.0, 60.0], vec![0.0, 120.0, 240.0]).unwrap()
    }

    #[test]
    fn new_checks_shape() {
        let err = GriddedField::new("x", monthly(2), grid_2x3(), Array3::zeros((3, 2, 3)))
            .unwrap_err();
        assert_eq!(
            err,
            GridError::DimensionMismatch {
                name: "time".into(),
                expected: 2,
                got: 3
            }
        );
        let err = GriddedField::new("x", monthly(2), grid_2x3(), Array3::zeros((2, 2, 2)))
            .unwrap_err();
        assert!(matches!(err, GridError::DimensionMismatch { ref name, .. } if name == "lon"));
    }

    #[test]
    fn static_field_has_no_time_axis() {
        let f = GriddedField::new_static("mask", grid_2x3(), Array2::ones((2, 3))).unwrap();
        assert!(f.times().is_none());
        assert_eq!(f.n_times(), 0);
        assert_eq!(
            f.fldmean().unwrap_err(),
            GridError::MissingTimeDimension {
                name: "mask".into()
            }
        );
        assert!(f.monthly_anomalies().is_err());
    }

    #[test]
    fn fldmean_weights_by_area() {
        // Equator cells = 1, 60N cells = 0 -> mean closer to 1 than 0.5.
        let mut data = Array3::zeros((1, 2, 3));
        data.slice_mut(s![0, 0, ..]).fill(1.0);
        let f = GriddedField::new("x", monthly(1), grid_2x3(), data).unwrap();
        let m = f.fldmean().unwrap().values()[0];
        assert!(m > 0.5 && m < 1.0, "area-weighted mean {m}");

        let areas = grid_2x3().cell_areas();
        let expected = areas.row(0).sum() / areas.sum();
        assert_relative_eq!(m, expected, epsilon = 1e-12);
    }

    #[test]
    fn fldmean_skips_nan_cells() {
        let mut data = Array3::from_elem((1, 2, 3), 2.0);
        data[[0, 1, 1]] = f64::NAN;
        let f = GriddedField::new("x", monthly(1), grid_2x3(), data).unwrap();
        assert_relative_eq!(f.fldmean().unwrap().values()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn select_region_subsets_grid() {
        let data = Array3::from_shape_fn((2, 2, 3), |(t, j, i)| (t * 100 + j * 10 + i) as f64);
        let f = GriddedField::new("x", monthly(2), grid_2x3(), data).unwrap();
        let region = RegionSpec::new(50.0, 70.0, 100.0, 250.0).unwrap();
        let sub = f.select_region(&region).unwrap();
        assert_eq!(sub.grid().lats(), &[60.0]);
        assert_eq!(sub.grid().lons(), &[120.0, 240.0]);
        assert_eq!(sub.data()[[1, 0, 1]], 112.0);
        assert_eq!(sub.times(), f.times());
    }

    #[test]
    fn select_region_empty() {
        let f = GriddedField::new("x", monthly(1), grid_2x3(), Array3::zeros((1, 2, 3))).unwrap();
        let region = RegionSpec::new(-60.0, -30.0, 0.0, 360.0).unwrap();
        assert!(matches!(
            f.select_region(&region),
            Err(GridError::EmptyRegion { .. })
        ));
    }

    #[test]
    fn anomalies_per_cell() {
        // 24 months, cell value = month index within year + cell offset
        let data = Array3::from_shape_fn((24, 2, 3), |(t, j, i)| (t % 12) as f64 + (j * 3 + i) as f64);
        let f = GriddedField::new("x", monthly(24), grid_2x3(), data).unwrap();
        let anom = f.monthly_anomalies().unwrap();
        assert!(anom.data().iter().all(|v| v.abs() < 1e-12));
        // input untouched
        assert_eq!(f.data()[[5, 1, 2]], 10.0);
    }

    #[test]
    fn select_months_and_range() {
        let f = GriddedField::new("x", monthly(24), grid_2x3(), Array3::zeros((24, 2, 3))).unwrap();
        let jja = f.select_months(Season::Jja).unwrap();
        assert_eq!(jja.n_times(), 6);
        assert!(jja.months().unwrap().iter().all(|m| (6..=8).contains(m)));

        let r = DateRange::new(date(2000, 11, 1), date(2001, 2, 1));
        assert_eq!(f.select_range(&r).unwrap().n_times(), 4);
    }

    #[test]
    fn resample_annual_means() {
        let data = Array3::from_shape_fn((24, 2, 3), |(t, _, _)| if t < 12 { 1.0 } else { 3.0 });
        let f = GriddedField::new("x", monthly(24), grid_2x3(), data).unwrap();
        let annual = f.resample_mean(Frequency::Annual).unwrap();
        assert_eq!(annual.times().unwrap(), &[date(2000, 1, 1), date(2001, 1, 1)]);
        assert_relative_eq!(annual.data()[[0, 1, 1]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(annual.data()[[1, 0, 2]], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn resample_daily_to_monthly() {
        let times: Vec<NaiveDate> = (0..59)
            .map(|d| date(2001, 1, 1) + chrono::Days::new(d))
            .collect();
        let data = Array3::from_shape_fn((59, 1, 1), |(t, _, _)| if t < 31 { 0.0 } else { 10.0 });
        let grid = LatLonGrid::new(vec![0.0], vec![0.0]).unwrap();
        let f = GriddedField::new("x", times, grid, data).unwrap();
        let monthly = f.resample_mean(Frequency::Monthly).unwrap();
        assert_eq!(monthly.n_times(), 2);
        assert_eq!(monthly.times().unwrap()[1], date(2001, 2, 1));
        assert_relative_eq!(monthly.data()[[1, 0, 0]], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn cell_series_and_mean_over_steps() {
        let data = Array3::from_shape_fn((3, 2, 3), |(t, j, i)| (t + j + i) as f64);
        let f = GriddedField::new("x", monthly(3), grid_2x3(), data).unwrap();
        assert_eq!(f.cell_series(1, 2), vec![3.0, 4.0, 5.0]);
        let m = f.mean_over_steps(&[0, 2]);
        assert_relative_eq!(m[[1, 2]], 4.0, epsilon = 1e-12);
    }
}

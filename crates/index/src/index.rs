//! Regional index: area-weighted mean of monthly anomalies.

use diagon_grid::{GriddedField, RegionSpec, TimeSeries};
use tracing::{debug, warn};

use crate::error::IndexError;

/// Area-weighted mean over `region` of the field's monthly anomalies.
///
/// # Errors
///
/// Returns a wrapped [`diagon_grid::GridError`] if the field has no time
/// axis or the region selects no grid points.
pub fn regional_anomaly_mean(
    field: &GriddedField,
    region: &RegionSpec,
) -> Result<TimeSeries, IndexError> {
    field.time_axis()?;
    let regional = field.select_region(region)?;
    Ok(regional.monthly_anomalies()?.fldmean()?)
}

/// Compute a regional climate index.
///
/// Removes the monthly climatology at every grid point of `field`, averages
/// the anomalies over `region` weighting each cell by its area, and names
/// the result `name`. With `apply_detrend`, the anomaly mean of the whole
/// `detrend_reference` field is subtracted on common timestamps.
///
/// # Errors
///
/// - a wrapped [`diagon_grid::GridError`] if a field has no time axis or the
///   region selects no grid points
/// - [`IndexError::MissingDetrendReference`] if detrending without a
///   reference
pub fn compute_index(
    field: &GriddedField,
    region: &RegionSpec,
    apply_detrend: bool,
    detrend_reference: Option<&GriddedField>,
    name: &str,
) -> Result<TimeSeries, IndexError> {
    let index = regional_anomaly_mean(field, region)?.renamed(name);
    debug!(field = field.name(), %region, n_times = index.len(), "computed index");

    if !apply_detrend {
        return Ok(index);
    }
    let reference = detrend_reference.ok_or(IndexError::MissingDetrendReference)?;
    let background = reference.monthly_anomalies()?.fldmean()?;
    detrend_index(&index, &background)
}

/// Subtract `reference` from `index` on their common timestamps.
///
/// Time steps present in only one of the series are dropped. The result
/// keeps the name and unit of `index`.
///
/// # Errors
///
/// Returns a wrapped [`diagon_grid::GridError`] only if the aligned series
/// cannot be rebuilt, which does not happen for valid inputs.
pub fn detrend_index(index: &TimeSeries, reference: &TimeSeries) -> Result<TimeSeries, IndexError> {
    let pairs = index.align_with(reference.times());
    if pairs.len() < index.len() {
        warn!(
            index = index.name().unwrap_or("index"),
            n_index = index.len(),
            n_common = pairs.len(),
            "detrend reference does not cover every index time step"
        );
    }

    let (own, other): (Vec<usize>, Vec<usize>) = pairs.into_iter().unzip();
    let values = own
        .iter()
        .zip(&other)
        .map(|(&i, &j)| index.values()[i] - reference.values()[j])
        .collect();
    Ok(index.select_steps(&own).with_values(values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use diagon_grid::{GridError, LatLonGrid};
    use ndarray::{Array2, Array3};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| date(2000 + (i / 12) as i32, (i % 12) as u32 + 1, 1))
            .collect()
    }

    fn grid() -> LatLonGrid {
        LatLonGrid::new(vec![-30.0, 0.0, 30.0], vec![290.0, 330.0]).unwrap()
    }

    #[test]
    fn detrend_subtracts_reference() {
        let times = monthly(3);
        let index = TimeSeries::new(times.clone(), vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_name("amo");
        let global = TimeSeries::new(times, vec![0.5, 0.5, 0.5]).unwrap();
        let out = detrend_index(&index, &global).unwrap();
        assert_eq!(out.values(), &[0.5, 1.5, 2.5]);
        assert_eq!(out.name(), Some("amo"));
    }

    #[test]
    fn detrend_uses_common_timestamps() {
        let index = TimeSeries::new(monthly(3), vec![1.0, 2.0, 3.0]).unwrap();
        let global = TimeSeries::new(monthly(4)[1..].to_vec(), vec![1.0, 1.0, 1.0]).unwrap();
        let out = detrend_index(&index, &global).unwrap();
        assert_eq!(out.times(), &monthly(3)[1..]);
        assert_eq!(out.values(), &[1.0, 2.0]);
    }

    #[test]
    fn index_is_named_and_anomalous() {
        let data = Array3::from_shape_fn((36, 3, 2), |(t, j, _)| {
            (t % 12) as f64 + (t / 12) as f64 + j as f64
        });
        let field = GriddedField::new("tos", monthly(36), grid(), data).unwrap();
        let region = RegionSpec::new(-40.0, 40.0, -80.0, 0.0).unwrap();

        let index = compute_index(&field, &region, false, None, "amo").unwrap();
        assert_eq!(index.name(), Some("amo"));
        assert_eq!(index.len(), 36);
        // The seasonal cycle and the cell offsets cancel, the yearly step stays.
        assert_relative_eq!(index.values()[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(index.values()[14], 0.0, epsilon = 1e-12);
        assert_relative_eq!(index.values()[35], 1.0, epsilon = 1e-12);
        // Inputs untouched.
        assert_eq!(field.data()[[13, 2, 0]], 4.0);
    }

    #[test]
    fn detrending_against_itself_is_zero() {
        let data = Array3::from_shape_fn((24, 3, 2), |(t, j, i)| (t * (j + 1) + i) as f64);
        let field = GriddedField::new("tos", monthly(24), grid(), data).unwrap();
        let index = compute_index(&field, &RegionSpec::global(), true, Some(&field), "x").unwrap();
        assert!(index.values().iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn detrend_without_reference_fails() {
        let field = GriddedField::new("tos", monthly(12), grid(), Array3::zeros((12, 3, 2))).unwrap();
        let err = compute_index(&field, &RegionSpec::global(), true, None, "x").unwrap_err();
        assert_eq!(err, IndexError::MissingDetrendReference);
    }

    #[test]
    fn static_field_is_data_error() {
        let field = GriddedField::new_static("sftlf", grid(), Array2::zeros((3, 2))).unwrap();
        let err = compute_index(&field, &RegionSpec::global(), false, None, "x").unwrap_err();
        assert_eq!(
            err,
            IndexError::Grid(GridError::MissingTimeDimension {
                name: "sftlf".into()
            })
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn empty_region_is_data_error() {
        let field = GriddedField::new("tos", monthly(12), grid(), Array3::zeros((12, 3, 2))).unwrap();
        let region = RegionSpec::new(60.0, 80.0, 0.0, 360.0).unwrap();
        let err = compute_index(&field, &region, false, None, "x").unwrap_err();
        assert!(matches!(err, IndexError::Grid(GridError::EmptyRegion { .. })));
    }
}

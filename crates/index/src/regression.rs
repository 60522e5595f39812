//! Regression and correlation maps of a field onto an index.

use chrono::Datelike;
use diagon_calendar::Season;
use diagon_grid::{GriddedField, LatLonGrid, TimeSeries};
use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::IndexError;

/// Per-cell regression slope and Pearson correlation of a field on an index.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionMaps {
    regression: Array2<f64>,
    correlation: Array2<f64>,
    grid: LatLonGrid,
    season: Season,
    n_times: usize,
    field_name: String,
    units: Option<String>,
}

impl RegressionMaps {
    /// Slope of the field anomaly per unit of index, shape `(ny, nx)`.
    pub fn regression(&self) -> &Array2<f64> {
        &self.regression
    }

    /// Pearson correlation, shape `(ny, nx)`.
    pub fn correlation(&self) -> &Array2<f64> {
        &self.correlation
    }

    /// Grid of both maps.
    pub fn grid(&self) -> &LatLonGrid {
        &self.grid
    }

    /// Season the statistics were restricted to.
    pub fn season(&self) -> Season {
        self.season
    }

    /// Number of time steps entering the statistics.
    pub fn n_times(&self) -> usize {
        self.n_times
    }

    /// Name of the regressed field.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Unit of the regressed field, if any.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }
}

/// Regress and correlate a field onto an index, cell by cell.
///
/// The field is de-seasonalized over its full record (monthly anomalies),
/// then both inputs are restricted to their common timestamps and to the
/// months of `season`. Regression is `cov(index, field) / var(index)`.
/// Cells with fewer than two valid pairs or zero variance get `NaN`.
///
/// Returns `Ok(None)` when either input is absent, so a missing optional
/// dataset does not abort the caller.
///
/// # Errors
///
/// Returns a wrapped [`diagon_grid::GridError`] if `field` has no time axis.
pub fn regression_and_correlation(
    index: Option<&TimeSeries>,
    field: Option<&GriddedField>,
    season: Season,
) -> Result<Option<RegressionMaps>, IndexError> {
    let (Some(index), Some(field)) = (index, field) else {
        debug!(
            %season,
            has_index = index.is_some(),
            has_field = field.is_some(),
            "skipping regression: input missing"
        );
        return Ok(None);
    };

    let anomalies = field.monthly_anomalies()?;
    let (index_steps, field_steps): (Vec<usize>, Vec<usize>) = index
        .align_with(anomalies.time_axis()?)
        .into_iter()
        .filter(|&(i, _)| season.contains(index.times()[i].month()))
        .unzip();

    if index_steps.len() < 2 {
        warn!(
            field = field.name(),
            %season,
            n_common = index_steps.len(),
            "too few common time steps for regression"
        );
    }

    let x: Vec<f64> = index_steps.iter().map(|&i| index.values()[i]).collect();
    let selected = anomalies.select_steps(&field_steps);

    let (ny, nx) = (selected.grid().ny(), selected.grid().nx());
    let rows: Vec<(Vec<f64>, Vec<f64>)> = (0..ny)
        .into_par_iter()
        .map(|j| {
            (0..nx)
                .map(|i| {
                    let y = selected.cell_series(j, i);
                    (
                        diagon_stats::regression_slope(&x, &y),
                        diagon_stats::pearson_correlation(&x, &y),
                    )
                })
                .unzip()
        })
        .collect();

    debug!(
        field = field.name(),
        %season,
        n_times = x.len(),
        "computed regression maps"
    );

    Ok(Some(RegressionMaps {
        regression: Array2::from_shape_fn((ny, nx), |(j, i)| rows[j].0[i]),
        correlation: Array2::from_shape_fn((ny, nx), |(j, i)| rows[j].1[i]),
        grid: selected.grid().clone(),
        season,
        n_times: x.len(),
        field_name: field.name().to_string(),
        units: field.units().map(str::to_string),
    }))
}

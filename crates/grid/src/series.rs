//! Scalar time series.

use chrono::{Datelike, NaiveDate};
use diagon_calendar::{DateRange, Season};

use crate::anomaly::monthly_anomalies;
use crate::error::GridError;

/// Ordered `(timestamp, value)` pairs with an optional name and unit.
///
/// Timestamps are strictly increasing; construction rejects duplicates and
/// unordered input with [`GridError::NonMonotonicTime`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: Option<String>,
    units: Option<String>,
    times: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Validate that timestamps are strictly increasing.
pub(crate) fn check_times(times: &[NaiveDate]) -> Result<(), GridError> {
    match times.windows(2).position(|w| w[0] >= w[1]) {
        Some(i) => Err(GridError::NonMonotonicTime { index: i + 1 }),
        None => Ok(()),
    }
}

impl TimeSeries {
    /// Creates a new unnamed series after validating lengths and ordering.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `values.len() != times.len()`,
    /// [`GridError::NonMonotonicTime`] if timestamps are not strictly increasing.
    pub fn new(times: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, GridError> {
        if times.len() != values.len() {
            return Err(GridError::DimensionMismatch {
                name: "time".into(),
                expected: times.len(),
                got: values.len(),
            });
        }
        check_times(&times)?;
        Ok(Self {
            name: None,
            units: None,
            times,
            values,
        })
    }

    /// Sets the variable name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the physical unit.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Variable name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Physical unit, if any.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Timestamps.
    pub fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    /// Values, one per timestamp.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the series has no time steps.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Calendar month (1..=12) of each timestamp.
    pub fn months(&self) -> Vec<u32> {
        self.times.iter().map(|t| t.month()).collect()
    }

    /// Sample standard deviation over time (N-1), `NaN` if undefined.
    pub fn std(&self) -> f64 {
        diagon_stats::sd(&self.values)
    }

    /// Mean over time, `NaN` if there are no finite values.
    pub fn mean(&self) -> f64 {
        diagon_stats::mean(&self.values)
    }

    /// Anomalies with respect to this series' own monthly climatology.
    pub fn monthly_anomalies(&self) -> Self {
        let values = monthly_anomalies(&self.values, &self.months());
        self.replace_values(values)
    }

    /// Keep the time steps whose month belongs to `season`.
    pub fn select_months(&self, season: Season) -> Self {
        self.filter_times(|t| season.contains(t.month()))
    }

    /// Keep the time steps inside `range`.
    pub fn select_range(&self, range: &DateRange) -> Self {
        self.filter_times(|t| range.contains(t))
    }

    /// Index pairs `(i, j)` such that `self.times()[i] == other.times()[j]`,
    /// in chronological order (an inner join on timestamps).
    pub fn align_with(&self, other: &[NaiveDate]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(self.times.len().min(other.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.times.len() && j < other.len() {
            match self.times[i].cmp(&other[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    pairs.push((i, j));
                    i += 1;
                    j += 1;
                }
            }
        }
        pairs
    }

    /// Same timestamps and metadata, new values.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `values` does not have
    /// one entry per timestamp.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self, GridError> {
        if values.len() != self.times.len() {
            return Err(GridError::DimensionMismatch {
                name: "time".into(),
                expected: self.times.len(),
                got: values.len(),
            });
        }
        Ok(self.replace_values(values))
    }

    /// Returns a copy with every value mapped through `f`.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        self.replace_values(self.values.iter().map(|&v| f(v)).collect())
    }

    /// Keep the given time steps, in the given order.
    ///
    /// Indices must be in bounds and strictly increasing, as produced by
    /// [`TimeSeries::align_with`].
    pub fn select_steps(&self, idx: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            units: self.units.clone(),
            times: idx.iter().map(|&i| self.times[i]).collect(),
            values: idx.iter().map(|&i| self.values[i]).collect(),
        }
    }

    /// Returns a copy with the variable name replaced.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.name = Some(name.into());
        out
    }

    fn replace_values(&self, values: Vec<f64>) -> Self {
        Self {
            name: self.name.clone(),
            units: self.units.clone(),
            times: self.times.clone(),
            values,
        }
    }

    fn filter_times(&self, keep: impl Fn(NaiveDate) -> bool) -> Self {
        let (times, values): (Vec<_>, Vec<_>) = self
            .times
            .iter()
            .zip(self.values.iter())
            .filter(|(t, _)| keep(**t))
            .map(|(&t, &v)| (t, v))
            .unzip();
        Self {
            name: self.name.clone(),
            units: self.units.clone(),
            times,
            values,
        }
    }
}

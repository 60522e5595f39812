//! Projection of a climatological cycle onto a concrete date range.

use chrono::NaiveDate;
use diagon_calendar::{DateRange, Frequency, center_timestamp, parse_date, period_starts};
use diagon_grid::{GriddedField, TimeSeries};
use ndarray::{ArrayD, ArrayViewD, Axis, Ix3, stack};
use tracing::debug;

use crate::cycle::{ClimatologicalCycle, CyclePhase};
use crate::error::SeasonalError;

/// Raw projection settings, as read from a configuration file.
///
/// Every field is optional so a missing key surfaces as a configuration
/// error from [`SeasonalCycleProjector::new`] rather than a default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionConfig {
    start_date: Option<String>,
    end_date: Option<String>,
    frequency: Option<String>,
    center_time: bool,
}

impl ProjectionConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// First date of the projection.
    pub fn with_start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Last date of the projection (inclusive).
    pub fn with_end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// `"monthly"` or `"annual"`.
    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = Some(frequency.into());
        self
    }

    /// Shift both range bounds by half a period before laying out the
    /// time axis.
    pub fn with_center_time(mut self, center_time: bool) -> Self {
        self.center_time = center_time;
        self
    }

    /// Configured start date.
    pub fn start_date(&self) -> Option<&str> {
        self.start_date.as_deref()
    }

    /// Configured end date.
    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }

    /// Configured frequency.
    pub fn frequency(&self) -> Option<&str> {
        self.frequency.as_deref()
    }

    /// Whether timestamps are centred.
    pub fn center_time(&self) -> bool {
        self.center_time
    }
}

/// Validated projector: a date range, a frequency and a centering flag.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalCycleProjector {
    range: DateRange,
    frequency: Frequency,
    center_time: bool,
}

impl SeasonalCycleProjector {
    /// Validates a [`ProjectionConfig`].
    ///
    /// # Errors
    ///
    /// - [`SeasonalError::MissingDate`] if a bound is not set
    /// - [`SeasonalError::MissingFrequency`] if the frequency is not set
    /// - [`SeasonalError::Calendar`] if a date does not parse or the
    ///   frequency is unsupported
    pub fn new(config: &ProjectionConfig) -> Result<Self, SeasonalError> {
        let start = required_date(config.start_date(), "start_date")?;
        let end = required_date(config.end_date(), "end_date")?;
        let frequency: Frequency = config
            .frequency()
            .ok_or(SeasonalError::MissingFrequency)?
            .parse()?;
        Ok(Self {
            range: DateRange::new(start, end),
            frequency,
            center_time: config.center_time(),
        })
    }

    /// Requested date range, before any centering.
    pub fn range(&self) -> &DateRange {
        &self.range
    }

    /// Projection frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Whether timestamps are centred.
    pub fn center_time(&self) -> bool {
        self.center_time
    }

    /// Output timestamps paired with the cycle phase each one draws from.
    ///
    /// One period start per month (or year) inside the range. With
    /// centering both bounds are first moved forward by half a period
    /// (15 days or 6 months) and the grid is laid out between the shifted
    /// bounds, so the step count can differ from the uncentred grid. The
    /// phase is always the month of the emitted timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalError::Calendar`] if a shifted bound overflows.
    pub fn timestamps(&self) -> Result<Vec<(NaiveDate, CyclePhase)>, SeasonalError> {
        let (start, end) = if self.center_time {
            (
                center_timestamp(self.range.start(), self.frequency)?,
                center_timestamp(self.range.end(), self.frequency)?,
            )
        } else {
            (self.range.start(), self.range.end())
        };
        Ok(period_starts(start, end, self.frequency)
            .into_iter()
            .map(|t| (t, CyclePhase::of(t, self.frequency)))
            .collect())
    }

    /// Repeat `cycle` over the date range.
    ///
    /// An empty range yields a zero-length projection with the cycle's
    /// entry shape.
    ///
    /// # Errors
    ///
    /// - [`SeasonalError::MissingCycle`] if `cycle` is `None`
    /// - [`SeasonalError::FrequencyMismatch`] if the cycle was built for
    ///   another frequency
    /// - [`SeasonalError::IncompleteCycle`] if a needed month is missing
    pub fn project(
        &self,
        cycle: Option<&ClimatologicalCycle>,
    ) -> Result<ProjectedCycle, SeasonalError> {
        let cycle = cycle.ok_or(SeasonalError::MissingCycle)?;
        if cycle.frequency() != self.frequency {
            return Err(SeasonalError::FrequencyMismatch {
                cycle: cycle.frequency(),
                projector: self.frequency,
            });
        }

        let stamps = self.timestamps()?;
        debug!(
            frequency = %self.frequency,
            center_time = self.center_time,
            start = %self.range.start(),
            end = %self.range.end(),
            n_times = stamps.len(),
            "projecting cycle"
        );

        let values = if stamps.is_empty() {
            cycle.empty_projection()
        } else {
            let views = stamps
                .iter()
                .map(|&(_, phase)| lookup(cycle, phase))
                .collect::<Result<Vec<ArrayViewD<'_, f64>>, _>>()?;
            stack(Axis(0), &views).map_err(|_| SeasonalError::ShapeMismatch {
                what: "projection".into(),
                expected: cycle.shape().to_vec(),
                got: Vec::new(),
            })?
        };

        Ok(ProjectedCycle {
            times: stamps.into_iter().map(|(t, _)| t).collect(),
            values,
            cycle: cycle.clone(),
        })
    }
}

fn required_date(value: Option<&str>, which: &str) -> Result<NaiveDate, SeasonalError> {
    let value = value.ok_or_else(|| SeasonalError::MissingDate {
        which: which.to_string(),
    })?;
    Ok(parse_date(value)?)
}

fn lookup(cycle: &ClimatologicalCycle, phase: CyclePhase) -> Result<ArrayViewD<'_, f64>, SeasonalError> {
    match cycle.get(phase) {
        Some(value) => Ok(value.view()),
        None => Err(match phase {
            CyclePhase::Month(month) => SeasonalError::IncompleteCycle { month },
            CyclePhase::Annual => SeasonalError::EmptyCycle,
        }),
    }
}

/// A cycle repeated over a date range.
///
/// `values` has a leading time axis with one entry per timestamp followed
/// by the cycle's entry shape. It owns its data.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedCycle {
    times: Vec<NaiveDate>,
    values: ArrayD<f64>,
    cycle: ClimatologicalCycle,
}

impl ProjectedCycle {
    /// Output timestamps, strictly increasing.
    pub fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    /// Projected values, shape `[n_times, ...entry shape]`.
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// Shape of one time step.
    pub fn entry_shape(&self) -> &[usize] {
        &self.values.shape()[1..]
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the projection has no time steps.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Scalar projection as a time series.
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalError::ShapeMismatch`] unless entries are scalar.
    pub fn to_series(&self) -> Result<TimeSeries, SeasonalError> {
        if !self.entry_shape().is_empty() {
            return Err(SeasonalError::ShapeMismatch {
                what: "scalar projection".into(),
                expected: Vec::new(),
                got: self.entry_shape().to_vec(),
            });
        }
        let mut series = TimeSeries::new(self.times.clone(), self.values.iter().copied().collect())?;
        if let Some(name) = self.cycle.name() {
            series = series.with_name(name);
        }
        if let Some(units) = self.cycle.units() {
            series = series.with_units(units);
        }
        Ok(series)
    }

    /// Gridded projection as a field on the cycle's grid.
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalError::MissingGrid`] if the cycle has no grid.
    pub fn to_field(&self) -> Result<GriddedField, SeasonalError> {
        let grid = self.cycle.grid().ok_or(SeasonalError::MissingGrid)?;
        let data = self
            .values
            .clone()
            .into_dimensionality::<Ix3>()
            .map_err(|_| SeasonalError::ShapeMismatch {
                what: "gridded projection".into(),
                expected: vec![self.len(), grid.ny(), grid.nx()],
                got: self.values.shape().to_vec(),
            })?;
        let name = self.cycle.name().unwrap_or("cycle");
        let field = GriddedField::new(name, self.times.clone(), grid.clone(), data)?;
        Ok(match self.cycle.units() {
            Some(u) => field.with_units(u),
            None => field,
        })
    }
}

/// Validate the arguments and project `cycle` in one call.
///
/// # Errors
///
/// See [`SeasonalCycleProjector::new`] and
/// [`SeasonalCycleProjector::project`].
pub fn project(
    cycle: Option<&ClimatologicalCycle>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    frequency: &str,
    center_time: bool,
) -> Result<ProjectedCycle, SeasonalError> {
    let mut config = ProjectionConfig::new()
        .with_frequency(frequency)
        .with_center_time(center_time);
    if let Some(start) = start_date {
        config = config.with_start_date(start);
    }
    if let Some(end) = end_date {
        config = config.with_end_date(end);
    }
    SeasonalCycleProjector::new(&config)?.project(cycle)
}

//! Climatological cycles: one aggregate value per phase of the annual cycle.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use diagon_calendar::{CalendarError, Frequency};
use diagon_grid::{GriddedField, LatLonGrid, TimeSeries};
use ndarray::{ArrayD, IxDyn, arr0};
use tracing::debug;

use crate::error::SeasonalError;

/// Key of a cycle entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CyclePhase {
    /// Calendar month, 1..=12.
    Month(u32),
    /// The single entry of an annual cycle.
    Annual,
}

impl CyclePhase {
    /// Phase a timestamp falls into at the given frequency.
    pub fn of(t: NaiveDate, frequency: Frequency) -> Self {
        match frequency {
            Frequency::Monthly => Self::Month(t.month()),
            Frequency::Annual => Self::Annual,
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month(m) => write!(f, "month {m}"),
            Self::Annual => f.write_str("annual"),
        }
    }
}

/// Monthly or annual climatology, scalar or gridded.
///
/// Every entry has the same shape: `[]` for a scalar cycle, `[ny, nx]` for
/// a gridded one. A monthly cycle may lack some months; projecting onto a
/// missing month fails with [`SeasonalError::IncompleteCycle`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClimatologicalCycle {
    frequency: Frequency,
    entries: BTreeMap<CyclePhase, ArrayD<f64>>,
    shape: Vec<usize>,
    grid: Option<LatLonGrid>,
    name: Option<String>,
    units: Option<String>,
}

impl ClimatologicalCycle {
    /// Monthly cycle from per-month values.
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalError::EmptyCycle`] for an empty map,
    /// [`CalendarError::InvalidMonth`] for a key outside 1..=12 and
    /// [`SeasonalError::ShapeMismatch`] if entries differ in shape.
    pub fn monthly(values: BTreeMap<u32, ArrayD<f64>>) -> Result<Self, SeasonalError> {
        let mut entries = BTreeMap::new();
        for (month, value) in values {
            if !(1..=12).contains(&month) {
                return Err(CalendarError::InvalidMonth { month }.into());
            }
            entries.insert(CyclePhase::Month(month), value);
        }
        Self::from_entries(Frequency::Monthly, entries)
    }

    /// Scalar monthly cycle, January first.
    pub fn monthly_scalars(values: [f64; 12]) -> Self {
        let entries = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (CyclePhase::Month(i as u32 + 1), arr0(v).into_dyn()))
            .collect();
        Self {
            frequency: Frequency::Monthly,
            entries,
            shape: Vec::new(),
            grid: None,
            name: None,
            units: None,
        }
    }

    /// Annual cycle holding a single value.
    pub fn annual(value: ArrayD<f64>) -> Self {
        let shape = value.shape().to_vec();
        Self {
            frequency: Frequency::Annual,
            entries: BTreeMap::from([(CyclePhase::Annual, value)]),
            shape,
            grid: None,
            name: None,
            units: None,
        }
    }

    /// Climatology of a scalar series.
    ///
    /// Monthly: mean of the finite values of each calendar month (months
    /// never sampled are left out). Annual: mean of all finite values.
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalError::EmptyCycle`] if the series is empty.
    pub fn from_series(series: &TimeSeries, frequency: Frequency) -> Result<Self, SeasonalError> {
        let groups = phase_groups(series.times(), frequency);
        let entries = groups
            .into_iter()
            .map(|(phase, idx)| {
                let values: Vec<f64> = idx.iter().map(|&t| series.values()[t]).collect();
                (phase, arr0(diagon_stats::mean(&values)).into_dyn())
            })
            .collect();

        let mut cycle = Self::from_entries(frequency, entries)?;
        cycle.name = series.name().map(str::to_string);
        cycle.units = series.units().map(str::to_string);
        Ok(cycle)
    }

    /// Per-cell climatology of a gridded field, NaN-aware.
    ///
    /// # Errors
    ///
    /// Returns [`diagon_grid::GridError::MissingTimeDimension`] (wrapped)
    /// for a static field and [`SeasonalError::EmptyCycle`] if the field has
    /// no time steps.
    pub fn from_field(field: &GriddedField, frequency: Frequency) -> Result<Self, SeasonalError> {
        let groups = phase_groups(field.time_axis()?, frequency);
        let entries = groups
            .into_iter()
            .map(|(phase, idx)| (phase, field.mean_over_steps(&idx).into_dyn()))
            .collect();

        let mut cycle = Self::from_entries(frequency, entries)?;
        debug!(
            field = field.name(),
            %frequency,
            n_phases = cycle.entries.len(),
            "computed climatology"
        );
        cycle.grid = Some(field.grid().clone());
        cycle.name = Some(field.name().to_string());
        cycle.units = field.units().map(str::to_string);
        Ok(cycle)
    }

    /// Attach a grid to a gridded cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SeasonalError::ShapeMismatch`] unless entries are shaped
    /// `[grid.ny(), grid.nx()]`.
    pub fn with_grid(mut self, grid: LatLonGrid) -> Result<Self, SeasonalError> {
        let expected = vec![grid.ny(), grid.nx()];
        if self.shape != expected {
            return Err(SeasonalError::ShapeMismatch {
                what: "cycle grid".into(),
                expected,
                got: self.shape,
            });
        }
        self.grid = Some(grid);
        Ok(self)
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

    /// Frequency the cycle was built for.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Shape shared by every entry.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Value for a phase, if present.
    pub fn get(&self, phase: CyclePhase) -> Option<&ArrayD<f64>> {
        self.entries.get(&phase)
    }

    /// Phases present, in calendar order.
    pub fn phases(&self) -> impl Iterator<Item = CyclePhase> + '_ {
        self.entries.keys().copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cycle has no entries. Constructors never produce one.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grid of a gridded cycle.
    pub fn grid(&self) -> Option<&LatLonGrid> {
        self.grid.as_ref()
    }

    /// Variable name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Physical unit, if any.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    fn from_entries(
        frequency: Frequency,
        entries: BTreeMap<CyclePhase, ArrayD<f64>>,
    ) -> Result<Self, SeasonalError> {
        let shape = match entries.values().next() {
            Some(first) => first.shape().to_vec(),
            None => return Err(SeasonalError::EmptyCycle),
        };
        for (phase, value) in &entries {
            if value.shape() != shape.as_slice() {
                return Err(SeasonalError::ShapeMismatch {
                    what: phase.to_string(),
                    expected: shape,
                    got: value.shape().to_vec(),
                });
            }
        }
        Ok(Self {
            frequency,
            entries,
            shape,
            grid: None,
            name: None,
            units: None,
        })
    }

    /// Zero-length array with this cycle's entry shape behind a time axis.
    pub(crate) fn empty_projection(&self) -> ArrayD<f64> {
        let mut shape = Vec::with_capacity(self.shape.len() + 1);
        shape.push(0);
        shape.extend_from_slice(&self.shape);
        ArrayD::zeros(IxDyn(&shape))
    }
}

/// Time-step indices grouped by cycle phase.
fn phase_groups(times: &[NaiveDate], frequency: Frequency) -> BTreeMap<CyclePhase, Vec<usize>> {
    let mut groups: BTreeMap<CyclePhase, Vec<usize>> = BTreeMap::new();
    for (t, &time) in times.iter().enumerate() {
        groups
            .entry(CyclePhase::of(time, frequency))
            .or_default()
            .push(t);
    }
    groups
}

//! # diagon-seasonal
//!
//! Expands a climatological cycle (monthly or annual means, scalar or
//! gridded) into a concrete time axis covering any date range, optionally
//! shifting the range by half a period before laying out the axis.
//!
//! ```text
//! TimeSeries / GriddedField ──from_series / from_field──▶ ClimatologicalCycle
//!                                                             │
//! ProjectionConfig ──SeasonalCycleProjector::new──▶ projector ─┤ project
//!                                                             ▼
//!                                      ProjectedCycle ──▶ to_series / to_field
//! ```
//!
//! An empty date range is not an error: it yields a zero-length projection
//! that keeps the cycle's entry shape.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `cycle` | `ClimatologicalCycle` and `CyclePhase` |
//! | `projector` | `ProjectionConfig`, `SeasonalCycleProjector`, `ProjectedCycle` |
//! | `error` | Error types |

mod cycle;
mod error;
mod projector;

pub use diagon_calendar::{center_timestamp, center_timestamp_str};

pub use cycle::{ClimatologicalCycle, CyclePhase};
pub use error::SeasonalError;
pub use projector::{ProjectedCycle, ProjectionConfig, SeasonalCycleProjector, project};

//! # diagon-grid
//!
//! In-memory data model shared by the diagnostics: scalar time series,
//! regular latitude/longitude grids, gridded `(time, lat, lon)` fields and
//! rectangular regions, plus the reductions every diagnostic needs
//! (region selection, area-weighted field mean, monthly anomalies, month and
//! date sub-selection, time resampling).
//!
//! All operations are pure: they return new values and never mutate their
//! inputs.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `series` | `TimeSeries` with strictly increasing timestamps |
//! | `grid` | `LatLonGrid` and spherical cell areas |
//! | `region` | `RegionSpec` bounding boxes with longitude wrap-around |
//! | `field` | `GriddedField` and its reductions |
//! | `anomaly` | Monthly-climatology anomaly helper |
//! | `error` | Error types |

mod anomaly;
mod error;
mod field;
mod grid;
mod region;
mod series;

pub use anomaly::monthly_anomalies;
pub use error::GridError;
pub use field::GriddedField;
pub use grid::{EARTH_RADIUS_M, LatLonGrid};
pub use region::RegionSpec;
pub use series::TimeSeries;

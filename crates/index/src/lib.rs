//! # diagon-index
//!
//! Regional climate indices (such as the Atlantic Multidecadal Oscillation)
//! and the statistics built on them:
//!
//! 1. [`compute_index`]: area-weighted regional mean of monthly anomalies,
//!    optionally detrended by a background signal
//! 2. [`smooth_index`]: centered multi-year rolling mean
//! 3. [`regression_and_correlation`]: per-cell regression slope and Pearson
//!    correlation of a field on the index, for one season
//!
//! Every operation is a pure function of its inputs. Absent optional inputs
//! (a reference dataset that could not be read) produce `Ok(None)` rather
//! than an error.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `index` | Index computation and detrending |
//! | `smooth` | Rolling-mean smoothing |
//! | `regression` | Regression and correlation maps |
//! | `config` | `IndexConfig` |
//! | `error` | Error types |

mod config;
mod error;
mod index;
mod regression;
mod smooth;

pub use config::IndexConfig;
pub use error::IndexError;
pub use index::{compute_index, detrend_index, regional_anomaly_mean};
pub use regression::{RegressionMaps, regression_and_correlation};
pub use smooth::{DEFAULT_FILTERED_NAME, smooth_index};

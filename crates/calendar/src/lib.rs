//! # diagon-calendar
//!
//! Calendar arithmetic shared by the diagnostics: aggregation frequencies,
//! season codes, period-start grids and date-window helpers. All dates are
//! proleptic Gregorian [`chrono::NaiveDate`] values.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["&str"] -->|"Frequency::from_str()"| B["Frequency"]
//!     A -->|"Season::from_str()"| C["Season"]
//!     A -->|"parse_date()"| D["NaiveDate"]
//!     D -->|"center_timestamp()"| D
//!     D -->|"period_starts()"| E["Vec of NaiveDate"]
//!     D -->|"retrieval_window()"| F["(Option, Option)"]
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use diagon_calendar::{Frequency, center_timestamp, parse_date, period_starts};
//!
//! let start = parse_date("2020-01-01")?;
//! let end = parse_date("2020-03-01")?;
//! let grid = period_starts(start, end, Frequency::Monthly);
//! assert_eq!(grid.len(), 3);
//!
//! let mid = center_timestamp(start, Frequency::Monthly)?; // 2020-01-16
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `frequency` | Monthly/annual frequency and timestamp centering |
//! | `season` | Season codes and month membership |
//! | `sequence` | Period-start grids |
//! | `date` | Date parsing, ranges and retrieval windows |
//! | `error` | Error types |

mod date;
mod error;
mod frequency;
mod season;
mod sequence;

pub use date::{DateRange, parse_date, retrieval_window};
pub use error::CalendarError;
pub use frequency::{Frequency, center_timestamp, center_timestamp_str};
pub use season::Season;
pub use sequence::period_starts;

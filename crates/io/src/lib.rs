//! # diagon-io
//!
//! Read gridded climate fields from NetCDF files and write diagnostic
//! output (index series, fields, regression maps) back to NetCDF.
//! Bridges CF-convention files into the `diagon-grid` data model.

mod error;
mod netcdf_read;
mod reader;
mod writer;

pub use error::IoError;
pub use reader::{DataReader, NetcdfReader, ReaderConfig};
pub use writer::{TIME_CALENDAR, TIME_UNITS, WriterConfig, write_field, write_maps, write_series};

//! Low-pass filtering of index series.

use diagon_grid::TimeSeries;

use crate::error::IndexError;

/// Name given to a smoothed index whose input has no name.
pub const DEFAULT_FILTERED_NAME: &str = "index_filtered";

/// Centered rolling mean over `window_years * 12` monthly steps.
///
/// Edge points use partial windows as long as they hold at least
/// `max(1, window / 2)` finite values, so the output has exactly as many
/// steps as the input. The result is named `"{name}_filtered"`.
///
/// # Errors
///
/// Returns [`IndexError::InvalidWindow`] if `window_years` is zero.
pub fn smooth_index(index: &TimeSeries, window_years: usize) -> Result<TimeSeries, IndexError> {
    if window_years == 0 {
        return Err(IndexError::InvalidWindow { window_years });
    }
    let window = window_years * 12;
    let min_periods = (window / 2).max(1);
    let smoothed = diagon_stats::rolling_mean_centered(index.values(), window, min_periods);

    let name = match index.name() {
        Some(name) => format!("{name}_filtered"),
        None => DEFAULT_FILTERED_NAME.to_string(),
    };
    Ok(index.with_values(smoothed)?.renamed(name))
}

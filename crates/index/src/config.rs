//! Index diagnostic configuration.

use diagon_calendar::Season;
use diagon_grid::RegionSpec;

use crate::error::IndexError;

/// Configuration of a regional index diagnostic.
///
/// Defaults describe the Atlantic Multidecadal Oscillation: mean SST
/// anomaly over the North Atlantic (0-60N, 80W-0), detrended by the
/// 60S-60N mean, unsmoothed, with maps for the annual cycle and the four
/// meteorological seasons.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    region: RegionSpec,
    detrend: bool,
    detrend_region: RegionSpec,
    smooth: bool,
    window_years: usize,
    seasons: Vec<Season>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            region: RegionSpec::new(0.0, 60.0, -80.0, 0.0)
                .map(|r| r.with_name("north_atlantic"))
                .unwrap_or_else(|_| RegionSpec::global()),
            detrend: true,
            detrend_region: RegionSpec::new(-60.0, 60.0, 0.0, 360.0)
                .map(|r| r.with_name("near_global"))
                .unwrap_or_else(|_| RegionSpec::global()),
            smooth: false,
            window_years: 10,
            seasons: Season::STANDARD.to_vec(),
        }
    }
}

impl IndexConfig {
    /// Creates a configuration for `region` with default settings otherwise.
    pub fn new(region: RegionSpec) -> Self {
        Self {
            region,
            ..Self::default()
        }
    }

    /// Enable or disable detrending.
    pub fn with_detrend(mut self, detrend: bool) -> Self {
        self.detrend = detrend;
        self
    }

    /// Region whose mean anomaly is subtracted when detrending.
    pub fn with_detrend_region(mut self, region: RegionSpec) -> Self {
        self.detrend_region = region;
        self
    }

    /// Enable smoothing with a window of `window_years`.
    pub fn with_smoothing(mut self, window_years: usize) -> Self {
        self.smooth = true;
        self.window_years = window_years;
        self
    }

    /// Seasons for which regression maps are computed.
    pub fn with_seasons(mut self, seasons: Vec<Season>) -> Self {
        self.seasons = seasons;
        self
    }

    /// Index region.
    pub fn region(&self) -> &RegionSpec {
        &self.region
    }

    /// Whether the index is detrended.
    pub fn detrend(&self) -> bool {
        self.detrend
    }

    /// Detrending region.
    pub fn detrend_region(&self) -> &RegionSpec {
        &self.detrend_region
    }

    /// Whether a smoothed index is produced.
    pub fn smooth(&self) -> bool {
        self.smooth
    }

    /// Smoothing window in years.
    pub fn window_years(&self) -> usize {
        self.window_years
    }

    /// Seasons for regression maps.
    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    /// Check the configuration once, before any data is read.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidWindow`] if smoothing is enabled with a
    /// zero window and [`IndexError::InvalidConfig`] if no season is set or
    /// a season appears twice.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.smooth && self.window_years == 0 {
            return Err(IndexError::InvalidWindow {
                window_years: self.window_years,
            });
        }
        if self.seasons.is_empty() {
            return Err(IndexError::InvalidConfig {
                reason: "at least one season is required".into(),
            });
        }
        for (i, season) in self.seasons.iter().enumerate() {
            if self.seasons[..i].contains(season) {
                return Err(IndexError::InvalidConfig {
                    reason: format!("season {season} listed twice"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = IndexConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.region().name(), Some("north_atlantic"));
        assert_eq!(config.region().lon_min(), -80.0);
        assert!(config.detrend());
        assert!(!config.smooth());
        assert_eq!(config.seasons().len(), 5);
    }

    #[test]
    fn zero_window_rejected_only_when_smoothing() {
        let config = IndexConfig::default().with_smoothing(0);
        assert_eq!(
            config.validate().unwrap_err(),
            IndexError::InvalidWindow { window_years: 0 }
        );
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn seasons_must_be_unique_and_present() {
        let empty = IndexConfig::default().with_seasons(vec![]);
        assert!(matches!(empty.validate(), Err(IndexError::InvalidConfig { .. })));

        let dup = IndexConfig::default().with_seasons(vec![Season::Djf, Season::Djf]);
        assert!(matches!(dup.validate(), Err(IndexError::InvalidConfig { .. })));
    }

    #[test]
    fn builders() {
        let region = RegionSpec::new(-5.0, 5.0, 190.0, 240.0).unwrap();
        let config = IndexConfig::new(region.clone())
            .with_detrend(false)
            .with_smoothing(5)
            .with_seasons(vec![Season::Jja]);
        assert_eq!(config.region(), &region);
        assert!(!config.detrend());
        assert_eq!(config.window_years(), 5);
        assert_eq!(config.seasons(), &[Season::Jja]);
    }
}

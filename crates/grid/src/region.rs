//! Rectangular latitude/longitude regions.

use std::fmt;

use crate::error::GridError;

/// A latitude/longitude bounding box.
///
/// Latitude bounds are inclusive and may be given in either order.
/// Longitudes are compared modulo 360°, so `[-80, 0]` selects the same cells
/// on a `0..360` grid as on a `-180..180` grid, and a box with
/// `lon_min > lon_max` wraps across the 0°/360° meridian. A span of 360° or
/// more selects every longitude.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSpec {
    name: Option<String>,
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
}

impl RegionSpec {
    /// Creates a new region.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidRegion`] if a bound is not finite or a
    /// latitude lies outside `[-90, 90]`.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Result<Self, GridError> {
        let bounds = [lat_min, lat_max, lon_min, lon_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(GridError::InvalidRegion {
                reason: format!("non-finite bound in {bounds:?}"),
            });
        }
        for lat in [lat_min, lat_max] {
            if lat.abs() > 90.0 {
                return Err(GridError::InvalidRegion {
                    reason: format!("latitude {lat} outside [-90, 90]"),
                });
            }
        }
        Ok(Self {
            name: None,
            lat_min: lat_min.min(lat_max),
            lat_max: lat_min.max(lat_max),
            lon_min,
            lon_max,
        })
    }

    /// The whole globe.
    pub fn global() -> Self {
        Self {
            name: Some("global".into()),
            lat_min: -90.0,
            lat_max: 90.0,
            lon_min: 0.0,
            lon_max: 360.0,
        }
    }

    /// Sets a human-readable name used in logs and file names.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Region name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Southern bound.
    pub fn lat_min(&self) -> f64 {
        self.lat_min
    }

    /// Northern bound.
    pub fn lat_max(&self) -> f64 {
        self.lat_max
    }

    /// Western bound.
    pub fn lon_min(&self) -> f64 {
        self.lon_min
    }

    /// Eastern bound.
    pub fn lon_max(&self) -> f64 {
        self.lon_max
    }

    /// Whether latitude `lat` is inside the box.
    pub fn contains_lat(&self, lat: f64) -> bool {
        self.lat_min <= lat && lat <= self.lat_max
    }

    /// Whether longitude `lon` is inside the box (modulo 360°).
    pub fn contains_lon(&self, lon: f64) -> bool {
        let span = self.lon_max - self.lon_min;
        if span >= 360.0 {
            return true;
        }
        let width = span.rem_euclid(360.0);
        (lon - self.lon_min).rem_euclid(360.0) <= width
    }

    /// Indices of `lats` inside the box.
    pub fn lat_indices(&self, lats: &[f64]) -> Vec<usize> {
        (0..lats.len()).filter(|&j| self.contains_lat(lats[j])).collect()
    }

    /// Indices of `lons` inside the box.
    pub fn lon_indices(&self, lons: &[f64]) -> Vec<usize> {
        (0..lons.len()).filter(|&i| self.contains_lon(lons[i])).collect()
    }
}

impl fmt::Display for RegionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "'{name}' ")?;
        }
        write!(
            f,
            "[lat {}..{}, lon {}..{}]",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_latitudes() {
        let r = RegionSpec::new(60.0, 0.0, -80.0, 0.0).unwrap();
        assert_eq!(r.lat_min(), 0.0);
        assert_eq!(r.lat_max(), 60.0);
    }

    #[test]
    fn new_rejects_invalid() {
        assert!(RegionSpec::new(-91.0, 0.0, 0.0, 10.0).is_err());
        assert!(RegionSpec::new(0.0, 10.0, f64::NAN, 10.0).is_err());
    }

    #[test]
    fn negative_box_on_positive_grid() {
        let r = RegionSpec::new(0.0, 60.0, -80.0, 0.0).unwrap();
        assert!(r.contains_lon(280.0));
        assert!(r.contains_lon(359.5));
        assert!(r.contains_lon(0.0));
        assert!(r.contains_lon(-40.0));
        assert!(!r.contains_lon(10.0));
        assert!(!r.contains_lon(270.0));
    }

    #[test]
    fn wrapping_box() {
        let r = RegionSpec::new(-10.0, 10.0, 350.0, 10.0).unwrap();
        assert!(r.contains_lon(355.0));
        assert!(r.contains_lon(5.0));
        assert!(r.contains_lon(-5.0));
        assert!(!r.contains_lon(180.0));
    }

    #[test]
    fn global_contains_everything() {
        let r = RegionSpec::global();
        for lon in [-180.0, 0.0, 90.0, 359.9, 720.0] {
            assert!(r.contains_lon(lon));
        }
        assert!(r.contains_lat(-90.0));
        assert!(r.contains_lat(90.0));
    }

    #[test]
    fn index_selection() {
        let r = RegionSpec::new(-5.0, 5.0, 0.0, 20.0).unwrap();
        assert_eq!(r.lat_indices(&[-10.0, -5.0, 0.0, 5.0, 10.0]), vec![1, 2, 3]);
        assert_eq!(r.lon_indices(&[0.0, 10.0, 20.0, 30.0]), vec![0, 1, 2]);
    }

    #[test]
    fn display_includes_name() {
        let r = RegionSpec::new(0.0, 60.0, -80.0, 0.0).unwrap().with_name("amo");
        assert_eq!(r.to_string(), "'amo' [lat 0..60, lon -80..0]");
    }
}

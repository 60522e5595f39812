//! Regular latitude/longitude grid and cell areas.

use ndarray::Array2;

use crate::error::GridError;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A rectilinear grid described by 1-D latitude and longitude axes (degrees).
///
/// Latitudes may be ascending or descending. Data laid out on this grid is
/// indexed `[lat, lon]`.
///
/// Cell edges are fixed when the grid is built and travel with
/// [`LatLonGrid::subset`], so a sub-grid keeps the cell areas of its
/// parent even when its longitudes are not contiguous (a region that
/// crosses the 0°/360° seam).
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGrid {
    lats: Vec<f64>,
    lons: Vec<f64>,
    /// `(lower, upper)` latitude edges, clamped to ±90°.
    lat_bounds: Vec<(f64, f64)>,
    /// Longitude cell widths in radians.
    lon_widths: Vec<f64>,
}

impl LatLonGrid {
    /// Creates a new grid after validating latitude bounds.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidRegion`] if any latitude lies outside
    /// `[-90, 90]` or any coordinate is not finite.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>) -> Result<Self, GridError> {
        if let Some(bad) = lats.iter().find(|l| !l.is_finite() || l.abs() > 90.0) {
            return Err(GridError::InvalidRegion {
                reason: format!("latitude {bad} outside [-90, 90]"),
            });
        }
        if let Some(bad) = lons.iter().find(|l| !l.is_finite()) {
            return Err(GridError::InvalidRegion {
                reason: format!("longitude {bad} is not finite"),
            });
        }
        let lat_bounds = cell_bounds(&lats)
            .into_iter()
            .map(|(lo, hi)| (lo.clamp(-90.0, 90.0), hi.clamp(-90.0, 90.0)))
            .collect();
        let lon_widths = cell_bounds(&lons)
            .into_iter()
            .map(|(lo, hi)| (hi - lo).abs().min(360.0).to_radians())
            .collect();
        Ok(Self {
            lats,
            lons,
            lat_bounds,
            lon_widths,
        })
    }

    /// Latitude axis.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Longitude axis.
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Number of latitudes.
    pub fn ny(&self) -> usize {
        self.lats.len()
    }

    /// Number of longitudes.
    pub fn nx(&self) -> usize {
        self.lons.len()
    }

    /// Sub-grid made of the given latitude and longitude indices.
    ///
    /// The selected cells keep the edges they had on this grid.
    pub fn subset(&self, lat_idx: &[usize], lon_idx: &[usize]) -> Self {
        Self {
            lats: lat_idx.iter().map(|&j| self.lats[j]).collect(),
            lons: lon_idx.iter().map(|&i| self.lons[i]).collect(),
            lat_bounds: lat_idx.iter().map(|&j| self.lat_bounds[j]).collect(),
            lon_widths: lon_idx.iter().map(|&i| self.lon_widths[i]).collect(),
        }
    }

    /// Surface area of every cell in m², shape `(ny, nx)`.
    ///
    /// Cell edges sit halfway between neighbouring coordinates of the grid
    /// passed to [`LatLonGrid::new`] (extrapolated by half a spacing at the
    /// axis ends, latitudes clamped to ±90°), and the area of a cell is
    /// `R² · Δλ · |sin φ₂ − sin φ₁|`. A single-point axis gets a 1° wide
    /// cell.
    pub fn cell_areas(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.ny(), self.nx()), |(j, i)| {
            let (lo, hi) = self.lat_bounds[j];
            let band = (hi.to_radians().sin() - lo.to_radians().sin()).abs();
            EARTH_RADIUS_M * EARTH_RADIUS_M * self.lon_widths[i] * band
        })
    }
}

/// Edges `(lower, upper)` of each cell along a 1-D coordinate axis.
fn cell_bounds(coords: &[f64]) -> Vec<(f64, f64)> {
    let n = coords.len();
    match n {
        0 => Vec::new(),
        1 => vec![(coords[0] - 0.5, coords[0] + 0.5)],
        _ => (0..n)
            .map(|k| {
                let lower = if k == 0 {
                    coords[0] - (coords[1] - coords[0]) / 2.0
                } else {
                    (coords[k - 1] + coords[k]) / 2.0
                };
                let upper = if k == n - 1 {
                    coords[n - 1] + (coords[n - 1] - coords[n - 2]) / 2.0
                } else {
                    (coords[k] + coords[k + 1]) / 2.0
                };
                (lower, upper)
            })
            .collect(),
    }
}

use serde::{Deserialize, Serialize};

use crate::foundation::error::{PosterError, PosterResult};

/// Meters per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_000.0;

/// A WGS84 coordinate pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Create a validated point with `-90 <= lat <= 90`, `-180 <= lon <= 180`.
    pub fn new(lat: f64, lon: f64) -> PosterResult<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(PosterError::validation(format!(
                "latitude {lat} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(PosterError::validation(format!(
                "longitude {lon} out of range [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }
}

/// Rectangular geographic extent in degrees.
///
/// Invariant: `north > south`, `east > west`. The invariant breaks silently
/// near the antimeridian; behavior there is unspecified and preserved as-is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BBox {
    /// Frame `point` with a box of `radius_m` half-width whose latitude span
    /// is stretched by `aspect` (= canvas height/width).
    ///
    /// Uses the standard small-angle approximation: one degree of longitude
    /// shrinks with `cos(lat)`. Deliberately under-corrects near the poles
    /// (a larger displayed box) and is not clamped as `cos(lat) -> 0`.
    /// Radius 0 yields a degenerate box equal to the point.
    pub fn around(point: GeoPoint, radius_m: f64, aspect: f64) -> Self {
        let lon_delta = radius_m / (METERS_PER_DEGREE * point.lat.to_radians().cos());
        let lat_delta = radius_m * aspect / METERS_PER_DEGREE;

        Self {
            west: point.lon - lon_delta,
            south: point.lat - lat_delta,
            east: point.lon + lon_delta,
            north: point.lat + lat_delta,
        }
    }

    pub fn width_deg(&self) -> f64 {
        self.east - self.west
    }

    pub fn height_deg(&self) -> f64 {
        self.north - self.south
    }
}

/// Equirectangular projection about a fixed center, in meters.
///
/// Stands in for a full UTM projection: at city-poster extents the
/// difference is well below one output pixel, and it keeps the plotted
/// scale equal in both axes.
#[derive(Clone, Copy, Debug)]
pub struct LocalProjection {
    center: GeoPoint,
    meters_per_lon_degree: f64,
}

impl LocalProjection {
    pub fn new(center: GeoPoint) -> Self {
        Self {
            center,
            meters_per_lon_degree: METERS_PER_DEGREE * center.lat.to_radians().cos(),
        }
    }

    /// Project a point to (x, y) meters east/north of the center.
    pub fn project(&self, p: GeoPoint) -> kurbo::Point {
        kurbo::Point::new(
            (p.lon - self.center.lon) * self.meters_per_lon_degree,
            (p.lat - self.center.lat) * METERS_PER_DEGREE,
        )
    }
}

//! Geodesic helpers: bounding boxes around a point, tiling and box dimensions.
//!
//! Boxes are built with the WGS84 earth radius at the center latitude. The result
//! approximates a square of side `2 * range` and degrades near the poles, which is
//! fine for the supported ranges (up to 1000 km).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::models::GeoPoint;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// WGS84 major semiaxis [m]
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 minor semiaxis [m]
const WGS84_B: f64 = 6_356_752.3;

pub fn is_valid_latitude(lat: f64) -> bool {
    (MIN_LATITUDE..=MAX_LATITUDE).contains(&lat)
}

pub fn is_valid_longitude(lon: f64) -> bool {
    (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon)
}

/// Axis-aligned box in degrees: [lat_min, lon_min, lat_max, lon_max]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn new(lat_min: f64, lon_min: f64, lat_max: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lon_min,
            lat_max,
            lon_max,
        }
    }

    /// Latitude span in degrees
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Longitude span in degrees
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.lat_min..=self.lat_max).contains(&point.lat)
            && (self.lon_min..=self.lon_max).contains(&point.lon)
    }

    /// Overpass bbox filter text: "south,west,north,east"
    pub fn to_overpass(&self) -> String {
        format!(
            "{},{},{},{}",
            self.lat_min, self.lon_min, self.lat_max, self.lon_max
        )
    }
}

/// Earth radius [m] at a latitude given in radians
fn wgs84_earth_radius(lat: f64) -> f64 {
    let an = WGS84_A * WGS84_A * lat.cos();
    let bn = WGS84_B * WGS84_B * lat.sin();
    let ad = WGS84_A * lat.cos();
    let bd = WGS84_B * lat.sin();

    ((an * an + bn * bn) / (ad * ad + bd * bd)).sqrt()
}

/// Build a box reaching `range_meters` from `center` in each direction.
///
/// The result is clamped into the valid lat/lon domain.
pub fn create_bounding_box(center: GeoPoint, range_meters: u32) -> BoundingBox {
    let lat = center.lat.to_radians();
    let lon = center.lon.to_radians();
    let half_side = f64::from(range_meters);

    let radius = wgs84_earth_radius(lat);
    // Radius of the parallel (longitude circle) at this latitude
    let pradius = radius * lat.cos();

    let lat_min = lat - half_side / radius;
    let lat_max = lat + half_side / radius;
    let lon_min = lon - half_side / pradius;
    let lon_max = lon + half_side / pradius;

    let clamp_lat = |v: f64| v.to_degrees().clamp(MIN_LATITUDE, MAX_LATITUDE);
    let clamp_lon = |v: f64| v.to_degrees().clamp(MIN_LONGITUDE, MAX_LONGITUDE);

    BoundingBox::new(
        clamp_lat(lat_min),
        clamp_lon(lon_min),
        clamp_lat(lat_max),
        clamp_lon(lon_max),
    )
}

/// Split `[min, max]` into consecutive spans of at most `step`, stepping up from `min`.
///
/// The last span ends exactly at `max`; an empty or NaN range yields one span.
fn split_axis(min: f64, max: f64, step: f64) -> Vec<(f64, f64)> {
    if !(max > min) {
        return vec![(min, max)];
    }

    let mut spans = Vec::new();
    let mut lo = min;
    while max - lo > step {
        let mut hi = lo + step;
        // lo + step can round to an edge more than one step away
        while hi - lo > step {
            hi = hi.next_down();
        }
        if hi <= lo {
            // step is below float resolution at lo
            break;
        }
        spans.push((lo, hi));
        lo = hi;
    }
    spans.push((lo, max));
    spans
}

/// Partition `bbox` into tiles no wider than `max_width` degrees of longitude
/// and no taller than `max_height` degrees of latitude.
///
/// Tiles cover the box exactly; the last tile of each row/column is clamped to the
/// box edge. Non-positive or non-finite maxima, or non-finite box edges, return
/// the box unchanged.
pub fn tile_bounding_box(bbox: &BoundingBox, max_width: f64, max_height: f64) -> Vec<BoundingBox> {
    let valid_step = |s: f64| s.is_finite() && s > 0.0;
    if !valid_step(max_width) || !valid_step(max_height) {
        return vec![*bbox];
    }
    let edges = [bbox.lat_min, bbox.lon_min, bbox.lat_max, bbox.lon_max];
    if !edges.iter().all(|e| e.is_finite()) {
        return vec![*bbox];
    }

    let lat_spans = split_axis(bbox.lat_min, bbox.lat_max, max_height);
    let lon_spans = split_axis(bbox.lon_min, bbox.lon_max, max_width);

    let mut tiles = Vec::with_capacity(lat_spans.len() * lon_spans.len());
    for &(lat_lo, lat_hi) in &lat_spans {
        for &(lon_lo, lon_hi) in &lon_spans {
            tiles.push(BoundingBox::new(lat_lo, lon_lo, lat_hi, lon_hi));
        }
    }
    tiles
}

/// Box around `center` tiled into sub-boxes of at most `max_width` x `max_height` degrees
pub fn create_bounding_boxes(
    center: GeoPoint,
    range_meters: u32,
    max_width: f64,
    max_height: f64,
) -> Vec<BoundingBox> {
    tile_bounding_box(
        &create_bounding_box(center, range_meters),
        max_width,
        max_height,
    )
}

/// Width (longitude distance) and height (latitude distance) of a box in kilometers
pub fn box_dimensions_km(bbox: &BoundingBox) -> (f64, f64) {
    let lat_min = bbox.lat_min.to_radians();
    let lat_max = bbox.lat_max.to_radians();
    let lon_min = bbox.lon_min.to_radians();
    let lon_max = bbox.lon_max.to_radians();

    let lat_mid = (lat_min + lat_max) / 2.0;
    let radius = wgs84_earth_radius(lat_mid);

    let height_meters = radius * (lat_max - lat_min);

    // Normalize to handle wrapping over ±180°
    let mut lon_diff = lon_max - lon_min;
    if lon_diff < 0.0 {
        lon_diff += 2.0 * PI;
    }
    if lon_diff > PI {
        lon_diff = 2.0 * PI - lon_diff;
    }

    let pradius = radius * lat_mid.cos();
    let width_meters = pradius * lon_diff;

    (width_meters / 1000.0, height_meters / 1000.0)
}

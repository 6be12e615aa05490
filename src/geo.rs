//! Geographic helpers for the render pipeline.
//!
//! All coordinates are WGS84 latitude/longitude in degrees, the convention of
//! both the dataset and the mapping widget. Distances are meters.

use geo::{Distance, Haversine, Point};

use crate::Location;

/// Mean equatorial circumference of the Earth in meters, used to relate a
/// bounding-box span to a web-mercator zoom level.
const EARTH_CIRCUMFERENCE_METERS: f64 = 40_075_016.7;

/// Great-circle distance between two locations in meters.
#[inline]
pub fn haversine_distance(a: &Location, b: &Location) -> f64 {
    let p1 = Point::new(a.lon, a.lat);
    let p2 = Point::new(b.lon, b.lat);
    Haversine::distance(p1, p2)
}

/// Bounding box of a set of locations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Compute the bounding box of `records`. Returns `None` for empty input.
    pub fn from_locations(records: &[Location]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lon = f64::MAX;
        let mut max_lon = f64::MIN;

        for r in records {
            min_lat = min_lat.min(r.lat);
            max_lat = max_lat.max(r.lat);
            min_lon = min_lon.min(r.lon);
            max_lon = max_lon.max(r.lon);
        }

        Some(Self { min_lat, max_lat, min_lon, max_lon })
    }

    /// Midpoint of the box as `(lat, lon)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Great-circle length of the box diagonal in meters.
    pub fn diagonal_meters(&self) -> f64 {
        let sw = Location::new("", self.min_lat, self.min_lon, "");
        let ne = Location::new("", self.max_lat, self.max_lon, "");
        haversine_distance(&sw, &ne)
    }
}

/// Arithmetic mean of latitude and longitude as `(lat, lon)`.
///
/// Returns `None` for empty input; the caller decides the fallback center.
/// Simple averaging is adequate at campus scale; datasets crossing the
/// antimeridian would need a spherical mean instead.
pub fn centroid(records: &[Location]) -> Option<(f64, f64)> {
    if records.is_empty() {
        return None;
    }
    let n = records.len() as f64;
    let sum_lat: f64 = records.iter().map(|r| r.lat).sum();
    let sum_lon: f64 = records.iter().map(|r| r.lon).sum();
    Some((sum_lat / n, sum_lon / n))
}

/// Zoom level that fits a bounding box, clamped to `[min_zoom, max_zoom]`.
///
/// Derived from the web-mercator relation: each zoom step halves the ground
/// span the viewport covers. A degenerate box (single point) gets the
/// tightest zoom allowed.
pub fn zoom_for_bounds(bounds: &Bounds, min_zoom: u8, max_zoom: u8) -> u8 {
    let span = bounds.diagonal_meters();
    if span <= 1.0 {
        return max_zoom;
    }
    let zoom = (EARTH_CIRCUMFERENCE_METERS / span).log2().round();
    (zoom.max(0.0) as u8).clamp(min_zoom, max_zoom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_locations;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = Location::new("Rektorat", -5.147665, 119.432731, "Administrasi");
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // Rektorat to Perpustakaan is roughly 110 m
        let dataset = default_locations();
        let dist = haversine_distance(&dataset[0], &dataset[1]);
        assert!(dist > 50.0 && dist < 200.0, "got {dist}");
    }

    #[test]
    fn test_bounds_from_locations() {
        let bounds = Bounds::from_locations(&default_locations()).unwrap();
        assert_eq!(bounds.min_lat, -5.150500);
        assert_eq!(bounds.max_lat, -5.146800);
        assert_eq!(bounds.min_lon, 119.430800);
        assert_eq!(bounds.max_lon, 119.435100);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(Bounds::from_locations(&[]).is_none());
    }

    #[test]
    fn test_centroid_mean() {
        let records = vec![
            Location::new("a", -5.10, 119.40, ""),
            Location::new("b", -5.20, 119.44, ""),
        ];
        let (lat, lon) = centroid(&records).unwrap();
        assert!(approx_eq(lat, -5.15, 1e-9));
        assert!(approx_eq(lon, 119.42, 1e-9));
    }

    #[test]
    fn test_centroid_empty() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_zoom_campus_scale() {
        // The default dataset spans a few hundred meters; the fitted zoom
        // should sit near the tight end of the range.
        let bounds = Bounds::from_locations(&default_locations()).unwrap();
        let zoom = zoom_for_bounds(&bounds, 3, 18);
        assert!(zoom >= 14, "got {zoom}");
    }

    #[test]
    fn test_zoom_single_point_is_tightest() {
        let one = vec![Location::new("a", -5.15, 119.43, "")];
        let bounds = Bounds::from_locations(&one).unwrap();
        assert_eq!(zoom_for_bounds(&bounds, 3, 18), 18);
    }

    #[test]
    fn test_zoom_wide_area_is_looser() {
        // Two campuses on different islands
        let wide = vec![
            Location::new("a", -5.15, 119.43, ""),
            Location::new("b", -6.20, 106.82, ""),
        ];
        let bounds = Bounds::from_locations(&wide).unwrap();
        let zoom = zoom_for_bounds(&bounds, 3, 18);
        assert!(zoom <= 6, "got {zoom}");
    }
}

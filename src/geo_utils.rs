//! # Geographic Utilities
//!
//! Geodesic primitives shared by every stage of the overlap pipeline.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a GPS track in meters |
//! | [`compute_bounds`] | Bounding box of a GPS track |
//! | [`bounds_overlap`] | Check if two bounding boxes overlap |
//! | [`meters_to_degrees`] | Convert meters to approximate degrees at a latitude |
//!
//! ## Example
//!
//! ```rust
//! use track_overlap::{GpsPoint, geo_utils};
//!
//! let track = vec![
//!     GpsPoint::new(51.5074, -0.1278),
//!     GpsPoint::new(51.5080, -0.1290),
//!     GpsPoint::new(51.5090, -0.1300),
//! ];
//!
//! let length = geo_utils::polyline_length(&track);
//! assert!(length > 0.0);
//!
//! let dist = geo_utils::haversine_distance(&track[0], &track[2]);
//! assert!(dist <= length);
//! ```
//!
//! ## Haversine Formula
//!
//! All lengths and distances in this crate come from the haversine formula on
//! a sphere of radius [`EARTH_RADIUS_METERS`]. Polyline lengths, resampling
//! offsets and point-to-segment distances all share this metric, so reported
//! overlap lengths stay consistent with the classification thresholds.

use crate::{Bounds, GpsPoint};

/// Sphere radius used by [`haversine_distance`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters per degree of latitude on the haversine sphere.
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// The intermediate `a` term is clamped to `[0, 1]` before the inverse sine so
/// floating-point overshoot on identical or antipodal points cannot produce NaN.
///
/// # Example
///
/// ```rust
/// use track_overlap::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_500.0).abs() < 1000.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlng = (p2.longitude - p1.longitude).to_radians();

    let half_dlat = (dlat / 2.0).sin();
    let half_dlng = (dlng / 2.0).sin();
    let a = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlng * half_dlng;

    2.0 * EARTH_RADIUS_METERS * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Calculate the total length of a polyline (GPS track) in meters.
///
/// Sums the haversine distance between consecutive points. Empty or single-point
/// tracks return 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Convert meters to approximate degrees of longitude at a given latitude.
///
/// Longitude degrees shrink with cos(latitude); the cosine is floored at 0.1
/// so the result stays bounded near the poles. Because a longitude degree is
/// never longer than a latitude degree, the result is also a safe (never too
/// small) latitude buffer.
#[inline]
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_rad = latitude.to_radians();
    let meters_per_degree = METERS_PER_DEGREE * lat_rad.cos().max(0.1);
    meters / meters_per_degree
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a GPS track.
///
/// For empty input, returns a bounds with MIN/MAX values that will fail any
/// overlap check.
pub fn compute_bounds(points: &[GpsPoint]) -> Bounds {
    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Bounds {
        min_lat,
        max_lat,
        min_lng,
        max_lng,
    }
}

/// Check if two bounding boxes overlap, with a buffer in meters.
///
/// Two tracks whose buffered bounds do not overlap cannot have any point
/// within `buffer_meters` of each other.
pub fn bounds_overlap(a: &Bounds, b: &Bounds, buffer_meters: f64, reference_lat: f64) -> bool {
    let buffer_deg = meters_to_degrees(buffer_meters, reference_lat);

    !(a.max_lat + buffer_deg < b.min_lat
        || b.max_lat + buffer_deg < a.min_lat
        || a.max_lng + buffer_deg < b.min_lng
        || b.max_lng + buffer_deg < a.min_lng)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GpsPoint::new(51.5074, -0.1278);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        let dist = haversine_distance(&london, &paris);
        assert!(approx_eq(dist, 343_500.0, 1000.0));
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(1.0, 0.0);
        assert!(approx_eq(haversine_distance(&a, &b), METERS_PER_DEGREE, 1e-6));
    }

    #[test]
    fn test_haversine_antipodal_is_finite() {
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(0.0, 180.0);
        let dist = haversine_distance(&a, &b);
        assert!(dist.is_finite());
        assert!(approx_eq(dist, std::f64::consts::PI * EARTH_RADIUS_METERS, 1e-3));

        let pole_n = GpsPoint::new(90.0, 0.0);
        let pole_s = GpsPoint::new(-90.0, 0.0);
        assert!(haversine_distance(&pole_n, &pole_s).is_finite());
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = GpsPoint::new(46.5197, 6.6323);
        let b = GpsPoint::new(46.5210, 6.6350);
        assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
    }

    #[test]
    fn test_polyline_length_empty() {
        let empty: Vec<GpsPoint> = vec![];
        assert_eq!(polyline_length(&empty), 0.0);
    }

    #[test]
    fn test_polyline_length_single_point() {
        let single = vec![GpsPoint::new(51.5074, -0.1278)];
        assert_eq!(polyline_length(&single), 0.0);
    }

    #[test]
    fn test_polyline_length_is_sum_of_legs() {
        let track = vec![
            GpsPoint::new(51.5074, -0.1278),
            GpsPoint::new(51.5080, -0.1280),
            GpsPoint::new(51.5090, -0.1290),
        ];
        let expected =
            haversine_distance(&track[0], &track[1]) + haversine_distance(&track[1], &track[2]);
        assert!(approx_eq(polyline_length(&track), expected, 1e-9));
    }

    #[test]
    fn test_compute_bounds() {
        let track = vec![
            GpsPoint::new(51.50, -0.13),
            GpsPoint::new(51.51, -0.12),
            GpsPoint::new(51.505, -0.125),
        ];
        let bounds = compute_bounds(&track);
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);
    }

    #[test]
    fn test_bounds_overlap_with_buffer() {
        let a = Bounds { min_lat: 51.50, max_lat: 51.51, min_lng: -0.13, max_lng: -0.12 };
        let b = Bounds { min_lat: 51.52, max_lat: 51.53, min_lng: -0.11, max_lng: -0.10 };
        assert!(!bounds_overlap(&a, &b, 0.0, 51.5));
        assert!(bounds_overlap(&a, &b, 5000.0, 51.5));
    }

    #[test]
    fn test_meters_to_degrees() {
        let deg = meters_to_degrees(METERS_PER_DEGREE, 0.0);
        assert!(approx_eq(deg, 1.0, 1e-9));

        // At higher latitude, same distance = more degrees
        let deg_45 = meters_to_degrees(METERS_PER_DEGREE, 45.0);
        assert!(deg_45 > 1.0);
    }
}

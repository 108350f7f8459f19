//! # Polyline Metrics
//!
//! A [`Polyline`] is the geometric view of a track's points: a connected path
//! with precomputed cumulative arc-length offsets. It answers the three
//! queries the overlap pipeline needs:
//!
//! - [`Polyline::total_length`] - O(1) after construction
//! - [`Polyline::point_at_distance`] - O(log n) arc-length interpolation
//! - [`Polyline::min_distance_to`] - O(n) nearest distance to any segment
//!
//! ## Point-to-segment distance
//!
//! The nearest point on a segment is found in a local equirectangular frame
//! (longitude scaled by the cosine of the segment's mean latitude), then the
//! distance from the query to that point is measured with
//! [`haversine_distance`], the same metric used for lengths and resampling.
//! At the 20-25 m scale of the overlap thresholds the projection error is
//! far below a meter.

mod index;

pub use index::SegmentIndex;

use geo::{Closest, ClosestPoint, Coord, Line, Point};

use crate::error::{OptionExt, Result};
use crate::geo_utils::haversine_distance;
use crate::{GpsPoint, MIN_TRACK_POINTS};

/// Floor for the longitude scale factor so projections stay finite at the poles.
const MIN_LONGITUDE_SCALE: f64 = 1e-6;

/// Connected path over a borrowed point sequence (at least two points).
#[derive(Debug, Clone)]
pub struct Polyline<'a> {
    points: &'a [GpsPoint],
    /// `offsets[i]` is the arc length from the first point to `points[i]`
    offsets: Vec<f64>,
}

impl<'a> Polyline<'a> {
    /// Build a polyline, failing with `InvalidTrack` for fewer than two points.
    pub fn new(points: &'a [GpsPoint]) -> Result<Self> {
        Self::for_track("polyline", points)
    }

    /// Build a polyline whose errors name the owning track.
    pub fn for_track(track_id: &str, points: &'a [GpsPoint]) -> Result<Self> {
        points
            .get(MIN_TRACK_POINTS - 1)
            .ok_or_invalid_track(track_id, points.len(), MIN_TRACK_POINTS)?;

        let mut offsets = Vec::with_capacity(points.len());
        let mut running = 0.0;
        offsets.push(running);
        for w in points.windows(2) {
            running += haversine_distance(&w[0], &w[1]);
            offsets.push(running);
        }

        Ok(Self { points, offsets })
    }

    pub fn points(&self) -> &'a [GpsPoint] {
        self.points
    }

    /// Cumulative arc-length offset of every vertex.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Total length in meters.
    pub fn total_length(&self) -> f64 {
        self.offsets[self.offsets.len() - 1]
    }

    /// Point at arc-length `distance` from the start.
    ///
    /// `distance` is clamped to `[0, total_length]`. The end of the path
    /// returns the literal last point, never an interpolated approximation.
    /// Latitude, longitude and elevation are blended linearly within the
    /// bracketing segment.
    ///
    /// # Example
    /// ```
    /// use track_overlap::{GpsPoint, Polyline};
    ///
    /// let points = vec![GpsPoint::new(0.0, 0.0), GpsPoint::new(0.001, 0.0)];
    /// let line = Polyline::new(&points).unwrap();
    /// let middle = line.point_at_distance(line.total_length() / 2.0);
    /// assert!((middle.latitude - 0.0005).abs() < 1e-9);
    /// assert_eq!(line.point_at_distance(1e9), points[1]);
    /// ```
    pub fn point_at_distance(&self, distance: f64) -> GpsPoint {
        let total = self.total_length();
        if distance >= total {
            return self.points[self.points.len() - 1];
        }
        if !(distance > 0.0) {
            return self.points[0];
        }

        // First vertex strictly beyond `distance`; exists because distance < total
        let upper = self.offsets.partition_point(|&offset| offset <= distance);
        let seg = upper - 1;
        let start = &self.points[seg];
        let end = &self.points[upper];

        let seg_len = self.offsets[upper] - self.offsets[seg];
        if seg_len <= 0.0 {
            return *start;
        }

        let ratio = (distance - self.offsets[seg]) / seg_len;
        interpolate(start, end, ratio)
    }

    /// Minimum distance in meters from `point` to any segment of the path.
    pub fn min_distance_to(&self, point: &GpsPoint) -> f64 {
        (0..self.segment_count())
            .map(|i| self.segment_distance(point, i))
            .fold(f64::INFINITY, f64::min)
    }

    /// Distance from `point` to segment `index` (between vertices `index` and `index + 1`).
    pub(crate) fn segment_distance(&self, point: &GpsPoint, index: usize) -> f64 {
        point_segment_distance(point, &self.points[index], &self.points[index + 1])
    }
}

/// Linear blend between two points; elevation is blended only when both ends carry it.
fn interpolate(start: &GpsPoint, end: &GpsPoint, ratio: f64) -> GpsPoint {
    let elevation = match (start.elevation, end.elevation) {
        (Some(a), Some(b)) => Some(a + ratio * (b - a)),
        (a, None) => a,
        (None, b) => b,
    };

    GpsPoint {
        latitude: start.latitude + ratio * (end.latitude - start.latitude),
        longitude: start.longitude + ratio * (end.longitude - start.longitude),
        elevation,
    }
}

/// Distance from `point` to the nearest point of the finite segment `start`-`end`.
///
/// A zero-length segment is treated as the shared point itself.
pub(crate) fn point_segment_distance(point: &GpsPoint, start: &GpsPoint, end: &GpsPoint) -> f64 {
    if start.latitude == end.latitude && start.longitude == end.longitude {
        return haversine_distance(point, start);
    }

    let mean_lat = (start.latitude + end.latitude) / 2.0;
    let scale = mean_lat.to_radians().cos().max(MIN_LONGITUDE_SCALE);
    let project = |p: &GpsPoint| Coord {
        x: p.longitude * scale,
        y: p.latitude,
    };

    let line = Line::new(project(start), project(end));
    let nearest = match line.closest_point(&Point::from(project(point))) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => p,
        Closest::Indeterminate => {
            return haversine_distance(point, start).min(haversine_distance(point, end));
        }
    };

    let on_segment = GpsPoint::new(nearest.y(), nearest.x() / scale);
    haversine_distance(point, &on_segment)
}

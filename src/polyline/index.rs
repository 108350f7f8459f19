//! R-tree over polyline segments for fast nearest-distance queries.

use rstar::{RTree, RTreeObject, AABB};

use super::Polyline;
use crate::geo_utils::METERS_PER_DEGREE;
use crate::GpsPoint;

/// Envelope buffers are inflated by this factor so the degree box always
/// contains every point within the search radius of the segment.
const BUFFER_SAFETY: f64 = 1.5;

/// Below this cosine the longitude buffer covers the whole globe.
const POLAR_COS_LIMIT: f64 = 1e-6;

/// A polyline segment with its search envelope (lng/lat degrees).
#[derive(Debug, Clone)]
struct IndexedSegment {
    idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index answering [`Polyline::min_distance_to`] without scanning
/// every segment.
///
/// Each segment's bounding box is expanded by `radius` meters. A query
/// evaluates only segments whose expanded box contains the point; if none of
/// them is within `radius`, the true minimum is farther than `radius` and the
/// full linear scan is used instead, so results always equal the scan's.
///
/// # Example
/// ```
/// use track_overlap::{GpsPoint, Polyline, SegmentIndex};
///
/// let points: Vec<GpsPoint> = (0..50)
///     .map(|i| GpsPoint::new(46.0 + i as f64 * 0.0005, 7.0))
///     .collect();
/// let line = Polyline::new(&points).unwrap();
/// let index = SegmentIndex::build(&line, 25.0);
///
/// let query = GpsPoint::new(46.0101, 7.0001);
/// assert_eq!(index.min_distance_to(&query), line.min_distance_to(&query));
/// ```
pub struct SegmentIndex<'a> {
    polyline: &'a Polyline<'a>,
    tree: RTree<IndexedSegment>,
    radius: f64,
}

impl<'a> SegmentIndex<'a> {
    /// Bulk-load the index with every segment of `polyline`.
    pub fn build(polyline: &'a Polyline<'a>, radius: f64) -> Self {
        let segments: Vec<IndexedSegment> = polyline
            .points()
            .windows(2)
            .enumerate()
            .map(|(idx, w)| IndexedSegment {
                idx,
                envelope: search_envelope(&w[0], &w[1], radius),
            })
            .collect();

        Self {
            polyline,
            tree: RTree::bulk_load(segments),
            radius,
        }
    }

    /// Search radius in meters the envelopes were built with.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Segment indices whose expanded envelope contains `point`.
    pub fn candidates(&self, point: &GpsPoint) -> Vec<usize> {
        let query = AABB::from_point([point.longitude, point.latitude]);
        let mut found: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|seg| seg.idx)
            .collect();
        found.sort_unstable();
        found
    }

    /// Minimum distance in meters from `point` to the indexed polyline.
    pub fn min_distance_to(&self, point: &GpsPoint) -> f64 {
        let query = AABB::from_point([point.longitude, point.latitude]);
        let nearby = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|seg| self.polyline.segment_distance(point, seg.idx))
            .fold(f64::INFINITY, f64::min);

        if nearby <= self.radius {
            nearby
        } else {
            self.polyline.min_distance_to(point)
        }
    }
}

/// Bounding box of a segment grown by `radius` meters in every direction.
fn search_envelope(start: &GpsPoint, end: &GpsPoint, radius: f64) -> AABB<[f64; 2]> {
    let lat_buffer = radius * BUFFER_SAFETY / METERS_PER_DEGREE;

    let min_lat = start.latitude.min(end.latitude) - lat_buffer;
    let max_lat = start.latitude.max(end.latitude) + lat_buffer;

    // Longitude degrees are shortest at the most poleward latitude reached
    let widest_lat = min_lat.abs().max(max_lat.abs()).min(90.0);
    let cos = widest_lat.to_radians().cos();
    let lng_buffer = if cos <= POLAR_COS_LIMIT {
        360.0
    } else {
        radius * BUFFER_SAFETY / (METERS_PER_DEGREE * cos)
    };

    AABB::from_corners(
        [start.longitude.min(end.longitude) - lng_buffer, min_lat],
        [start.longitude.max(end.longitude) + lng_buffer, max_lat],
    )
}

//! # Track Comparison
//!
//! Entry point of the overlap engine.
//!
//! ## Algorithm
//! 1. Validate the configuration
//! 2. Pick the shorter track as the probe, the longer as the reference
//! 3. Resample the probe every `resample_step` meters
//! 4. Measure each sample's minimum distance to the reference polyline
//!    (in parallel with the `parallel` feature)
//! 5. Classify the distance stream with hysteresis into overlap segments
//! 6. Sum segment lengths and derive each track's unique distance
//!
//! Resampling the shorter track keeps the `samples x reference points` cost
//! proportional to the smaller input. Finding no overlap is a normal, empty
//! result.

use std::cmp::Ordering;

use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::classify::{ClassifiedSample, OverlapClassifier, OverlapSegment};
use crate::error::Result;
use crate::geo_utils::{bounds_overlap, compute_bounds};
use crate::polyline::{Polyline, SegmentIndex};
use crate::resample::{resample, Sample};
use crate::{GpsPoint, OverlapConfig, Track, TrackRole};

/// Overlap beyond the shorter track length (meters) that is attributed to
/// interpolation error rather than logged as suspicious.
const LENGTH_TOLERANCE: f64 = 1.0;

/// Outcome of comparing two tracks.
///
/// Holds the compared tracks by reference; a new comparison produces a new
/// result rather than updating this one.
#[derive(Debug, Clone)]
pub struct OverlapResult<'a> {
    pub track_a: &'a Track,
    pub track_b: &'a Track,
    /// Which track was resampled; segments lie along this track
    pub probe: TrackRole,
    /// Overlap segments in probe traversal order
    pub segments: Vec<OverlapSegment>,
    /// Every probe sample with its distance and classification
    pub samples: Vec<ClassifiedSample>,
    /// Total overlap length (meters)
    pub overlap_length: f64,
    /// Track A length not shared with B (meters)
    pub unique_a: f64,
    /// Track B length not shared with A (meters)
    pub unique_b: f64,
}

impl<'a> OverlapResult<'a> {
    pub fn track(&self, role: TrackRole) -> &'a Track {
        match role {
            TrackRole::A => self.track_a,
            TrackRole::B => self.track_b,
        }
    }

    pub fn probe_track(&self) -> &'a Track {
        self.track(self.probe)
    }

    pub fn reference_track(&self) -> &'a Track {
        self.track(self.probe.other())
    }

    pub fn unique_distance(&self, role: TrackRole) -> f64 {
        match role {
            TrackRole::A => self.unique_a,
            TrackRole::B => self.unique_b,
        }
    }

    /// True when no overlap segment was found.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Share of a track's length that overlaps the other track, in percent (0-100).
    pub fn overlap_percentage(&self, role: TrackRole) -> f64 {
        let length = self.track(role).length();
        if length <= 0.0 {
            return 0.0;
        }
        (self.overlap_length / length * 100.0).min(100.0)
    }

    /// Owned, serializable view for presentation layers and FFI.
    pub fn summary(&self) -> OverlapSummary {
        OverlapSummary {
            track_a_id: self.track_a.id().to_string(),
            track_a_name: self.track_a.name().to_string(),
            track_a_length: self.track_a.length(),
            track_b_id: self.track_b.id().to_string(),
            track_b_name: self.track_b.name().to_string(),
            track_b_length: self.track_b.length(),
            probe: self.probe,
            overlap_length: self.overlap_length,
            unique_a: self.unique_a,
            unique_b: self.unique_b,
            overlap_percentage_a: self.overlap_percentage(TrackRole::A),
            overlap_percentage_b: self.overlap_percentage(TrackRole::B),
            segments: self.segments.clone(),
        }
    }
}

/// Owned comparison summary: lengths, shared and unique distances, and segment geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct OverlapSummary {
    pub track_a_id: String,
    pub track_a_name: String,
    pub track_a_length: f64,
    pub track_b_id: String,
    pub track_b_name: String,
    pub track_b_length: f64,
    pub probe: TrackRole,
    pub overlap_length: f64,
    pub unique_a: f64,
    pub unique_b: f64,
    pub overlap_percentage_a: f64,
    pub overlap_percentage_b: f64,
    pub segments: Vec<OverlapSegment>,
}

impl OverlapSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Compare two tracks and report their shared and unique distances.
///
/// # Example
/// ```
/// use track_overlap::{compare_tracks, GpsPoint, OverlapConfig, Track};
///
/// let north: Vec<GpsPoint> = (0..10).map(|i| GpsPoint::new(46.0 + i as f64 * 0.001, 7.0)).collect();
/// let far_away: Vec<GpsPoint> = (0..10).map(|i| GpsPoint::new(46.0 + i as f64 * 0.001, 7.01)).collect();
///
/// let a = Track::new("a", "North", north).unwrap();
/// let b = Track::new("b", "Parallel", far_away).unwrap();
///
/// let result = compare_tracks(&a, &b, &OverlapConfig::default()).unwrap();
/// assert!(result.is_empty());
/// assert_eq!(result.overlap_length, 0.0);
/// assert_eq!(result.unique_a, a.length());
/// ```
pub fn compare_tracks<'a>(
    track_a: &'a Track,
    track_b: &'a Track,
    config: &OverlapConfig,
) -> Result<OverlapResult<'a>> {
    config.validate()?;
    let classifier = OverlapClassifier::from_config(config)?;

    let probe = select_probe(track_a, track_b);
    let (probe_track, reference_track) = match probe {
        TrackRole::A => (track_a, track_b),
        TrackRole::B => (track_b, track_a),
    };

    let probe_line = probe_track.polyline()?;
    let reference_line = reference_track.polyline()?;

    let samples = resample(&probe_line, config.resample_step)?;
    debug!(
        "[TrackOverlap] Probe '{}' ({:.0}m, {} samples) vs reference '{}' ({:.0}m, {} points)",
        probe_track.id(),
        probe_line.total_length(),
        samples.len(),
        reference_track.id(),
        reference_line.total_length(),
        reference_line.points().len()
    );

    let distances = sample_distances(&samples, probe_track, &reference_line, config);

    let (classified, segments) = classifier.classify(&samples, &distances);
    let totals = aggregate(&segments, track_a.length(), track_b.length());

    let shorter = track_a.length().min(track_b.length());
    if totals.overlap_length > shorter + LENGTH_TOLERANCE {
        warn!(
            "[TrackOverlap] Overlap {:.1}m exceeds shorter track length {:.1}m; unique distance clamped",
            totals.overlap_length, shorter
        );
    }

    info!(
        "[TrackOverlap] '{}' vs '{}': {} segments, overlap {:.0}m, unique {:.0}m / {:.0}m",
        track_a.id(),
        track_b.id(),
        segments.len(),
        totals.overlap_length,
        totals.unique_a,
        totals.unique_b
    );

    Ok(OverlapResult {
        track_a,
        track_b,
        probe,
        segments,
        samples: classified,
        overlap_length: totals.overlap_length,
        unique_a: totals.unique_a,
        unique_b: totals.unique_b,
    })
}

/// [`compare_tracks`] with the default thresholds (20 m enter, 25 m exit, 10 m step).
pub fn compare_tracks_default<'a>(track_a: &'a Track, track_b: &'a Track) -> Result<OverlapResult<'a>> {
    compare_tracks(track_a, track_b, &OverlapConfig::default())
}

/// The shorter track is the probe. Equal lengths fall back to an ordering of
/// the point sequences so the choice does not depend on argument order.
fn select_probe(track_a: &Track, track_b: &Track) -> TrackRole {
    match track_a.length().partial_cmp(&track_b.length()) {
        Some(Ordering::Less) => TrackRole::A,
        Some(Ordering::Greater) => TrackRole::B,
        _ => match geometric_order(track_a.points(), track_b.points()) {
            Ordering::Greater => TrackRole::B,
            _ => TrackRole::A,
        },
    }
}

fn geometric_order(a: &[GpsPoint], b: &[GpsPoint]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(p, q)| {
            p.latitude
                .total_cmp(&q.latitude)
                .then(p.longitude.total_cmp(&q.longitude))
        })
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Minimum distance from every sample to the reference polyline.
///
/// The segment index is only built when the tracks' bounds come within the
/// exit threshold of each other; otherwise no sample can be near and the
/// plain scan answers every query.
fn sample_distances(
    samples: &[Sample],
    probe_track: &Track,
    reference_line: &Polyline<'_>,
    config: &OverlapConfig,
) -> Vec<f64> {
    let probe_bounds = probe_track.bounds();
    let reference_bounds = compute_bounds(reference_line.points());
    let widest_lat = probe_bounds.max_abs_lat().max(reference_bounds.max_abs_lat());

    let index = if bounds_overlap(&probe_bounds, &reference_bounds, config.exit_threshold, widest_lat) {
        Some(SegmentIndex::build(reference_line, config.exit_threshold))
    } else {
        debug!("[TrackOverlap] Track bounds are disjoint, skipping segment index");
        None
    };

    let distance_to = |sample: &Sample| match &index {
        Some(index) => index.min_distance_to(&sample.point),
        None => reference_line.min_distance_to(&sample.point),
    };

    #[cfg(feature = "parallel")]
    let distances: Vec<f64> = samples.par_iter().map(distance_to).collect();
    #[cfg(not(feature = "parallel"))]
    let distances: Vec<f64> = samples.iter().map(distance_to).collect();

    distances
}

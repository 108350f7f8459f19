//! Overlap length and unique distance totals.

use serde::{Deserialize, Serialize};

use crate::classify::OverlapSegment;

/// The externally consumed numbers of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct OverlapTotals {
    /// Sum of all overlap segment lengths (meters)
    pub overlap_length: f64,
    /// Distance on track A not shared with track B (meters, never negative)
    pub unique_a: f64,
    /// Distance on track B not shared with track A (meters, never negative)
    pub unique_b: f64,
}

/// Total length of all segments; an empty list is `+0.0`.
pub fn overlap_length(segments: &[OverlapSegment]) -> f64 {
    // Float `sum()` starts at -0.0, which would leak into summaries
    segments.iter().fold(0.0, |acc, s| acc + s.length)
}

/// Track length not covered by the overlap, clamped at zero.
///
/// Resampling can make the overlap marginally longer than a track; the
/// clamp keeps the reported unique distance non-negative.
#[inline]
pub fn unique_distance(track_length: f64, overlap_length: f64) -> f64 {
    (track_length - overlap_length).max(0.0)
}

/// Combine segments with the two track lengths.
pub fn aggregate(segments: &[OverlapSegment], length_a: f64, length_b: f64) -> OverlapTotals {
    let overlap = overlap_length(segments);
    OverlapTotals {
        overlap_length: overlap,
        unique_a: unique_distance(length_a, overlap),
        unique_b: unique_distance(length_b, overlap),
    }
}

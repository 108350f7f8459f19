//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that expose track comparison
//! to Kotlin and Swift. All FFI functions are prefixed with `ffi_` to avoid
//! naming conflicts with the internal API.
//!
//! Invalid input never crosses the boundary as an error: it is logged and
//! reported as `None` (or an empty JSON object).

use crate::{compare_tracks, init_logging, GpsPoint, OverlapConfig, OverlapSummary, Result, Track};
use log::{info, warn};

// ============================================================================
// Track Comparison
// ============================================================================

/// Compare two tracks and return the overlap summary.
#[uniffi::export]
pub fn ffi_compare_tracks(
    id_a: String,
    name_a: String,
    points_a: Vec<GpsPoint>,
    id_b: String,
    name_b: String,
    points_b: Vec<GpsPoint>,
    config: OverlapConfig,
) -> Option<OverlapSummary> {
    init_logging();
    info!(
        "[TrackOverlap] ffi_compare_tracks: {} ({} points) vs {} ({} points)",
        id_a,
        points_a.len(),
        id_b,
        points_b.len()
    );

    let result = summarize(
        Track::new(id_a, name_a, points_a),
        Track::new(id_b, name_b, points_b),
        &config,
    );
    log_failure(result)
}

/// Get default overlap configuration.
#[uniffi::export]
pub fn ffi_default_overlap_config() -> OverlapConfig {
    init_logging();
    info!("[TrackOverlap] ffi_default_overlap_config called");
    OverlapConfig::default()
}

// ============================================================================
// Flat Buffer Input (optimized for TypedArray input)
// ============================================================================

/// Track input as a flat coordinate buffer.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FlatTrack {
    pub track_id: String,
    pub name: String,
    /// Flat array of coordinates: [lat1, lng1, lat2, lng2, ...]
    pub coords: Vec<f64>,
}

impl FlatTrack {
    /// Decode the coordinate pairs; a trailing unpaired value is ignored.
    fn into_track(self) -> Result<Track> {
        let points: Vec<GpsPoint> = self
            .coords
            .chunks_exact(2)
            .map(|chunk| GpsPoint::new(chunk[0], chunk[1]))
            .collect();
        Track::new(self.track_id, self.name, points)
    }
}

/// Compare two tracks given as flat coordinate buffers.
/// This avoids the overhead of deserializing GpsPoint objects.
#[uniffi::export]
pub fn ffi_compare_flat_tracks(
    track_a: FlatTrack,
    track_b: FlatTrack,
    config: OverlapConfig,
) -> Option<OverlapSummary> {
    init_logging();
    info!(
        "[TrackOverlap] FLAT compare: {} ({} coords) vs {} ({} coords)",
        track_a.track_id,
        track_a.coords.len(),
        track_b.track_id,
        track_b.coords.len()
    );

    log_failure(summarize(track_a.into_track(), track_b.into_track(), &config))
}

/// Compare two flat tracks and return the summary as JSON.
///
/// Returns `"{}"` when the input cannot be compared.
#[uniffi::export]
pub fn ffi_compare_flat_tracks_json(
    track_a: FlatTrack,
    track_b: FlatTrack,
    config: OverlapConfig,
) -> String {
    ffi_compare_flat_tracks(track_a, track_b, config)
        .and_then(|summary| summary.to_json().ok())
        .unwrap_or_else(|| "{}".to_string())
}

fn summarize(
    track_a: Result<Track>,
    track_b: Result<Track>,
    config: &OverlapConfig,
) -> Result<OverlapSummary> {
    let (track_a, track_b) = (track_a?, track_b?);
    let start = std::time::Instant::now();
    let summary = compare_tracks(&track_a, &track_b, config)?.summary();
    info!(
        "[TrackOverlap] Compared in {:?}: overlap {:.0}m ({:.0}% / {:.0}%)",
        start.elapsed(),
        summary.overlap_length,
        summary.overlap_percentage_a,
        summary.overlap_percentage_b
    );
    Ok(summary)
}

fn log_failure(result: Result<OverlapSummary>) -> Option<OverlapSummary> {
    match result {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("[TrackOverlap] Comparison failed: {}", e);
            None
        }
    }
}

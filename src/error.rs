//! Unified error handling for the track-overlap library.
//!
//! Only invalid input is ever reported as an error. Finding no overlap is a
//! normal, empty [`OverlapResult`](crate::OverlapResult), and degenerate
//! geometry (duplicate consecutive points) is absorbed by the metrics code.

use thiserror::Error;

/// Unified error type for track-overlap operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlapError {
    /// Track or polyline has too few points to form a path
    #[error("Track '{track_id}' has {point_count} points, minimum {minimum_required} required")]
    InvalidTrack {
        track_id: String,
        point_count: usize,
        minimum_required: usize,
    },
    /// A point lies outside the WGS84 coordinate ranges or is not finite
    #[error("Track '{track_id}' has invalid coordinates at point {index}: ({latitude}, {longitude})")]
    InvalidCoordinates {
        track_id: String,
        index: usize,
        latitude: f64,
        longitude: f64,
    },
    /// Comparison parameters are inconsistent
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Result type alias for track-overlap operations.
pub type Result<T> = std::result::Result<T, OverlapError>;

/// Extension trait for converting Option to OverlapError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an invalid track error.
    fn ok_or_invalid_track(self, track_id: &str, point_count: usize, minimum: usize) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_invalid_track(self, track_id: &str, point_count: usize, minimum: usize) -> Result<T> {
        self.ok_or_else(|| OverlapError::InvalidTrack {
            track_id: track_id.to_string(),
            point_count,
            minimum_required: minimum,
        })
    }
}

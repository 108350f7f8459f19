//! # Track Overlap
//!
//! Pairwise GPS track comparison: find where two recorded paths run along the
//! same physical route, and report the shared distance plus each track's
//! unique distance.
//!
//! This library provides:
//! - Haversine distances and polyline metrics (length, interpolation, nearest distance)
//! - Fixed-step resampling of the shorter track
//! - Hysteresis classification of per-sample distances into overlap segments
//! - Aggregation into overlap length and unique distances
//!
//! ## Features
//!
//! - **`parallel`** - Evaluate per-sample distances in parallel with rayon
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use track_overlap::{compare_tracks, GpsPoint, OverlapConfig, Track};
//!
//! let points: Vec<GpsPoint> = (0..20)
//!     .map(|i| GpsPoint::new(51.5074 + i as f64 * 0.0005, -0.1278))
//!     .collect();
//!
//! let morning = Track::new("a", "Morning ride", points.clone()).unwrap();
//! let evening = Track::new("b", "Evening ride", points).unwrap();
//!
//! let result = compare_tracks(&morning, &evening, &OverlapConfig::default()).unwrap();
//! println!(
//!     "Shared {:.0}m, unique {:.0}m / {:.0}m",
//!     result.overlap_length, result.unique_a, result.unique_b
//! );
//! assert!(result.unique_a < 30.0);
//! ```

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, OverlapError, Result};

// Geographic utilities (haversine distance, lengths, bounds)
pub mod geo_utils;

// Polyline metrics and the segment spatial index
pub mod polyline;
pub use polyline::{Polyline, SegmentIndex};

// Fixed-step resampling
pub mod resample;
pub use resample::{resample, Sample};

// Hysteresis classification of distance streams
pub mod classify;
pub use classify::{ClassifiedSample, OverlapClassifier, OverlapSegment, ZoneState};

// Overlap length and unique distance totals
pub mod aggregate;
pub use aggregate::{aggregate, overlap_length, unique_distance, OverlapTotals};

// Comparison entry point
pub mod compare;
pub use compare::{compare_tracks, compare_tracks_default, OverlapResult, OverlapSummary};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("TrackOverlapRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

/// Minimum number of points for a track or polyline to describe a path.
pub const MIN_TRACK_POINTS: usize = 2;

/// Smallest accepted resample step in meters; finer steps are below GPS precision.
pub const MIN_RESAMPLE_STEP: f64 = 0.1;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude, longitude and optional elevation.
///
/// # Example
/// ```
/// use track_overlap::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// let summit = GpsPoint::with_elevation(45.8326, 6.8652, 4808.0);
/// assert_eq!(summit.elevation, Some(4808.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl GpsPoint {
    /// Create a new GPS point without elevation.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
        }
    }

    /// Create a new GPS point with elevation.
    pub fn with_elevation(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: Some(elevation),
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
            && self.elevation.map_or(true, f64::is_finite)
    }
}

/// Bounding box for a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(geo_utils::compute_bounds(points))
    }

    /// Largest absolute latitude covered by the bounds.
    pub fn max_abs_lat(&self) -> f64 {
        self.min_lat.abs().max(self.max_lat.abs())
    }
}

/// A recorded path: an identifier, a display name and at least two points.
///
/// Tracks are immutable once built. The total length is computed on first
/// use and cached; a changed point sequence means constructing a new track.
#[derive(Debug, Clone)]
pub struct Track {
    id: String,
    name: String,
    points: Vec<GpsPoint>,
    length: OnceCell<f64>,
}

impl Track {
    /// Create a track from an ordered point sequence.
    ///
    /// Fails with [`OverlapError::InvalidTrack`] for fewer than two points and
    /// with [`OverlapError::InvalidCoordinates`] for any out-of-range point.
    ///
    /// # Example
    /// ```
    /// use track_overlap::{GpsPoint, OverlapError, Track};
    ///
    /// let single = Track::new("t", "Too short", vec![GpsPoint::new(51.5, -0.12)]);
    /// assert!(matches!(single, Err(OverlapError::InvalidTrack { .. })));
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        points: Vec<GpsPoint>,
    ) -> Result<Self> {
        let id = id.into();
        if points.len() < MIN_TRACK_POINTS {
            return Err(OverlapError::InvalidTrack {
                track_id: id,
                point_count: points.len(),
                minimum_required: MIN_TRACK_POINTS,
            });
        }

        if let Some((index, bad)) = points.iter().enumerate().find(|(_, p)| !p.is_valid()) {
            return Err(OverlapError::InvalidCoordinates {
                track_id: id,
                index,
                latitude: bad.latitude,
                longitude: bad.longitude,
            });
        }

        Ok(Self {
            id,
            name: name.into(),
            points,
            length: OnceCell::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[GpsPoint] {
        &self.points
    }

    /// Total length in meters (sum of consecutive haversine distances).
    pub fn length(&self) -> f64 {
        *self
            .length
            .get_or_init(|| geo_utils::polyline_length(&self.points))
    }

    pub fn start(&self) -> GpsPoint {
        self.points[0]
    }

    pub fn end(&self) -> GpsPoint {
        self.points[self.points.len() - 1]
    }

    /// Bounding box of all points (for map framing by the presentation layer).
    pub fn bounds(&self) -> Bounds {
        geo_utils::compute_bounds(&self.points)
    }

    /// Geometric view of this track for distance and interpolation queries.
    pub fn polyline(&self) -> Result<Polyline<'_>> {
        Polyline::for_track(&self.id, &self.points)
    }
}

/// Which of the two compared tracks a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum TrackRole {
    A,
    B,
}

impl TrackRole {
    pub fn other(self) -> Self {
        match self {
            TrackRole::A => TrackRole::B,
            TrackRole::B => TrackRole::A,
        }
    }
}

/// Configuration for overlap detection.
///
/// Missing fields fall back to their defaults when deserializing, so a host
/// can override a single threshold with `{"exit_threshold": 30.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct OverlapConfig {
    /// A sample at or below this distance (meters) from the reference opens an overlap.
    /// Default: 20.0 meters
    pub enter_threshold: f64,

    /// An open overlap continues while samples stay at or below this distance (meters).
    /// Must be greater than `enter_threshold`. Default: 25.0 meters (empirical, tunable)
    pub exit_threshold: f64,

    /// Arc-length spacing (meters) of samples along the probe track.
    /// Keep it finer than the thresholds; at least [`MIN_RESAMPLE_STEP`]. Default: 10.0 meters
    pub resample_step: f64,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            enter_threshold: 20.0,
            exit_threshold: 25.0,
            resample_step: 10.0,
        }
    }
}

impl OverlapConfig {
    /// Check that thresholds and step are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.enter_threshold.is_finite() || self.enter_threshold < 0.0 {
            return Err(OverlapError::ConfigError {
                message: format!(
                    "enter threshold must be a non-negative distance, got {}",
                    self.enter_threshold
                ),
            });
        }
        if !self.exit_threshold.is_finite() || self.exit_threshold <= self.enter_threshold {
            return Err(OverlapError::ConfigError {
                message: format!(
                    "exit threshold ({}) must exceed enter threshold ({})",
                    self.exit_threshold, self.enter_threshold
                ),
            });
        }
        if !self.resample_step.is_finite() || self.resample_step < MIN_RESAMPLE_STEP {
            return Err(OverlapError::ConfigError {
                message: format!(
                    "resample step must be at least {} m, got {}",
                    MIN_RESAMPLE_STEP, self.resample_step
                ),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_route() -> Vec<GpsPoint> {
        vec![
            GpsPoint::new(51.5074, -0.1278),
            GpsPoint::new(51.5080, -0.1290),
            GpsPoint::new(51.5090, -0.1300),
            GpsPoint::new(51.5100, -0.1310),
            GpsPoint::new(51.5110, -0.1320),
        ]
    }

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(51.5074, -0.1278).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GpsPoint::with_elevation(0.0, 0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_create_track() {
        let track = Track::new("test-1", "Commute", sample_route()).unwrap();
        assert_eq!(track.id(), "test-1");
        assert_eq!(track.name(), "Commute");
        assert_eq!(track.points().len(), 5);
        assert!(track.length() > 0.0);
        assert_eq!(track.length(), geo_utils::polyline_length(&sample_route()));
        assert_eq!(track.start(), sample_route()[0]);
        assert_eq!(track.end(), sample_route()[4]);
    }

    #[test]
    fn test_track_rejects_short_input() {
        let empty = Track::new("empty", "Empty", vec![]);
        assert!(matches!(
            empty,
            Err(OverlapError::InvalidTrack { point_count: 0, .. })
        ));

        let single = Track::new("single", "Single", vec![GpsPoint::new(51.5, -0.1)]);
        assert!(matches!(
            single,
            Err(OverlapError::InvalidTrack { point_count: 1, minimum_required: 2, .. })
        ));
    }

    #[test]
    fn test_track_rejects_invalid_coordinates() {
        let mut points = sample_route();
        points[3] = GpsPoint::new(95.0, -0.1);
        let result = Track::new("bad", "Bad", points);
        assert!(matches!(
            result,
            Err(OverlapError::InvalidCoordinates { index: 3, .. })
        ));
    }

    #[test]
    fn test_track_bounds() {
        let track = Track::new("b", "Bounds", sample_route()).unwrap();
        let bounds = track.bounds();
        assert_eq!(bounds.min_lat, 51.5074);
        assert_eq!(bounds.max_lat, 51.5110);
        assert_eq!(Bounds::from_points(track.points()), Some(bounds));
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = OverlapConfig::default();
        assert_eq!(config.enter_threshold, 20.0);
        assert_eq!(config.exit_threshold, 25.0);
        assert_eq!(config.resample_step, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let inverted = OverlapConfig {
            enter_threshold: 25.0,
            exit_threshold: 20.0,
            ..OverlapConfig::default()
        };
        assert!(matches!(inverted.validate(), Err(OverlapError::ConfigError { .. })));

        let equal = OverlapConfig {
            enter_threshold: 20.0,
            exit_threshold: 20.0,
            ..OverlapConfig::default()
        };
        assert!(equal.validate().is_err());

        let zero_step = OverlapConfig {
            resample_step: 0.0,
            ..OverlapConfig::default()
        };
        assert!(zero_step.validate().is_err());

        let tiny_step = OverlapConfig {
            resample_step: 1e-12,
            ..OverlapConfig::default()
        };
        assert!(matches!(tiny_step.validate(), Err(OverlapError::ConfigError { .. })));

        let smallest_step = OverlapConfig {
            resample_step: MIN_RESAMPLE_STEP,
            ..OverlapConfig::default()
        };
        assert!(smallest_step.validate().is_ok());

        let nan_enter = OverlapConfig {
            enter_threshold: f64::NAN,
            ..OverlapConfig::default()
        };
        assert!(nan_enter.validate().is_err());
    }

    #[test]
    fn test_config_partial_json() {
        let config: OverlapConfig = serde_json::from_str(r#"{"exit_threshold": 30.0}"#).unwrap();
        assert_eq!(config.enter_threshold, 20.0);
        assert_eq!(config.exit_threshold, 30.0);
        assert_eq!(config.resample_step, 10.0);
    }

    #[test]
    fn test_gps_point_json_omits_missing_elevation() {
        let json = serde_json::to_string(&GpsPoint::new(1.0, 2.0)).unwrap();
        assert!(!json.contains("elevation"));

        let parsed: GpsPoint = serde_json::from_str(r#"{"latitude":1.0,"longitude":2.0}"#).unwrap();
        assert_eq!(parsed.elevation, None);
    }

    #[test]
    fn test_track_role_other() {
        assert_eq!(TrackRole::A.other(), TrackRole::B);
        assert_eq!(TrackRole::B.other(), TrackRole::A);
    }
}

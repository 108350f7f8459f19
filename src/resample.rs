//! Fixed-step resampling along a polyline.
//!
//! Samples are placed at arc-length offsets `0, step, 2*step, ...` up to the
//! total length. The final sample is always the literal last point of the
//! path, appended at the exact total length when the last stepped offset
//! falls short, so the tail of a track is never skipped.

use serde::{Deserialize, Serialize};

use crate::error::{OverlapError, Result};
use crate::polyline::Polyline;
use crate::{GpsPoint, MIN_RESAMPLE_STEP};

/// A point produced by resampling, tagged with its arc-length offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Sample {
    pub point: GpsPoint,
    /// Distance along the source path from its first point (meters)
    pub offset: f64,
}

/// Resample `polyline` every `step` meters.
///
/// Offsets are computed as `k * step` rather than by repeated addition, so
/// long tracks do not drift. A zero-length path yields a single sample.
/// Steps below [`MIN_RESAMPLE_STEP`] are rejected.
///
/// # Example
/// ```
/// use track_overlap::{resample, GpsPoint, Polyline};
///
/// let points = vec![GpsPoint::new(46.0, 7.0), GpsPoint::new(46.0009, 7.0)];
/// let line = Polyline::new(&points).unwrap(); // ~100 m
/// let samples = resample(&line, 10.0).unwrap();
///
/// assert_eq!(samples.first().unwrap().offset, 0.0);
/// assert_eq!(samples.last().unwrap().point, points[1]);
/// ```
pub fn resample(polyline: &Polyline<'_>, step: f64) -> Result<Vec<Sample>> {
    if !step.is_finite() || step < MIN_RESAMPLE_STEP {
        return Err(OverlapError::ConfigError {
            message: format!(
                "resample step must be at least {} m, got {}",
                MIN_RESAMPLE_STEP, step
            ),
        });
    }

    let total = polyline.total_length();
    let steps = (total / step).floor() as usize;

    let mut samples: Vec<Sample> = (0..=steps)
        .map(|k| {
            let offset = (k as f64 * step).min(total);
            Sample {
                point: polyline.point_at_distance(offset),
                offset,
            }
        })
        .collect();

    let covers_end = samples.last().map_or(false, |s| s.offset >= total);
    if !covers_end {
        let points = polyline.points();
        samples.push(Sample {
            point: points[points.len() - 1],
            offset: total,
        });
    }

    Ok(samples)
}

//! # Hysteresis Classification
//!
//! Turns a stream of per-sample distances into overlap segments using two
//! thresholds. A sample at or below `enter_threshold` opens a run; the run
//! continues while samples stay at or below the wider `exit_threshold`, and
//! ends at the first sample beyond it. The gap between the thresholds keeps
//! a path hovering around a single boundary from fragmenting into many tiny
//! segments.
//!
//! ```text
//! distance  5   5   22   5   5        5   5   30   5   5
//! state     I   I   I    I   I        I   I   O    I   I
//! runs      [0 ............. 4]       [0..1]       [3..4]
//! ```
//!
//! Runs shorter than two samples are dropped: they cannot carry a length.
//! The classification is inherently sequential; each sample's state depends
//! on the previous one.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{OverlapError, Result};
use crate::geo_utils::polyline_length;
use crate::resample::Sample;
use crate::{GpsPoint, OverlapConfig};

/// Minimum samples in an emitted segment.
pub const MIN_SEGMENT_SAMPLES: usize = 2;

/// State of the hysteresis machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneState {
    #[default]
    Outside,
    Inside,
}

/// A sample together with its distance to the reference and its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ClassifiedSample {
    pub sample: Sample,
    /// Minimum distance to the reference polyline (meters)
    pub distance: f64,
    /// True when the sample belongs to an emitted overlap segment
    pub inside: bool,
}

/// A contiguous stretch of the probe track classified as overlapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct OverlapSegment {
    /// Sample points in probe traversal order (at least two)
    pub points: Vec<GpsPoint>,
    /// Arc-length offset of the first sample along the probe (meters)
    pub start_offset: f64,
    /// Arc-length offset of the last sample along the probe (meters)
    pub end_offset: f64,
    /// Polyline length of `points` (meters)
    pub length: f64,
}

impl OverlapSegment {
    /// Build a segment from a run of samples. Returns `None` for runs too short to have a length.
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        if samples.len() < MIN_SEGMENT_SAMPLES {
            return None;
        }

        let points: Vec<GpsPoint> = samples.iter().map(|s| s.point).collect();
        let length = polyline_length(&points);

        Some(Self {
            start_offset: samples[0].offset,
            end_offset: samples[samples.len() - 1].offset,
            points,
            length,
        })
    }
}

/// Two-threshold classifier for distance streams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapClassifier {
    enter_threshold: f64,
    exit_threshold: f64,
}

impl OverlapClassifier {
    /// Create a classifier; `exit_threshold` must be strictly greater than `enter_threshold`.
    pub fn new(enter_threshold: f64, exit_threshold: f64) -> Result<Self> {
        if !enter_threshold.is_finite() || enter_threshold < 0.0 {
            return Err(OverlapError::ConfigError {
                message: format!(
                    "enter threshold must be a non-negative distance, got {}",
                    enter_threshold
                ),
            });
        }
        if !exit_threshold.is_finite() || exit_threshold <= enter_threshold {
            return Err(OverlapError::ConfigError {
                message: format!(
                    "exit threshold ({}) must exceed enter threshold ({})",
                    exit_threshold, enter_threshold
                ),
            });
        }

        Ok(Self {
            enter_threshold,
            exit_threshold,
        })
    }

    pub fn from_config(config: &OverlapConfig) -> Result<Self> {
        Self::new(config.enter_threshold, config.exit_threshold)
    }

    pub fn enter_threshold(&self) -> f64 {
        self.enter_threshold
    }

    pub fn exit_threshold(&self) -> f64 {
        self.exit_threshold
    }

    /// State after observing `distance` in `state`. NaN counts as far.
    pub fn next_state(&self, state: ZoneState, distance: f64) -> ZoneState {
        match state {
            ZoneState::Outside if distance <= self.enter_threshold => ZoneState::Inside,
            ZoneState::Inside if !(distance <= self.exit_threshold) => ZoneState::Outside,
            unchanged => unchanged,
        }
    }

    /// Index ranges of the emitted runs, in stream order.
    ///
    /// # Example
    /// ```
    /// use track_overlap::OverlapClassifier;
    ///
    /// let classifier = OverlapClassifier::new(20.0, 25.0).unwrap();
    /// assert_eq!(classifier.runs(&[5.0, 5.0, 22.0, 5.0, 5.0]), vec![0..5]);
    /// assert_eq!(classifier.runs(&[5.0, 5.0, 30.0, 5.0, 5.0]), vec![0..2, 3..5]);
    /// assert!(classifier.runs(&[30.0, 5.0, 30.0]).is_empty());
    /// ```
    pub fn runs(&self, distances: &[f64]) -> Vec<Range<usize>> {
        let mut runs = Vec::new();
        let mut state = ZoneState::Outside;
        let mut run_start = 0;

        for (i, &distance) in distances.iter().enumerate() {
            let next = self.next_state(state, distance);
            match (state, next) {
                (ZoneState::Outside, ZoneState::Inside) => run_start = i,
                (ZoneState::Inside, ZoneState::Outside) => push_run(&mut runs, run_start..i),
                _ => {}
            }
            state = next;
        }

        if state == ZoneState::Inside {
            push_run(&mut runs, run_start..distances.len());
        }

        runs
    }

    /// Classify resampled points given their distances to the reference.
    ///
    /// `samples` and `distances` are paired by position; any excess in the
    /// longer slice is ignored.
    pub fn classify(
        &self,
        samples: &[Sample],
        distances: &[f64],
    ) -> (Vec<ClassifiedSample>, Vec<OverlapSegment>) {
        debug_assert_eq!(samples.len(), distances.len());
        let len = samples.len().min(distances.len());
        let samples = &samples[..len];
        let distances = &distances[..len];

        let runs = self.runs(distances);

        let mut inside = vec![false; len];
        for run in &runs {
            inside[run.clone()].iter_mut().for_each(|flag| *flag = true);
        }

        let classified = samples
            .iter()
            .zip(distances)
            .zip(inside)
            .map(|((sample, &distance), inside)| ClassifiedSample {
                sample: *sample,
                distance,
                inside,
            })
            .collect();

        let segments = runs
            .into_iter()
            .filter_map(|run| OverlapSegment::from_samples(&samples[run]))
            .collect();

        (classified, segments)
    }
}

fn push_run(runs: &mut Vec<Range<usize>>, run: Range<usize>) {
    if run.len() >= MIN_SEGMENT_SAMPLES {
        runs.push(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> OverlapClassifier {
        OverlapClassifier::new(20.0, 25.0).unwrap()
    }

    /// Samples 10 m apart along a meridian.
    fn samples(count: usize) -> Vec<Sample> {
        (0..count)
            .map(|i| Sample {
                point: GpsPoint::new(46.0 + i as f64 * 0.00009, 7.0),
                offset: i as f64 * 10.0,
            })
            .collect()
    }

    #[test]
    fn test_excursion_within_exit_keeps_segment() {
        let runs = classifier().runs(&[5.0, 5.0, 22.0, 5.0, 5.0]);
        assert_eq!(runs, vec![0..5]);
    }

    #[test]
    fn test_excursion_beyond_exit_splits_segment() {
        let runs = classifier().runs(&[5.0, 5.0, 30.0, 5.0, 5.0]);
        assert_eq!(runs, vec![0..2, 3..5]);
    }

    #[test]
    fn test_single_sample_run_dropped() {
        assert!(classifier().runs(&[30.0, 5.0, 30.0]).is_empty());
        assert!(classifier().runs(&[5.0]).is_empty());
    }

    #[test]
    fn test_between_thresholds_does_not_enter() {
        // 22 m never opens a run from outside
        assert!(classifier().runs(&[22.0, 22.0, 22.0]).is_empty());
        assert_eq!(classifier().runs(&[22.0, 20.0, 22.0, 24.9]), vec![1..4]);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        assert_eq!(classifier().runs(&[20.0, 25.0]), vec![0..2]);
        assert_eq!(classifier().runs(&[20.0, 25.000001]), Vec::<Range<usize>>::new());
    }

    #[test]
    fn test_open_run_emitted_at_end() {
        assert_eq!(classifier().runs(&[40.0, 10.0, 10.0, 10.0]), vec![1..4]);
    }

    #[test]
    fn test_nan_is_far() {
        assert_eq!(
            classifier().runs(&[5.0, 5.0, f64::NAN, 5.0, 5.0]),
            vec![0..2, 3..5]
        );
        assert!(classifier().runs(&[f64::NAN, f64::NAN]).is_empty());
    }

    #[test]
    fn test_empty_stream() {
        assert!(classifier().runs(&[]).is_empty());
        let (classified, segments) = classifier().classify(&[], &[]);
        assert!(classified.is_empty());
        assert!(segments.is_empty());
    }

    #[test]
    fn test_next_state_transitions() {
        let c = classifier();
        assert_eq!(c.next_state(ZoneState::Outside, 19.0), ZoneState::Inside);
        assert_eq!(c.next_state(ZoneState::Outside, 21.0), ZoneState::Outside);
        assert_eq!(c.next_state(ZoneState::Inside, 24.0), ZoneState::Inside);
        assert_eq!(c.next_state(ZoneState::Inside, 26.0), ZoneState::Outside);
        assert_eq!(ZoneState::default(), ZoneState::Outside);
    }

    #[test]
    fn test_classify_builds_segments() {
        let samples = samples(5);
        let distances = [5.0, 5.0, 30.0, 5.0, 5.0];
        let (classified, segments) = classifier().classify(&samples, &distances);

        assert_eq!(classified.len(), 5);
        let flags: Vec<bool> = classified.iter().map(|c| c.inside).collect();
        assert_eq!(flags, vec![true, true, false, true, true]);
        assert_eq!(classified[2].distance, 30.0);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].points, vec![samples[0].point, samples[1].point]);
        assert_eq!(segments[0].start_offset, 0.0);
        assert_eq!(segments[0].end_offset, 10.0);
        assert_eq!(segments[1].start_offset, 30.0);
        assert!((segments[0].length - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_classify_degenerate_run_is_outside() {
        let samples = samples(3);
        let (classified, segments) = classifier().classify(&samples, &[30.0, 5.0, 30.0]);
        assert!(segments.is_empty());
        assert!(classified.iter().all(|c| !c.inside));
    }

    #[test]
    fn test_segment_from_samples_requires_two() {
        let samples = samples(2);
        assert!(OverlapSegment::from_samples(&samples[..1]).is_none());
        let segment = OverlapSegment::from_samples(&samples).unwrap();
        assert_eq!(segment.points.len(), 2);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        assert!(matches!(
            OverlapClassifier::new(25.0, 20.0),
            Err(OverlapError::ConfigError { .. })
        ));
        assert!(OverlapClassifier::new(20.0, 20.0).is_err());
        assert!(OverlapClassifier::new(-1.0, 20.0).is_err());

        let c = OverlapClassifier::from_config(&OverlapConfig::default()).unwrap();
        assert_eq!(c.enter_threshold(), 20.0);
        assert_eq!(c.exit_threshold(), 25.0);
    }
}

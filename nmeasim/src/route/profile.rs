//! Piecewise speed schedule.
//!
//! A [`SpeedProfile`] is an ordered list of [`SpeedSegment`]s. Speed changes
//! are instantaneous steps at segment boundaries; there is no ramp.

use std::time::Duration;

use crate::config::ConfigError;

/// One step of a speed profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSegment {
    /// How long this speed applies. `None` means "continue indefinitely".
    pub duration: Option<Duration>,
    /// Target speed in knots.
    pub speed_knots: f64,
}

impl SpeedSegment {
    /// A segment that lasts for a fixed time.
    pub fn timed(duration: Duration, speed_knots: f64) -> Self {
        Self {
            duration: Some(duration),
            speed_knots,
        }
    }

    /// A segment that never ends.
    pub fn indefinite(speed_knots: f64) -> Self {
        Self {
            duration: None,
            speed_knots,
        }
    }
}

/// Validated speed schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedProfile {
    segments: Vec<SpeedSegment>,
}

impl SpeedProfile {
    /// Build a profile, validating it up front.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyProfile`] when `segments` is empty
    /// - [`ConfigError::IndefiniteSegmentNotLast`] when any segment other than
    ///   the last has no duration
    /// - [`ConfigError::InvalidSegment`] for negative or non-finite speeds and
    ///   zero durations
    pub fn new(segments: Vec<SpeedSegment>) -> Result<Self, ConfigError> {
        if segments.is_empty() {
            return Err(ConfigError::EmptyProfile);
        }

        let last = segments.len() - 1;
        for (index, segment) in segments.iter().enumerate() {
            if !segment.speed_knots.is_finite() || segment.speed_knots < 0.0 {
                return Err(ConfigError::InvalidSegment {
                    index,
                    reason: format!(
                        "speed {} must be a non-negative number",
                        segment.speed_knots
                    ),
                });
            }
            match segment.duration {
                None if index != last => {
                    return Err(ConfigError::IndefiniteSegmentNotLast { index });
                }
                Some(d) if d.is_zero() => {
                    return Err(ConfigError::InvalidSegment {
                        index,
                        reason: "duration must be positive".to_string(),
                    });
                }
                _ => {}
            }
        }

        Ok(Self { segments })
    }

    /// A single indefinite segment at `speed_knots`.
    pub fn constant(speed_knots: f64) -> Result<Self, ConfigError> {
        Self::new(vec![SpeedSegment::indefinite(speed_knots)])
    }

    /// The validated segments, in order.
    pub fn segments(&self) -> &[SpeedSegment] {
        &self.segments
    }

    /// Index of the segment active at `elapsed`.
    ///
    /// A segment covers the half-open interval `[start, start + duration)`.
    /// Past the end of every finite segment the last index is returned.
    pub fn segment_index_at(&self, elapsed: Duration) -> usize {
        let mut start = Duration::ZERO;
        for (index, segment) in self.segments.iter().enumerate() {
            match segment.duration {
                Some(d) => {
                    let end = start.saturating_add(d);
                    if elapsed < end {
                        return index;
                    }
                    start = end;
                }
                None => return index,
            }
        }
        self.segments.len().saturating_sub(1)
    }

    /// Speed in knots at `elapsed` simulated time.
    pub fn speed_at(&self, elapsed: Duration) -> f64 {
        self.segments
            .get(self.segment_index_at(elapsed))
            .map_or(0.0, |s| s.speed_knots)
    }

    /// Total length of the finite segments, saturating at `Duration::MAX`.
    /// `None` if the profile ends with an indefinite segment.
    pub fn finite_length(&self) -> Option<Duration> {
        self.segments
            .iter()
            .try_fold(Duration::ZERO, |acc, s| s.duration.map(|d| acc.saturating_add(d)))
    }
}

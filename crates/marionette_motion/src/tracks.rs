use marionette_core::{MarionetteError, Result};
use serde::{Deserialize, Serialize};

use crate::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
}

/// Number of neighbouring intervals scanned before falling back to a binary
/// search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last interval a track was sampled in.
///
/// Playback almost always moves forward by less than one keyframe per frame,
/// so starting the search from the previous interval makes sampling O(1).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Time-stamped keyframes of one value.
///
/// Times are sorted ascending and there is exactly one value per time.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Result<Self> {
        if times.is_empty() {
            return Err(MarionetteError::EmptyTrack(
                "a keyframe track needs at least one key".to_string(),
            ));
        }
        if times.len() != values.len() {
            return Err(MarionetteError::InvalidArgument(format!(
                "keyframe track has {} times but {} values",
                times.len(),
                values.len()
            )));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(MarionetteError::InvalidArgument(
                "keyframe times must be finite".to_string(),
            ));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(MarionetteError::InvalidArgument(
                "keyframe times must be sorted ascending".to_string(),
            ));
        }

        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    /// Single-key track holding `value` forever.
    pub fn constant(time: f32, value: T) -> Result<Self> {
        Self::new(vec![time], vec![value], InterpolationMode::Step)
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    #[inline]
    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.times[0]
    }

    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times[self.times.len() - 1]
    }

    /// Samples without a cursor (binary search every call).
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        let next_idx = self.times.partition_point(|&t| t <= time);
        self.sample_at_frame(next_idx.saturating_sub(1), time)
    }

    /// Samples starting the interval search at `cursor`, then stores the
    /// interval that was found back into it.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        let len = self.times.len();
        if len == 1 {
            return self.values[0].clone();
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.times[i];

        let found_index = if time >= t_curr {
            // Forward: time only moved ahead, check the right boundaries.
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    res = Some(len - 1);
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward: inverse playback or a loop rewind.
            let mut res = None;
            for offset in 1..=MAX_SCAN_OFFSET {
                if i < offset {
                    res = Some(0);
                    break;
                }
                let idx = i - offset;
                if time >= self.times[idx] {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let index = found_index.unwrap_or_else(|| {
            let next_idx = self.times.partition_point(|&t| t <= time);
            next_idx.saturating_sub(1)
        });
        cursor.last_index = index;

        self.sample_at_frame(index, time)
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return self.values[len - 1].clone();
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.values[index].clone(),
            InterpolationMode::Linear => {
                T::interpolate_linear(&self.values[index], &self.values[next_idx], t)
            }
        }
    }
}

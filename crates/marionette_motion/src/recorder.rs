use std::collections::VecDeque;

use marionette_core::{BoneName, Transform};
use rustc_hash::FxHashMap;

use crate::motion::MotionEvent;
use crate::tracks::KeyframeCursor;

/// Per-player scratch buffer filled by [`Motion::sample`].
///
/// Holds the last sampled transform of every bone the motion animates, the
/// motion events crossed but not yet drained, and the bookkeeping needed to
/// sample the next frame cheaply (keyframe cursors, last sample time).
///
/// [`Motion::sample`]: crate::motion::Motion::sample
#[derive(Debug, Clone)]
pub struct MotionRecorder {
    poses: FxHashMap<BoneName, Transform>,
    pub(crate) cursors: Vec<KeyframeCursor>,
    events: VecDeque<MotionEvent>,
    event_capacity: usize,
    pub(crate) last_sample_time: Option<f32>,
}

impl MotionRecorder {
    #[must_use]
    pub fn new(event_capacity: usize) -> Self {
        Self {
            poses: FxHashMap::default(),
            cursors: Vec::new(),
            events: VecDeque::new(),
            event_capacity,
            last_sample_time: None,
        }
    }

    /// Clears everything and sizes the cursors for a motion with
    /// `track_count` tracks. Keeps allocations.
    pub(crate) fn prepare(&mut self, track_count: usize) {
        self.poses.clear();
        self.events.clear();
        self.cursors.clear();
        self.cursors.resize(track_count, KeyframeCursor::default());
        self.last_sample_time = None;
    }

    /// Drops the time-dependent caches after a loop wrap. Sampled poses are
    /// kept; undrained events stay queued.
    pub(crate) fn rewind(&mut self) {
        self.cursors.fill(KeyframeCursor::default());
        self.last_sample_time = None;
    }

    #[inline]
    pub(crate) fn record(&mut self, bone: BoneName, transform: Transform) {
        self.poses.insert(bone, transform);
    }

    pub(crate) fn push_event(&mut self, event: MotionEvent) {
        if self.event_capacity == 0 {
            return;
        }
        if self.events.len() >= self.event_capacity
            && let Some(dropped) = self.events.pop_front()
        {
            log::warn!(
                "Motion event queue full ({}), dropping '{}' at {:.3}s",
                self.event_capacity,
                dropped.name,
                dropped.time
            );
        }
        self.events.push_back(event);
    }

    /// The last sampled transform of `bone`, if the motion animates it.
    #[inline]
    #[must_use]
    pub fn get(&self, bone: BoneName) -> Option<&Transform> {
        self.poses.get(&bone)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoneName, &Transform)> {
        self.poses.iter().map(|(name, t)| (*name, t))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn last_sample_time(&self) -> Option<f32> {
        self.last_sample_time
    }

    /// Removes and returns the oldest pending event.
    pub fn pop_event(&mut self) -> Option<MotionEvent> {
        self.events.pop_front()
    }

    pub fn pending_events(&self) -> impl ExactSizeIterator<Item = &MotionEvent> {
        self.events.iter()
    }
}

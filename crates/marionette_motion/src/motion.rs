use std::sync::Arc;

use marionette_core::interner::{self, BoneName};
use marionette_core::{MarionetteError, Result, Transform};
use uuid::Uuid;

use crate::recorder::MotionRecorder;
use crate::tracks::KeyframeTrack;

/// Shared handle to an immutable motion.
pub type MotionHandle = Arc<Motion>;

/// A marker authored on the motion timeline (footsteps, sounds, hit frames).
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    pub time: f32,
    pub name: Arc<str>,
}

impl MotionEvent {
    #[must_use]
    pub fn new(time: f32, name: &str) -> Self {
        Self {
            time,
            name: Arc::from(name),
        }
    }
}

/// Keyframes of one bone.
#[derive(Debug, Clone)]
pub struct BoneTrack {
    pub bone: BoneName,
    pub keyframes: KeyframeTrack<Transform>,
}

impl BoneTrack {
    #[must_use]
    pub fn new(bone: &str, keyframes: KeyframeTrack<Transform>) -> Self {
        Self {
            bone: interner::intern(bone),
            keyframes,
        }
    }
}

/// An animation clip: per-bone keyframe tracks over `[start_time, end_time]`.
///
/// Motions are read-only once built and shared between players through
/// [`MotionHandle`].
#[derive(Debug, Clone)]
pub struct Motion {
    pub id: Uuid,
    pub name: String,
    start_time: f32,
    end_time: f32,
    tracks: Vec<BoneTrack>,
    events: Vec<MotionEvent>,
}

impl Motion {
    /// Builds a motion with an explicit time range.
    ///
    /// A range with `end_time <= start_time` is accepted; such a motion is
    /// sampled at most once and never loops.
    pub fn new(name: &str, start_time: f32, end_time: f32, tracks: Vec<BoneTrack>) -> Result<Self> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(MarionetteError::InvalidArgument(format!(
                "motion '{name}' has a non-finite time range [{start_time}, {end_time}]"
            )));
        }
        if end_time < start_time {
            log::warn!("Motion '{name}' ends ({end_time}) before it starts ({start_time})");
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            start_time,
            end_time,
            tracks,
            events: Vec::new(),
        })
    }

    /// Builds a motion spanning from the earliest to the latest keyframe of
    /// its tracks. A motion without tracks spans `[0, 0]`.
    pub fn from_tracks(name: &str, tracks: Vec<BoneTrack>) -> Result<Self> {
        let (start, end) = tracks
            .iter()
            .map(|t| (t.keyframes.start_time(), t.keyframes.end_time()))
            .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)))
            .unwrap_or((0.0, 0.0));

        Self::new(name, start, end, tracks)
    }

    /// Attaches timeline events. They are kept sorted by time.
    #[must_use]
    pub fn with_events(mut self, mut events: Vec<MotionEvent>) -> Self {
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.events = events;
        self
    }

    #[inline]
    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    /// Length of one pass. Zero for degenerate ranges.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        (self.end_time - self.start_time).max(0.0)
    }

    #[inline]
    #[must_use]
    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    #[inline]
    #[must_use]
    pub fn events(&self) -> &[MotionEvent] {
        &self.events
    }

    #[must_use]
    pub fn track(&self, bone: &str) -> Option<&BoneTrack> {
        let name = interner::get(bone)?;
        self.tracks.iter().find(|t| t.bone == name)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Maps a playback time to the timeline time that gets sampled.
    #[inline]
    #[must_use]
    pub fn timeline_time(&self, time: f32, inverse: bool) -> f32 {
        if inverse {
            self.start_time + self.end_time - time
        } else {
            time
        }
    }

    /// Samples every track at `time` into `recorder` and queues the events
    /// crossed since the recorder's previous sample.
    ///
    /// With `inverse` the motion is sampled backwards from its end. Bones the
    /// motion has no track for are left untouched in the recorder.
    pub fn sample(&self, time: f32, inverse: bool, recorder: &mut MotionRecorder) {
        let t = self.timeline_time(time, inverse);

        if recorder.cursors.len() != self.tracks.len() {
            recorder.cursors.resize(self.tracks.len(), Default::default());
        }

        for (index, track) in self.tracks.iter().enumerate() {
            let cursor = &mut recorder.cursors[index];
            let value = track.keyframes.sample_with_cursor(t, cursor);
            recorder.record(track.bone, value);
        }

        self.collect_events(t, inverse, recorder);
        recorder.last_sample_time = Some(t);
    }

    /// Queues the events between the last sample and the end of the pass
    /// (the start of the timeline when playing inversely).
    pub(crate) fn flush_events(&self, inverse: bool, recorder: &mut MotionRecorder) {
        let boundary = self.timeline_time(self.end_time, inverse);
        self.collect_events(boundary, inverse, recorder);
        recorder.last_sample_time = Some(boundary);
    }

    fn collect_events(&self, t: f32, inverse: bool, recorder: &mut MotionRecorder) {
        if self.events.is_empty() {
            return;
        }

        let prev = recorder.last_sample_time;
        for event in &self.events {
            let crossed = match (inverse, prev) {
                (false, None) => event.time <= t,
                (false, Some(p)) => p < event.time && event.time <= t,
                (true, None) => event.time >= t,
                (true, Some(p)) => t <= event.time && event.time < p,
            };
            if crossed {
                recorder.push_event(event.clone());
            }
        }
    }
}

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::motion::{MotionEvent, MotionHandle};
use crate::recorder::MotionRecorder;

/// How many times a motion plays before it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopCount {
    /// Total number of passes; `Finite(0)` plays once like `Finite(1)`.
    Finite(u32),
    Infinite,
}

impl Default for LoopCount {
    fn default() -> Self {
        Self::Finite(1)
    }
}

/// Playback parameters copied into a player when it starts a motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionPlaybackConfig {
    /// Playback rate multiplier.
    pub speed: f32,
    /// Contribution of the motion once fully blended in, in `[0, 1]`.
    pub weight: f32,
    /// Seconds over which the weight ramps from 0 to `weight`.
    pub blend_time: f32,
    pub loop_count: LoopCount,
    /// Play the timeline backwards, from its end toward its start.
    pub inverse: bool,
}

impl Default for MotionPlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            weight: 0.0,
            blend_time: 0.0,
            loop_count: LoopCount::default(),
            inverse: false,
        }
    }
}

impl MotionPlaybackConfig {
    #[must_use]
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn with_blend_time(mut self, blend_time: f32) -> Self {
        self.blend_time = blend_time;
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_loop_count(mut self, loop_count: LoopCount) -> Self {
        self.loop_count = loop_count;
        self
    }

    #[must_use]
    pub fn looping(self) -> Self {
        self.with_loop_count(LoopCount::Infinite)
    }

    #[must_use]
    pub fn inverse(mut self, inverse: bool) -> Self {
        self.inverse = inverse;
        self
    }

    /// Clamps the config into its valid domain. A malformed blend time turns
    /// into an instant switch instead of an error.
    ///
    /// A negative or non-finite `speed` is replaced by `1.0` with a warning;
    /// reverse playback is requested through [`inverse`](Self::inverse), not
    /// through a negative speed.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let weight = if self.weight.is_nan() {
            0.0
        } else {
            self.weight.clamp(0.0, 1.0)
        };
        let blend_time = if self.blend_time.is_finite() && self.blend_time > 0.0 {
            self.blend_time
        } else {
            0.0
        };
        let speed = if self.speed.is_finite() && self.speed >= 0.0 {
            self.speed
        } else {
            log::warn!("Invalid playback speed {}, using 1.0", self.speed);
            1.0
        };

        Self {
            speed,
            weight,
            blend_time,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// No motion assigned.
    #[default]
    Idle,
    Playing,
    /// Delayed stop countdown; playback continues until it expires.
    Stopping,
}

/// Playback state machine for one motion assignment.
///
/// ```text
/// Idle --play--> Playing --stop--> Stopping --timer expired--> Idle
///                   \_______ end reached, no loops left ______/
/// ```
#[derive(Debug, Clone)]
pub struct MotionPlayer {
    motion: Option<MotionHandle>,
    play_time: f32,
    state: PlayerState,
    paused: bool,

    stop_timer: f32,
    stop_timer_target: f32,
    blend_elapsed: f32,
    // `None` means unlimited.
    loops_remaining: Option<u32>,

    config: MotionPlaybackConfig,
    recorder: MotionRecorder,
}

impl MotionPlayer {
    #[must_use]
    pub fn new(event_capacity: usize) -> Self {
        Self {
            motion: None,
            play_time: 0.0,
            state: PlayerState::Idle,
            paused: false,
            stop_timer: 0.0,
            stop_timer_target: 0.0,
            blend_elapsed: 0.0,
            loops_remaining: None,
            config: MotionPlaybackConfig::default(),
            recorder: MotionRecorder::new(event_capacity),
        }
    }

    /// Starts `motion` from its beginning, releasing whatever was playing.
    ///
    /// `config.blend_time` is used as given; callers that cross-fade from
    /// another player pass the already capped duration.
    pub fn play(&mut self, motion: MotionHandle, config: MotionPlaybackConfig) {
        let config = config.sanitized();

        self.play_time = motion.start_time();
        self.recorder.prepare(motion.tracks().len());
        self.loops_remaining = match config.loop_count {
            LoopCount::Finite(n) => Some(n.max(1) - 1),
            LoopCount::Infinite => None,
        };
        self.motion = Some(motion);
        self.state = PlayerState::Playing;
        self.paused = false;
        self.stop_timer = 0.0;
        self.stop_timer_target = 0.0;
        self.blend_elapsed = 0.0;
        self.config = config;
    }

    /// Schedules a hard stop `fade_time` seconds from now. The motion keeps
    /// playing at full weight until then.
    pub fn stop(&mut self, fade_time: f32) {
        if self.state == PlayerState::Idle {
            return;
        }
        self.state = PlayerState::Stopping;
        self.stop_timer = 0.0;
        self.stop_timer_target = if fade_time.is_nan() { 0.0 } else { fade_time };
    }

    /// Stops immediately and releases the motion.
    ///
    /// The recorder keeps its last poses and undrained events until the next
    /// `play`.
    pub fn reset(&mut self) {
        self.motion = None;
        self.state = PlayerState::Idle;
        self.play_time = 0.0;
        self.paused = false;
        self.stop_timer = 0.0;
        self.stop_timer_target = 0.0;
        self.blend_elapsed = 0.0;
        self.loops_remaining = None;
    }

    /// Advances playback by `dt` seconds and samples the motion.
    ///
    /// Returns whether the player is still playing. A player that ends during
    /// this call returns `false` and its sample for this frame is discarded.
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(motion) = self.motion.as_ref().map(Arc::clone) else {
            return false;
        };

        if self.paused {
            return true;
        }

        if self.state == PlayerState::Stopping {
            self.stop_timer += dt;
            if self.stop_timer >= self.stop_timer_target {
                log::trace!("Motion '{}' stopped after {:.3}s fade", motion.name, self.stop_timer);
                self.reset();
                return false;
            }
        }

        if self.play_time >= motion.end_time() {
            motion.flush_events(self.config.inverse, &mut self.recorder);

            let duration = motion.duration();
            let overshoot = self.play_time - motion.start_time();
            let passes = if duration > 0.0 {
                (overshoot / duration).floor().max(1.0)
            } else {
                0.0
            };

            if passes >= 1.0 && self.consume_loops(passes as u32) {
                if passes > 1.0 {
                    self.play_time = motion.start_time() + overshoot.rem_euclid(duration);
                } else {
                    self.play_time -= duration;
                }
                self.recorder.rewind();
                log::trace!("Motion '{}' wrapped to {:.3}s", motion.name, self.play_time);
            } else {
                log::trace!("Motion '{}' finished", motion.name);
                self.reset();
                return false;
            }
        }

        if self.blend_weight() != 0.0 {
            motion.sample(self.play_time, self.config.inverse, &mut self.recorder);
        }

        if self.config.blend_time > 0.0 && self.blend_elapsed <= self.config.blend_time {
            self.blend_elapsed += dt;
        }

        self.play_time += dt * self.config.speed;
        true
    }

    fn consume_loops(&mut self, passes: u32) -> bool {
        match &mut self.loops_remaining {
            None => true,
            Some(remaining) if *remaining >= passes => {
                *remaining -= passes;
                true
            }
            Some(_) => false,
        }
    }

    /// Current contribution of this player: ramps linearly from 0 to
    /// `config.weight` over `config.blend_time`, then holds.
    #[must_use]
    pub fn blend_weight(&self) -> f32 {
        let blend_time = self.config.blend_time;
        if blend_time > 0.0 && self.blend_elapsed <= blend_time {
            (self.blend_elapsed / blend_time) * self.config.weight
        } else {
            self.config.weight
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// `true` while a motion is assigned, including during a delayed stop.
    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state != PlayerState::Idle
    }

    #[inline]
    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.state == PlayerState::Stopping
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freezes playback without releasing the motion. Has no effect on an
    /// idle player.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused && self.is_playing();
    }

    #[inline]
    #[must_use]
    pub fn play_time(&self) -> f32 {
        self.play_time
    }

    /// Seconds left in the current pass, `None` when idle.
    #[must_use]
    pub fn remaining_time(&self) -> Option<f32> {
        let motion = self.motion.as_ref()?;
        Some((motion.end_time() - self.play_time).max(0.0))
    }

    #[inline]
    #[must_use]
    pub fn motion(&self) -> Option<&MotionHandle> {
        self.motion.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &MotionPlaybackConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn blend_elapsed(&self) -> f32 {
        self.blend_elapsed
    }

    #[inline]
    #[must_use]
    pub fn recorder(&self) -> &MotionRecorder {
        &self.recorder
    }

    /// Removes and returns the oldest motion event this player crossed.
    pub fn pop_event(&mut self) -> Option<MotionEvent> {
        self.recorder.pop_event()
    }

    pub fn pending_events(&self) -> impl ExactSizeIterator<Item = &MotionEvent> {
        self.recorder.pending_events()
    }
}

impl Default for MotionPlayer {
    fn default() -> Self {
        Self::new(marionette_core::MotionSettings::default().event_queue_capacity)
    }
}

//! Layered motion playback.
//!
//! A [`MotionSystem`] owns one player pair per [`MotionLayer`] and turns their
//! sampled poses into a single pose for a [`SkeletonInstance`] each frame:
//!
//! 1. Every layer's primary player advances; the outgoing player advances too
//!    while the primary contributes.
//! 2. When nothing plays any more, the bind pose is restored once.
//! 3. Layers blend into an accumulation buffer in priority order; later layers
//!    override the bones they touch.
//! 4. The buffer is bound into the instance's motion matrices.

use std::sync::Arc;

use marionette_core::{MotionSettings, Transform};
use serde::{Deserialize, Serialize};

use crate::cache::MotionCache;
use crate::instance::SkeletonInstance;
use crate::motion::{MotionEvent, MotionHandle};
use crate::player::{MotionPlaybackConfig, MotionPlayer};
use crate::skeleton::Skeleton;

/// Animation slots, in blend priority order (lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MotionLayer {
    /// Full-body locomotion.
    Base,
    Lower,
    Upper,
    /// Gestures and facial motions that override everything else.
    Overlay,
}

impl MotionLayer {
    pub const COUNT: usize = 4;

    /// Every layer in blend order.
    pub const ALL: [Self; Self::COUNT] = [Self::Base, Self::Lower, Self::Upper, Self::Overlay];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// The player pair of one layer.
///
/// `outgoing` holds the previous primary while a new motion blends in.
#[derive(Debug, Clone)]
struct Layer {
    primary: MotionPlayer,
    outgoing: MotionPlayer,
}

impl Layer {
    fn new(event_capacity: usize) -> Self {
        Self {
            primary: MotionPlayer::new(event_capacity),
            outgoing: MotionPlayer::new(event_capacity),
        }
    }
}

pub struct MotionSystem {
    skeleton: Arc<Skeleton>,
    settings: MotionSettings,
    layers: [Layer; MotionLayer::COUNT],
    // One parent-relative transform per skeleton bone.
    pose: Vec<Transform>,
}

impl MotionSystem {
    #[must_use]
    pub fn new(skeleton: Arc<Skeleton>, settings: MotionSettings) -> Self {
        let capacity = settings.event_queue_capacity;
        let pose = skeleton.bind_pose().collect();

        Self {
            skeleton,
            layers: std::array::from_fn(|_| Layer::new(capacity)),
            settings,
            pose,
        }
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Starts `motion` on `layer`.
    ///
    /// When the layer is already playing and `config.blend_time > 0`, the
    /// current motion moves to the outgoing slot and keeps animating while the
    /// new one ramps in. The blend never lasts longer than the outgoing motion
    /// has left. Passing `None` is a no-op.
    pub fn play(
        &mut self,
        layer: MotionLayer,
        motion: impl Into<Option<MotionHandle>>,
        config: MotionPlaybackConfig,
    ) {
        let Some(motion) = motion.into() else {
            log::warn!("play({layer:?}) called without a motion, ignoring");
            return;
        };

        let slot = &mut self.layers[layer.index()];
        let config = config.sanitized();

        if slot.primary.is_playing() && config.blend_time > 0.0 {
            let remaining = slot.primary.remaining_time().unwrap_or(0.0);
            let blend_time = config.blend_time.min(remaining);

            log::debug!(
                "{layer:?}: blending to '{}' over {blend_time:.3}s (requested {:.3}s)",
                motion.name,
                config.blend_time
            );

            // The old primary keeps its play position in the outgoing slot; the
            // previous outgoing player is recycled as the new primary.
            std::mem::swap(&mut slot.primary, &mut slot.outgoing);
            slot.primary.play(
                motion,
                MotionPlaybackConfig {
                    blend_time,
                    ..config
                },
            );
        } else {
            log::debug!("{layer:?}: playing '{}'", motion.name);
            slot.primary.play(motion, config);
        }
    }

    /// Resolves `name` in `cache` and plays it. Returns `false` when the cache
    /// has no such motion.
    pub fn play_named(
        &mut self,
        layer: MotionLayer,
        cache: &MotionCache,
        name: &str,
        config: MotionPlaybackConfig,
    ) -> bool {
        let Some(motion) = cache.get_by_name(name) else {
            log::warn!("{layer:?}: motion '{name}' not found in cache");
            return false;
        };
        self.play(layer, motion, config);
        true
    }

    /// Schedules a delayed hard stop of both players of `layer`.
    pub fn stop(&mut self, layer: MotionLayer, fade_time: f32) {
        log::debug!("{layer:?}: stop in {fade_time:.3}s");
        let slot = &mut self.layers[layer.index()];
        slot.primary.stop(fade_time);
        slot.outgoing.stop(fade_time);
    }

    /// Stops `layer` immediately, releasing its motions.
    pub fn reset(&mut self, layer: MotionLayer) {
        let slot = &mut self.layers[layer.index()];
        slot.primary.reset();
        slot.outgoing.reset();
    }

    pub fn reset_all(&mut self) {
        for layer in MotionLayer::ALL {
            self.reset(layer);
        }
    }

    pub fn set_paused(&mut self, layer: MotionLayer, paused: bool) {
        let slot = &mut self.layers[layer.index()];
        slot.primary.set_paused(paused);
        slot.outgoing.set_paused(paused);
    }

    // ========================================================================
    // Frame Update
    // ========================================================================

    /// Advances every layer by `dt` seconds and writes the blended pose into
    /// `instance`. Returns whether any motion played this frame.
    pub fn update(&mut self, dt: f32, instance: &mut SkeletonInstance) -> bool {
        let mut any_motion_updated = false;

        for slot in &mut self.layers {
            if slot.primary.update(dt) {
                any_motion_updated = true;
                if slot.primary.blend_weight() != 0.0 && slot.outgoing.update(dt) {
                    any_motion_updated = true;
                }
            }
        }

        self.set_identity(any_motion_updated, instance);

        if any_motion_updated {
            for slot in &self.layers {
                blend_layer(&self.skeleton, &mut self.pose, &slot.primary, &slot.outgoing);
            }
            self.bind(instance);
        }

        any_motion_updated
    }

    /// Falls back to the bind pose on the first idle frame after animating.
    fn set_identity(&mut self, any_motion_updated: bool, instance: &mut SkeletonInstance) {
        if any_motion_updated || !instance.is_dirty() || !self.settings.bind_pose_fallback {
            return;
        }

        log::debug!("All layers idle, restoring bind pose of '{}'", self.skeleton.name);
        for (pose, bind) in self.pose.iter_mut().zip(self.skeleton.bind_pose()) {
            *pose = bind;
        }
        instance.set_identity();
    }

    fn bind(&self, instance: &mut SkeletonInstance) {
        if instance.bone_count() != self.pose.len() {
            log::warn!(
                "Binding a {}-bone pose to an instance with {} bones",
                self.pose.len(),
                instance.bone_count()
            );
        }
        instance.bind_pose(&self.pose);
        instance.set_dirty();
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// The primary player of `layer`.
    #[inline]
    #[must_use]
    pub fn player(&self, layer: MotionLayer) -> &MotionPlayer {
        &self.layers[layer.index()].primary
    }

    /// The player fading out of `layer` during a blend.
    #[inline]
    #[must_use]
    pub fn outgoing_player(&self, layer: MotionLayer) -> &MotionPlayer {
        &self.layers[layer.index()].outgoing
    }

    /// Drains one event from `layer`.
    ///
    /// The outgoing player is drained first: it holds the events of the
    /// motion that was playing before the current one, including those it
    /// crosses while fading out.
    pub fn pop_event(&mut self, layer: MotionLayer) -> Option<MotionEvent> {
        let slot = &mut self.layers[layer.index()];
        slot.outgoing.pop_event().or_else(|| slot.primary.pop_event())
    }

    /// Whether any player of any layer still holds a motion, outgoing
    /// players included.
    #[must_use]
    pub fn is_any_playing(&self) -> bool {
        self.layers
            .iter()
            .any(|l| l.primary.is_playing() || l.outgoing.is_playing())
    }

    /// The last blended pose, one parent-relative transform per bone.
    #[inline]
    #[must_use]
    pub fn pose(&self) -> &[Transform] {
        &self.pose
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }
}

/// Blends one layer into `pose`.
///
/// With an active outgoing player each bone is blended twice in sequence:
/// first toward the outgoing sample, then toward the primary sample, both
/// by the primary's weight. This is not a normalized three-way blend.
fn blend_layer(
    skeleton: &Skeleton,
    pose: &mut [Transform],
    primary: &MotionPlayer,
    outgoing: &MotionPlayer,
) {
    if !primary.is_playing() {
        return;
    }
    let weight = primary.blend_weight();
    if weight == 0.0 {
        return;
    }

    let enable_outgoing_blend = (1.0 - weight) != 0.0 && outgoing.is_playing();
    let incoming = primary.recorder();

    if enable_outgoing_blend {
        let fading = outgoing.recorder();
        for (bone, from) in fading.iter() {
            let Some(index) = skeleton.bone_index(bone) else {
                continue;
            };
            let blended = pose[index].lerp(from, weight);
            pose[index] = match incoming.get(bone) {
                Some(to) => blended.lerp(to, weight),
                None => blended,
            };
        }
    }

    for (bone, to) in incoming.iter() {
        if enable_outgoing_blend && outgoing.recorder().get(bone).is_some() {
            continue;
        }
        let Some(index) = skeleton.bone_index(bone) else {
            continue;
        };
        pose[index] = pose[index].lerp(to, weight);
    }
}

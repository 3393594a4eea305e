//! # Marionette
//!
//! Layered skeletal motion playback and blending.
//!
//! Every frame, a [`MotionSystem`] advances up to four prioritized layers of
//! motions, blends their sampled poses and writes the result into a
//! [`SkeletonInstance`], from which renderers and physics read global bone
//! matrices.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use marionette::prelude::*;
//!
//! let mut system = MotionSystem::new(Arc::clone(&skeleton), MotionSettings::default());
//! let mut instance = SkeletonInstance::new(skeleton);
//!
//! system.play(
//!     MotionLayer::Base,
//!     walk,
//!     MotionPlaybackConfig::default().with_weight(1.0).looping(),
//! );
//!
//! // once per frame
//! system.update(dt, &mut instance);
//! let hand = instance.global_matrix(hand_index)?;
//! ```

pub use marionette_core::{BoneName, MarionetteError, MotionSettings, Result, Transform};
pub use marionette_motion::{
    Bone, BoneNode, BoneTrack, InterpolationMode, KeyframeTrack, LoopCount, Motion, MotionCache,
    MotionEvent, MotionHandle, MotionKey, MotionLayer, MotionPlaybackConfig, MotionPlayer,
    MotionRecorder, MotionSystem, PlayerState, Skeleton, SkeletonInstance,
};

pub mod prelude {
    pub use marionette_core::{MarionetteError, MotionSettings, Result, Transform};
    pub use marionette_motion::{
        Bone, BoneTrack, InterpolationMode, KeyframeTrack, LoopCount, Motion, MotionCache,
        MotionEvent, MotionHandle, MotionLayer, MotionPlaybackConfig, MotionSystem,
        SkeletonInstance, Skeleton,
    };
}

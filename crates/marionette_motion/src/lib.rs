//! Skeletal motion playback and blending.
//!
//! - [`Skeleton`]: shared bind-pose hierarchy
//! - [`Motion`]: immutable clip of per-bone keyframe tracks and timeline events
//! - [`MotionPlayer`]: playback state machine for one clip (loop, delayed stop,
//!   blend-in ramp)
//! - [`MotionSystem`]: prioritized layers blended into one pose
//! - [`SkeletonInstance`]: per-entity bone matrices
//! - [`MotionCache`]: shared motion store with delayed eviction

pub mod cache;
pub mod instance;
pub mod motion;
pub mod player;
pub mod recorder;
pub mod skeleton;
pub mod system;
pub mod tracks;
pub mod values;

pub use cache::{MotionCache, MotionKey};
pub use instance::{BoneNode, SkeletonInstance};
pub use motion::{BoneTrack, Motion, MotionEvent, MotionHandle};
pub use player::{LoopCount, MotionPlaybackConfig, MotionPlayer, PlayerState};
pub use recorder::MotionRecorder;
pub use skeleton::{Bone, Skeleton};
pub use system::{MotionLayer, MotionSystem};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;

//! Motion System Settings
//!
//! Engine-level knobs shared by every [`MotionSystem`] and the motion cache.
//! Settings are plain data and can be authored as JSON; missing fields fall
//! back to their defaults.
//!
//! ```rust,ignore
//! use marionette_core::settings::MotionSettings;
//!
//! let settings = MotionSettings::from_json(r#"{ "event_queue_capacity": 8 }"#)?;
//! assert!(settings.bind_pose_fallback);
//! ```
//!
//! [`MotionSystem`]: ../../marionette_motion/system/struct.MotionSystem.html

use serde::{Deserialize, Serialize};

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Maximum number of undrained events a player keeps. When full, the
    /// oldest event is dropped.
    pub event_queue_capacity: usize,

    /// Restore the bind pose once when every layer has gone idle.
    pub bind_pose_fallback: bool,

    /// Seconds an unreferenced motion stays resident in the motion cache
    /// before it is evicted.
    pub motion_grace_period: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            event_queue_capacity: 32,
            bind_pose_fallback: true,
            motion_grace_period: 5.0,
        }
    }
}

impl MotionSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        log::debug!("Loaded motion settings: {settings:?}");
        Ok(settings)
    }
}

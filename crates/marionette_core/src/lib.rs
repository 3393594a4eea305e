//! Core types shared by the Marionette crates.
//!
//! - [`Transform`]: the scale/rotation/translation value every track and pose uses
//! - [`errors`]: [`MarionetteError`] and the [`Result`] alias
//! - [`interner`]: interned [`BoneName`] symbols
//! - [`settings`]: [`MotionSettings`]

pub mod errors;
pub mod interner;
pub mod settings;
pub mod transform;

pub use errors::{MarionetteError, Result};
pub use interner::BoneName;
pub use settings::MotionSettings;
pub use transform::Transform;

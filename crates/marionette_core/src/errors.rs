//! Error Types
//!
//! This module defines the error type shared by the Marionette crates.
//!
//! # Overview
//!
//! [`MarionetteError`] covers the construction-time failures of the motion
//! system:
//! - Invalid arguments (out-of-range bone indices, malformed keyframes)
//! - Skeleton hierarchy violations
//! - Configuration parsing errors
//!
//! Per-frame playback never fails: missing motions and unknown bones are
//! logged and skipped instead of being reported through [`Result`].
//!
//! ```rust,ignore
//! use marionette_core::errors::{MarionetteError, Result};
//!
//! fn pick_bone(count: usize, index: usize) -> Result<usize> {
//!     if index >= count {
//!         return Err(MarionetteError::bone_out_of_range(index, count));
//!     }
//!     Ok(index)
//! }
//! ```

use thiserror::Error;

/// The main error type for the Marionette motion system.
#[derive(Error, Debug)]
pub enum MarionetteError {
    // ========================================================================
    // Argument Errors
    // ========================================================================
    /// An argument was outside of its valid domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A bone declares a parent that does not precede it.
    #[error("Invalid hierarchy: bone {bone} has parent {parent}, parents must precede their children")]
    InvalidHierarchy {
        /// Index of the offending bone
        bone: usize,
        /// The parent index it declared
        parent: usize,
    },

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// A keyframe track contains no keys.
    #[error("Keyframe track is empty: {0}")]
    EmptyTrack(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings could not be parsed.
    #[error("Settings parse error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl MarionetteError {
    /// Shorthand for the bounds-check failure raised by bone accessors.
    #[must_use]
    pub fn bone_out_of_range(index: usize, count: usize) -> Self {
        Self::InvalidArgument(format!("bone index {index} out of range (bone count: {count})"))
    }
}

/// Alias for `Result<T, MarionetteError>`.
pub type Result<T> = std::result::Result<T, MarionetteError>;

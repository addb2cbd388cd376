//! Error types for clip registration and configuration.
//!
//! The tick path never produces errors: every check happens when a set is
//! built, so a running scheduler is a pure function of elapsed time.

use serde::{Deserialize, Serialize};

/// Errors raised while validating clips, sets and renderer inputs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ClipError {
    /// Duration must be positive and finite
    #[error("Clip '{id}' has invalid duration: {duration_ms} ms")]
    InvalidDuration { id: String, duration_ms: f64 },

    /// Delay must be non-negative and finite
    #[error("Clip '{id}' has invalid delay: {delay_ms} ms")]
    InvalidDelay { id: String, delay_ms: f64 },

    /// Clip ids must be unique within a set
    #[error("Duplicate clip id: {id}")]
    DuplicateClip { id: String },

    /// Clip id must not be empty
    #[error("Clip id must not be empty")]
    EmptyClipId,

    /// Target frame rate must be positive and finite
    #[error("Invalid target frame rate: {fps}")]
    InvalidFrameRate { fps: f64 },

    /// Sprite sheet geometry is unusable
    #[error("Invalid sprite sheet: {reason}")]
    InvalidSpriteSheet { reason: String },

    /// A scene oscillator points outside the parameter buffer
    #[error("Oscillator '{id}' targets slot {slot} but the buffer holds {len} values")]
    InvalidSlot { id: String, slot: usize, len: usize },

    /// Clip definition could not be parsed
    #[error("Parse error: {reason}")]
    Parse { reason: String },
}

impl ClipError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidDuration { .. }
            | Self::InvalidDelay { .. }
            | Self::DuplicateClip { .. }
            | Self::EmptyClipId => "clip",
            Self::InvalidFrameRate { .. } => "config",
            Self::InvalidSpriteSheet { .. } | Self::InvalidSlot { .. } => "renderer",
            Self::Parse { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for ClipError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}

//! Scheduler configuration.

use serde::{Deserialize, Serialize};

use crate::error::ClipError;

fn default_target_fps() -> f64 {
    60.0
}

/// Frame-rate settings for one animation set. The frame interval is derived
/// from `target_fps` once, when the set is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Processed ticks per second. Pump callbacks arriving faster are skipped.
    #[serde(default = "default_target_fps", alias = "fps")]
    pub target_fps: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
        }
    }
}

impl SchedulerConfig {
    /// Full display rate on common 60 Hz screens.
    pub fn smooth() -> Self {
        Self { target_fps: 60.0 }
    }

    /// Film-like cadence used by sprite sheets drawn at 24 frames per second.
    pub fn cinematic() -> Self {
        Self { target_fps: 24.0 }
    }

    /// Half rate for background scenes.
    pub fn low_power() -> Self {
        Self { target_fps: 30.0 }
    }

    /// Set target frame rate
    #[inline]
    pub fn with_target_fps(mut self, fps: f64) -> Self {
        self.target_fps = fps;
        self
    }

    /// Minimum spacing between processed ticks, `1000 / fps`.
    #[inline]
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ClipError> {
        if self.target_fps <= 0.0 || !self.target_fps.is_finite() {
            return Err(ClipError::InvalidFrameRate {
                fps: self.target_fps,
            });
        }
        Ok(())
    }
}

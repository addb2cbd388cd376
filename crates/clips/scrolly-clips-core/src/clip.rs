//! Clip definitions, update strategies and per-run state.
//!
//! A [`ClipSpec`] is plain data and may be shared by several sets. Whatever
//! changes while a set runs (the completion flag) lives in [`ClipRunState`],
//! owned by the set next to the spec.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::error::ClipError;

fn default_finite() -> bool {
    true
}

/// Declarative description of one timed effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Unique within the owning set.
    pub id: String,
    /// Length of one playthrough.
    pub duration_ms: f64,
    /// Offset from the set's start before the clip becomes active.
    #[serde(default)]
    pub delay_ms: f64,
    /// Finite clips play once and hold at 1; looping clips wrap back to 0.
    #[serde(default = "default_finite")]
    pub finite: bool,
}

impl ClipSpec {
    /// A clip that plays once.
    pub fn once(id: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            id: id.into(),
            duration_ms,
            delay_ms: 0.0,
            finite: true,
        }
    }

    /// A clip that repeats until the set stops.
    pub fn looping(id: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            id: id.into(),
            duration_ms,
            delay_ms: 0.0,
            finite: false,
        }
    }

    #[inline]
    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Wall-clock instant at which the clip becomes active for a run started at `start_ms`.
    #[inline]
    pub fn active_from(&self, start_ms: f64) -> f64 {
        start_ms + self.delay_ms
    }

    /// Check the clip against the registration contract.
    pub fn validate(&self) -> Result<(), ClipError> {
        if self.id.is_empty() {
            return Err(ClipError::EmptyClipId);
        }
        if self.duration_ms <= 0.0 || !self.duration_ms.is_finite() {
            return Err(ClipError::InvalidDuration {
                id: self.id.clone(),
                duration_ms: self.duration_ms,
            });
        }
        if self.delay_ms < 0.0 || !self.delay_ms.is_finite() {
            return Err(ClipError::InvalidDelay {
                id: self.id.clone(),
                delay_ms: self.delay_ms,
            });
        }
        Ok(())
    }

    /// Where this clip stands at `now` for a run that started at `start_ms`.
    ///
    /// Progress is recomputed from absolute time on every call, so dropped
    /// frames never accumulate error. A finite clip is finished from the
    /// first instant its active time reaches the full duration.
    pub fn phase_at(&self, start_ms: f64, now: f64) -> ClipPhase {
        let active_from = self.active_from(start_ms);
        if now < active_from {
            return ClipPhase::Delayed;
        }
        if self.finite && now >= active_from + self.duration_ms {
            return ClipPhase::Finished;
        }
        let raw = (now - active_from) / self.duration_ms;
        if self.finite {
            ClipPhase::Active(raw)
        } else {
            ClipPhase::Active(raw - raw.floor())
        }
    }
}

/// Result of [`ClipSpec::phase_at`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipPhase {
    Delayed,
    Active(f64),
    Finished,
}

/// Renderer-specific strategy invoked by the scheduler.
///
/// `update` receives progress in `[0, 1]` for finite clips and `[0, 1)` for
/// looping clips. It runs on the painting thread and must not block.
pub trait ClipUpdate {
    fn update(&mut self, progress: f64);

    /// Drive the target back to its canonical rest state. Called on stop.
    fn rest(&mut self) {}
}

impl<F: FnMut(f64)> ClipUpdate for F {
    fn update(&mut self, progress: f64) {
        self(progress)
    }
}

/// Pairs an update closure with a rest closure.
pub struct WithRest<U, R> {
    update: U,
    rest: R,
}

impl<U, R> WithRest<U, R>
where
    U: FnMut(f64),
    R: FnMut(),
{
    pub fn new(update: U, rest: R) -> Self {
        Self { update, rest }
    }
}

impl<U, R> ClipUpdate for WithRest<U, R>
where
    U: FnMut(f64),
    R: FnMut(),
{
    fn update(&mut self, progress: f64) {
        (self.update)(progress)
    }

    fn rest(&mut self) {
        (self.rest)()
    }
}

/// Scheduler-owned, per-run state for one clip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipRunState {
    /// The completion snap has been delivered during this run.
    pub fired: bool,
}

impl ClipRunState {
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Serialized shape of a whole set: frame rate plus clip list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SetDefinition {
    #[serde(flatten)]
    pub config: SchedulerConfig,
    #[serde(default)]
    pub clips: Vec<ClipSpec>,
}

impl SetDefinition {
    /// Validate the frame rate, every clip, and id uniqueness.
    pub fn validate(&self) -> Result<(), ClipError> {
        self.config.validate()?;
        validate_clips(&self.clips)
    }
}

/// Validate every clip and reject duplicate ids.
pub fn validate_clips<'a>(clips: impl IntoIterator<Item = &'a ClipSpec>) -> Result<(), ClipError> {
    let mut seen = HashSet::new();
    for clip in clips {
        clip.validate()?;
        if !seen.insert(clip.id.as_str()) {
            return Err(ClipError::DuplicateClip {
                id: clip.id.clone(),
            });
        }
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDefinition {
    List(Vec<ClipSpec>),
    Set(SetDefinition),
}

/// Parse a clip set from JSON.
///
/// Accepts either a bare array of clips (default frame rate) or an object
/// `{ "fps": 30, "clips": [...] }`. The result is validated.
pub fn parse_clip_specs_json(s: &str) -> Result<SetDefinition, ClipError> {
    let raw: RawDefinition = serde_json::from_str(s)?;
    let def = match raw {
        RawDefinition::List(clips) => SetDefinition {
            config: SchedulerConfig::default(),
            clips,
        },
        RawDefinition::Set(def) => def,
    };
    def.validate()?;
    Ok(def)
}

//! Renderer adapters built on [`AnimationSet`].
//!
//! Each adapter owns one set and drives its target through a small trait.
//! A component whose target is absent at construction degrades to a no-op:
//! start, stop and tick do nothing and nothing is ever scheduled. Its inputs
//! are still validated.

pub mod countdown;
pub mod counter;
pub mod scene;
pub mod sprite;

pub use countdown::{format_mm_ss, CountdownSpec, CountdownTimer, TimerDisplay};
pub use counter::{CounterAnimation, CounterDisplay, CounterSpec};
pub use scene::{OscillationBuffer, Oscillator, SceneAnimation, SceneTarget};
pub use sprite::{SourceRect, SpriteAnimation, SpriteClip, SpriteSheet, SpriteSurface};

use log::debug;

use crate::clip::{validate_clips, ClipSpec};
use crate::config::SchedulerConfig;
use crate::error::ClipError;
use crate::outputs::TickReport;
use crate::set::AnimationSet;

/// Checks shared by every adapter, run whether or not the target exists.
pub(crate) fn validate_inputs<'a>(
    config: &SchedulerConfig,
    clips: impl IntoIterator<Item = &'a ClipSpec>,
) -> Result<(), ClipError> {
    config.validate()?;
    validate_clips(clips)
}

/// A set that may be absent because its render target was missing.
#[derive(Debug)]
pub struct MountedSet {
    label: &'static str,
    set: Option<AnimationSet>,
}

impl MountedSet {
    pub fn mounted(label: &'static str, set: AnimationSet) -> Self {
        Self {
            label,
            set: Some(set),
        }
    }

    pub fn detached(label: &'static str) -> Self {
        debug!("{label}: render target missing; animation disabled");
        Self { label, set: None }
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.set.is_some()
    }

    pub fn start(&mut self, now: f64) {
        if let Some(set) = self.set.as_mut() {
            set.start(now);
        }
    }

    pub fn start_now(&mut self) {
        if let Some(set) = self.set.as_mut() {
            set.start_now();
        }
    }

    pub fn stop(&mut self) {
        if let Some(set) = self.set.as_mut() {
            set.stop();
        }
    }

    pub fn tick(&mut self, now: f64) -> Option<TickReport> {
        self.set.as_mut().map(|set| set.tick(now))
    }

    pub fn is_running(&self) -> bool {
        self.set.as_ref().is_some_and(AnimationSet::is_running)
    }

    pub fn set(&self) -> Option<&AnimationSet> {
        self.set.as_ref()
    }

    /// Hand the set over, e.g. to wrap it in a shared handle for a router.
    pub fn into_set(self) -> Option<AnimationSet> {
        self.set
    }
}

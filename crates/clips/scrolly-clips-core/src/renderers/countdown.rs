//! Game timer: a finite clip counting whole seconds down to zero.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clip::{ClipSpec, WithRest};
use crate::config::SchedulerConfig;
use crate::error::ClipError;
use crate::host::{Clock, FramePump};
use crate::outputs::TickReport;
use crate::renderers::{validate_inputs, MountedSet};
use crate::set::AnimationSet;

/// Remaining-time display.
pub trait TimerDisplay {
    fn show_remaining(&mut self, seconds: u32);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountdownSpec {
    pub id: String,
    pub seconds: u32,
    #[serde(default)]
    pub delay_ms: f64,
}

impl CountdownSpec {
    pub fn clip(&self) -> ClipSpec {
        ClipSpec::once(self.id.clone(), self.seconds as f64 * 1000.0).with_delay(self.delay_ms)
    }

    /// Whole seconds left at `progress`, rounded up so zero only shows at the end.
    pub fn remaining_at(&self, progress: f64) -> u32 {
        ((1.0 - progress.clamp(0.0, 1.0)) * self.seconds as f64).ceil() as u32
    }
}

/// `m:ss` text for a remaining-seconds value.
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug)]
pub struct CountdownTimer {
    mounted: MountedSet,
}

impl CountdownTimer {
    /// `on_expired` runs once per run, when the completion snap arrives.
    pub fn new<D>(
        display: Option<Rc<RefCell<D>>>,
        spec: CountdownSpec,
        mut on_expired: impl FnMut() + 'static,
        config: SchedulerConfig,
        clock: impl Clock + 'static,
        pump: impl FramePump + 'static,
    ) -> Result<Self, ClipError>
    where
        D: TimerDisplay + 'static,
    {
        let clip = spec.clip();
        validate_inputs(&config, [&clip])?;
        let Some(display) = display else {
            return Ok(Self {
                mounted: MountedSet::detached("countdown"),
            });
        };

        let rest_display = display.clone();
        let full = spec.seconds;
        let set = AnimationSet::builder(config)
            .clip(
                clip,
                WithRest::new(
                    move |progress: f64| {
                        display.borrow_mut().show_remaining(spec.remaining_at(progress));
                        // Only the completion snap delivers exactly 1.
                        if progress >= 1.0 {
                            on_expired();
                        }
                    },
                    move || rest_display.borrow_mut().show_remaining(full),
                ),
            )
            .build(clock, pump)?;

        Ok(Self {
            mounted: MountedSet::mounted("countdown", set),
        })
    }

    pub fn start(&mut self, now: f64) {
        self.mounted.start(now);
    }

    pub fn stop(&mut self) {
        self.mounted.stop();
    }

    pub fn tick(&mut self, now: f64) -> Option<TickReport> {
        self.mounted.tick(now)
    }

    pub fn is_running(&self) -> bool {
        self.mounted.is_running()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_mounted()
    }
}

//! Prize counter: counts from zero up to a maximum, resting at the maximum.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clip::{ClipSpec, WithRest};
use crate::config::SchedulerConfig;
use crate::easing::Easing;
use crate::error::ClipError;
use crate::host::{Clock, FramePump};
use crate::outputs::TickReport;
use crate::renderers::{validate_inputs, MountedSet};
use crate::set::AnimationSet;

/// Number display (a text node in the browser).
pub trait CounterDisplay {
    fn show(&mut self, value: u64);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterSpec {
    pub clip: ClipSpec,
    pub max: u64,
    #[serde(default)]
    pub easing: Easing,
}

impl CounterSpec {
    pub fn value_at(&self, progress: f64) -> u64 {
        (self.easing.apply(progress) * self.max as f64).round() as u64
    }
}

#[derive(Debug)]
pub struct CounterAnimation {
    mounted: MountedSet,
}

impl CounterAnimation {
    pub fn new<D>(
        display: Option<Rc<RefCell<D>>>,
        spec: CounterSpec,
        config: SchedulerConfig,
        clock: impl Clock + 'static,
        pump: impl FramePump + 'static,
    ) -> Result<Self, ClipError>
    where
        D: CounterDisplay + 'static,
    {
        validate_inputs(&config, [&spec.clip])?;
        let Some(display) = display else {
            return Ok(Self {
                mounted: MountedSet::detached("counter"),
            });
        };

        let rest_display = display.clone();
        let max = spec.max;
        let clip = spec.clip.clone();
        let set = AnimationSet::builder(config)
            .clip(
                clip,
                WithRest::new(
                    move |progress: f64| display.borrow_mut().show(spec.value_at(progress)),
                    move || rest_display.borrow_mut().show(max),
                ),
            )
            .build(clock, pump)?;

        Ok(Self {
            mounted: MountedSet::mounted("counter", set),
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

//! 3D scene parameter driver.
//!
//! Looping oscillators write into a shared parameter buffer (light
//! intensity, rig offsets, uniform values); after every processed frame the
//! scene target renders from the buffer. Stopping restores the documented
//! initial values so the next run begins from the same pose.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::clip::{ClipSpec, WithRest};
use crate::config::SchedulerConfig;
use crate::error::ClipError;
use crate::host::{Clock, FramePump};
use crate::outputs::TickReport;
use crate::renderers::{validate_inputs, MountedSet};
use crate::set::AnimationSet;

/// Parameter values plus the initial configuration they reset to.
#[derive(Clone, Debug, PartialEq)]
pub struct OscillationBuffer {
    initial: Vec<f64>,
    values: Vec<f64>,
}

impl OscillationBuffer {
    pub fn new(initial: Vec<f64>) -> Self {
        Self {
            values: initial.clone(),
            initial,
        }
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Out-of-range slots are ignored; oscillators are checked at construction.
    pub fn set(&mut self, slot: usize, value: f64) {
        if let Some(v) = self.values.get_mut(slot) {
            *v = value;
        }
    }

    pub fn reset(&mut self) {
        self.values.clone_from(&self.initial);
    }
}

/// A looping sine wave written into one buffer slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Oscillator {
    pub clip: ClipSpec,
    pub slot: usize,
    #[serde(default)]
    pub base: f64,
    pub amplitude: f64,
    /// Phase offset in cycles.
    #[serde(default)]
    pub phase: f64,
}

impl Oscillator {
    pub fn value_at(&self, progress: f64) -> f64 {
        self.base + self.amplitude * (TAU * (progress + self.phase)).sin()
    }
}

/// Consumer of the parameter buffer (the WebGL scene in the browser).
pub trait SceneTarget {
    fn render(&mut self, params: &[f64]);
}

/// Oscillators driving one scene.
#[derive(Debug)]
pub struct SceneAnimation {
    mounted: MountedSet,
    buffer: Rc<RefCell<OscillationBuffer>>,
}

impl SceneAnimation {
    pub fn new<T>(
        target: Option<Rc<RefCell<T>>>,
        initial: Vec<f64>,
        oscillators: Vec<Oscillator>,
        config: SchedulerConfig,
        clock: impl Clock + 'static,
        pump: impl FramePump + 'static,
    ) -> Result<Self, ClipError>
    where
        T: SceneTarget + 'static,
    {
        validate_inputs(&config, oscillators.iter().map(|o| &o.clip))?;
        let len = initial.len();
        if let Some(osc) = oscillators.iter().find(|o| o.slot >= len) {
            return Err(ClipError::InvalidSlot {
                id: osc.clip.id.clone(),
                slot: osc.slot,
                len,
            });
        }

        let buffer = Rc::new(RefCell::new(OscillationBuffer::new(initial)));
        let Some(target) = target else {
            return Ok(Self {
                mounted: MountedSet::detached("scene animation"),
                buffer,
            });
        };

        let (frame_buffer, frame_target) = (buffer.clone(), target.clone());
        let (rest_buffer, rest_target) = (buffer.clone(), target);
        let mut builder = AnimationSet::builder(config)
            .after_frame(move || frame_target.borrow_mut().render(frame_buffer.borrow().values()))
            .on_rest(move || rest_target.borrow_mut().render(rest_buffer.borrow().values()));

        for osc in oscillators {
            let (write, reset) = (buffer.clone(), buffer.clone());
            let spec = osc.clip.clone();
            builder = builder.clip(
                spec,
                WithRest::new(
                    move |progress: f64| write.borrow_mut().set(osc.slot, osc.value_at(progress)),
                    move || reset.borrow_mut().reset(),
                ),
            );
        }

        Ok(Self {
            mounted: MountedSet::mounted("scene animation", builder.build(clock, pump)?),
            buffer,
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

    /// Current parameter values.
    pub fn snapshot(&self) -> Vec<f64> {
        self.buffer.borrow().values().to_vec()
    }
}

//! Browser implementations of the scheduler's clock and frame pump.

use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Performance, Window};

use scrolly_clips_core::{Clock, FrameHandle, FramePump};

/// Shared slot for the frame callback. The pump borrows it to register the
/// next frame; the player fills it once the set exists.
pub(crate) type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `performance.now()`, falling back to `Date.now()` when the page has no
/// performance timeline.
pub(crate) struct PerformanceClock {
    performance: Option<Performance>,
}

impl PerformanceClock {
    pub(crate) fn new(window: &Window) -> Self {
        Self {
            performance: window.performance(),
        }
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(p) => p.now(),
            None => js_sys::Date::now(),
        }
    }
}

/// `requestAnimationFrame` / `cancelAnimationFrame` on one window.
pub(crate) struct RafPump {
    window: Window,
    slot: FrameSlot,
}

impl RafPump {
    pub(crate) fn new(window: Window, slot: FrameSlot) -> Self {
        Self { window, slot }
    }
}

impl FramePump for RafPump {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let slot = self.slot.borrow();
        let callback = slot.as_ref()?;
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => Some(FrameHandle(id as u64)),
            Err(err) => {
                warn!("requestAnimationFrame refused: {err:?}");
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0 as i32) {
            warn!("cancelAnimationFrame({}) failed: {err:?}", handle.0);
        }
    }
}

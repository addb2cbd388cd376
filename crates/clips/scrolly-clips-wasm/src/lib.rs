use js_sys::Function;
use log::{debug, error};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use scrolly_clips_core::{
    AnimationSet, ClipSpec, ClipUpdate, FrameStats, SchedulerConfig, SharedAnimationSet,
};

mod host;
mod logging;

use host::{FrameSlot, PerformanceClock, RafPump};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn call_hook(f: &Function, what: &str) {
    if let Err(err) = f.call0(&JsValue::UNDEFINED) {
        error!("{what} callback threw: {err:?}");
    }
}

/// JS `update(progress)` plus optional `rest()`.
struct JsClipUpdate {
    id: String,
    update: Function,
    rest: Option<Function>,
}

impl ClipUpdate for JsClipUpdate {
    fn update(&mut self, progress: f64) {
        let arg = JsValue::from_f64(progress);
        if let Err(err) = self.update.call1(&JsValue::UNDEFINED, &arg) {
            error!("clip '{}' update threw: {err:?}", self.id);
        }
    }

    fn rest(&mut self) {
        if let Some(rest) = &self.rest {
            if let Err(err) = rest.call0(&JsValue::UNDEFINED) {
                error!("clip '{}' rest threw: {err:?}", self.id);
            }
        }
    }
}

/// Collects clips and callbacks for one [`ClipPlayer`].
#[wasm_bindgen]
pub struct ClipPlayerBuilder {
    config: SchedulerConfig,
    clips: Vec<(ClipSpec, JsClipUpdate)>,
    rest: Vec<Function>,
    before_frame: Vec<Function>,
    after_frame: Vec<Function>,
}

#[wasm_bindgen]
impl ClipPlayerBuilder {
    /// Pass `{ target_fps }` (or `{ fps }`), or undefined/null for 60 fps.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ClipPlayerBuilder, JsError> {
        console_error_panic_hook::set_once();

        let config: SchedulerConfig = if jsvalue_is_undefined_or_null(&config) {
            SchedulerConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        Ok(ClipPlayerBuilder {
            config,
            clips: Vec::new(),
            rest: Vec::new(),
            before_frame: Vec::new(),
            after_frame: Vec::new(),
        })
    }

    /// Register a clip `{ id, duration_ms, delay_ms?, finite? }` with its
    /// `update(progress)` callback and an optional `rest()` callback.
    /// Validation happens in `build`.
    #[wasm_bindgen(js_name = add_clip)]
    pub fn add_clip(
        &mut self,
        spec: JsValue,
        update: Function,
        rest: Option<Function>,
    ) -> Result<(), JsError> {
        let spec: ClipSpec =
            swb::from_value(spec).map_err(|e| JsError::new(&format!("clip spec error: {e}")))?;
        let id = spec.id.clone();
        self.clips.push((spec, JsClipUpdate { id, update, rest }));
        Ok(())
    }

    /// Called on stop, after every clip's own rest callback.
    #[wasm_bindgen(js_name = on_rest)]
    pub fn on_rest(&mut self, f: Function) {
        self.rest.push(f);
    }

    /// Called before the first clip of every processed frame.
    #[wasm_bindgen(js_name = on_before_frame)]
    pub fn on_before_frame(&mut self, f: Function) {
        self.before_frame.push(f);
    }

    /// Called after the last clip of every processed frame.
    #[wasm_bindgen(js_name = on_after_frame)]
    pub fn on_after_frame(&mut self, f: Function) {
        self.after_frame.push(f);
    }

    /// Validate and assemble a stopped player. Without a `window` the player
    /// is inert: every method is accepted and nothing animates.
    pub fn build(self) -> Result<ClipPlayer, JsError> {
        let mut builder = AnimationSet::builder(self.config);
        for (spec, update) in self.clips {
            builder = builder.clip(spec, update);
        }
        for f in self.before_frame {
            builder = builder.before_frame(move || call_hook(&f, "before_frame"));
        }
        for f in self.after_frame {
            builder = builder.after_frame(move || call_hook(&f, "after_frame"));
        }
        for f in self.rest {
            builder = builder.on_rest(move || call_hook(&f, "rest"));
        }

        let Some(window) = web_sys::window() else {
            // Still validate so configuration mistakes surface the same way.
            builder
                .build(scrolly_clips_core::FixedClock(0.0), scrolly_clips_core::NullPump)
                .map_err(|e| JsError::new(&format!("clip set error: {e}")))?;
            debug!("no window; clip player is inert");
            return Ok(ClipPlayer { inner: None });
        };

        let slot: FrameSlot = Default::default();
        let set = builder
            .build(
                PerformanceClock::new(&window),
                RafPump::new(window, slot.clone()),
            )
            .map_err(|e| JsError::new(&format!("clip set error: {e}")))?;
        let shared = SharedAnimationSet::new(set);

        let weak = shared.downgrade();
        *slot.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |now: f64| {
            if let Some(set) = weak.upgrade() {
                set.tick(now);
            }
        }));

        Ok(ClipPlayer {
            inner: Some(Mounted {
                set: shared,
                _slot: slot,
            }),
        })
    }
}

struct Mounted {
    set: SharedAnimationSet,
    // Keeps the frame callback alive while a registration may be pending.
    _slot: FrameSlot,
}

/// One animation set driven by `requestAnimationFrame`.
#[wasm_bindgen]
pub struct ClipPlayer {
    inner: Option<Mounted>,
}

#[wasm_bindgen]
impl ClipPlayer {
    /// Start at `performance.now()`. Restarting a running player begins a
    /// fresh run.
    pub fn start(&self) {
        if let Some(m) = &self.inner {
            m.set.start_now();
        }
    }

    /// Start at an explicit timestamp in the `performance.now()` timebase.
    #[wasm_bindgen(js_name = start_at)]
    pub fn start_at(&self, now: f64) {
        if let Some(m) = &self.inner {
            m.set.start(now);
        }
    }

    /// Cancel the pending frame and restore every clip's rest state.
    pub fn stop(&self) {
        if let Some(m) = &self.inner {
            m.set.stop();
        }
    }

    /// Inside a clip callback this reports the state the frame started with;
    /// a `stop()` made there takes effect when the frame returns.
    #[wasm_bindgen(js_name = is_running)]
    pub fn is_running(&self) -> bool {
        self.inner.as_ref().is_some_and(|m| m.set.is_running())
    }

    /// Whether a window was available when the player was built.
    #[wasm_bindgen(js_name = is_mounted)]
    pub fn is_mounted(&self) -> bool {
        self.inner.is_some()
    }

    /// Frame counters as `{ pumped, processed, skipped, stale, completions, runs }`.
    pub fn stats(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.frame_stats()).map_err(|e| JsError::new(&format!("stats error: {e}")))
    }
}

impl ClipPlayer {
    /// Counters as a Rust value. Zeroed while a frame is in flight or when
    /// the player is inert.
    pub fn frame_stats(&self) -> FrameStats {
        self.inner
            .as_ref()
            .and_then(|m| m.set.with(|s| s.stats()))
            .unwrap_or_default()
    }
}

/// Route `log` records to the browser console at `level` (default "info").
#[wasm_bindgen(js_name = init_logging)]
pub fn init_logging(level: Option<String>) -> Result<(), JsError> {
    let filter = logging::parse_level(level.as_deref()).map_err(|e| JsError::new(&e))?;
    logging::install(filter);
    Ok(())
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}

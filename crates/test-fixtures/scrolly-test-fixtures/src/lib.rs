//! Test doubles and JSON fixtures shared by the workspace's integration tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use scrolly_clips_core::{Clock, FrameHandle, FrameHandleAllocator, FramePump};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "clip-sets")]
    clip_sets: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod clip_sets {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.clip_sets.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.clip_sets, "clip set", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.clip_sets, "clip set", name)?;
        load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.clip_sets, "clip set", name)?;
        Ok(resolve_path(rel))
    }
}

/// Clock whose time only moves when the test says so. Clones share time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) -> f64 {
        let now = self.now.get() + delta_ms;
        self.now.set(now);
        now
    }

    pub fn get(&self) -> f64 {
        self.now.get()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Debug, Default)]
struct PumpState {
    ids: FrameHandleAllocator,
    outstanding: Vec<FrameHandle>,
    requested: usize,
    cancelled: Vec<FrameHandle>,
    max_outstanding: usize,
    refuse: bool,
}

/// Frame pump that records registrations instead of waiting for a display.
/// Clones share state, so a test keeps one while the set owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualPump {
    state: Rc<RefCell<PumpState>>,
}

impl ManualPump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the outstanding registration as a display refresh would.
    /// Returns whether one was outstanding; the caller then ticks the set.
    pub fn fire(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let had = !state.outstanding.is_empty();
        state.outstanding.clear();
        had
    }

    /// Registrations not yet fired or cancelled.
    pub fn outstanding(&self) -> usize {
        self.state.borrow().outstanding.len()
    }

    /// Largest number of registrations ever outstanding at once.
    pub fn max_outstanding(&self) -> usize {
        self.state.borrow().max_outstanding
    }

    pub fn requested(&self) -> usize {
        self.state.borrow().requested
    }

    /// Registrations cancelled while still outstanding.
    pub fn cancelled(&self) -> Vec<FrameHandle> {
        self.state.borrow().cancelled.clone()
    }

    /// Make subsequent registrations fail, like a host without a display.
    pub fn refuse_registrations(&self, refuse: bool) {
        self.state.borrow_mut().refuse = refuse;
    }
}

impl FramePump for ManualPump {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let mut state = self.state.borrow_mut();
        if state.refuse {
            return None;
        }
        let handle = state.ids.alloc();
        state.outstanding.push(handle);
        state.requested += 1;
        state.max_outstanding = state.max_outstanding.max(state.outstanding.len());
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        let before = state.outstanding.len();
        state.outstanding.retain(|h| *h != handle);
        // Cancelling an already fired handle is a no-op.
        if state.outstanding.len() != before {
            state.cancelled.push(handle);
        }
    }
}

/// Records every progress value a clip receives.
#[derive(Clone, Debug, Default)]
pub struct ProgressLog {
    calls: Rc<RefCell<Vec<f64>>>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update closure that appends to this log.
    pub fn recorder(&self) -> impl FnMut(f64) + 'static {
        let calls = self.calls.clone();
        move |progress| calls.borrow_mut().push(progress)
    }

    pub fn calls(&self) -> Vec<f64> {
        self.calls.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

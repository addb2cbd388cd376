//! AnimationSet: one throttled frame loop driving an ordered list of clips.
//!
//! Methods:
//! - builder → clip / before_frame / after_frame / on_rest → build(clock, pump)
//! - start, start_now, stop, tick

use log::{debug, trace, warn};

use crate::clip::{validate_clips, ClipPhase, ClipRunState, ClipSpec, ClipUpdate, WithRest};
use crate::config::SchedulerConfig;
use crate::error::ClipError;
use crate::host::{Clock, FramePump};
use crate::ids::FrameHandle;
use crate::outputs::{FrameStats, TickReport};

type Hook = Box<dyn FnMut()>;

/// Immutable definition plus the scheduler-owned run state and strategy.
struct ClipSlot {
    spec: ClipSpec,
    update: Box<dyn ClipUpdate>,
    state: ClipRunState,
}

/// Set-level callbacks around processed ticks and on stop.
#[derive(Default)]
struct FrameHooks {
    before_frame: Vec<Hook>,
    after_frame: Vec<Hook>,
    rest: Vec<Hook>,
}

/// Timing of the current run. Absent while stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RunTiming {
    start_ms: f64,
    last_frame_ms: f64,
}

/// Collects clips and hooks; validation happens in [`AnimationSetBuilder::build`].
pub struct AnimationSetBuilder {
    config: SchedulerConfig,
    clips: Vec<ClipSlot>,
    hooks: FrameHooks,
}

impl AnimationSetBuilder {
    /// Register a clip. Insertion order is dispatch order.
    pub fn clip(mut self, spec: ClipSpec, update: impl ClipUpdate + 'static) -> Self {
        self.clips.push(ClipSlot {
            spec,
            update: Box::new(update),
            state: ClipRunState::default(),
        });
        self
    }

    /// Register a clip with a dedicated rest-state closure.
    pub fn clip_with_rest(
        self,
        spec: ClipSpec,
        update: impl FnMut(f64) + 'static,
        rest: impl FnMut() + 'static,
    ) -> Self {
        self.clip(spec, WithRest::new(update, rest))
    }

    /// Runs before the first clip of every processed tick.
    pub fn before_frame(mut self, hook: impl FnMut() + 'static) -> Self {
        self.hooks.before_frame.push(Box::new(hook));
        self
    }

    /// Runs after the last clip of every processed tick.
    pub fn after_frame(mut self, hook: impl FnMut() + 'static) -> Self {
        self.hooks.after_frame.push(Box::new(hook));
        self
    }

    /// Runs on stop, after every clip's own rest.
    pub fn on_rest(mut self, hook: impl FnMut() + 'static) -> Self {
        self.hooks.rest.push(Box::new(hook));
        self
    }

    /// Validate configuration and clips, then assemble a stopped set.
    pub fn build(
        self,
        clock: impl Clock + 'static,
        pump: impl FramePump + 'static,
    ) -> Result<AnimationSet, ClipError> {
        self.config.validate()?;
        validate_clips(self.clips.iter().map(|slot| &slot.spec))?;
        Ok(AnimationSet {
            frame_interval_ms: self.config.frame_interval_ms(),
            config: self.config,
            clock: Box::new(clock),
            pump: Box::new(pump),
            clips: self.clips,
            hooks: self.hooks,
            timing: None,
            pending: None,
            stats: FrameStats::default(),
        })
    }
}

/// The clip scheduler.
///
/// Single-threaded and driven by the host frame pump: every pump callback
/// must end in [`AnimationSet::tick`]. At most one pump registration is
/// outstanding at any time.
pub struct AnimationSet {
    config: SchedulerConfig,
    frame_interval_ms: f64,
    clock: Box<dyn Clock>,
    pump: Box<dyn FramePump>,
    clips: Vec<ClipSlot>,
    hooks: FrameHooks,
    timing: Option<RunTiming>,
    pending: Option<FrameHandle>,
    stats: FrameStats,
}

impl std::fmt::Debug for AnimationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationSet")
            .field("config", &self.config)
            .field("clips", &self.clip_ids().collect::<Vec<_>>())
            .field("timing", &self.timing)
            .field("pending", &self.pending)
            .field("stats", &self.stats)
            .finish()
    }
}

impl AnimationSet {
    pub fn builder(config: SchedulerConfig) -> AnimationSetBuilder {
        AnimationSetBuilder {
            config,
            clips: Vec::new(),
            hooks: FrameHooks::default(),
        }
    }

    /// Begin a fresh run at `now`. A running set is stopped first so the
    /// previous pump registration never survives.
    pub fn start(&mut self, now: f64) {
        if self.is_running() {
            debug!("animation set restarted while running; stopping previous run");
            self.stop();
        }
        for slot in &mut self.clips {
            slot.state.reset();
        }
        self.timing = Some(RunTiming {
            start_ms: now,
            last_frame_ms: now,
        });
        self.pending = self.pump.request_frame();
        self.stats.runs += 1;
        debug!(
            "animation set started at {now} ms ({} clips, {} fps)",
            self.clips.len(),
            self.config.target_fps
        );
    }

    /// Begin a fresh run at the injected clock's current time.
    pub fn start_now(&mut self) {
        let now = self.clock.now_ms();
        self.start(now);
    }

    /// Cancel the pending registration, drive every target to its rest
    /// state, and clear timing. Calling it on a stopped set does nothing.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.pump.cancel_frame(handle);
        }
        for slot in &mut self.clips {
            slot.update.rest();
        }
        for hook in &mut self.hooks.rest {
            hook();
        }
        self.timing = None;
        debug!("animation set stopped");
    }

    /// Per-frame entry point, invoked by the pump for the outstanding registration.
    pub fn tick(&mut self, now: f64) -> TickReport {
        let report = self.advance(now);
        self.stats.record(&report);
        report
    }

    fn advance(&mut self, now: f64) -> TickReport {
        let Some(timing) = self.timing else {
            warn!("frame callback at {now} ms reached a stopped animation set");
            return TickReport::idle();
        };

        let elapsed = now - timing.last_frame_ms;

        // Keep the pump firing every display frame, even for skipped work.
        // A manual tick leaves the previous registration live; drop it first.
        if let Some(previous) = self.pending.take() {
            self.pump.cancel_frame(previous);
        }
        self.pending = self.pump.request_frame();
        if self.pending.is_none() {
            warn!("frame pump refused registration; loop halts until the next start");
        }

        if elapsed <= self.frame_interval_ms {
            trace!("frame skipped: {elapsed:.3} ms since last processed tick");
            return TickReport::skipped();
        }

        // Late frames stay on the start-aligned cadence.
        self.timing = Some(RunTiming {
            start_ms: timing.start_ms,
            last_frame_ms: now - (elapsed % self.frame_interval_ms),
        });

        self.process(timing.start_ms, now)
    }

    fn process(&mut self, start_ms: f64, now: f64) -> TickReport {
        let mut report = TickReport::processed();

        for hook in &mut self.hooks.before_frame {
            hook();
        }

        for slot in &mut self.clips {
            match slot.spec.phase_at(start_ms, now) {
                ClipPhase::Delayed => {}
                ClipPhase::Finished if slot.state.fired => {}
                ClipPhase::Finished => {
                    slot.state.fired = true;
                    slot.update.update(1.0);
                    report.dispatched += 1;
                    report.completed.push(slot.spec.id.clone());
                }
                ClipPhase::Active(progress) => {
                    slot.update.update(progress);
                    report.dispatched += 1;
                }
            }
        }

        for hook in &mut self.hooks.after_frame {
            hook();
        }

        trace!(
            "frame processed at {now} ms: {} updates, {} completed",
            report.dispatched,
            report.completed.len()
        );
        report
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.timing.is_some()
    }

    /// Start of the current run, `None` while stopped.
    #[inline]
    pub fn start_time_ms(&self) -> Option<f64> {
        self.timing.map(|t| t.start_ms)
    }

    /// Last processed logical frame, `None` while stopped.
    #[inline]
    pub fn last_frame_time_ms(&self) -> Option<f64> {
        self.timing.map(|t| t.last_frame_ms)
    }

    #[inline]
    pub fn frame_interval_ms(&self) -> f64 {
        self.frame_interval_ms
    }

    #[inline]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn clip_ids(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|slot| slot.spec.id.as_str())
    }

    /// Run state of a clip by id.
    pub fn clip_state(&self, id: &str) -> Option<ClipRunState> {
        self.clips
            .iter()
            .find(|slot| slot.spec.id == id)
            .map(|slot| slot.state)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl Drop for AnimationSet {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.pump.cancel_frame(handle);
        }
    }
}

//! Scrolly clip scheduler (host-agnostic)
//!
//! One throttled, frame-driven loop per [`AnimationSet`]: every processed
//! tick recomputes each clip's progress from absolute elapsed time and calls
//! the clip's update strategy. The clock and the frame pump are injected, so
//! the same engine runs under `requestAnimationFrame` or a manual test pump.

pub mod clip;
pub mod config;
pub mod easing;
pub mod error;
pub mod host;
pub mod ids;
pub mod outputs;
pub mod renderers;
pub mod router;
pub mod set;
pub mod shared;

// Re-exports for consumers (adapters)
pub use clip::{
    parse_clip_specs_json, validate_clips, ClipPhase, ClipRunState, ClipSpec, ClipUpdate,
    SetDefinition, WithRest,
};
pub use config::SchedulerConfig;
pub use easing::Easing;
pub use error::ClipError;
pub use host::{Clock, FixedClock, FramePump, NullPump};
pub use ids::{FrameHandle, FrameHandleAllocator};
pub use outputs::{FrameStats, TickOutcome, TickReport};
pub use router::ScreenRouter;
pub use set::{AnimationSet, AnimationSetBuilder};
pub use shared::{SetControl, SharedAnimationSet, WeakAnimationSet};

/// Clip scheduler result type
pub type Result<T> = core::result::Result<T, ClipError>;

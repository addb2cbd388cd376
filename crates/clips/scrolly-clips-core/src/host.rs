//! Host collaborators: the clock and the per-display-frame pump.
//!
//! Adapters (WASM, tests) implement these; the scheduler never touches real
//! wall-clock time or a real display loop on its own.

use crate::ids::FrameHandle;

/// Wall-clock time source in milliseconds.
///
/// Expected to be non-decreasing. A backward jump only stalls processing
/// until time catches up again.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Callback-per-display-frame primitive.
///
/// The pump knows which set it drives; a registration resolves by calling
/// that set's `tick` with the frame timestamp.
pub trait FramePump {
    /// Register interest in the next display frame. `None` when the host
    /// refused the registration; the loop then ends until the next start.
    fn request_frame(&mut self) -> Option<FrameHandle>;

    /// Cancel exactly this registration. Cancelling a handle that already
    /// fired must be harmless.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

impl<P: FramePump + ?Sized> FramePump for Box<P> {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        (**self).cancel_frame(handle)
    }
}

/// Clock pinned to a fixed instant. Used by hosts that always pass explicit
/// timestamps to `start`/`tick`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now_ms(&self) -> f64 {
        self.0
    }
}

/// Pump that never schedules anything. Sets built with it only advance
/// when `tick` is called by hand.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPump;

impl FramePump for NullPump {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        None
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) {}
}

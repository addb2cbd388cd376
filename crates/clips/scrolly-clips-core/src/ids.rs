//! Identifiers for frame pump registrations.

use serde::{Deserialize, Serialize};

/// Opaque handle for one outstanding frame pump registration.
/// Browser pumps store the `requestAnimationFrame` id here.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

/// Monotonic allocator for FrameHandle, for pumps that have no host ids.
#[derive(Default, Debug)]
pub struct FrameHandleAllocator {
    next: u64,
}

impl FrameHandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> FrameHandle {
        let id = FrameHandle(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

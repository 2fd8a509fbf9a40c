//! Frame scheduling

/// Token for a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Per-frame callback registration
pub trait FrameScheduler {
    /// Ask for one callback on the next display frame. None if the host can't.
    fn request_frame(&mut self) -> Option<FrameHandle>;
    /// Withdraw a request that hasn't fired yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler that only records requests; the owner drives frames by hand.
/// Used by the native demo and tests.
#[derive(Debug, Default)]
pub struct ManualFrames {
    next_id: i32,
    pending: Option<FrameHandle>,
    requested: usize,
    cancelled: usize,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding request, if any
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Mark the outstanding request as delivered
    pub fn fire(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        self.requested += 1;
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

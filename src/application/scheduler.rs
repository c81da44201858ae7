use tracing::trace;

/// Something changed that may move headings or regions on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Scroll,
    Resize,
    /// A region was registered or removed.
    Layout,
}

/// Coalesces bursts of viewport events into at most one recomputation per
/// animation frame.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    dirty: bool,
    frame_requested: bool,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `event`. Returns `true` when the caller must request an animation
    /// frame; `false` when one is already pending.
    pub fn notify(&mut self, event: ViewportEvent) -> bool {
        self.dirty = true;
        if self.frame_requested {
            trace!(target = "lectio::scheduler", ?event, "coalesced into pending frame");
            return false;
        }
        trace!(target = "lectio::scheduler", ?event, "frame requested");
        self.frame_requested = true;
        true
    }

    /// Called from the animation-frame callback. Returns whether the tracker
    /// should recompute, consuming the pending change.
    pub fn begin_frame(&mut self) -> bool {
        self.frame_requested = false;
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_scrolls_requests_one_frame() {
        let mut scheduler = FrameScheduler::new();

        let requests = (0..10)
            .filter(|_| scheduler.notify(ViewportEvent::Scroll))
            .count();

        assert_eq!(requests, 1);
        assert!(scheduler.begin_frame());
        assert!(!scheduler.begin_frame());
    }

    #[test]
    fn events_after_a_frame_request_a_new_one() {
        let mut scheduler = FrameScheduler::new();

        assert!(scheduler.notify(ViewportEvent::Resize));
        assert!(scheduler.begin_frame());
        assert!(!scheduler.frame_requested());
        assert!(scheduler.notify(ViewportEvent::Scroll));
        assert!(scheduler.is_dirty());
    }

    #[test]
    fn idle_frame_does_not_recompute() {
        let mut scheduler = FrameScheduler::new();
        assert!(!scheduler.begin_frame());
    }
}

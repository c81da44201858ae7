use crate::domain::regions::{RegionId, SectionId};

/// Viewport primitives the host environment provides for programmatic scrolling.
pub trait ScrollHost {
    /// Current absolute scroll offset of the viewport.
    fn scroll_offset(&self) -> f64;

    /// Viewport-relative top of the heading node, if it is currently rendered.
    fn locate_marker(&self, region: &RegionId, section: &SectionId) -> Option<f64>;

    /// Start a smooth scroll towards `offset`. A later call retargets it.
    fn smooth_scroll_to(&mut self, offset: f64);
}

/// Document offset that places a heading `header_offset_px` below the viewport top.
pub(crate) fn scroll_target(scroll_offset: f64, marker_top: f64, header_offset_px: f64) -> f64 {
    (scroll_offset + marker_top - header_offset_px).max(0.0)
}

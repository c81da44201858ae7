use crate::domain::geometry::RegionRect;

/// Percentage of a region's scrollable span the reader has passed, in `[0, 100]`.
///
/// The span is the region height minus the viewport height; regions that fit in
/// the viewport have nothing to scroll through and always report zero, as do
/// regions whose top edge has not yet reached the viewport.
pub(crate) fn region_progress(rect: &RegionRect, viewport_height: f64, scroll_offset: f64) -> f64 {
    let scrollable = rect.height() - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }

    if rect.top >= viewport_height {
        return 0.0;
    }

    let document_top = scroll_offset + rect.top;
    let relative = (scroll_offset - document_top).clamp(0.0, scrollable);
    (100.0 * relative / scrollable).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Region 3000px tall whose document top sits at 500px.
    fn region_at(scroll_offset: f64) -> RegionRect {
        let top = 500.0 - scroll_offset;
        RegionRect::new("post", top, top + 3000.0)
    }

    #[test]
    fn progress_follows_scroll_through_the_span() {
        assert_eq!(region_progress(&region_at(500.0), 1000.0, 500.0), 0.0);
        assert_eq!(region_progress(&region_at(1500.0), 1000.0, 1500.0), 50.0);
        assert_eq!(region_progress(&region_at(3000.0), 1000.0, 3000.0), 100.0);
    }

    #[test]
    fn short_regions_never_progress() {
        for scroll in [0.0, 200.0, 5000.0] {
            let rect = RegionRect::new("post", 100.0 - scroll, 900.0 - scroll);
            assert_eq!(region_progress(&rect, 1000.0, scroll), 0.0);
        }
    }

    #[test]
    fn region_below_the_viewport_stays_at_zero() {
        let rect = RegionRect::new("next", 1200.0, 6000.0);
        assert_eq!(region_progress(&rect, 1000.0, 0.0), 0.0);
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let mut previous = 0.0;
        for step in 0..=80 {
            let scroll = f64::from(step) * 50.0;
            let value = region_progress(&region_at(scroll), 1000.0, scroll);
            assert!((0.0..=100.0).contains(&value));
            assert!(value >= previous);
            previous = value;
        }
        assert_eq!(previous, 100.0);
    }
}

use tracing::trace;

use crate::domain::{geometry::RegionRect, regions::SectionId};

/// Pick the heading the reader is currently in.
///
/// Among headings whose top is at or above `threshold`, the lowest one wins
/// (the most recently passed heading); equal tops keep the earlier heading.
/// Before the first heading is passed, the first heading visible in the
/// viewport is used, and failing that the first heading in document order.
/// Headings missing from this frame's measurements are skipped.
pub(crate) fn active_section(
    markers: &[SectionId],
    rect: &RegionRect,
    viewport_height: f64,
    threshold: f64,
) -> Option<SectionId> {
    let first = markers.first()?;

    let resolved: Vec<(&SectionId, f64)> = markers
        .iter()
        .filter_map(|id| match rect.marker_top(id) {
            Some(top) => Some((id, top)),
            None => {
                trace!(
                    target = "lectio::tracker",
                    region = %rect.region,
                    section = %id,
                    "heading not measured this frame"
                );
                None
            }
        })
        .collect();

    let mut passed: Option<(&SectionId, f64)> = None;
    for &(id, top) in &resolved {
        if top <= threshold && passed.is_none_or(|(_, best)| top > best) {
            passed = Some((id, top));
        }
    }

    let chosen = passed
        .map(|(id, _)| id)
        .or_else(|| {
            resolved
                .iter()
                .find(|(_, top)| *top >= 0.0 && *top < viewport_height)
                .map(|(id, _)| *id)
        })
        .unwrap_or(first);

    Some(chosen.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<SectionId> {
        values.iter().map(|value| SectionId::new(*value)).collect()
    }

    #[test]
    fn most_recently_passed_heading_wins() {
        let markers = ids(&["intro", "setup", "usage"]);
        let rect = RegionRect::new("post", -2000.0, 3000.0)
            .with_marker("intro", -900.0)
            .with_marker("setup", 150.0)
            .with_marker("usage", 600.0);

        let active = active_section(&markers, &rect, 1000.0, 200.0);
        assert_eq!(active, Some(SectionId::new("setup")));
    }

    #[test]
    fn heading_exactly_on_threshold_qualifies() {
        let markers = ids(&["intro", "setup"]);
        let rect = RegionRect::new("post", -100.0, 3000.0)
            .with_marker("intro", 20.0)
            .with_marker("setup", 200.0);

        let active = active_section(&markers, &rect, 1000.0, 200.0);
        assert_eq!(active, Some(SectionId::new("setup")));
    }

    #[test]
    fn equal_tops_keep_document_order() {
        let markers = ids(&["a", "b"]);
        let rect = RegionRect::new("post", 0.0, 3000.0)
            .with_marker("a", 50.0)
            .with_marker("b", 50.0);

        let active = active_section(&markers, &rect, 1000.0, 200.0);
        assert_eq!(active, Some(SectionId::new("a")));
    }

    #[test]
    fn falls_back_to_first_visible_heading() {
        let markers = ids(&["intro", "setup"]);
        let rect = RegionRect::new("post", 300.0, 3000.0)
            .with_marker("intro", 450.0)
            .with_marker("setup", 900.0);

        let active = active_section(&markers, &rect, 1000.0, 200.0);
        assert_eq!(active, Some(SectionId::new("intro")));
    }

    #[test]
    fn falls_back_to_first_heading_when_none_visible() {
        let markers = ids(&["intro", "setup"]);
        let rect = RegionRect::new("post", 1500.0, 4000.0)
            .with_marker("intro", 1600.0)
            .with_marker("setup", 2400.0);

        let active = active_section(&markers, &rect, 1000.0, 200.0);
        assert_eq!(active, Some(SectionId::new("intro")));
    }

    #[test]
    fn unmeasured_headings_are_skipped() {
        let markers = ids(&["intro", "setup", "usage"]);
        let rect = RegionRect::new("post", -2000.0, 3000.0)
            .with_marker("intro", -900.0)
            .with_marker("usage", 700.0);

        let active = active_section(&markers, &rect, 1000.0, 200.0);
        assert_eq!(active, Some(SectionId::new("intro")));
    }

    #[test]
    fn no_markers_means_no_active_section() {
        let rect = RegionRect::new("post", 0.0, 3000.0);
        assert_eq!(active_section(&[], &rect, 1000.0, 200.0), None);
    }
}

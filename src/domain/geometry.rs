//! Per-frame measurements handed to the tracker by the hosting viewport.
//!
//! All `top`/`bottom` values are viewport-relative, the same convention as a
//! bounding client rect. Document-relative offsets are recovered by adding the
//! snapshot's `scroll_offset`.

use serde::{Deserialize, Serialize};

use super::regions::{RegionId, SectionId};

/// Measured top edge of a heading node that is currently present in the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRect {
    pub id: SectionId,
    pub top: f64,
}

/// Measured bounds of one content region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRect {
    pub region: RegionId,
    pub top: f64,
    pub bottom: f64,
    /// Top edge of the end-of-region load sentinel; the bottom edge stands in when absent.
    #[serde(default)]
    pub boundary_top: Option<f64>,
    #[serde(default)]
    pub markers: Vec<MarkerRect>,
}

impl RegionRect {
    pub fn new(region: impl Into<RegionId>, top: f64, bottom: f64) -> Self {
        Self {
            region: region.into(),
            top,
            bottom,
            boundary_top: None,
            markers: Vec::new(),
        }
    }

    pub fn with_boundary(mut self, top: f64) -> Self {
        self.boundary_top = Some(top);
        self
    }

    pub fn with_marker(mut self, id: impl Into<SectionId>, top: f64) -> Self {
        self.markers.push(MarkerRect {
            id: id.into(),
            top,
        });
        self
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// A rect is measurable when both edges are finite and it has positive height.
    pub fn is_measurable(&self) -> bool {
        self.top.is_finite() && self.bottom.is_finite() && self.height() > 0.0
    }

    pub fn effective_boundary_top(&self) -> f64 {
        self.boundary_top
            .filter(|top| top.is_finite())
            .unwrap_or(self.bottom)
    }

    /// Distance between the rect's vertical center and the viewport's.
    pub fn center_distance(&self, viewport_height: f64) -> f64 {
        ((self.top + self.bottom) / 2.0 - viewport_height / 2.0).abs()
    }

    pub fn marker_top(&self, id: &SectionId) -> Option<f64> {
        self.markers
            .iter()
            .find(|marker| &marker.id == id)
            .map(|marker| marker.top)
            .filter(|top| top.is_finite())
    }
}

/// Viewport state captured once per animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollSnapshot {
    pub viewport_height: f64,
    pub scroll_offset: f64,
    #[serde(default)]
    pub regions: Vec<RegionRect>,
}

impl ScrollSnapshot {
    pub fn new(viewport_height: f64, scroll_offset: f64) -> Self {
        Self {
            viewport_height,
            scroll_offset,
            regions: Vec::new(),
        }
    }

    pub fn with_region(mut self, rect: RegionRect) -> Self {
        self.regions.push(rect);
        self
    }

    pub fn region(&self, id: &RegionId) -> Option<&RegionRect> {
        self.regions.iter().find(|rect| &rect.region == id)
    }

    pub fn is_measurable(&self) -> bool {
        self.viewport_height.is_finite()
            && self.viewport_height > 0.0
            && self.scroll_offset.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_height_region_is_not_measurable() {
        let rect = RegionRect::new("post", 100.0, 100.0);
        assert!(!rect.is_measurable());
        assert!(!RegionRect::new("post", f64::NAN, 100.0).is_measurable());
        assert!(RegionRect::new("post", -50.0, 100.0).is_measurable());
    }

    #[test]
    fn boundary_falls_back_to_bottom_edge() {
        let rect = RegionRect::new("post", 0.0, 3000.0);
        assert_eq!(rect.effective_boundary_top(), 3000.0);
        assert_eq!(rect.with_boundary(2800.0).effective_boundary_top(), 2800.0);
    }

    #[test]
    fn center_distance_is_symmetric_around_viewport_middle() {
        assert_eq!(RegionRect::new("post", 0.0, 1000.0).center_distance(1000.0), 0.0);
        assert_eq!(RegionRect::new("post", -600.0, 400.0).center_distance(1000.0), 600.0);
        assert_eq!(RegionRect::new("post", 600.0, 1600.0).center_distance(1000.0), 600.0);
    }

    #[test]
    fn snapshot_deserializes_with_optional_fields() {
        let json = r#"{
            "viewport_height": 900.0,
            "scroll_offset": 120.0,
            "regions": [{"region": "hello", "top": -120.0, "bottom": 2000.0}]
        }"#;
        let snapshot: ScrollSnapshot = serde_json::from_str(json).expect("snapshot");
        let rect = snapshot.region(&RegionId::new("hello")).expect("region");
        assert!(rect.markers.is_empty());
        assert!(rect.boundary_top.is_none());
    }
}

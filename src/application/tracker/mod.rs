//! Reading-position tracking across one or more mounted content regions.
//!
//! [`ReadingPositionTracker::on_frame`] turns one [`ScrollSnapshot`] into the
//! progress, active-heading and load-trigger outputs for every registered region,
//! and picks the region nearest the viewport center as the current one.
//! Apart from registrations, the only state carried between frames is whether a
//! region's load trigger has already fired.

mod active;
mod progress;
mod scroll;
mod trigger;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::domain::{
    geometry::ScrollSnapshot,
    regions::{ContentRegion, RegionId, SectionId, SectionMarker},
};

pub use scroll::ScrollHost;
pub use trigger::{InFlightError, InFlightLoads, LoadGuard};

pub const DEFAULT_ACTIVE_THRESHOLD_PX: f64 = 200.0;
pub const DEFAULT_TRIGGER_DISTANCE_PX: f64 = 500.0;

pub(crate) const FRAMES_METRIC: &str = "lectio_frames_total";
pub(crate) const TRIGGERS_METRIC: &str = "lectio_load_triggers_total";
pub(crate) const SUPPRESSED_METRIC: &str = "lectio_load_triggers_suppressed_total";
pub(crate) const SKIPS_METRIC: &str = "lectio_measurement_skips_total";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    /// Distance from the viewport top a heading must pass to become active.
    pub active_threshold_px: f64,
    /// How far ahead of the viewport bottom a region's end starts the next load.
    pub trigger_distance_px: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            active_threshold_px: DEFAULT_ACTIVE_THRESHOLD_PX,
            trigger_distance_px: DEFAULT_TRIGGER_DISTANCE_PX,
        }
    }
}

/// Opaque registration token; each registration gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionHandle(u64);

/// Outputs of a single frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub progress: BTreeMap<RegionId, f64>,
    pub active: BTreeMap<RegionId, SectionId>,
    pub triggered: BTreeSet<RegionId>,
    /// Measured region whose center is nearest the viewport center; earlier
    /// registrations win ties.
    pub current: Option<RegionId>,
}

#[derive(Debug)]
struct Registration {
    handle: RegionHandle,
    region: ContentRegion,
    markers: Vec<SectionId>,
    fired: bool,
}

#[derive(Debug)]
pub struct ReadingPositionTracker {
    config: TrackerConfig,
    registrations: Vec<Registration>,
    in_flight: InFlightLoads,
    next_handle: u64,
}

impl Default for ReadingPositionTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl ReadingPositionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_in_flight(config, InFlightLoads::new())
    }

    /// Build a tracker that consults `in_flight` before firing load triggers.
    pub fn with_in_flight(config: TrackerConfig, in_flight: InFlightLoads) -> Self {
        Self {
            config,
            registrations: Vec::new(),
            in_flight,
            next_handle: 0,
        }
    }

    pub fn in_flight(&self) -> &InFlightLoads {
        &self.in_flight
    }

    /// Start tracking `region` with its headings in document order.
    ///
    /// Markers that belong to another region, or repeat an identifier, are
    /// dropped. Registering an identifier that is already tracked replaces the
    /// earlier registration but keeps its load-trigger state; only
    /// unregistering re-arms the trigger.
    pub fn register_region(
        &mut self,
        region: ContentRegion,
        markers: Vec<SectionMarker>,
    ) -> RegionHandle {
        let handle = RegionHandle(self.next_handle);
        self.next_handle += 1;

        let mut seen = HashSet::new();
        let markers: Vec<SectionId> = markers
            .into_iter()
            .filter(|marker| {
                if marker.region != region.id {
                    warn!(
                        target = "lectio::tracker",
                        region = %region.id,
                        owner = %marker.region,
                        section = %marker.id,
                        "ignoring heading owned by another region"
                    );
                    return false;
                }
                seen.insert(marker.id.clone())
            })
            .map(|marker| marker.id)
            .collect();

        let mut fired = false;
        if let Some(position) = self
            .registrations
            .iter()
            .position(|existing| existing.region.id == region.id)
        {
            let replaced = self.registrations.remove(position);
            fired = replaced.fired;
            debug!(
                target = "lectio::tracker",
                region = %region.id,
                "replacing existing registration"
            );
        }

        debug!(
            target = "lectio::tracker",
            region = %region.id,
            markers = markers.len(),
            "region registered"
        );

        self.registrations.push(Registration {
            handle,
            region,
            markers,
            fired,
        });

        handle
    }

    /// Stop tracking the region behind `handle`. Unknown or stale handles are ignored.
    pub fn unregister_region(&mut self, handle: RegionHandle) {
        let before = self.registrations.len();
        self.registrations
            .retain(|registration| registration.handle != handle);

        if self.registrations.len() != before {
            debug!(target = "lectio::tracker", ?handle, "region unregistered");
        }
    }

    pub fn is_registered(&self, handle: RegionHandle) -> bool {
        self.registrations
            .iter()
            .any(|registration| registration.handle == handle)
    }

    pub fn region_ids(&self) -> impl Iterator<Item = &RegionId> {
        self.registrations
            .iter()
            .map(|registration| &registration.region.id)
    }

    /// Compute this frame's outputs.
    ///
    /// Regions absent from the snapshot, or measured with no height, are left
    /// out of the result for this frame only.
    pub fn on_frame(&mut self, snapshot: &ScrollSnapshot) -> FrameResult {
        counter!(FRAMES_METRIC).increment(1);
        let mut result = FrameResult::default();

        if !snapshot.is_measurable() {
            debug!(
                target = "lectio::tracker",
                viewport_height = snapshot.viewport_height,
                scroll_offset = snapshot.scroll_offset,
                "viewport not measurable; skipping frame"
            );
            counter!(SKIPS_METRIC).increment(1);
            return result;
        }

        let viewport_height = snapshot.viewport_height;
        let mut nearest: Option<(RegionId, f64)> = None;

        for registration in &mut self.registrations {
            let id = &registration.region.id;
            let Some(rect) = snapshot.region(id) else {
                trace!(target = "lectio::tracker", region = %id, "region not measured this frame");
                continue;
            };

            if !rect.is_measurable() {
                debug!(
                    target = "lectio::tracker",
                    region = %id,
                    top = rect.top,
                    bottom = rect.bottom,
                    "region has no measurable size; skipping"
                );
                counter!(SKIPS_METRIC).increment(1);
                continue;
            }

            let distance = rect.center_distance(viewport_height);
            if nearest.as_ref().is_none_or(|(_, best)| distance < *best) {
                nearest = Some((id.clone(), distance));
            }

            result.progress.insert(
                id.clone(),
                progress::region_progress(rect, viewport_height, snapshot.scroll_offset),
            );

            if let Some(section) = active::active_section(
                &registration.markers,
                rect,
                viewport_height,
                self.config.active_threshold_px,
            ) {
                result.active.insert(id.clone(), section);
            }

            if registration.fired
                || !trigger::boundary_reached(
                    rect,
                    viewport_height,
                    self.config.trigger_distance_px,
                )
            {
                continue;
            }

            match registration.region.next.as_ref() {
                Some(next) if self.in_flight.contains(next) => {
                    debug!(
                        target = "lectio::tracker",
                        region = %id,
                        next = %next,
                        "next region already loading; trigger suppressed"
                    );
                    counter!(SUPPRESSED_METRIC).increment(1);
                }
                _ => {
                    registration.fired = true;
                    info!(target = "lectio::tracker", region = %id, "load trigger fired");
                    counter!(TRIGGERS_METRIC).increment(1);
                    result.triggered.insert(id.clone());
                }
            }
        }

        result.current = nearest.map(|(id, _)| id);

        trace!(
            target = "lectio::tracker",
            regions = result.progress.len(),
            current = ?result.current,
            triggered = result.triggered.len(),
            "frame computed"
        );

        result
    }

    /// Smooth-scroll so the heading sits `header_offset_px` below the viewport top.
    ///
    /// Returns `false` without scrolling when the region or heading is unknown,
    /// or the host can no longer find the heading node.
    pub fn scroll_to_section<H>(
        &self,
        region: &RegionId,
        section: &SectionId,
        header_offset_px: f64,
        host: &mut H,
    ) -> bool
    where
        H: ScrollHost + ?Sized,
    {
        let known = self.registrations.iter().any(|registration| {
            &registration.region.id == region && registration.markers.contains(section)
        });
        if !known {
            debug!(
                target = "lectio::tracker",
                region = %region,
                section = %section,
                "scroll target not registered"
            );
            return false;
        }

        let Some(marker_top) = host
            .locate_marker(region, section)
            .filter(|top| top.is_finite())
        else {
            debug!(
                target = "lectio::tracker",
                region = %region,
                section = %section,
                "scroll target not rendered"
            );
            return false;
        };

        let target = scroll::scroll_target(host.scroll_offset(), marker_top, header_offset_px);
        host.smooth_scroll_to(target);
        true
    }
}

//! Deterministic playback of recorded viewport traces.
//!
//! A trace is a JSON document listing the lifecycle calls and viewport events a
//! page produced. Playing it back drives the tracker through the frame
//! scheduler exactly as a browser host would, which makes tracker behaviour
//! reproducible from the command line and in tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    application::{
        indexer::{HeadingIndexer, IndexError},
        scheduler::{FrameScheduler, ViewportEvent},
        tracker::{
            FrameResult, InFlightLoads, LoadGuard, ReadingPositionTracker, RegionHandle,
            ScrollHost, TrackerConfig,
        },
    },
    domain::{
        geometry::ScrollSnapshot,
        regions::{ContentRegion, RegionId, SectionId, SectionMarker},
    },
};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to parse trace: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to index headings for region `{region}`: {source}")]
    Index {
        region: RegionId,
        #[source]
        source: IndexError,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub header_offset_px: Option<f64>,
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TraceStep {
    Register {
        region: ContentRegion,
        #[serde(default)]
        markdown: Option<String>,
        #[serde(default)]
        html: Option<String>,
    },
    Unregister {
        region: RegionId,
    },
    Scroll,
    Resize,
    Frame {
        snapshot: ScrollSnapshot,
    },
    LoadStarted {
        region: RegionId,
    },
    LoadFinished {
        region: RegionId,
    },
    ScrollTo {
        region: RegionId,
        section: SectionId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayRecord {
    Frame {
        step: usize,
        #[serde(flatten)]
        result: FrameResult,
    },
    ScrollTo {
        step: usize,
        region: RegionId,
        section: SectionId,
        target: Option<f64>,
    },
}

/// Host stand-in backed by the most recent frame snapshot.
#[derive(Debug, Default)]
struct SnapshotHost {
    snapshot: Option<ScrollSnapshot>,
    target: Option<f64>,
}

impl ScrollHost for SnapshotHost {
    fn scroll_offset(&self) -> f64 {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.scroll_offset)
            .unwrap_or(0.0)
    }

    fn locate_marker(&self, region: &RegionId, section: &SectionId) -> Option<f64> {
        self.snapshot.as_ref()?.region(region)?.marker_top(section)
    }

    fn smooth_scroll_to(&mut self, offset: f64) {
        self.target = Some(offset);
    }
}

pub struct Replayer {
    tracker: ReadingPositionTracker,
    scheduler: FrameScheduler,
    handles: HashMap<RegionId, RegionHandle>,
    loads: HashMap<RegionId, LoadGuard>,
    host: SnapshotHost,
    header_offset_px: f64,
}

impl Replayer {
    pub fn new(config: TrackerConfig, header_offset_px: f64) -> Self {
        Self {
            tracker: ReadingPositionTracker::with_in_flight(config, InFlightLoads::new()),
            scheduler: FrameScheduler::new(),
            handles: HashMap::new(),
            loads: HashMap::new(),
            host: SnapshotHost::default(),
            header_offset_px,
        }
    }

    pub fn run(&mut self, trace: Trace) -> Result<Vec<ReplayRecord>, ReplayError> {
        if let Some(offset) = trace.header_offset_px {
            self.header_offset_px = offset;
        }

        let mut records = Vec::new();
        for (step, entry) in trace.steps.into_iter().enumerate() {
            if let Some(record) = self.apply(step, entry)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn apply(&mut self, step: usize, entry: TraceStep) -> Result<Option<ReplayRecord>, ReplayError> {
        match entry {
            TraceStep::Register {
                region,
                markdown,
                html,
            } => {
                let markers = index_markers(&region.id, markdown.as_deref(), html.as_deref())?;
                let id = region.id.clone();
                let handle = self.tracker.register_region(region, markers);
                self.handles.insert(id, handle);
                self.scheduler.notify(ViewportEvent::Layout);
            }
            TraceStep::Unregister { region } => match self.handles.remove(&region) {
                Some(handle) => {
                    self.tracker.unregister_region(handle);
                    self.scheduler.notify(ViewportEvent::Layout);
                }
                None => debug!(target = "lectio::replay", %region, "unregister of unknown region"),
            },
            TraceStep::Scroll => {
                self.scheduler.notify(ViewportEvent::Scroll);
            }
            TraceStep::Resize => {
                self.scheduler.notify(ViewportEvent::Resize);
            }
            TraceStep::Frame { snapshot } => {
                let due = self.scheduler.begin_frame();
                let result = due.then(|| self.tracker.on_frame(&snapshot));
                self.host.snapshot = Some(snapshot);
                if let Some(result) = result {
                    return Ok(Some(ReplayRecord::Frame { step, result }));
                }
                debug!(target = "lectio::replay", step, "frame skipped; nothing changed");
            }
            TraceStep::LoadStarted { region } => {
                match self.tracker.in_flight().acquire(region.clone()) {
                    Ok(guard) => {
                        self.loads.insert(region, guard);
                    }
                    Err(err) => warn!(target = "lectio::replay", error = %err, "duplicate load"),
                }
            }
            TraceStep::LoadFinished { region } => {
                if self.loads.remove(&region).is_some() {
                    self.scheduler.notify(ViewportEvent::Layout);
                }
            }
            TraceStep::ScrollTo { region, section } => {
                self.host.target = None;
                self.tracker
                    .scroll_to_section(&region, &section, self.header_offset_px, &mut self.host);
                return Ok(Some(ReplayRecord::ScrollTo {
                    step,
                    region,
                    section,
                    target: self.host.target,
                }));
            }
        }

        Ok(None)
    }
}

/// Parse and play back a JSON trace.
pub fn replay_str(
    trace: &str,
    config: TrackerConfig,
    header_offset_px: f64,
) -> Result<Vec<ReplayRecord>, ReplayError> {
    let trace: Trace = serde_json::from_str(trace)?;
    Replayer::new(config, header_offset_px).run(trace)
}

fn index_markers(
    region: &RegionId,
    markdown: Option<&str>,
    html: Option<&str>,
) -> Result<Vec<SectionMarker>, ReplayError> {
    let indexer = HeadingIndexer::new(region.clone());
    match (markdown, html) {
        (Some(source), _) => Ok(indexer.index_markdown(source)),
        (None, Some(source)) => indexer.index_html(source).map_err(|source| ReplayError::Index {
            region: region.clone(),
            source,
        }),
        (None, None) => Ok(Vec::new()),
    }
}

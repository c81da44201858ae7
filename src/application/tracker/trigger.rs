use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::domain::{geometry::RegionRect, regions::RegionId};

/// Whether the region's end sentinel is within `distance` of the viewport bottom.
pub(crate) fn boundary_reached(rect: &RegionRect, viewport_height: f64, distance: f64) -> bool {
    rect.effective_boundary_top() <= viewport_height + distance
}

/// Regions whose content is currently being fetched for an infinite feed.
#[derive(Debug, Default, Clone)]
pub struct InFlightLoads {
    regions: Arc<DashMap<RegionId, ()>>,
}

#[derive(Debug, Error)]
pub enum InFlightError {
    #[error("load already in progress for region {region}")]
    AlreadyLoading { region: RegionId },
}

impl InFlightLoads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `region` as loading until the returned guard is dropped, whether the
    /// load completed or failed.
    pub fn acquire(&self, region: RegionId) -> Result<LoadGuard, InFlightError> {
        use dashmap::mapref::entry::Entry;

        match self.regions.entry(region.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(());
                Ok(LoadGuard {
                    region,
                    regions: Arc::clone(&self.regions),
                })
            }
            Entry::Occupied(_) => Err(InFlightError::AlreadyLoading { region }),
        }
    }

    pub fn contains(&self, region: &RegionId) -> bool {
        self.regions.contains_key(region)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[derive(Debug)]
pub struct LoadGuard {
    region: RegionId,
    regions: Arc<DashMap<RegionId, ()>>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.regions.remove(&self.region);
    }
}

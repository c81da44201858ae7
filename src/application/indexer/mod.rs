//! Heading extraction for table-of-contents navigation.
//!
//! Both front ends reduce their input to a flat list of `(level, text)` pairs in
//! document order; [`HeadingIndexer`] then keeps levels 2–4 and assigns anchors
//! with a fresh [`HeadingSlugger`] per call, so indexing unchanged content twice
//! yields the same identifiers.

mod html;
mod markdown;

use thiserror::Error;
use tracing::debug;

use crate::domain::{
    regions::{HeadingLevel, RegionId, SectionId, SectionMarker},
    slug::HeadingSlugger,
};

pub use html::apply_heading_ids;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to process document: {message}")]
    Document { message: String },
}

#[derive(Debug, Clone)]
pub(crate) struct RawHeading {
    pub(crate) level: u8,
    pub(crate) text: String,
}

/// Source format accepted by the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Markdown,
    Html,
}

/// Builds [`SectionMarker`] lists for one content region.
#[derive(Debug, Clone)]
pub struct HeadingIndexer {
    region: RegionId,
}

impl HeadingIndexer {
    pub fn new(region: impl Into<RegionId>) -> Self {
        Self {
            region: region.into(),
        }
    }

    /// Index raw markdown, before it is rendered.
    pub fn index_markdown(&self, source: &str) -> Vec<SectionMarker> {
        self.assign(markdown::collect_headings(source))
    }

    /// Index already-rendered HTML.
    pub fn index_html(&self, html: &str) -> Result<Vec<SectionMarker>, IndexError> {
        Ok(self.assign(html::collect_headings(html)?))
    }

    pub fn index(&self, source: &str, format: SourceFormat) -> Result<Vec<SectionMarker>, IndexError> {
        match format {
            SourceFormat::Markdown => Ok(self.index_markdown(source)),
            SourceFormat::Html => self.index_html(source),
        }
    }

    fn assign(&self, headings: Vec<RawHeading>) -> Vec<SectionMarker> {
        let mut slugger = HeadingSlugger::new();

        let markers: Vec<SectionMarker> = headings
            .into_iter()
            .filter_map(|heading| {
                let level = HeadingLevel::new(heading.level).ok()?;
                let label = normalize_whitespace(&heading.text);
                let id = SectionId::new(slugger.anchor_for(&label));
                Some(SectionMarker {
                    id,
                    label,
                    level,
                    region: self.region.clone(),
                })
            })
            .collect();

        debug!(
            target = "lectio::indexer",
            region = %self.region,
            count = markers.len(),
            "indexed headings"
        );

        markers
    }
}

/// Plain-text table of contents, indented two spaces per level below `h2`.
pub fn render_outline(markers: &[SectionMarker]) -> String {
    let mut outline = String::new();
    for marker in markers {
        let depth = usize::from(marker.level.get() - HeadingLevel::MIN);
        outline.push_str(&"  ".repeat(depth));
        outline.push_str(&format!("- {} (#{})\n", marker.label, marker.id));
    }
    outline
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

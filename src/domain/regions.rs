use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Stable identifier of a content region (typically the post slug).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Anchor identifier of a heading, unique within its region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Heading level tracked for table-of-contents navigation (`h2`..=`h4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MIN: u8 = 2;
    pub const MAX: u8 = 4;

    pub fn new(level: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(DomainError::validation(format!(
                "heading level {level} is outside {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HeadingLevel> for u8 {
    fn from(value: HeadingLevel) -> Self {
        value.0
    }
}

/// A heading inside a content region, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMarker {
    pub id: SectionId,
    pub label: String,
    pub level: HeadingLevel,
    pub region: RegionId,
}

/// One block of long-form content being tracked: a post, or a post appended to a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRegion {
    pub id: RegionId,
    /// Region that follows this one in an infinite feed, if any.
    #[serde(default)]
    pub next: Option<RegionId>,
}

impl ContentRegion {
    pub fn new(id: impl Into<RegionId>) -> Self {
        Self {
            id: id.into(),
            next: None,
        }
    }

    pub fn followed_by(mut self, next: impl Into<RegionId>) -> Self {
        self.next = Some(next.into());
        self
    }
}

impl From<String> for RegionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

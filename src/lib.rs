//! Reading-position tracking for long-form posts.
//!
//! The [`application::tracker::ReadingPositionTracker`] derives reading
//! progress, the active table-of-contents entry, and infinite-scroll load
//! triggers from per-frame viewport measurements. Heading markers come from
//! [`application::indexer::HeadingIndexer`].

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

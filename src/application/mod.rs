//! Application services: heading indexing, reading-position tracking, and
//! the frame scheduling that drives it.

pub mod error;
pub mod indexer;
pub mod replay;
pub mod scheduler;
pub mod tracker;

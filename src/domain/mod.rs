//! Domain layer types and invariants.

pub mod error;
pub mod geometry;
pub mod regions;
pub mod slug;

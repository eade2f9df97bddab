//! Slab allocator implementation.
//!
//! This module implements a single-size-class object cache that serves freed
//! objects from an intrusive free list and otherwise carves new objects from
//! the current wilderness block.

pub mod config;
mod free_list;
pub mod slab_allocator;
#[cfg(feature = "tracking")]
pub mod stats;
mod wilderness;

// Re-export public types
pub use config::SlabConfig;
pub use slab_allocator::{SlabAllocator, SlabSnapshot};
#[cfg(feature = "tracking")]
pub use stats::SlabStats;

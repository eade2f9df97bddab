//! Fixed-size object slab allocator
//!
//! This crate implements the object cache a kernel heap uses for its small,
//! same-sized control structures, featuring:
//! - O(1) allocate/free through an intrusive LIFO free list
//! - Lazy expansion by carving objects out of a "wilderness" block
//! - A pluggable backing block provider (kernel heap or raw memory regions)
//! - IRQ-safe locking so interrupt handlers may share an allocator
//!
//! One [`SlabAllocator`] serves exactly one object size; a kernel typically
//! keeps one instance per size class.

#![no_std]

extern crate alloc;

// Logging support - conditionally import log crate
#[cfg(feature = "log")]
extern crate log;

// Stub macros when log is disabled - these become no-ops
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "log"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// The error type used for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Invalid `size` or alignment, or an unusable slab configuration.
    InvalidParam,
    /// Memory added by `add_memory` overlapped with existed memory.
    MemoryOverlap,
    /// No enough memory to allocate.
    NoMemory,
}

/// A [`Result`] type with [`AllocError`] as the error type.
pub type AllocResult<T = ()> = Result<T, AllocError>;

/// The base allocator inherited by region-backed allocators.
pub trait BaseAllocator {
    /// Initialize the allocator with a free memory region.
    fn init(&mut self, start: usize, size: usize);

    /// Add a free memory region to the allocator.
    fn add_memory(&mut self, start: usize, size: usize) -> AllocResult;
}

/// Round `pos` up to `align` (a power of two), or `None` on overflow.
#[inline]
const fn checked_align_up(pos: usize, align: usize) -> Option<usize> {
    match pos.checked_add(align - 1) {
        Some(bumped) => Some(bumped & !(align - 1)),
        None => None,
    }
}

/// Checks whether the address has the demanded alignment.
///
/// Equivalent to `addr % align == 0`, but the alignment must be a power of two.
#[inline]
#[allow(dead_code)]
const fn is_aligned(base_addr: usize, align: usize) -> bool {
    base_addr & (align - 1) == 0
}

pub mod block;
pub use block::{BlockProvider, HeapBlockProvider, RegionBlockProvider, MAX_REGIONS};

pub mod slab;
pub use slab::{SlabAllocator, SlabConfig, SlabSnapshot};
#[cfg(feature = "tracking")]
pub use slab::SlabStats;

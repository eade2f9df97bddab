//! Bump-style block provider over raw memory regions.
//!
//! Useful before a general-purpose heap exists, or to pin all slab memory of
//! a subsystem to dedicated regions.

use core::ptr::NonNull;

#[cfg(feature = "log")]
use log::debug;

use super::BlockProvider;
use crate::{AllocError, AllocResult, BaseAllocator};

/// Maximum number of memory regions a [`RegionBlockProvider`] tracks
pub const MAX_REGIONS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Region {
    start: usize,
    end: usize,
    cursor: usize,
}

impl Region {
    const fn empty() -> Self {
        Self {
            start: 0,
            end: 0,
            cursor: 0,
        }
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }

    /// Start of `size` bytes at the next `align` boundary, if they fit.
    fn fit(&self, size: usize, align: usize) -> Option<usize> {
        let base = crate::checked_align_up(self.cursor, align)?;
        let block_end = base.checked_add(size)?;
        (block_end <= self.end).then_some(base)
    }
}

/// Hands out non-overlapping blocks from up to [`MAX_REGIONS`] memory regions.
///
/// Regions are consumed front to back and blocks are never returned, so the
/// bookkeeping is a single cursor per region.
pub struct RegionBlockProvider {
    regions: [Region; MAX_REGIONS],
    num_regions: usize,
    block_align: usize,
    used_bytes: usize,
}

impl RegionBlockProvider {
    /// Create an empty provider; blocks start on `block_align` boundaries.
    ///
    /// # Panics
    ///
    /// Panics if `block_align` is not a power of two.
    pub const fn new(block_align: usize) -> Self {
        assert!(
            block_align.is_power_of_two(),
            "block alignment must be a power of two"
        );
        Self {
            regions: [Region::empty(); MAX_REGIONS],
            num_regions: 0,
            block_align,
            used_bytes: 0,
        }
    }

    /// Returns the number of regions added so far.
    pub fn region_count(&self) -> usize {
        self.num_regions
    }

    /// Returns total region size in bytes.
    pub fn total_bytes(&self) -> usize {
        self.regions[..self.num_regions]
            .iter()
            .map(|r| r.end - r.start)
            .sum()
    }

    /// Returns bytes handed out as blocks, excluding alignment padding.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Returns bytes not yet consumed by any block or padding.
    pub fn available_bytes(&self) -> usize {
        self.regions[..self.num_regions]
            .iter()
            .map(|r| r.end - r.cursor)
            .sum()
    }
}

impl BaseAllocator for RegionBlockProvider {
    fn init(&mut self, start: usize, size: usize) {
        self.regions = [Region::empty(); MAX_REGIONS];
        self.num_regions = 0;
        self.used_bytes = 0;
        // An empty table cannot overflow or overlap; an invalid region is ignored.
        let _ = self.add_memory(start, size);
    }

    fn add_memory(&mut self, start: usize, size: usize) -> AllocResult {
        // Address 0 cannot be handed out as a block.
        if size == 0 || start == 0 {
            return Err(AllocError::InvalidParam);
        }
        let end = start.checked_add(size).ok_or(AllocError::InvalidParam)?;

        if self.regions[..self.num_regions]
            .iter()
            .any(|r| r.overlaps(start, end))
        {
            return Err(AllocError::MemoryOverlap);
        }
        if self.num_regions >= MAX_REGIONS {
            return Err(AllocError::NoMemory);
        }

        self.regions[self.num_regions] = Region {
            start,
            end,
            cursor: start,
        };
        self.num_regions += 1;
        debug!(
            "region block provider: added region [{:#x}, {:#x})",
            start, end
        );
        Ok(())
    }
}

impl BlockProvider for RegionBlockProvider {
    fn request_block(&mut self, size: usize) -> AllocResult<NonNull<u8>> {
        if size == 0 {
            return Err(AllocError::InvalidParam);
        }
        let align = self.block_align;
        let (region, base) = self.regions[..self.num_regions]
            .iter_mut()
            .find_map(|r| r.fit(size, align).map(|base| (r, base)))
            .ok_or(AllocError::NoMemory)?;
        let block = NonNull::new(base as *mut u8).ok_or(AllocError::InvalidParam)?;
        region.cursor = base + size;
        self.used_bytes += size;
        Ok(block)
    }
}

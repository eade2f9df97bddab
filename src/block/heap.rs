//! Blocks taken from the kernel's general-purpose heap.

use core::alloc::Layout;
use core::ptr::NonNull;

use super::BlockProvider;
use crate::{AllocError, AllocResult};

/// Requests slab blocks from the `alloc` global heap.
///
/// This mirrors the classic `kmalloc(slab_size)` backing: the global heap
/// hands out large blocks and the slab layer splits them into objects.
/// Blocks are intentionally leaked; slabs never shrink.
#[derive(Debug, Clone, Copy)]
pub struct HeapBlockProvider {
    align: usize,
}

impl HeapBlockProvider {
    /// Block starts are aligned to one machine word.
    pub const fn new() -> Self {
        Self::with_align(core::mem::align_of::<usize>())
    }

    /// Block starts are aligned to `align`, which must be a power of two.
    pub const fn with_align(align: usize) -> Self {
        Self { align }
    }

    pub const fn align(&self) -> usize {
        self.align
    }
}

impl Default for HeapBlockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockProvider for HeapBlockProvider {
    fn request_block(&mut self, size: usize) -> AllocResult<NonNull<u8>> {
        if size == 0 {
            return Err(AllocError::InvalidParam);
        }
        let layout =
            Layout::from_size_align(size, self.align).map_err(|_| AllocError::InvalidParam)?;
        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::NoMemory)
    }
}

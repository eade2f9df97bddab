//! Backing block providers.
//!
//! A slab allocator never manages raw memory itself; whenever its wilderness
//! runs dry it asks a [`BlockProvider`] for one more contiguous block. Blocks
//! are never handed back.

use core::ptr::NonNull;

use kernel_guard::BaseGuard;
use kspin::BaseSpinLock;

use crate::AllocResult;

mod heap;
mod region;

pub use heap::HeapBlockProvider;
pub use region::{RegionBlockProvider, MAX_REGIONS};

/// Source of the contiguous blocks a slab allocator carves objects from.
///
/// Implementations must never return overlapping blocks across calls, and
/// must not re-enter the slab allocator that is calling them: the request is
/// made with that allocator's lock held and local interrupts disabled.
pub trait BlockProvider {
    /// Obtain a block of at least `size` bytes.
    fn request_block(&mut self, size: usize) -> AllocResult<NonNull<u8>>;
}

impl<P: BlockProvider + ?Sized> BlockProvider for &mut P {
    fn request_block(&mut self, size: usize) -> AllocResult<NonNull<u8>> {
        (**self).request_block(size)
    }
}

/// A provider shared by several allocators (e.g. one per size class).
///
/// Lock order is always slab lock first, provider lock second.
impl<G: BaseGuard, P: BlockProvider> BlockProvider for &BaseSpinLock<G, P> {
    fn request_block(&mut self, size: usize) -> AllocResult<NonNull<u8>> {
        self.lock().request_block(size)
    }
}

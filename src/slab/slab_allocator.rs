//! Fixed-size object allocator for a single object size.
//!
//! Allocation first pops the intrusive free list; only when it is empty is a
//! fresh object carved from the wilderness block, and only when the
//! wilderness cannot fit another object is a new block requested from the
//! [`BlockProvider`]. Blocks are never returned to the provider.

use core::ptr::NonNull;

use kernel_guard::{BaseGuard, NoPreemptIrqSave};
use kspin::BaseSpinLock;

#[cfg(feature = "log")]
use log::{trace, warn};

use super::config::SlabConfig;
use super::free_list::FreeList;
#[cfg(feature = "tracking")]
use super::stats::SlabStats;
use super::wilderness::Wilderness;
use crate::block::BlockProvider;
use crate::{AllocError, AllocResult};

/// Point-in-time view of an allocator's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabSnapshot {
    /// Start of the current wilderness block, if any block was obtained yet.
    pub wilderness_base: Option<usize>,
    /// Bytes already carved from the wilderness block.
    pub wilderness_offset: usize,
    /// Object that the next allocation will reuse, if any.
    pub free_head: Option<usize>,
}

struct SlabInner<P> {
    provider: P,
    wilderness: Wilderness,
    free_list: FreeList,
    #[cfg(feature = "tracking")]
    stats: SlabStats,
}

// SAFETY: the block and object pointers are owned by the allocator and only
// dereferenced with the allocator lock held.
unsafe impl<P: Send> Send for SlabInner<P> {}

impl<P: BlockProvider> SlabInner<P> {
    fn alloc_object(&mut self, config: &SlabConfig) -> AllocResult<NonNull<u8>> {
        // SAFETY: objects only enter the free list through `free`, whose caller
        // guarantees they came from this allocator's blocks.
        if let Some(object) = unsafe { self.free_list.pop(config.object_size) } {
            #[cfg(feature = "tracking")]
            {
                self.stats.free_objects -= 1;
            }
            return Ok(object);
        }

        if !self.wilderness.fits(config.object_size, config.slab_size) {
            self.expand(config)?;
        }

        let object = self
            .wilderness
            .carve(config.object_size)
            .ok_or(AllocError::NoMemory)?;
        #[cfg(feature = "tracking")]
        {
            self.stats.carved_objects += 1;
        }
        Ok(object)
    }

    /// Replace the wilderness with a fresh block. On failure nothing changes.
    fn expand(&mut self, config: &SlabConfig) -> AllocResult {
        let block = self
            .provider
            .request_block(config.slab_size)
            .map_err(|_e| {
                warn!(
                    "slab allocator: block provider failed for {} bytes (object size {}): {:?}",
                    config.slab_size, config.object_size, _e
                );
                AllocError::NoMemory
            })?;

        let abandoned = self.wilderness.replace(block, config.slab_size);
        trace!(
            "slab allocator: new wilderness block {:#x} ({} bytes), abandoned {} tail bytes",
            block.as_ptr() as usize,
            config.slab_size,
            abandoned
        );
        #[cfg(feature = "tracking")]
        {
            self.stats.blocks += 1;
            self.stats.wasted_bytes += abandoned;
        }
        #[cfg(not(feature = "tracking"))]
        let _ = abandoned;
        Ok(())
    }
}

/// Slab allocator for objects of one fixed size.
///
/// All state sits behind one spinlock whose guard `G` also suspends local
/// interrupts (and preemption) for the whole critical section, so the same
/// allocator may be used from thread context and interrupt handlers alike.
/// The default guard restores the saved interrupt state on every exit path.
pub struct SlabAllocator<P: BlockProvider, G: BaseGuard = NoPreemptIrqSave> {
    config: SlabConfig,
    inner: BaseSpinLock<G, SlabInner<P>>,
}

impl<P: BlockProvider, G: BaseGuard> SlabAllocator<P, G> {
    /// Create an allocator; no block is requested until the first allocation.
    ///
    /// # Panics
    ///
    /// Panics if `config` is not [valid](SlabConfig::is_valid).
    pub const fn new(config: SlabConfig, provider: P) -> Self {
        assert!(config.is_valid(), "invalid slab configuration");
        Self {
            config,
            inner: BaseSpinLock::new(SlabInner {
                provider,
                wilderness: Wilderness::new(),
                free_list: FreeList::new(),
                #[cfg(feature = "tracking")]
                stats: SlabStats::new(),
            }),
        }
    }

    /// Like [`Self::new`], but rejects an invalid `config` with
    /// [`AllocError::InvalidParam`].
    pub fn try_new(config: SlabConfig, provider: P) -> AllocResult<Self> {
        config.validate()?;
        Ok(Self::new(config, provider))
    }

    /// Returns the configuration this allocator was built with.
    pub fn config(&self) -> SlabConfig {
        self.config
    }

    /// Returns the size in bytes of every object.
    pub fn object_size(&self) -> usize {
        self.config.object_size
    }

    /// Returns the size in bytes of every backing block.
    pub fn slab_size(&self) -> usize {
        self.config.slab_size
    }

    /// Allocate one uninitialized object of [`Self::object_size`] bytes.
    ///
    /// Returns [`AllocError::NoMemory`] if a new block was needed and the
    /// provider could not supply one; the allocator state is then unchanged.
    pub fn allocate(&self) -> AllocResult<NonNull<u8>> {
        self.inner.lock().alloc_object(&self.config)
    }

    /// Return an object to the allocator.
    ///
    /// # Safety
    ///
    /// `object` must have been returned by [`Self::allocate`] on this same
    /// allocator and must not have been freed since. The caller gives up all
    /// access to it.
    pub unsafe fn free(&self, object: NonNull<u8>) {
        let mut inner = self.inner.lock();
        inner.free_list.push(object, self.config.object_size);
        #[cfg(feature = "tracking")]
        {
            inner.stats.free_objects += 1;
        }
    }

    /// Returns the current wilderness position and free-list head.
    pub fn snapshot(&self) -> SlabSnapshot {
        let inner = self.inner.lock();
        SlabSnapshot {
            wilderness_base: inner.wilderness.block().map(|b| b.as_ptr() as usize),
            wilderness_offset: inner.wilderness.offset(),
            free_head: inner.free_list.head().map(|o| o.as_ptr() as usize),
        }
    }

    /// Whether the next allocation will be served from the free list.
    pub fn has_free_objects(&self) -> bool {
        !self.inner.lock().free_list.is_empty()
    }

    /// Run `f` on the block provider inside the allocator's critical section.
    pub fn with_provider<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.inner.lock().provider)
    }

    /// Returns a copy of the usage counters.
    #[cfg(feature = "tracking")]
    pub fn stats(&self) -> SlabStats {
        self.inner.lock().stats
    }
}

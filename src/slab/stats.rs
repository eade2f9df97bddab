//! Statistics for a single slab allocator

/// Slab usage counters, updated inside the allocator's critical section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlabStats {
    /// Blocks obtained from the block provider
    pub blocks: usize,
    /// Objects ever carved from the wilderness
    pub carved_objects: usize,
    /// Objects currently on the free list
    pub free_objects: usize,
    /// Tail bytes abandoned in retired wilderness blocks
    pub wasted_bytes: usize,
}

impl SlabStats {
    pub const fn new() -> Self {
        Self {
            blocks: 0,
            carved_objects: 0,
            free_objects: 0,
            wasted_bytes: 0,
        }
    }

    /// Objects currently owned by callers.
    pub fn live_objects(&self) -> usize {
        self.carved_objects - self.free_objects
    }

    /// Bytes obtained from the block provider.
    pub fn total_bytes(&self, slab_size: usize) -> usize {
        self.blocks * slab_size
    }

    /// Bytes held by live objects.
    pub fn used_bytes(&self, object_size: usize) -> usize {
        self.live_objects() * object_size
    }

    /// Bytes obtained but neither live nor wasted: free objects plus the
    /// uncarved wilderness.
    pub fn available_bytes(&self, object_size: usize, slab_size: usize) -> usize {
        self.total_bytes(slab_size)
            .saturating_sub(self.used_bytes(object_size))
            .saturating_sub(self.wasted_bytes)
    }
}

//! Slab geometry.

use crate::{AllocError, AllocResult};

/// Object and block sizes of one slab allocator, fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabConfig {
    /// Size in bytes of every object handed out.
    pub object_size: usize,
    /// Size in bytes of every block requested from the block provider.
    pub slab_size: usize,
}

impl SlabConfig {
    /// A free object stores the free-list link in its first word.
    pub const MIN_OBJECT_SIZE: usize = core::mem::size_of::<usize>();

    pub const fn new(object_size: usize, slab_size: usize) -> Self {
        Self {
            object_size,
            slab_size,
        }
    }

    /// Blocks hold exactly `count` objects with no tail waste.
    pub const fn with_objects_per_slab(object_size: usize, count: usize) -> Self {
        Self::new(object_size, object_size * count)
    }

    pub const fn is_valid(&self) -> bool {
        self.object_size >= Self::MIN_OBJECT_SIZE && self.slab_size >= self.object_size
    }

    pub const fn validate(&self) -> AllocResult {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AllocError::InvalidParam)
        }
    }

    /// Number of objects carved from each block.
    pub const fn objects_per_slab(&self) -> usize {
        self.slab_size / self.object_size
    }

    /// Bytes at the end of each block too small to hold another object.
    pub const fn tail_waste(&self) -> usize {
        self.slab_size % self.object_size
    }
}

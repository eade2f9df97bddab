//! The wilderness: the not-yet-carved tail of the newest backing block.

use core::ptr::NonNull;

pub(crate) struct Wilderness {
    block: Option<NonNull<u8>>,
    offset: usize,
}

impl Wilderness {
    pub const fn new() -> Self {
        Self {
            block: None,
            offset: 0,
        }
    }

    pub fn block(&self) -> Option<NonNull<u8>> {
        self.block
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether another object can be carved without a new block.
    pub fn fits(&self, object_size: usize, slab_size: usize) -> bool {
        self.block.is_some() && slab_size - self.offset >= object_size
    }

    /// Make `block` the new wilderness, abandoning the current one.
    ///
    /// Returns the number of uncarved bytes left behind in the old block.
    pub fn replace(&mut self, block: NonNull<u8>, slab_size: usize) -> usize {
        let abandoned = match self.block {
            Some(_) => slab_size - self.offset,
            None => 0,
        };
        self.block = Some(block);
        self.offset = 0;
        abandoned
    }

    /// Carve the next object. Callers check [`Self::fits`] first.
    pub fn carve(&mut self, object_size: usize) -> Option<NonNull<u8>> {
        let block = self.block?;
        // SAFETY: `fits` guarantees `offset + object_size <= slab_size`, so the
        // object lies inside the block.
        let object = unsafe { NonNull::new_unchecked(block.as_ptr().add(self.offset)) };
        self.offset += object_size;
        Some(object)
    }
}

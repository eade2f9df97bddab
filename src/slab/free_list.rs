//! Intrusive free list.
//!
//! The list lives entirely inside the freed objects: while an object is free,
//! its first word holds the address of the next free object (0 terminates).
//! Objects carry no alignment guarantee, so the link is accessed unaligned.

use core::ptr::NonNull;

#[cfg(all(feature = "log", feature = "poison"))]
use log::error;

#[cfg(feature = "poison")]
const LINK_SIZE: usize = core::mem::size_of::<usize>();

/// Fill byte for the part of a free object past its link word.
#[cfg(feature = "poison")]
pub(crate) const POISON_FREE: u8 = 0x6b;

pub(crate) struct FreeList {
    head: Option<NonNull<u8>>,
}

impl FreeList {
    pub const fn new() -> Self {
        Self { head: None }
    }

    pub fn head(&self) -> Option<NonNull<u8>> {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Push `object` on top of the list.
    ///
    /// # Safety
    ///
    /// `object` must be valid for writes of `object_size` bytes, exclusively
    /// owned by the caller and not already on this list.
    #[cfg_attr(not(feature = "poison"), allow(unused_variables))]
    pub unsafe fn push(&mut self, object: NonNull<u8>, object_size: usize) {
        let link = self.head.map_or(0, |next| next.as_ptr() as usize);
        #[cfg(feature = "poison")]
        core::ptr::write_bytes(
            object.as_ptr().add(LINK_SIZE),
            POISON_FREE,
            object_size - LINK_SIZE,
        );
        object.as_ptr().cast::<usize>().write_unaligned(link);
        self.head = Some(object);
    }

    /// Pop the most recently pushed object.
    ///
    /// # Safety
    ///
    /// Every object on the list must still be valid for reads of
    /// `object_size` bytes.
    #[cfg_attr(not(feature = "poison"), allow(unused_variables))]
    pub unsafe fn pop(&mut self, object_size: usize) -> Option<NonNull<u8>> {
        let object = self.head?;
        #[cfg(feature = "poison")]
        check_poison(object, object_size);
        let link = object.as_ptr().cast::<usize>().read_unaligned();
        self.head = NonNull::new(link as *mut u8);
        Some(object)
    }
}

#[cfg(feature = "poison")]
unsafe fn check_poison(object: NonNull<u8>, object_size: usize) {
    let body = core::slice::from_raw_parts(
        object.as_ptr().add(LINK_SIZE),
        object_size - LINK_SIZE,
    );
    if let Some(pos) = body.iter().position(|&b| b != POISON_FREE) {
        error!(
            "slab free list: object {:#x} modified after free at offset {}",
            object.as_ptr() as usize,
            pos + LINK_SIZE
        );
        panic!(
            "slab free list: object {:#x} modified after free",
            object.as_ptr() as usize
        );
    }
}

//! Integration tests for the slab allocator crate
//!
//! Exercises allocators against the real block providers, including several
//! size classes sharing one region provider.

#![no_std]

extern crate alloc;
extern crate fixed_slab_allocator;

use alloc::vec::Vec;
use core::alloc::Layout;
use core::ptr::NonNull;
use fixed_slab_allocator::{
    AllocError, BaseAllocator, HeapBlockProvider, RegionBlockProvider, SlabAllocator, SlabConfig,
};
use kspin::SpinNoIrq;

const PAGE_SIZE: usize = 0x1000;
const TEST_HEAP_SIZE: usize = 64 * PAGE_SIZE;

static TASK_SLAB: SlabAllocator<HeapBlockProvider> =
    SlabAllocator::new(SlabConfig::new(96, PAGE_SIZE), HeapBlockProvider::new());

/// Allocate test memory using system allocator
fn alloc_test_heap(size: usize) -> (*mut u8, Layout) {
    let layout = Layout::from_size_align(size, PAGE_SIZE).unwrap();
    let ptr = unsafe { alloc::alloc::alloc(layout) };
    assert!(!ptr.is_null(), "Failed to allocate test heap");
    (ptr, layout)
}

/// Deallocate test memory
fn dealloc_test_heap(ptr: *mut u8, layout: Layout) {
    unsafe { alloc::alloc::dealloc(ptr, layout) };
}

fn addr(ptr: NonNull<u8>) -> usize {
    ptr.as_ptr() as usize
}

fn assert_disjoint(objs: &[usize], object_size: usize) {
    let mut sorted = objs.to_vec();
    sorted.sort_unstable();
    for pair in sorted.windows(2) {
        assert!(
            pair[0] + object_size <= pair[1],
            "objects {:#x} and {:#x} overlap",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_reference_scenario_on_heap_blocks() {
    let slab: SlabAllocator<HeapBlockProvider> =
        SlabAllocator::new(SlabConfig::new(16, 64), HeapBlockProvider::new());

    let first: Vec<NonNull<u8>> = (0..4).map(|_| slab.allocate().unwrap()).collect();
    let base = slab.snapshot().wilderness_base.unwrap();
    for (i, &obj) in first.iter().enumerate() {
        assert_eq!(addr(obj), base + i * 16);
    }
    assert_eq!(slab.snapshot().wilderness_offset, 64);

    let fifth = slab.allocate().unwrap();
    let base2 = slab.snapshot().wilderness_base.unwrap();
    assert_ne!(base2, base);
    assert_eq!(addr(fifth), base2);
    assert_eq!(slab.snapshot().wilderness_offset, 16);

    unsafe { slab.free(first[1]) };
    assert_eq!(slab.allocate().unwrap(), first[1]);
}

#[test]
fn test_static_allocator() {
    let objs: Vec<NonNull<u8>> = (0..100).map(|_| TASK_SLAB.allocate().unwrap()).collect();
    let addrs: Vec<usize> = objs.iter().map(|&o| addr(o)).collect();
    assert_disjoint(&addrs, 96);

    for &obj in objs.iter().rev() {
        unsafe { TASK_SLAB.free(obj) };
    }
    // Most recently freed comes back first.
    assert_eq!(TASK_SLAB.allocate().unwrap(), objs[0]);
}

#[test]
fn test_size_classes_share_region_provider() {
    let (heap_ptr, heap_layout) = alloc_test_heap(TEST_HEAP_SIZE);
    let heap_addr = heap_ptr as usize;

    let provider = SpinNoIrq::new(RegionBlockProvider::new(PAGE_SIZE));
    provider.lock().init(heap_addr, TEST_HEAP_SIZE);

    let small = SlabAllocator::<&SpinNoIrq<RegionBlockProvider>>::new(
        SlabConfig::new(32, PAGE_SIZE),
        &provider,
    );
    let large = SlabAllocator::<&SpinNoIrq<RegionBlockProvider>>::new(
        SlabConfig::new(512, 2 * PAGE_SIZE),
        &provider,
    );

    let mut small_objs = Vec::new();
    let mut large_objs = Vec::new();
    for _ in 0..300 {
        small_objs.push(addr(small.allocate().unwrap()));
        large_objs.push(addr(large.allocate().unwrap()));
    }

    for &obj in small_objs.iter().chain(large_objs.iter()) {
        assert!(obj >= heap_addr && obj < heap_addr + TEST_HEAP_SIZE);
    }
    assert_disjoint(&small_objs, 32);
    assert_disjoint(&large_objs, 512);

    // 300 small objects need 3 pages; 300 large objects need 19 double pages.
    let used = provider.lock().used_bytes();
    assert_eq!(used, 3 * PAGE_SIZE + 19 * 2 * PAGE_SIZE);

    // Every object lies at a multiple of its size from a page-aligned block.
    for &obj in &small_objs {
        assert_eq!((obj - heap_addr) % PAGE_SIZE % 32, 0);
    }

    dealloc_test_heap(heap_ptr, heap_layout);
}

#[test]
fn test_region_exhaustion_and_growth() {
    let (heap_ptr, heap_layout) = alloc_test_heap(4 * PAGE_SIZE);
    let heap_addr = heap_ptr as usize;

    let provider = SpinNoIrq::new(RegionBlockProvider::new(PAGE_SIZE));
    provider.lock().init(heap_addr, PAGE_SIZE);
    let slab = SlabAllocator::<&SpinNoIrq<RegionBlockProvider>>::new(
        SlabConfig::with_objects_per_slab(256, 16),
        &provider,
    );

    let objs: Vec<NonNull<u8>> = (0..16).map(|_| slab.allocate().unwrap()).collect();
    let before = slab.snapshot();
    assert_eq!(slab.allocate(), Err(AllocError::NoMemory));
    assert_eq!(slab.snapshot(), before);

    unsafe { slab.free(objs[7]) };
    assert_eq!(slab.allocate().unwrap(), objs[7]);

    let grown = slab.with_provider(|p| p.lock().add_memory(heap_addr + 2 * PAGE_SIZE, PAGE_SIZE));
    assert!(grown.is_ok());
    assert_eq!(addr(slab.allocate().unwrap()), heap_addr + 2 * PAGE_SIZE);

    let overlap = slab.with_provider(|p| p.lock().add_memory(heap_addr, PAGE_SIZE));
    assert_eq!(overlap, Err(AllocError::MemoryOverlap));

    dealloc_test_heap(heap_ptr, heap_layout);
}

#[test]
fn test_objects_hold_caller_data() {
    let slab: SlabAllocator<HeapBlockProvider> =
        SlabAllocator::new(SlabConfig::new(40, 400), HeapBlockProvider::new());

    let objs: Vec<NonNull<u8>> = (0..50).map(|_| slab.allocate().unwrap()).collect();
    for (i, &obj) in objs.iter().enumerate() {
        unsafe { core::ptr::write_bytes(obj.as_ptr(), i as u8, 40) };
    }
    // Free and reuse every other object; untouched objects keep their bytes.
    for &obj in objs.iter().step_by(2) {
        unsafe { slab.free(obj) };
    }
    for _ in 0..25 {
        let obj = slab.allocate().unwrap();
        unsafe { core::ptr::write_bytes(obj.as_ptr(), 0xff, 40) };
    }
    for (i, &obj) in objs.iter().enumerate().skip(1).step_by(2) {
        let bytes = unsafe { core::slice::from_raw_parts(obj.as_ptr(), 40) };
        assert!(bytes.iter().all(|&b| b == i as u8));
    }
}

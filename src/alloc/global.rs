//! The process heap as a [`HiveAlloc`].
//!
//! Delegates to `std::alloc`, so whatever `#[global_allocator]` the binary
//! installs (system, mimalloc, ...) backs the hive's blocks.

use crate::alloc::{AllocError, HiveAlloc};
use core::alloc::Layout;
use core::ptr::NonNull;

/// Allocator that forwards to the registered global allocator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

impl HiveAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0);
        // SAFETY: callers never request zero-sized layouts.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        std::alloc::dealloc(ptr.as_ptr(), layout);
    }
}

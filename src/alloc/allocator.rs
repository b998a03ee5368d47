//! The allocator interface hive blocks are obtained through.

use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;

/// The allocator collaborator of a [`Hive`](crate::Hive).
///
/// Every block a hive owns is obtained from and returned to this trait, as a
/// single allocation holding the slot array and its occupancy bitmap.
/// Elements themselves are constructed and destroyed in place by the hive.
pub trait HiveAlloc {
    /// Allocates memory according to the given layout.
    ///
    /// `layout` always has a non-zero size.
    ///
    /// # Errors
    /// Returns `AllocError` if allocation fails.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Deallocates memory.
    ///
    /// # Safety
    /// `ptr` must denote a block of memory currently allocated by this allocator.
    /// `layout` must be the same layout that was used to allocate that block of memory.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

impl<A: HiveAlloc + ?Sized> HiveAlloc for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout);
    }
}

/// The error type for allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl std::error::Error for AllocError {}

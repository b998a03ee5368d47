//! A fixed-capacity block of slots.
//!
//! Each block is one allocation: an array of [`Slot`]s followed by an
//! occupancy bitmap. Vacated slots form an index-linked free list threaded
//! through the slots themselves, so both insertion and erasure are O(1).
//! Slots past the high-water mark `unused` have never held an element.
//!
//! A block never moves its storage, which is what gives hive elements stable
//! addresses. Blocks do not implement `Drop`: releasing storage needs the
//! owning hive's allocator, see [`Block::deallocate`].

use crate::alloc::HiveAlloc;
use crate::error::HiveError;
use crate::limits::Limits;
use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ptr::{self, NonNull};

/// Free-list terminator.
const END: usize = usize::MAX;
const BIT_SHIFT: usize = 6;
const BIT_MASK: usize = 63;

/// One element-sized storage unit.
///
/// `repr(C)` puts `value` at offset 0, so a slot pointer is also an element
/// pointer.
#[repr(C)]
pub(crate) union Slot<T> {
    value: ManuallyDrop<T>,
    next_free: usize,
}

#[inline]
const fn words_for(capacity: usize) -> usize {
    (capacity + BIT_MASK) >> BIT_SHIFT
}

pub(crate) struct Block<T> {
    slots: NonNull<Slot<T>>,
    occupied: NonNull<u64>,
    layout: Layout,
    capacity: usize,
    count: usize,
    /// Slots at or after this index have never been handed out.
    unused: usize,
    free_head: usize,
    /// Activation stamp; increases along the active list.
    pub(crate) ordinal: u64,
    _marker: PhantomData<T>,
}

impl<T> Block<T> {
    /// Layout of a block of `capacity` slots plus the bitmap offset.
    fn layout(capacity: usize) -> Result<(Layout, usize), HiveError> {
        let slots = Layout::array::<Slot<T>>(capacity).map_err(|_| HiveError::CapacityOverflow)?;
        let words =
            Layout::array::<u64>(words_for(capacity)).map_err(|_| HiveError::CapacityOverflow)?;
        let (layout, offset) = slots.extend(words).map_err(|_| HiveError::CapacityOverflow)?;
        Ok((layout.pad_to_align(), offset))
    }

    /// Allocates an empty block of `capacity` slots.
    pub(crate) fn allocate<A: HiveAlloc>(alloc: &A, capacity: usize) -> Result<Self, HiveError> {
        debug_assert!(capacity > 0);
        let (layout, offset) = Self::layout(capacity)?;
        let base = alloc
            .allocate(layout)
            .map_err(|_| HiveError::AllocFailed { layout })?;

        // SAFETY: `offset` and the bitmap words lie inside the allocation.
        let occupied = unsafe {
            let words = base.as_ptr().add(offset).cast::<u64>();
            ptr::write_bytes(words, 0, words_for(capacity));
            NonNull::new_unchecked(words)
        };

        Ok(Self {
            slots: base.cast(),
            occupied,
            layout,
            capacity,
            count: 0,
            unused: 0,
            free_head: END,
            ordinal: 0,
            _marker: PhantomData,
        })
    }

    /// Releases the storage. The block must be empty.
    pub(crate) fn deallocate<A: HiveAlloc>(self, alloc: &A) {
        debug_assert!(self.is_empty(), "deallocating a block that holds elements");
        // SAFETY: storage came from `alloc` with exactly this layout.
        unsafe { alloc.deallocate(self.slots.cast(), self.layout) };
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    #[inline]
    pub(crate) fn is_open(&self) -> bool {
        self.count < self.capacity
    }

    #[inline]
    pub(crate) fn is_within(&self, limits: &Limits) -> bool {
        limits.contains(self.capacity)
    }

    #[inline]
    fn slot_ptr(&self, index: usize) -> *mut Slot<T> {
        debug_assert!(index < self.capacity);
        // SAFETY: index is within the slot array.
        unsafe { self.slots.as_ptr().add(index) }
    }

    /// Raw element pointer for `index`. Only meaningful for occupied slots.
    #[inline]
    pub(crate) fn value_ptr(&self, index: usize) -> *mut T {
        self.slot_ptr(index).cast::<T>()
    }

    #[inline]
    fn word(&self, word_idx: usize) -> u64 {
        // SAFETY: callers stay below `words_for(capacity)`.
        unsafe { *self.occupied.as_ptr().add(word_idx) }
    }

    #[inline]
    fn word_mut(&mut self, word_idx: usize) -> &mut u64 {
        // SAFETY: as above; `&mut self` gives exclusive access.
        unsafe { &mut *self.occupied.as_ptr().add(word_idx) }
    }

    /// Returns `true` if `index` holds a live element.
    #[inline]
    pub(crate) fn is_occupied(&self, index: usize) -> bool {
        index < self.unused && self.word(index >> BIT_SHIFT) & (1 << (index & BIT_MASK)) != 0
    }

    /// Stores `value` in a free slot and returns its index.
    ///
    /// The most recently vacated slot is reused first; otherwise the next
    /// never-used slot is taken.
    pub(crate) fn emplace(&mut self, value: T) -> usize {
        debug_assert!(self.is_open(), "emplace into a full block");
        let index = if self.free_head == END {
            let index = self.unused;
            self.unused += 1;
            index
        } else {
            let index = self.free_head;
            // SAFETY: free-list members are vacant slots holding the next link.
            self.free_head = unsafe { (*self.slot_ptr(index)).next_free };
            index
        };

        // SAFETY: the slot is vacant; writing does not drop anything.
        unsafe {
            self.slot_ptr(index).write(Slot {
                value: ManuallyDrop::new(value),
            });
        }
        *self.word_mut(index >> BIT_SHIFT) |= 1 << (index & BIT_MASK);
        self.count += 1;
        index
    }

    /// Moves the element at `index` out and puts the slot on the free list.
    ///
    /// # Panics
    /// Panics if `index` is not occupied.
    pub(crate) fn take(&mut self, index: usize) -> T {
        assert!(self.is_occupied(index), "hive slot {index} is not occupied");

        // SAFETY: occupied slot, `value` sits at offset 0.
        let value = unsafe { ptr::read(self.value_ptr(index)) };
        *self.word_mut(index >> BIT_SHIFT) &= !(1 << (index & BIT_MASK));
        self.count -= 1;

        if self.count == 0 {
            // Every slot is vacant again; forget the free list.
            self.unused = 0;
            self.free_head = END;
        } else {
            // SAFETY: the slot no longer holds a value.
            unsafe { (*self.slot_ptr(index)).next_free = self.free_head };
            self.free_head = index;
        }
        value
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        if self.is_occupied(index) {
            // SAFETY: occupied slots hold initialized values.
            Some(unsafe { &*self.value_ptr(index) })
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if self.is_occupied(index) {
            // SAFETY: as above, with exclusive access.
            Some(unsafe { &mut *self.value_ptr(index) })
        } else {
            None
        }
    }

    /// First occupied slot at or after `from`.
    pub(crate) fn next_occupied(&self, from: usize) -> Option<usize> {
        if from >= self.unused {
            return None;
        }
        let last = (self.unused - 1) >> BIT_SHIFT;
        let mut word_idx = from >> BIT_SHIFT;
        let mut word = self.word(word_idx) & (!0u64 << (from & BIT_MASK));
        loop {
            if word != 0 {
                return Some((word_idx << BIT_SHIFT) + word.trailing_zeros() as usize);
            }
            word_idx += 1;
            if word_idx > last {
                return None;
            }
            word = self.word(word_idx);
        }
    }

    /// Number of occupied slots in `start..end`.
    pub(crate) fn count_occupied(&self, start: usize, end: usize) -> usize {
        let end = end.min(self.unused);
        if start >= end {
            return 0;
        }
        let first = start >> BIT_SHIFT;
        let last = (end - 1) >> BIT_SHIFT;
        let mut total = 0;
        for word_idx in first..=last {
            let mut word = self.word(word_idx);
            if word_idx == first {
                word &= !0u64 << (start & BIT_MASK);
            }
            if word_idx == last {
                let bits = end - (word_idx << BIT_SHIFT);
                if bits < 64 {
                    word &= (1u64 << bits) - 1;
                }
            }
            total += word.count_ones() as usize;
        }
        total
    }

    /// Returns `true` if `ptr` points into this block's slot array.
    pub(crate) fn includes(&self, ptr: *const T) -> bool {
        let addr = ptr as usize;
        let base = self.slots.as_ptr() as usize;
        addr >= base && addr - base < self.capacity * mem::size_of::<Slot<T>>()
    }

    /// Slot index of `ptr`, if it is the exact start of a slot.
    pub(crate) fn index_of(&self, ptr: *const T) -> Option<usize> {
        if !self.includes(ptr) {
            return None;
        }
        let offset = ptr as usize - self.slots.as_ptr() as usize;
        let size = mem::size_of::<Slot<T>>();
        (offset % size == 0).then(|| offset / size)
    }
}

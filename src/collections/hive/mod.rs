//! A segmented bucket-of-blocks container.
//!
//! Elements live in fixed-capacity blocks and never move once inserted, so
//! references and [`Position`]s stay valid while other elements come and go.
//! Insertion and erasure are O(1): each block keeps a free list of vacated
//! slots, and the hive keeps every block on up to three intrusive lists.
//!
//! # Block states
//!
//! A block's state is a function of its element count:
//!
//! | count            | Active | Open | Reserved |
//! |------------------|--------|------|----------|
//! | `0`              |        | yes  | yes      |
//! | `0 < n < cap`    | yes    | yes  |          |
//! | `cap`            | yes    |      |          |
//!
//! - **Active** blocks are iterated in activation order: a block joins the
//!   tail when it receives its first element.
//! - **Open** blocks take insertions, front first. A full block that loses an
//!   element is prepended, so holes are refilled before fresh space is used.
//! - **Reserved** blocks are spare capacity. A block that loses its last
//!   element is prepended and is the first to be reused.
//!
//! # Failure atomicity
//!
//! Fallible work (block allocation, element construction) always happens
//! before list bookkeeping. A failed operation leaves the hive in the state
//! it was in before the call, except that a block allocated on the way may
//! remain as reserved capacity.
//!
//! # Example
//!
//! ```rust
//! use hive::{Hive, Limits};
//!
//! let mut hive = Hive::with_limits(Limits::new(4, 4).unwrap());
//! let first = hive.insert("a");
//! let second = hive.insert("b");
//! let third = hive.insert("c");
//!
//! hive.erase(second);
//! assert_eq!(hive.get(first), Some(&"a"));
//! assert_eq!(hive.get(third), Some(&"c"));
//! assert_eq!(hive.iter().copied().collect::<Vec<_>>(), ["a", "c"]);
//! ```

mod block;
mod iter;
mod links;

#[cfg(test)]
mod tests;

pub use iter::{Entries, IntoIter, Iter, IterMut, Position};

use crate::alloc::{Global, HiveAlloc};
use crate::error::HiveError;
use crate::limits::Limits;
use block::{Block, Slot};
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use links::{BlockArena, BlockId, List};

/// Occupancy snapshot of one block, reported by [`Hive::active_blocks`] and
/// friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Slots in the block.
    pub capacity: usize,
    /// Occupied slots.
    pub len: usize,
}

/// A container with stable element addresses and O(1) insert and erase.
///
/// See the [module documentation](self) for the storage model.
pub struct Hive<T, A: HiveAlloc = Global> {
    blocks: BlockArena<T>,
    limits: Limits,
    len: usize,
    capacity: usize,
    next_ordinal: u64,
    alloc: A,
}

// SAFETY: a hive owns its elements and blocks exclusively; block pointers
// are never shared outside borrows of the hive.
unsafe impl<T: Send, A: HiveAlloc + Send> Send for Hive<T, A> {}
// SAFETY: `&Hive` only hands out `&T`.
unsafe impl<T: Sync, A: HiveAlloc + Sync> Sync for Hive<T, A> {}

#[cold]
#[inline(never)]
fn capacity_failure(err: HiveError) -> ! {
    match err {
        HiveError::AllocFailed { layout } => std::alloc::handle_alloc_error(layout),
        other => panic!("{other}"),
    }
}

impl<T> Hive<T, Global> {
    /// Creates an empty hive with the default limits for `T`.
    ///
    /// Nothing is allocated until the first insertion.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty hive whose blocks respect `limits`.
    pub fn with_limits(limits: Limits) -> Self {
        Self::with_limits_in(limits, Global)
    }

    /// Creates an empty hive with room for at least `capacity` elements.
    ///
    /// # Panics
    /// Panics if the capacity cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut hive = Self::new();
        hive.reserve(capacity);
        hive
    }
}

impl<T, A: HiveAlloc> Hive<T, A> {
    /// Creates an empty hive allocating blocks from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self::with_limits_in(Limits::for_type::<T>(), alloc)
    }

    /// Creates an empty hive with explicit limits and allocator.
    pub fn with_limits_in(limits: Limits, alloc: A) -> Self {
        Self {
            blocks: BlockArena::new(),
            limits,
            len: 0,
            capacity: 0,
            next_ordinal: 0,
            alloc,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the hive holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slots across active and reserved blocks.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Upper bound on the number of elements a hive of `T` can hold.
    #[inline]
    pub fn max_size(&self) -> usize {
        isize::MAX.unsigned_abs() / mem::size_of::<Slot<T>>()
    }

    /// Current block capacity limits.
    #[inline]
    pub fn block_limits(&self) -> Limits {
        self.limits
    }

    /// The allocator backing this hive.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    // --- Insertion ---

    /// Inserts `value` and returns its position.
    ///
    /// # Panics
    /// Panics (or aborts via `handle_alloc_error`) if a new block is needed
    /// and cannot be allocated.
    pub fn insert(&mut self, value: T) -> Position {
        match self.try_insert(value) {
            Ok(pos) => pos,
            Err(err) => capacity_failure(err),
        }
    }

    /// Inserts `value`, reporting allocation failure instead of panicking.
    ///
    /// # Errors
    /// Returns the allocation error; `value` is dropped and the hive is
    /// unchanged apart from possibly gained spare capacity.
    pub fn try_insert(&mut self, value: T) -> Result<Position, HiveError> {
        let id = self.open_block()?;
        Ok(self.place(id, value))
    }

    /// Inserts the value produced by `make`, constructing it only once room
    /// for it exists.
    ///
    /// # Panics
    /// As [`insert`](Self::insert). If `make` panics the hive is unchanged.
    pub fn emplace_with<F>(&mut self, make: F) -> Position
    where
        F: FnOnce() -> T,
    {
        let id = match self.open_block() {
            Ok(id) => id,
            Err(err) => capacity_failure(err),
        };
        let value = make();
        self.place(id, value)
    }

    /// Inserts the value produced by a fallible constructor.
    ///
    /// # Errors
    /// Allocation failures are converted into `E`; constructor errors are
    /// returned unchanged. Either way no element is added and no block
    /// changes state.
    pub fn try_emplace_with<E, F>(&mut self, make: F) -> Result<Position, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<HiveError>,
    {
        let id = self.open_block()?;
        let value = make()?;
        Ok(self.place(id, value))
    }

    /// Front of the open list, growing the hive when there is none.
    fn open_block(&mut self) -> Result<BlockId, HiveError> {
        if let Some(id) = self.blocks.first(List::Open) {
            return Ok(id);
        }
        // Roughly doubles total capacity.
        let capacity = self.limits.clamp(self.capacity);
        hive_trace!(capacity, total = self.capacity, "growing hive");
        self.grow(capacity)
    }

    /// Allocates an empty block and files it as open and reserved.
    fn grow(&mut self, capacity: usize) -> Result<BlockId, HiveError> {
        if self
            .capacity
            .checked_add(capacity)
            .map_or(true, |total| total > self.max_size())
        {
            return Err(HiveError::CapacityOverflow);
        }
        let block = Block::allocate(&self.alloc, capacity)?;
        let id = self.blocks.insert(block);
        self.blocks.push_back(List::Open, id);
        self.blocks.push_front(List::Reserved, id);
        self.capacity += capacity;
        hive_trace!(block = id, capacity, "allocated block");
        Ok(id)
    }

    /// Stores `value` in open block `id` and updates its memberships.
    fn place(&mut self, id: BlockId, value: T) -> Position {
        let block = self.blocks.block_mut(id);
        let was_empty = block.is_empty();
        let slot = block.emplace(value);
        if was_empty {
            block.ordinal = self.next_ordinal;
        }
        let now_full = block.is_full();

        if was_empty {
            self.next_ordinal += 1;
            self.blocks.unlink(List::Reserved, id);
            self.blocks.push_back(List::Active, id);
        }
        if now_full {
            self.blocks.unlink(List::Open, id);
        }
        self.len += 1;
        Position::new(id, slot)
    }

    // --- Erasure ---

    /// Erases the element at `pos` and returns the position after it.
    ///
    /// # Panics
    /// Panics if `pos` is the end position or does not denote a live element.
    pub fn erase(&mut self, pos: Position) -> Position {
        let (next, value) = self.take(pos);
        drop(value);
        next
    }

    /// Removes the element at `pos` and returns it.
    ///
    /// # Panics
    /// As [`erase`](Self::erase).
    pub fn remove(&mut self, pos: Position) -> T {
        self.take(pos).1
    }

    /// Erases every element in `first..last` and returns `last`.
    ///
    /// # Panics
    /// Panics if `last` is not reachable from `first`.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Position {
        let mut pos = first;
        while pos != last {
            pos = self.erase(pos);
        }
        pos
    }

    /// Keeps only the elements for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut pos = self.begin();
        while !pos.is_end() {
            let retained = match self.get_mut(pos) {
                Some(value) => keep(value),
                None => true,
            };
            pos = if retained {
                self.blocks.advance(pos)
            } else {
                self.erase(pos)
            };
        }
    }

    /// Moves the element at `pos` out; the successor is computed first.
    fn take(&mut self, pos: Position) -> (Position, T) {
        assert!(!pos.is_end(), "cannot erase the end position");
        let next = self.blocks.advance(pos);

        let id = pos.block();
        let block = self.blocks.block_mut(id);
        let was_full = block.is_full();
        let value = block.take(pos.slot());
        let now_empty = block.is_empty();

        if was_full {
            self.blocks.push_front(List::Open, id);
        }
        if now_empty {
            self.blocks.unlink(List::Active, id);
            self.blocks.push_front(List::Reserved, id);
        }
        self.len -= 1;
        (next, value)
    }

    /// Erases every element. Capacity is kept as reserved blocks.
    pub fn clear(&mut self) {
        let mut pos = self.begin();
        while !pos.is_end() {
            pos = self.erase(pos);
        }
    }

    // --- Capacity ---

    /// Ensures `capacity() >= n`.
    ///
    /// # Panics
    /// Panics if `n` exceeds [`max_size`](Self::max_size) or allocation fails.
    pub fn reserve(&mut self, n: usize) {
        if let Err(err) = self.try_reserve(n) {
            capacity_failure(err);
        }
    }

    /// Ensures `capacity() >= n`, adding reserved blocks that at least double
    /// the current capacity at each step.
    ///
    /// # Errors
    /// [`HiveError::CapacityOverflow`] if `n > max_size()`, or the allocation
    /// error. Blocks allocated before a failure are kept.
    pub fn try_reserve(&mut self, n: usize) -> Result<(), HiveError> {
        if n > self.max_size() {
            return Err(HiveError::CapacityOverflow);
        }
        while self.capacity < n {
            let capacity = self.limits.clamp(self.capacity.max(n - self.capacity));
            self.grow(capacity)?;
        }
        hive_trace!(n, capacity = self.capacity, "reserved");
        Ok(())
    }

    /// Releases reserved blocks while capacity stays at or above `n`.
    pub fn trim_capacity(&mut self, n: usize) {
        let mut cursor = self.blocks.first(List::Reserved);
        while let Some(id) = cursor {
            cursor = self.blocks.next(List::Reserved, id);
            let capacity = self.blocks.block(id).capacity();
            if self.capacity - capacity >= n {
                self.destroy_reserved(id);
            }
        }
        hive_trace!(n, capacity = self.capacity, "trimmed capacity");
    }

    /// Releases every reserved block.
    pub fn shrink_to_fit(&mut self) {
        self.trim_capacity(0);
    }

    fn destroy_reserved(&mut self, id: BlockId) {
        self.blocks.unlink(List::Reserved, id);
        self.blocks.unlink(List::Open, id);
        let block = self.blocks.remove(id);
        self.capacity -= block.capacity();
        hive_trace!(block = id, capacity = block.capacity(), "released block");
        block.deallocate(&self.alloc);
    }

    /// Returns `true` if every active block satisfies `limits`.
    pub fn are_active_blocks_within_limits(&self, limits: Limits) -> bool {
        self.blocks
            .iter(List::Active)
            .all(|id| self.blocks.block(id).is_within(&limits))
    }

    /// Changes the block limits.
    ///
    /// Active blocks outside `limits` are detached and their elements moved
    /// into conforming blocks; reserved blocks outside `limits` are released.
    /// Work is proportional to the number of moved elements. Moved elements
    /// get new positions and addresses; all others keep theirs.
    ///
    /// # Errors
    /// If room for the moved elements cannot be allocated, blocks grown for
    /// them are released and the error returned. No block is detached before
    /// that point, so positions, iteration order and limits are unchanged.
    pub fn reshape(&mut self, limits: Limits) -> Result<(), HiveError> {
        let outside: Vec<BlockId> = self
            .blocks
            .iter(List::Active)
            .filter(|&id| !self.blocks.block(id).is_within(&limits))
            .collect();
        let unfit_spare: Vec<BlockId> = self
            .blocks
            .iter(List::Reserved)
            .filter(|&id| !self.blocks.block(id).is_within(&limits))
            .collect();
        let released: usize = outside
            .iter()
            .chain(&unfit_spare)
            .map(|&id| self.blocks.block(id).capacity())
            .sum();

        // Conforming blocks must hold every element before anything moves.
        let mut conforming = self.capacity - released;
        let mut grown = Vec::new();
        while conforming < self.len {
            let capacity = limits.clamp(conforming.max(self.len - conforming));
            match self.grow(capacity) {
                Ok(id) => {
                    grown.push(id);
                    conforming += capacity;
                }
                Err(err) => {
                    for id in grown {
                        self.destroy_reserved(id);
                    }
                    return Err(err);
                }
            }
        }

        self.limits = limits;
        for id in unfit_spare {
            self.destroy_reserved(id);
        }
        let displaced: Vec<Block<T>> = outside
            .into_iter()
            .map(|id| self.extract_block(id))
            .collect();

        hive_debug!(
            blocks = displaced.len(),
            elements = displaced.iter().map(Block::len).sum::<usize>(),
            min = limits.min(),
            max = limits.max(),
            "reshaping hive"
        );
        for mut block in displaced {
            let mut from = 0;
            while let Some(slot) = block.next_occupied(from) {
                from = slot + 1;
                let value = block.take(slot);
                let id = self
                    .blocks
                    .first(List::Open)
                    .expect("room for displaced elements was reserved");
                self.place(id, value);
            }
            block.deallocate(&self.alloc);
        }
        Ok(())
    }

    // --- Whole-block transfer ---

    /// Moves every block of `other` into `self`. Elements keep their
    /// addresses; `other`'s active blocks are iterated after `self`'s.
    /// Reserved blocks of `other` outside `self`'s limits are released.
    ///
    /// # Errors
    /// [`HiveError::LimitsViolation`] if an active block of `other` is outside
    /// `self`'s limits; neither hive is modified.
    ///
    /// # Panics
    /// Panics if the two allocators are not equal.
    pub fn splice(&mut self, other: &mut Self) -> Result<(), HiveError>
    where
        A: PartialEq,
    {
        assert!(
            self.alloc == other.alloc,
            "cannot splice hives with unequal allocators"
        );
        if let Some(id) = other
            .blocks
            .iter(List::Active)
            .find(|&id| !other.blocks.block(id).is_within(&self.limits))
        {
            return Err(HiveError::LimitsViolation {
                capacity: other.blocks.block(id).capacity(),
                limits: self.limits,
            });
        }

        hive_debug!(
            blocks = other.blocks.len(),
            elements = other.len,
            "splicing hive"
        );
        while let Some(id) = other.blocks.first(List::Active) {
            let block = other.extract_block(id);
            self.splice_block(block);
        }
        while let Some(id) = other.blocks.first(List::Reserved) {
            let block = other.extract_block(id);
            if block.is_within(&self.limits) {
                self.splice_block(block);
            } else {
                block.deallocate(&other.alloc);
            }
        }
        Ok(())
    }

    /// Detaches block `id` with its elements.
    fn extract_block(&mut self, id: BlockId) -> Block<T> {
        for list in [List::Active, List::Open, List::Reserved] {
            if self.blocks.is_linked(list, id) {
                self.blocks.unlink(list, id);
            }
        }
        let block = self.blocks.remove(id);
        self.len -= block.len();
        self.capacity -= block.capacity();
        block
    }

    /// Adopts a detached block, filing it by its element count.
    fn splice_block(&mut self, mut block: Block<T>) {
        self.len += block.len();
        self.capacity += block.capacity();
        let empty = block.is_empty();
        let open = block.is_open();
        if !empty {
            block.ordinal = self.next_ordinal;
            self.next_ordinal += 1;
        }

        let id = self.blocks.insert(block);
        if empty {
            self.blocks.push_front(List::Reserved, id);
        } else {
            self.blocks.push_back(List::Active, id);
        }
        if open {
            self.blocks.push_back(List::Open, id);
        }
    }

    /// Exchanges the contents of two hives.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    // --- Access and traversal ---

    /// The element at `pos`, if `pos` denotes a live element.
    pub fn get(&self, pos: Position) -> Option<&T> {
        if pos.is_end() {
            return None;
        }
        self.blocks.try_block(pos.block())?.get(pos.slot())
    }

    /// Mutable access to the element at `pos`.
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        if pos.is_end() {
            return None;
        }
        self.blocks.try_block_mut(pos.block())?.get_mut(pos.slot())
    }

    /// Position of the element stored at `ptr`.
    ///
    /// Scans the active blocks by address range, so the cost is linear in
    /// the number of blocks, not elements. Returns `None` if `ptr` does not
    /// point at a live element of this hive.
    pub fn position_of(&self, ptr: *const T) -> Option<Position> {
        self.blocks.iter(List::Active).find_map(|id| {
            let block = self.blocks.block(id);
            let slot = block.index_of(ptr)?;
            block.is_occupied(slot).then(|| Position::new(id, slot))
        })
    }

    /// Position of the first element, or [`end`](Self::end) when empty.
    #[inline]
    pub fn begin(&self) -> Position {
        self.blocks.begin()
    }

    /// The past-the-end position.
    #[inline]
    pub fn end(&self) -> Position {
        Position::END
    }

    /// The position after `pos`; `end()` stays `end()`.
    ///
    /// # Panics
    /// Panics if `pos` belongs to a block that is no longer active.
    #[inline]
    pub fn next_position(&self, pos: Position) -> Position {
        self.blocks.advance(pos)
    }

    /// Orders two positions by iteration order; `end()` compares greatest.
    pub fn cmp_positions(&self, a: Position, b: Position) -> Ordering {
        match (a.is_end(), b.is_end()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordinal_a = self.blocks.block(a.block()).ordinal;
                let ordinal_b = self.blocks.block(b.block()).ordinal;
                ordinal_a.cmp(&ordinal_b).then(a.slot().cmp(&b.slot()))
            }
        }
    }

    /// Number of elements in `first..last`.
    ///
    /// Whole blocks between the two are counted by their element count.
    ///
    /// # Panics
    /// Panics if `first` comes after `last`.
    pub fn distance(&self, first: Position, last: Position) -> usize {
        assert!(
            self.cmp_positions(first, last) != Ordering::Greater,
            "distance: {first:?} comes after {last:?}"
        );
        if first == last {
            return 0;
        }

        let block = self.blocks.block(first.block());
        if !last.is_end() && first.block() == last.block() {
            return block.count_occupied(first.slot(), last.slot());
        }

        let mut total = block.count_occupied(first.slot(), block.capacity());
        let mut cursor = self.blocks.next(List::Active, first.block());
        while let Some(id) = cursor {
            let block = self.blocks.block(id);
            if id == last.block() {
                return total + block.count_occupied(0, last.slot());
            }
            total += block.len();
            cursor = self.blocks.next(List::Active, id);
        }
        total
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.blocks,
            pos: self.begin(),
            remaining: self.len,
        }
    }

    /// Iterates over the elements mutably.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            pos: self.begin(),
            remaining: self.len,
            arena: &self.blocks,
            _marker: PhantomData,
        }
    }

    /// Iterates over `(position, element)` pairs.
    pub fn entries(&self) -> Entries<'_, T> {
        Entries { inner: self.iter() }
    }

    // --- Diagnostics ---

    fn info(&self, id: BlockId) -> BlockInfo {
        let block = self.blocks.block(id);
        BlockInfo {
            capacity: block.capacity(),
            len: block.len(),
        }
    }

    /// Active blocks in iteration order.
    pub fn active_blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        self.blocks.iter(List::Active).map(|id| self.info(id))
    }

    /// Open blocks in the order insertions will use them.
    pub fn open_blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        self.blocks.iter(List::Open).map(|id| self.info(id))
    }

    /// Reserved (empty) blocks in the order they will be reused.
    pub fn reserved_blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        self.blocks.iter(List::Reserved).map(|id| self.info(id))
    }

    /// Verifies the block bookkeeping, panicking on the first violation.
    ///
    /// Checks list membership against element counts, the aggregate
    /// counters, and activation order. Linear in the number of blocks.
    #[doc(hidden)]
    pub fn check_invariants(&self) {
        let mut len = 0;
        let mut capacity = 0;
        let mut filed = 0;
        for id in self.blocks.ids() {
            let block = self.blocks.block(id);
            let active = self.blocks.is_linked(List::Active, id);
            let open = self.blocks.is_linked(List::Open, id);
            let reserved = self.blocks.is_linked(List::Reserved, id);
            assert_eq!(active, !block.is_empty(), "block {id}: active iff non-empty");
            assert_eq!(open, block.is_open(), "block {id}: open iff not full");
            assert_eq!(reserved, block.is_empty(), "block {id}: reserved iff empty");
            assert!(
                block.is_empty() || block.next_occupied(0).is_some(),
                "block {id}: count without occupied slots"
            );
            if active {
                len += block.len();
            }
            if active || reserved {
                capacity += block.capacity();
                filed += 1;
            }
        }
        assert_eq!(len, self.len, "len out of sync");
        assert_eq!(capacity, self.capacity, "capacity out of sync");
        assert_eq!(filed, self.blocks.len(), "unfiled block");

        let ordinals: Vec<u64> = self
            .blocks
            .iter(List::Active)
            .map(|id| self.blocks.block(id).ordinal)
            .collect();
        assert!(
            ordinals.windows(2).all(|pair| pair[0] < pair[1]),
            "active list out of activation order"
        );
    }
}

impl<T, A: HiveAlloc> Drop for Hive<T, A> {
    fn drop(&mut self) {
        self.clear();
        self.shrink_to_fit();
    }
}

impl<T, A: HiveAlloc + Default> Default for Hive<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: HiveAlloc + Clone> Clone for Hive<T, A> {
    fn clone(&self) -> Self {
        let mut out = Self::with_limits_in(self.limits, self.alloc.clone());
        out.extend(self.iter().cloned());
        out
    }
}

impl<T: fmt::Debug, A: HiveAlloc> fmt::Debug for Hive<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A: HiveAlloc> Extend<T> for Hive<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(self.len.saturating_add(lower));
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Copy + 'a, A: HiveAlloc> Extend<&'a T> for Hive<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Hive<T, Global> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut hive = Self::new();
        hive.extend(iter);
        hive
    }
}

//! Positions and iterators over a [`Hive`].
//!
//! Iteration follows the active list: every occupied slot of the oldest
//! activated block in slot order, then the next block, and so on, until the
//! sentinel is reached.

use super::links::{BlockArena, BlockId, List, HEAD};
use super::Hive;
use crate::alloc::HiveAlloc;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

/// The location of an element in a [`Hive`]: a block and a slot within it.
///
/// Positions are plain copyable values. One stays valid until the element it
/// denotes is erased or its block is moved by [`Hive::reshape`] or
/// [`Hive::splice`]; inserting or erasing other elements, reserving and
/// trimming capacity never invalidate it. [`Hive::end`] is the
/// one-past-the-last position.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    block: BlockId,
    slot: u32,
}

impl Position {
    pub(crate) const END: Position = Position {
        block: HEAD,
        slot: 0,
    };

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(block: BlockId, slot: usize) -> Self {
        debug_assert!(slot <= u32::MAX as usize);
        Self {
            block,
            slot: slot as u32,
        }
    }

    /// Returns `true` for the end position.
    #[inline]
    pub const fn is_end(self) -> bool {
        self.block == HEAD
    }

    #[inline]
    pub(crate) fn block(self) -> BlockId {
        self.block
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.slot as usize
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end() {
            f.write_str("Position(end)")
        } else {
            write!(f, "Position({}:{})", self.block, self.slot)
        }
    }
}

impl<T> BlockArena<T> {
    /// First occupied slot of `block` or of any active block after it.
    pub(crate) fn first_position_from(&self, mut block: Option<BlockId>) -> Position {
        while let Some(id) = block {
            if let Some(slot) = self.block(id).next_occupied(0) {
                return Position::new(id, slot);
            }
            block = self.next(List::Active, id);
        }
        Position::END
    }

    #[inline]
    pub(crate) fn begin(&self) -> Position {
        self.first_position_from(self.first(List::Active))
    }

    /// The position after `pos` in iteration order.
    pub(crate) fn advance(&self, pos: Position) -> Position {
        if pos.is_end() {
            return pos;
        }
        let id = pos.block();
        assert!(
            self.try_block(id).is_some() && self.is_linked(List::Active, id),
            "stale hive position {pos:?}"
        );
        match self.block(id).next_occupied(pos.slot() + 1) {
            Some(slot) => Position::new(id, slot),
            None => self.first_position_from(self.next(List::Active, id)),
        }
    }
}

/// Shared iterator over a hive, created by [`Hive::iter`].
pub struct Iter<'a, T> {
    pub(crate) arena: &'a BlockArena<T>,
    pub(crate) pos: Position,
    pub(crate) remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.pos.is_end() {
            return None;
        }
        let block = self.arena.block(self.pos.block());
        // SAFETY: `advance` only yields occupied slots.
        let item = unsafe { &*block.value_ptr(self.pos.slot()) };
        self.pos = self.arena.advance(self.pos);
        self.remaining -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            pos: self.pos,
            remaining: self.remaining,
        }
    }
}

/// Iterator yielding each element with its [`Position`], created by
/// [`Hive::entries`].
pub struct Entries<'a, T> {
    pub(crate) inner: Iter<'a, T>,
}

impl<'a, T> Iterator for Entries<'a, T> {
    type Item = (Position, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.inner.pos;
        self.inner.next().map(|value| (pos, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Entries<'_, T> {}
impl<T> FusedIterator for Entries<'_, T> {}

/// Mutable iterator over a hive, created by [`Hive::iter_mut`].
pub struct IterMut<'a, T> {
    pub(crate) arena: &'a BlockArena<T>,
    pub(crate) pos: Position,
    pub(crate) remaining: usize,
    pub(crate) _marker: PhantomData<&'a mut T>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        if self.pos.is_end() {
            return None;
        }
        let block = self.arena.block(self.pos.block());
        // SAFETY: the iterator was created from `&mut Hive`, slot storage is
        // outside the arena records, and each slot is yielded once.
        let item = unsafe { &mut *block.value_ptr(self.pos.slot()) };
        self.pos = self.arena.advance(self.pos);
        self.remaining -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

// SAFETY: the iterators only read the arena and hand out `&T` / `&mut T`.
unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}
unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

/// Owning iterator, created by `Hive::into_iter`.
///
/// Elements are moved out front to back; whatever is left is dropped with
/// the iterator.
pub struct IntoIter<T, A: HiveAlloc> {
    pub(crate) hive: Hive<T, A>,
}

impl<T, A: HiveAlloc> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let pos = self.hive.begin();
        if pos.is_end() {
            None
        } else {
            Some(self.hive.remove(pos))
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.hive.len(), Some(self.hive.len()))
    }
}

impl<T, A: HiveAlloc> ExactSizeIterator for IntoIter<T, A> {}
impl<T, A: HiveAlloc> FusedIterator for IntoIter<T, A> {}

impl<'a, T, A: HiveAlloc> IntoIterator for &'a Hive<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: HiveAlloc> IntoIterator for &'a mut Hive<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T, A: HiveAlloc> IntoIterator for Hive<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter { hive: self }
    }
}
